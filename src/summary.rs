//! Per-day cross-population statistics, computed from the recorded
//! activations and actions rather than the day-to-day simulation state.

use crate::agent::Agent;
use crate::arena::BehaviourId;
use crate::error::{SimError, SimResult};

/// The five per-day tables this aggregator produces, one entry per belief
/// (or behaviour, for `n_performers`) in arena order.
#[derive(Clone, Debug, PartialEq)]
pub struct DaySummary {
    pub mean_activations: Vec<f64>,
    pub sd_activations: Vec<f64>,
    pub median_activations: Vec<f64>,
    pub nonzero_activations: Vec<usize>,
    pub n_performers: Vec<usize>,
}

/// Mean activation per belief: `μ_b = (1/N) Σ_a activations_a[t][b]`.
/// Agents missing an entry for a belief contribute 0.
pub fn mean_activation(agents: &[Agent], day: u32, n_beliefs: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n_beliefs];
    for agent in agents {
        let row = agent.activations_for_day(day);
        for (i, sum) in sums.iter_mut().enumerate() {
            *sum += row.get(i).copied().unwrap_or(0.0);
        }
    }
    let n = agents.len() as f64;
    for sum in &mut sums {
        *sum /= n;
    }
    sums
}

/// Sample standard deviation per belief. Requires at least 2 agents.
pub fn sd_activation(
    agents: &[Agent],
    day: u32,
    means: &[f64],
) -> SimResult<Vec<f64>> {
    if agents.len() < 2 {
        return Err(SimError::Configuration(
            "sample standard deviation requires at least 2 agents".to_string(),
        ));
    }
    let mut sq_diffs = vec![0.0; means.len()];
    for agent in agents {
        let row = agent.activations_for_day(day);
        for (i, acc) in sq_diffs.iter_mut().enumerate() {
            let act = row.get(i).copied().unwrap_or(0.0);
            *acc += (act - means[i]).powi(2);
        }
    }
    let denom = (agents.len() - 1) as f64;
    for acc in &mut sq_diffs {
        *acc = (*acc / denom).sqrt();
    }
    Ok(sq_diffs)
}

/// Median activation per belief: with 0-based indexing, the element at
/// `⌊N/2⌋` for odd N, and the mean of the elements at `⌊N/2⌋ - 1` and
/// `⌊N/2⌋` for even N.
pub fn median_activation(agents: &[Agent], day: u32, n_beliefs: usize) -> Vec<f64> {
    let mut columns = vec![Vec::with_capacity(agents.len()); n_beliefs];
    for agent in agents {
        let row = agent.activations_for_day(day);
        for (i, column) in columns.iter_mut().enumerate() {
            column.push(row.get(i).copied().unwrap_or(0.0));
        }
    }

    columns
        .into_iter()
        .map(|mut column| {
            column.sort_by(|a, b| a.partial_cmp(b).expect("activations are finite"));
            let n = column.len();
            if n == 0 {
                return 0.0;
            }
            let mid = n / 2;
            if n % 2 == 0 {
                (column[mid - 1] + column[mid]) / 2.0
            } else {
                column[mid]
            }
        })
        .collect()
}

/// Count of agents with a non-zero activation per belief.
pub fn nonzero_activation(agents: &[Agent], day: u32, n_beliefs: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_beliefs];
    for agent in agents {
        let row = agent.activations_for_day(day);
        for (i, count) in counts.iter_mut().enumerate() {
            if row.get(i).copied().unwrap_or(0.0) != 0.0 {
                *count += 1;
            }
        }
    }
    counts
}

/// Count of agents who performed each behaviour on the day.
pub fn n_performers(agents: &[Agent], day: u32, n_behaviours: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_behaviours];
    for agent in agents {
        if let Some(BehaviourId(index)) = agent.action_on(day) {
            if let Some(count) = counts.get_mut(index as usize) {
                *count += 1;
            }
        }
    }
    counts
}

/// Compute the full day-`t` record. Deterministic and pure in
/// `{activations_a[t], actions_a[t]}_a`.
pub fn compute_day_summary(
    agents: &[Agent],
    day: u32,
    n_beliefs: usize,
    n_behaviours: usize,
) -> SimResult<DaySummary> {
    let mean_activations = mean_activation(agents, day, n_beliefs);
    let sd_activations = sd_activation(agents, day, &mean_activations)?;
    let median_activations = median_activation(agents, day, n_beliefs);
    let nonzero_activations = nonzero_activation(agents, day, n_beliefs);
    let n_performers = n_performers(agents, day, n_behaviours);
    Ok(DaySummary {
        mean_activations,
        sd_activations,
        median_activations,
        nonzero_activations,
        n_performers,
    })
}
