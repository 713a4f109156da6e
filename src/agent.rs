use std::collections::HashMap;

use rand::Rng;
use uuid::Uuid;

use crate::arena::{AgentId, BehaviourId, BeliefId};
use crate::behaviour::Behaviour;
use crate::belief::Belief;
use crate::error::{SimError, SimResult};
use crate::named::Identity;

/// A single agent's mutable state: activation history, action history,
/// social neighbourhood, and the two belief-indexed coefficient tables
/// that drive its own updates.
///
/// Agents own their state exclusively; beliefs and behaviours are shared
/// read-only references resolved to arena indices at load time.
#[derive(Clone, Debug)]
pub struct Agent {
    identity: Identity,
    /// `activations[day][belief index]`.
    activations: Vec<Vec<f64>>,
    /// `actions[day]`.
    actions: Vec<BehaviourId>,
    /// The social neighbourhood: a weak, back-referential handle to
    /// another agent plus a scalar weight. Asymmetric, self-loops
    /// allowed, weights unnormalised.
    friends: Vec<(AgentId, f64)>,
    /// `deltas[belief index]`.
    deltas: Vec<f64>,
    /// `performance_relationships[belief index][behaviour index]`.
    performance_relationships: Vec<Vec<f64>>,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        activations: Vec<Vec<f64>>,
        actions: Vec<BehaviourId>,
        friends: Vec<(AgentId, f64)>,
        deltas: Vec<f64>,
        performance_relationships: Vec<Vec<f64>>,
    ) -> Self {
        Self::new_with_uuid(
            Uuid::new_v4(),
            activations,
            actions,
            friends,
            deltas,
            performance_relationships,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_with_uuid(
        uuid: Uuid,
        activations: Vec<Vec<f64>>,
        actions: Vec<BehaviourId>,
        friends: Vec<(AgentId, f64)>,
        deltas: Vec<f64>,
        performance_relationships: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            identity: Identity::new_with_uuid(String::new(), uuid),
            activations,
            actions,
            friends,
            deltas,
            performance_relationships,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.identity.uuid()
    }

    /// The number of recorded activation rows, which is also the run's
    /// day count for this agent: derived from `activations` so the two
    /// can never disagree.
    pub fn n_days(&self) -> u32 {
        self.activations.len() as u32
    }

    pub fn friends(&self) -> &[(AgentId, f64)] {
        &self.friends
    }

    pub fn set_friends(&mut self, friends: Vec<(AgentId, f64)>) {
        self.friends = friends;
    }

    pub fn actions(&self) -> &[BehaviourId] {
        &self.actions
    }

    pub fn action_on(&self, day: u32) -> Option<BehaviourId> {
        self.actions.get(day as usize).copied()
    }

    /// The belief-indexed delta table, one entry per belief in the run.
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// `performance_relationships[belief index][behaviour index]`, one row
    /// per belief in the run.
    pub fn performance_relationships(&self) -> &[Vec<f64>] {
        &self.performance_relationships
    }

    /// Every recorded activation row, one per day, in belief-arena order.
    pub fn activations(&self) -> &[Vec<f64>] {
        &self.activations
    }

    /// The activation row for a given day, one entry per belief in the
    /// run, in belief-arena order.
    pub fn activations_for_day(&self, day: u32) -> &[f64] {
        self.activations
            .get(day as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn activation_at(&self, day: usize, belief: BeliefId) -> Option<f64> {
        self.activations.get(day)?.get(belief.index()).copied()
    }

    fn delta(&self, belief: BeliefId) -> SimResult<f64> {
        self.deltas.get(belief.index()).copied().ok_or_else(|| {
            SimError::Configuration(format!(
                "agent {} is missing a delta for belief index {belief}",
                self.uuid()
            ))
        })
    }

    fn performance_relationship(
        &self,
        belief: BeliefId,
        behaviour: BehaviourId,
    ) -> SimResult<f64> {
        self.performance_relationships
            .get(belief.index())
            .and_then(|row| row.get(behaviour.index()))
            .copied()
            .ok_or_else(|| {
                SimError::Configuration(format!(
                    "agent {} is missing performance_relationships[{belief}][{behaviour}]",
                    self.uuid()
                ))
            })
    }

    /// Weighted relationship: how much holding `b1` at `day` pulls toward
    /// `b2`. Absence of the activation or the relationship contributes no
    /// pull; both cases return the neutral value 0.0.
    pub fn weighted_relationship(
        &self,
        day: usize,
        b1: BeliefId,
        b2: BeliefId,
        beliefs: &[Belief],
    ) -> f64 {
        let Some(activation) = self.activation_at(day, b1) else {
            return 0.0;
        };
        let Some(belief) = beliefs.get(b1.index()) else {
            return 0.0;
        };
        activation * belief.relationship(b2)
    }

    /// Contextualisation: mean weighted relationship from `b` to every
    /// belief in the run.
    pub fn contextualize(&self, day: usize, b: BeliefId, beliefs: &[Belief]) -> f64 {
        if beliefs.is_empty() {
            return 0.0;
        }
        let sum: f64 = (0..beliefs.len())
            .map(|i| self.weighted_relationship(day, b, BeliefId(i as u32), beliefs))
            .sum();
        sum / beliefs.len() as f64
    }

    /// Actions of friends: sum of friend weights keyed by the behaviour
    /// each friend performed on `day`. Friends whose id no longer
    /// resolves, or who have no recorded action for the day, are skipped
    /// silently.
    pub fn actions_of_friends(&self, day: usize, agents: &[Agent]) -> HashMap<BehaviourId, f64> {
        let mut map = HashMap::new();
        for &(friend_id, weight) in &self.friends {
            let Some(friend) = agents.get(friend_id.index()) else {
                log::warn!(
                    "agent {}: friend index {friend_id} does not resolve, skipping",
                    self.uuid()
                );
                continue;
            };
            let Some(behaviour) = friend.actions.get(day).copied() else {
                log::warn!(
                    "agent {}: friend {} has no recorded action for day {day}, skipping",
                    self.uuid(),
                    friend.uuid()
                );
                continue;
            };
            *map.entry(behaviour).or_insert(0.0) += weight;
        }
        map
    }

    /// Pressure: mean of perception·weight over the behaviours performed
    /// by an agent's friends.
    pub fn pressure(
        belief: BeliefId,
        actions_of_friends: &HashMap<BehaviourId, f64>,
        beliefs: &[Belief],
    ) -> f64 {
        if actions_of_friends.is_empty() {
            return 0.0;
        }
        let Some(b) = beliefs.get(belief.index()) else {
            return 0.0;
        };
        let sum: f64 = actions_of_friends
            .iter()
            .map(|(&behaviour, &weight)| b.perception(behaviour) * weight)
            .sum();
        sum / actions_of_friends.len() as f64
    }

    /// Activation change: `((1 ± C)/2) · P`, sign `+` when pressure is
    /// positive, `-` otherwise (when pressure is 0 the value is 0).
    pub fn activation_change(
        &self,
        day: usize,
        belief: BeliefId,
        beliefs: &[Belief],
        actions_of_friends: &HashMap<BehaviourId, f64>,
    ) -> f64 {
        let pressure = Self::pressure(belief, actions_of_friends, beliefs);
        let context = self.contextualize(day, belief, beliefs);
        if pressure > 0.0 {
            (1.0 + context) / 2.0 * pressure
        } else {
            (1.0 - context) / 2.0 * pressure
        }
    }

    /// Update `activations[t]` from `activations[t-1]` and the prior
    /// day's friend actions. Precondition: `t >= 1` and row `t-1` is
    /// complete.
    pub fn perceive(&mut self, t: u32, beliefs: &[Belief], agents: &[Agent]) -> SimResult<()> {
        debug_assert!(t >= 1, "perceive requires t >= 1");
        let prev_day = (t - 1) as usize;
        let actions_of_friends = self.actions_of_friends(prev_day, agents);

        let mut new_row = vec![0.0; beliefs.len()];
        for (i, belief) in beliefs.iter().enumerate() {
            let belief_id = BeliefId(i as u32);
            let prev = self.activation_at(prev_day, belief_id).ok_or_else(|| {
                SimError::Configuration(format!(
                    "agent {} is missing an activation for belief {} on day {prev_day}",
                    self.uuid(),
                    belief.uuid()
                ))
            })?;
            let delta = self.delta(belief_id)?;
            let change = self.activation_change(prev_day, belief_id, beliefs, &actions_of_friends);
            let raw = delta * prev + change;
            if !raw.is_finite() {
                return Err(SimError::Numeric(format!(
                    "non-finite activation for agent {} belief {} on day {t}",
                    self.uuid(),
                    belief.uuid()
                )));
            }
            new_row[i] = raw.clamp(-1.0, 1.0);
        }

        if self.activations.len() <= t as usize {
            self.activations.resize(t as usize + 1, Vec::new());
        }
        self.activations[t as usize] = new_row;
        Ok(())
    }

    /// Choose `actions[t]` by scoring every behaviour against the belief
    /// activations at day `t`, then sampling per the selection rule below.
    pub fn act(
        &mut self,
        t: u32,
        behaviours: &[Behaviour],
        beliefs: &[Belief],
        rng: &mut impl Rng,
    ) -> SimResult<()> {
        let mut scores = Vec::with_capacity(behaviours.len());
        for (hi, behaviour) in behaviours.iter().enumerate() {
            let behaviour_id = BehaviourId(hi as u32);
            let mut score = 0.0;
            for (bi, _) in beliefs.iter().enumerate() {
                let belief_id = BeliefId(bi as u32);
                let prs = self.performance_relationship(belief_id, behaviour_id)?;
                let activation = self.activation_at(t as usize, belief_id).unwrap_or(0.0);
                score += prs * activation;
            }
            if !score.is_finite() {
                return Err(SimError::Numeric(format!(
                    "non-finite action score for agent {} behaviour {} on day {t}",
                    self.uuid(),
                    behaviour.uuid()
                )));
            }
            scores.push((behaviour_id, score));
        }

        let rv: f64 = rng.gen_range(0.0..=1.0);
        let chosen = select_behaviour(&scores, rv)?;

        if self.actions.len() <= t as usize {
            self.actions.resize(t as usize + 1, chosen);
        }
        self.actions[t as usize] = chosen;
        Ok(())
    }
}

/// The behaviour-selection rule, kept free-standing and driven by an
/// already-drawn `rv` so the boundary scenarios below can exercise it
/// directly against a literal score table and a literal draw.
fn select_behaviour(scores: &[(BehaviourId, f64)], rv: f64) -> SimResult<BehaviourId> {
    let Some(&first) = scores.first() else {
        return Err(SimError::Configuration(
            "act requires at least one configured behaviour".to_string(),
        ));
    };

    let mut best = first;
    for &(id, score) in &scores[1..] {
        if score > best.1 {
            best = (id, score);
        }
    }

    if best.1 < 0.0 {
        return Ok(best.0);
    }

    // Scores are stored before branching on the max, so this table is
    // never empty on the positive-pressure path.
    let filtered: Vec<(BehaviourId, f64)> =
        scores.iter().copied().filter(|&(_, s)| s >= 0.0).collect();

    if filtered.len() == 1 {
        return Ok(filtered[0].0);
    }

    let total: f64 = filtered.iter().map(|&(_, s)| s).sum();
    if total <= 0.0 {
        return Ok(filtered[0].0);
    }

    let mut remaining = rv;
    let mut chosen = filtered.last().expect("filtered is non-empty").0;
    for &(id, score) in &filtered {
        remaining -= score / total;
        if remaining <= 0.0 {
            chosen = id;
            break;
        }
    }
    Ok(chosen)
}
