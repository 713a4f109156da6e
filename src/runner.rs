//! The simulation driver: a two-pass day loop, perceive every agent
//! against yesterday's state, then act every agent against today's
//! freshly perceived state, between `start_time` and `end_time`, followed
//! by dispatch to either the full agent trace or the per-day summary
//! aggregator depending on `Configuration::full_output`.
//!
//! An earlier Rust port of this driver used raw/`unsafe` pointers into a
//! shared `Configuration` so that one agent's `perceive` can read its
//! friends' state while the whole
//! collection is being iterated mutably. The arena/index redesign makes
//! that unnecessary: `perceive_beliefs` clones a read-only snapshot of all
//! agents once per tick, so every agent only ever reads *yesterday's*
//! committed state through it, never another agent's in-progress update,
//! and `perform_actions` needs no snapshot at all, since `act` only reads
//! the acting agent's own freshly perceived activations.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Configuration;
use crate::error::SimResult;
use crate::json::{AgentSpec, SummarySpec};
use crate::summary::compute_day_summary;

/// What a completed run produces. Kept distinct from the wire format so
/// `Runner::run` stays testable without an actual output stream; `main.rs`
/// owns the sink and chooses how to serialize whichever variant comes back.
pub enum RunOutput {
    Full(Vec<AgentSpec>),
    Summary(Vec<SummarySpec>),
}

/// Owns the `Configuration` for the duration of one run, plus the seeded
/// RNG `act` draws from (reproducible runs need a seeded generator rather
/// than an unseeded `rand::thread_rng()`, so the RNG is a field here
/// instead, seeded once at construction).
pub struct Runner {
    config: Configuration,
    rng: StdRng,
}

impl Runner {
    pub fn new(config: Configuration, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn run(&mut self) -> SimResult<RunOutput> {
        info!("Starting concept");
        info!("n beliefs: {}", self.config.n_beliefs());
        info!("n behaviours: {}", self.config.n_behaviours());
        info!("n agents: {}", self.config.agents.len());
        info!("Start time: {}", self.config.start_time);
        info!("End time: {}", self.config.end_time);

        self.tick_between()?;

        info!("Ending concept");
        self.serialize()
    }

    /// Ticks every day from `start_time` (exclusive; day 0 of each
    /// agent's arrays is the initial condition already present in the
    /// input) up to and including `end_time`.
    fn tick_between(&mut self) -> SimResult<()> {
        for day in 1..self.config.n_days() {
            self.tick(day)?;
        }
        Ok(())
    }

    fn tick(&mut self, day: u32) -> SimResult<()> {
        let absolute_day = self.config.start_time + day;
        info!("Day {absolute_day} - perceiving beliefs");
        self.perceive_beliefs(day)?;
        info!("Day {absolute_day} - performing actions");
        self.perform_actions(day)?;
        Ok(())
    }

    fn perceive_beliefs(&mut self, day: u32) -> SimResult<()> {
        let yesterday = self.config.agents.clone();
        for agent in &mut self.config.agents {
            agent.perceive(day, &self.config.beliefs, &yesterday)?;
        }
        Ok(())
    }

    fn perform_actions(&mut self, day: u32) -> SimResult<()> {
        for agent in &mut self.config.agents {
            agent.act(
                day,
                &self.config.behaviours,
                &self.config.beliefs,
                &mut self.rng,
            )?;
        }
        Ok(())
    }

    fn serialize(&self) -> SimResult<RunOutput> {
        if self.config.full_output {
            info!("Converting agents to AgentSpecs");
            let specs = self
                .config
                .agents
                .iter()
                .map(|a| {
                    AgentSpec::from_agent(
                        a,
                        &self.config.beliefs,
                        &self.config.behaviours,
                        &self.config.agents,
                    )
                })
                .collect();
            Ok(RunOutput::Full(specs))
        } else {
            info!("Computing per-day summaries");
            let mut summaries = Vec::with_capacity(self.config.n_days() as usize);
            for day in 0..self.config.n_days() {
                let stats = compute_day_summary(
                    &self.config.agents,
                    day,
                    self.config.n_beliefs(),
                    self.config.n_behaviours(),
                )?;
                summaries.push(SummarySpec::from_day_summary(
                    &stats,
                    &self.config.beliefs,
                    &self.config.behaviours,
                ));
            }
            Ok(RunOutput::Summary(summaries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BehaviourId;
    use crate::behaviour::Behaviour;
    use crate::belief::Belief;
    use crate::agent::Agent;

    fn two_day_config() -> Configuration {
        let behaviours = vec![Behaviour::new("post")];
        let beliefs = vec![Belief::new("b1", vec![0.0], vec![0.0])];
        let agents = vec![Agent::new(
            vec![vec![0.5], vec![0.0]],
            vec![BehaviourId(0), BehaviourId(0)],
            vec![],
            vec![1.0],
            vec![vec![1.0]],
        )];
        Configuration::new(behaviours, beliefs, agents, 0, 1, true).unwrap()
    }

    #[test]
    fn run_in_full_output_mode_extends_every_agents_history_by_one_day() {
        let config = two_day_config();
        let mut runner = Runner::new(config, 7);
        let output = runner.run().unwrap();
        match output {
            RunOutput::Full(specs) => {
                assert_eq!(specs.len(), 1);
                assert_eq!(specs[0].activations.len(), 2);
            }
            RunOutput::Summary(_) => panic!("expected full output"),
        }
    }

    #[test]
    fn run_in_summary_mode_produces_one_record_per_day() {
        let mut config = two_day_config();
        config.full_output = false;
        let mut runner = Runner::new(config, 7);
        let output = runner.run().unwrap();
        match output {
            RunOutput::Summary(summaries) => assert_eq!(summaries.len(), 2),
            RunOutput::Full(_) => panic!("expected summary output"),
        }
    }

    #[test]
    fn same_seed_produces_identical_action_traces() {
        let run_once = || {
            let config = two_day_config();
            let mut runner = Runner::new(config, 42);
            match runner.run().unwrap() {
                RunOutput::Full(specs) => specs[0].actions.clone(),
                RunOutput::Summary(_) => unreachable!(),
            }
        };
        assert_eq!(run_once(), run_once());
    }
}
