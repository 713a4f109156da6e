//! The configuration bundle: behaviours, beliefs, agents, the time
//! window, and the output mode. Field order here fixes iteration order
//! throughout the engine.
//!
//! The output sink itself is deliberately not a field here: unlike the
//! original's `unique_ptr<ostream>`, a `Configuration` built for a test
//! never needs one, and giving it a `Box<dyn Write>` would force every
//! test fixture to supply a throwaway writer. `Runner::run` returns the
//! serialisable result instead, and `main.rs` owns the actual sink.

use crate::agent::Agent;
use crate::behaviour::Behaviour;
use crate::belief::Belief;
use crate::error::{SimError, SimResult};

pub struct Configuration {
    pub behaviours: Vec<Behaviour>,
    pub beliefs: Vec<Belief>,
    pub agents: Vec<Agent>,
    pub start_time: u32,
    pub end_time: u32,
    pub full_output: bool,
}

impl Configuration {
    pub fn new(
        behaviours: Vec<Behaviour>,
        beliefs: Vec<Belief>,
        agents: Vec<Agent>,
        start_time: u32,
        end_time: u32,
        full_output: bool,
    ) -> SimResult<Self> {
        let config = Self {
            behaviours,
            beliefs,
            agents,
            start_time,
            end_time,
            full_output,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the structural invariants a run requires before it starts:
    /// `end_time > start_time`, every belief's relationship and perception
    /// tables are sized to the run, and every agent has enough recorded
    /// actions and activation rows for the run's day count plus a delta and
    /// a performance-relationship row for every belief.
    pub fn validate(&self) -> SimResult<()> {
        if self.end_time <= self.start_time {
            return Err(SimError::Configuration(format!(
                "end_time ({}) must be after start_time ({})",
                self.end_time, self.start_time
            )));
        }

        for belief in &self.beliefs {
            if belief.relationships().len() != self.beliefs.len() {
                return Err(SimError::Configuration(format!(
                    "belief {} has {} relationship entries, expected {}",
                    belief.uuid(),
                    belief.relationships().len(),
                    self.beliefs.len()
                )));
            }
            if belief.perceptions().len() != self.behaviours.len() {
                return Err(SimError::Configuration(format!(
                    "belief {} has {} perception entries, expected {}",
                    belief.uuid(),
                    belief.perceptions().len(),
                    self.behaviours.len()
                )));
            }
        }

        let n_days = (self.end_time - self.start_time + 1) as usize;
        for agent in &self.agents {
            if agent.actions().len() < n_days {
                return Err(SimError::Configuration(format!(
                    "agent {} has {} recorded actions, need at least {n_days}",
                    agent.uuid(),
                    agent.actions().len()
                )));
            }

            if agent.activations().len() < n_days {
                return Err(SimError::Configuration(format!(
                    "agent {} has {} recorded activation rows, need at least {n_days}",
                    agent.uuid(),
                    agent.activations().len()
                )));
            }
            if agent
                .activations()
                .iter()
                .any(|row| row.len() != self.beliefs.len())
            {
                return Err(SimError::Configuration(format!(
                    "agent {} has an activation row not sized to {} beliefs",
                    agent.uuid(),
                    self.beliefs.len()
                )));
            }

            if agent.deltas().len() != self.beliefs.len() {
                return Err(SimError::Configuration(format!(
                    "agent {} has {} deltas, expected {}",
                    agent.uuid(),
                    agent.deltas().len(),
                    self.beliefs.len()
                )));
            }

            let prs = agent.performance_relationships();
            if prs.len() != self.beliefs.len() {
                return Err(SimError::Configuration(format!(
                    "agent {} has {} performance_relationships rows, expected {}",
                    agent.uuid(),
                    prs.len(),
                    self.beliefs.len()
                )));
            }
            if prs.iter().any(|row| row.len() != self.behaviours.len()) {
                return Err(SimError::Configuration(format!(
                    "agent {} has a performance_relationships row not sized to {} behaviours",
                    agent.uuid(),
                    self.behaviours.len()
                )));
            }
        }

        Ok(())
    }

    pub fn n_beliefs(&self) -> usize {
        self.beliefs.len()
    }

    pub fn n_behaviours(&self) -> usize {
        self.behaviours.len()
    }

    /// The number of per-agent day rows this run needs. Row 0 is the
    /// initial condition (absolute day `start_time`), and one further
    /// row is written per tick from `start_time+1` up to and including
    /// `end_time`; this is why input day sequences must have length
    /// `end_time - start_time + 1`, not `end_time - start_time`.
    pub fn n_days(&self) -> u32 {
        self.end_time - self.start_time + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BehaviourId;

    fn behaviour() -> Behaviour {
        Behaviour::new("h")
    }

    fn belief(n_beliefs: usize, n_behaviours: usize) -> Belief {
        Belief::new("b", vec![0.0; n_beliefs], vec![0.0; n_behaviours])
    }

    fn agent(n_days: u32) -> Agent {
        Agent::new(
            vec![vec![0.0]; n_days as usize],
            vec![BehaviourId(0); n_days as usize],
            vec![],
            vec![1.0],
            vec![vec![0.0]],
        )
    }

    #[test]
    fn rejects_non_increasing_time_window() {
        let result = Configuration::new(vec![behaviour()], vec![belief(1, 1)], vec![], 5, 5, false);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_undersized_relationship_table() {
        let b = Belief::new("b", vec![0.0], vec![0.0]);
        let result = Configuration::new(
            vec![behaviour(), behaviour()],
            vec![b],
            vec![],
            0,
            1,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_an_agent_with_too_few_activation_rows() {
        let a = Agent::new(
            vec![vec![0.0]],
            vec![BehaviourId(0), BehaviourId(0)],
            vec![],
            vec![1.0],
            vec![vec![0.0]],
        );
        let result = Configuration::new(
            vec![behaviour()],
            vec![belief(1, 1)],
            vec![a],
            0,
            1,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_an_agent_with_an_undersized_activation_row() {
        let a = Agent::new(
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            vec![BehaviourId(0), BehaviourId(0)],
            vec![],
            vec![1.0],
            vec![vec![0.0]],
        );
        let result = Configuration::new(
            vec![behaviour()],
            vec![belief(1, 1)],
            vec![a],
            0,
            1,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn accepts_a_well_formed_bundle() {
        let result = Configuration::new(
            vec![behaviour()],
            vec![belief(1, 1)],
            vec![agent(2)],
            0,
            1,
            false,
        );
        assert!(result.is_ok());
    }
}
