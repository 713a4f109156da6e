//! Black-box coverage for reproducibility: two runs over the same
//! `Configuration` with the same seed produce byte-for-byte identical
//! action traces, and a different seed is free to diverge.

use concept::agent::Agent;
use concept::arena::{AgentId, BehaviourId};
use concept::behaviour::Behaviour;
use concept::belief::Belief;
use concept::config::Configuration;
use concept::runner::{RunOutput, Runner};

fn network_with_contested_scores() -> Configuration {
    // Two behaviours with equally attractive positive scores, so the
    // stochastic branch of `act`'s selection rule actually runs instead of
    // being short-circuited by a single dominant behaviour.
    let behaviours = vec![Behaviour::new("post"), Behaviour::new("share")];
    let beliefs = vec![Belief::new("b1", vec![1.0], vec![0.5, 0.5])];
    let agents: Vec<Agent> = (0..6u32)
        .map(|i| {
            Agent::new(
                vec![
                    vec![0.6],
                    vec![0.0],
                    vec![0.0],
                    vec![0.0],
                    vec![0.0],
                    vec![0.0],
                ],
                vec![BehaviourId(0); 6],
                vec![(AgentId((i + 1) % 6), 0.4)],
                vec![0.95],
                vec![vec![0.5, 0.5]],
            )
        })
        .collect();
    Configuration::new(behaviours, beliefs, agents, 0, 5, true).expect("well-formed configuration")
}

fn action_trace(seed: u64) -> Vec<Vec<BehaviourId>> {
    let config = network_with_contested_scores();
    let mut runner = Runner::new(config, seed);
    match runner.run().expect("run succeeds") {
        RunOutput::Full(specs) => specs
            .iter()
            .map(|s| {
                // Re-resolve against the same behaviour arena order used to
                // build the configuration, so the trace is directly
                // comparable across runs.
                s.actions
                    .iter()
                    .map(|uuid| {
                        if *uuid == runner_behaviour_uuid(&runner, 0) {
                            BehaviourId(0)
                        } else {
                            BehaviourId(1)
                        }
                    })
                    .collect()
            })
            .collect(),
        RunOutput::Summary(_) => unreachable!("configured for full output"),
    }
}

fn runner_behaviour_uuid(runner: &Runner, index: usize) -> uuid::Uuid {
    runner.config().behaviours[index].uuid()
}

#[test]
fn same_seed_same_inputs_reproduce_the_same_action_trace() {
    assert_eq!(action_trace(123), action_trace(123));
}

#[test]
fn different_seeds_are_not_forced_into_lockstep() {
    // Not a correctness property by itself (two seeds could coincidentally
    // agree), but guards against `act` silently ignoring the RNG it is
    // handed; if every seed produced the same trace the comparison above
    // would be vacuous.
    let traces: Vec<_> = (0..8u64).map(action_trace).collect();
    assert!(
        traces.windows(2).any(|w| w[0] != w[1]),
        "expected at least one pair of seeds to diverge"
    );
}
