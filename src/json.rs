//! JSON wire formats and the UUID-to-arena-index resolution that turns
//! them into the in-memory model.
//!
//! Each `*Spec` struct mirrors a document field-for-field with
//! `original_source/contagent-lib/include/contagent/json/*.h`: relationship
//! and perception tables, friend weights, deltas, and
//! `performance_relationships` are all keyed by UUID on the wire. Loading
//! resolves every such key against the arena built so far, behaviours
//! first, then beliefs (which reference behaviours), then agents (which
//! reference both and each other), rather than the original's separate
//! "unlinked" construction pass plus a second `link*` pass, since a plain
//! `HashMap<Uuid, _>` built once per entity kind is all a second pass
//! bought there.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::Agent;
use crate::arena::{AgentId, BehaviourId, BeliefId};
use crate::behaviour::Behaviour;
use crate::belief::Belief;
use crate::error::{SimError, SimResult};
use crate::summary::DaySummary;

/// `behaviours.json` entry.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BehaviourSpec {
    pub name: String,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
}

impl BehaviourSpec {
    pub fn to_behaviour(&self) -> Behaviour {
        Behaviour::new_with_uuid(self.name.clone(), self.uuid)
    }

    pub fn from_behaviour(behaviour: &Behaviour) -> Self {
        Self {
            name: behaviour.name().to_string(),
            uuid: behaviour.uuid(),
        }
    }
}

/// Arena-order `Uuid -> BehaviourId` lookup, used by `load_beliefs` and
/// `load_agents` to resolve perception/performance-relationship keys.
pub fn behaviour_index(behaviours: &[Behaviour]) -> HashMap<Uuid, BehaviourId> {
    behaviours
        .iter()
        .enumerate()
        .map(|(i, b)| (b.uuid(), BehaviourId(i as u32)))
        .collect()
}

pub fn load_behaviours(specs: &[BehaviourSpec]) -> Vec<Behaviour> {
    specs.iter().map(BehaviourSpec::to_behaviour).collect()
}

/// `beliefs.json` entry. `relationships`/`perceptions` are sparse on the
/// wire (an absent entry is neutral `0.0`) and densified here.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BeliefSpec {
    pub name: String,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(default)]
    pub relationships: HashMap<Uuid, f64>,
    #[serde(default)]
    pub perceptions: HashMap<Uuid, f64>,
}

impl BeliefSpec {
    pub fn from_belief(belief: &Belief, beliefs: &[Belief], behaviours: &[Behaviour]) -> Self {
        let relationships = belief
            .relationships()
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight != 0.0)
            .map(|(i, &weight)| (beliefs[i].uuid(), weight))
            .collect();
        let perceptions = belief
            .perceptions()
            .iter()
            .enumerate()
            .filter(|&(_, &weight)| weight != 0.0)
            .map(|(i, &weight)| (behaviours[i].uuid(), weight))
            .collect();
        Self {
            name: belief.name().to_string(),
            uuid: belief.uuid(),
            relationships,
            perceptions,
        }
    }
}

/// Arena-order `Uuid -> BeliefId` lookup.
pub fn belief_index(beliefs: &[Belief]) -> HashMap<Uuid, BeliefId> {
    beliefs
        .iter()
        .enumerate()
        .map(|(i, b)| (b.uuid(), BeliefId(i as u32)))
        .collect()
}

/// Resolve every `beliefs.json` entry into a `Belief` whose relationship
/// and perception tables are dense and sized to this run, in the order the
/// specs were given (that order becomes arena order).
pub fn load_beliefs(specs: &[BeliefSpec], behaviours: &[Behaviour]) -> SimResult<Vec<Belief>> {
    let h_index = behaviour_index(behaviours);
    let b_index: HashMap<Uuid, BeliefId> = specs
        .iter()
        .enumerate()
        .map(|(i, s)| (s.uuid, BeliefId(i as u32)))
        .collect();

    specs
        .iter()
        .map(|spec| {
            let mut relationships = vec![0.0; specs.len()];
            for (uuid, weight) in &spec.relationships {
                let id = b_index.get(uuid).ok_or_else(|| {
                    SimError::InputFormat(format!(
                        "belief {} references unknown belief {uuid} in relationships",
                        spec.uuid
                    ))
                })?;
                relationships[id.index()] = *weight;
            }

            let mut perceptions = vec![0.0; behaviours.len()];
            for (uuid, weight) in &spec.perceptions {
                let id = h_index.get(uuid).ok_or_else(|| {
                    SimError::InputFormat(format!(
                        "belief {} references unknown behaviour {uuid} in perceptions",
                        spec.uuid
                    ))
                })?;
                perceptions[id.index()] = *weight;
            }

            Ok(Belief::new_with_uuid(
                spec.name.clone(),
                spec.uuid,
                relationships,
                perceptions,
            ))
        })
        .collect()
}

/// `agents.json` entry. `activations` is one sparse belief-keyed map per
/// recorded day; `actions` is one behaviour UUID per recorded day;
/// `deltas`, `friends`, and `performance_relationships` are sparse,
/// belief-/agent-keyed.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AgentSpec {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub actions: Vec<Uuid>,
    pub activations: Vec<HashMap<Uuid, f64>>,
    #[serde(default)]
    pub deltas: HashMap<Uuid, f64>,
    #[serde(default)]
    pub friends: HashMap<Uuid, f64>,
    #[serde(default)]
    pub performance_relationships: HashMap<Uuid, HashMap<Uuid, f64>>,
}

impl AgentSpec {
    /// Convert a simulated `Agent` back into wire form, expanding its dense
    /// tables back to the sparse UUID-keyed shape.
    pub fn from_agent(
        agent: &Agent,
        beliefs: &[Belief],
        behaviours: &[Behaviour],
        agents: &[Agent],
    ) -> Self {
        let actions = agent
            .actions()
            .iter()
            .map(|id| behaviours[id.index()].uuid())
            .collect();

        let activations = (0..agent.n_days())
            .map(|day| {
                agent
                    .activations_for_day(day)
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| (beliefs[i].uuid(), value))
                    .collect::<HashMap<Uuid, f64>>()
            })
            .collect();

        let deltas = agent
            .deltas()
            .iter()
            .enumerate()
            .map(|(i, &value)| (beliefs[i].uuid(), value))
            .collect();

        let friends = agent
            .friends()
            .iter()
            .map(|&(id, weight)| (agents[id.index()].uuid(), weight))
            .collect();

        let performance_relationships = agent
            .performance_relationships()
            .iter()
            .enumerate()
            .map(|(bi, row)| {
                let inner: HashMap<Uuid, f64> = row
                    .iter()
                    .enumerate()
                    .map(|(hi, &value)| (behaviours[hi].uuid(), value))
                    .collect();
                (beliefs[bi].uuid(), inner)
            })
            .collect();

        Self {
            uuid: agent.uuid(),
            actions,
            activations,
            deltas,
            friends,
            performance_relationships,
        }
    }
}

/// Resolve every `agents.json` entry into an `Agent` with dense,
/// arena-indexed tables. `behaviours` and `beliefs` must already be fully
/// loaded; friend references resolve against the other entries in `specs`,
/// in the order given (that order becomes agent arena order, so a friend
/// reference to a later entry in the file is fine).
pub fn load_agents(
    specs: &[AgentSpec],
    behaviours: &[Behaviour],
    beliefs: &[Belief],
) -> SimResult<Vec<Agent>> {
    let h_index = behaviour_index(behaviours);
    let b_index = belief_index(beliefs);
    let a_index: HashMap<Uuid, AgentId> = specs
        .iter()
        .enumerate()
        .map(|(i, s)| (s.uuid, AgentId(i as u32)))
        .collect();

    specs
        .iter()
        .map(|spec| {
            let actions = spec
                .actions
                .iter()
                .map(|uuid| {
                    h_index.get(uuid).copied().ok_or_else(|| {
                        SimError::InputFormat(format!(
                            "agent {} references unknown behaviour {uuid} in actions",
                            spec.uuid
                        ))
                    })
                })
                .collect::<SimResult<Vec<BehaviourId>>>()?;

            let activations = spec
                .activations
                .iter()
                .map(|row| {
                    let mut dense = vec![0.0; beliefs.len()];
                    for (uuid, value) in row {
                        let id = b_index.get(uuid).ok_or_else(|| {
                            SimError::InputFormat(format!(
                                "agent {} references unknown belief {uuid} in activations",
                                spec.uuid
                            ))
                        })?;
                        dense[id.index()] = *value;
                    }
                    Ok(dense)
                })
                .collect::<SimResult<Vec<Vec<f64>>>>()?;

            let mut deltas = vec![0.0; beliefs.len()];
            for (uuid, value) in &spec.deltas {
                let id = b_index.get(uuid).ok_or_else(|| {
                    SimError::InputFormat(format!(
                        "agent {} references unknown belief {uuid} in deltas",
                        spec.uuid
                    ))
                })?;
                deltas[id.index()] = *value;
            }

            let mut performance_relationships = vec![vec![0.0; behaviours.len()]; beliefs.len()];
            for (belief_uuid, row) in &spec.performance_relationships {
                let belief_id = b_index.get(belief_uuid).ok_or_else(|| {
                    SimError::InputFormat(format!(
                        "agent {} references unknown belief {belief_uuid} in performance_relationships",
                        spec.uuid
                    ))
                })?;
                for (behaviour_uuid, value) in row {
                    let behaviour_id = h_index.get(behaviour_uuid).ok_or_else(|| {
                        SimError::InputFormat(format!(
                            "agent {} references unknown behaviour {behaviour_uuid} in performance_relationships",
                            spec.uuid
                        ))
                    })?;
                    performance_relationships[belief_id.index()][behaviour_id.index()] = *value;
                }
            }

            let friends = spec
                .friends
                .iter()
                .map(|(uuid, &weight)| {
                    a_index
                        .get(uuid)
                        .copied()
                        .map(|id| (id, weight))
                        .ok_or_else(|| {
                            SimError::InputFormat(format!(
                                "agent {} references unknown agent {uuid} as a friend",
                                spec.uuid
                            ))
                        })
                })
                .collect::<SimResult<Vec<(AgentId, f64)>>>()?;

            Ok(Agent::new_with_uuid(
                spec.uuid,
                activations,
                actions,
                friends,
                deltas,
                performance_relationships,
            ))
        })
        .collect()
}

/// `output.json.zst` entry in summary mode, one per simulated day: the
/// five per-belief/per-behaviour tables from [`DaySummary`], expanded
/// back out to UUID keys.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SummarySpec {
    pub mean_activations: HashMap<Uuid, f64>,
    pub sd_activations: HashMap<Uuid, f64>,
    pub median_activations: HashMap<Uuid, f64>,
    pub nonzero_activations: HashMap<Uuid, usize>,
    pub n_performers: HashMap<Uuid, usize>,
}

impl SummarySpec {
    pub fn from_day_summary(
        summary: &DaySummary,
        beliefs: &[Belief],
        behaviours: &[Behaviour],
    ) -> Self {
        let by_belief_f64 = |values: &[f64]| -> HashMap<Uuid, f64> {
            beliefs
                .iter()
                .zip(values)
                .map(|(b, &v)| (b.uuid(), v))
                .collect()
        };
        let by_belief_usize = |values: &[usize]| -> HashMap<Uuid, usize> {
            beliefs
                .iter()
                .zip(values)
                .map(|(b, &v)| (b.uuid(), v))
                .collect()
        };

        Self {
            mean_activations: by_belief_f64(&summary.mean_activations),
            sd_activations: by_belief_f64(&summary.sd_activations),
            median_activations: by_belief_f64(&summary.median_activations),
            nonzero_activations: by_belief_usize(&summary.nonzero_activations),
            n_performers: behaviours
                .iter()
                .zip(&summary.n_performers)
                .map(|(h, &v)| (h.uuid(), v))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaviour_spec_round_trips_through_json() {
        let json_str = r#"{"name": "post", "uuid": "98f4a478-7deb-40ef-9cb5-0f893c7a7f45"}"#;
        let spec: BehaviourSpec = serde_json::from_str(json_str).unwrap();
        assert_eq!(spec.name, "post");
        let behaviour = spec.to_behaviour();
        assert_eq!(behaviour.name(), "post");
        assert_eq!(
            BehaviourSpec::from_behaviour(&behaviour).uuid,
            behaviour.uuid()
        );
    }

    #[test]
    fn behaviour_spec_defaults_missing_uuid() {
        let json_str = r#"{"name": "post"}"#;
        let spec: BehaviourSpec = serde_json::from_str(json_str).unwrap();
        assert_ne!(spec.uuid, Uuid::nil());
    }

    #[test]
    fn load_beliefs_densifies_sparse_relationships() {
        let behaviours = vec![Behaviour::new("h1"), Behaviour::new("h2")];
        let b1 = Uuid::from_u128(1);
        let b2 = Uuid::from_u128(2);
        let specs = vec![
            BeliefSpec {
                name: "b1".to_string(),
                uuid: b1,
                relationships: HashMap::from([(b2, 0.5)]),
                perceptions: HashMap::from([(behaviours[1].uuid(), -1.0)]),
            },
            BeliefSpec {
                name: "b2".to_string(),
                uuid: b2,
                relationships: HashMap::new(),
                perceptions: HashMap::new(),
            },
        ];
        let beliefs = load_beliefs(&specs, &behaviours).unwrap();
        assert_eq!(beliefs[0].relationship(BeliefId(1)), 0.5);
        assert_eq!(beliefs[0].relationship(BeliefId(0)), 0.0);
        assert_eq!(beliefs[0].perception(BehaviourId(1)), -1.0);
    }

    #[test]
    fn load_beliefs_rejects_an_unresolved_relationship() {
        let specs = vec![BeliefSpec {
            name: "b1".to_string(),
            uuid: Uuid::from_u128(1),
            relationships: HashMap::from([(Uuid::from_u128(99), 1.0)]),
            perceptions: HashMap::new(),
        }];
        assert!(load_beliefs(&specs, &[]).is_err());
    }

    #[test]
    fn load_agents_resolves_friend_references() {
        let behaviours = vec![Behaviour::new("h1")];
        let beliefs = vec![Belief::new("b1", vec![0.0], vec![0.0])];
        let a1 = Uuid::from_u128(1);
        let a2 = Uuid::from_u128(2);
        let specs = vec![
            AgentSpec {
                uuid: a1,
                actions: vec![behaviours[0].uuid()],
                activations: vec![HashMap::from([(beliefs[0].uuid(), 0.3)])],
                deltas: HashMap::from([(beliefs[0].uuid(), 1.0)]),
                friends: HashMap::from([(a2, 0.5)]),
                performance_relationships: HashMap::new(),
            },
            AgentSpec {
                uuid: a2,
                actions: vec![behaviours[0].uuid()],
                activations: vec![HashMap::from([(beliefs[0].uuid(), 0.1)])],
                deltas: HashMap::from([(beliefs[0].uuid(), 1.0)]),
                friends: HashMap::new(),
                performance_relationships: HashMap::new(),
            },
        ];
        let agents = load_agents(&specs, &behaviours, &beliefs).unwrap();
        assert_eq!(agents[0].friends(), &[(AgentId(1), 0.5)]);
        assert_eq!(agents[0].activations_for_day(0)[0], 0.3);
    }

    #[test]
    fn load_agents_rejects_an_unresolved_friend() {
        let behaviours = vec![Behaviour::new("h1")];
        let beliefs = vec![Belief::new("b1", vec![0.0], vec![0.0])];
        let specs = vec![AgentSpec {
            uuid: Uuid::from_u128(1),
            actions: vec![behaviours[0].uuid()],
            activations: vec![HashMap::new()],
            deltas: HashMap::new(),
            friends: HashMap::from([(Uuid::from_u128(99), 1.0)]),
            performance_relationships: HashMap::new(),
        }];
        assert!(load_agents(&specs, &behaviours, &beliefs).is_err());
    }
}
