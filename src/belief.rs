use uuid::Uuid;

use crate::arena::{BehaviourId, BeliefId};
use crate::named::Identity;

/// An internal disposition that influences action choice and other
/// beliefs. Immutable once the run starts.
///
/// `relationships` and `perceptions` are dense vectors indexed by the
/// arena index of the other belief / the behaviour, one entry per entity
/// in the run, rather than the original's `shared_ptr`-keyed maps; a
/// mutable per-belief mapping indexed inside a hot loop is better served
/// by a dense vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Belief {
    identity: Identity,
    relationships: Vec<f64>,
    perceptions: Vec<f64>,
}

impl Belief {
    /// Create a belief with dense relationship/perception tables already
    /// sized to the run's belief/behaviour counts.
    pub fn new(
        name: impl Into<String>,
        relationships: Vec<f64>,
        perceptions: Vec<f64>,
    ) -> Self {
        Self {
            identity: Identity::new(name),
            relationships,
            perceptions,
        }
    }

    pub fn new_with_uuid(
        name: impl Into<String>,
        uuid: Uuid,
        relationships: Vec<f64>,
        perceptions: Vec<f64>,
    ) -> Self {
        Self {
            identity: Identity::new_with_uuid(name, uuid),
            relationships,
            perceptions,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.identity.uuid()
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// How much holding this belief pulls toward `other`. 1.0 is neutral,
    /// <1 negative, >1 positive. Returns 0.0 for an out-of-range index;
    /// this only happens for a hand-built `Belief` that under-sizes its
    /// table, since `Configuration::validate` rejects it otherwise.
    pub fn relationship(&self, other: BeliefId) -> f64 {
        self.relationships.get(other.index()).copied().unwrap_or(0.0)
    }

    pub fn relationships(&self) -> &[f64] {
        &self.relationships
    }

    /// How strongly observing `behaviour` can be attributed to this
    /// belief, in `[-1, +1]`. See [`Belief::relationship`] for the
    /// out-of-range behaviour.
    pub fn perception(&self, behaviour: BehaviourId) -> f64 {
        self.perceptions.get(behaviour.index()).copied().unwrap_or(0.0)
    }

    pub fn perceptions(&self) -> &[f64] {
        &self.perceptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_and_perception_are_total() {
        let b = Belief::new("b1", vec![1.0, 0.5], vec![-1.0, 1.0]);
        assert_eq!(b.relationship(BeliefId(0)), 1.0);
        assert_eq!(b.relationship(BeliefId(1)), 0.5);
        assert_eq!(b.perception(BehaviourId(1)), 1.0);
    }

    #[test]
    fn absent_entries_return_neutral_zero() {
        let b = Belief::new("b1", vec![1.0], vec![]);
        assert_eq!(b.relationship(BeliefId(5)), 0.0);
        assert_eq!(b.perception(BehaviourId(0)), 0.0);
    }
}
