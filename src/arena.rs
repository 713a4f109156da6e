//! Dense index arenas for beliefs, behaviours, and agents.
//!
//! The original object graph links agents to beliefs/behaviours and to
//! each other through shared/weak pointers. Since no entity set changes
//! membership during a run, every such link is instead a stable `u32`
//! index into one of three arenas owned by the [`crate::Configuration`].
//! There is no ownership cycle to manage.

use std::fmt;

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_newtype!(BeliefId);
index_newtype!(BehaviourId);
index_newtype!(AgentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        let b = BeliefId(3);
        assert_eq!(b.index(), 3);
        assert_eq!(b.0, 3);
    }

    #[test]
    fn ordering_matches_numeric_value() {
        assert!(BehaviourId(1) < BehaviourId(2));
        assert_eq!(BehaviourId(1), BehaviourId(1));
    }
}
