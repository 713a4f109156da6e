use uuid::Uuid;

use crate::named::Identity;

/// An externally observable action type. Immutable once the run starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Behaviour {
    identity: Identity,
}

impl Behaviour {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(name),
        }
    }

    pub fn new_with_uuid(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            identity: Identity::new_with_uuid(name, uuid),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.identity.uuid()
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_distinct_uuids() {
        let a = Behaviour::new("post");
        let b = Behaviour::new("post");
        assert_ne!(a.uuid(), b.uuid());
        assert_eq!(a.name(), "post");
    }

    #[test]
    fn new_with_uuid_keeps_the_given_uuid() {
        let uuid = Uuid::new_v4();
        let b = Behaviour::new_with_uuid("share", uuid);
        assert_eq!(b.uuid(), uuid);
        assert_eq!(b.name(), "share");
    }
}
