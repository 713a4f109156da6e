use uuid::Uuid;

/// Shared identity carried by every [`crate::Belief`] and
/// [`crate::Behaviour`]: a stable [`Uuid`] and a display name.
///
/// The original design used a polymorphic `UUIDd`/`Named` base class pair;
/// since nothing here needs dynamic dispatch, it is a plain value embedded
/// in each entity instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    uuid: Uuid,
    name: String,
}

impl Identity {
    /// Create a new identity with a randomly generated UUID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Create a new identity with an explicit UUID, as used when loading
    /// entities from an input document.
    pub fn new_with_uuid(name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
