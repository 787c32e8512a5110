/// Identity map for one seeding run
///
/// Steps record the ids the database generated for them; later steps look
/// those ids up to fill in their foreign keys. Users are keyed by email, the
/// other seeded entities are singletons keyed by kind.
///
/// A map lives for exactly one run and is passed explicitly to every step.

use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Logical key of a seeded row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    /// A user, by email
    User(String),
    Organization,
    Venue,
    Event,
    VendorProfile,
    VolunteerProfile,
}

impl IdentityKey {
    pub fn user(email: impl Into<String>) -> Self {
        IdentityKey::User(email.into())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::User(email) => write!(f, "user {}", email),
            IdentityKey::Organization => f.write_str("organization"),
            IdentityKey::Venue => f.write_str("venue"),
            IdentityKey::Event => f.write_str("event"),
            IdentityKey::VendorProfile => f.write_str("vendor profile"),
            IdentityKey::VolunteerProfile => f.write_str("volunteer profile"),
        }
    }
}

/// A step needed an id that no earlier step recorded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No id recorded for {0}")]
pub struct MissingIdentity(pub IdentityKey);

#[derive(Debug, Default)]
pub struct IdentityMap {
    ids: HashMap<IdentityKey, Uuid>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` under `key`, returning the id it replaced
    pub fn record(&mut self, key: IdentityKey, id: Uuid) -> Option<Uuid> {
        self.ids.insert(key, id)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<Uuid> {
        self.ids.get(key).copied()
    }

    /// Looks up `key`, failing if it was never recorded
    pub fn require(&self, key: IdentityKey) -> Result<Uuid, MissingIdentity> {
        self.get(&key).ok_or(MissingIdentity(key))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_require() {
        let mut map = IdentityMap::new();
        let id = Uuid::new_v4();

        assert_eq!(map.record(IdentityKey::user("organizer@planner.ai"), id), None);
        assert_eq!(map.require(IdentityKey::user("organizer@planner.ai")), Ok(id));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_require_missing_key() {
        let map = IdentityMap::new();

        let err = map.require(IdentityKey::Event).unwrap_err();
        assert_eq!(err, MissingIdentity(IdentityKey::Event));
        assert_eq!(err.to_string(), "No id recorded for event");
    }

    #[test]
    fn test_user_keys_are_exact() {
        let mut map = IdentityMap::new();
        map.record(IdentityKey::user("vendor@planner.ai"), Uuid::new_v4());

        assert!(map.get(&IdentityKey::user("Vendor@planner.ai")).is_none());
    }
}
