// src/signup/view.rs

use super::registry::SignupRegistry;
use super::{GroupDirectory, SignupError};
use serenity::model::id::UserId;

/// Point-in-time projection of who is signed up where. Recomputed on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSnapshot {
    pub entries: Vec<SlotMembers>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMembers {
    pub label: String,
    pub members: Vec<UserId>,
}

impl MembershipSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Projects the registry plus live membership into a snapshot, in registry
/// order. A slot whose role was deleted out-of-band is left out of the view
/// rather than erroring; the registry itself is corrected by the next
/// reconciliation, not here.
pub async fn build_snapshot(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
) -> Result<MembershipSnapshot, SignupError> {
    let mut entries = Vec::with_capacity(registry.len());
    for (label, tag) in registry.all() {
        if let Some(members) = directory.members_of(tag).await? {
            entries.push(SlotMembers {
                label: label.to_string(),
                members,
            });
        }
    }
    Ok(MembershipSnapshot { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::testutil::{MemoryStore, MockDirectory};
    use serenity::model::id::RoleId;

    #[tokio::test]
    async fn reports_members_per_slot_in_registry_order() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("9", RoleId::new(109), &store).unwrap();
        registry.open("22", RoleId::new(122), &store).unwrap();

        let directory = MockDirectory::with_groups(vec![("9h", 109), ("22h", 122)]);
        let alice = UserId::new(1);
        directory.insert_member(RoleId::new(109), alice);

        let snapshot = build_snapshot(&registry, &directory).await.unwrap();

        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].label, "9");
        assert_eq!(snapshot.entries[0].members, vec![alice]);
        assert_eq!(snapshot.entries[1].label, "22");
        assert!(snapshot.entries[1].members.is_empty());
    }

    #[tokio::test]
    async fn slot_with_deleted_role_is_skipped_not_an_error() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("9", RoleId::new(109), &store).unwrap();
        registry.open("22", RoleId::new(122), &store).unwrap();

        // only 22h still exists
        let directory = MockDirectory::with_groups(vec![("22h", 122)]);

        let snapshot = build_snapshot(&registry, &directory).await.unwrap();

        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].label, "22");
    }
}
