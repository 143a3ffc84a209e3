// src/signup/reconcile.rs

use super::registry::{SignupRegistry, SlotStore};
use super::{GroupDirectory, SignupError};
use serenity::model::id::RoleId;
use std::collections::BTreeMap;

/// Roles named `<hour>h` back signup slots.
pub const SLOT_ROLE_SUFFIX: &str = "h";

/// Extracts the hour from a role name following the slot convention.
/// `"21h"` -> `Some(21)`; anything else, including `"0h"`, is not a slot.
pub fn slot_number(name: &str) -> Option<u64> {
    let digits = name.strip_suffix(SLOT_ROLE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = digits.parse().ok()?;
    (n > 0).then_some(n)
}

/// Rebuilds the registry from the role list, the external source of truth
/// for which slots exist. Runs at startup to recover from drift (e.g. a
/// crash between creating a role and persisting the registry).
///
/// Roles that do not match the naming convention are skipped. Two roles
/// claiming the same hour resolve last-write-wins in enumeration order. The
/// result is sorted ascending by hour and persisted; running this twice with
/// no external change produces byte-identical documents. If the role listing
/// fails, nothing is touched and the previous state stays in force.
pub async fn reconcile(
    directory: &impl GroupDirectory,
    store: &impl SlotStore,
) -> Result<SignupRegistry, SignupError> {
    let groups = directory.list_groups().await?;

    let mut candidates: BTreeMap<u64, RoleId> = BTreeMap::new();
    for (name, tag) in groups {
        if let Some(hour) = slot_number(&name) {
            candidates.insert(hour, tag);
        }
    }

    let registry = SignupRegistry::from_pairs(
        candidates
            .into_iter()
            .map(|(hour, tag)| (hour.to_string(), tag)),
    );
    registry.save(store)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::testutil::{MemoryStore, MockDirectory};

    #[test]
    fn slot_number_follows_the_naming_convention() {
        assert_eq!(slot_number("21h"), Some(21));
        assert_eq!(slot_number("5h"), Some(5));
        assert_eq!(slot_number("0h"), None);
        assert_eq!(slot_number("h"), None);
        assert_eq!(slot_number("21"), None);
        assert_eq!(slot_number("moderator"), None);
        assert_eq!(slot_number("2 1h"), None);
        assert_eq!(slot_number("-3h"), None);
    }

    #[tokio::test]
    async fn sorts_ascending_and_later_duplicate_wins() {
        let directory =
            MockDirectory::with_groups(vec![("5h", 50), ("5h", 51), ("3h", 30)]);
        let store = MemoryStore::new();

        let registry = reconcile(&directory, &store).await.unwrap();

        let slots: Vec<(&str, u64)> = registry.all().map(|(l, t)| (l, t.get())).collect();
        assert_eq!(slots, vec![("3", 30), ("5", 51)]);
    }

    #[tokio::test]
    async fn skips_roles_outside_the_convention() {
        let directory = MockDirectory::with_groups(vec![
            ("moderator", 1),
            ("21h", 21021),
            ("12hr", 2),
            ("h", 3),
        ]);
        let store = MemoryStore::new();

        let registry = reconcile(&directory, &store).await.unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("21").unwrap().get(), 21021);
    }

    #[tokio::test]
    async fn is_idempotent_down_to_the_persisted_bytes() {
        let directory =
            MockDirectory::with_groups(vec![("22h", 122), ("9h", 109), ("15h", 115)]);
        let store = MemoryStore::new();

        reconcile(&directory, &store).await.unwrap();
        let first = store.contents().unwrap();
        reconcile(&directory, &store).await.unwrap();
        let second = store.contents().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn listing_failure_leaves_previous_state_untouched() {
        let mut directory = MockDirectory::with_groups(vec![("21h", 121)]);
        directory.fail_listing = true;
        let store = MemoryStore::seeded(br#"{"9": 109}"#);

        let err = reconcile(&directory, &store).await.unwrap_err();

        assert!(matches!(err, SignupError::ExternalSystemUnavailable(_)));
        assert_eq!(store.contents().unwrap(), br#"{"9": 109}"#.to_vec());
        let registry = SignupRegistry::load(&store);
        assert_eq!(registry.get("9").unwrap().get(), 109);
    }
}
