// src/signup/toggle.rs

use super::registry::SignupRegistry;
use super::{GroupDirectory, SignupError};
use rand::seq::SliceRandom;
use serenity::model::id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Joined,
    Left,
}

/// Flips one user's membership in one slot. A signed-up user leaves, anyone
/// else joins; there is no third state. If the backing role is gone the
/// error is reported and no mutation is performed.
pub async fn toggle(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
    user: UserId,
    label: &str,
) -> Result<ToggleOutcome, SignupError> {
    let tag = registry
        .get(label)
        .ok_or_else(|| SignupError::UnknownSlot(label.to_string()))?;
    let members = directory
        .members_of(tag)
        .await?
        .ok_or_else(|| SignupError::SlotGroupMissing(label.to_string()))?;

    if members.contains(&user) {
        directory.remove_member(tag, user).await?;
        Ok(ToggleOutcome::Left)
    } else {
        directory.add_member(tag, user).await?;
        Ok(ToggleOutcome::Joined)
    }
}

/// Signs a user up for a slot. Returns `false` without mutating when the
/// user already holds the role.
pub async fn join(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
    user: UserId,
    label: &str,
) -> Result<bool, SignupError> {
    let tag = registry
        .get(label)
        .ok_or_else(|| SignupError::UnknownSlot(label.to_string()))?;
    let members = directory
        .members_of(tag)
        .await?
        .ok_or_else(|| SignupError::SlotGroupMissing(label.to_string()))?;

    if members.contains(&user) {
        return Ok(false);
    }
    directory.add_member(tag, user).await?;
    Ok(true)
}

/// Withdraws a user from a slot. Returns `false` without mutating when the
/// user was not signed up.
pub async fn leave(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
    user: UserId,
    label: &str,
) -> Result<bool, SignupError> {
    let tag = registry
        .get(label)
        .ok_or_else(|| SignupError::UnknownSlot(label.to_string()))?;
    let members = directory
        .members_of(tag)
        .await?
        .ok_or_else(|| SignupError::SlotGroupMissing(label.to_string()))?;

    if !members.contains(&user) {
        return Ok(false);
    }
    directory.remove_member(tag, user).await?;
    Ok(true)
}

/// Withdraws everyone from every slot. Slots whose role is gone are skipped.
/// Returns how many memberships were removed.
pub async fn clear_all(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
) -> Result<usize, SignupError> {
    let mut removed = 0;
    for (_, tag) in registry.all() {
        let Some(members) = directory.members_of(tag).await? else {
            continue;
        };
        for user in members {
            directory.remove_member(tag, user).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Picks one signed-up member of a slot at random, `None` when nobody is
/// signed up.
pub async fn pick(
    registry: &SignupRegistry,
    directory: &impl GroupDirectory,
    label: &str,
) -> Result<Option<UserId>, SignupError> {
    let tag = registry
        .get(label)
        .ok_or_else(|| SignupError::UnknownSlot(label.to_string()))?;
    let members = directory
        .members_of(tag)
        .await?
        .ok_or_else(|| SignupError::SlotGroupMissing(label.to_string()))?;
    Ok(members.choose(&mut rand::thread_rng()).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::testutil::{MemoryStore, MockDirectory};
    use serenity::model::id::RoleId;

    fn fixture() -> (SignupRegistry, MockDirectory) {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", RoleId::new(121), &store).unwrap();
        let directory = MockDirectory::with_groups(vec![("21h", 121)]);
        (registry, directory)
    }

    #[tokio::test]
    async fn toggle_on_untagged_user_adds_membership() {
        let (registry, directory) = fixture();
        let user = UserId::new(7);

        let outcome = toggle(&registry, &directory, user, "21").await.unwrap();

        assert_eq!(outcome, ToggleOutcome::Joined);
        let members = directory.members_of(RoleId::new(121)).await.unwrap().unwrap();
        assert_eq!(members, vec![user]);
    }

    #[tokio::test]
    async fn toggle_on_tagged_user_removes_membership() {
        let (registry, directory) = fixture();
        let user = UserId::new(7);
        directory.insert_member(RoleId::new(121), user);

        let outcome = toggle(&registry, &directory, user, "21").await.unwrap();

        assert_eq!(outcome, ToggleOutcome::Left);
        let members = directory.members_of(RoleId::new(121)).await.unwrap().unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn toggle_against_missing_role_mutates_nothing() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", RoleId::new(121), &store).unwrap();
        let directory = MockDirectory::new(); // no roles at all

        let err = toggle(&registry, &directory, UserId::new(7), "21")
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::SlotGroupMissing(ref l) if l == "21"));
        assert!(directory.members.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_on_unknown_slot_errors() {
        let (registry, directory) = fixture();

        let err = toggle(&registry, &directory, UserId::new(7), "5")
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::UnknownSlot(ref l) if l == "5"));
    }

    #[tokio::test]
    async fn join_is_a_noop_when_already_signed_up() {
        let (registry, directory) = fixture();
        let user = UserId::new(7);
        directory.insert_member(RoleId::new(121), user);

        assert!(!join(&registry, &directory, user, "21").await.unwrap());
        let members = directory.members_of(RoleId::new(121)).await.unwrap().unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn leave_is_a_noop_when_not_signed_up() {
        let (registry, directory) = fixture();

        assert!(!leave(&registry, &directory, UserId::new(7), "21")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn clear_all_empties_every_slot() {
        let store = MemoryStore::new();
        let mut registry = SignupRegistry::default();
        registry.open("21", RoleId::new(121), &store).unwrap();
        registry.open("22", RoleId::new(122), &store).unwrap();
        let directory = MockDirectory::with_groups(vec![("21h", 121), ("22h", 122)]);
        directory.insert_member(RoleId::new(121), UserId::new(1));
        directory.insert_member(RoleId::new(121), UserId::new(2));
        directory.insert_member(RoleId::new(122), UserId::new(3));

        let removed = clear_all(&registry, &directory).await.unwrap();

        assert_eq!(removed, 3);
        for tag in [RoleId::new(121), RoleId::new(122)] {
            assert!(directory.members_of(tag).await.unwrap().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn pick_of_empty_slot_is_none() {
        let (registry, directory) = fixture();
        assert!(pick(&registry, &directory, "21").await.unwrap().is_none());
    }
}
