// src/signup/mod.rs
//
// Hour sign-up slots: a slot is a label like "21" backed by a guild role
// named "21h". The registry owns which slots exist; the guild role system
// owns who is signed up. Everything here talks to the two collaborator
// traits below so it stays testable without a gateway connection.

mod registry;
mod reconcile;
mod toggle;
mod view;

pub use registry::{FileStore, SignupRegistry, SlotStore};
pub use reconcile::{reconcile, slot_number, SLOT_ROLE_SUFFIX};
pub use toggle::{clear_all, join, leave, pick, toggle, ToggleOutcome};
pub use view::{build_snapshot, MembershipSnapshot, SlotMembers};

use async_trait::async_trait;
use serenity::model::id::{RoleId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("slot {0} is already registered")]
    DuplicateSlot(String),
    #[error("slot {0} is not registered")]
    UnknownSlot(String),
    #[error("the role backing slot {0} no longer exists")]
    SlotGroupMissing(String),
    #[error("external system unavailable: {0}")]
    ExternalSystemUnavailable(String),
}

impl From<serenity::Error> for SignupError {
    fn from(e: serenity::Error) -> Self {
        SignupError::ExternalSystemUnavailable(e.to_string())
    }
}

impl From<std::io::Error> for SignupError {
    fn from(e: std::io::Error) -> Self {
        SignupError::ExternalSystemUnavailable(e.to_string())
    }
}

/// The external group-membership system. The production implementation is
/// `discord::GuildDirectory`; tests substitute a mock.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<(String, RoleId)>, SignupError>;

    /// `Ok(None)` means the group no longer exists (deleted out-of-band).
    async fn members_of(&self, tag: RoleId) -> Result<Option<Vec<UserId>>, SignupError>;

    async fn add_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError>;

    async fn remove_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError>;

    async fn create_group(&self, name: &str) -> Result<RoleId, SignupError>;

    async fn delete_group(&self, tag: RoleId) -> Result<(), SignupError>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store for registry tests.
    #[derive(Default)]
    pub struct MemoryStore {
        doc: Mutex<Option<Vec<u8>>>,
        pub fail_writes: bool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seeded(bytes: &[u8]) -> Self {
            Self {
                doc: Mutex::new(Some(bytes.to_vec())),
                fail_writes: false,
            }
        }

        pub fn contents(&self) -> Option<Vec<u8>> {
            self.doc.lock().unwrap().clone()
        }
    }

    impl SlotStore for MemoryStore {
        fn read(&self) -> Result<Option<Vec<u8>>, SignupError> {
            Ok(self.doc.lock().unwrap().clone())
        }

        fn write(&self, bytes: &[u8]) -> Result<(), SignupError> {
            if self.fail_writes {
                return Err(SignupError::ExternalSystemUnavailable(
                    "write refused".into(),
                ));
            }
            *self.doc.lock().unwrap() = Some(bytes.to_vec());
            Ok(())
        }
    }

    /// Fake role system that records membership mutations.
    #[derive(Default)]
    pub struct MockDirectory {
        pub groups: Mutex<Vec<(String, RoleId)>>,
        pub members: Mutex<HashMap<RoleId, Vec<UserId>>>,
        pub fail_listing: bool,
    }

    impl MockDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_groups(groups: Vec<(&str, u64)>) -> Self {
            let dir = Self::default();
            for (name, id) in groups {
                let tag = RoleId::new(id);
                dir.groups.lock().unwrap().push((name.to_string(), tag));
                dir.members.lock().unwrap().entry(tag).or_default();
            }
            dir
        }

        pub fn insert_member(&self, tag: RoleId, user: UserId) {
            self.members.lock().unwrap().entry(tag).or_default().push(user);
        }
    }

    #[async_trait]
    impl GroupDirectory for MockDirectory {
        async fn list_groups(&self) -> Result<Vec<(String, RoleId)>, SignupError> {
            if self.fail_listing {
                return Err(SignupError::ExternalSystemUnavailable(
                    "listing refused".into(),
                ));
            }
            Ok(self.groups.lock().unwrap().clone())
        }

        async fn members_of(&self, tag: RoleId) -> Result<Option<Vec<UserId>>, SignupError> {
            Ok(self.members.lock().unwrap().get(&tag).cloned())
        }

        async fn add_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError> {
            let mut members = self.members.lock().unwrap();
            let list = members
                .get_mut(&tag)
                .ok_or_else(|| SignupError::SlotGroupMissing(tag.to_string()))?;
            if !list.contains(&user) {
                list.push(user);
            }
            Ok(())
        }

        async fn remove_member(&self, tag: RoleId, user: UserId) -> Result<(), SignupError> {
            let mut members = self.members.lock().unwrap();
            let list = members
                .get_mut(&tag)
                .ok_or_else(|| SignupError::SlotGroupMissing(tag.to_string()))?;
            list.retain(|u| *u != user);
            Ok(())
        }

        async fn create_group(&self, name: &str) -> Result<RoleId, SignupError> {
            let tag = RoleId::new(1000 + self.groups.lock().unwrap().len() as u64);
            self.groups.lock().unwrap().push((name.to_string(), tag));
            self.members.lock().unwrap().insert(tag, Vec::new());
            Ok(tag)
        }

        async fn delete_group(&self, tag: RoleId) -> Result<(), SignupError> {
            self.groups.lock().unwrap().retain(|(_, t)| *t != tag);
            self.members.lock().unwrap().remove(&tag);
            Ok(())
        }
    }
}
