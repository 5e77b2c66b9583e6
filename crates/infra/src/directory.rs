use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use forgestore_core::{AddressId, DomainError, DomainResult, UserId};

/// Stand-in for the external address store.
///
/// The composer's only question to that collaborator is "does this address
/// exist for this user?" — address contents, validation and CRUD live
/// upstream and are out of scope here. Deployments wire a real client with
/// the same surface; tests and dev seed this in-memory one.
#[derive(Debug, Default)]
pub struct AddressDirectory {
    addresses: RwLock<HashMap<UserId, HashSet<AddressId>>>,
}

impl AddressDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: UserId, address_id: AddressId) -> DomainResult<()> {
        self.addresses
            .write()
            .map_err(|_| DomainError::internal("address lock poisoned"))?
            .entry(user_id)
            .or_default()
            .insert(address_id);
        Ok(())
    }

    pub fn contains(&self, user_id: UserId, address_id: AddressId) -> DomainResult<bool> {
        Ok(self
            .addresses
            .read()
            .map_err(|_| DomainError::internal("address lock poisoned"))?
            .get(&user_id)
            .is_some_and(|set| set.contains(&address_id)))
    }

    pub fn require(&self, user_id: UserId, address_id: AddressId) -> DomainResult<()> {
        if self.contains(user_id, address_id)? {
            Ok(())
        } else {
            Err(DomainError::not_found("address"))
        }
    }
}
