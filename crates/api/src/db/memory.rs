//! In-memory stores for router tests.
//!
//! Mirrors the `PostgreSQL` behavior the handlers depend on: sequential ids,
//! unique username and email, items listed by id.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use atelier_core::{Email, ItemId, UserId};

use super::{ItemStore, RepositoryError, UniqueField, UserStore};
use crate::models::item::{Item, ItemFields, ItemPatch};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    next_user_id: i32,
    items: BTreeMap<ItemId, Item>,
    next_item_id: i32,
}

/// Credential store and item repository held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, as an administrator would outside the API.
    pub async fn remove_user(&self, username: &str) -> bool {
        let mut tables = self.tables.lock().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.username.as_str() != username);
        tables.users.len() != before
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser<'_>) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| &u.username == user.username) {
            return Err(RepositoryError::Conflict(UniqueField::Username));
        }
        if tables.users.iter().any(|u| &u.email == user.email) {
            return Err(RepositoryError::Conflict(UniqueField::Email));
        }

        tables.next_user_id += 1;
        let created = User {
            id: UserId::new(tables.next_user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.to_owned(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.items.values().cloned().collect())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.items.get(&id).cloned())
    }

    async fn insert(&self, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.next_item_id += 1;
        let item = fields.clone().into_item(ItemId::new(tables.next_item_id));
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn replace(
        &self,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.items.get_mut(&id).map(|item| {
            *item = fields.clone().into_item(id);
            item.clone()
        }))
    }

    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.items.get_mut(&id).map(|item| {
            *item = patch.apply(item.clone());
            item.clone()
        }))
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.items.remove(&id).is_some())
    }
}
