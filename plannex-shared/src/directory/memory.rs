/// In-memory user store
///
/// Backs directory and router tests without a database. A single `RwLock`
/// guards the table, so a search sees one consistent snapshot.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{StoreError, UserStore};
use crate::models::user::{UpdateUser, User};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn matches_term(user: &User, term: &str) -> bool {
    let term = term.to_lowercase();
    user.email.to_lowercase().contains(&term) || user.full_name.to_lowercase().contains(&term)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn search(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let users = self.users.read().await;

        let mut matching: Vec<&User> = users
            .values()
            .filter(|u| search.map_or(true, |term| matches_term(u, term)))
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let page = matching.into_iter().skip(skip).take(take).cloned().collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            patch.apply_to(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Duration;

    fn user(email: &str, name: &str, age_minutes: i64) -> User {
        let created_at = Utc::now() - Duration::minutes(age_minutes);
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: name.to_string(),
            role: UserRole::Volunteer,
            password_hash: "hash".to_string(),
            is_active: true,
            avatar_url: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_search_orders_newest_first() {
        let store = MemoryUserStore::with_users([
            user("old@planner.ai", "Old", 30),
            user("new@planner.ai", "New", 1),
            user("mid@planner.ai", "Mid", 10),
        ]);

        let (page, total) = store.search(None, 10, 0).await.unwrap();
        let emails: Vec<_> = page.iter().map(|u| u.email.as_str()).collect();

        assert_eq!(total, 3);
        assert_eq!(emails, ["new@planner.ai", "mid@planner.ai", "old@planner.ai"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let store = MemoryUserStore::with_users([
            user("a%b@planner.ai", "Percent", 1),
            user("ab@planner.ai", "Plain", 2),
        ]);

        let (page, total) = store.search(Some("a%b"), 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].full_name, "Percent");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_user() {
        let store = MemoryUserStore::new();

        assert!(store
            .update(Uuid::new_v4(), UpdateUser::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
        assert!(store.is_empty().await);
    }
}
