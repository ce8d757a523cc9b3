//! User record operations.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

use crate::cache::keys::{self, Page};
use crate::cache::ResponseCache;
use crate::client::AuthenticatedRequestExecutor;
use crate::config::CacheConfig;
use crate::error::SdkResult;

/// Single and batch CRUD over `/users`, with read-through caching.
#[derive(Debug)]
pub struct UserResource {
    executor: Arc<AuthenticatedRequestExecutor>,
    cache: Arc<ResponseCache>,
    base_url: String,
    ttl: Duration,
    invalidate_on_write: bool,
    canonical_batch_keys: bool,
}

impl UserResource {
    pub fn new(
        executor: Arc<AuthenticatedRequestExecutor>,
        cache: Arc<ResponseCache>,
        base_url: impl Into<String>,
        config: &CacheConfig,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            executor,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl: Duration::from_millis(config.ttl_ms),
            invalidate_on_write: config.invalidate_on_write,
            canonical_batch_keys: config.canonical_batch_keys,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: impl Display) -> String {
        format!("{}/users/{}", self.base_url, id)
    }

    fn batch_url(&self) -> String {
        format!("{}/users/batch", self.base_url)
    }

    /// `GET /users/{id}`, cached under `users_{id}`.
    pub async fn get_user_by_id(&self, id: impl Display) -> SdkResult<Value> {
        let key = keys::user_key(&id);
        self.read_through(key, Method::GET, self.user_url(id), None)
            .await
    }

    /// `POST /users`.
    pub async fn create_user(&self, user: Value) -> SdkResult<Value> {
        let created = self
            .executor
            .execute_json(Method::POST, &self.users_url(), Some(user))
            .await?;
        self.invalidate_lists();
        Ok(created)
    }

    /// `PUT /users/{id}`.
    pub async fn update_user(&self, id: impl Display, user: Value) -> SdkResult<Value> {
        let id = id.to_string();
        let updated = self
            .executor
            .execute_json(Method::PUT, &self.user_url(&id), Some(user))
            .await?;
        self.invalidate_users([id.as_str()]);
        Ok(updated)
    }

    /// `DELETE /users/{id}`.
    pub async fn delete_user(&self, id: impl Display) -> SdkResult<Value> {
        let id = id.to_string();
        let deleted = self
            .executor
            .execute_json(Method::DELETE, &self.user_url(&id), None)
            .await?;
        self.invalidate_users([id.as_str()]);
        Ok(deleted)
    }

    /// `GET /users`, optionally paginated. Each page/limit pair is cached
    /// separately; the unpaginated list is cached under `users_all`.
    pub async fn get_users(&self, page: Option<Page>) -> SdkResult<Value> {
        let url = match page {
            Some(p) => format!("{}{}", self.users_url(), p.query()),
            None => self.users_url(),
        };
        self.read_through(keys::list_key(page), Method::GET, url, None)
            .await
    }

    /// `POST /users/batch` with `{userIds}`.
    pub async fn get_users_batch<T>(&self, ids: &[T]) -> SdkResult<Value>
    where
        T: Display + Serialize,
    {
        let key = keys::batch_key(ids, self.canonical_batch_keys);
        self.read_through(
            key,
            Method::POST,
            self.batch_url(),
            Some(json!({ "userIds": ids })),
        )
        .await
    }

    /// `PUT /users/batch` with `{usersToUpdate}`.
    pub async fn update_users_batch(&self, users: Vec<Value>) -> SdkResult<Value> {
        let ids: Option<Vec<String>> = users.iter().map(record_id).collect();
        let updated = self
            .executor
            .execute_json(
                Method::PUT,
                &self.batch_url(),
                Some(json!({ "usersToUpdate": users })),
            )
            .await?;

        match ids {
            Some(ids) => self.invalidate_users(ids.iter().map(String::as_str)),
            // Records without an id could be anyone.
            None if self.invalidate_on_write => {
                let removed = self.cache.invalidate_where(keys::is_user_scoped);
                tracing::debug!(removed, "Invalidated all user cache entries");
            }
            None => {}
        }
        Ok(updated)
    }

    /// `DELETE /users/batch` with `{userIds}`.
    pub async fn delete_users_batch<T>(&self, ids: &[T]) -> SdkResult<Value>
    where
        T: Display + Serialize,
    {
        let deleted = self
            .executor
            .execute_json(
                Method::DELETE,
                &self.batch_url(),
                Some(json!({ "userIds": ids })),
            )
            .await?;
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.invalidate_users(ids.iter().map(String::as_str));
        Ok(deleted)
    }

    async fn read_through(
        &self,
        key: String,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> SdkResult<Value> {
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let data = self.executor.execute_json(method, &url, body).await?;
        self.cache.set_if_generation(key, data.clone(), self.ttl, generation);
        Ok(data)
    }

    fn invalidate_lists(&self) {
        if !self.invalidate_on_write {
            return;
        }
        let removed = self.cache.invalidate_where(keys::is_list_key);
        tracing::debug!(removed, "Invalidated cached user lists");
    }

    fn invalidate_users<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        if !self.invalidate_on_write {
            return;
        }
        let ids: Vec<&str> = ids.into_iter().collect();
        let removed = self.cache.invalidate_where(|key| {
            keys::is_list_key(key) || ids.iter().any(|id| keys::key_references_user(key, id))
        });
        tracing::debug!(users = ids.len(), removed, "Invalidated cached user reads");
    }
}

/// The `id` of a user record, as it appears in cache keys.
fn record_id(user: &Value) -> Option<String> {
    match user.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&json!({"id": 7, "name": "a"})).as_deref(), Some("7"));
        assert_eq!(record_id(&json!({"id": "u-1"})).as_deref(), Some("u-1"));
        assert_eq!(record_id(&json!({"name": "a"})), None);
        assert_eq!(record_id(&json!({"id": null})), None);
    }
}
