//! Flat-file credential store
//!
//! Users live in a single JSON array. Every mutation rewrites the whole file,
//! so writes are serialized through an async mutex and land via a temp-file
//! rename.

use super::password::{hash_password, verify_password};
use super::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// User record as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User model safe for client responses (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserPublic {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Credential store backed by a JSON file
pub struct UserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a new user
    pub async fn create(&self, name: &str, email: &str, password: &str) -> Result<UserPublic, AuthError> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.load().await?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateUser);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;

        let user = StoredUser {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.save(&users).await?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user.into())
    }

    /// Check credentials.
    ///
    /// Unknown email still pays for a hash verification and both failure
    /// paths return [`AuthError::InvalidCredentials`].
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserPublic, AuthError> {
        let user = self.load().await?.into_iter().find(|u| u.email == email);

        let phc = match &user {
            Some(u) => u.password_hash.clone(),
            None => dummy_hash().to_string(),
        };
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?;

        match user {
            Some(u) if matches => Ok(u.into()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserPublic>, AuthError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|u| u.email == email)
            .map(UserPublic::from))
    }

    /// All registered users, in signup order
    pub async fn list(&self) -> Result<Vec<UserPublic>, AuthError> {
        Ok(self.load().await?.into_iter().map(UserPublic::from).collect())
    }

    async fn load(&self) -> Result<Vec<StoredUser>, AuthError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(Vec::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, users: &[StoredUser]) -> Result<(), AuthError> {
        let data = serde_json::to_vec_pretty(users)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Stand-in hash verified against when the email is unknown
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("dummy-password-for-timing").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> UserStore {
        let path = std::env::temp_dir().join(format!("users-{}.json", Uuid::new_v4()));
        UserStore::new(path)
    }

    #[tokio::test]
    async fn test_create_then_verify() {
        let store = temp_store();
        let created = store.create("Alice", "a@x.com", "secret1").await.unwrap();
        let verified = store.verify("a@x.com", "secret1").await.unwrap();

        assert_eq!(created, verified);
        assert_eq!(verified.name, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = temp_store();
        store.create("Alice", "a@x.com", "secret1").await.unwrap();

        let result = store.create("Alice Again", "a@x.com", "other-password").await;
        assert!(matches!(result, Err(AuthError::DuplicateUser)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_identical() {
        let store = temp_store();
        store.create("Alice", "a@x.com", "secret1").await.unwrap();

        let wrong_password = store.verify("a@x.com", "nope").await.unwrap_err();
        let unknown_email = store.verify("b@x.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_plaintext_never_persisted() {
        let store = temp_store();
        store.create("Alice", "a@x.com", "hunter22").await.unwrap();

        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert!(!raw.contains("hunter22"));
        assert!(raw.contains("passwordHash"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = temp_store();
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_signups_both_persist() {
        let store = std::sync::Arc::new(temp_store());
        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.create("A", "a@x.com", "secret1").await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.create("B", "b@x.com", "secret2").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
