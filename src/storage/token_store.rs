//! Token persistence backends.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use thiserror::Error;

use crate::auth::TokenState;

/// The three persisted entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenField {
    AccessToken,
    AccessTokenExpiry,
    RefreshToken,
}

impl TokenField {
    pub const ALL: [TokenField; 3] = [
        TokenField::AccessToken,
        TokenField::AccessTokenExpiry,
        TokenField::RefreshToken,
    ];

    /// Storage key name.
    pub fn key(self) -> &'static str {
        match self {
            TokenField::AccessToken => "accessToken",
            TokenField::AccessTokenExpiry => "tokenExpiry",
            TokenField::RefreshToken => "refreshToken",
        }
    }
}

/// Errors raised by a token store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable key/value persistence for token state.
///
/// Values are stored as opaque text. Missing keys load as absent fields;
/// an expiry that does not parse as an integer also loads as absent.
pub trait TokenStore: Send + Sync {
    /// Read all raw entries.
    fn entries(&self) -> Result<HashMap<&'static str, String>, StoreError>;

    /// Persist a single entry, replacing any previous value.
    fn save(&self, field: TokenField, value: &str) -> Result<(), StoreError>;

    /// Load the persisted token state.
    fn load(&self) -> Result<TokenState, StoreError> {
        let mut entries = self.entries()?;
        Ok(TokenState {
            access_token: entries.remove(TokenField::AccessToken.key()),
            access_token_expiry: entries
                .remove(TokenField::AccessTokenExpiry.key())
                .and_then(|raw| raw.trim().parse().ok()),
            refresh_token: entries.remove(TokenField::RefreshToken.key()),
        })
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: DashMap<&'static str, String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for a field, as persisted.
    pub fn get(&self, field: TokenField) -> Option<String> {
        self.inner.get(field.key()).map(|r| r.value().clone())
    }
}

impl TokenStore for MemoryTokenStore {
    fn entries(&self) -> Result<HashMap<&'static str, String>, StoreError> {
        Ok(self
            .inner
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect())
    }

    fn save(&self, field: TokenField, value: &str) -> Result<(), StoreError> {
        self.inner.insert(field.key(), value.to_string());
        Ok(())
    }
}

/// JSON file store that survives process restarts.
///
/// The whole file is rewritten on every save.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Sibling path the next write goes to before it replaces the token file.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn entries(&self) -> Result<HashMap<&'static str, String>, StoreError> {
        let mut raw = self.read_map()?;
        Ok(TokenField::ALL
            .iter()
            .filter_map(|field| raw.remove(field.key()).map(|v| (field.key(), v)))
            .collect())
    }

    fn save(&self, field: TokenField, value: &str) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut map = self.read_map()?;
        map.insert(field.key().to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Replace atomically via a sibling temp file.
        let tmp = self.temp_path();
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &map)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = ?self.path, key = field.key(), "Persisted token entry");
        Ok(())
    }
}
