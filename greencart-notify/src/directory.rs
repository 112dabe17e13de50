//! Recipient directory
//!
//! The dispatcher looks recipients up through [`RecipientDirectory`] on every
//! call and never caches the result. [`InMemoryDirectory`] is the bundled
//! implementation; it can be seeded from a JSON file exported by the user
//! database.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dispatch::{Recipient, RecipientRef};

/// Source of recipient records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Look up a recipient, returning `None` if it does not exist.
    async fn resolve(&self, recipient: &RecipientRef) -> Option<Recipient>;
}

/// Errors raised while loading a directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The file could not be read.
    #[error("failed to read recipient file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON array of recipients.
    #[error("invalid recipient data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records share an identifier.
    #[error("duplicate recipient id: {0}")]
    DuplicateId(RecipientRef),
}

/// Directory held in memory.
///
/// `Key` refs match either a string id or, case-insensitively, a contact
/// address.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    recipients: RwLock<HashMap<RecipientRef, Recipient>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from recipient records.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateId` if two records share an id.
    pub fn from_recipients(
        recipients: impl IntoIterator<Item = Recipient>,
    ) -> Result<Self, DirectoryError> {
        let mut map = HashMap::new();
        for recipient in recipients {
            if map.contains_key(&recipient.id) {
                return Err(DirectoryError::DuplicateId(recipient.id));
            }
            map.insert(recipient.id.clone(), recipient);
        }
        Ok(Self {
            recipients: RwLock::new(map),
        })
    }

    /// Parse a JSON array of recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or ids repeat.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let recipients: Vec<Recipient> = serde_json::from_str(json)?;
        Self::from_recipients(recipients)
    }

    /// Load a JSON array of recipients from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), recipients = directory.len(), "loaded recipient directory");
        Ok(directory)
    }

    /// Insert or replace a recipient.
    pub fn insert(&self, recipient: Recipient) {
        self.recipients
            .write()
            .insert(recipient.id.clone(), recipient);
    }

    /// Remove a recipient, returning it if present.
    pub fn remove(&self, recipient: &RecipientRef) -> Option<Recipient> {
        self.recipients.write().remove(recipient)
    }

    /// Number of recipients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipients.read().len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.read().is_empty()
    }

    fn lookup(&self, recipient: &RecipientRef) -> Option<Recipient> {
        let recipients = self.recipients.read();
        if let Some(found) = recipients.get(recipient) {
            return Some(found.clone());
        }

        match recipient {
            RecipientRef::Id(_) => None,
            RecipientRef::Key(key) => key
                .parse::<i64>()
                .ok()
                .and_then(|id| recipients.get(&RecipientRef::Id(id)))
                .or_else(|| {
                    recipients
                        .values()
                        .find(|r| r.address.eq_ignore_ascii_case(key))
                })
                .cloned(),
        }
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryDirectory {
    async fn resolve(&self, recipient: &RecipientRef) -> Option<Recipient> {
        self.lookup(recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RECIPIENTS: &str = r#"[
        {"id": 42, "display_name": "Jane", "address": "Jane@Example.com", "verified": true},
        {"id": "u-7", "address": "seven@example.com", "verification_token": "abc"}
    ]"#;

    #[tokio::test]
    async fn test_resolve_by_id_and_key() {
        let directory = InMemoryDirectory::from_json_str(RECIPIENTS).unwrap();

        let jane = directory.resolve(&RecipientRef::Id(42)).await.unwrap();
        assert_eq!(jane.display_name.as_deref(), Some("Jane"));
        assert!(jane.verified);

        let seven = directory.resolve(&RecipientRef::from("u-7")).await.unwrap();
        assert_eq!(seven.verification_token.as_deref(), Some("abc"));

        assert!(directory.resolve(&RecipientRef::Id(7)).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_by_address_ignores_case() {
        let directory = InMemoryDirectory::from_json_str(RECIPIENTS).unwrap();

        let jane = directory
            .resolve(&RecipientRef::from("jane@example.com"))
            .await
            .unwrap();
        assert_eq!(jane.id, RecipientRef::Id(42));
    }

    #[tokio::test]
    async fn test_numeric_key_resolves_by_id() {
        let directory = InMemoryDirectory::from_json_str(RECIPIENTS).unwrap();

        let jane = directory.resolve(&RecipientRef::from("42")).await.unwrap();
        assert_eq!(jane.id, RecipientRef::Id(42));
        assert!(directory.resolve(&RecipientRef::from("7")).await.is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = InMemoryDirectory::from_recipients([
            Recipient::new(1, "a@example.com"),
            Recipient::new(1, "b@example.com"),
        ]);
        assert!(matches!(result, Err(DirectoryError::DuplicateId(RecipientRef::Id(1)))));
    }

    #[test]
    fn test_insert_and_remove() {
        let directory = InMemoryDirectory::new();
        assert!(directory.is_empty());

        directory.insert(Recipient::new(1, "a@example.com"));
        assert_eq!(directory.len(), 1);

        assert!(directory.remove(&RecipientRef::Id(1)).is_some());
        assert!(directory.is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RECIPIENTS.as_bytes()).unwrap();

        let directory = InMemoryDirectory::from_json_file(file.path()).unwrap();
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = InMemoryDirectory::from_json_file("/nonexistent/recipients.json");
        assert!(matches!(result, Err(DirectoryError::Io { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = InMemoryDirectory::from_json_str(r#"{"id": 1}"#);
        assert!(matches!(result, Err(DirectoryError::Parse(_))));
    }
}
