use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::persist::write_json_atomic_async;

#[derive(Debug, Error)]
pub enum WaitlistError {
    #[error("{0}")]
    InvalidEmail(String),
    #[error("waitlist file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("waitlist file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type WaitlistResult<T> = Result<T, WaitlistError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaitlistEntry {
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined { position: usize },
    AlreadyExists { position: usize },
}

impl JoinOutcome {
    pub fn position(&self) -> usize {
        match self {
            JoinOutcome::Joined { position } | JoinOutcome::AlreadyExists { position } => *position,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WaitlistStats {
    pub total_subscribers: usize,
    pub latest_signup: Option<DateTime<Utc>>,
}

/// Trims and lowercases an email, rejecting obviously malformed input.
///
/// # Arguments
/// * `raw` - The email as submitted by the client
///
/// # Returns
/// * `WaitlistResult<String>` - The normalized email or `InvalidEmail`
pub fn normalize_email(raw: &str) -> WaitlistResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(WaitlistError::InvalidEmail("Email is required".to_string()));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(WaitlistError::InvalidEmail(
            "Invalid email format".to_string(),
        ));
    }
    Ok(email)
}

/// Waitlist backed by a single JSON file.
///
/// The entries are held in memory behind one mutex. A join keeps the lock
/// while it checks for duplicates, appends and rewrites the file, so two
/// concurrent joins can never overwrite each other's row.
#[derive(Clone)]
pub struct WaitlistStore {
    path: Arc<PathBuf>,
    entries: Arc<Mutex<Vec<WaitlistEntry>>>,
}

impl WaitlistStore {
    /// Opens the waitlist stored at `path`.
    ///
    /// A missing file is treated as an empty waitlist; it is created on the
    /// first successful join.
    ///
    /// # Arguments
    /// * `path` - Location of the waitlist JSON file
    ///
    /// # Returns
    /// * `WaitlistResult<Self>` - The loaded store or an I/O / parse error
    pub async fn open(path: impl Into<PathBuf>) -> WaitlistResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), subscribers = entries.len(), "Loaded waitlist");

        Ok(Self {
            path: Arc::new(path),
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds an email to the waitlist.
    ///
    /// # Arguments
    /// * `email` - The raw email; it is normalized before lookup
    ///
    /// # Returns
    /// * `WaitlistResult<JoinOutcome>` - The assigned position, or the
    ///   existing position when the email is already on the list
    pub async fn join(&self, email: &str) -> WaitlistResult<JoinOutcome> {
        let email = normalize_email(email)?;
        let mut entries = self.entries.lock().await;

        if let Some(existing) = entries.iter().find(|entry| entry.email == email) {
            debug!(email = %email, position = existing.position, "Email already on waitlist");
            return Ok(JoinOutcome::AlreadyExists {
                position: existing.position,
            });
        }

        let position = entries.len() + 1;
        entries.push(WaitlistEntry {
            email: email.clone(),
            timestamp: Utc::now(),
            position,
        });

        if let Err(e) = write_json_atomic_async(&self.path, &*entries).await {
            entries.pop();
            return Err(e.into());
        }

        info!(email = %email, position, "Added to waitlist");
        Ok(JoinOutcome::Joined { position })
    }

    pub async fn stats(&self) -> WaitlistStats {
        let entries = self.entries.lock().await;
        WaitlistStats {
            total_subscribers: entries.len(),
            latest_signup: entries.last().map(|entry| entry.timestamp),
        }
    }

    pub async fn entries(&self) -> Vec<WaitlistEntry> {
        self.entries.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, WaitlistStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WaitlistStore::open(dir.path().join("waitlist.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
    }

    #[test]
    fn normalize_rejects_empty_and_malformed() {
        assert!(matches!(normalize_email(""), Err(WaitlistError::InvalidEmail(msg)) if msg == "Email is required"));
        assert!(matches!(normalize_email("   "), Err(WaitlistError::InvalidEmail(_))));
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(WaitlistError::InvalidEmail(msg)) if msg == "Invalid email format"
        ));
        assert!(normalize_email("user@localhost").is_err());
        assert!(normalize_email("first.last").is_err());
    }

    #[tokio::test]
    async fn positions_follow_join_order() {
        let (_dir, store) = open_temp().await;

        assert_eq!(store.join("a@b.com").await.unwrap(), JoinOutcome::Joined { position: 1 });
        assert_eq!(store.join("c@d.com").await.unwrap(), JoinOutcome::Joined { position: 2 });

        let stats = store.stats().await;
        assert_eq!(stats.total_subscribers, 2);
        let entries = store.entries().await;
        assert_eq!(stats.latest_signup, Some(entries[1].timestamp));
    }

    #[tokio::test]
    async fn rejoining_keeps_original_position() {
        let (_dir, store) = open_temp().await;

        store.join("a@b.com").await.unwrap();
        store.join("c@d.com").await.unwrap();
        let outcome = store.join("  A@B.com ").await.unwrap();

        assert_eq!(outcome, JoinOutcome::AlreadyExists { position: 1 });
        assert_eq!(outcome.position(), 1);
        assert_eq!(store.entries().await.len(), 2);
    }

    #[tokio::test]
    async fn invalid_email_does_not_touch_file() {
        let (_dir, store) = open_temp().await;

        assert!(store.join("").await.is_err());
        assert!(store.join("not-an-email").await.is_err());

        assert!(!store.path().exists());
        assert_eq!(store.stats().await.total_subscribers, 0);
    }

    #[tokio::test]
    async fn empty_waitlist_has_no_latest_signup() {
        let (_dir, store) = open_temp().await;
        let stats = store.stats().await;
        assert_eq!(stats.total_subscribers, 0);
        assert_eq!(stats.latest_signup, None);
    }

    #[tokio::test]
    async fn reopening_reads_persisted_entries() {
        let (dir, store) = open_temp().await;
        store.join("a@b.com").await.unwrap();
        store.join("c@d.com").await.unwrap();

        let reopened = WaitlistStore::open(dir.path().join("waitlist.json"))
            .await
            .unwrap();
        assert_eq!(reopened.entries().await, store.entries().await);
        assert_eq!(
            reopened.join("e@f.com").await.unwrap(),
            JoinOutcome::Joined { position: 3 }
        );
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waitlist.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            WaitlistStore::open(&path).await,
            Err(WaitlistError::Json(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_joins_are_not_lost() {
        let (dir, store) = open_temp().await;

        let handles: Vec<_> = (0..25)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.join(&format!("user{i}@example.com")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut positions: Vec<usize> = store
            .entries()
            .await
            .iter()
            .map(|entry| entry.position)
            .collect();
        positions.sort_unstable();
        assert_eq!(positions, (1..=25).collect::<Vec<_>>());

        let content = std::fs::read_to_string(dir.path().join("waitlist.json")).unwrap();
        let on_disk: Vec<WaitlistEntry> = serde_json::from_str(&content).unwrap();
        assert_eq!(on_disk.len(), 25);
    }
}
