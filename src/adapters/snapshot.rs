use crate::adapters::memory::{InMemoryInbox, InMemoryStore};
use crate::domain::model::{Actor, Answer, Question, StoredNotification};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the engine touches, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub notifications: Vec<StoredNotification>,
}

impl Snapshot {
    pub fn into_stores(self) -> (InMemoryStore, InMemoryInbox) {
        let store = InMemoryStore::new();
        for actor in self.actors {
            store.put_actor(actor);
        }
        for question in self.questions {
            store.put_question(question);
        }
        for answer in self.answers {
            store.put_answer(answer);
        }
        (store, InMemoryInbox::with_entries(self.notifications))
    }

    pub async fn capture(store: &InMemoryStore, inbox: &InMemoryInbox) -> Self {
        Self {
            actors: store.actors(),
            questions: store.questions(),
            answers: store.answers(),
            notifications: inbox.all().await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty snapshot.
    pub fn read(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            tracing::debug!("No state file at {}, starting empty", self.path.display());
            return Ok(Snapshot::default());
        }

        let data = fs::read(&self.path)?;
        let snapshot = serde_json::from_slice(&data)?;
        Ok(snapshot)
    }

    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(snapshot)?;
        tracing::debug!("Writing state ({} bytes) to {}", data.len(), self.path.display());
        fs::write(&self.path, data)?;
        Ok(())
    }
}
