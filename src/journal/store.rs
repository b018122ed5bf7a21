//! EntryStore - durable journal entry storage
//!
//! One pretty-printed JSON file per entry, named `<id>.json`, under the
//! store directory. An in-memory index (most-recent-first, thanks to
//! UUIDv7 ids) is rebuilt at open by scanning the directory; both the index
//! and the backing files are bounded by a fixed capacity, evicting oldest
//! first.

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::entry::JournalEntry;

pub struct EntryStore {
    dir: PathBuf,
    capacity: usize,
    /// Most-recent-first
    entries: Vec<JournalEntry>,
}

impl EntryStore {
    /// Open (or create) a store, rebuilding the index from disk.
    ///
    /// Unparseable files are skipped with a warning; entries beyond capacity
    /// are evicted immediately.
    pub fn open(dir: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create journal directory")?;

        let mut entries = Vec::new();
        for dirent in fs::read_dir(&dir).context("Failed to scan journal directory")? {
            let path = dirent?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match fs::read_to_string(&path).map_err(eyre::Report::from).and_then(|content| {
                    serde_json::from_str::<JournalEntry>(&content).map_err(eyre::Report::from)
                }) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!(path = %path.display(), error = %e, "open: skipping unreadable entry"),
                }
            }
        }

        entries.sort_by(|a, b| b.id.cmp(&a.id));
        let mut store = Self { dir, capacity, entries };
        while store.entries.len() > store.capacity {
            store.evict_oldest();
        }

        debug!(dir = %store.dir.display(), count = store.entries.len(), "open: journal index rebuilt");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, most-recent-first
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The `count` most recent entries (callers check bounds first)
    pub fn recent(&self, count: usize) -> &[JournalEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// Persist a new entry and prepend it to the index, evicting past capacity
    pub fn push(&mut self, entry: JournalEntry) -> Result<()> {
        let path = self.entry_path(&entry.id);
        let json = serde_json::to_string_pretty(&entry).context("Failed to serialize journal entry")?;
        fs::write(&path, json).context(format!("Failed to write journal entry {}", path.display()))?;

        debug!(id = %entry.id, files = entry.files.len(), "push: entry persisted");
        self.entries.insert(0, entry);
        while self.entries.len() > self.capacity {
            self.evict_oldest();
        }
        Ok(())
    }

    /// Remove specific entries (after a restore), oldest-to-newest, deleting
    /// their backing files.
    pub fn remove(&mut self, ids: &[String]) {
        let mut ordered: Vec<&String> = ids.iter().collect();
        ordered.sort();
        for id in ordered {
            self.delete_backing(id);
        }
        self.entries.retain(|e| !ids.contains(&e.id));
    }

    /// Delete everything; returns the number of entries removed
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        for entry in std::mem::take(&mut self.entries) {
            self.delete_backing(&entry.id);
        }
        info!(count, "clear: journal emptied");
        count
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.entries.pop() {
            debug!(id = %oldest.id, "evict_oldest: capacity reached");
            self.delete_backing(&oldest.id);
        }
    }

    /// Best-effort delete of an entry's backing file
    fn delete_backing(&self, id: &str) {
        let path = self.entry_path(id);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "delete_backing: failed, ignoring");
            }
        }
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("dir", &self.dir)
            .field("capacity", &self.capacity)
            .field("entries", &self.entries.len())
            .finish()
    }
}
