//! Per-item proficiency tracking with pluggable persistence.
//!
//! Every `(category, tag)` pair owns a small mastery record: correct and
//! wrong counters plus a level in `0..=5` that moves up one step per correct
//! answer and down one step per wrong answer. All records live in a single
//! JSON mapping stored under [`PROFICIENCY_NAMESPACE`] in a [`KeyValueStore`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Category;

/// Store key under which the whole proficiency mapping is kept.
pub const PROFICIENCY_NAMESPACE: &str = "web-proficiency";

/// Highest mastery level.
pub const MAX_LEVEL: u8 = 5;

/// Mastery state of one quiz item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyRecord {
    pub correct: u32,
    pub wrong: u32,
    pub level: u8,
}

impl ProficiencyRecord {
    /// Apply one grading outcome.
    pub fn apply(&mut self, outcome: bool) {
        if outcome {
            self.correct = self.correct.saturating_add(1);
            self.level = self.level.saturating_add(1).min(MAX_LEVEL);
        } else {
            self.wrong = self.wrong.saturating_add(1);
            self.level = self.level.saturating_sub(1);
        }
    }

    pub fn attempts(&self) -> u32 {
        self.correct.saturating_add(self.wrong)
    }

    fn clamped(mut self) -> Self {
        self.level = self.level.min(MAX_LEVEL);
        self
    }
}

/// Persisted key for an item: `"<category>|<tag>"`.
pub fn proficiency_key(category: Category, tag: &str) -> String {
    format!("{category}|{tag}")
}

/// Split a persisted key back into its category and tag.
///
/// Keys written by other tools may carry an unknown category; the category is
/// then `None` and the tag is whatever follows the first `|`.
pub fn split_key(key: &str) -> (Option<Category>, &str) {
    match key.split_once('|') {
        Some((category, tag)) => (category.parse().ok(), tag),
        None => (None, key),
    }
}

// ---------------------------------------------------------------------------
// Key-value stores
// ---------------------------------------------------------------------------

/// A process-wide string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one key.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: each key is a `<key>.json` file.
///
/// Writes go to a temporary file that is renamed over the target, so a crash
/// mid-write never leaves a truncated mapping behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read store file {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create store dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

type ProficiencyMap = BTreeMap<String, ProficiencyRecord>;

/// Read a counter the way the stored mapping was written: numbers, numeric
/// strings, anything else as zero. Negative values read as zero.
fn lenient_count(value: Option<&Value>) -> u64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n.floor() as u64
    } else {
        0
    }
}

/// Decode a stored mapping. Corrupt input degrades to an empty mapping.
fn decode(raw: &str) -> ProficiencyMap {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("stored proficiency mapping is corrupt, starting empty: {e}");
            return ProficiencyMap::new();
        }
    };
    let Value::Object(entries) = value else {
        tracing::warn!("stored proficiency mapping is not an object, starting empty");
        return ProficiencyMap::new();
    };

    entries
        .into_iter()
        .map(|(key, rec)| {
            let record = ProficiencyRecord {
                correct: lenient_count(rec.get("correct")).min(u32::MAX as u64) as u32,
                wrong: lenient_count(rec.get("wrong")).min(u32::MAX as u64) as u32,
                level: lenient_count(rec.get("level")).min(MAX_LEVEL as u64) as u8,
            };
            (key, record)
        })
        .collect()
}

/// One stored proficiency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyEntry {
    /// Persisted key, `"<category>|<tag>"`.
    pub key: String,
    pub category: Option<Category>,
    pub tag: String,
    pub record: ProficiencyRecord,
}

/// Tracks mastery per `(category, tag)` and persists it on every update.
pub struct ProficiencyTracker {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<ProficiencyMap>,
}

impl ProficiencyTracker {
    /// Open a tracker over `store`, loading the current mapping.
    ///
    /// A failing or corrupt store yields an empty mapping.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let map = match store.get(PROFICIENCY_NAMESPACE) {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => ProficiencyMap::new(),
            Err(e) => {
                tracing::warn!("failed to load proficiency store: {e:#}");
                ProficiencyMap::new()
            }
        };
        tracing::debug!(entries = map.len(), "proficiency loaded");
        Self {
            store,
            state: Mutex::new(map),
        }
    }

    /// An in-memory tracker with no prior history.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    /// The record for an item, or a zero record if it was never graded.
    pub fn get(&self, category: Category, tag: &str) -> ProficiencyRecord {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .get(&proficiency_key(category, tag))
            .copied()
            .unwrap_or_default()
            .clamped()
    }

    /// Record one grading outcome and persist the whole mapping.
    ///
    /// The reload, update and write happen under one lock, so rapid or
    /// concurrent calls never lose an update.
    pub fn record(&self, category: Category, tag: &str, outcome: bool) -> Result<ProficiencyRecord> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut map = match self.store.get(PROFICIENCY_NAMESPACE)? {
            Some(raw) => decode(&raw),
            None => ProficiencyMap::new(),
        };
        let entry = map.entry(proficiency_key(category, tag)).or_default();
        entry.apply(outcome);
        let updated = *entry;

        let json = serde_json::to_string(&map).context("failed to serialize proficiency")?;
        self.store.set(PROFICIENCY_NAMESPACE, &json)?;
        *state = map;

        tracing::debug!(%category, tag, outcome, level = updated.level, "proficiency recorded");
        Ok(updated)
    }

    /// All stored entries, in key order.
    pub fn snapshot(&self) -> Vec<ProficiencyEntry> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .iter()
            .map(|(key, record)| {
                let (category, tag) = split_key(key);
                ProficiencyEntry {
                    key: key.clone(),
                    category,
                    tag: tag.to_string(),
                    record: record.clamped(),
                }
            })
            .collect()
    }
}
