//! Turns a query into a directory.
//!
//! Real directories always win: an absolute path, or a path relative to the
//! working directory, that exists is taken as-is (with `.` and `..` folded
//! away, symlinks left alone). Anything else is matched
//! against the history one path component at a time, so `docs` can find
//! `/home/user/Documents` through its last segment.

use super::*;
use crate::error::{FrecencyError, FrecencyResult};
use crate::matcher::similarity;
use crate::record::DirectoryRecord;
use crate::store::HistoryStore;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};
use tracing::debug;

/// A stored record together with its best-segment similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: DirectoryRecord,
    pub similarity: f64,
}

#[derive(Debug)]
pub struct Ranker {
    store: HistoryStore,
    working_dir: Option<PathBuf>,
}

impl Ranker {
    /// Resolve relative queries against the process working directory
    pub fn new(store: HistoryStore) -> Self {
        Ranker {
            store,
            working_dir: None,
        }
    }

    /// Resolve relative queries against `dir` instead of the process working directory
    pub fn with_working_dir(store: HistoryStore, dir: impl Into<PathBuf>) -> Self {
        Ranker {
            store,
            working_dir: Some(dir.into()),
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Find the best directory for `query` and log the visit
    pub fn resolve(&self, query: &str) -> FrecencyResult<PathBuf> {
        if let Some(dir) = self.existing_dir(query) {
            debug!("{} is a directory, skipping history", dir.display());
            self.record_dir(&dir)?;
            return Ok(dir);
        }

        let winner = self.best_match(query)?;
        self.store.record(&winner.record.path)?;
        debug!(
            "resolved '{}' to {} ({:.2}%)",
            query, winner.record.path, winner.similarity
        );
        Ok(PathBuf::from(winner.record.path))
    }

    /// Same answer as [`Ranker::resolve`] without touching the history
    pub fn query(&self, query: &str) -> FrecencyResult<PathBuf> {
        if let Some(dir) = self.existing_dir(query) {
            return Ok(dir);
        }
        self.best_match(query)
            .map(|winner| PathBuf::from(winner.record.path))
    }

    /// Log a visit to an existing directory. History keys are UTF-8, so other names are refused.
    pub fn record_dir(&self, dir: &Path) -> FrecencyResult<DirectoryRecord> {
        let key = dir.to_str().ok_or_else(|| FrecencyError::NonUtf8Path {
            path: dir.to_path_buf(),
        })?;
        self.store.record(key)
    }

    /// Every stored record that clears the threshold, best first
    pub fn candidates(&self, query: &str) -> FrecencyResult<Vec<Candidate>> {
        let mut candidates = score_records(query, self.store.load()?);
        candidates.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| b.record.count.cmp(&a.record.count))
        });
        Ok(candidates)
    }

    fn best_match(&self, query: &str) -> FrecencyResult<Candidate> {
        let records = self.store.load()?;
        if records.is_empty() {
            debug!("history is empty");
            return Err(not_found(query));
        }
        select_winner(score_records(query, records)).ok_or_else(|| not_found(query))
    }

    /// Absolute form of `query` if it names an existing directory
    pub fn existing_dir(&self, query: &str) -> Option<PathBuf> {
        if query.is_empty() {
            return None;
        }

        let path = Path::new(query);
        let candidate = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let base = match &self.working_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().ok()?,
            };
            base.join(path)
        };
        let candidate = normalize(&candidate);

        candidate.is_dir().then_some(candidate)
    }
}

/// Fold `.` and `..` out of `path` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut normalized, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    // `..` at the root stays at the root
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
            normalized
        })
}

fn not_found(query: &str) -> FrecencyError {
    FrecencyError::NotFound {
        query: query.to_string(),
    }
}

/// Highest similarity between `query` and any component of `path`, ignoring case
pub(crate) fn best_segment_similarity(query: &str, path: &str) -> f64 {
    let query = query.to_lowercase();
    path.split(MAIN_SEPARATOR)
        .map(|segment| similarity(&segment.to_lowercase(), &query))
        .fold(0.0, f64::max)
}

fn qualifies(similarity: f64) -> bool {
    similarity >= SIMILARITY_THRESHOLD
}

pub(crate) fn score_records(query: &str, records: Vec<DirectoryRecord>) -> Vec<Candidate> {
    records
        .into_iter()
        .filter_map(|record| {
            let similarity = best_segment_similarity(query, &record.path);
            qualifies(similarity).then_some(Candidate { record, similarity })
        })
        .collect()
}

/// Keep the first candidate unless a later one scores strictly higher, or
/// scores the same with strictly more visits.
pub(crate) fn select_winner(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut candidates = candidates.into_iter();
    let mut best = candidates.next()?;
    for candidate in candidates {
        let higher = candidate.similarity > best.similarity;
        let tied_but_busier = candidate.similarity == best.similarity
            && candidate.record.count > best.record.count;
        if higher || tied_but_busier {
            best = candidate;
        }
    }
    Some(best)
}
