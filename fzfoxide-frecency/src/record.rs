use super::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Half life used when decaying visit counts for [`SortMethod::Frecent`]
pub(crate) const HALF_LIFE_SECS: f64 = 60.0 * 60.0 * 12.0;

/// A directory that has been visited at least once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub path: String,
    pub count: u32,
    pub last_accessed: DateTime<Utc>,
}

impl DirectoryRecord {
    /// Create a record for a first visit at `now`
    pub fn new(path: &str, now: DateTime<Utc>) -> DirectoryRecord {
        DirectoryRecord {
            path: path.to_string(),
            count: 1,
            last_accessed: now,
        }
    }

    /// Log another visit
    pub fn visit(&mut self, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    /// Number of seconds between the last visit and `now`
    pub fn secs_since_access(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.last_accessed);
        (elapsed.num_milliseconds().max(0) as f64) / 1000.0
    }

    /// Visit count decayed by the time passed since the last visit
    pub fn frecency(&self, now: DateTime<Utc>) -> f64 {
        self.count as f64 / 2.0f64.powf(self.secs_since_access(now) / HALF_LIFE_SECS)
    }

    /// Compare the score of two records given a sort method
    pub fn cmp_score(
        &self,
        other: &DirectoryRecord,
        method: SortMethod,
        now: DateTime<Utc>,
    ) -> Ordering {
        match method {
            SortMethod::Frequent => self.count.cmp(&other.count),
            SortMethod::Recent => self.last_accessed.cmp(&other.last_accessed),
            SortMethod::Frecent => self
                .frecency(now)
                .partial_cmp(&other.frecency(now))
                .unwrap_or(Ordering::Less),
        }
    }
}

/// Return a copy of `records`, best first according to `sort_method`
pub fn sorted(records: &[DirectoryRecord], sort_method: SortMethod) -> Vec<DirectoryRecord> {
    let now = Utc::now();
    let mut new_vec = records.to_vec();
    new_vec.sort_by(|a, b| a.cmp_score(b, sort_method, now).reverse());
    new_vec
}
