mod error;
pub mod matcher;
mod ranker;
mod record;
mod store;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMethod {
    Recent,
    Frequent,
    Frecent,
}

/// Minimum best-segment similarity a record needs to be considered a candidate
pub const SIMILARITY_THRESHOLD: f64 = 50.0;

pub use crate::error::{FrecencyError, FrecencyResult};
pub use crate::ranker::{Candidate, Ranker};
pub use crate::record::{DirectoryRecord, sorted};
pub use crate::store::{HistoryStore, HomeDotfile, STORE_FILE_NAME, StoreLocation};
