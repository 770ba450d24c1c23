use crate::error::{FrecencyError, FrecencyResult};
use crate::record::DirectoryRecord;
use chrono::Utc;
use nix::fcntl::{FlockArg, flock};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Name of the history file placed in the home directory
pub const STORE_FILE_NAME: &str = ".fzfoxide";

/// Tells the store where its history file lives
pub trait StoreLocation {
    fn store_path(&self) -> FrecencyResult<PathBuf>;
}

/// `~/.fzfoxide`
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeDotfile;

impl StoreLocation for HomeDotfile {
    fn store_path(&self) -> FrecencyResult<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(STORE_FILE_NAME))
            .ok_or(FrecencyError::HomeDirUnavailable)
    }
}

impl StoreLocation for PathBuf {
    fn store_path(&self) -> FrecencyResult<PathBuf> {
        Ok(self.clone())
    }
}

/// Flat JSON file holding every visited directory.
///
/// Nothing is cached: each call reads the file as it is on disk right now.
/// Mutations go through [`HistoryStore::record`] and
/// [`HistoryStore::remove_missing`], which hold an exclusive `flock` on a
/// sidecar `.lock` file for the whole load-modify-save sequence. Saves write a
/// temporary file next to the store and rename it into place.
pub struct HistoryStore {
    location: Box<dyn StoreLocation>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        HistoryStore::new(HomeDotfile)
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.location.store_path().ok())
            .finish()
    }
}

impl HistoryStore {
    pub fn new(location: impl StoreLocation + 'static) -> Self {
        HistoryStore {
            location: Box::new(location),
        }
    }

    /// Resolve the path of the history file
    pub fn path(&self) -> FrecencyResult<PathBuf> {
        self.location.store_path()
    }

    /// Read every record. A missing file is an empty history.
    pub fn load(&self) -> FrecencyResult<Vec<DirectoryRecord>> {
        let path = self.path()?;
        read_records(&path)
    }

    /// Replace the stored history with `records`
    pub fn save(&self, records: &[DirectoryRecord]) -> FrecencyResult<()> {
        let path = self.path()?;
        write_records(&path, records)
    }

    /// Log a visit to `dir`, creating its record on first sight
    pub fn record(&self, dir: &str) -> FrecencyResult<DirectoryRecord> {
        self.locked(|path| {
            let mut records = read_records(path)?;
            let now = Utc::now();

            let updated = match records.iter_mut().find(|r| r.path == dir) {
                Some(record) => {
                    record.visit(now);
                    record.clone()
                }
                None => {
                    let record = DirectoryRecord::new(dir, now);
                    records.push(record.clone());
                    record
                }
            };

            write_records(path, &records)?;
            debug!("recorded {} (count {})", updated.path, updated.count);
            Ok(updated)
        })
    }

    /// Drop every record for which `exists` returns false and return the dropped ones
    pub fn remove_missing<F>(&self, exists: F) -> FrecencyResult<Vec<DirectoryRecord>>
    where
        F: Fn(&Path) -> bool,
    {
        self.locked(|path| {
            let records = read_records(path)?;
            let (kept, removed): (Vec<_>, Vec<_>) = records
                .into_iter()
                .partition(|r| exists(Path::new(&r.path)));

            if !removed.is_empty() {
                write_records(path, &kept)?;
            }
            debug!("removed {} missing directories", removed.len());
            Ok(removed)
        })
    }

    fn locked<T>(&self, f: impl FnOnce(&Path) -> FrecencyResult<T>) -> FrecencyResult<T> {
        let path = self.path()?;
        ensure_parent(&path)?;

        let lock_path = lock_path(&path);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| FrecencyError::io("open lock", &lock_path, e))?;
        flock(lock_file.as_raw_fd(), FlockArg::LockExclusive).map_err(|source| {
            FrecencyError::Lock {
                path: lock_path.clone(),
                source,
            }
        })?;

        // the lock is released when `lock_file` is closed
        let result = f(&path);
        drop(lock_file);
        result
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_parent(path: &Path) -> FrecencyResult<()> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|e| FrecencyError::io("create directory", parent, e))
}

fn read_records(path: &Path) -> FrecencyResult<Vec<DirectoryRecord>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no history at {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(FrecencyError::io("read", path, e)),
    };

    serde_json::from_str(&data).map_err(|source| FrecencyError::Format {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records(path: &Path, records: &[DirectoryRecord]) -> FrecencyResult<()> {
    ensure_parent(path)?;
    let tmp = NamedTempFile::new_in(parent_dir(path))
        .map_err(|e| FrecencyError::io("create temporary file", parent_dir(path), e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| FrecencyError::io("write", tmp.path(), e.into()))?;
        writer
            .flush()
            .map_err(|e| FrecencyError::io("write", tmp.path(), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| FrecencyError::io("sync", tmp.path(), e))?;

    tmp.persist(path)
        .map_err(|e| FrecencyError::io("rename", path, e.error))?;
    debug!("saved {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn temp_store() -> (TempDir, HistoryStore) {
        let dir = TempDir::new().expect("create temp dir");
        let store = HistoryStore::new(dir.path().join(STORE_FILE_NAME));
        (dir, store)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        init();
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        init();
        let (_dir, store) = temp_store();
        let now = Utc::now();
        let mut documents = DirectoryRecord::new("/home/user/Documents", now);
        documents.count = 2;
        let downloads = DirectoryRecord::new("/home/user/Downloads", now);

        store.save(&[documents.clone(), downloads.clone()]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![documents, downloads]);
    }

    #[test]
    fn test_save_overwrites() {
        init();
        let (_dir, store) = temp_store();
        let now = Utc::now();
        store
            .save(&[
                DirectoryRecord::new("/a", now),
                DirectoryRecord::new("/b", now),
            ])
            .unwrap();
        store.save(&[DirectoryRecord::new("/c", now)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].path, "/c");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        init();
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nested/deeper/history"));
        store.record("/tmp").unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_record_first_visit() {
        init();
        let (_dir, store) = temp_store();
        let record = store.record("/home/user/Documents").unwrap();
        assert_eq!(record.count, 1);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].path, "/home/user/Documents");
        assert_eq!(loaded[0].count, 1);
    }

    #[test]
    fn test_record_twice_increments() {
        init();
        let (_dir, store) = temp_store();
        let first = store.record("/home/user/Documents").unwrap();
        let second = store.record("/home/user/Documents").unwrap();

        assert_eq!(second.count, 2);
        assert!(second.last_accessed >= first.last_accessed);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].count, 2);
    }

    #[test]
    fn test_record_keeps_paths_unique() {
        init();
        let (_dir, store) = temp_store();
        let visits = ["/a", "/b", "/a", "/c", "/b", "/a"];
        for path in visits {
            store.record(path).unwrap();
        }

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        let count_of = |p: &str| loaded.iter().find(|r| r.path == p).unwrap().count;
        assert_eq!(count_of("/a"), 3);
        assert_eq!(count_of("/b"), 2);
        assert_eq!(count_of("/c"), 1);
    }

    #[test]
    fn test_malformed_store_is_format_error() {
        init();
        let (_dir, store) = temp_store();
        fs::write(store.path().unwrap(), "not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, FrecencyError::Format { .. }), "got {err:?}");

        let err = store.record("/tmp").unwrap_err();
        assert!(matches!(err, FrecencyError::Format { .. }), "got {err:?}");
        assert_eq!(fs::read_to_string(store.path().unwrap()).unwrap(), "not json");
    }

    #[test]
    fn test_unreadable_store_is_io_error() {
        init();
        let (dir, _) = temp_store();
        // a directory where the file should be
        let store = HistoryStore::new(dir.path().to_path_buf());
        let err = store.load().unwrap_err();
        assert!(matches!(err, FrecencyError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_remove_missing() {
        init();
        let (_dir, store) = temp_store();
        for path in ["/keep/one", "/gone", "/keep/two"] {
            store.record(path).unwrap();
        }

        let removed = store
            .remove_missing(|p| p.starts_with("/keep"))
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].path, "/gone");

        let paths: Vec<_> = store.load().unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/keep/one", "/keep/two"]);
    }

    #[test]
    fn test_lock_path() {
        assert_eq!(
            lock_path(Path::new("/home/user/.fzfoxide")),
            PathBuf::from("/home/user/.fzfoxide.lock")
        );
    }
}
