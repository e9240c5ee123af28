//! ---
//! applog_section: "03-persistence-logging"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Append-only storage for accepted log messages."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::Result;

/// Handle to the append-only log file shared by all request handlers.
///
/// Cloning is cheap; every clone serialises appends through the same mutex,
/// so concurrent `append` calls never interleave their bytes within a
/// record. Reads take no lock and may observe the file anywhere between
/// "before" and "after" an in-flight append.
///
/// Messages are stored verbatim with a single `\n` terminator. A message
/// that itself contains newlines therefore blurs the one-line-one-record
/// convention on read; callers that need unambiguous boundaries must not
/// submit embedded newlines.
#[derive(Clone, Debug)]
pub struct LogStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl LogStore {
    /// Create a handle for the log file at `path`. No I/O is performed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                append_lock: Mutex::new(()),
            }),
        }
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Create the parent directory of the log path if it is missing.
    ///
    /// Idempotent; intended to run once at process start, where a failure is
    /// fatal before the listener binds.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Append one record (`message` plus a newline) to the log file.
    ///
    /// The open-write-close sequence runs under the append mutex, so two
    /// concurrent appends never interleave their byte ranges. The handle is
    /// released on every exit path. On error some bytes may already be on
    /// disk; the call still reports failure and nothing is retried.
    pub fn append(&self, message: &str) -> Result<()> {
        let mut record = Vec::with_capacity(message.len() + 1);
        record.extend_from_slice(message.as_bytes());
        record.push(b'\n');

        let _guard = self.inner.append_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(&record)?;
        debug!(path = %self.inner.path.display(), bytes = record.len(), "record appended");
        Ok(())
    }

    /// Read the entire log file as one string.
    ///
    /// A missing file is the defined empty case and yields an empty string;
    /// every other failure is surfaced to the caller.
    pub fn read_all(&self) -> Result<String> {
        match fs::read_to_string(&self.inner.path) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn append_then_read_preserves_sequential_order() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("app.log"));

        store.append("first").unwrap();
        store.append("second").unwrap();
        store.append("").unwrap();

        let contents = store.read_all().unwrap();
        assert_eq!(contents, "first\nsecond\n\n");
    }

    #[test]
    fn read_all_before_any_append_is_empty() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("app.log"));
        assert_eq!(store.read_all().unwrap(), "");
    }

    #[test]
    fn repeated_reads_without_appends_are_identical() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("app.log"));
        store.append("stable").unwrap();
        let first = store.read_all().unwrap();
        let second = store.read_all().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn embedded_newlines_are_stored_verbatim() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("app.log"));
        store.append("line one\nline two").unwrap();
        assert_eq!(store.read_all().unwrap(), "line one\nline two\n");
    }

    #[test]
    fn append_fails_when_parent_directory_is_missing() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("absent").join("app.log"));
        assert!(matches!(store.append("lost"), Err(crate::StoreError::Io(_))));
        assert_eq!(store.read_all().unwrap(), "");
    }

    #[test]
    fn ensure_parent_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("nested").join("app.log"));
        store.ensure_parent_dir().unwrap();
        store.ensure_parent_dir().unwrap();
        store.append("after mkdir").unwrap();
        assert_eq!(store.read_all().unwrap(), "after mkdir\n");
    }

    #[test]
    fn concurrent_appends_never_interleave_records() {
        const WRITERS: usize = 16;
        const RECORDS_PER_WRITER: usize = 32;

        let dir = tempdir().unwrap();
        let store = LogStore::new(dir.path().join("app.log"));

        let handles: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let store = store.clone();
                thread::spawn(move || {
                    for record in 0..RECORDS_PER_WRITER {
                        store
                            .append(&format!("writer-{writer}-record-{record}"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = store.read_all().unwrap();
        assert!(contents.ends_with('\n'));

        let mut seen: HashMap<String, usize> = HashMap::new();
        for line in contents.lines() {
            *seen.entry(line.to_owned()).or_default() += 1;
        }
        assert_eq!(seen.len(), WRITERS * RECORDS_PER_WRITER);
        for writer in 0..WRITERS {
            for record in 0..RECORDS_PER_WRITER {
                let key = format!("writer-{writer}-record-{record}");
                assert_eq!(seen.get(&key), Some(&1), "missing or mangled {key}");
            }
        }
    }
}
