//! Filesystem storage for snapshot records.

use super::Snapshot;
use crate::errors::SnapshotError;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory snapshots are written to unless configured otherwise.
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

const REQUIRED_FIELDS: [&str; 3] = ["step_name", "input", "exception"];

/// Stores one JSON record per `(step name, error kind)` pair.
///
/// Saving a second failure of the same kind for the same step overwrites the
/// earlier record, so the directory never grows beyond one file per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_DIR)
    }
}

impl SnapshotStore {
    /// Creates a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the snapshot directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns where the record for a step and error kind lives.
    ///
    /// Names that are not already file-safe get a digest of the raw pair
    /// appended, so distinct steps never share a record.
    #[must_use]
    pub fn path_for(&self, step_name: &str, kind: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(step_name, kind)))
    }

    /// Writes a snapshot, replacing any record with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.root).map_err(|err| SnapshotError::io(&self.root, err))?;

        let path = self.path_for(&snapshot.step_name, &snapshot.exception.kind);
        let encoded = serde_json::to_string_pretty(snapshot)?;

        // Write beside the target and rename so readers never see half a record.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|err| SnapshotError::io(&staging, err))?;
        fs::rename(&staging, &path).map_err(|err| SnapshotError::io(&path, err))?;

        debug!(path = %path.display(), step = %snapshot.step_name, "Snapshot written");
        Ok(path)
    }

    /// Reads a snapshot record from any path.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be read and
    /// [`SnapshotError::Corrupt`] if it is not a complete record.
    pub fn load(path: impl AsRef<Path>) -> Result<Snapshot, SnapshotError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| SnapshotError::io(path, err))?;
        decode(path, &bytes)
    }

    /// Reads the record for a step and error kind from this store.
    ///
    /// # Errors
    ///
    /// See [`SnapshotStore::load`].
    pub fn load_for(&self, step_name: &str, kind: &str) -> Result<Snapshot, SnapshotError> {
        Self::load(self.path_for(step_name, kind))
    }

    /// Lists every readable record, ordered by path.
    ///
    /// Corrupt records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<(PathBuf, Snapshot)>, SnapshotError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|err| SnapshotError::io(&self.root, err))?;
        let mut records = Vec::new();

        for entry in entries {
            let path = entry.map_err(|err| SnapshotError::io(&self.root, err))?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            match Self::load(&path) {
                Ok(snapshot) => records.push((path, snapshot)),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable snapshot"),
            }
        }

        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Deletes the record for a step and error kind.
    ///
    /// Returns false if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, step_name: &str, kind: &str) -> Result<bool, SnapshotError> {
        let path = self.path_for(step_name, kind);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|err| SnapshotError::io(&path, err))?;
        Ok(true)
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| SnapshotError::corrupt(path, format!("invalid JSON: {err}")))?;

    let Some(object) = value.as_object() else {
        return Err(SnapshotError::corrupt(path, "expected a JSON object"));
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(SnapshotError::corrupt(
            path,
            format!("missing required field(s): {}", missing.join(", ")),
        ));
    }

    serde_json::from_value(value).map_err(|err| SnapshotError::corrupt(path, err.to_string()))
}

fn file_stem(step_name: &str, kind: &str) -> String {
    let step = sanitize(step_name);
    let kind_part = sanitize(kind);
    if step == step_name && kind_part == kind {
        return format!("{step}_{kind_part}");
    }
    format!("{step}_{kind_part}_{}", key_digest(step_name, kind))
}

/// Maps a name onto characters that are safe in any file name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// First 8 hex characters of the SHA-256 of `step_name\0kind`.
fn key_digest(step_name: &str, kind: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(step_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.as_bytes());
    hex::encode(&hasher.finalize()[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepInput;
    use crate::snapshot::ExceptionInfo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn division_snapshot(input: i64) -> Snapshot {
        Snapshot::new(
            "step2",
            StepInput::positional(json!(input)),
            ExceptionInfo::new("ZeroDivisionError", "division by zero"),
        )
    }

    #[test]
    fn test_path_is_keyed_by_step_and_kind() {
        let store = SnapshotStore::new("snaps");
        assert_eq!(
            store.path_for("step2", "ZeroDivisionError"),
            PathBuf::from("snaps/step2_ZeroDivisionError.json")
        );
        assert_eq!(
            store.path_for("获取", "ValueError"),
            PathBuf::from("snaps/获取_ValueError.json")
        );
    }

    #[test]
    fn test_unsafe_names_get_stable_digest() {
        let store = SnapshotStore::new("snaps");
        let path = store.path_for("Step 1/x", "io::Error");
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(name.starts_with("Step_1_x_io__Error_"));
        assert_eq!(name.len(), "Step_1_x_io__Error_".len() + 8 + ".json".len());
        assert_eq!(path, store.path_for("Step 1/x", "io::Error"));

        assert_ne!(store.path_for("a/b", "E"), store.path_for("a b", "E"));
        assert_ne!(store.path_for("", "E"), store.path_for("_", "E"));
    }

    #[test]
    fn test_non_ascii_steps_keep_separate_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let fetch = Snapshot::new(
            "获取",
            StepInput::new(),
            ExceptionInfo::new("ValueError", "empty response"),
        );
        let convert = Snapshot::new(
            "转换",
            StepInput::positional(json!("rows")),
            ExceptionInfo::new("ValueError", "bad column"),
        );
        let odd = Snapshot::new(
            "load?",
            StepInput::new(),
            ExceptionInfo::new("ValueError", "x"),
        );
        let odder = Snapshot::new(
            "load*",
            StepInput::new(),
            ExceptionInfo::new("ValueError", "y"),
        );

        for snapshot in [&fetch, &convert, &odd, &odder] {
            store.save(snapshot).unwrap();
        }

        let records = store.list().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(store.load_for("获取", "ValueError").unwrap(), fetch);
        assert_eq!(store.load_for("转换", "ValueError").unwrap(), convert);
        assert_eq!(store.load_for("load?", "ValueError").unwrap(), odd);
        assert_eq!(store.load_for("load*", "ValueError").unwrap(), odder);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshots"));

        let path = store.save(&division_snapshot(0)).unwrap();
        assert!(path.ends_with("step2_ZeroDivisionError.json"));

        let loaded = SnapshotStore::load(&path).unwrap();
        assert_eq!(loaded, division_snapshot(0));
        assert_eq!(store.load_for("step2", "ZeroDivisionError").unwrap(), loaded);
    }

    #[test]
    fn test_repeated_failures_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.save(&division_snapshot(0)).unwrap();
        store.save(&division_snapshot(7)).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1.first_arg(), Some(&json!(7)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotStore::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn test_load_rejects_undecodable_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"\x80\x81 not json").unwrap();

        assert!(SnapshotStore::load(&path).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_load_rejects_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"step_name": "step2"}"#).unwrap();

        let err = SnapshotStore::load(&path).unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("input, exception"));
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shape.json");
        fs::write(
            &path,
            r#"{"step_name": 3, "input": {}, "exception": {"type": "E", "message": "m"}}"#,
        )
        .unwrap();
        assert!(SnapshotStore::load(&path).unwrap_err().is_corrupt());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(SnapshotStore::load(&path).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_list_skips_corrupt_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(&division_snapshot(0)).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1.step_name, "step2");
    }

    #[test]
    fn test_list_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(&division_snapshot(0)).unwrap();

        assert!(store.remove("step2", "ZeroDivisionError").unwrap());
        assert!(!store.remove("step2", "ZeroDivisionError").unwrap());
    }
}
