//! Index of staged fixture artifacts with SHA-256 integrity digests.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;

pub const INDEX_FILE: &str = "artifact_index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Host,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Filename inside the staged directory.
    pub name: String,
    pub kind: ArtifactKind,
    /// Build-time variant, for `lwtest_a` copies only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<i64>,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub index_version: u32,
    pub run_id: String,
    pub generated_utc: String,
    /// `debug` or `release`.
    pub profile: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: lwtest_core::time::now_utc(),
            profile: profile.into(),
            artifacts: Vec::new(),
        }
    }

    /// Hash `path` and record it under its filename.
    pub fn add_file(
        &mut self,
        path: &Path,
        kind: ArtifactKind,
        variant: Option<i64>,
    ) -> Result<&ArtifactEntry, HarnessError> {
        let (sha256, size_bytes) = sha256_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| HarnessError::MissingArtifact(path.to_path_buf()))?;
        self.artifacts.push(ArtifactEntry {
            name,
            kind,
            variant,
            sha256,
            size_bytes,
        });
        Ok(&self.artifacts[self.artifacts.len() - 1])
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write the index as `artifact_index.json` in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), HarnessError> {
        let path = dir.join(INDEX_FILE);
        let json = self.to_json()?;
        std::fs::write(&path, json + "\n")
            .map_err(|e| HarnessError::io(format!("failed to write {}", path.display()), e))
    }
}

/// Lowercase hex SHA-256 digest and size of a file.
pub fn sha256_file(path: &Path) -> Result<(String, u64), HarnessError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| HarnessError::io(format!("failed to open {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 64 * 1024];
    let mut size = 0_u64;
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| HarnessError::io(format!("failed to read {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((hex(&hasher.finalize()), size))
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(prefix: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sha256_of_known_content() {
        let dir = scratch("lwtest-sha");
        let path = dir.join("abc.bin");
        std::fs::write(&path, b"abc").unwrap();
        let (digest, size) = sha256_file(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(size, 3);
    }

    #[test]
    fn index_records_entries_and_survives_json() {
        let dir = scratch("lwtest-index");
        let lib = dir.join(lwtest_core::library_filename("lwtest_a_v2"));
        std::fs::write(&lib, b"not really a library").unwrap();

        let mut index = ArtifactIndex::new("run-1", "debug");
        let entry = index.add_file(&lib, ArtifactKind::Library, Some(2)).unwrap();
        assert_eq!(entry.size_bytes, 20);
        index.write_to(&dir).unwrap();

        let reread =
            ArtifactIndex::from_json(&std::fs::read_to_string(dir.join(INDEX_FILE)).unwrap())
                .unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(reread, index);
        let found = reread
            .find(&lwtest_core::library_filename("lwtest_a_v2"))
            .unwrap();
        assert_eq!(found.variant, Some(2));
        assert_eq!(found.kind, ArtifactKind::Library);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = sha256_file(Path::new("/nonexistent/lwtest/artifact")).unwrap_err();
        assert!(matches!(err, HarnessError::Io { .. }), "{err}");
    }

    #[test]
    fn variant_is_omitted_for_hosts() {
        let entry = ArtifactEntry {
            name: "host".to_string(),
            kind: ArtifactKind::Host,
            variant: None,
            sha256: String::new(),
            size_bytes: 0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("variant").is_none());
        assert_eq!(json["kind"], "host");
    }
}
