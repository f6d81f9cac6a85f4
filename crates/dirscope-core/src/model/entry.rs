/// A single filesystem object discovered during a scan.
///
/// Entries are built once by the walker and never mutated afterwards. Field
/// names match the serialized form consumed by the display layer.
use crate::analysis::file_types::{classify, extension_of};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Base name only, never empty.
    pub name: CompactString,

    /// Absolute path, unique within one scan result.
    pub path: String,

    /// Byte length of the object itself. Always 0 for directories; a
    /// directory's size is never the sum of its subtree.
    pub size: u64,

    /// Category label from [`classify`].
    pub file_type: CompactString,

    /// Lowercase suffix without the dot. `None` for directories and
    /// extensionless names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Last modification time, serialized as RFC 3339.
    pub modified: DateTime<Utc>,

    pub is_directory: bool,
}

impl Entry {
    /// Build a classified entry. `size` is forced to 0 for directories.
    pub fn new(
        name: &str,
        path: impl Into<String>,
        size: u64,
        modified: DateTime<Utc>,
        is_directory: bool,
    ) -> Self {
        let extension = if is_directory {
            None
        } else {
            extension_of(name)
        };
        let file_type = classify(name, extension.as_deref(), is_directory);
        Self {
            name: CompactString::new(name),
            path: path.into(),
            size: if is_directory { 0 } else { size },
            file_type: CompactString::const_new(file_type),
            extension,
            modified,
            is_directory,
        }
    }

    /// Build an entry from already-fetched metadata.
    ///
    /// `is_dir` reflects the metadata as given: symlink metadata reports a
    /// link as a non-directory. Fails only when the platform cannot report a
    /// modification time.
    ///
    /// `path` is rendered lossily, so two distinct non-UTF-8 paths could map
    /// to the same string. The walker never passes a child whose name is not
    /// valid UTF-8.
    pub fn from_metadata(name: &str, path: &Path, meta: &Metadata) -> io::Result<Self> {
        let modified: DateTime<Utc> = meta.modified()?.into();
        Ok(Self::new(
            name,
            path.to_string_lossy().into_owned(),
            meta.len(),
            modified,
            meta.is_dir(),
        ))
    }
}
