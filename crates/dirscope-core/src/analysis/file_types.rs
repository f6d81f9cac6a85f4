/// File type classification based on file extensions.
///
/// Maps every entry to one broad category (Text, Code, Image, Archive, ...)
/// and computes size/count totals per category for a finished scan.
use crate::model::ScanResult;
use std::collections::HashMap;
use std::path::Path;

/// Broad file type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileCategory {
    Directory,
    Text,
    Document,
    Code,
    Image,
    Video,
    Audio,
    Archive,
    Executable,
    System,
    /// Fallback for anything unrecognised, including no extension at all.
    Other,
}

impl FileCategory {
    /// Every category, in display order.
    pub const ALL: [FileCategory; 11] = [
        Self::Directory,
        Self::Text,
        Self::Document,
        Self::Code,
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Archive,
        Self::Executable,
        Self::System,
        Self::Other,
    ];

    /// Human-readable label, stored as `Entry::file_type`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Directory => "Directory",
            Self::Text => "Text",
            Self::Document => "Document",
            Self::Code => "Code",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Archive => "Archive",
            Self::Executable => "Executable",
            Self::System => "System",
            Self::Other => "File",
        }
    }

    /// Icon shown next to an entry's name in listings. Every icon is a
    /// single emoji-presentation code point, two terminal cells wide.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Directory => "\u{1F4C1}",  // 📁
            Self::Text => "\u{1F4DD}",       // 📝
            Self::Document => "\u{1F4D5}",   // 📕
            Self::Code => "\u{1F4DC}",       // 📜
            Self::Image => "\u{1F4F7}",      // 📷
            Self::Video => "\u{1F3AC}",      // 🎬
            Self::Audio => "\u{1F3B5}",      // 🎵
            Self::Archive => "\u{1F4E6}",    // 📦
            Self::Executable => "\u{1F680}", // 🚀
            Self::System => "\u{1F527}",     // 🔧
            Self::Other => "\u{1F4C4}",      // 📄
        }
    }

    /// Reverse of [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Size and count totals for a single file category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: FileCategory,
    pub total_size: u64,
    pub file_count: u64,
}

/// Categorise a file extension (without the dot) into a broad category.
///
/// Zero-heap-allocation hot path: extensions are lowercased into a fixed-size
/// stack buffer (`[u8; 16]`) rather than allocating a `String`.  Extensions
/// longer than 16 bytes are treated as `Other`.
pub fn categorise_extension(ext: &str) -> FileCategory {
    let bytes = ext.as_bytes();
    if bytes.len() > 16 {
        return FileCategory::Other;
    }

    let mut lower = [0u8; 16];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = match std::str::from_utf8(&lower[..bytes.len()]) {
        Ok(s) => s,
        Err(_) => return FileCategory::Other,
    };

    match lower_str {
        "txt" | "md" | "markdown" | "rst" | "log" | "csv" | "tsv" | "ini" | "cfg" | "conf"
        | "nfo" => FileCategory::Text,
        "doc" | "docx" | "pdf" | "rtf" | "odt" | "ods" | "odp" | "xls" | "xlsx" | "ppt"
        | "pptx" | "epub" | "pages" | "numbers" | "key" => FileCategory::Document,
        "rs" | "py" | "js" | "ts" | "jsx" | "tsx" | "c" | "cpp" | "h" | "hpp" | "cs" | "java"
        | "go" | "rb" | "php" | "swift" | "kt" | "scala" | "html" | "css" | "scss" | "json"
        | "xml" | "yaml" | "yml" | "toml" | "sql" | "sh" | "bat" | "ps1" | "lua" | "vue" => {
            FileCategory::Code
        }
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" | "tif"
        | "psd" | "raw" | "cr2" | "nef" | "heic" | "heif" | "avif" => FileCategory::Image,
        "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg" | "3gp" => {
            FileCategory::Video
        }
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" | "opus" | "aiff" | "mid" => {
            FileCategory::Audio
        }
        "zip" | "rar" | "7z" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "zst" | "cab" | "iso"
        | "dmg" => FileCategory::Archive,
        "exe" | "msi" | "dll" | "so" | "dylib" | "app" | "com" | "scr" | "apk" | "deb"
        | "rpm" => FileCategory::Executable,
        "sys" | "drv" | "inf" | "cat" | "etl" | "dat" | "reg" | "tmp" | "bak" | "lock" => {
            FileCategory::System
        }
        _ => FileCategory::Other,
    }
}

/// Lowercase suffix after the last dot of `name`, without the dot.
///
/// `None` for names without a dot, dot-files such as `.bashrc`, and names
/// ending in a dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Classify an entry into its category label.
///
/// Pure: depends only on the directory flag and the extension. When
/// `extension` is `None` the extension is derived from `name`.
pub fn classify(name: &str, extension: Option<&str>, is_directory: bool) -> &'static str {
    category_of(name, extension, is_directory).label()
}

/// The category behind [`classify`].
pub fn category_of(name: &str, extension: Option<&str>, is_directory: bool) -> FileCategory {
    if is_directory {
        return FileCategory::Directory;
    }
    match extension {
        Some(ext) => categorise_extension(ext),
        None => extension_of(name)
            .map(|ext| categorise_extension(&ext))
            .unwrap_or(FileCategory::Other),
    }
}

/// Compute per-category size and count stats for a scan result.
///
/// Directories are skipped. Results are sorted by total size descending,
/// ties broken by category order.
pub fn analyse_file_types(result: &ScanResult) -> Vec<CategoryStats> {
    let mut map: HashMap<FileCategory, CategoryStats> =
        HashMap::with_capacity(FileCategory::ALL.len());

    for entry in result.files.iter().filter(|e| !e.is_directory) {
        let cat = FileCategory::from_label(&entry.file_type).unwrap_or(FileCategory::Other);
        let stats = map.entry(cat).or_insert_with(|| CategoryStats {
            category: cat,
            total_size: 0,
            file_count: 0,
        });
        stats.total_size += entry.size;
        stats.file_count += 1;
    }

    let mut results: Vec<CategoryStats> = map.into_values().collect();
    results.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then(a.category.cmp(&b.category))
    });
    results
}
