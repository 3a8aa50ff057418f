use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::IoError;
use crate::format::media_type_from_path;

/// A file handed to the viewer: a name, a declared media type and its bytes.
///
/// The declared media type is whatever the caller was told (browser upload,
/// HTTP header, extension table) and is not trusted on its own; see
/// [`crate::format::is_supported`].
#[async_trait]
pub trait FileSource: Send + Sync {
    /// File name, including extension.
    fn name(&self) -> &str;

    /// Declared media type (e.g. `image/tiff`). May be empty or generic.
    fn media_type(&self) -> &str;

    /// Size of the file in bytes.
    fn size(&self) -> u64;

    /// Read the whole file into memory.
    async fn read_all(&self) -> Result<Bytes, IoError>;
}

// =============================================================================
// FileInfo
// =============================================================================

/// Descriptive information about a file, carried through load results and
/// notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub media_type: String,
}

impl FileInfo {
    /// Capture the descriptive fields of a file handle.
    pub fn from_source(file: &dyn FileSource) -> Self {
        Self {
            name: file.name().to_string(),
            size: file.size(),
            media_type: file.media_type().to_string(),
        }
    }

    /// Human-readable file size ("512 B", "1.5 KB", "2.0 MB").
    pub fn formatted_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Format a byte count with binary units and one decimal place.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

// =============================================================================
// MemoryFile
// =============================================================================

/// A file whose bytes are already in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    data: Bytes,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_all(&self) -> Result<Bytes, IoError> {
        Ok(self.data.clone())
    }
}

// =============================================================================
// LocalFile
// =============================================================================

/// A file on the local filesystem.
///
/// The media type is derived from the extension, the way a browser fills in
/// `File.type`.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    media_type: String,
    size: u64,
}

impl LocalFile {
    /// Stat a file and prepare it for reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;

        if !metadata.is_file() {
            return Err(IoError::Read(format!("{} is not a regular file", path.display())));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_from_path(&name).to_string();

        Ok(Self {
            path,
            name,
            media_type,
            size: metadata.len(),
        })
    }

    /// Override the media type derived from the extension.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_all(&self) -> Result<Bytes, IoError> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(Bytes::from(data))
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// TIFF files can be either little-endian or big-endian, determined by the
// magic bytes at the start of the file. Callers bounds-check before reading.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a big-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a big-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a little-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

/// Read a big-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_be(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}
