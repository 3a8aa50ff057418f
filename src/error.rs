use thiserror::Error;

/// I/O errors that can occur when reading a file's bytes
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The underlying read failed
    #[error("Read error: {0}")]
    Read(String),

    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(err.to_string()),
            _ => IoError::Read(err.to_string()),
        }
    }
}

/// Errors that can occur when scanning the structure of a TIFF file
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// An IFD's next-offset points back at an IFD already visited
    #[error("IFD chain loops back to offset {0}")]
    IfdLoop(u64),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),
}

/// Caller-side problems detected before any decode is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// No file handle was supplied
    #[error("File is required")]
    MissingFile,

    /// Neither the declared media type nor the file name is recognized
    #[error("Unsupported file type: {media_type}")]
    UnsupportedType { media_type: String },
}

/// Errors from turning file bytes into raster pages
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The container decoded without error but produced no frames
    #[error("No valid TIFF pages found")]
    NoPages,

    /// The IFD scan failed
    #[error("{0}")]
    Tiff(#[from] TiffError),

    /// The pixel decoder reported a failure (message passed through as-is)
    #[error("{0}")]
    Decoder(String),

    /// The native single-image decoder rejected the data
    #[error("Failed to load image")]
    ImageLoad,

    /// Decoded buffer does not match the frame dimensions
    #[error("Pixel buffer length mismatch: expected {expected} bytes, got {actual}")]
    PixelLength { expected: usize, actual: usize },

    /// Sample layout has no RGBA8 conversion
    #[error("Unsupported color type: {0}")]
    UnsupportedColor(String),

    /// Reading the file bytes failed
    #[error("{0}")]
    Io(#[from] IoError),

    /// The decode task panicked or was cancelled
    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Errors that can occur while drawing a page onto a target
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The target could not hand out a drawing context
    #[error("Canvas context not available")]
    ContextUnavailable,

    /// There is no current page to draw
    #[error("No page to render")]
    NoPage,

    /// The drawing context failed mid-draw
    #[error("Render failed: {0}")]
    Draw(String),
}

/// Programmer errors on the navigation entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// Navigation was requested before any file load was attempted
    #[error("No file loaded")]
    NotLoaded,
}

/// Top-level error returned by the viewer
#[derive(Debug, Clone, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// A newer load started before this one finished; its result was dropped
    #[error("Load superseded by a newer request")]
    Superseded,
}
