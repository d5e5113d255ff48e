//! In-memory artwork pulled out of a beatmap archive

use std::fmt;

/// Image encodings accepted from archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from a file name, case-insensitively
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Canonical file extension
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One image entry read fully into memory
///
/// Has no filesystem lifetime: the archive it came from is gone by the time
/// callers see it.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// Entry path inside the archive, `/`-separated
    pub entry: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ExtractedImage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ExtractedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedImage")
            .field("entry", &self.entry)
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}
