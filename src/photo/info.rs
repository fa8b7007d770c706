use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fields::Dimensions;

/// Metadata of a photo
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl PhotoInfo {
    pub fn new<P: Into<PathBuf>>(path: P, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Read the size from the image header, without decoding pixels
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path)?;
        Ok(Self::new(path, width, height))
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// File name without extension
    pub fn filename(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File extension, lowercased
    pub fn file_type(&self) -> String {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Name of the containing folder
    pub fn folder(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Replace `<filename>`, `<type>`, `<folder>`, `<width>` and `<height>` in `text`
    pub fn expand(&self, text: &str) -> String {
        if !text.contains('<') {
            return text.to_string();
        }
        text.replace("<filename>", &self.filename())
            .replace("<type>", &self.file_type())
            .replace("<folder>", &self.folder())
            .replace("<width>", &self.width.to_string())
            .replace("<height>", &self.height.to_string())
    }
}
