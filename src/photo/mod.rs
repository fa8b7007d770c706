//! # Photo Handles
//!
//! The action never touches pixels. It reads a photo's metadata and asks the
//! photo to run one command against itself; everything else belongs to the
//! host pipeline.

pub mod file;
pub mod info;

pub use file::FilePhoto;
pub use info::PhotoInfo;

use crate::error::Result;

/// Basename templates use for the input image
pub const INPUT_TOKEN: &str = "file_in.tif";

/// Basename templates use for the output image
pub const OUTPUT_TOKEN: &str = "file_out.png";

/// A photo an action can be applied to
pub trait Photo {
    /// Metadata of the photo, at least its size
    fn info(&self) -> &PhotoInfo;

    /// Run an external command against the photo, blocking until it exits
    fn call(&mut self, command: &str) -> Result<()>;
}

/// Quote a word for a POSIX shell, leaving plain words untouched
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ':' | ',' | '='));
    if plain {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/usr/bin/convert"), "/usr/bin/convert");
        assert_eq!(shell_quote("my photo.jpg"), "'my photo.jpg'");
        assert_eq!(shell_quote("it's.png"), "'it'\\''s.png'");
        assert_eq!(shell_quote(""), "''");
    }
}
