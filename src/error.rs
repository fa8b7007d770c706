use thiserror::Error;

/// Main error type for the magick-batch library
#[derive(Error, Debug)]
pub enum MagickError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised once, while preparing an action
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Required executable not found: {name}")]
    ExecutableNotFound { name: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    #[error("Missing value for field '{label}' required by effect '{effect}'")]
    MissingField { effect: String, label: String },

    #[error("Template placeholder '{key}' has no value")]
    MissingKey { key: String },

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    #[error("Effect already registered: {name}")]
    DuplicateEffect { name: String },

    #[error("Unknown field: {label}")]
    UnknownField { label: String },

    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Failures of the external process for a single photo
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to start command: {reason}")]
    SpawnFailed { reason: String },

    #[error("Command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Command produced no output file: {path}")]
    MissingOutput { path: String },

    #[error("Output would replace the input photo: {path}")]
    OutputIsInput { path: String },

    #[error("Output {path} is already written by {by}")]
    OutputClaimed { path: String, by: String },
}

/// Convenience type alias for Results using MagickError
pub type Result<T> = std::result::Result<T, MagickError>;

impl MagickError {
    /// Check if this error only concerns the current photo
    ///
    /// A batch keeps going past recoverable errors; setup and configuration
    /// errors would fail the same way for every photo.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Execution(_) => true,
            Self::Io(_) => true,
            Self::Image(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Setup(SetupError::ExecutableNotFound { name }) => {
                format!("Could not find '{}'. Please check that ImageMagick is installed and on your PATH.", name)
            }
            Self::Config(ConfigError::UnknownEffect { name }) => {
                format!("Effect '{}' not found. Run `magick-batch list` to see the available effects.", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Execution(ExecutionError::Failed { stderr, .. }) if !stderr.trim().is_empty() => {
                format!("ImageMagick reported: {}", stderr.trim())
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_errors_are_recoverable() {
        let err: MagickError = ExecutionError::MissingOutput { path: "out.png".into() }.into();
        assert!(err.is_recoverable());

        let err: MagickError = ConfigError::UnknownEffect { name: "Nope".into() }.into();
        assert!(!err.is_recoverable());

        let err: MagickError = SetupError::ExecutableNotFound { name: "convert".into() }.into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message_mentions_stderr() {
        let err: MagickError = ExecutionError::Failed {
            status: "exit status: 1".into(),
            stderr: "convert: unable to open image\n".into(),
        }
        .into();
        assert_eq!(err.user_message(), "ImageMagick reported: convert: unable to open image");
    }
}
