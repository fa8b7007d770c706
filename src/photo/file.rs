use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::{ExecutionError, Result};
use crate::photo::{shell_quote, Photo, PhotoInfo, INPUT_TOKEN, OUTPUT_TOKEN};

/// A photo on disk, transformed into a separate output file
#[derive(Debug, Clone)]
pub struct FilePhoto {
    info: PhotoInfo,
    output: PathBuf,
}

impl FilePhoto {
    /// Open `input`, reading its size from the file header
    pub fn open<P: AsRef<Path>, Q: Into<PathBuf>>(input: P, output: Q) -> Result<Self> {
        Ok(Self::with_info(PhotoInfo::from_path(input)?, output))
    }

    /// Use already known metadata
    pub fn with_info<Q: Into<PathBuf>>(info: PhotoInfo, output: Q) -> Self {
        Self {
            info,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Put the real, quoted paths in place of the template file names
    pub fn bind_paths(&self, command: &str) -> String {
        self.bind_to(command, &self.output)
    }

    fn bind_to(&self, command: &str, output: &Path) -> String {
        let input = shell_quote(&self.info.path.to_string_lossy());
        let output = shell_quote(&output.to_string_lossy());
        bind_words(command, &[(INPUT_TOKEN, &input), (OUTPUT_TOKEN, &output)])
    }

    /// A fresh, unused name next to the output with the same extension
    ///
    /// The tool writes here and the file is renamed over the output only on
    /// success, so an existing output survives a failed run.
    fn staging_path(&self) -> Result<TempPath> {
        let dir = match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let suffix = self
            .output
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let staging = tempfile::Builder::new()
            .prefix(".magick-batch-")
            .suffix(&suffix)
            .tempfile_in(dir)?
            .into_temp_path();
        // Only the name is reserved; the tool has to create the file itself
        std::fs::remove_file(&staging)?;
        Ok(staging)
    }
}

impl Photo for FilePhoto {
    fn info(&self) -> &PhotoInfo {
        &self.info
    }

    fn call(&mut self, command: &str) -> Result<()> {
        if same_file(&self.info.path, &self.output) {
            return Err(ExecutionError::OutputIsInput {
                path: self.output.display().to_string(),
            }
            .into());
        }

        let staging = self.staging_path()?;
        let command = self.bind_to(command, &staging);

        debug!("Running: {}", command);
        let output = shell(&command)
            .output()
            .map_err(|e| ExecutionError::SpawnFailed { reason: e.to_string() })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!("Command failed for {:?} ({})", self.info.path, output.status);
            return Err(ExecutionError::Failed {
                status: output.status.to_string(),
                stderr,
            }
            .into());
        }

        if !staging.exists() {
            return Err(ExecutionError::MissingOutput {
                path: self.output.display().to_string(),
            }
            .into());
        }

        staging.persist(&self.output).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Whether two paths name the same existing file
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replace whole, unquoted shell words in one pass
///
/// Quoted text (a caption, say) and the replacements themselves are never
/// rewritten.
fn bind_words(command: &str, bindings: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(command.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut word_start = true;
    let mut rest = command;

    while let Some(c) = rest.chars().next() {
        if word_start {
            let bound = bindings.iter().find(|(token, _)| {
                rest.strip_prefix(token)
                    .map_or(false, |after| after.chars().next().map_or(true, ends_word))
            });
            if let Some((token, value)) = bound {
                out.push_str(value);
                rest = &rest[token.len()..];
                word_start = false;
                continue;
            }
        }

        let mut boundary = false;
        if escaped {
            escaped = false;
        } else {
            match (quote, c) {
                (None, '\\') | (Some('"'), '\\') => escaped = true,
                (None, '\'' | '"') => quote = Some(c),
                (Some(q), _) if c == q => quote = None,
                (None, _) => boundary = c.is_whitespace(),
                _ => {}
            }
        }
        word_start = boundary;

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn ends_word(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | '|' | '&' | ')' | '<' | '>')
}

#[cfg(not(target_os = "windows"))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(target_os = "windows")]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
