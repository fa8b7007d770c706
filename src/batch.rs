use std::collections::hash_map::{Entry, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    action::ImageMagickAction,
    config::BatchConfig,
    error::{ConfigError, ExecutionError, MagickError, Result},
    fields::Settings,
    photo::{file::same_file, FilePhoto, PhotoInfo},
};

/// What happened to one input
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Processed { output: PathBuf },
    Skipped { output: PathBuf },
    Failed { error: String },
}

/// Per-photo outcome
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoReport {
    pub input: PathBuf,
    pub outcome: Outcome,
}

/// Result of a batch run, in input order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub photos: Vec<PhotoReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.photos.iter().filter(|p| pred(&p.outcome)).count()
    }
}

/// Applies one action to many photos in parallel
///
/// A failing photo is recorded in the report and the rest of the batch
/// carries on. Problems that would hit every photo, such as an unknown
/// effect, are reported before any photo is touched.
pub struct BatchProcessor<'a> {
    action: &'a ImageMagickAction,
    config: BatchConfig,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(action: &'a ImageMagickAction, config: BatchConfig) -> Self {
        Self { action, config }
    }

    /// Where the result for `input` is written
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        self.config
            .output_dir
            .join(format!("{}.{}", stem, self.config.extension.trim()))
    }

    pub fn run(&self, inputs: &[PathBuf], settings: &Settings) -> Result<BatchReport> {
        let start = Instant::now();

        // Settings errors are the same for every photo; surface them once
        let sample = PhotoInfo::new("sample.png", 100, 100);
        self.action.command_for(&sample, settings)?;

        std::fs::create_dir_all(&self.config.output_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "batch.threads".to_string(),
                value: e.to_string(),
            })?;

        info!(
            "Processing {} photos with '{}' on {} threads",
            inputs.len(),
            settings.effect().unwrap_or_default(),
            self.config.threads
        );

        let jobs = self.assign_outputs(inputs);
        let photos: Vec<PhotoReport> = pool.install(|| {
            jobs.par_iter()
                .map(|(input, output)| PhotoReport {
                    input: input.clone(),
                    outcome: match output {
                        Ok(output) => self.process_one(input, output.clone(), settings),
                        Err(outcome) => outcome.clone(),
                    },
                })
                .collect()
        });

        let report = BatchReport {
            photos,
            elapsed: start.elapsed(),
        };

        info!(
            "Batch finished in {:.2}s: {} processed, {} skipped, {} failed",
            report.elapsed.as_secs_f64(),
            report.processed(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Pair each input with its output; later inputs that map onto an output
    /// already taken fail instead of replacing it
    fn assign_outputs(&self, inputs: &[PathBuf]) -> Vec<(PathBuf, std::result::Result<PathBuf, Outcome>)> {
        let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
        inputs
            .iter()
            .map(|input| {
                let output = self.output_path(input);
                let assigned = match claimed.entry(output.clone()) {
                    Entry::Occupied(first) => {
                        let err: MagickError = ExecutionError::OutputClaimed {
                            path: output.display().to_string(),
                            by: first.get().display().to_string(),
                        }
                        .into();
                        warn!("Not processing {:?}: {}", input, err);
                        Err(Outcome::Failed { error: err.user_message() })
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(input);
                        Ok(output)
                    }
                };
                (input.clone(), assigned)
            })
            .collect()
    }

    fn process_one(&self, input: &Path, output: PathBuf, settings: &Settings) -> Outcome {
        if same_file(input, &output) {
            let err: MagickError = ExecutionError::OutputIsInput {
                path: output.display().to_string(),
            }
            .into();
            warn!("Not processing {:?}: {}", input, err);
            return Outcome::Failed { error: err.user_message() };
        }

        if output.exists() && !self.config.overwrite {
            debug!("Skipping {:?}: {:?} exists", input, output);
            return Outcome::Skipped { output };
        }

        let result = FilePhoto::open(input, output.clone())
            .and_then(|photo| self.action.apply(photo, settings));

        match result {
            Ok(_) => {
                info!("Processed {:?} -> {:?}", input, output);
                Outcome::Processed { output }
            }
            Err(e) => {
                warn!("Failed to process {:?}: {}", input, e);
                Outcome::Failed { error: e.user_message() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::MagickError;
    use tempfile::tempdir;

    fn action(executable: &str) -> ImageMagickAction {
        let config = Config::default();
        let catalog = config.build_catalog().unwrap();
        let schema = config.build_schema(&catalog).unwrap();
        ImageMagickAction::new(catalog, schema, PathBuf::from(executable))
    }

    fn batch_config(output_dir: &Path) -> BatchConfig {
        BatchConfig {
            threads: 2,
            output_dir: output_dir.to_path_buf(),
            extension: "png".to_string(),
            overwrite: false,
        }
    }

    fn write_png(path: &Path) {
        image::RgbImage::new(8, 6).save(path).unwrap();
    }

    #[test]
    fn test_output_path() {
        let action = action("convert");
        let processor = BatchProcessor::new(&action, batch_config(Path::new("/tmp/out")));
        assert_eq!(
            processor.output_path(Path::new("/photos/a.jpg")),
            PathBuf::from("/tmp/out/a.png")
        );
    }

    #[test]
    fn test_unknown_effect_fails_before_processing() {
        let dir = tempdir().unwrap();
        let action = action("convert");
        let processor = BatchProcessor::new(&action, batch_config(&dir.path().join("out")));
        let settings = action.default_settings().with_effect("Glow");

        let err = processor
            .run(&[dir.path().join("a.png")], &settings)
            .unwrap_err();
        assert!(matches!(err, MagickError::Config(ConfigError::UnknownEffect { .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_failures_do_not_stop_batch() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let good = dir.path().join("good.png");
        write_png(&good);
        let missing = dir.path().join("missing.png");
        let existing = dir.path().join("existing.png");
        write_png(&existing);
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("existing.png"), b"done").unwrap();

        // `true` exits cleanly but never writes the output file
        let action = action("true");
        let processor = BatchProcessor::new(&action, batch_config(&out));
        let settings = action.default_settings().with_effect("Blur");

        let report = processor
            .run(&[good.clone(), missing.clone(), existing.clone()], &settings)
            .unwrap();

        assert_eq!(report.photos.len(), 3);
        assert_eq!(report.photos[0].input, good);
        assert!(matches!(report.photos[0].outcome, Outcome::Failed { .. }));
        assert!(matches!(report.photos[1].outcome, Outcome::Failed { .. }));
        assert!(matches!(report.photos[2].outcome, Outcome::Skipped { .. }));
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_never_writes_over_an_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("photo.png");
        write_png(&input);
        let before = std::fs::read(&input).unwrap();

        let action = action("false");
        let mut config = batch_config(dir.path());
        config.overwrite = true;
        let processor = BatchProcessor::new(&action, config);
        let settings = action.default_settings().with_effect("Blur");

        let report = processor.run(&[input.clone()], &settings).unwrap();
        match &report.photos[0].outcome {
            Outcome::Failed { error } => assert!(error.contains("replace the input"), "{}", error),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(std::fs::read(&input).unwrap(), before);
    }

    #[test]
    fn test_inputs_sharing_a_stem_do_not_share_an_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let first = dir.path().join("a").join("x.png");
        let second = dir.path().join("b").join("x.jpg");
        write_png(&first);
        write_png(&second);

        let action = action("true");
        let mut config = batch_config(&out);
        config.overwrite = true;
        let processor = BatchProcessor::new(&action, config);
        let settings = action.default_settings().with_effect("Blur");

        let report = processor.run(&[first, second.clone()], &settings).unwrap();
        assert_eq!(report.photos[1].input, second);
        match &report.photos[1].outcome {
            Outcome::Failed { error } => assert!(error.contains("already written by"), "{}", error),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_processes_with_external_command() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let input = dir.path().join("photo.png");
        write_png(&input);

        // A stand-in "convert" that copies its first file argument to the last
        let script = dir.path().join("fake-convert");
        std::fs::write(&script, "#!/bin/sh\nfirst=\"$1\"\nfor last; do :; done\ncp \"$first\" \"$last\"\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let action = action(&script.display().to_string());
        let processor = BatchProcessor::new(&action, batch_config(&out));
        let settings = action.default_settings().with_effect("Paint");

        let report = processor.run(&[input], &settings).unwrap();
        assert_eq!(report.processed(), 1, "{:?}", report.photos);
        assert!(out.join("photo.png").exists());
    }
}
