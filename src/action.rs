use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::Config,
    effects::EffectCatalog,
    error::{ConfigError, Result, SetupError},
    fields::{FieldSchema, Settings, ACTION},
    photo::{Photo, PhotoInfo},
    resolver::CommandResolver,
};

/// Locate an executable by name on PATH, or check an explicit path
pub fn find_exe(name: &str) -> Result<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        if candidate.is_file() {
            return Ok(candidate.to_path_buf());
        }
        return Err(SetupError::ExecutableNotFound { name: name.to_string() }.into());
    }

    which::which(name).map_err(|_| SetupError::ExecutableNotFound { name: name.to_string() }.into())
}

/// Blur, Polaroid, Shadow, Unsharp and friends through ImageMagick
///
/// A value of this type only exists once the executable has been found, so a
/// missing installation is reported by [`ImageMagickAction::init`] and never
/// while processing photos.
#[derive(Debug, Clone)]
pub struct ImageMagickAction {
    resolver: CommandResolver,
}

impl ImageMagickAction {
    /// Locate ImageMagick and build the effect table from `config`
    pub fn init(config: &Config) -> Result<Self> {
        let executable = find_exe(&config.imagemagick.executable)?;
        info!("Using ImageMagick at {:?}", executable);

        let catalog = config.build_catalog()?;
        let schema = config.build_schema(&catalog)?;
        Ok(Self::new(catalog, schema, executable))
    }

    /// Assemble an action from parts that are already known to be valid
    pub fn new(catalog: EffectCatalog, schema: FieldSchema, executable: PathBuf) -> Self {
        Self {
            resolver: CommandResolver::new(Arc::new(catalog), Arc::new(schema), executable),
        }
    }

    /// The fields this action can be configured with, in display order
    pub fn interface(&self) -> &FieldSchema {
        self.resolver.schema()
    }

    /// Settings holding every field's default
    pub fn default_settings(&self) -> Settings {
        self.interface()
            .iter()
            .map(|f| (f.label.clone(), f.default.clone()))
            .collect()
    }

    /// Labels worth showing while `effect` is selected
    pub fn relevant_field_labels(&self, effect: &str) -> Result<Vec<String>> {
        self.resolver.catalog().relevant_field_labels(effect)
    }

    pub fn catalog(&self) -> &EffectCatalog {
        self.resolver.catalog()
    }

    pub fn resolver(&self) -> &CommandResolver {
        &self.resolver
    }

    /// The command `apply` would run for a photo with this metadata
    pub fn command_for(&self, info: &PhotoInfo, settings: &Settings) -> Result<String> {
        let effect = settings.effect().ok_or_else(|| ConfigError::MissingField {
            effect: String::new(),
            label: ACTION.to_string(),
        })?;

        let expanded: Settings = settings
            .iter()
            .map(|(label, value)| (label.to_string(), info.expand(value)))
            .collect();

        self.resolver.resolve(effect, &expanded, info.width, info.height)
    }

    /// Transform `photo` with the effect selected in `settings`
    pub fn apply<P: Photo>(&self, mut photo: P, settings: &Settings) -> Result<P> {
        let command = self.command_for(photo.info(), settings)?;
        debug!("Applying to {:?}: {}", photo.info().path, command);
        photo.call(&command)?;
        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MagickError;
    use crate::fields::*;

    /// Records commands instead of running them
    #[derive(Debug)]
    struct RecordingPhoto {
        info: PhotoInfo,
        calls: Vec<String>,
    }

    impl RecordingPhoto {
        fn new(width: u32, height: u32) -> Self {
            Self {
                info: PhotoInfo::new("/photos/trip/sunset.jpg", width, height),
                calls: Vec::new(),
            }
        }
    }

    impl Photo for RecordingPhoto {
        fn info(&self) -> &PhotoInfo {
            &self.info
        }

        fn call(&mut self, command: &str) -> Result<()> {
            self.calls.push(command.to_string());
            Ok(())
        }
    }

    impl Photo for &mut RecordingPhoto {
        fn info(&self) -> &PhotoInfo {
            &self.info
        }

        fn call(&mut self, command: &str) -> Result<()> {
            self.calls.push(command.to_string());
            Ok(())
        }
    }

    fn action() -> ImageMagickAction {
        let config = Config::default();
        let catalog = config.build_catalog().unwrap();
        let schema = config.build_schema(&catalog).unwrap();
        ImageMagickAction::new(catalog, schema, PathBuf::from("convert"))
    }

    #[test]
    fn test_apply_calls_once() {
        let action = action();
        let settings = action.default_settings().with_effect("Wave");

        let photo = action.apply(RecordingPhoto::new(100, 100), &settings).unwrap();
        assert_eq!(photo.calls, vec!["convert file_in.tif -wave 0x3 file_out.png"]);
    }

    #[test]
    fn test_default_effect_is_polaroid() {
        let action = action();
        let settings = action.default_settings();
        assert_eq!(settings.effect(), Some("Polaroid"));

        let photo = action.apply(RecordingPhoto::new(100, 100), &settings).unwrap();
        assert_eq!(
            photo.calls,
            vec!["convert  file_in.tif -bordercolor '#FFFFFF' -background '#000000' +polaroid file_out.png"]
        );
    }

    #[test]
    fn test_caption_expands_info_variables() {
        let action = action();
        let settings = action
            .default_settings()
            .set(CAPTION, "<filename> <width>x<height>");

        let photo = action.apply(RecordingPhoto::new(640, 480), &settings).unwrap();
        assert!(photo.calls[0].contains("-caption \"sunset 640x480\""), "{}", photo.calls[0]);
    }

    #[test]
    fn test_unknown_effect_does_not_call() {
        let action = action();
        let settings = action.default_settings().with_effect("Glow");

        let mut photo = RecordingPhoto::new(10, 10);
        let err = action.apply(&mut photo, &settings).unwrap_err();
        assert!(matches!(err, MagickError::Config(ConfigError::UnknownEffect { .. })));
        assert!(photo.calls.is_empty());
    }

    #[test]
    fn test_missing_action_field() {
        let action = action();
        let err = action
            .command_for(&PhotoInfo::new("a.png", 10, 10), &Settings::new())
            .unwrap_err();
        assert!(matches!(err, MagickError::Config(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_relevant_field_labels() {
        let action = action();
        assert_eq!(
            action.relevant_field_labels("Polaroid").unwrap(),
            vec![ACTION, BORDER_COLOR, SHADOW_COLOR, CAPTION]
        );
        assert_eq!(
            action.relevant_field_labels("Motion Blur").unwrap(),
            vec![ACTION, BLUR_RADIUS, BLUR_SIGMA, BLUR_ANGLE]
        );
    }

    #[test]
    fn test_configured_defaults_reach_interface() {
        let mut config = Config::default();
        config.defaults.insert(BLUR_RADIUS.to_string(), "1%".to_string());
        let catalog = config.build_catalog().unwrap();
        let schema = config.build_schema(&catalog).unwrap();
        let action = ImageMagickAction::new(catalog, schema, PathBuf::from("convert"));

        assert_eq!(action.interface().get(BLUR_RADIUS).unwrap().default, "1%");
        let settings = action.default_settings().with_effect("Blur");
        let command = action
            .command_for(&PhotoInfo::new("a.png", 300, 100), &settings)
            .unwrap();
        assert_eq!(command, "convert file_in.tif -blur 2x3 file_out.png");
    }

    #[test]
    fn test_init_reports_missing_executable() {
        let mut config = Config::default();
        config.imagemagick.executable = "/nonexistent/bin/convert".to_string();
        let err = ImageMagickAction::init(&config).unwrap_err();
        assert!(matches!(err, MagickError::Setup(SetupError::ExecutableNotFound { .. })));

        config.imagemagick.executable = "definitely-not-an-installed-tool".to_string();
        assert!(ImageMagickAction::init(&config).is_err());
    }

    #[test]
    fn test_init_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("convert");
        std::fs::write(&exe, b"").unwrap();

        let mut config = Config::default();
        config.imagemagick.executable = exe.display().to_string();
        let action = ImageMagickAction::init(&config).unwrap();
        assert_eq!(action.resolver().executable(), exe.as_path());
    }
}
