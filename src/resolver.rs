use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::effects::{EffectCatalog, EXECUTABLE_KEY};
use crate::error::{ConfigError, Result};
use crate::fields::{field_key, Dimensions, FieldSchema, ParamValue, Settings};
use crate::photo::shell_quote;

/// Turns an effect name, raw field values and an image size into a command line
///
/// Holds only shared read-only state, so one resolver can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    catalog: Arc<EffectCatalog>,
    schema: Arc<FieldSchema>,
    executable: PathBuf,
}

impl CommandResolver {
    pub fn new(catalog: Arc<EffectCatalog>, schema: Arc<FieldSchema>, executable: PathBuf) -> Self {
        Self {
            catalog,
            schema,
            executable,
        }
    }

    /// Build the complete command for one photo
    ///
    /// Only the fields relevant to `effect_name` are read from `params`.
    pub fn resolve(&self, effect_name: &str, params: &Settings, width: u32, height: u32) -> Result<String> {
        let spec = self.catalog.get(effect_name)?;
        let values = self.resolve_values(effect_name, params, width, height)?;
        let command = spec.template().render(&values)?;

        debug!("Resolved '{}' for {}x{}: {}", effect_name, width, height, command);
        Ok(command)
    }

    /// Resolve the substitution map for an effect without rendering it
    pub fn resolve_values(
        &self,
        effect_name: &str,
        params: &Settings,
        width: u32,
        height: u32,
    ) -> Result<HashMap<String, ParamValue>> {
        let spec = self.catalog.get(effect_name)?;

        let dims = Dimensions::new(width, height);
        if dims.is_empty() {
            return Err(ConfigError::InvalidDimensions { width, height }.into());
        }

        let mut values = HashMap::with_capacity(spec.fields().len() + 4);
        for label in spec.fields() {
            let raw = params.get(label).ok_or_else(|| ConfigError::MissingField {
                effect: effect_name.to_string(),
                label: label.clone(),
            })?;
            let field = self
                .schema
                .get(label)
                .ok_or_else(|| ConfigError::UnknownField { label: label.clone() })?;
            values.insert(field_key(label), field.parse(raw, dims)?);
        }

        if let Some(derive) = spec.derive() {
            derive(&mut values, dims)?;
        }

        values.insert(
            EXECUTABLE_KEY.to_string(),
            ParamValue::Text(shell_quote(&self.executable.to_string_lossy())),
        );
        Ok(values)
    }

    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MagickError;
    use crate::fields::*;

    fn resolver() -> CommandResolver {
        let catalog = EffectCatalog::new().unwrap();
        let schema = FieldSchema::new(catalog.names());
        CommandResolver::new(Arc::new(catalog), Arc::new(schema), PathBuf::from("convert"))
    }

    fn defaults(resolver: &CommandResolver) -> Settings {
        resolver
            .schema()
            .iter()
            .map(|f| (f.label.clone(), f.default.clone()))
            .collect()
    }

    #[test]
    fn test_every_effect_resolves_with_defaults() {
        let resolver = resolver();
        let settings = defaults(&resolver);

        for name in resolver.catalog().names() {
            let command = resolver.resolve(&name, &settings, 640, 480).unwrap();
            assert!(command.starts_with("convert "), "{}: {}", name, command);
            assert!(!command.contains('{') && !command.contains('}'), "{}: {}", name, command);
            assert!(command.contains("file_in.tif") && command.ends_with("file_out.png"));
        }
    }

    #[test]
    fn test_blur_command() {
        let resolver = resolver();
        let settings = Settings::new().set(BLUR_RADIUS, "10%").set(BLUR_SIGMA, "3px");
        let command = resolver.resolve("Blur", &settings, 300, 100).unwrap();
        assert_eq!(command, "convert file_in.tif -blur 20x3 file_out.png");
    }

    #[test]
    fn test_shadow_offsets_use_width_and_height() {
        let resolver = resolver();
        let settings = Settings::new()
            .set(HORIZONTAL_OFFSET, "50%")
            .set(VERTICAL_OFFSET, "50%")
            .set(SHADOW_COLOR, "#000000")
            .set(BLUR_RADIUS, "80px")
            .set(BLUR_SIGMA, "3px");

        let values = resolver.resolve_values("Shadow", &settings, 200, 100).unwrap();
        assert_eq!(values["horizontal_offset"], ParamValue::Number(100.0));
        assert_eq!(values["vertical_offset"], ParamValue::Number(50.0));
        assert_eq!(values["blur_radius"], ParamValue::Number(80.0));

        let command = resolver.resolve("Shadow", &settings, 200, 100).unwrap();
        assert!(command.contains("-shadow 80x3+100+50"), "{}", command);
        assert!(command.contains("-background '#000000'"), "{}", command);
    }

    #[test]
    fn test_sigmoidal_contrast_rescaled() {
        let resolver = resolver();
        let settings = Settings::new().set(CONTRAST_FACTOR, "100").set(CONTRAST_TRESHOLD, "50");

        let values = resolver.resolve_values("Sigmoidal Contrast", &settings, 10, 10).unwrap();
        assert_eq!(values["contrast_factor"], ParamValue::Number(10.0));

        let command = resolver.resolve("Sigmoidal Contrast", &settings, 10, 10).unwrap();
        assert!(command.contains("-sigmoidal-contrast 10,50%"), "{}", command);
    }

    #[test]
    fn test_bullet_derived_values() {
        let resolver = resolver();
        let settings = Settings::new().set(COLOR, "#FF0000");

        let values = resolver.resolve_values("Bullet", &settings, 300, 300).unwrap();
        assert_eq!(values["border"], ParamValue::Number(100.0));
        assert_eq!(values["blur1"], ParamValue::Number(300.0 / 7.0));
        assert_eq!(values["shade"], ParamValue::from("405x315"));
        assert_eq!(values["blur2"], ParamValue::Number(25.0));

        let command = resolver.resolve("Bullet", &settings, 300, 300).unwrap();
        assert!(command.contains("-border 100 "), "{}", command);
        assert!(command.contains("-shade 405x315"), "{}", command);
        assert!(command.contains("-fill '#FF0000'"), "{}", command);
    }

    #[test]
    fn test_color_cannot_break_out_of_quotes() {
        let resolver = resolver();
        let settings = Settings::new().set(COLOR, "red' ; touch /tmp/owned ; echo '");

        let err = resolver.resolve("Bullet", &settings, 300, 300).unwrap_err();
        assert!(matches!(err, MagickError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_polaroid_caption_fragment() {
        let resolver = resolver();
        let base = Settings::new()
            .set(BORDER_COLOR, "#FFFFFF")
            .set(SHADOW_COLOR, "#000000");

        let without = resolver.resolve("Polaroid", &base.clone().set(CAPTION, ""), 10, 10).unwrap();
        assert!(without.starts_with("convert  file_in.tif"), "{}", without);
        assert!(!without.contains("-caption"));

        let with = resolver.resolve("Polaroid", &base.set(CAPTION, "Hi"), 10, 10).unwrap();
        assert!(with.contains("-caption \"Hi\" -gravity center"), "{}", with);
    }

    #[test]
    fn test_unknown_effect_fails() {
        let resolver = resolver();
        let err = resolver.resolve("Glow", &Settings::new(), 10, 10).unwrap_err();
        assert!(matches!(err, MagickError::Config(ConfigError::UnknownEffect { .. })));
    }

    #[test]
    fn test_missing_relevant_field_fails() {
        let resolver = resolver();
        let settings = Settings::new().set(BLUR_RADIUS, "5px");
        let err = resolver.resolve("Blur", &settings, 10, 10).unwrap_err();
        match err {
            MagickError::Config(ConfigError::MissingField { label, .. }) => assert_eq!(label, BLUR_SIGMA),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_irrelevant_fields_are_not_needed() {
        let resolver = resolver();
        let settings = Settings::new().set(WAVE_HEIGHT, "garbage").set(PAINT_RADIUS, "1%");
        let command = resolver.resolve("Paint", &settings, 200, 200).unwrap();
        assert_eq!(command, "convert file_in.tif -paint 2 file_out.png");
    }

    #[test]
    fn test_invalid_dimensions() {
        let resolver = resolver();
        let settings = Settings::new().set(PAINT_RADIUS, "1%");
        assert!(resolver.resolve("Paint", &settings, 0, 200).is_err());
    }

    #[test]
    fn test_executable_with_spaces_is_quoted() {
        let catalog = EffectCatalog::new().unwrap();
        let schema = FieldSchema::new(catalog.names());
        let resolver = CommandResolver::new(
            Arc::new(catalog),
            Arc::new(schema),
            PathBuf::from("/opt/Image Magick/convert"),
        );
        let command = resolver.resolve("3D Edge", &Settings::new(), 10, 10).unwrap();
        assert!(command.starts_with("'/opt/Image Magick/convert' "), "{}", command);
    }
}
