//! ImageMagick recipes shipped with the action.
//!
//! Templates read `file_in.tif` and write `file_out.png`; the photo handle
//! swaps those names for the real paths. See
//! <http://www.imagemagick.org/Usage/convolve/> for the blur family.

use crate::effects::catalog::EffectSpec;
use crate::effects::derive::{self, BULLET_KEYS, POLAROID_KEYS};
use crate::error::Result;
use crate::fields::*;

const EDGE_3D: &str = "{convert} file_in.tif  -fx A  +matte -blur 0x6  -shade 110x30  -normalize \
    file_in.tif  -compose Overlay -composite \
    file_in.tif  -matte  -compose Dst_In  -composite \
    file_out.png";

const BLUR: &str = "{convert} file_in.tif -blur {blur_radius}x{blur_sigma} file_out.png";

const BULLET: &str = "{convert} file_in.tif -matte \
    \\( +clone -channel A -separate +channel -negate \
    -bordercolor black -border {border}  -blur 0x{blur1} \
    -shade {shade} \
    -normalize -blur 0x{blur2} -fill '{color}' -tint 100 \\) \
    -gravity center -compose Atop -composite \
    file_out.png";

const CHARCOAL: &str = "{convert} file_in.tif -charcoal {charcoal_radius} file_out.png";

const MOTION_BLUR: &str =
    "{convert} file_in.tif -motion-blur {blur_radius}x{blur_sigma}+{blur_angle} file_out.png";

const PENCIL_SKETCH: &str = "{convert} file_in.tif -colorspace gray -sketch \
    {sketch_radius}x{sketch_sigma}+{sketch_angle} file_out.png";

const PAINT: &str = "{convert} file_in.tif -paint {paint_radius} file_out.png";

const POLAROID: &str = "{convert} {caption_cli} file_in.tif \
    -bordercolor '{border_color}' \
    -background '{shadow_color}' +polaroid file_out.png";

const SHADOW: &str = "{convert} file_in.tif \\( +clone  -background '{shadow_color}' \
    -shadow {blur_radius}x{blur_sigma}+{horizontal_offset}+{vertical_offset} \
    \\) +swap -background none   -layers merge  +repage file_out.png";

const SHARPEN: &str = "{convert} file_in.tif -sharpen {sharpen_radius}x{sharpen_sigma} file_out.png";

const SIGMOIDAL_CONTRAST: &str = "{convert} file_in.tif  \
    -sigmoidal-contrast {contrast_factor},{contrast_treshold}% \
    file_out.png";

const UNSHARP: &str = "{convert} file_in.tif -unsharp {unsharp_radius}x{unsharp_sigma} file_out.png";

const WAVE: &str = "{convert} file_in.tif -wave {wave_height}x{wave_length} file_out.png";

/// All built-in effects
pub fn effects() -> Result<Vec<EffectSpec>> {
    Ok(vec![
        EffectSpec::new("3D Edge", EDGE_3D, &[])?,
        EffectSpec::new("Blur", BLUR, &[BLUR_RADIUS, BLUR_SIGMA])?,
        EffectSpec::new("Bullet", BULLET, &[COLOR])?.with_derive(derive::bullet, BULLET_KEYS),
        EffectSpec::new("Charcoal", CHARCOAL, &[CHARCOAL_RADIUS])?,
        EffectSpec::new("Motion Blur", MOTION_BLUR, &[BLUR_RADIUS, BLUR_SIGMA, BLUR_ANGLE])?,
        EffectSpec::new("Paint", PAINT, &[PAINT_RADIUS])?,
        EffectSpec::new("Pencil Sketch", PENCIL_SKETCH, &[SKETCH_RADIUS, SKETCH_SIGMA, SKETCH_ANGLE])?,
        EffectSpec::new("Polaroid", POLAROID, &[BORDER_COLOR, SHADOW_COLOR, CAPTION])?
            .with_derive(derive::polaroid, POLAROID_KEYS),
        EffectSpec::new(
            "Shadow",
            SHADOW,
            &[HORIZONTAL_OFFSET, VERTICAL_OFFSET, SHADOW_COLOR, BLUR_RADIUS, BLUR_SIGMA],
        )?,
        EffectSpec::new("Sharpen", SHARPEN, &[SHARPEN_RADIUS, SHARPEN_SIGMA])?,
        EffectSpec::new("Sigmoidal Contrast", SIGMOIDAL_CONTRAST, &[CONTRAST_FACTOR, CONTRAST_TRESHOLD])?
            .with_derive(derive::sigmoidal_contrast, &[]),
        EffectSpec::new("Unsharp", UNSHARP, &[UNSHARP_RADIUS, UNSHARP_SIGMA])?,
        EffectSpec::new("Wave", WAVE, &[WAVE_HEIGHT, WAVE_LENGTH])?,
    ])
}
