//! # Effect Catalog
//!
//! Each effect is an ImageMagick command template plus the fields it reads
//! and, for a few effects, a step that derives extra values from the image
//! size. The catalog is built once and shared read-only.
//!
//! ## Built-in Effects
//!
//! 3D Edge, Blur, Bullet, Charcoal, Motion Blur, Paint, Pencil Sketch,
//! Polaroid, Shadow, Sharpen, Sigmoidal Contrast, Unsharp and Wave.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use magick_batch::effects::EffectCatalog;
//!
//! # fn main() -> magick_batch::Result<()> {
//! let catalog = EffectCatalog::new()?;
//! let labels = catalog.relevant_field_labels("Shadow")?;
//! assert_eq!(labels[0], "Action");
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod catalog;
pub mod derive;
pub mod template;

pub use catalog::{EffectCatalog, EffectSpec, EXECUTABLE_KEY};
pub use derive::DeriveFn;
pub use template::Template;
