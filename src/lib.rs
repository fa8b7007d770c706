//! # magick-batch
//!
//! Batch photo effects driven by ImageMagick command templates.
//!
//! Each effect is a `convert` command line with named placeholders. Given the
//! field values a user picked and the size of a photo, the library fills in
//! the template (turning percentages into pixels, deriving a few values per
//! effect) and runs the command once for that photo. All pixel work happens in
//! ImageMagick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use magick_batch::{config::Config, photo::FilePhoto, ImageMagickAction};
//!
//! # fn main() -> anyhow::Result<()> {
//! let action = ImageMagickAction::init(&Config::default())?;
//! let settings = action
//!     .default_settings()
//!     .with_effect("Shadow")
//!     .set("Blur Radius", "2%");
//!
//! let photo = FilePhoto::open("holiday.jpg", "holiday_shadow.png")?;
//! action.apply(photo, &settings)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`effects`] - The effect table: templates, relevant fields, derived values
//! - [`fields`] - Field declarations, pixel/percentage lengths, raw settings
//! - [`resolver`] - Turns an effect and settings into a command line
//! - [`photo`] - Photo handles that run the command
//! - [`action`] - Host hooks: init, interface, relevance, apply
//! - [`batch`] - Parallel application over many files
//! - [`config`] - Configuration management

pub mod action;
pub mod batch;
pub mod config;
pub mod effects;
pub mod error;
pub mod fields;
pub mod photo;
pub mod resolver;

// Re-export commonly used types for convenience
pub use crate::{
    action::{find_exe, ImageMagickAction},
    batch::{BatchProcessor, BatchReport},
    config::Config,
    effects::EffectCatalog,
    error::{MagickError, Result},
    fields::Settings,
    photo::Photo, // Export Photo trait
    resolver::CommandResolver,
};
