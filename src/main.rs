use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, Level};

use magick_batch::{
    batch::{BatchProcessor, Outcome},
    config::Config,
    fields::{FieldKind, Settings},
    photo::PhotoInfo,
    ImageMagickAction,
};

#[derive(Parser)]
#[command(
    name = "magick-batch",
    version,
    about = "Apply ImageMagick effects to batches of photos",
    long_about = "magick-batch fills in ImageMagick command templates (Blur, Polaroid, Shadow, Unsharp and more) with per-photo values and runs them over many files in parallel."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an effect to photos
    Apply {
        #[command(flatten)]
        effect: EffectArgs,

        /// Directory for the processed photos
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output file extension (png, jpg, ...)
        #[arg(long)]
        extension: Option<String>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,

        /// Number of photos processed in parallel
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Input photos
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List available effects and the fields they use
    List,

    /// Show configurable fields and their defaults
    Fields {
        /// Only show the fields relevant to this effect
        #[arg(short, long)]
        effect: Option<String>,
    },

    /// Print the command an effect resolves to, without running it
    Command {
        #[command(flatten)]
        effect: EffectArgs,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Image height in pixels
        #[arg(long)]
        height: u32,
    },
}

#[derive(Args)]
struct EffectArgs {
    /// Effect to apply (see `list`)
    #[arg(short, long)]
    effect: Option<String>,

    /// Field value as "Label=value", e.g. --set "Blur Radius=2%"
    #[arg(short, long = "set", value_name = "LABEL=VALUE")]
    set: Vec<String>,
}

impl EffectArgs {
    fn settings(&self, action: &ImageMagickAction) -> Result<Settings> {
        let mut settings = action.default_settings();
        if let Some(effect) = &self.effect {
            settings.insert(magick_batch::fields::ACTION, effect.clone());
        }
        for assignment in &self.set {
            let (label, value) = Settings::parse_assignment(assignment)?;
            if !action.interface().contains(&label) {
                anyhow::bail!("Unknown field: {}", label);
            }
            settings.insert(label, value);
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    // Only `apply` needs the tool itself; the other commands just read the tables
    let action = match &cli.command {
        Commands::Apply { .. } => {
            ImageMagickAction::init(&config).map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        _ => {
            let catalog = config.build_catalog()?;
            let schema = config.build_schema(&catalog)?;
            ImageMagickAction::new(catalog, schema, PathBuf::from(&config.imagemagick.executable))
        }
    };

    match cli.command {
        Commands::Apply {
            effect,
            output_dir,
            extension,
            overwrite,
            threads,
            files,
        } => {
            let mut batch = config.batch.clone();
            if let Some(dir) = output_dir {
                batch.output_dir = dir;
            }
            if let Some(extension) = extension {
                batch.extension = extension;
            }
            if let Some(threads) = threads {
                batch.threads = threads.max(1);
            }
            batch.overwrite |= overwrite;

            let settings = effect.settings(&action)?;
            info!("Starting magick-batch v{}", env!("CARGO_PKG_VERSION"));

            let processor = BatchProcessor::new(&action, batch);
            let report = processor.run(&files, &settings).map_err(|e| anyhow::anyhow!(e.user_message()))?;

            for photo in &report.photos {
                if let Outcome::Failed { error } = &photo.outcome {
                    error!("{}: {}", photo.input.display(), error);
                }
            }
            if !report.is_success() {
                anyhow::bail!("{} of {} photos failed", report.failed(), report.photos.len());
            }
        }
        Commands::List => {
            for spec in action.catalog().iter() {
                println!("{:<20} {}", spec.name(), spec.fields().join(", "));
            }
        }
        Commands::Fields { effect } => {
            let labels = match effect {
                Some(effect) => action.relevant_field_labels(&effect)?,
                None => action.interface().iter().map(|f| f.label.clone()).collect(),
            };
            for label in labels {
                let field = action
                    .interface()
                    .get(&label)
                    .with_context(|| format!("field '{}' is not declared", label))?;
                println!("{:<20} {:<10} default: {:?}", field.label, kind_name(&field.kind), field.default);
            }
        }
        Commands::Command { effect, width, height } => {
            let settings = effect.settings(&action)?;
            let info = PhotoInfo::new(Path::new("file_in.tif"), width, height);
            println!("{}", action.command_for(&info, &settings)?);
        }
    }

    Ok(())
}

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Choice { .. } => "choice",
        FieldKind::Pixel { .. } => "pixel",
        FieldKind::Color => "color",
        FieldKind::Text { .. } => "text",
        FieldKind::Slider { .. } => "slider",
    }
}
