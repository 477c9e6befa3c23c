use clap::Parser;
use sprite_prep::config::{self, BgMethod, ConfigError, ResizeBounds, SpriteConfig};
use sprite_prep::sprite::{ProcessEvent, SpriteError};
use sprite_prep::{batch, output, sheet, sprite};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};

fn version_string() -> &'static str {
    let hash = env!("SPRITE_PREP_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "sprite-prep")]
#[command(about = "Remove backgrounds, trim and resize game sprites")]
#[command(long_about = "\
Remove backgrounds, trim and resize game sprites

Each image goes through a fixed pipeline; every stage can be switched off:

  decode → remove background → trim → resize → save

Outputs are written next to the input with a marker added to the name
(toad.png → toad_processed.png) unless --output is given. In directory mode
files already carrying the marker are skipped, so reruns are safe.

Background methods:
  white   every channel above --threshold becomes transparent
  corner  colours within --tolerance of the top-left pixel, anywhere
  flood   same colour test, but only regions connected to the image edge

Examples:
  sprite-prep toad.png
  sprite-prep toad.png --bg-method corner --size 64x64 --canvas
  sprite-prep sprites/ --output cleaned/
  sprite-prep walk.png --frames 32x32

Run 'sprite-prep --gen-config' to print a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Input image file or directory
    #[arg(required_unless_present = "gen_config")]
    input: Option<PathBuf>,

    /// Output file, or output directory for directory and sheet mode
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat the input as a directory of sprites
    #[arg(long)]
    batch: bool,

    /// Keep the background as is
    #[arg(long)]
    no_remove_bg: bool,

    /// How background pixels are selected [default: white]
    #[arg(long, value_enum)]
    bg_method: Option<BgMethod>,

    /// White method: channels strictly above this are background [default: 240]
    #[arg(long)]
    threshold: Option<u8>,

    /// Corner/flood methods: max per-channel distance, exclusive [default: 30]
    #[arg(long)]
    tolerance: Option<u32>,

    /// Keep the full image instead of cropping to the content
    #[arg(long)]
    no_trim: bool,

    /// Transparent margin kept around the content when trimming [default: 2]
    #[arg(long)]
    padding: Option<u32>,

    /// Shrink to fit inside WIDTHxHEIGHT, keeping aspect ratio
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = config::parse_size)]
    size: Option<ResizeBounds>,

    /// Center the resized sprite on a transparent canvas of exactly --size
    #[arg(long)]
    canvas: bool,

    /// Split the input sprite sheet into frames of WIDTHxHEIGHT
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = config::parse_size, conflicts_with = "batch")]
    frames: Option<ResizeBounds>,

    /// Process directory files concurrently
    #[arg(long)]
    parallel: bool,

    /// Load settings from a TOML file (flags still win)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented, then exit
    #[arg(long)]
    gen_config: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            no_remove_bg: self.no_remove_bg,
            bg_method: self.bg_method,
            threshold: self.threshold,
            tolerance: self.tolerance,
            no_trim: self.no_trim,
            padding: self.padding,
            resize: self.size,
            canvas: self.canvas,
            parallel: self.parallel,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SpriteError> {
    let Some(input) = cli.input.as_deref() else {
        return Err(ConfigError::Validation("no input given".into()).into());
    };

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => SpriteConfig::default(),
    };
    config.apply(&cli.overrides());
    config.validate()?;

    let quiet = cli.quiet;
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            let error = output::is_error_event(&event);
            if quiet && !error {
                continue;
            }
            for line in output::format_process_event(&event) {
                if error {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
        }
    });

    let result = dispatch(cli, input, &config, &tx);
    drop(tx);
    // The printer only panics if stdout is gone; nothing left to report then
    let _ = printer.join();

    if let Some(summary) = result?.filter(|_| !quiet) {
        output::print_batch_summary(&summary);
    }
    Ok(())
}

/// Run the mode selected by the flags. Directory runs return their result
/// so the summary prints after all progress lines.
fn dispatch(
    cli: &Cli,
    input: &Path,
    config: &SpriteConfig,
    events: &Sender<ProcessEvent>,
) -> Result<Option<batch::BatchResult>, SpriteError> {
    if let Some(frames) = cli.frames {
        if input.is_dir() {
            return Err(ConfigError::Validation(format!(
                "--frames needs a sprite sheet file, {} is a directory",
                input.display()
            ))
            .into());
        }
        sheet::process_sheet(
            input,
            cli.output.as_deref(),
            (frames.max_width, frames.max_height),
            &config.processing,
            Some(events),
        )?;
        return Ok(None);
    }

    if cli.batch || input.is_dir() {
        if !input.exists() {
            return Err(SpriteError::NotFound(input.to_path_buf()));
        }
        if !input.is_dir() {
            return Err(ConfigError::NotADirectory(input.to_path_buf()).into());
        }
        if config.batch.parallel {
            init_thread_pool(&config.batch);
        }
        let result =
            batch::process_directory(input, cli.output.as_deref(), config, Some(events))?;
        return Ok(Some(result));
    }

    sprite::process(input, cli.output.as_deref(), &config.processing, Some(events))?;
    Ok(None)
}

/// Initialize the rayon thread pool based on batch config.
///
/// Caps at the number of available CPU cores: users can constrain down, not up.
fn init_thread_pool(batch: &config::BatchConfig) {
    let threads = config::effective_threads(batch);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
