// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use slidecast::app_config::{self, Config, SpeechProvider};
use slidecast::file_utils::FileManager;
use slidecast::{parse_captions, VideoAssembler};

/// CLI Wrapper for SpeechProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSpeechProvider {
    Google,
    Espeak,
}

impl From<CliSpeechProvider> for SpeechProvider {
    fn from(cli_provider: CliSpeechProvider) -> Self {
        match cli_provider {
            CliSpeechProvider::Google => SpeechProvider::Google,
            CliSpeechProvider::Espeak => SpeechProvider::Espeak,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a narrated slideshow from images and captions
    Generate(GenerateArgs),

    /// Generate shell completions for slidecast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("captions").required(true).args(["texts", "texts_file"])))]
struct GenerateArgs {
    /// Images in slide order
    #[arg(value_name = "IMAGES")]
    images: Vec<PathBuf>,

    /// Directory of images, appended in file name order
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Captions as a JSON array of strings, one per image
    #[arg(short, long)]
    texts: Option<String>,

    /// File containing the JSON caption array
    #[arg(long)]
    texts_file: Option<PathBuf>,

    /// Output video file (default: timestamped file in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory override
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Speech provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliSpeechProvider>,

    /// Narration language code (e.g., 'fr', 'en')
    #[arg(long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// slidecast - narrated slideshow videos
///
/// Narrates each caption with text-to-speech and shows its image for the
/// length of the narration, then joins every slide into one video.
#[derive(Parser, Debug)]
#[command(name = "slidecast")]
#[command(version)]
#[command(about = "Narrated slideshow videos from images and captions")]
#[command(long_about = "slidecast narrates captions with text-to-speech and joins each image with its narration into a single video.

EXAMPLES:
    slidecast generate a.jpg b.jpg -t '[\"hello\", \"world\"]'
    slidecast generate --image-dir slides/ --texts-file captions.json -o talk.mp4
    slidecast generate a.jpg -t '[\"bonjour\"]' -p espeak --language fr
    slidecast completions bash > slidecast.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

REQUIREMENTS:
    ffmpeg and ffprobe on PATH (or configured), espeak-ng for the espeak provider.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "slidecast", &mut std::io::stdout());
            Ok(())
        }
        Commands::Generate(args) => run_generate(args).await,
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.speech.provider = provider.clone().into();
    }
    if let Some(language) = &options.language {
        config.speech.language = language.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.workspace.output_dir = output_dir.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let mut images = options.images.clone();
    if let Some(dir) = &options.image_dir {
        if !FileManager::dir_exists(dir) {
            return Err(anyhow!("Image directory does not exist: {:?}", dir));
        }
        images.extend(FileManager::find_images(dir)?);
    }

    let payload = match (&options.texts, &options.texts_file) {
        (Some(texts), _) => texts.clone(),
        (None, Some(path)) => FileManager::read_to_string(path)?,
        (None, None) => return Err(anyhow!("Captions are required (--texts or --texts-file)")),
    };
    let texts = parse_captions(&payload)?;

    let output_path = match &options.output {
        Some(path) => path.clone(),
        None => FileManager::generate_output_path(&config.workspace.output_dir),
    };

    info!(
        "Using {} ({}) for {} slide(s)",
        config.speech.provider.display_name(),
        config.speech.language,
        images.len()
    );

    let assembler = VideoAssembler::from_config(&config).context("Failed to set up providers")?;
    let video = assembler.create_video(images, texts, &output_path).await?;

    println!("{}", video.display());
    Ok(())
}
