// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use pageglot::app_config::{self, Config, TranslationProvider};
use pageglot::app_controller::Controller;
use pageglot::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "libretranslate")]
    LibreTranslate,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Overlay translations onto a PDF (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for pageglot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input PDF file
    #[arg(value_name = "INPUT_PDF")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation (Ollama)
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ar', 'fa')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory receiving the translated PDF
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// TrueType font to embed, tried before the configured ones
    #[arg(long)]
    font: Option<PathBuf>,
}

/// PageGlot - translation overlays for PDF pages
///
/// Extracts the text of every page, translates it and draws the translations
/// next to the original text, leaving the source content untouched.
#[derive(Parser, Debug)]
#[command(name = "pageglot")]
#[command(version)]
#[command(about = "Overlay machine translations onto PDF pages")]
#[command(long_about = "PageGlot extracts text from PDF pages, translates it and overlays the translation next to the original.

EXAMPLES:
    pageglot paper.pdf                          # Translate using default config
    pageglot -f paper.pdf                       # Force overwrite existing output
    pageglot -p ollama -m llama3.2:3b paper.pdf # Use a specific provider and model
    pageglot -s en -t fa paper.pdf              # Translate from English to Persian
    pageglot --font fonts/Amiri.ttf paper.pdf   # Embed a specific font
    pageglot completions bash > pageglot.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    libretranslate - LibreTranslate HTTP API (default: http://localhost:5000)
    ollama         - Local Ollama server (default: llama3.2:3b)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF file
    #[arg(value_name = "INPUT_PDF")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation (Ollama)
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ar', 'fa')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory receiving the translated PDF
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// TrueType font to embed, tried before the configured ones
    #[arg(long)]
    font: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
    // @field: Per-run log file, attached once the config is known
    file: Mutex<Option<File>>,
}

static LOGGER: once_cell::sync::Lazy<CustomLogger> = once_cell::sync::Lazy::new(|| CustomLogger {
    level: LevelFilter::Trace,
    file: Mutex::new(None),
});

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&*LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }

    // @attaches: Tee file for every following record
    fn attach_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            FileManager::ensure_dir(parent)?;
        }
        let file = File::create(path).with_context(|| format!("Failed to create log file: {:?}", path))?;
        *LOGGER.file.lock() = Some(file);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let emoji = Self::get_emoji_for_level(record.level());
        let color = Self::get_color_for_level(record.level());
        let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());

        if let Some(file) = self.file.lock().as_mut() {
            let _ = writeln!(file, "{} [{}] {}", now, record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is refined once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pageglot", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PDF is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                output_dir: cli.output_dir,
                config_path: cli.config_path,
                log_level: cli.log_level,
                font: cli.font,
            };
            run_translate(translate_args).await
        }
    }
}

/// Load the config file, writing a default one when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(config.translation.provider.clone());
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(output_dir) = &options.output_dir {
        config.output.output_dir = output_dir.clone();
    }

    if let Some(font) = &options.font {
        config.fonts.search_paths.insert(0, font.clone());
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if config.output.file_log {
        let log_path = FileManager::log_file_path(&config.output.log_dir);
        match CustomLogger::attach_file(&log_path) {
            Ok(()) => info!("Logging to {}", log_path.display()),
            Err(e) => warn!("File logging disabled: {}", e),
        }
    }

    let output_dir = config.output.output_dir.clone();
    let controller = Controller::with_config(config)?;
    let report = controller
        .run(options.input_path, output_dir, options.force_overwrite)
        .await?;

    log::logger().flush();
    if let Some(report) = report {
        if report.pages_failed > 0 {
            warn!("Completed with {} failed pages", report.pages_failed);
        }
    }

    Ok(())
}
