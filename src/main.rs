// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use dspace_ctask::app_config::{self, Config, ProviderKind};
use dspace_ctask::{Controller, TaskKind};

/// CLI Wrapper for TaskKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTask {
    Translate,
    Exif,
    Policy,
    Uri,
}

impl From<CliTask> for TaskKind {
    fn from(cli_task: CliTask) -> Self {
        match cli_task {
            CliTask::Translate => TaskKind::Translate,
            CliTask::Exif => TaskKind::Exif,
            CliTask::Policy => TaskKind::Policy,
            CliTask::Uri => TaskKind::Uri,
        }
    }
}

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Microsoft,
}

impl From<CliTranslationProvider> for ProviderKind {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => ProviderKind::Google,
            CliTranslationProvider::Microsoft => ProviderKind::Microsoft,
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
    /// Run a curation task over item records
    Curate(CurateArgs),

    /// Generate shell completions for dspace-ctask
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct CurateArgs {
    /// Item record (JSON) or directory of item records to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Task to run
    #[arg(short, long, value_enum)]
    task: CliTask,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Translation API key (overrides the config file)
    #[arg(long, env = "DSPACE_CTASK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Target languages, comma-separated (e.g. 'de,fr')
    #[arg(long)]
    languages: Option<String>,

    /// Run the task without writing records back
    #[arg(short = 'n', long)]
    dry_run: bool,
}

/// dspace-ctask - Metadata curation tasks for DSpace-style repositories
#[derive(Parser, Debug)]
#[command(name = "dspace-ctask")]
#[command(version)]
#[command(about = "Metadata curation tasks for DSpace-style repositories")]
#[command(long_about = "dspace-ctask runs one curation task over item records exported as JSON.

EXAMPLES:
    dspace-ctask curate -t translate item.json             # Translate configured fields
    dspace-ctask curate -t translate -p microsoft items/   # Use Microsoft Translator
    dspace-ctask curate -t exif --dry-run items/           # Show which EXIF values would be copied
    dspace-ctask curate -t policy items/ > anonymous.csv   # List anonymously readable bitstreams
    dspace-ctask curate -t uri -l debug item.json          # Regenerate the handle URI
    dspace-ctask completions bash > dspace-ctask.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google    - Google Translate API v2 (requires API key)
    microsoft - Microsoft Translator v3 (requires API key, optional region)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
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

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set once the
    // config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dspace-ctask", &mut std::io::stdout());
            Ok(())
        }
        Commands::Curate(args) => run_curate(args).await,
    }
}

// @loads: Config file, or writes and returns the defaults when it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

async fn run_curate(options: CurateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translator.provider = provider.clone().into();
    }
    if let Some(api_key) = &options.api_key {
        config.translator.api_key = api_key.clone();
    }
    if let Some(languages) = &options.languages {
        config.translator.language_targets = app_config::split_list(languages);
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    let kind: TaskKind = options.task.into();
    config.validate_for(kind).context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run(kind, &options.input_path, options.dry_run).await?;

    if options.dry_run && kind.modifies_items() {
        info!("Dry run: {} record(s) left untouched", summary.processed);
    }
    if summary.failed > 0 || summary.unreadable > 0 {
        warn!(
            "{} item(s) ended in error, {} record(s) could not be read or written",
            summary.failed, summary.unreadable
        );
    }

    Ok(())
}
