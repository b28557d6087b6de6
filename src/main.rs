// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use glossgen::app_config::{self, Config, NerMode};
use glossgen::app_controller::Controller;

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

/// CLI Wrapper for NerMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliNerMode {
    Traditional,
    External,
}

impl From<CliNerMode> for NerMode {
    fn from(cli_mode: CliNerMode) -> Self {
        match cli_mode {
            CliNerMode::Traditional => NerMode::Traditional,
            CliNerMode::External => NerMode::External,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a glossary from a text or JSON file, or a directory of them
    Extract(ExtractArgs),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input file or directory
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output glossary path (defaults to <input>.glossary.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Only collect katakana terms, without calling the backend
    #[arg(short, long)]
    katakana_only: bool,

    /// Minimum occurrences for a term to be kept
    #[arg(short, long)]
    threshold: Option<usize>,

    /// NER mode override
    #[arg(short, long, value_enum)]
    ner: Option<CliNerMode>,

    /// Model name override
    #[arg(short, long, env = "GLOSSGEN_MODEL")]
    model: Option<String>,

    /// Log level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
#[command(name = "glossgen")]
#[command(version)]
#[command(about = "Glossary extraction for story text")]
#[command(long_about = "glossgen finds character names and other proper nouns in story text, \
selects supporting context for each one and enriches them through an OpenAI-compatible chat backend.

EXAMPLES:
    glossgen extract script.txt
    glossgen extract dialogue.json -o glossary.json
    glossgen extract scenario/ --katakana-only --threshold 2
    glossgen completions zsh > _glossgen")]
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
                "{}{} {:<5} {}\x1B[0m",
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
    // Max level is lowered or raised once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "glossgen", &mut std::io::stdout());
            Ok(())
        }
        Commands::Extract(args) => run_extract(args).await,
    }
}

async fn run_extract(options: ExtractArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    let mut config = Config::load_or_default(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(threshold) = options.threshold {
        config.count_threshold = threshold;
    }
    if let Some(ner) = &options.ner {
        config.ner_mode = ner.clone().into();
    }
    if let Some(model) = &options.model {
        config.backend.model = model.clone();
    }
    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.into()),
    }

    if !options.input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    let controller = Controller::with_config(config)?;
    let output = if options.katakana_only {
        controller.run_katakana(&options.input_path, options.output.clone(), options.threshold)?
    } else {
        controller.run(&options.input_path, options.output.clone()).await?
    };

    info!("Done: {}", output.display());
    Ok(())
}
