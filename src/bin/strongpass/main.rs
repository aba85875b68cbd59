use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strongpass::{
    CharacterClass, ClassSet, ConfigurationError, GenerationConfig, HistoryError, JsonFileStore,
    Ledger, ValidationError,
};

mod clipboard;
mod output;
mod session;
mod table;

/// Generate strong passwords, estimate how hard they are to brute-force, and keep a digest-only
/// history of the ones you pick.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Password length (8-128).
    #[arg(short, long, default_value_t = strongpass::DEFAULT_LENGTH)]
    length: usize,
    /// Number of passwords to generate (1-100).
    #[arg(short, long, default_value_t = strongpass::DEFAULT_COUNT)]
    count: usize,
    /// Leave out characters that are easy to confuse (0O1lI|).
    #[arg(short, long)]
    exclude_confusing: bool,
    #[arg(long)]
    no_uppercase: bool,
    #[arg(long)]
    no_lowercase: bool,
    #[arg(long)]
    no_digits: bool,
    #[arg(long)]
    no_special: bool,
    /// Print the passwords and their analysis as JSON.
    #[arg(long, conflicts_with = "plain")]
    json: bool,
    /// Print one password per line.
    #[arg(long)]
    plain: bool,
    /// Write the output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Do not show the strength analysis.
    #[arg(long)]
    no_analysis: bool,
    /// Show the password history and exit.
    #[arg(long)]
    history: bool,
    /// Do not record picked passwords in the history.
    #[arg(long)]
    no_history: bool,
    /// Print the passwords and exit, without the interactive prompt.
    #[arg(short, long)]
    batch: bool,
    /// Where the history is kept [default: ~/.password_history.json].
    #[arg(long, env = "STRONGPASS_HISTORY")]
    history_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Human,
    Json,
    Plain,
}

/// Everything decided at startup; read-only afterwards.
pub(crate) struct AppConfig {
    pub generation: GenerationConfig,
    pub count: usize,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub show_analysis: bool,
    pub record_history: bool,
    pub history_file: Option<PathBuf>,
    pub batch: bool,
}

impl AppConfig {
    fn from_args(args: &Args) -> Result<AppConfig, ProgError> {
        strongpass::validate_count(args.count)?;
        let classes = [
            (CharacterClass::Uppercase, args.no_uppercase),
            (CharacterClass::Lowercase, args.no_lowercase),
            (CharacterClass::Digit, args.no_digits),
            (CharacterClass::Special, args.no_special),
        ]
        .into_iter()
        .filter(|(_, disabled)| !disabled)
        .map(|(class, _)| class)
        .collect::<ClassSet>();
        let generation = GenerationConfig::new(args.length, classes, args.exclude_confusing)?;

        let format = if args.json {
            OutputFormat::Json
        } else if args.plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Human
        };
        let attended = io::stdin().is_terminal() && console::user_attended();
        let batch =
            args.batch || format != OutputFormat::Human || args.output.is_some() || !attended;

        Ok(AppConfig {
            generation,
            count: args.count,
            format,
            output: args.output.clone(),
            show_analysis: !args.no_analysis,
            record_history: !args.no_history,
            history_file: args.history_file.clone(),
            batch,
        })
    }

    fn history_store(&self) -> Result<JsonFileStore, HistoryError> {
        match &self.history_file {
            Some(path) => Ok(JsonFileStore::new(path.clone())),
            None => JsonFileStore::at_default_location(),
        }
    }
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();
    let config = AppConfig::from_args(&args)?;

    if args.history {
        let ledger = Ledger::new(config.history_store()?);
        output::write_history(&ledger, io::stdout().lock())?;
        return Ok(());
    }

    if config.batch {
        output::run_batch(&config)
    } else {
        // Kept even with `--no-history` so `h` can still show past records.
        let ledger = match config.history_store() {
            Ok(store) => Some(Ledger::new(store)),
            Err(err) => {
                tracing::warn!(error = %err, "history unavailable");
                None
            }
        };
        session::Session::new(&config, ledger).run()
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "strongpass=warn".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();

    match run() {
        Ok(()) => (),
        Err(ProgError::Other(err)) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProgError {
    #[error("{0}")]
    Validation(ValidationError),
    #[error("{0}")]
    Configuration(ConfigurationError),
    #[error("{0}")]
    History(HistoryError),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<ValidationError> for ProgError {
    fn from(err: ValidationError) -> ProgError {
        ProgError::Validation(err)
    }
}

impl From<ConfigurationError> for ProgError {
    fn from(err: ConfigurationError) -> ProgError {
        ProgError::Configuration(err)
    }
}

impl From<HistoryError> for ProgError {
    fn from(err: HistoryError) -> ProgError {
        ProgError::History(err)
    }
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<io::Error> for ProgError {
    fn from(err: io::Error) -> ProgError {
        ProgError::Other(err.into())
    }
}
