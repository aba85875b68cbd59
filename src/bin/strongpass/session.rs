//! The interactive prompt: generate a batch, then let the user pick, regenerate, change the
//! length, or look at the history.

use std::io::{self, Write};

use anyhow::Context;
use console::Term;
use dialoguer::{Confirm, Input};
use rand::rngs::OsRng;

use strongpass::history::LedgerStore;
use strongpass::password_generation::generate_batch;
use strongpass::{
    GeneratedPassword, GenerationConfig, JsonFileStore, Ledger, MAX_LENGTH, MIN_LENGTH,
};

use crate::{clipboard, output, AppConfig, ProgError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Zero-based index into the current batch.
    Select(usize),
    Regenerate,
    ChangeLength,
    History,
    Quit,
}

impl Command {
    fn parse(input: &str, count: usize) -> Option<Command> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "r" => Some(Command::Regenerate),
            "l" => Some(Command::ChangeLength),
            "h" => Some(Command::History),
            "q" => Some(Command::Quit),
            n => match n.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => Some(Command::Select(n - 1)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// State of one interactive run. Prompts are read in [`Session::run`]; the handlers only see
/// what the user typed and write their output to `out`.
pub(crate) struct Session<W, S = JsonFileStore> {
    config: GenerationConfig,
    count: usize,
    batch: Vec<GeneratedPassword>,
    /// Absent only when the history location is unknown. Viewing works even when
    /// `record_history` is off.
    ledger: Option<Ledger<S>>,
    record_history: bool,
    copy_to_clipboard: fn(&str) -> anyhow::Result<()>,
    out: W,
}

impl Session<Term> {
    pub(crate) fn new(config: &AppConfig, ledger: Option<Ledger>) -> Session<Term> {
        Session::with_output(
            config.generation.clone(),
            config.count,
            ledger,
            config.record_history,
            clipboard::copy,
            Term::stdout(),
        )
    }
}

impl<W: Write, S: LedgerStore> Session<W, S> {
    fn with_output(
        config: GenerationConfig,
        count: usize,
        ledger: Option<Ledger<S>>,
        record_history: bool,
        copy_to_clipboard: fn(&str) -> anyhow::Result<()>,
        out: W,
    ) -> Session<W, S> {
        Session {
            config,
            count,
            batch: Vec::new(),
            ledger,
            record_history,
            copy_to_clipboard,
            out,
        }
    }

    pub(crate) fn run(&mut self) -> Result<(), ProgError> {
        output::write_banner(&mut self.out)?;
        writeln!(
            self.out,
            "Settings: length={}, count={}, exclude confusing characters={}",
            self.config.length,
            self.count,
            if self.config.exclude_confusing { "yes" } else { "no" },
        )?;
        writeln!(self.out)?;
        self.regenerate()?;

        loop {
            let prompt = format!(
                "[1-{}] pick | [r] regenerate | [l] length | [h] history | [q] quit",
                self.count
            );
            let input = match Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
            {
                Ok(input) => input,
                Err(err) if is_end_of_input(&err) => break,
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context("failed to read a command")
                        .into())
                }
            };

            let flow = match Command::parse(&input, self.count) {
                Some(Command::Select(index)) => {
                    self.pick(index)?;
                    let again = Confirm::new()
                        .with_prompt("Generate more?")
                        .default(false)
                        .interact_opt()
                        .context("failed to prompt you, somehow")?
                        .unwrap_or(false);
                    self.after_pick(again)?
                }
                Some(Command::Regenerate) => {
                    writeln!(self.out, "Regenerating...")?;
                    self.regenerate()?;
                    Flow::Continue
                }
                Some(Command::ChangeLength) => {
                    let input = Input::<String>::new()
                        .with_prompt(format!("New length ({MIN_LENGTH}-{MAX_LENGTH})"))
                        .interact_text()
                        .context("failed to read the new length")?;
                    self.change_length(&input)?;
                    Flow::Continue
                }
                Some(Command::History) => {
                    self.show_history()?;
                    Flow::Continue
                }
                Some(Command::Quit) => Flow::Stop,
                None => {
                    writeln!(self.out, "Invalid command.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                break;
            }
        }
        Ok(())
    }

    fn regenerate(&mut self) -> Result<(), ProgError> {
        self.batch = generate_batch(&mut OsRng, &self.config, self.count)?;
        output::write_batch(&mut self.out, &self.batch, true)?;
        Ok(())
    }

    /// Show the chosen password, copy it, and record it unless recording is off.
    fn pick(&mut self, index: usize) -> io::Result<()> {
        let chosen = &self.batch[index];
        let rule = "=".repeat(58);
        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "Your password: {}", chosen.password.as_str())?;
        writeln!(self.out, "{rule}")?;

        match (self.copy_to_clipboard)(chosen.password.as_str()) {
            Ok(()) => writeln!(self.out, "✓ Copied to the clipboard")?,
            Err(err) => tracing::debug!(error = %err, "clipboard unavailable"),
        }
        if self.record_history {
            if let Some(ledger) = &self.ledger {
                if ledger.record(&chosen.password, &chosen.report) {
                    writeln!(self.out, "✓ Recorded in the history (digest only)")?;
                }
            }
        }
        writeln!(self.out)
    }

    fn after_pick(&mut self, again: bool) -> Result<Flow, ProgError> {
        if again {
            self.regenerate()?;
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Stop)
        }
    }

    /// Apply a new length typed by the user. Anything that is not a valid length is reported
    /// and leaves the current length in place.
    fn change_length(&mut self, input: &str) -> Result<(), ProgError> {
        let length = match input.trim().parse::<usize>() {
            Ok(length) => length,
            Err(_) => {
                writeln!(self.out, "Please enter a number.")?;
                return Ok(());
            }
        };
        if let Err(err) = strongpass::validate_length(length) {
            writeln!(self.out, "{err}")?;
            return Ok(());
        }
        self.config.length = length;
        writeln!(self.out, "Password length set to {length}.")?;
        writeln!(self.out)?;
        self.regenerate()
    }

    fn show_history(&mut self) -> io::Result<()> {
        match &self.ledger {
            Some(ledger) => output::write_history(ledger, &mut self.out),
            None => writeln!(self.out, "The history location is unknown."),
        }
    }
}

fn is_end_of_input(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use strongpass::history::{digest, MemoryStore};
    use strongpass::Password;

    use super::*;

    fn no_clipboard(_: &str) -> anyhow::Result<()> {
        anyhow::bail!("no clipboard here")
    }

    fn clipboard_ok(_: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn session<S: LedgerStore>(store: S, record_history: bool) -> Session<Vec<u8>, S> {
        let mut session = Session::with_output(
            GenerationConfig::default(),
            3,
            Some(Ledger::new(store)),
            record_history,
            no_clipboard,
            Vec::new(),
        );
        session.regenerate().unwrap();
        session
    }

    fn printed<S>(session: &Session<Vec<u8>, S>) -> String {
        String::from_utf8(session.out.clone()).unwrap()
    }

    fn stored<S: LedgerStore>(session: &Session<Vec<u8>, S>) -> usize {
        session.ledger.as_ref().unwrap().store().load().unwrap().len()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("r", 3), Some(Command::Regenerate));
        assert_eq!(Command::parse(" L ", 3), Some(Command::ChangeLength));
        assert_eq!(Command::parse("h", 3), Some(Command::History));
        assert_eq!(Command::parse("q\n", 3), Some(Command::Quit));
    }

    #[test]
    fn selection_is_one_based_and_bounded() {
        assert_eq!(Command::parse("1", 3), Some(Command::Select(0)));
        assert_eq!(Command::parse("3", 3), Some(Command::Select(2)));
        assert_eq!(Command::parse("0", 3), None);
        assert_eq!(Command::parse("4", 3), None);
        assert_eq!(Command::parse("", 3), None);
        assert_eq!(Command::parse("x", 3), None);
    }

    #[test]
    fn invalid_length_keeps_the_current_one() {
        let mut session = session(MemoryStore::default(), true);

        session.change_length("7").unwrap();
        assert_eq!(session.config.length, 12);
        assert!(printed(&session).contains("must be between 8 and 128"));

        session.change_length("abc").unwrap();
        assert_eq!(session.config.length, 12);
        assert!(printed(&session).contains("Please enter a number."));

        session.change_length("129").unwrap();
        assert_eq!(session.config.length, 12);
        assert!(session.batch.iter().all(|item| item.password.char_len() == 12));
    }

    #[test]
    fn new_length_regenerates() {
        let mut session = session(MemoryStore::default(), true);
        session.change_length(" 16 ").unwrap();
        assert_eq!(session.config.length, 16);
        assert_eq!(session.batch.len(), 3);
        assert!(session.batch.iter().all(|item| item.password.char_len() == 16));
    }

    #[test]
    fn picking_records_one_digest() {
        let mut session = session(MemoryStore::default(), true);
        session.pick(1).unwrap();

        let records = session.ledger.as_ref().unwrap().store().load().unwrap();
        assert_eq!(records.len(), 1);
        let password = session.batch[1].password.as_str();
        assert_eq!(records[0].digest, digest(password));
        assert!(!serde_json::to_string(&records[0]).unwrap().contains(password));

        let out = printed(&session);
        assert!(out.contains("✓ Recorded in the history"));
        assert!(!out.contains("Copied"));
    }

    #[test]
    fn picking_with_recording_off_stores_nothing() {
        let mut session = session(MemoryStore::default(), false);
        session.pick(0).unwrap();
        assert_eq!(stored(&session), 0);
        assert!(!printed(&session).contains("Recorded"));
    }

    #[test]
    fn no_confirmation_when_storing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let unwritable = dir.path().join("missing").join("history.json");
        let mut session = session(JsonFileStore::new(unwritable.clone()), true);
        session.pick(0).unwrap();
        assert!(!printed(&session).contains("Recorded"));
        assert!(!unwritable.exists());
    }

    #[test]
    fn confirms_clipboard_copy() {
        let mut session = session(MemoryStore::default(), true);
        session.copy_to_clipboard = clipboard_ok;
        session.pick(2).unwrap();
        assert!(printed(&session).contains("✓ Copied to the clipboard"));
    }

    #[test]
    fn declining_to_continue_ends_the_session() {
        let mut session = session(MemoryStore::default(), true);
        assert_eq!(session.after_pick(false).unwrap(), Flow::Stop);
        assert_eq!(session.after_pick(true).unwrap(), Flow::Continue);
        assert_eq!(printed(&session).matches("Generated passwords:").count(), 2);
    }

    #[test]
    fn history_is_viewable_with_recording_off() {
        let mut session = session(MemoryStore::default(), false);
        let password = Password::from("Ab3!Ab3!Ab3!".to_owned());
        let ledger = session.ledger.as_ref().unwrap();
        assert!(ledger.record(&password, &strongpass::analyze(password.as_str())));

        session.pick(0).unwrap();
        session.show_history().unwrap();
        let out = printed(&session);
        assert!(out.contains("1 records in total"));
        assert!(!out.contains("The history location is unknown."));
    }
}
