//! Human-readable rendering of passwords and history, and batch output.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use chrono::Local;
use console::Style;
use rand::rngs::OsRng;

use strongpass::history::{HistoryRecord, LedgerStore};
use strongpass::password_generation::generate_batch;
use strongpass::{export, GeneratedPassword, Ledger, StrengthTier};

use crate::table::{display_table, TableDisplay};
use crate::{AppConfig, OutputFormat, ProgError};

/// How many records the history view shows.
pub(crate) const HISTORY_VIEW_LIMIT: usize = 20;

const RULE_WIDTH: usize = 58;

pub(crate) fn run_batch(config: &AppConfig) -> Result<(), ProgError> {
    let batch = generate_batch(&mut OsRng, &config.generation, config.count)?;

    match config.format {
        OutputFormat::Json => {
            let json = export::to_json(&batch, Local::now())
                .context("failed to encode the passwords as JSON")?;
            emit(config.output.as_deref(), &json)?;
        }
        OutputFormat::Plain => emit(config.output.as_deref(), &export::to_plain(&batch))?,
        OutputFormat::Human => {
            let mut stdout = io::stdout().lock();
            write_banner(&mut stdout)?;
            write_batch(&mut stdout, &batch, config.show_analysis)?;
            drop(stdout);
            if let Some(path) = config.output.as_deref() {
                save_to_file(path, &export::to_plain(&batch))?;
            }
        }
    }
    Ok(())
}

fn emit(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => save_to_file(path, content),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

fn save_to_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("Saved to {}", path.display());
    Ok(())
}

pub(crate) fn write_banner(mut out: impl Write) -> io::Result<()> {
    let border = "═".repeat(RULE_WIDTH);
    writeln!(out, "╔{border}╗")?;
    writeln!(out, "║{:^width$}║", "Strong Password Generator", width = RULE_WIDTH)?;
    writeln!(
        out,
        "║{:^width$}║",
        "length · strength · no confusing characters · history",
        width = RULE_WIDTH
    )?;
    writeln!(out, "╚{border}╝")?;
    writeln!(out)
}

/// The batch between two rules, one card per password.
pub(crate) fn write_batch(
    mut out: impl Write,
    batch: &[GeneratedPassword],
    show_analysis: bool,
) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "Generated passwords:")?;
    writeln!(out)?;
    for (i, item) in batch.iter().enumerate() {
        write_card(&mut out, i + 1, item, show_analysis)?;
    }
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn write_card(
    mut out: impl Write,
    index: usize,
    item: &GeneratedPassword,
    show_analysis: bool,
) -> io::Result<()> {
    writeln!(out, "  [{index}] {}", item.password.as_str())?;
    if show_analysis {
        let report = &item.report;
        writeln!(
            out,
            "      {} | entropy: {} bits | time to crack: {}",
            tier_style(report.tier).apply_to(format!(
                "{} ({})",
                report.tier.label(),
                report.tier.description()
            )),
            report.entropy,
            report.crack_time,
        )?;
        writeln!(out)?;
    }
    Ok(())
}

fn tier_style(tier: StrengthTier) -> Style {
    match tier {
        StrengthTier::ExtremelyWeak => Style::new().red().bold(),
        StrengthTier::Weak => Style::new().red(),
        StrengthTier::Moderate => Style::new().yellow(),
        StrengthTier::Strong => Style::new().green(),
        StrengthTier::VeryStrong => Style::new().cyan(),
        StrengthTier::ExtremelyStrong => Style::new().magenta(),
    }
}

struct HistoryRow([String; 5]);

impl HistoryRow {
    fn new(index: usize, record: &HistoryRecord) -> HistoryRow {
        HistoryRow([
            index.to_string(),
            record.length.to_string(),
            record.strength.label().to_owned(),
            record.entropy.to_string(),
            record
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ])
    }
}

impl TableDisplay for HistoryRow {
    const COLUMNS: &'static [&'static str] = &["#", "Length", "Strength", "Entropy", "Created"];

    fn cell(&self, column_index: usize) -> &str {
        &self.0[column_index]
    }
}

/// The most recent records as a table. A ledger that cannot be read is reported, not returned as
/// an error.
pub(crate) fn write_history<S: LedgerStore>(
    ledger: &Ledger<S>,
    mut out: impl Write,
) -> io::Result<()> {
    let summary = match ledger.summary(HISTORY_VIEW_LIMIT) {
        Ok(summary) => summary,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read password history");
            return writeln!(out, "The history could not be read: {err}");
        }
    };
    if summary.total == 0 {
        return writeln!(out, "No history yet.");
    }

    let rows = summary
        .recent
        .iter()
        .enumerate()
        .map(|(i, record)| HistoryRow::new(i + 1, record))
        .collect::<Vec<_>>();
    writeln!(out)?;
    display_table(&rows, &mut out)?;
    writeln!(out)?;
    writeln!(
        out,
        "{} records in total (showing the most recent {}).",
        summary.total,
        rows.len()
    )?;
    writeln!(
        out,
        "Only digests are kept; the passwords themselves are never stored."
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use strongpass::history::MemoryStore;
    use strongpass::{analyze, GenerationConfig, Password};

    use super::*;

    fn render_history(ledger: &Ledger<MemoryStore>) -> String {
        let mut out = Vec::new();
        write_history(ledger, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_history() {
        let ledger = Ledger::new(MemoryStore::default());
        assert_eq!(render_history(&ledger), "No history yet.\n");
    }

    #[test]
    fn history_table_is_capped() {
        let ledger = Ledger::new(MemoryStore::default());
        for i in 0..25 {
            let password = Password::from(format!("Secret-{i:02}"));
            ledger.record_at(&password, &analyze(password.as_str()), Utc::now());
        }
        let rendered = render_history(&ledger);
        assert!(rendered.contains("Strength"));
        assert!(rendered.contains("25 records in total (showing the most recent 20)."));
        assert!(!rendered.contains("Secret-"));
    }

    #[test]
    fn cards_show_analysis_on_request() {
        let config = GenerationConfig::default();
        let batch = generate_batch(&mut OsRng, &config, 2).unwrap();

        let mut with = Vec::new();
        write_batch(&mut with, &batch, true).unwrap();
        let with = String::from_utf8(with).unwrap();
        assert!(with.contains("  [1] "));
        assert!(with.contains("  [2] "));
        assert!(with.contains("time to crack"));

        let mut without = Vec::new();
        write_batch(&mut without, &batch, false).unwrap();
        let without = String::from_utf8(without).unwrap();
        assert!(without.contains(batch[1].password.as_str()));
        assert!(!without.contains("time to crack"));
    }
}
