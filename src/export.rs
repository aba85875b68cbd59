//! Machine-readable renderings of a generated batch.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::password_generation::GeneratedPassword;
use crate::strength::StrengthReport;
use crate::Password;

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: DateTime<Local>,
    count: usize,
    passwords: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    index: usize,
    password: &'a Password,
    analysis: &'a StrengthReport,
}

/// Pretty-printed JSON document: `generated_at`, `count`, and one entry per password with its
/// 1-based `index`, the `password`, and its `analysis`.
pub fn to_json(
    batch: &[GeneratedPassword],
    generated_at: DateTime<Local>,
) -> serde_json::Result<String> {
    let export = JsonExport {
        generated_at,
        count: batch.len(),
        passwords: batch
            .iter()
            .enumerate()
            .map(|(i, item)| JsonEntry {
                index: i + 1,
                password: &item.password,
                analysis: &item.report,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&export)
}

/// One password per line, no trailing newline.
pub fn to_plain(batch: &[GeneratedPassword]) -> String {
    batch
        .iter()
        .map(|item| item.password.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
