//! Cleanup of scraped titles and summaries.
//!
//! The crawlers hand over raw HTML-extracted text: bracketed stage notes,
//! citation markers, repeated whitespace, and half-finished trailing
//! sentences (usually a chopped reference). One cleansing pass per record
//! normalizes all of that before dataset construction.

use regex::Regex;
use std::sync::LazyLock;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[].*?[\)\]]").expect("bracket regex is valid"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("whitespace regex is valid"));
static SPACED_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\.\s+").expect("period regex is valid"));

/// Clean an episode or show title: drop bracketed additions, collapse
/// whitespace runs, strip surrounding quotes.
pub fn cleanse_title(text: &str) -> String {
    let text = BRACKETED.replace_all(text, "");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    text.trim().trim_matches('"').trim().to_string()
}

/// Clean an episode summary.
///
/// Removes bracketed text and whitespace before periods, keeps only the
/// first paragraph, and trims a trailing sentence fragment back to the
/// last `.`, `?` or `!` (unfinished tails are usually citations).
pub fn cleanse_summary(text: &str) -> String {
    let text = BRACKETED.replace_all(text, "");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    let text = SPACED_PERIOD.replace_all(&text, ". ");

    let mut text = text.lines().next().unwrap_or("").to_string();

    if !(text.ends_with('.') || text.ends_with('?') || text.ends_with('!')) {
        let last_closing = ['.', '?', '!']
            .iter()
            .filter_map(|&c| text.rfind(c))
            .max();
        if let Some(idx) = last_closing {
            if idx > 0 {
                text.truncate(idx + 1);
            }
        }
    }

    if text.ends_with(" .") {
        text.truncate(text.len() - 2);
        text.push('.');
    }

    text
}
