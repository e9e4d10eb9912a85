//! Colored console reporting
//!
//! The human-facing output: section subheaders, per-case verdict lines,
//! failure dumps, and the final banner.

use colored::{Color, Colorize};

use super::executor::CaseReport;
use crate::common::Error;
use crate::suite::ResolvedTestCase;

const DESCRIPTION_WIDTH: usize = 50;

/// Three-line banner for the final verdict or a run error
pub fn header(text: &str, color: Color) {
    let border = format!("####{}####", "#".repeat(text.len()));
    println!();
    println!("{}", border.color(color));
    println!("{}", format!("### {} ###", text).color(color));
    println!("{}", border.color(color));
}

/// Section separator printed before the section's first case
pub fn subheader(text: &str) {
    println!("{}", format!("### {} ###", text).blue());
}

/// Dimmed progress note
pub fn note(text: &str) {
    println!("{}", text.dimmed());
}

/// Per-case verdict line with truncated description
pub fn case_line(case: &ResolvedTestCase, passed: bool) {
    let mark = if passed { "✓".green() } else { "✗".red() };
    println!(
        "{} {}: {}",
        mark,
        case.name,
        truncate(&case.description, DESCRIPTION_WIDTH).dimmed()
    );
}

/// Pretty-printed failure record
pub fn failure(case: &CaseReport) {
    let record = case.as_record();
    let rendered = serde_json::to_string_pretty(&record).unwrap_or_else(|_| record.to_string());
    println!("{}", rendered.yellow());
}

/// Listed under the success banner in verbose mode
pub fn success_line(case: &CaseReport) {
    println!("{}", format!("{}: no issues", case.name).green());
}

/// Run-error detail printed under the ERROR banner
pub fn error(error: &Error) {
    eprintln!("{}", error.to_string().red());
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate("", 50), "");
    }
}
