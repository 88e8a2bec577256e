//! Terminal output utilities
//!
//! Stdout is reserved for results; decorated status lines go to stderr.

use console::style;
use lucy_image::{LayerComparison, PlatformStatus, PlatformVerdict};

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print one line per platform describing how it compared
pub fn platform_verdict(verdict: &PlatformVerdict) {
    let platform = verdict.platform.to_string();

    match &verdict.status {
        PlatformStatus::Compared(LayerComparison::Match {
            boundary,
            layers_compared,
        }) => success(&format!(
            "{}: {} base layers match, last {}",
            style(platform).bold(),
            layers_compared,
            short_digest(boundary)
        )),
        PlatformStatus::Compared(LayerComparison::Mismatch {
            index,
            target_digest,
            ..
        }) => error(&format!(
            "{}: layer {} differs ({})",
            style(platform).bold(),
            index,
            short_digest(target_digest)
        )),
        PlatformStatus::MissingInBase => warning(&format!(
            "{}: not provided by the base image",
            style(platform).bold()
        )),
    }
}

/// `sha256:` plus the first 12 hex characters
fn short_digest(digest: &str) -> &str {
    match digest.split_once(':') {
        Some((algorithm, hex)) if hex.len() > 12 && hex.is_char_boundary(12) => {
            &digest[..algorithm.len() + 1 + 12]
        }
        _ => digest,
    }
}
