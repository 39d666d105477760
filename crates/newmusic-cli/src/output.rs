//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use newmusic_core::error::ApiError;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a backend error with its per-field validation messages.
pub fn api_error(err: &ApiError) {
    error(&format!("{} ({})", err.message(), err.status));
    for (name, message) in err.field_errors() {
        eprintln!("  {}: {}", name.yellow(), message);
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
