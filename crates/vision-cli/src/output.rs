//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use vision_core::Record;

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

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print records one per line (or pretty-printed), then a count on stderr.
pub fn records(records: &[Record], pretty: bool) -> Result<()> {
    if records.is_empty() {
        eprintln!("{}", "No records found.".dimmed());
        return Ok(());
    }

    for record in records {
        if pretty {
            json_pretty(record)?;
        } else {
            json(record)?;
        }
    }

    eprintln!("{} {}", records.len().to_string().bold(), "records".dimmed());
    Ok(())
}
