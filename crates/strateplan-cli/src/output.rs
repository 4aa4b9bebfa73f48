//! Terminal output helpers

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use strateplan_core::format::TextTable;

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn warn(message: &str) {
    eprintln!("{}", message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("Error: {}", message).red());
}

/// Section heading
pub fn heading(title: &str) {
    println!("{}", title.bold());
}

/// Label/value pairs with the values aligned
pub fn details(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    for (label, value) in fields {
        let label = format!("{:<width$}", format!("{}:", label), width = width);
        println!("  {} {}", label.cyan(), value);
    }
}

/// Print a table, or `empty` when it has no rows
pub fn table(table: &TextTable, empty: &str) {
    if table.is_empty() {
        println!("{}", empty.dimmed());
    } else {
        println!("{}", table.render());
    }
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" is no
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt.yellow());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
