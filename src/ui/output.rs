use crate::guard::LOGIN_LOCATION;
use crate::models::{ResourceKind, Session};
use crate::stats::Breakdown;
use crate::view::Banner;
use colored::*;
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 32;

/// Print a success or error banner
pub fn display_banner(banner: &Banner) {
    match banner {
        Banner::Success(msg) => println!("{} {}", "✓".green(), msg.green()),
        Banner::Error(msg) => eprintln!("{} {}", "Error:".red(), msg),
    }
}

pub fn display_session(session: Option<&Session>) {
    match session {
        Some(session) => {
            println!(
                "{} {} {}",
                "Logged in as".green(),
                session.username.bold(),
                format!("({})", session.role).dimmed()
            );
        }
        None => println!("{}", "Not logged in".yellow()),
    }
}

/// Guard redirected a command to the login view
pub fn display_login_required(from: &str) {
    eprintln!(
        "{} {}",
        "Login required:".yellow(),
        format!("redirecting to {} (return to {})", LOGIN_LOCATION, from).dimmed()
    );
    eprintln!("{}", "Run `aeroadmin login` and try again.".dimmed());
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

/// Column order: id field first, then keys in first-seen order.
pub fn columns(kind: ResourceKind, records: &[Value]) -> Vec<String> {
    let mut columns = vec![kind.id_field().to_string()];
    for record in records {
        if let Value::Object(map) = record {
            for key in map.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

/// Print records as an aligned table
pub fn display_records(kind: ResourceKind, records: &[Value]) {
    if records.is_empty() {
        println!("{}", format!("No {} found", kind.plural()).dimmed());
        return;
    }

    let columns = columns(kind, records);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| cell(record.get(c).unwrap_or(&Value::Null)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        println!("{}", line.join("  "));
    }

    println!(
        "{}",
        format!("{} {}", records.len(), kind.plural()).dimmed()
    );
}

/// Print a single record as key/value lines
pub fn display_record(kind: ResourceKind, record: &Value) {
    println!("{}", kind.singular().to_uppercase().cyan());
    match record {
        Value::Object(map) => {
            let width = map.keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, value) in map {
                println!("  {:<width$}  {}", key.dimmed(), cell(value), width = width);
            }
        }
        other => println!("  {}", other),
    }
}

pub fn display_breakdown(kind: ResourceKind, stats: &Breakdown) {
    println!(
        "{} {}",
        format!("{} {}", stats.total, kind.plural()).bold(),
        format!("by {}", stats.field).dimmed()
    );
    let width = stats
        .buckets
        .iter()
        .map(|b| b.value.chars().count())
        .max()
        .unwrap_or(0);
    for bucket in &stats.buckets {
        println!(
            "  {:<width$}  {:>5}  {}",
            bucket.value,
            bucket.count,
            format!("{:>5.1}%", bucket.percent).cyan(),
            width = width
        );
    }
}
