use serde_json::Value;
use std::collections::HashMap;

pub const MISSING_VALUE: &str = "(none)";

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

/// Display-only counts over a list of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub field: String,
    pub total: usize,
    pub buckets: Vec<Bucket>,
}

impl Breakdown {
    pub fn count_of(&self, value: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.value == value)
            .map(|b| b.count)
            .unwrap_or(0)
    }
}

/// Group records by one field; buckets are ordered by count, then value.
pub fn breakdown(records: &[Value], field: &str) -> Breakdown {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        *counts.entry(field_label(record.get(field))).or_insert(0) += 1;
    }

    let total = records.len();
    let mut buckets: Vec<Bucket> = counts
        .into_iter()
        .map(|(value, count)| Bucket {
            value,
            count,
            percent: percentage(count, total),
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    Breakdown {
        field: field.to_string(),
        total,
        buckets,
    }
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

fn field_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => MISSING_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
