use std::fmt::Write;

use unicode_truncate::UnicodeTruncateStr;

use crate::probe::prelude::{RankedEntry, RunReport};
use crate::relays::model::{CITY_NAME, COUNTRY_NAME, PROVIDER};
use crate::relays::prelude::{CityRow, CountryRow};

const MAX_COLUMN_WIDTH: usize = 40;
const UNKNOWN: &str = "Unknown";

fn display_width(input: &str) -> usize {
    input.unicode_truncate(usize::MAX).1
}

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

/// A plain text table with a title, padded to the widest cell in each column.
#[derive(Debug, Clone)]
pub struct Table {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| display_width(cell))
                    .chain(std::iter::once(display_width(header)))
                    .max()
                    .unwrap_or_default()
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    fn render_line(cells: &[String], widths: &[usize]) -> String {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| to_fixed_width(cells.get(i).map(String::as_str).unwrap_or_default(), *width))
            .collect();
        line.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", Self::render_line(&self.headers, &widths));
        let _ = writeln!(out, "{}", "-".repeat(rule_width));
        for row in &self.rows {
            let _ = writeln!(out, "{}", Self::render_line(row, &widths));
        }
        out
    }
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

fn server_row(entry: &RankedEntry) -> Vec<String> {
    let candidate = &entry.candidate;
    vec![
        candidate.address.clone(),
        format!("{:.3}", entry.latency_ms),
        or_unknown(candidate.meta(COUNTRY_NAME)),
        or_unknown(candidate.meta(CITY_NAME)),
        or_unknown(candidate.meta(PROVIDER)),
    ]
}

const SERVER_HEADERS: [&str; 5] = ["Hostname", "Ping Time (ms)", "Country", "City", "Provider"];

pub fn fastest_table(report: &RunReport) -> Option<Table> {
    let best = report.best()?;
    let mut table = Table::new("Fastest Server", &SERVER_HEADERS);
    table.add_row(server_row(best));
    Some(table)
}

pub fn next_fastest_table(report: &RunReport, count: usize) -> Option<Table> {
    let next = report.next(count);
    if next.is_empty() {
        return None;
    }
    let mut table = Table::new(format!("Next {} Fastest Servers", next.len()), &SERVER_HEADERS);
    for entry in next {
        table.add_row(server_row(entry));
    }
    Some(table)
}

/// One line summarising how many relays failed and why.
pub fn failure_summary(report: &RunReport) -> Option<String> {
    if report.failed.is_empty() {
        return None;
    }
    let mut by_reason = std::collections::BTreeMap::new();
    for reason in report.failed.values() {
        *by_reason.entry(*reason).or_insert(0usize) += 1;
    }
    let parts: Vec<String> = by_reason
        .into_iter()
        .map(|(reason, count)| format!("{count} {reason}"))
        .collect();
    Some(format!(
        "{} of {} relays did not answer ({})",
        report.failed.len(),
        report.total,
        parts.join(", ")
    ))
}

pub fn countries_table(rows: &[CountryRow]) -> Table {
    let mut table = Table::new(
        "Available Countries",
        &["No.", "Country", "Country Code", "Wireguard Servers", "OVPN Servers"],
    );
    for (idx, row) in rows.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            row.country_name.clone(),
            row.country_code.clone(),
            row.counts.wireguard.to_string(),
            row.counts.openvpn.to_string(),
        ]);
    }
    table
}

pub fn cities_table(rows: &[CityRow], country_code: Option<&str>) -> Table {
    let title = match country_code {
        Some(code) => format!("Available Cities in Country {}", code.to_uppercase()),
        None => "Available Cities".to_string(),
    };
    let mut table = Table::new(
        title,
        &["No.", "City", "City Code", "Country", "Country Code", "Wireguard Servers", "OVPN Servers"],
    );
    for (idx, row) in rows.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            row.city_name.clone(),
            row.city_code.clone(),
            row.country_name.clone(),
            row.country_code.clone(),
            row.counts.wireguard.to_string(),
            row.counts.openvpn.to_string(),
        ]);
    }
    table
}

pub fn providers_table(providers: &[String]) -> Table {
    let mut table = Table::new("Available Providers", &["No.", "Provider"]);
    for (idx, provider) in providers.iter().enumerate() {
        table.add_row(vec![(idx + 1).to_string(), provider.clone()]);
    }
    table
}
