use crate::cloud::CloudClassification;
use crate::model::{CloudCell, Row};
use colored::*;

const LINK_HEADER: &str = "Link";
const CLOUD_HEADER: &str = "Cloud";

pub fn separator(msg: &str) {
    let total_width: usize = 60;
    let formatted = format!("⟦ {} ⟧", msg);
    let dash_count = total_width.saturating_sub(formatted.chars().count());
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

pub fn print_status(msg: &str) {
    let prefix = ">".bright_black();
    println!("{} {}", prefix, msg);
}

fn link_width(rows: &[Row]) -> usize {
    rows.iter()
        .map(|row| row.link().chars().count())
        .max()
        .unwrap_or(0)
        .max(LINK_HEADER.len())
}

/// One uncolored table line.
pub fn format_row(link: &str, cloud: &str, width: usize) -> String {
    format!("{:width$}  {}", link, cloud, width = width)
}

fn paint(cell: &CloudCell) -> ColoredString {
    let label = cell.label();
    match cell {
        CloudCell::Done(CloudClassification::Cloudflare) => label.truecolor(243, 128, 32),
        CloudCell::Done(CloudClassification::Aws) => label.yellow(),
        CloudCell::Done(CloudClassification::Online) => label.green(),
        CloudCell::Done(CloudClassification::Unreachable) => label.red(),
        CloudCell::Done(CloudClassification::Server(_)) => label.cyan(),
        CloudCell::Pending | CloudCell::Skipped => label.bright_black(),
    }
}

pub fn print_table(rows: &[Row]) {
    if rows.is_empty() {
        return;
    }
    let width = link_width(rows);
    println!(
        "{}",
        format_row(LINK_HEADER, CLOUD_HEADER, width).bold()
    );
    for row in rows {
        println!("{:width$}  {}", row.link(), paint(&row.cloud), width = width);
    }
}

/// A row whose cloud cell just settled, printed below the table.
pub fn print_update(row: &Row, rows: &[Row]) {
    let width = link_width(rows);
    println!(
        "{} {:width$}  {}",
        "↻".bright_black(),
        row.link(),
        paint(&row.cloud),
        width = width
    );
}

pub fn print_session_header(scan_enabled: bool, copy_label: &str, copy_enabled: bool, clear_visible: bool) {
    let mut actions = vec![if scan_enabled {
        "<domain> scan".normal()
    } else {
        "scanning...".bright_black()
    }];
    actions.push(if copy_enabled {
        format!(":copy {}", copy_label).normal()
    } else {
        format!(":copy {}", copy_label).bright_black()
    });
    if clear_visible {
        actions.push(":clear".normal());
    }
    actions.push(":show".normal());
    actions.push(":quit".normal());

    let line: Vec<String> = actions.iter().map(|action| action.to_string()).collect();
    println!("{}", line.join(" | ").dimmed());
}
