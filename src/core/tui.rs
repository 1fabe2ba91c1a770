//! Terminal rendering.
//!
//! Everything here returns a `String` so the session can write to any sink;
//! colour is dropped automatically when stdout is not a terminal
//! (`colored` honours `NO_COLOR` and `CLICOLOR`).

use colored::{ColoredString, Colorize};
use std::env;

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxStyle {
    Info,
    Warning,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Pass,
    Warn,
    Fail,
    Info,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Pass => "[+]",
            ItemStatus::Warn => "[!]",
            ItemStatus::Fail => "[x]",
            ItemStatus::Info => "[*]",
        }
    }

    fn paint(&self, s: &str) -> ColoredString {
        match self {
            ItemStatus::Pass => s.bright_green(),
            ItemStatus::Warn => s.bright_yellow(),
            ItemStatus::Fail => s.bright_red(),
            ItemStatus::Info => s.cyan(),
        }
    }
}

pub fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(80)
}

fn box_width() -> usize {
    terminal_width().clamp(MIN_BOX_WIDTH, MAX_BOX_WIDTH)
}

pub fn box_top(width: usize) -> String {
    format!("╔{}╗", "═".repeat(width.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    format!("╚{}╝", "═".repeat(width.saturating_sub(2)))
}

/// `content` centred between `left` and `right` in `width` columns.
pub fn box_row(left: &str, content: &str, right: &str, width: usize) -> String {
    let padding = width
        .saturating_sub(2)
        .saturating_sub(content.chars().count());
    let left_pad = padding / 2;
    format!(
        "{}{}{}{}{}",
        left,
        " ".repeat(left_pad),
        content,
        " ".repeat(padding - left_pad),
        right
    )
}

pub fn render_box(title: &str, subtitle: &str, style: BoxStyle) -> String {
    let width = box_width();
    let paint = |s: &str| -> ColoredString {
        match style {
            BoxStyle::Info => s.bright_cyan(),
            BoxStyle::Warning => s.bright_yellow(),
            BoxStyle::Danger => s.bright_red(),
        }
    };

    let mut lines = vec![
        paint(&box_top(width)).to_string(),
        paint(&box_row("║", title, "║", width)).bold().to_string(),
    ];
    if !subtitle.is_empty() {
        lines.push(paint(&box_row("║", subtitle, "║", width)).to_string());
    }
    lines.push(paint(&box_bottom(width)).to_string());
    lines.join("\n")
}

/// Session banner.
pub fn banner(version: &str) -> String {
    render_box(
        "h @ c k y   /   A K I",
        &format!("a tool for collective intelligence  v{}", version),
        BoxStyle::Info,
    )
}

pub fn status_line(message: &str, status: ItemStatus) -> String {
    format!("  {} {}", status.paint(status.icon()), message)
}

pub fn section(title: &str) -> String {
    format!("\n  {}", title.bold())
}

pub fn key_value(key: &str, value: &str) -> String {
    format!("    {:<18} {}", key.bright_black(), value)
}

pub fn bullet(item: &str) -> String {
    format!("    • {}", item)
}

pub fn print_status_line(message: &str, status: ItemStatus) {
    println!("{}", status_line(message, status));
}

/// `3 PASS  1 WARN`. Zero WARN and FAIL counts are omitted.
pub fn mini_status(pass: usize, warn: usize, fail: usize) -> String {
    let mut parts = vec![format!("{} {}", pass, "PASS".green())];
    if warn > 0 {
        parts.push(format!("{} {}", warn, "WARN".yellow()));
    }
    if fail > 0 {
        parts.push(format!("{} {}", fail, "FAIL".red()));
    }
    format!("  {}", parts.join("  "))
}
