//! Message bodies in Telegram's legacy Markdown.

use chrono::{DateTime, Utc};
use monitor::{AlertEvent, Severity};

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "\u{2139}\u{fe0f}",    // ℹ️
        Severity::Medium => "\u{26a0}\u{fe0f}", // ⚠️
        Severity::High => "\u{1f536}",          // 🔶
        Severity::Critical => "\u{1f6a8}",      // 🚨
    }
}

/// Escapes the characters legacy Markdown treats as markup.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn alert_message(event: &AlertEvent, pool_label: &str) -> String {
    format!(
        "{emoji} *{severity} ALERT - {metric} change detected*\n\n\
         \u{1f4ca} *Pool:* {pool}\n\
         \u{2022} Change: {delta:+.2}%\n\
         \u{2022} Severity: {severity}\n\n\
         {message}\n\n\
         _{time}_",
        emoji = severity_emoji(event.severity),
        severity = event.severity,
        metric = event.metric,
        pool = escape_markdown(pool_label),
        delta = event.delta_pct,
        message = escape_markdown(&event.message),
        time = event.observed_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn diagnostic_message(message: &str) -> String {
    format!("\u{26a0}\u{fe0f} {}", escape_markdown(message))
}

/// Body of the `test-sink` connectivity check.
pub fn connectivity_message(pool_label: &str, now: DateTime<Utc>) -> String {
    format!(
        "\u{1f389} *Telegram connection successful!*\n\n\
         Pool monitor for {pool} is ready to send alerts.\n\n\
         \u{23f0} Time: {time}",
        pool = escape_markdown(pool_label),
        time = now.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
