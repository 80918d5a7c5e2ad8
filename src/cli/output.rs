use std::time::Duration;

use chrono::Utc;
use console::style;

use crate::storage::{Revision, RevisionType};

fn format_time_ago(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        return format!(
            "{} second{}",
            total_seconds,
            if total_seconds == 1 { "" } else { "s" }
        );
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" });
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hour{}", hours, if hours == 1 { "" } else { "s" });
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{} day{}", days, if days == 1 { "" } else { "s" });
    }

    let months = days / 30;
    if months < 12 {
        return format!("{} month{}", months, if months == 1 { "" } else { "s" });
    }

    let years = months / 12;
    format!("{} year{}", years, if years == 1 { "" } else { "s" })
}

pub fn format_revision_type(revision_type: RevisionType) -> console::StyledObject<&'static str> {
    match revision_type {
        RevisionType::Orphan => style("ROOT").dim(),
        RevisionType::Save => style("SAVE").fg(console::Color::Blue),
        RevisionType::Promotion => style("PROMOTION").fg(console::Color::Green),
    }
}

/// One line per revision, as used by `history`: id, type, state hint,
/// message.
pub fn format_revision_compact(revision: &Revision) -> crate::storage::StorageResult<String> {
    let kind = format_revision_type(revision.revision_type()?);
    let state = revision.state().unwrap_or("-");
    let message = revision.message()?;
    Ok(format!(
        "{} [{}] ({}) {}",
        style(&revision.id()[..12.min(revision.id().len())]).bold(),
        kind,
        state,
        message
    ))
}

/// Full detail for `show`: metadata plus the serialized content.
pub fn format_revision_detailed(revision: &Revision) -> crate::storage::StorageResult<String> {
    let mut output = String::new();

    let author = revision.author()?;
    let message = revision.message()?;
    let timestamp = revision.timestamp()?;
    let content = revision.content()?;
    let kind = format_revision_type(revision.revision_type()?);

    output.push_str(&format!(
        "Revision {}\n",
        style(revision.id()).bold().cyan()
    ));
    output.push_str(&format!("Type: {}\n", kind));
    if let Some(state) = revision.state() {
        output.push_str(&format!("State: {}\n", state));
    }
    output.push_str(&format!("Message: {}\n", message));

    let time_since = Utc::now() - timestamp;
    output.push_str(&format!(
        "Author: {} ({}), {} ago ({})\n",
        style(&author.name).green(),
        author.email,
        format_time_ago(time_since.to_std().unwrap_or_default()),
        timestamp.format("%Y-%m-%d %H:%M:%S")
    ));

    if let Some(previous) = revision.previous()? {
        output.push_str(&format!("Previous: {}\n", previous.id()));
    }
    if let Some(origin) = revision.origin()? {
        output.push_str(&format!("Origin: {}\n", origin.id()));
    }

    output.push_str("\nContent:\n");
    output.push_str(&content.to_json().unwrap_or_default());
    output.push('\n');

    Ok(output)
}

pub fn success_message(message: &str) -> String {
    format!("{} {}", style("✓").green().bold(), message)
}

pub fn error_message(message: &str) -> String {
    format!("{} {}", style("✗").red().bold(), message)
}

pub fn warning_message(message: &str) -> String {
    format!("{} {}", style("⚠").yellow().bold(), message)
}

pub fn info_message(message: &str) -> String {
    format!("{} {}", style("ℹ").blue().bold(), message)
}
