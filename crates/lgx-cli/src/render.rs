//! # Text Rendering
//!
//! Every function here is pure: it takes the sequence plus the injected
//! [`Localizer`] and [`ThemeTokens`] and returns the text to print.

use std::fmt::Write as _;

use lgx_catalog::{category_key, department_key, status_key, Localizer};
use lgx_core::Department;
use lgx_state::{
    compute_row_state, next_actionable, pending_for_department, summarize_by_category,
    summarize_by_department, GroupSummary, MilestoneSequence, MilestoneStatus, Progress,
};

use crate::session::Session;
use crate::theme::ThemeTokens;

const BAR_WIDTH: usize = 20;

/// Localized display name for a milestone key.
fn label(localizer: &dyn Localizer, key: &str) -> String {
    localizer.resolve(key).to_string()
}

/// One line per milestone, plus indented date/details/agent lines when set.
pub fn render_rows(
    sequence: &MilestoneSequence,
    localizer: &dyn Localizer,
    theme: &ThemeTokens,
) -> String {
    let names: Vec<String> = sequence
        .iter()
        .map(|m| label(localizer, &m.name_key))
        .collect();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (index, (m, name)) in sequence.iter().zip(&names).enumerate() {
        let status = compute_row_state(sequence, &m.id)
            .map_or(MilestoneStatus::Excluded, |rs| rs.status(m.selected));
        let padded = format!("{name:<width$}");
        let status_text = label(localizer, &status_key(status));
        let category_text = label(localizer, &category_key(m.category));
        let _ = writeln!(
            out,
            "{:>3}. {} {}  {}  [{}]",
            index + 1,
            theme.marker(status),
            theme.paint(theme.status_style(status), &padded),
            theme.paint(theme.status_style(status), &status_text),
            theme.paint(theme.category_style(m.category), &category_text),
        );
        let field_rows = [
            ("label.date", &m.date),
            ("label.details", &m.details),
            ("label.agent", &m.agent_name),
        ];
        for (key, value) in field_rows {
            if let Some(value) = value {
                let _ = writeln!(
                    out,
                    "         {}: {}",
                    theme.paint(theme.muted, &label(localizer, key)),
                    value
                );
            }
        }
    }
    out
}

/// `Progress: [#####---------------] 1/4 (25%)`
pub fn render_progress(progress: &Progress, localizer: &dyn Localizer, theme: &ThemeTokens) -> String {
    let filled = if progress.selected_count == 0 {
        0
    } else {
        BAR_WIDTH * usize::from(progress.percentage) / 100
    };
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    );
    let style = if progress.is_finished() {
        theme.success
    } else {
        theme.active
    };
    format!(
        "{}: [{}] {}",
        theme.paint(theme.bold, &label(localizer, "label.progress")),
        theme.paint(style, &bar),
        progress
    )
}

/// The next milestone that can be completed, or a "nothing to do" line.
pub fn render_next(sequence: &MilestoneSequence, localizer: &dyn Localizer, theme: &ThemeTokens) -> String {
    let heading = theme.paint(theme.bold, &label(localizer, "label.next_actionable"));
    match next_actionable(sequence) {
        Some(m) => format!("{heading}: {} ({})", label(localizer, &m.name_key), m.id),
        None => format!("{heading}: {}", label(localizer, "label.nothing_actionable")),
    }
}

fn summary_line(name: &str, summary: &GroupSummary) -> String {
    format!(
        "  {name:<14} {:>2} selected  {:>2} completed  {:>2} pending",
        summary.selected, summary.completed, summary.pending
    )
}

/// Per-category and per-department breakdown.
pub fn render_breakdown(sequence: &MilestoneSequence, localizer: &dyn Localizer, theme: &ThemeTokens) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", theme.paint(theme.bold, &label(localizer, "label.category")));
    for (category, summary) in summarize_by_category(sequence) {
        if summary.total == 0 {
            continue;
        }
        let name = label(localizer, &category_key(category));
        let _ = writeln!(out, "{}", theme.paint(theme.category_style(category), &summary_line(&name, &summary)));
    }
    let _ = writeln!(out, "{}:", theme.paint(theme.bold, &label(localizer, "label.department")));
    for (department, summary) in summarize_by_department(sequence) {
        let name = label(localizer, &department_key(department));
        let _ = writeln!(out, "{}", summary_line(&name, &summary));
    }
    out
}

/// Selected, incomplete milestones one department still owes.
pub fn render_pending(
    sequence: &MilestoneSequence,
    department: Department,
    localizer: &dyn Localizer,
    theme: &ThemeTokens,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}):",
        theme.paint(theme.bold, &label(localizer, "label.pending")),
        label(localizer, &department_key(department))
    );
    let pending = pending_for_department(sequence, department);
    if pending.is_empty() {
        let _ = writeln!(out, "  {}", label(localizer, "label.nothing_actionable"));
    }
    for m in pending {
        let _ = writeln!(
            out,
            "  - {} ({})",
            theme.paint(theme.category_style(m.category), &label(localizer, &m.name_key)),
            m.id
        );
    }
    out
}

/// Full status view of a session.
pub fn render_status(session: &Session, localizer: &dyn Localizer, theme: &ThemeTokens) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} {})",
        theme.paint(theme.bold, session.shipment.as_str()),
        session.direction,
        session.mode
    );
    let _ = writeln!(out, "  Record: {}", session.id);
    let _ = writeln!(out, "  Created: {}", session.created_at);
    let _ = writeln!(out, "  Updated: {}", session.updated_at);
    let _ = writeln!(out, "  Transitions: {}", session.transition_log.len());
    out.push('\n');
    out.push_str(&render_rows(&session.sequence, localizer, theme));
    out.push('\n');
    let _ = writeln!(
        out,
        "{}",
        render_progress(&lgx_state::progress(&session.sequence), localizer, theme)
    );
    let _ = writeln!(out, "{}", render_next(&session.sequence, localizer, theme));
    out
}
