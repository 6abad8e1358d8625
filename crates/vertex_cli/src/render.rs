//! Plain-text rendering of state for the terminal.

use std::io::{self, Write};
use vertex_core::{
    AppState, KeyValueStore, ProgressStats, SearchHistoryEntry, TopicMatches, TopicNode,
    TopicStatus,
};

const INDENT: &str = "  ";

fn status_mark(status: TopicStatus) -> &'static str {
    match status {
        TopicStatus::Pending => "[ ]",
        TopicStatus::Learning => "[~]",
        TopicStatus::Mastered => "[x]",
    }
}

/// Renders the visible part of the tree; collapsed subtrees are skipped.
pub fn tree<S: KeyValueStore>(out: &mut dyn Write, state: &AppState<S>) -> io::Result<()> {
    let syllabus = state.syllabus();
    match (syllabus.root_id(), syllabus.title()) {
        (Some(root), title) => writeln!(
            out,
            "{} {} ({root})",
            status_mark(state.status(root)),
            title.unwrap_or(root)
        )?,
        (None, Some(title)) => writeln!(out, "{title}")?,
        (None, None) => {}
    }
    for node in state.syllabus().roots() {
        tree_node(out, state, node, 0)?;
    }
    Ok(())
}

fn tree_node<S: KeyValueStore>(
    out: &mut dyn Write,
    state: &AppState<S>,
    node: &TopicNode,
    depth: usize,
) -> io::Result<()> {
    let expanded = state.is_expanded(&node.id);
    let arrow = match (node.is_leaf(), expanded) {
        (true, _) => " ",
        (false, true) => "v",
        (false, false) => ">",
    };
    let focus = if state.focused_topic() == Some(node.id.as_str()) {
        "  <--"
    } else {
        ""
    };
    writeln!(
        out,
        "{}{arrow} {} {} ({}){focus}",
        INDENT.repeat(depth),
        status_mark(state.status(&node.id)),
        node.title,
        node.id
    )?;

    if expanded {
        for child in &node.children {
            tree_node(out, state, child, depth + 1)?;
        }
    }
    Ok(())
}

pub fn stats(out: &mut dyn Write, stats: &ProgressStats) -> io::Result<()> {
    writeln!(
        out,
        "{}% mastered ({} of {} topics)",
        stats.percent_mastered(),
        stats.mastered,
        stats.total
    )?;
    writeln!(out, "  mastered: {}", stats.mastered)?;
    writeln!(out, "  learning: {}", stats.learning)?;
    writeln!(out, "  pending:  {}", stats.pending)
}

pub fn search_results(out: &mut dyn Write, matches: &TopicMatches<'_>) -> io::Result<()> {
    if matches.total == 0 {
        return writeln!(out, "No topics match \"{}\".", matches.query);
    }
    for hit in &matches.hits {
        let brief = hit
            .brief_description
            .as_deref()
            .or(hit.description.as_deref())
            .unwrap_or("");
        if brief.is_empty() {
            writeln!(out, "{} ({})", hit.title, hit.id)?;
        } else {
            writeln!(out, "{} ({}) - {brief}", hit.title, hit.id)?;
        }
    }
    if matches.is_truncated() {
        writeln!(
            out,
            "Showing {} of {} matches. Refine the query to narrow it down.",
            matches.hits.len(),
            matches.total
        )?;
    }
    Ok(())
}

pub fn history(out: &mut dyn Write, entries: &[SearchHistoryEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No recent searches.");
    }
    for entry in entries {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|utc| {
                utc.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        match &entry.topic_id {
            Some(topic_id) => writeln!(out, "{when}  {} -> {topic_id}", entry.query)?,
            None => writeln!(out, "{when}  {}", entry.query)?,
        }
    }
    Ok(())
}

/// Screen shown when the syllabus cannot be loaded.
pub fn unavailable(out: &mut dyn Write, location: &str, reason: &str) -> io::Result<()> {
    writeln!(out, "Syllabus data is unavailable.")?;
    writeln!(out, "  source: {location}")?;
    writeln!(out, "  reason: {reason}")?;
    writeln!(out, "Check the file and retry, or pass --retries N to retry automatically.")
}

/// Generic screen for unexpected failures; details go to the log only.
pub fn failure(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Something went wrong.")?;
    writeln!(out, "Your progress is saved. Run the command again to reload.")
}
