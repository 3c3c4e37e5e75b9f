// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::{DateTime, Local};
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use tabled::{
    settings::{object::Segment, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::{
    api::{Api, Session},
    error::Result,
};

const TITLE_WIDTH: usize = 40;
const SUMMARY_WIDTH: usize = 80;

/// List your recent dream sessions.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The maximum number of sessions to request.
    #[clap(short, long, default_value_t = 5)]
    limit: usize,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &mut super::Context<impl Api + Send + Sync>) -> Result<()> {
        let sessions = ctx.api.sessions(self.limit).await?;

        if sessions.is_empty() {
            println!("No dream sessions yet. Interpret your first dream with `moonbound interpret`.");
            return Ok(());
        }

        println!(
            "{}",
            Table::new(sessions.iter().map(Row::from))
                .with(Style::rounded())
                .with(Modify::new(Segment::all()).with(Alignment::left()))
        );
        println!("Open a conversation with `moonbound show <ID>`.");
        Ok(())
    }
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

impl From<&Session> for Row {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            title: derive_title(session),
            when: session
                .created_at
                .as_deref()
                .map(format_when)
                .unwrap_or_default(),
            summary: match session.summary_text() {
                "" => "(no summary)".to_owned(),
                text => clip(text, SUMMARY_WIDTH),
            },
        }
    }
}

// Phrases the interpretation service tends to open its summaries with.
static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"sueño de (.*?)[.,\n]",
        r"sueño con (.*?)[.,\n]",
        r"soñar con (.*?)[.,\n]",
        r"soñaste (.*?)[.,\n]",
        r"imagen de (.*?)[.,\n]",
        r"acto de (.*?)[.,\n]",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Best-effort display title: whatever the server called the session, else
/// the dream text, else the main topic pulled out of the summary, else the
/// first significant words of it. Cosmetic only.
pub(crate) fn derive_title(session: &Session) -> String {
    if let Some(title) = session.title.as_deref().filter(|title| !title.is_empty()) {
        return clip(title, TITLE_WIDTH);
    }
    if !session.dream_text.is_empty() {
        return clip(&session.dream_text, TITLE_WIDTH);
    }

    let summary = session.summary_text();
    let lowered = summary.to_lowercase();
    for pattern in TITLE_PATTERNS.iter() {
        if let Some(topic) = pattern
            .captures(&lowered)
            .and_then(|captures| captures.get(1))
            .map(|matched| matched.as_str().trim())
            .filter(|topic| !topic.is_empty())
        {
            return clip(&capitalize(topic), TITLE_WIDTH);
        }
    }

    let words = summary
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .take(5)
        .collect::<Vec<_>>()
        .join(" ");
    if words.is_empty() {
        "(untitled)".to_owned()
    } else {
        clip(&words, TITLE_WIDTH)
    }
}

pub(crate) fn format_when(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_owned(),
        |when| when.with_timezone(&Local).format("%d %b %H:%M").to_string(),
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut clipped: String = text.chars().take(max).collect();
        clipped.push_str("...");
        clipped
    } else {
        text.to_owned()
    }
}
