// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bubble notifications.
//!
//! Agents emit short fire-and-forget hints around the task lifecycle. What
//! happens to them (a desktop pet, a log line, nothing) is up to the
//! injected [`Notifier`].

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default on-screen time for a bubble.
pub const DEFAULT_BUBBLE_DURATION: Duration = Duration::from_secs(5);

/// On-screen time for phase announcements.
pub const PHASE_BUBBLE_DURATION: Duration = Duration::from_secs(3);

static ABS_PATH_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/(?:Users|home|tmp|var|private|opt|etc)(?:/[\w._-]+)+").ok());

/// Visual style hint for a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleKind {
    Normal,
    Claude,
    Info,
}

impl BubbleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Claude => "claude",
            Self::Info => "info",
        }
    }
}

/// Sink for bubble notifications. Implementations must not fail loudly.
pub trait Notifier: Send + Sync {
    fn notify(&self, text: &str, kind: BubbleKind, duration: Duration);
}

impl<F> Notifier for F
where
    F: Fn(&str, BubbleKind, Duration) + Send + Sync,
{
    fn notify(&self, text: &str, kind: BubbleKind, duration: Duration) {
        self(text, kind, duration)
    }
}

/// Writes bubbles to the log.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    agent: String,
}

impl TracingNotifier {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, text: &str, kind: BubbleKind, duration: Duration) {
        info!(
            agent = %self.agent,
            kind = kind.as_str(),
            duration_ms = duration.as_millis() as u64,
            "💬 {}",
            text
        );
    }
}

/// Optional notifier handle held by agents.
pub type SharedNotifier = Option<Arc<dyn Notifier>>;

/// Send a bubble if a notifier is attached.
pub(crate) fn emit(notifier: &SharedNotifier, text: &str, kind: BubbleKind, duration: Duration) {
    if let Some(n) = notifier {
        n.notify(text, kind, duration);
    }
}

/// Shorten text for a bubble.
///
/// Absolute paths under common roots collapse to their last component,
/// then the result is cut to `max_len` characters with a `...` suffix.
pub fn summarize_for_bubble(text: &str, max_len: usize) -> String {
    let shortened = match ABS_PATH_RE.as_ref() {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let path = &caps[0];
                path.rsplit('/').next().unwrap_or(path).to_string()
            })
            .into_owned(),
        None => text.to_string(),
    };

    truncate_chars(&shortened, max_len)
}

/// Cut `text` to `max_len` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let mut cut: String = text.chars().take(max_len).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}
