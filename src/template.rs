// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Template rendering for prompts and notifications.

use minijinja::Environment;
use serde::Serialize;
use tracing::warn;

/// Render `template` with `ctx`, or return `fallback` if rendering fails.
///
/// A broken template is logged and never fails the caller.
pub fn render_or<S: Serialize>(template: &str, ctx: S, fallback: impl FnOnce() -> String) -> String {
    let env = Environment::new();
    match env.render_str(template, ctx) {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(error = %err, "Template render failed, using built-in text");
            fallback()
        }
    }
}
