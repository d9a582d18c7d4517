// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracing subscriber setup.
//!
//! Every agent process installs one subscriber at startup:
//!
//! ```rust,ignore
//! use yadon::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default())?;
//! ```
//!
//! Log output goes to stderr so that commands printing JSON keep stdout clean.
//! Endpoint loops run inside an `agent` span, so every line they emit carries
//! the agent name.

mod init;

pub use init::{init_telemetry, TelemetryConfig};
