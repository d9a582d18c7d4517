// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Role contract shared by every agent endpoint.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::ipc::protocol::{ResultMessage, StatusQuery, StatusResponse, TaskMessage};

/// Behaviour injected into the generic endpoint loop.
#[async_trait]
pub trait AgentHandler: Send + Sync + 'static {
    /// Identity placed in the `from` field of every response.
    fn name(&self) -> &str;

    /// The endpoint's in-flight task marker.
    fn task_slot(&self) -> &TaskSlot;

    /// Execute one task. Failures are reported in the returned result.
    async fn handle_task(&self, task: TaskMessage) -> ResultMessage;

    /// Report idle/busy. Supervising roles add sub-endpoint states.
    async fn handle_status(&self, _query: StatusQuery) -> StatusResponse {
        StatusResponse::new(self.name(), self.task_slot().current())
    }
}

/// Holds the ID of the task an endpoint is executing, if any.
#[derive(Debug, Default)]
pub struct TaskSlot {
    current: Mutex<Option<String>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_some()
    }

    /// Mark `task_id` as in flight until the returned guard drops.
    pub fn begin(&self, task_id: impl Into<String>) -> TaskGuard<'_> {
        *self.lock() = Some(task_id.into());
        TaskGuard { slot: self }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears its [`TaskSlot`] on drop, including during unwinding.
#[must_use = "the task slot is cleared as soon as the guard is dropped"]
pub struct TaskGuard<'a> {
    slot: &'a TaskSlot,
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

/// Directory a task should run in: the requested one, or `default` when blank.
pub fn resolve_project_dir(requested: &str, default: &Path) -> PathBuf {
    if requested.trim().is_empty() {
        default.to_path_buf()
    } else {
        PathBuf::from(requested)
    }
}
