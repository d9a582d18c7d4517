// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Folding per-subtask results into one report.

use super::ipc::protocol::{ResultMessage, TaskStatus};

/// Combined outcome of a set of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub status: TaskStatus,
    pub summary: String,
    pub output: String,
}

/// Overall status is `success` iff every result succeeded, otherwise
/// `partial_error`. Lines and blocks follow input order.
pub fn aggregate(results: &[ResultMessage]) -> Aggregate {
    let all_success = results.iter().all(|r| r.status.is_success());
    let status = if all_success {
        TaskStatus::Success
    } else {
        TaskStatus::PartialError
    };

    let summary = results
        .iter()
        .map(|r| format!("[{}] {}: {}", r.from_agent, r.status, r.summary()))
        .collect::<Vec<_>>()
        .join("\n");

    let output = results
        .iter()
        .map(|r| format!("=== {} ({}) ===\n{}", r.from_agent, r.status, r.output()))
        .collect::<Vec<_>>()
        .join("\n\n");

    Aggregate {
        status,
        summary,
        output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn result(from: &str, status: TaskStatus) -> ResultMessage {
        ResultMessage::new("t", from, status, format!("{} output", from), format!("{} summary", from))
    }

    #[test]
    fn test_empty_is_success() {
        let agg = aggregate(&[]);
        assert_eq!(agg.status, TaskStatus::Success);
        assert!(agg.summary.is_empty());
        assert!(agg.output.is_empty());
    }

    #[test]
    fn test_all_success() {
        let agg = aggregate(&[result("yadon-1", TaskStatus::Success), result("yadon-2", TaskStatus::Success)]);
        assert_eq!(agg.status, TaskStatus::Success);
        assert_eq!(
            agg.summary,
            "[yadon-1] success: yadon-1 summary\n[yadon-2] success: yadon-2 summary"
        );
        assert_eq!(
            agg.output,
            "=== yadon-1 (success) ===\nyadon-1 output\n\n=== yadon-2 (success) ===\nyadon-2 output"
        );
    }

    #[test]
    fn test_one_error_is_partial() {
        let agg = aggregate(&[result("yadon-1", TaskStatus::Success), result("yadon-2", TaskStatus::Error)]);
        assert_eq!(agg.status, TaskStatus::PartialError);
        assert!(agg.summary.contains("[yadon-2] error: yadon-2 summary"));
    }

    #[test]
    fn test_all_error_is_partial() {
        let agg = aggregate(&[result("yadon-1", TaskStatus::Error), result("yadon-2", TaskStatus::Error)]);
        assert_eq!(agg.status, TaskStatus::PartialError);
    }

    #[test]
    fn test_permutation_keeps_status_and_lines() {
        let a = result("yadon-1", TaskStatus::Success);
        let b = result("yadon-2", TaskStatus::Error);
        let c = result("yadon-3", TaskStatus::PartialError);

        let forward = aggregate(&[a.clone(), b.clone(), c.clone()]);
        let shuffled = aggregate(&[c, a, b]);

        assert_eq!(forward.status, shuffled.status);
        let lines = |s: &str| s.lines().map(String::from).collect::<BTreeSet<_>>();
        assert_eq!(lines(&forward.summary), lines(&shuffled.summary));
    }
}
