// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Task decomposition: prompt construction and lenient JSON extraction.

use minijinja::context;
use serde_json::Value;

use crate::config::AgentsConfig;
use crate::error::ExtractError;
use crate::template::render_or;

use super::types::{Decomposition, Phase, Subtask};

/// Phase name used when decomposition yields nothing usable.
pub const DEFAULT_PHASE: &str = "implement";

/// Build the prompt asking the manager tier to split `instruction` into phases.
pub fn build_decompose_prompt(
    config: &AgentsConfig,
    instruction: &str,
    project_dir: &str,
    worker_count: usize,
) -> String {
    let instructions_path = config.prompts.manager_instructions.display().to_string();
    let manager_name = config.roles.manager_display.clone();
    let prefix = render_or(
        &config.prompts.manager_prefix,
        context! { instructions_path => &instructions_path, manager_name => &manager_name },
        || format!("Read {} and follow it.\n\nYou are {}.", instructions_path, manager_name),
    );

    format!(
        r#"{prefix}
Split the following task into three phases (implement → docs → review).

[Task]
{instruction}

[Working directory]
{project_dir}

[Output format]
Reply with JSON in exactly this shape and nothing else.
```json
{{
  "phases": [
    {{
      "name": "implement",
      "subtasks": [
        {{"instruction": "concrete instruction for implementation subtask 1"}}
      ]
    }},
    {{
      "name": "docs",
      "subtasks": [
        {{"instruction": "concrete instruction for the documentation update"}}
      ]
    }},
    {{
      "name": "review",
      "subtasks": [
        {{"instruction": "review instruction"}}
      ]
    }}
  ],
  "strategy": "one-line summary of the split"
}}
```

[Rules]
- Always include the three phases implement, docs and review
- At most {worker_count} subtasks per phase (they run in parallel)
- Phases run one after another (docs starts after implement, review after docs)
- Give every subtask enough context ({worker} never sees the other subtasks)
- The docs phase updates CLAUDE.md, README.md and instruction files related to the change
- The review phase checks quality and consistency of code and docs and reports problems
"#,
        prefix = prefix,
        instruction = instruction,
        project_dir = project_dir,
        worker_count = worker_count,
        worker = config.roles.worker_display,
    )
}

/// Pull a JSON document out of free-form tool output.
///
/// Tried in order: the contents of the first fenced block (a ```json fence
/// is preferred), the whole trimmed output, then the span from the first
/// `{` to the last `}` of the raw output.
pub fn extract_json(output: &str) -> Result<Value, ExtractError> {
    let trimmed = output.trim();
    let candidate = fenced_block(trimmed).unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&output[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(ExtractError {
        reason: format!("{} bytes of output, no parseable object", output.len()),
    })
}

fn fenced_block(text: &str) -> Option<&str> {
    let (open, skip) = if let Some(pos) = text.find("```json") {
        (pos, "```json".len())
    } else {
        (text.find("```")?, "```".len())
    };
    let start = open + skip;
    let end = start + text[start..].find("```")?;
    Some(text[start..end].trim())
}

/// Parse tool output into a [`Decomposition`].
///
/// An empty phase list is a valid result here; callers decide what to do
/// with it.
pub fn parse_decomposition(output: &str) -> Result<Decomposition, ExtractError> {
    let value = extract_json(output)?;
    serde_json::from_value(value).map_err(|e| ExtractError {
        reason: format!("unexpected decomposition shape: {}", e),
    })
}

/// The single-phase, single-subtask plan that runs `instruction` as given.
pub fn fallback_phases(instruction: &str) -> Vec<Phase> {
    vec![Phase::new(
        DEFAULT_PHASE,
        vec![Subtask {
            instruction: instruction.to_string(),
        }],
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{"phases": [{"name": "implement", "subtasks": [{"instruction": "a"}]}], "strategy": "s"}"#;

    #[test]
    fn test_plain_json() {
        let value = extract_json(PLAN).unwrap();
        assert_eq!(value["strategy"], "s");
    }

    #[test]
    fn test_json_fence() {
        let output = format!("Here is the plan:\n```json\n{}\n```\nGood luck!", PLAN);
        let value = extract_json(&output).unwrap();
        assert_eq!(value["phases"][0]["name"], "implement");
    }

    #[test]
    fn test_bare_fence() {
        let output = format!("```\n{}\n```", PLAN);
        assert!(extract_json(&output).is_ok());
    }

    #[test]
    fn test_unclosed_fence_uses_brace_span() {
        let output = format!("```json\n{}\n", PLAN);
        let value = extract_json(&output).unwrap();
        assert_eq!(value["strategy"], "s");
    }

    #[test]
    fn test_prose_around_object() {
        let output = format!("Sure! {} Let me know.", PLAN);
        let value = extract_json(&output).unwrap();
        assert_eq!(value["phases"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_not_json() {
        assert!(extract_json("this is not json").is_err());
        assert!(extract_json("} backwards {").is_err());
        assert!(extract_json("").is_err());
    }

    #[test]
    fn test_empty_phases_is_valid() {
        let d = parse_decomposition(r#"{"phases": []}"#).unwrap();
        assert!(d.phases.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_error() {
        assert!(parse_decomposition(r#"{"phases": "soon"}"#).is_err());
    }

    #[test]
    fn test_fallback() {
        let phases = fallback_phases("add a README");
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].name, "implement");
        assert_eq!(phases[0].subtasks, vec![Subtask { instruction: "add a README".to_string() }]);
    }

    #[test]
    fn test_prompt_mentions_inputs() {
        let config = AgentsConfig::default();
        let prompt = build_decompose_prompt(&config, "add a README", "/work/repo", 3);
        assert!(prompt.starts_with("Read instructions/yadoran.md and follow it."));
        assert!(prompt.contains("add a README"));
        assert!(prompt.contains("/work/repo"));
        assert!(prompt.contains("At most 3 subtasks"));

        // The embedded example must itself be valid JSON.
        let example = extract_json(&prompt).unwrap();
        assert_eq!(example["phases"].as_array().unwrap().len(), 3);
    }
}
