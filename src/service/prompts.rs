//! Prompt templates for plan generation and step execution.

use crate::models::{PlanRequest, StepRequest};

use super::Prompt;

const PLAN_SYSTEM: &str = "\
You are a senior engineer turning a change request into an implementation plan.
Respond with a single JSON object and nothing else, shaped as:
{\"task\": string, \"language\": string, \"file\": string,
 \"steps\": [{\"id\": string, \"title\": string, \"description\": string,
   \"input_files\": [string],
   \"output\": {\"type\": \"instruction\" | \"patch\" | \"file_replace\", \"patch_format\": \"unified_diff\"}}]}
Use short, stable step ids such as \"step-1\". Keep steps small and ordered.";

const STEP_SYSTEM: &str = "\
You are a senior engineer implementing exactly one step of a plan.
Respond with a single JSON object and nothing else, shaped as:
{\"step_id\": string,
 \"suggested_patch\": {\"format\": \"unified_diff\" | \"full_file\", \"diff\": string},
 \"explanation\": string}
For unified_diff, emit `--- a/<file>` and `+++ b/<file>` headers, then hunks that start
with `@@ -<old_start>,<old_count> +<new_start>,<new_count> @@`. Prefix unchanged lines
with a space, removed lines with `-`, added lines with `+`. Line numbers refer to the
code exactly as given. Escape newlines inside the diff string as \\n.";

/// Prompt for generating a plan from intent and optional code context.
#[must_use]
pub fn plan_prompt(request: &PlanRequest) -> Prompt {
    let mut user = format!("Change request:\n{}\n", request.intent.trim());
    match request.code_context.as_deref().map(str::trim) {
        Some(context) if !context.is_empty() => {
            user.push_str("\nExisting code:\n");
            user.push_str(context);
            user.push('\n');
        }
        _ => user.push_str("\nNo existing code was provided.\n"),
    }
    Prompt {
        system: PLAN_SYSTEM.to_owned(),
        user,
    }
}

/// Prompt for executing one step against the code context.
#[must_use]
pub fn step_prompt(request: &StepRequest) -> Prompt {
    let step = &request.step;
    let mut user = format!(
        "Step id: {}\nTitle: {}\nDescription:\n{}\n",
        step.id,
        step.title.trim(),
        step.description.trim()
    );
    if let Some(files) = step.input_files.as_ref().filter(|files| !files.is_empty()) {
        user.push_str(&format!("Files: {}\n", files.join(", ")));
    }
    user.push_str("\nCode:\n");
    user.push_str(request.code_context.trim_end());
    user.push('\n');
    Prompt {
        system: STEP_SYSTEM.to_owned(),
        user,
    }
}
