//! Recover a [`Plan`] from a plan generation response.

use serde_json::Value;
use tracing::{debug, info};

use crate::models::{OutputType, Plan};
use crate::{AppError, Result};

use super::json_repair::{extract_object, strip_fences};

/// Synonyms the generation service uses for step output types.
const OUTPUT_TYPE_SYNONYMS: &[(&str, OutputType)] = &[
    ("instruction", OutputType::Instruction),
    ("instructions", OutputType::Instruction),
    ("console_output", OutputType::Instruction),
    ("output", OutputType::Instruction),
    ("guidance", OutputType::Instruction),
    ("patch", OutputType::Patch),
    ("diff", OutputType::Patch),
    ("code", OutputType::Patch),
    ("unified_diff", OutputType::Patch),
    ("file_replace", OutputType::FileReplace),
    ("file", OutputType::FileReplace),
    ("full_file", OutputType::FileReplace),
];

/// Map an output type name or known synonym onto [`OutputType`].
#[must_use]
pub fn normalize_output_type(name: &str) -> Option<OutputType> {
    let key = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    OUTPUT_TYPE_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, kind)| *kind)
}

/// Normalize a raw plan response.
///
/// Steps without an id get `step-<n>` (1-based position). Output type
/// synonyms are mapped before the enum check.
///
/// # Errors
///
/// Returns `AppError::Parse` (carrying `raw`) when no JSON object is found,
/// the object does not match the plan shape, an output type is unknown, or
/// the plan has no task or no steps, or a step has a blank title or
/// description.
pub fn normalize_plan(raw: &str) -> Result<Plan> {
    let cleaned = strip_fences(raw);
    let object = extract_object(&cleaned)
        .ok_or_else(|| AppError::parse("plan response contains no JSON object", raw))?;
    let mut value: Value = serde_json::from_str(object)
        .map_err(|err| AppError::parse(format!("plan response is not valid JSON: {err}"), raw))?;

    let steps = value
        .get_mut("steps")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| AppError::parse("plan response has no steps array", raw))?;

    for (idx, step) in steps.iter_mut().enumerate() {
        let Some(step) = step.as_object_mut() else {
            return Err(AppError::parse(format!("plan step {} is not an object", idx + 1), raw));
        };

        let has_id = step
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.trim().is_empty());
        if !has_id {
            let id = match step.get("id") {
                Some(Value::Number(n)) => n.to_string(),
                _ => format!("step-{}", idx + 1),
            };
            debug!(%id, "assigned plan step id");
            step.insert("id".into(), Value::String(id));
        }

        if let Some(output) = step.get_mut("output").and_then(Value::as_object_mut) {
            let declared = output
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let kind = normalize_output_type(&declared).ok_or_else(|| {
                AppError::parse(format!("unknown step output type {declared:?}"), raw)
            })?;
            output.insert("type".into(), Value::String(kind.as_str().to_owned()));
        }
    }

    let plan: Plan = serde_json::from_value(value)
        .map_err(|err| AppError::parse(format!("plan response has the wrong shape: {err}"), raw))?;

    if plan.task.trim().is_empty() {
        return Err(AppError::parse("plan has no task", raw));
    }
    if plan.steps.is_empty() {
        return Err(AppError::parse("plan has no steps", raw));
    }
    if let Some(step) = plan
        .steps
        .iter()
        .find(|step| step.title.trim().is_empty() || step.description.trim().is_empty())
    {
        return Err(AppError::parse(
            format!("plan step {} has a blank title or description", step.id),
            raw,
        ));
    }

    info!(steps = plan.steps.len(), "plan response normalized");
    Ok(plan)
}
