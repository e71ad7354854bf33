//! Recover a [`PatchPayload`] from a step execution response.
//!
//! The generation service is asked for a JSON object but routinely emits
//! fenced JSON, unescaped newlines inside the `diff` string, or broken
//! punctuation around otherwise valid fields. Recovery runs in three
//! tiers, each attempted only when the previous one failed to parse:
//!
//! 1. [`RecoveryTier::Strict`]: fence strip, greedy brace span, JSON parse.
//! 2. [`RecoveryTier::RepairedDiff`]: re-escape the `diff` value, parse again.
//! 3. [`RecoveryTier::FieldExtraction`]: pull fields out with regexes.
//!
//! Whatever tier wins, the fields go through the same validation.

use serde_json::Value;
use tracing::{debug, info};

use crate::models::{PatchFormat, PatchPayload};
use crate::patterns::{
    DIFF_FIELD, DIFF_FIELD_END, DIFF_FIELD_START, EXPLANATION_FIELD, FORMAT_FIELD, STEP_ID_FIELD,
};
use crate::{AppError, Result};

use super::json_repair::{
    escape_string_content, extract_object, strip_fences, unescape_string_content,
};

/// Which recovery tier produced the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    /// The response parsed as JSON directly.
    Strict,
    /// The `diff` value had to be re-escaped first.
    RepairedDiff,
    /// Fields were extracted individually.
    FieldExtraction,
}

/// Normalized payload plus the tier that recovered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedExecution {
    /// Validated payload with the caller's step id.
    pub payload: PatchPayload,
    /// Recovery tier that succeeded.
    pub tier: RecoveryTier,
    /// Step id the service echoed back, when present.
    pub reported_step_id: Option<String>,
}

/// Fields recovered by any tier, before validation.
#[derive(Debug, Default)]
struct RawFields {
    step_id: Option<String>,
    format: Option<String>,
    diff: Option<String>,
    explanation: Option<String>,
}

/// Normalize a raw execution response for step `step_id`.
///
/// The returned payload always carries `step_id`, whatever the service
/// reported.
///
/// # Errors
///
/// Returns `AppError::Parse` (carrying `raw`) when no tier recovers a
/// patch, or when the recovered fields fail validation: empty `diff` or a
/// `format` other than `unified_diff` / `full_file`.
pub fn normalize_execution(raw: &str, step_id: &str) -> Result<NormalizedExecution> {
    let cleaned = strip_fences(raw);

    let (fields, tier) = match parse_strict(&cleaned) {
        Ok(fields) => (fields, RecoveryTier::Strict),
        Err(strict_err) => {
            debug!(%strict_err, "strict parse failed; repairing diff field");
            match parse_repaired(&cleaned) {
                Some(fields) => (fields, RecoveryTier::RepairedDiff),
                None => {
                    debug!("diff repair failed; extracting fields");
                    (extract_fields(&cleaned), RecoveryTier::FieldExtraction)
                }
            }
        }
    };

    let reported_step_id = fields.step_id.clone();
    let payload = validate(fields, step_id, raw)?;
    info!(step_id, ?tier, format = payload.format.as_str(), "execution response normalized");

    Ok(NormalizedExecution {
        payload,
        tier,
        reported_step_id,
    })
}

fn parse_strict(text: &str) -> std::result::Result<RawFields, String> {
    let object = extract_object(text).ok_or_else(|| "no JSON object in response".to_owned())?;
    let value: Value = serde_json::from_str(object).map_err(|err| err.to_string())?;
    fields_from_value(&value).ok_or_else(|| "response is not a JSON object".to_owned())
}

fn fields_from_value(value: &Value) -> Option<RawFields> {
    let object = value.as_object()?;
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_owned);
    let patch = object.get("suggested_patch");
    Some(RawFields {
        step_id: text(object.get("step_id")),
        format: text(patch.and_then(|p| p.get("format"))),
        diff: text(patch.and_then(|p| p.get("diff"))),
        explanation: text(object.get("explanation")),
    })
}

/// Re-escape the `diff` value and parse again.
///
/// The value's end is ambiguous once quotes are unescaped, so every
/// quote that could close it is tried in order.
fn parse_repaired(text: &str) -> Option<RawFields> {
    let object = extract_object(text)?;
    let value_start = DIFF_FIELD_START.find(object)?.end();
    let rest = &object[value_start..];

    DIFF_FIELD_END.find_iter(rest).find_map(|end| {
        let value_end = value_start + end.start();
        let repaired = format!(
            "{}{}{}",
            &object[..value_start],
            escape_string_content(&object[value_start..value_end]),
            &object[value_end..]
        );
        serde_json::from_str::<Value>(&repaired)
            .ok()
            .and_then(|value| fields_from_value(&value))
    })
}

/// Pull individual fields out of text that is not valid JSON.
fn extract_fields(text: &str) -> RawFields {
    let capture = |pattern: &regex::Regex, haystack: &str| {
        pattern
            .captures(haystack)
            .and_then(|caps| caps.get(1))
            .map(|m| unescape_string_content(m.as_str()))
    };

    let patch_section = text
        .find("\"suggested_patch\"")
        .map_or(text, |idx| &text[idx..]);

    RawFields {
        step_id: capture(&STEP_ID_FIELD, text),
        format: capture(&FORMAT_FIELD, patch_section),
        diff: capture(&DIFF_FIELD, patch_section),
        explanation: capture(&EXPLANATION_FIELD, text),
    }
}

fn validate(fields: RawFields, step_id: &str, raw: &str) -> Result<PatchPayload> {
    if step_id.trim().is_empty() {
        return Err(AppError::Validation("step id must not be empty".into()));
    }

    let diff = fields
        .diff
        .filter(|diff| !diff.trim().is_empty())
        .ok_or_else(|| AppError::parse("response contains no patch text", raw))?;

    let format_name = fields
        .format
        .ok_or_else(|| AppError::parse("response is missing suggested_patch.format", raw))?;
    let format = PatchFormat::from_wire(&format_name).ok_or_else(|| {
        AppError::parse(format!("unsupported patch format {format_name:?}"), raw)
    })?;

    Ok(PatchPayload {
        step_id: step_id.to_owned(),
        format,
        diff_text: diff,
        explanation: fields.explanation.unwrap_or_default(),
    })
}
