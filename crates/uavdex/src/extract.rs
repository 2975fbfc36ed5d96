//! AI-assisted extraction of aircraft records from case documents.
//!
//! Sends a case's Markdown to an OpenAI-compatible chat-completion endpoint
//! with a fixed instruction template and turns the completion back into an
//! [`AircraftModel`]. Completions rarely come back as clean JSON, so parsing
//! tolerates surrounding prose and fenced code blocks.

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{split_purpose, AircraftModel, Category};

/// Known chat-completion providers, selecting a default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Service {
    /// DeepSeek (`api.deepseek.com`).
    Deepseek,
    /// OpenAI (`api.openai.com/v1`).
    Openai,
    /// Qwen via the DashScope compatible endpoint.
    Qwen,
}

impl Service {
    /// The provider's default base URL.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Deepseek => "https://api.deepseek.com",
            Self::Openai => "https://api.openai.com/v1",
            Self::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a UAV specification extraction assistant. \
Answer strictly with one JSON object holding the extracted model data.";

/// Build the extraction prompt for a case document.
#[must_use]
pub fn build_prompt(markdown: &str) -> String {
    format!(
        r#"Extract the UAV model described in the Markdown below and answer with
exactly this JSON structure and nothing else. Use null for anything the text
does not mention.

{{
    "name": "model name",
    "manufacturer": "manufacturer name",
    "type": "Fixed-Wing/Multi-Rotor/VTOL/Helicopter/Other",
    "image_url": "image URL or path",
    "description": "one-sentence summary",
    "length_m": number,
    "wingspan_m": number,
    "height_m": number,
    "mtow_kg": number,
    "empty_weight_kg": number,
    "max_payload_kg": number,
    "max_speed_kmh": number,
    "cruise_speed_kmh": number,
    "range_km": number,
    "endurance_min": number,
    "ceiling_m": number,
    "purpose": ["purpose 1", "purpose 2"]
}}

Case document:
{markdown}
"#
    )
}

/// A chat-completion client bound to one endpoint and model.
#[derive(Debug)]
pub struct Extractor {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl Extractor {
    /// Create an extractor for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns a request error when the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ExtractRequest {
                message: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Extract an aircraft record from a case document.
    ///
    /// `fallback_name` fills the name field when the completion leaves it
    /// blank, typically the case name.
    ///
    /// # Errors
    ///
    /// Returns a request error on network failure, a status error when the
    /// service answers with an error code, and a parse error when the
    /// completion holds no usable JSON object.
    pub fn extract(&self, markdown: &str, fallback_name: &str) -> Result<AircraftModel> {
        let content = self.complete(&build_prompt(markdown))?;
        debug!("Completion is {} bytes", content.len());
        let extracted = parse_completion(&content)?;
        Ok(extracted.into_model(fallback_name))
    }

    /// Run one chat completion and return the assistant's content.
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.3,
            "max_tokens": 2000,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::ExtractRequest {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::ExtractStatus {
                status: status.as_u16(),
                message: service_error_message(&text)
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        let completion: ChatCompletion =
            response.json().map_err(|e| Error::ExtractRequest {
                message: e.to_string(),
            })?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::ExtractRequest {
                message: "completion carried no choices".to_string(),
            })
    }
}

/// Pull the service's own error message out of an error response body.
fn service_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    match error.get("message") {
        Some(Value::String(message)) => Some(message.clone()),
        _ => Some(error.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// The permissive shape of a completion before validation.
///
/// Every field is optional and numbers may arrive as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExtractedModel {
    name: Option<String>,
    manufacturer: Option<String>,
    #[serde(rename = "type")]
    category: Option<String>,
    image_url: Option<String>,
    description: Option<String>,
    length_m: Value,
    wingspan_m: Value,
    height_m: Value,
    mtow_kg: Value,
    empty_weight_kg: Value,
    max_payload_kg: Value,
    max_speed_kmh: Value,
    cruise_speed_kmh: Value,
    range_km: Value,
    endurance_min: Value,
    ceiling_m: Value,
    purpose: Value,
}

impl ExtractedModel {
    /// Convert into a record, clamping negatives and defaulting the name.
    #[must_use]
    pub fn into_model(self, fallback_name: &str) -> AircraftModel {
        let category = match self.category.as_deref() {
            None => Category::Other,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unknown category '{raw}' in completion, using Other");
                Category::Other
            }),
        };

        AircraftModel {
            id: AircraftModel::new_id(),
            name: non_blank(self.name).unwrap_or_else(|| fallback_name.to_string()),
            manufacturer: non_blank(self.manufacturer).unwrap_or_default(),
            category,
            image_url: non_blank(self.image_url),
            description: non_blank(self.description).unwrap_or_default(),
            length_m: lenient_f64(&self.length_m),
            wingspan_m: lenient_f64(&self.wingspan_m),
            height_m: lenient_f64(&self.height_m),
            mtow_kg: lenient_f64(&self.mtow_kg),
            empty_weight_kg: lenient_f64(&self.empty_weight_kg),
            max_payload_kg: lenient_f64(&self.max_payload_kg),
            max_speed_kmh: lenient_f64(&self.max_speed_kmh),
            cruise_speed_kmh: lenient_f64(&self.cruise_speed_kmh),
            range_km: lenient_f64(&self.range_km),
            endurance_min: lenient_f64(&self.endurance_min),
            ceiling_m: lenient_f64(&self.ceiling_m),
            purpose: lenient_purpose(&self.purpose),
            custom_params: std::collections::BTreeMap::new(),
        }
    }
}

/// Parse the completion content into an [`ExtractedModel`].
///
/// Tries, in order: the content as bare JSON, the widest `{...}` span, and
/// the first fenced code block holding an object.
///
/// # Errors
///
/// Returns a parse error carrying the verbatim content when no attempt
/// yields a JSON object.
pub fn parse_completion(content: &str) -> Result<ExtractedModel> {
    if let Ok(model) = serde_json::from_str(content) {
        return Ok(model);
    }

    let span = Regex::new(r"\{[\s\S]*\}").expect("Invalid regex pattern");
    if let Some(found) = span.find(content) {
        if let Ok(model) = serde_json::from_str(found.as_str()) {
            return Ok(model);
        }
    }

    let fenced =
        Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").expect("Invalid regex pattern");
    if let Some(captures) = fenced.captures(content) {
        if let Ok(model) = serde_json::from_str(&captures[1]) {
            return Ok(model);
        }
    }

    Err(Error::ExtractParse {
        content: content.to_string(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read a number out of a JSON value, accepting numeric strings.
///
/// Negative values clamp to zero; anything unreadable is `None`.
fn lenient_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !v.is_finite() {
        return None;
    }
    Some(v.max(0.0))
}

fn lenient_purpose(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Value::String(raw) => split_purpose(raw),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"name": "Heron", "manufacturer": "IAI", "type": "Fixed-Wing",
        "mtow_kg": 1150, "wingspan_m": "16.6", "purpose": ["Surveillance"]}"#;

    #[test]
    fn test_parse_bare_json() {
        let model = parse_completion(BARE).unwrap().into_model("fallback");
        assert_eq!(model.name, "Heron");
        assert_eq!(model.category, Category::FixedWing);
        assert_eq!(model.mtow_kg, Some(1150.0));
        // Numeric string accepted
        assert_eq!(model.wingspan_m, Some(16.6));
        assert_eq!(model.purpose, vec!["Surveillance"]);
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let content = format!("Here is the extracted data:\n{BARE}\nLet me know!");
        let model = parse_completion(&content).unwrap().into_model("fallback");
        assert_eq!(model.name, "Heron");
    }

    #[test]
    fn test_parse_fenced_block() {
        let content = format!("The result:\n```json\n{BARE}\n```\n");
        let model = parse_completion(&content).unwrap().into_model("fallback");
        assert_eq!(model.name, "Heron");
    }

    #[test]
    fn test_parse_garbage_fails_with_content() {
        let err = parse_completion("no json here").unwrap_err();
        match err {
            Error::ExtractParse { content } => assert_eq!(content, "no json here"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_into_model_defaults() {
        let model = parse_completion("{}").unwrap().into_model("My Case");
        assert_eq!(model.name, "My Case");
        assert_eq!(model.category, Category::Other);
        assert_eq!(model.mtow_kg, None);
        assert!(model.purpose.is_empty());
        assert!(model.id.starts_with("uav-"));
    }

    #[test]
    fn test_into_model_clamps_negative() {
        let model = parse_completion(r#"{"range_km": -5}"#)
            .unwrap()
            .into_model("x");
        assert_eq!(model.range_km, Some(0.0));
    }

    #[test]
    fn test_into_model_unknown_category_falls_back() {
        let model = parse_completion(r#"{"type": "Blimp"}"#)
            .unwrap()
            .into_model("x");
        assert_eq!(model.category, Category::Other);
    }

    #[test]
    fn test_purpose_as_string_is_split() {
        let model = parse_completion(r#"{"purpose": "Mapping, Survey"}"#)
            .unwrap()
            .into_model("x");
        assert_eq!(model.purpose, vec!["Mapping", "Survey"]);
    }

    #[test]
    fn test_service_base_urls() {
        assert_eq!(Service::Deepseek.base_url(), "https://api.deepseek.com");
        assert!(Service::Openai.base_url().ends_with("/v1"));
    }

    #[test]
    fn test_service_error_message() {
        let body = r#"{"error": {"message": "invalid api key", "code": "auth"}}"#;
        assert_eq!(
            service_error_message(body),
            Some("invalid api key".to_string())
        );
        assert_eq!(service_error_message("not json"), None);
    }

    #[test]
    fn test_prompt_carries_document() {
        let prompt = build_prompt("# DJI Mavic 3");
        assert!(prompt.contains("# DJI Mavic 3"));
        assert!(prompt.contains("\"mtow_kg\""));
    }
}
