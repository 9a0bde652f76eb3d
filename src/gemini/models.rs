//! Request and response envelopes for the Gemini `generateContent` API.
use serde::{Deserialize, Serialize};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum ContentRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: ContentRole, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    /// Text of the first part. Normalized contents always have
    /// exactly one.
    pub fn text(&self) -> &str {
        self.parts.first().map(|p| p.text.as_str()).unwrap_or("")
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Content>, system_instruction: Option<&str>) -> Self {
        Self {
            contents,
            generation_config: GenerationConfig::default(),
            system_instruction: system_instruction
                .filter(|s| !s.trim().is_empty())
                .map(|text| SystemInstruction {
                    parts: vec![Part {
                        text: text.to_string(),
                    }],
                }),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if there is any.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}

/// Error body returned by the API on a non-success status.
#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Model ID as it appears in a `generateContent` URL.
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::new(
            vec![Content::new(ContentRole::User, "Hello")],
            Some("Be brief."),
        );
        let actual = serde_json::to_value(&request).unwrap();
        let expected = json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 8192},
            "systemInstruction": {"parts": [{"text": "Be brief."}]}
        });
        assert_eq!(actual["contents"], expected["contents"]);
        assert_eq!(actual["systemInstruction"], expected["systemInstruction"]);
        assert_eq!(actual["generationConfig"]["maxOutputTokens"], 8192);
        assert!(
            (actual["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6
        );
    }

    #[test]
    fn test_request_without_system_instruction() {
        let request = GenerateContentRequest::new(vec![], Some("  "));
        let actual = serde_json::to_value(&request).unwrap();
        assert!(actual.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Hi there"}], "role": "model"}}]
        }))
        .unwrap();
        assert_eq!(resp.text(), Some("Hi there"));
    }

    #[test]
    fn test_response_without_text() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.text(), None);

        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(blocked.text(), None);

        let missing: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.text(), None);
    }

    #[test]
    fn test_model_info() {
        let model: ModelInfo = serde_json::from_value(json!({
            "name": "models/gemini-2.0-flash",
            "supportedGenerationMethods": ["generateContent", "countTokens"]
        }))
        .unwrap();
        assert_eq!(model.id(), "gemini-2.0-flash");
        assert!(model.supports_generate_content());
    }
}
