use crate::error::AppError;
use crate::extract::{Extractor, RawTask, parse_model_output};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_INSTRUCTION: &str = "You are a task extraction system for teachers.\n\
    Your job is to convert messy, chaotic thoughts into clear daily tasks.\n\
    Input may have no punctuation, no clear separation, and mixed ideas.\n\n\
    RULES:\n\
    1. Extract only explicit tasks mentioned. Split run-on input into individual tasks \
    (e.g. \"grade exams call parents\" -> 2 tasks).\n\
    2. Do not infer hidden tasks. Do not add new ones.\n\
    3. Extract time if mentioned. If not, use \"no fixed time\".\n\
    4. Importance: use \"high\", \"medium\", or \"low\". If not stated, use \"medium\".\n\
    5. Ignore filler words and repetition.\n\
    6. No motivation, no opinions, no explanations.\n\
    7. Strictly return JSON according to the schema.";

/// Extraction through the Gemini `generateContent` endpoint.
pub struct GeminiExtractor {
    api_key: String,
    url: String,
    client: reqwest::blocking::Client,
}

impl GeminiExtractor {
    pub fn new(api_key: String, model: &str, endpoint: &str) -> Result<Self, AppError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::extraction(format!("HTTP client setup failed: {err}")))?;

        Ok(Self {
            api_key,
            url: format!(
                "{}/models/{}:generateContent",
                endpoint.trim_end_matches('/'),
                model
            ),
            client,
        })
    }
}

impl Extractor for GeminiExtractor {
    fn try_extract(&self, text: &str) -> Result<Vec<RawTask>, AppError> {
        log::debug!("requesting extraction from {}", self.url);
        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(text))
            .send()
            .map_err(|err| AppError::extraction(format!("API request failed: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(AppError::extraction(format!("API error {status}: {body}")));
        }

        let api_resp: serde_json::Value = resp
            .json()
            .map_err(|err| AppError::extraction(format!("failed to parse API response: {err}")))?;

        match response_text(&api_resp) {
            Some(text) => parse_model_output(text),
            None => {
                log::warn!("API response carried no text");
                Ok(Vec::new())
            }
        }
    }
}

fn request_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "contents": [
            { "role": "user", "parts": [{ "text": text }] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "tasks": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "description": { "type": "STRING" },
                                "time": { "type": "STRING" },
                                "importance": { "type": "STRING" }
                            },
                            "required": ["description", "time", "importance"]
                        }
                    }
                },
                "required": ["tasks"]
            }
        }
    })
}

// First text part of the first candidate.
fn response_text(api_resp: &serde_json::Value) -> Option<&str> {
    api_resp["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part["text"].as_str())
}
