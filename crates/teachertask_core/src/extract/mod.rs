use crate::config::Config;
use crate::error::AppError;
use crate::model::{DraftTask, Importance, TaskTime};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};

mod gemini;
mod replay;

pub use gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GeminiExtractor};
pub use replay::ReplayExtractor;

const API_KEY_ENV_VARS: [&str; 2] = ["TEACHERTASK_API_KEY", "GEMINI_API_KEY"];
const REPLAY_ENV_VAR: &str = "TEACHERTASK_EXTRACTION_FILE";
const HISTORY_PHRASE: &str = "show history";

/// One task candidate exactly as the model returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub importance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    tasks: Vec<RawTask>,
}

/// Turns free text into task candidates.
pub trait Extractor {
    fn try_extract(&self, text: &str) -> Result<Vec<RawTask>, AppError>;

    /// Never fails: any error is logged and reported as zero tasks.
    fn extract(&self, text: &str) -> Vec<DraftTask> {
        match self.try_extract(text) {
            Ok(raw) => normalize(raw),
            Err(err) => {
                log::error!("task extraction failed: {err}");
                Vec::new()
            }
        }
    }
}

/// Stand-in used when no backend is configured.
pub struct UnavailableExtractor {
    reason: String,
}

impl UnavailableExtractor {
    pub fn new<M: Into<String>>(reason: M) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Extractor for UnavailableExtractor {
    fn try_extract(&self, _text: &str) -> Result<Vec<RawTask>, AppError> {
        Err(AppError::extraction(self.reason.clone()))
    }
}

pub fn extractor_from_env(config: &Config) -> Box<dyn Extractor> {
    if let Ok(path) = std::env::var(REPLAY_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Box::new(ReplayExtractor::new(path));
    }

    let api_key = API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty());

    match api_key {
        Some(key) => {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            let endpoint = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
            extractor_or_unavailable(GeminiExtractor::new(key, model, endpoint))
        }
        None => Box::new(UnavailableExtractor::new(format!(
            "no API key configured (set {})",
            API_KEY_ENV_VARS.join(" or ")
        ))),
    }
}

/// A backend that failed to build is logged and replaced by one that
/// yields no tasks.
fn extractor_or_unavailable<E>(built: Result<E, AppError>) -> Box<dyn Extractor>
where
    E: Extractor + 'static,
{
    match built {
        Ok(extractor) => Box::new(extractor),
        Err(err) => {
            log::error!("extraction backend unavailable: {err}");
            Box::new(UnavailableExtractor::new(err.message()))
        }
    }
}

/// Parses model output text into raw candidates. Surrounding Markdown code
/// fences are ignored and blank output means no tasks.
pub fn parse_model_output(text: &str) -> Result<Vec<RawTask>, AppError> {
    let trimmed = text.trim();
    let json_str = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let json_str = json_str.strip_suffix("```").unwrap_or(json_str).trim();

    if json_str.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str::<ExtractionResponse>(json_str)
        .map(|response| response.tasks)
        .map_err(|err| AppError::extraction(format!("unparseable model output: {err}")))
}

pub fn normalize(raw: Vec<RawTask>) -> Vec<DraftTask> {
    raw.into_iter()
        .filter_map(|task| {
            let description = task.description.as_deref().unwrap_or_default().trim();
            if description.is_empty() {
                log::warn!("dropping extracted task without description");
                return None;
            }

            Some(DraftTask {
                description: description.to_string(),
                time: TaskTime::from(task.time),
                importance: task
                    .importance
                    .as_deref()
                    .map(Importance::coerce)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIntent<'a> {
    ShowHistory,
    Extract(&'a str),
}

pub fn classify_input(text: &str) -> InputIntent<'_> {
    if text.to_ascii_lowercase().contains(HISTORY_PHRASE) {
        InputIntent::ShowHistory
    } else {
        InputIntent::Extract(text)
    }
}

/// Admits at most one extraction at a time.
#[derive(Debug, Default)]
pub struct ExtractionGate {
    in_flight: AtomicBool,
}

impl ExtractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Result<ExtractionTicket<'_>, AppError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::busy("an extraction is already in progress"))?;
        Ok(ExtractionTicket { gate: self })
    }

    /// Runs one extraction under the gate. The loading state clears when the
    /// call settles, whatever its outcome.
    pub fn run(&self, extractor: &dyn Extractor, text: &str) -> Result<Vec<DraftTask>, AppError> {
        let _ticket = self.try_begin()?;
        Ok(extractor.extract(text))
    }
}

/// Proof of an admitted extraction; dropping it ends the loading state.
#[derive(Debug)]
pub struct ExtractionTicket<'a> {
    gate: &'a ExtractionGate,
}

impl Drop for ExtractionTicket<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
