use crate::error::AppError;
use crate::extract::{Extractor, RawTask, parse_model_output};
use std::path::PathBuf;

/// Serves model output saved in a file instead of calling the API.
pub struct ReplayExtractor {
    path: PathBuf,
}

impl ReplayExtractor {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Extractor for ReplayExtractor {
    fn try_extract(&self, _text: &str) -> Result<Vec<RawTask>, AppError> {
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            AppError::extraction(format!("{}: {}", self.path.display(), err))
        })?;
        parse_model_output(&content)
    }
}
