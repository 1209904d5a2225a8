use crate::error::AppError;
use crate::model::{DayRecord, Task};
use crate::storage::HistorySlot;
use std::path::PathBuf;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const STORE_FILE_NAME: &str = "history.json";
const STORE_ENV_VAR: &str = "TEACHERTASK_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("teachertask")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("teachertask")
            .join(STORE_FILE_NAME))
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn date_key(date: Date) -> Result<String, AppError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Key of the local calendar day right now.
pub fn today_key() -> Result<String, AppError> {
    date_key(OffsetDateTime::now_utc().to_offset(local_offset()).date())
}

/// Reads the whole log. A missing, unreadable or corrupt log yields an
/// empty history; the cause is only logged.
pub fn load_log(slot: &dyn HistorySlot) -> Vec<DayRecord> {
    let content = match slot.read() {
        Ok(Some(content)) => content,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::warn!("history unreadable, starting empty: {err}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<DayRecord>>(&content) {
        Ok(log) => log,
        Err(err) => {
            log::warn!("history corrupt, starting empty: {err}");
            Vec::new()
        }
    }
}

pub fn save_log(slot: &dyn HistorySlot, log: &[DayRecord]) -> Result<(), AppError> {
    let content =
        serde_json::to_string_pretty(log).map_err(|err| AppError::invalid_data(err.to_string()))?;
    slot.write(&content)
}

pub fn tasks_for_date(log: &[DayRecord], date: &str) -> Vec<Task> {
    log.iter()
        .find(|record| record.date == date)
        .map(|record| record.tasks.clone())
        .unwrap_or_default()
}

/// Replaces the tasks of the record keyed `date` in place, or prepends a
/// new record when the day is not in the log yet. Other records are
/// returned untouched and in their original order.
pub fn merge_for_date(log: &[DayRecord], date: &str, tasks: &[Task]) -> Vec<DayRecord> {
    let mut merged = log.to_vec();
    match merged.iter_mut().find(|record| record.date == date) {
        Some(record) => record.tasks = tasks.to_vec(),
        None => merged.insert(
            0,
            DayRecord {
                date: date.to_string(),
                tasks: tasks.to_vec(),
            },
        ),
    }
    merged
}

pub fn merge(log: &[DayRecord], tasks: &[Task]) -> Result<Vec<DayRecord>, AppError> {
    let today = today_key()?;
    Ok(merge_for_date(log, &today, tasks))
}
