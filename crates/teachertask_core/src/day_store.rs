use crate::error::AppError;
use crate::model::{DayRecord, DraftTask, Importance, Task, TaskTime};
use crate::rank::{RankedTasks, rank};
use crate::storage::HistorySlot;
use crate::storage::history_store;
use time::OffsetDateTime;
use uuid::Uuid;

/// Field changes for [`DayStore::update`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub description: Option<String>,
    pub time: Option<TaskTime>,
    pub importance: Option<Importance>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.time.is_none() && self.importance.is_none()
    }
}

/// Owner of today's task list and the dated history log.
///
/// Every mutation merges today's tasks into the log and writes the whole
/// log back to the slot before returning.
pub struct DayStore {
    slot: Box<dyn HistorySlot>,
    history: Vec<DayRecord>,
    tasks: Vec<Task>,
    pinned_date: Option<String>,
}

impl DayStore {
    /// Loads the log, seeds today's tasks from today's record and writes
    /// the merged log once.
    pub fn open(slot: Box<dyn HistorySlot>) -> Result<Self, AppError> {
        Self::load(slot, None)
    }

    /// Like [`DayStore::open`] but keyed to a fixed date instead of the
    /// local calendar day.
    pub fn open_for_date<S: Into<String>>(
        slot: Box<dyn HistorySlot>,
        date: S,
    ) -> Result<Self, AppError> {
        Self::load(slot, Some(date.into()))
    }

    fn load(slot: Box<dyn HistorySlot>, pinned_date: Option<String>) -> Result<Self, AppError> {
        let history = history_store::load_log(slot.as_ref());
        let mut store = Self {
            slot,
            history,
            tasks: Vec::new(),
            pinned_date,
        };

        let today = store.today()?;
        store.tasks = history_store::tasks_for_date(&store.history, &today);
        log::debug!("loaded {} task(s) for {today}", store.tasks.len());

        store.persist()?;
        Ok(store)
    }

    pub fn today(&self) -> Result<String, AppError> {
        match self.pinned_date.as_ref() {
            Some(date) => Ok(date.clone()),
            None => history_store::today_key(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }

    pub fn slot(&self) -> &dyn HistorySlot {
        self.slot.as_ref()
    }

    pub fn ranked(&self) -> RankedTasks {
        rank(&self.tasks)
    }

    pub fn get(&self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        Ok(self.tasks[index].clone())
    }

    /// Appends extracted drafts as new open tasks.
    pub fn add_drafts(&mut self, drafts: Vec<DraftTask>) -> Result<Vec<Task>, AppError> {
        let timestamp = now_millis();
        let mut added = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let description = draft.description.trim();
            if description.is_empty() {
                log::warn!("skipping draft without description");
                continue;
            }

            let task = Task {
                id: self.next_id(),
                description: description.to_string(),
                time: draft.time,
                importance: draft.importance,
                timestamp,
                completed: false,
            };
            self.tasks.push(task.clone());
            added.push(task);
        }

        self.persist()?;
        Ok(added)
    }

    pub fn add_task(&mut self, draft: DraftTask) -> Result<Task, AppError> {
        if draft.description.trim().is_empty() {
            return Err(AppError::invalid_input("description is required"));
        }

        self.add_drafts(vec![draft])?
            .pop()
            .ok_or_else(|| AppError::invalid_data("task was not added"))
    }

    /// Flips the completion flag and returns the task as it is now.
    pub fn toggle(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let toggled = task.clone();

        self.persist()?;
        Ok(toggled)
    }

    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Result<Task, AppError> {
        if update.is_empty() {
            return Err(AppError::invalid_input("nothing to update"));
        }

        let description = match update.description.as_deref() {
            Some(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(AppError::invalid_input("description is required"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(time) = update.time {
            task.time = time;
        }
        if let Some(importance) = update.importance {
            task.importance = importance;
        }
        let updated = task.clone();

        self.persist()?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);

        self.persist()?;
        Ok(removed)
    }

    /// Drops every task of today. Today's record stays in the log with an
    /// empty task list.
    pub fn clear(&mut self) -> Result<usize, AppError> {
        let removed = self.tasks.len();
        self.tasks.clear();

        self.persist()?;
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        let trimmed_id = id.trim();
        if trimmed_id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        self.tasks
            .iter()
            .position(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    fn next_id(&self) -> String {
        loop {
            let uuid = Uuid::new_v4().simple().to_string();
            let candidate = format!("task-{}", &uuid[..8]);
            if !self.tasks.iter().any(|task| task.id == candidate) {
                return candidate;
            }
        }
    }

    fn persist(&mut self) -> Result<(), AppError> {
        let today = self.today()?;
        self.history = history_store::merge_for_date(&self.history, &today, &self.tasks);
        history_store::save_log(self.slot.as_ref(), &self.history)
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
