use crate::model::Task;
use std::cmp::Ordering;

pub const PRIORITY_SLOTS: usize = 3;

/// Display buckets for one task set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedTasks {
    pub priority: Vec<Task>,
    pub other: Vec<Task>,
    pub completed: Vec<Task>,
}

impl RankedTasks {
    pub fn active_len(&self) -> usize {
        self.priority.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_len() == 0 && self.completed.is_empty()
    }

    /// Active tasks in rank order, priority head first.
    pub fn active(&self) -> impl Iterator<Item = &Task> {
        self.priority.iter().chain(self.other.iter())
    }
}

/// Importance descending, then time ascending with unscheduled last.
pub fn compare_active(a: &Task, b: &Task) -> Ordering {
    b.importance
        .rank()
        .cmp(&a.importance.rank())
        .then_with(|| a.time.cmp(&b.time))
}

pub fn rank(tasks: &[Task]) -> RankedTasks {
    let (mut active, mut completed): (Vec<Task>, Vec<Task>) =
        tasks.iter().cloned().partition(|task| !task.completed);

    active.sort_by(compare_active);
    completed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let other = active.split_off(PRIORITY_SLOTS.min(active.len()));

    RankedTasks {
        priority: active,
        other,
        completed,
    }
}
