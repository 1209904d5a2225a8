mod task;

pub use task::{DayRecord, DraftTask, Importance, Task, TaskTime, UNSCHEDULED};
