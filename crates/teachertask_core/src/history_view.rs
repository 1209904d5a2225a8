use crate::model::{DayRecord, Task};
use crate::rank::rank;

fn push_section(output: &mut String, heading: &str, tasks: &[Task]) {
    output.push_str(heading);
    output.push_str("\n\n");
    if tasks.is_empty() {
        output.push_str("None\n");
    }
    for task in tasks {
        output.push_str(&format!("{} – {}\n", task.description, task.time));
    }
}

/// Plain-text summary of one archived day.
pub fn format_record(record: &DayRecord) -> String {
    let ranked = rank(&record.tasks);
    let mut output = String::new();

    push_section(&mut output, "🔴 Priority", &ranked.priority);
    output.push('\n');
    push_section(&mut output, "⚪ Other tasks", &ranked.other);

    if !ranked.completed.is_empty() {
        output.push('\n');
        push_section(&mut output, "Completed", &ranked.completed);
    }

    output
}

pub fn format_history(log: &[DayRecord]) -> String {
    if log.is_empty() {
        return "No records found.\n".to_string();
    }

    log.iter()
        .map(|record| format!("{}\n\n{}", record.date, format_record(record)))
        .collect::<Vec<_>>()
        .join("\n")
}
