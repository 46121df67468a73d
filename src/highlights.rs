use crate::models::{TaskOutcome, TaskStatus};
use crate::risk::percentage;

/// Headline lines for a sprint: overall completion and the top finisher.
pub fn sprint_highlights(tasks: &[TaskOutcome]) -> Vec<String> {
    let mut highlights = Vec::new();
    if tasks.is_empty() {
        return highlights;
    }

    let total = tasks.len() as u32;
    let done = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Done)
        .count() as u32;
    highlights.push(format!(
        "📊 Sprint completion: {:.0}% ({done}/{total} tasks)",
        percentage(done, total)
    ));

    // Insertion order keeps the first-seen assignee ahead on ties.
    let mut tallies: Vec<(&str, usize)> = Vec::new();
    for task in tasks.iter().filter(|task| task.status == TaskStatus::Done) {
        let Some(name) = task.assignee_name.as_deref() else {
            continue;
        };
        match tallies.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => tallies.push((name, 1)),
        }
    }

    let top = tallies
        .iter()
        .fold(None::<&(&str, usize)>, |best, entry| match best {
            Some(current) if current.1 >= entry.1 => Some(current),
            _ => Some(entry),
        });
    if let Some((name, count)) = top {
        highlights.push(format!("⭐ Top performer: {name} ({count} tasks completed)"));
    }

    highlights
}
