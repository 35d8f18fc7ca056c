//! Sample data the store can start from.

use crate::types::{
    Board, Habit, HabitColor, HabitFrequency, HabitIcon, NewTask, Subtask, TaskPriority,
    TaskStatus,
};

fn seed_task(
    title: &str,
    description: &str,
    priority: TaskPriority,
    tags: &[&str],
) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: Some(description.to_string()),
        priority,
        due_date: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        subtasks: Vec::new(),
    }
}

/// The sample board: seven tasks across the three columns.
pub fn sample_board() -> Board {
    let mut library = seed_task(
        "Finish React component library",
        "Build reusable UI components for the project.",
        TaskPriority::High,
        &["dev", "ui"],
    );
    library.subtasks.push(Subtask {
        id: "sub-1".to_string(),
        title: "Button component".to_string(),
        is_completed: true,
    });

    let entries = [
        (
            "task-2",
            TaskStatus::Todo,
            seed_task(
                "Write documentation for API",
                "Document all endpoints and usage examples.",
                TaskPriority::Medium,
                &["docs"],
            ),
        ),
        (
            "task-3",
            TaskStatus::Todo,
            seed_task(
                "Design the new dashboard layout",
                "Create mockups and prototypes in Figma.",
                TaskPriority::High,
                &["design", "ux"],
            ),
        ),
        (
            "task-7",
            TaskStatus::Todo,
            seed_task(
                "Prepare for sprint planning",
                "Outline tasks for the next two weeks.",
                TaskPriority::High,
                &["planning"],
            ),
        ),
        ("task-1", TaskStatus::InProgress, library),
        (
            "task-5",
            TaskStatus::InProgress,
            seed_task(
                "Research state management libraries",
                "Evaluate Zustand, Redux, and others.",
                TaskPriority::Low,
                &["research"],
            ),
        ),
        (
            "task-6",
            TaskStatus::InProgress,
            seed_task(
                "Review PR from team member",
                "Check code quality and provide feedback.",
                TaskPriority::Medium,
                &["code-review"],
            ),
        ),
        (
            "task-4",
            TaskStatus::Completed,
            seed_task(
                "Deploy staging server",
                "Set up the CI/CD pipeline.",
                TaskPriority::Urgent,
                &["devops"],
            ),
        ),
    ];

    let mut board = Board::default();
    for (id, status, input) in entries {
        let task = input.into_task(id.to_string(), status);
        // Seed titles are non-empty and ids unique, so this cannot fail.
        if let Err(e) = board.add_task(status, task) {
            tracing::error!(task_id = id, error = %e, "Failed to seed task");
        }
    }
    board
}

fn seed_habit(
    id: &str,
    name: &str,
    color: HabitColor,
    icon: HabitIcon,
    streak: u32,
    completions: &[&str],
) -> Habit {
    Habit {
        id: id.to_string(),
        name: name.to_string(),
        frequency: HabitFrequency::Daily,
        color,
        icon,
        streak,
        completions: completions.iter().map(|c| c.to_string()).collect(),
    }
}

/// The four sample habits.
pub fn sample_habits() -> Vec<Habit> {
    vec![
        seed_habit(
            "habit-1",
            "Read for 30 mins",
            HabitColor::Blue,
            HabitIcon::BookOpen,
            12,
            &[
                "2024-07-20T10:00:00Z",
                "2024-07-21T10:00:00Z",
                "2024-07-22T10:00:00Z",
            ],
        ),
        seed_habit(
            "habit-2",
            "Morning workout",
            HabitColor::Green,
            HabitIcon::Dumbbell,
            5,
            &["2024-07-22T10:00:00Z"],
        ),
        seed_habit(
            "habit-3",
            "Drink 8 glasses of water",
            HabitColor::Sky,
            HabitIcon::GlassWater,
            25,
            &["2024-07-21T10:00:00Z", "2024-07-22T10:00:00Z"],
        ),
        seed_habit(
            "habit-4",
            "Review flashcards",
            HabitColor::Yellow,
            HabitIcon::BrainCircuit,
            2,
            &[],
        ),
    ]
}

/// Quotes shown on the dashboard, one per day.
pub const MOTIVATIONAL_QUOTES: &[&str] = &[
    "The secret of getting ahead is getting started.",
    "Don't watch the clock; do what it does. Keep going.",
    "The expert in anything was once a beginner.",
    "Success is the sum of small efforts, repeated day in and day out.",
    "The future belongs to those who believe in the beauty of their dreams.",
    "Believe you can and you're halfway there.",
    "Well done is better than well said.",
];
