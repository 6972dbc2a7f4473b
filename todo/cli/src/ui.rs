use todo_core::{Priority, Task};

const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";
const RULE: &str = "========================================";

pub const TITLE: &str = "TODO LIST APPLICATION";

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    Add,
    View,
    Update,
    Delete,
    Complete,
    SetPriority,
}

impl MenuChoice {
    /// Parses a menu selection, accepting `q`, `quit` and `exit` as aliases for `0`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "0" | "q" | "quit" | "exit" => Some(MenuChoice::Exit),
            "1" => Some(MenuChoice::Add),
            "2" => Some(MenuChoice::View),
            "3" => Some(MenuChoice::Update),
            "4" => Some(MenuChoice::Delete),
            "5" => Some(MenuChoice::Complete),
            "6" => Some(MenuChoice::SetPriority),
            _ => None,
        }
    }
}

pub fn render_menu() -> String {
    format!(
        "\n{RULE}\n   {TITLE}\n{RULE}\n\n\
         Main Menu:\n\
         1. Add Task\n\
         2. View Tasks\n\
         3. Update Task\n\
         4. Delete Task\n\
         5. Complete Task\n\
         6. Set Priority\n\
         0. Exit\n"
    )
}

/// Converts the single-letter priority prompt answer into a [`Priority`].
///
/// An empty answer means the default, `Medium`.
pub fn parse_priority_input(input: &str) -> anyhow::Result<Priority> {
    match input.trim().to_uppercase().as_str() {
        "" => Ok(Priority::default()),
        "H" => Ok(Priority::High),
        "M" => Ok(Priority::Medium),
        "L" => Ok(Priority::Low),
        _ => anyhow::bail!("Priority must be H (High), M (Medium), or L (Low)"),
    }
}

/// Applies ANSI colours when the terminal supports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn green(&self, text: &str) -> String {
        if self.enabled {
            format!("{GREEN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

pub fn status_marker(task: &Task) -> &'static str {
    if task.is_completed() { "✓" } else { "○" }
}

/// Two-line rendering of a task used by the task listing.
pub fn format_task(task: &Task, palette: &Palette) -> String {
    let status = if task.is_completed() {
        palette.green("✓ COMPLETE")
    } else {
        "○ Incomplete".to_string()
    };

    format!(
        "[{}] {}\n    Priority: {} | Status: {}",
        task.id(),
        task.description(),
        task.priority(),
        status
    )
}
