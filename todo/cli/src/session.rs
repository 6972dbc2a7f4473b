use crate::ui::{self, MenuChoice, Palette};
use std::io::{self, BufRead, Write};
use std::num::IntErrorKind;
use thiserror::Error;
use todo_core::{Task, TaskStore, validate_description};
use tracing::{debug, info, warn};

/// Printed when input is closed or the process is interrupted.
pub const INTERRUPTED_FAREWELL: &str = "\n\nGoodbye! (Interrupted)\n";

/// Input ran out before the session was told to exit.
#[derive(Error, Debug)]
#[error("end of input")]
struct EndOfInput;

fn is_unreadable_line(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|err| err.kind() == io::ErrorKind::InvalidData)
}

/// One interactive run of the todo list menu.
///
/// The session owns the [`TaskStore`]; everything is lost when it ends.
pub struct Session<R, W> {
    store: TaskStore,
    input: R,
    output: W,
    palette: Palette,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, palette: Palette) -> Self {
        Self {
            store: TaskStore::new(),
            input,
            output,
            palette,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the menu loop until the user exits or input is exhausted.
    ///
    /// Errors raised by a menu action are reported and the loop carries on.
    /// Only failures to read or write the terminal end the session early.
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\nWelcome to Todo List Application!")?;

        loop {
            write!(self.output, "{}", ui::render_menu())?;
            let choice = match self.read_choice() {
                Ok(choice) => choice,
                Err(err) if err.is::<EndOfInput>() => return self.interrupted(),
                Err(err) => return Err(err),
            };
            debug!(?choice, "menu choice");

            let result = match choice {
                MenuChoice::Exit => {
                    writeln!(
                        self.output,
                        "\nGoodbye! Thanks for using Todo List Application.\n"
                    )?;
                    info!("session finished");
                    return Ok(());
                }
                MenuChoice::Add => self.add_task(),
                MenuChoice::View => self.view_tasks(),
                MenuChoice::Update => self.update_task(),
                MenuChoice::Delete => self.delete_task(),
                MenuChoice::Complete => self.complete_task(),
                MenuChoice::SetPriority => self.set_priority(),
            };

            match result {
                Ok(()) => {}
                Err(err) if err.is::<EndOfInput>() => return self.interrupted(),
                Err(err) => {
                    warn!(error = %err, "menu action failed");
                    writeln!(self.output, "\nError: {err}")?;
                    writeln!(self.output, "Returning to main menu...\n")?;
                }
            }
        }
    }

    fn interrupted(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{INTERRUPTED_FAREWELL}")?;
        info!("input closed, session finished");
        Ok(())
    }

    fn read_choice(&mut self) -> anyhow::Result<MenuChoice> {
        loop {
            // A line that is not UTF-8 is consumed by the failed read; treat it as a bad choice.
            let answer = match self.prompt("Enter choice: ") {
                Ok(answer) => answer,
                Err(err) if is_unreadable_line(&err) => String::new(),
                Err(err) => return Err(err),
            };
            if let Some(choice) = MenuChoice::parse(&answer) {
                return Ok(choice);
            }
            writeln!(self.output, "Invalid choice. Please enter a number from 0-6.")?;
        }
    }

    /// Prints `message` and reads one trimmed line of input.
    fn prompt(&mut self, message: &str) -> anyhow::Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(EndOfInput.into());
        }
        Ok(line.trim().to_string())
    }

    /// Asks for a task id and resolves it against the store.
    ///
    /// Prints the reason and returns `None` when the answer is not a number or
    /// names no task.
    fn prompt_existing_id(&mut self, message: &str) -> anyhow::Result<Option<u32>> {
        let answer = self.prompt(message)?;
        // Numbers too large for `i64` are still numbers; they just name no task.
        let number = match answer.parse::<i64>() {
            Ok(number) => Some(number),
            Err(err)
                if matches!(
                    err.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                None
            }
            Err(_) => {
                writeln!(self.output, "Error: Please enter a valid number.")?;
                return Ok(None);
            }
        };

        let id = number
            .and_then(|number| u32::try_from(number).ok())
            .filter(|id| self.store.find_by_id(*id).is_some());
        if id.is_none() {
            let shown = number.map_or_else(|| answer.clone(), |number| number.to_string());
            debug!(id = %shown, "task not found");
            writeln!(self.output, "Error: Task with ID {shown} not found.")?;
        }
        Ok(id)
    }

    fn print_reference_list(&mut self, line: impl Fn(&Task) -> String) -> anyhow::Result<()> {
        for task in self.store.iter() {
            writeln!(self.output, "  {}", line(task))?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn add_task(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- Add New Task ---")?;

        let description = self.prompt("Enter task description: ")?;
        if let Err(err) = validate_description(&description) {
            debug!(error = %err, "rejected description");
            writeln!(self.output, "Error: {err}")?;
            return Ok(());
        }

        let answer = self.prompt("Enter priority [H/M/L] or press Enter for Medium: ")?;
        let priority = match ui::parse_priority_input(&answer) {
            Ok(priority) => priority,
            Err(err) => {
                writeln!(self.output, "Error: {err}")?;
                return Ok(());
            }
        };

        let task = self.store.create(&description, priority)?;
        info!(id = task.id(), %priority, "task created");
        writeln!(self.output, "\n✓ Task added successfully! (ID: {})", task.id())?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn view_tasks(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- All Tasks ---")?;

        let tasks = self.store.list_all();
        if tasks.is_empty() {
            writeln!(self.output, "No tasks found. Add a task to get started!")?;
            return Ok(());
        }

        for task in &tasks {
            writeln!(self.output, "\n{}", ui::format_task(task, &self.palette))?;
        }
        writeln!(self.output, "\nTotal: {} task(s)", tasks.len())?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn update_task(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- Update Task ---")?;

        if self.store.is_empty() {
            writeln!(self.output, "No tasks to update.")?;
            return Ok(());
        }
        self.print_reference_list(|task| format!("[{}] {}", task.id(), task.description()))?;

        let Some(id) = self.prompt_existing_id("\nEnter task ID to update: ")? else {
            return Ok(());
        };
        let current = self
            .store
            .find_by_id(id)
            .map(|task| task.description().to_string())
            .unwrap_or_default();
        writeln!(self.output, "Current description: {current}")?;

        let description = self.prompt("Enter new description: ")?;
        if let Err(err) = validate_description(&description) {
            writeln!(self.output, "Error: {err}")?;
            return Ok(());
        }

        if self.store.update(id, &description)? {
            info!(id, "task updated");
            writeln!(self.output, "\n✓ Task {id} updated successfully!")?;
        } else {
            writeln!(self.output, "Error: Failed to update task {id}.")?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn delete_task(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- Delete Task ---")?;

        if self.store.is_empty() {
            writeln!(self.output, "No tasks to delete.")?;
            return Ok(());
        }
        self.print_reference_list(|task| format!("[{}] {}", task.id(), task.description()))?;

        let Some(id) = self.prompt_existing_id("\nEnter task ID to delete: ")? else {
            return Ok(());
        };
        let description = self
            .store
            .find_by_id(id)
            .map(|task| task.description().to_string())
            .unwrap_or_default();

        let confirm = self.prompt(&format!("Delete task '{description}'? [y/N]: "))?;
        if confirm.to_lowercase() != "y" {
            writeln!(self.output, "Deletion cancelled.")?;
            return Ok(());
        }

        if self.store.delete(id) {
            info!(id, "task deleted");
            writeln!(self.output, "\n✓ Task {id} deleted successfully!")?;
        } else {
            writeln!(self.output, "Error: Failed to delete task {id}.")?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn complete_task(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- Complete Task ---")?;

        if self.store.is_empty() {
            writeln!(self.output, "No tasks to complete.")?;
            return Ok(());
        }
        self.print_reference_list(|task| {
            format!("[{}] {} {}", task.id(), ui::status_marker(task), task.description())
        })?;

        let Some(id) = self.prompt_existing_id("\nEnter task ID to toggle complete: ")? else {
            return Ok(());
        };

        if self.store.toggle_complete(id)? {
            let completed = self
                .store
                .find_by_id(id)
                .is_some_and(|task| task.is_completed());
            let status = if completed { "complete" } else { "incomplete" };
            info!(id, completed, "task toggled");
            writeln!(self.output, "\n✓ Task {id} marked as {status}!")?;
        } else {
            writeln!(self.output, "Error: Failed to update task {id}.")?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn set_priority(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "\n--- Set Priority ---")?;

        if self.store.is_empty() {
            writeln!(self.output, "No tasks to update.")?;
            return Ok(());
        }
        self.print_reference_list(|task| {
            format!(
                "[{}] {} (Priority: {})",
                task.id(),
                task.description(),
                task.priority()
            )
        })?;

        let Some(id) = self.prompt_existing_id("\nEnter task ID to set priority: ")? else {
            return Ok(());
        };
        if let Some(task) = self.store.find_by_id(id) {
            let current = task.priority();
            writeln!(self.output, "Current priority: {current}")?;
        }

        let answer = self.prompt("Enter new priority [H/M/L]: ")?;
        let priority = match ui::parse_priority_input(&answer) {
            Ok(priority) => priority,
            Err(err) => {
                writeln!(self.output, "Error: {err}")?;
                return Ok(());
            }
        };

        if self.store.set_priority(id, priority)? {
            info!(id, %priority, "priority changed");
            writeln!(self.output, "\n✓ Task {id} priority set to {priority}!")?;
        } else {
            writeln!(self.output, "Error: Failed to update task {id}.")?;
        }
        Ok(())
    }
}
