//! Core domain model for the todo list: validated tasks and the in-memory store that owns them.
pub mod store;
pub mod task;

pub use store::TaskStore;
pub use task::{MAX_DESCRIPTION_LEN, Priority, Task, TaskError, ValidationError, validate_description};
