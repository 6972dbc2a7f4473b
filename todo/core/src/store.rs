use crate::task::{Priority, Task, TaskError, validate_description};

/// In-memory owner of every task in a session.
///
/// Tasks are kept in insertion order. Ids come from a counter that starts at 1
/// and only ever moves forward, so an id is never handed out twice even after
/// its task has been deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// `None` once `u32::MAX` has been handed out.
    next_id: Option<u32>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: Some(1),
        }
    }

    /// Creates a task with the next free id and appends it to the store.
    ///
    /// Nothing changes if the task fails validation; the id is not consumed.
    /// Once every `u32` id has been used, creation fails with
    /// [`TaskError::IdsExhausted`].
    pub fn create(&mut self, description: &str, priority: Priority) -> Result<Task, TaskError> {
        let id = self.next_id.ok_or(TaskError::IdsExhausted)?;
        let task = Task::from_parts(id, description, priority, false, None)?;

        self.tasks.push(task.clone());
        self.next_id = id.checked_add(1);
        Ok(task)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Returns a snapshot of every task in creation order.
    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The id the next successful [`create`](Self::create) will assign, if any are left.
    pub fn next_id(&self) -> Option<u32> {
        self.next_id
    }

    /// Replaces the description of task `id`.
    ///
    /// Returns `Ok(false)` when there is no such task. The new description is
    /// validated before the store is touched.
    pub fn update(&mut self, id: u32, new_description: &str) -> Result<bool, TaskError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let description = validate_description(new_description)?;

        self.tasks[index] = self.tasks[index].with_description(description)?;
        Ok(true)
    }

    /// Removes task `id`, returning whether it existed.
    pub fn delete(&mut self, id: u32) -> bool {
        match self.position(id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flips the completion flag of task `id`.
    pub fn toggle_complete(&mut self, id: u32) -> Result<bool, TaskError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        self.tasks[index] = self.tasks[index].toggled()?;
        Ok(true)
    }

    /// Sets the priority of task `id`.
    ///
    /// `priority` may be a [`Priority`] or its text form. A value outside the
    /// enumeration is rejected with [`TaskError::InvalidArgument`] before the
    /// id is looked up, so it fails even for an unknown id.
    pub fn set_priority<P>(&mut self, id: u32, priority: P) -> Result<bool, TaskError>
    where
        P: TryInto<Priority>,
        TaskError: From<P::Error>,
    {
        let priority = priority.try_into()?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        self.tasks[index] = self.tasks[index].with_priority(priority)?;
        Ok(true)
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == id)
    }
}
