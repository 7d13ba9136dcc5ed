use crate::error::{BoardError, Result};
use crate::store::KeyValueStore;
use crate::task::{
    default_tasks, is_default_task, new_task_id, open_time_range, Column, Task, DEFAULT_TASKS,
};
use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const STORAGE_KEY: &str = "kanban-tasks-daily";

pub const RESET_HOUR: u32 = 6;

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// True with no previous reset, or once the local date has changed and it is
/// `RESET_HOUR` or later.
pub fn should_reset(last_reset: Option<DateTime<Local>>, now: DateTime<Local>) -> bool {
    match last_reset {
        None => true,
        Some(last) => last.date_naive() != now.date_naive() && now.hour() >= RESET_HOUR,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBoard {
    tasks: Vec<Task>,
    #[serde(default)]
    last_reset: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredBoardRef<'a> {
    tasks: Vec<&'a Task>,
    last_reset: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    ReturnedToTodo, // default tasks go back to todo instead
}

pub struct KanbanBoard<S, C = SystemClock> {
    store: S,
    clock: C,
    tasks: Vec<Task>,
    last_reset: DateTime<Utc>,
    inputs: [String; 3],
}

impl<S: KeyValueStore, C: Clock> KanbanBoard<S, C> {
    /// Restores the board from `store`, falling back to the default tasks when
    /// nothing usable is stored.
    pub fn load(store: S, clock: C) -> Self {
        let now = clock.now().with_timezone(&Utc);
        let mut board = Self {
            store,
            clock,
            tasks: Vec::new(),
            last_reset: now,
            inputs: Default::default(),
        };

        match board.read_stored() {
            Ok(Some(stored)) => board.restore(stored),
            Ok(None) => {
                info!("no saved board, starting from default tasks");
                board.seed_defaults();
            }
            Err(err) => {
                warn!("failed to load saved board, starting from default tasks: {err}");
                board.seed_defaults();
            }
        }
        board
    }

    fn read_stored(&self) -> Result<Option<StoredBoard>> {
        let Some(raw) = self.store.get(STORAGE_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn seed_defaults(&mut self) {
        let now = self.clock.now().with_timezone(&Utc);
        self.tasks = default_tasks(now);
        self.last_reset = now;
        if let Err(err) = self.persist() {
            warn!("failed to save initial board: {err}");
        }
    }

    fn restore(&mut self, stored: StoredBoard) {
        let now = self.clock.now();

        let mut seen = HashSet::new();
        let mut tasks: Vec<Task> = stored
            .tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        // Defaults sitting in todo are never stored, so bring them back.
        let mut restored: Vec<Task> = DEFAULT_TASKS
            .iter()
            .filter(|d| !seen.contains(d.id))
            .map(|d| d.instantiate(now.with_timezone(&Utc)))
            .collect();
        restored.append(&mut tasks);

        self.tasks = restored;
        self.last_reset = stored.last_reset.unwrap_or_else(|| now.with_timezone(&Utc));
        debug!("restored {} tasks", self.tasks.len());

        let last_reset = stored.last_reset.map(|t| t.with_timezone(&Local));
        if should_reset(last_reset, now) {
            info!("saved board is from a previous day, resetting");
            self.seed_defaults();
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_in(&self, column: Column) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.column == column).collect()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn last_reset(&self) -> DateTime<Utc> {
        self.last_reset
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // The remove action does not apply to default tasks in todo.
    pub fn can_remove(&self, task: &Task) -> bool {
        is_persistable(task)
    }

    pub fn input(&self, column: Column) -> &str {
        &self.inputs[column.index()]
    }

    pub fn input_mut(&mut self, column: Column) -> &mut String {
        &mut self.inputs[column.index()]
    }

    pub fn set_input(&mut self, column: Column, text: impl Into<String>) {
        self.inputs[column.index()] = text.into();
    }

    pub fn persistable_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| is_persistable(t)).collect()
    }

    pub fn persist(&mut self) -> Result<()> {
        save(&mut self.store, &self.tasks, self.last_reset)
    }

    // Mutations write the new task list first and only then replace the
    // in-memory state, so a failed write leaves the board untouched.
    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        save(&mut self.store, &tasks, self.last_reset)?;
        self.tasks = tasks;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        let now = self.clock.now().with_timezone(&Utc);
        let tasks = default_tasks(now);
        save(&mut self.store, &tasks, now)?;

        self.tasks = tasks;
        self.last_reset = now;
        for input in &mut self.inputs {
            input.clear();
        }
        info!("board reset to default tasks");
        Ok(())
    }

    pub fn tick(&mut self) -> Result<bool> {
        let last = self.last_reset.with_timezone(&Local);
        if should_reset(Some(last), self.clock.now()) {
            self.reset()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn add_task(&mut self, column: Column, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }

        let now = self.clock.now();
        let task = Task {
            id: new_task_id(),
            title: title.to_string(),
            time_range: open_time_range(now),
            column,
            created_at: now.with_timezone(&Utc),
        };
        let id = task.id.clone();

        let mut tasks = self.tasks.clone();
        tasks.push(task);
        self.commit(tasks)?;
        self.inputs[column.index()].clear();
        debug!("added task {id} to {column}");
        Ok(id)
    }

    pub fn move_task(&mut self, id: &str, target: Column) -> Result<bool> {
        if is_default_task(id) && target == Column::Todo {
            return Ok(false);
        }

        let pos = self.position(id)?;
        if self.tasks[pos].column == target {
            return Ok(false);
        }

        let mut tasks = self.tasks.clone();
        tasks[pos].column = target;
        self.commit(tasks)?;
        debug!("moved task {id} to {target}");
        Ok(true)
    }

    pub fn remove_task(&mut self, id: &str) -> Result<Removal> {
        let pos = self.position(id)?;
        let mut tasks = self.tasks.clone();

        let removal = if is_default_task(id) {
            if tasks[pos].column == Column::Todo {
                return Err(BoardError::ProtectedTask {
                    id: id.to_string(),
                    column: Column::Todo.label(),
                });
            }
            tasks[pos].column = Column::Todo;
            Removal::ReturnedToTodo
        } else {
            tasks.remove(pos);
            Removal::Deleted
        };

        self.commit(tasks)?;
        debug!("removed task {id}: {removal:?}");
        Ok(removal)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
    }
}

fn is_persistable(task: &Task) -> bool {
    !(is_default_task(&task.id) && task.column == Column::Todo)
}

fn save<S: KeyValueStore>(
    store: &mut S,
    tasks: &[Task],
    last_reset: DateTime<Utc>,
) -> Result<()> {
    let payload = StoredBoardRef {
        tasks: tasks.iter().filter(|t| is_persistable(t)).collect(),
        last_reset,
    };
    let json = serde_json::to_string(&payload)?;
    store.set(STORAGE_KEY, &json)?;
    Ok(())
}
