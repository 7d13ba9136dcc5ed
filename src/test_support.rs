use crate::error::StoreError;
use crate::kanban_board::Clock;
use crate::store::{KeyValueStore, MemoryStore};
use chrono::{DateTime, Local, TimeZone};
use std::cell::Cell;
use std::io;
use std::rc::Rc;

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<DateTime<Local>>>);

impl ManualClock {
    pub fn at(time: DateTime<Local>) -> Self {
        Self(Rc::new(Cell::new(time)))
    }

    pub fn set(&self, time: DateTime<Local>) {
        self.0.set(time);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}

pub fn local(day: u32, hour: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, hour, min, 0).unwrap()
}

// MemoryStore whose writes can be switched off.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Rc<Cell<bool>>,
}

impl FlakyStore {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key)
    }
}
