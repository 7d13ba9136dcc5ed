pub mod auth;
pub mod config;
pub mod error;
pub mod kanban_board;
pub mod schedule;
pub mod store;
pub mod task;
pub mod ui;

#[cfg(test)]
mod test_support;
