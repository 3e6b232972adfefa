//! # Kanban Client Library
//!
//! Client side of the Kanban board: talks to the API server and implements
//! the board workflow on top of it.
//!
//! ## Modules
//!
//! - `api`: `KanbanApi` contract and its HTTP implementation
//! - `board`: Columns, status changes, edit and delete flows
//! - `forms`: Task and user forms validated with the shared rules
//! - `mock`: In-process `KanbanApi` for tests and demos
//! - `notice`: Success/error feedback produced by every mutation

pub mod api;
pub mod board;
pub mod forms;
pub mod mock;
pub mod notice;
