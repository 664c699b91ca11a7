//! Trackwell: domain core of a project and issue tracker.
//!
//! This crate manages projects, issues, sprints and comments. It enforces
//! the issue workflow across backlog, sprints and board columns, the
//! forward-only sprint lifecycle, and sequential per-project issue keys,
//! recording every status and assignee change in an activity log.
//!
//! # Architecture
//!
//! Trackwell follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration invoked with an explicit acting user
//!
//! # Modules
//!
//! - [`tracker`]: Projects, issues, sprints, boards and comments

pub mod tracker;
