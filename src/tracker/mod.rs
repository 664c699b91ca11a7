//! Project tracking: projects, issues, sprints, boards and comments.
//!
//! The module owns the issue workflow (backlog, sprint membership and board
//! column), the sprint lifecycle (planned, active, completed), per-project
//! issue keys, and the append-only activity log embedded in every issue. It
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Workflow and database settings in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
