//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task store contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate input before persistence.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `InvalidOperation`) in addition to storage errors.

pub mod task_repo;
