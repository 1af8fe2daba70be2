//! Domain model for weekly task tracking.
//!
//! # Responsibility
//! - Define the task shape shared by storage, services, and presentation.
//! - Own input normalization (title, description, tags).
//!
//! # Invariants
//! - A task lives in exactly one bucket: the inbox or one ISO week.

pub mod task;
