//! Command handlers
//!
//! Each handler takes the maintenance service and a reporter so tests can
//! drive it with in-memory stores.

pub mod check;
pub mod moves;
pub mod repair;
