//! Startup and runtime helpers shared across services.

pub mod bootstrap;
pub mod deadline;
pub mod retry;
