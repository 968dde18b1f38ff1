//! # System Module
//!
//! Stage progression for the registration workflow.
//!
//! Stage logic is pure and deterministic: given the current stage it
//! answers which stage comes next and which fields are open, locked or
//! hidden. It never decides *whether* to advance; that is the transition
//! gate's job.

mod stage;

pub use stage::*;
