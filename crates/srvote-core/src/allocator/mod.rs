//! Vote allocation kernel.
//!
//! Every transition goes through [`step`], which checks the state invariants
//! before and after and returns the side effects as data. The kernel never
//! performs I/O; `session` interprets the effects.

pub mod command;
pub mod invariants;
pub mod state;
pub mod step;
pub mod types;

#[cfg(test)]
mod tests;

pub use command::Command;
pub use invariants::check_invariants;
pub use state::State;
pub use step::{step, Effects};
pub use types::*;
