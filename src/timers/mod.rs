//! Nested wall-clock timers used for solver profiling.

mod timers;
pub use timers::*;
