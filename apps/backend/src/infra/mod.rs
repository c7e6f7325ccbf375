//! Infrastructure layer - state wiring and process assembly.

pub mod state;
