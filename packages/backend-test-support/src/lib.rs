//! Backend test support utilities
//!
//! Helpers shared by the backend's unit and integration tests: unified
//! logging initialization, problem-details response assertions, and
//! unique test data generators.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;

// Logging comes up with the first test binary that links this crate;
// explicit logging::init() calls elsewhere stay safe no-ops.
#[ctor::ctor]
fn init_test_logging() {
    logging::init();
}
