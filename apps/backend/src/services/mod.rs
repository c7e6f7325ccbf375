//! Service layer: orchestration between domain logic and infrastructure.

pub mod match_flow;

pub use match_flow::{DeadlineScheduler, MatchFlowService};
