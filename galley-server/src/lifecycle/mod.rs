//! Lifecycle Coordinator
//!
//! The order / table-session / kitchen-ticket state machine:
//!
//! - [`order_flow`] - order placement, guarded status transitions, payment
//!   collection, completion
//! - [`kitchen`] - ticket batches and the readiness aggregator
//! - [`table_flow`] - table sessions, occupancy re-checks, release
//! - [`merge`] - table merge/unmerge
//! - [`reservation_flow`] - booking, check-in, the auto-complete sweep
//! - [`reset`] - the end-of-day bulk reset
//!
//! Every operation takes the database pool and an explicit [`Operator`]
//! context; there is no ambient request state and no background work. The
//! concurrency contract: read current state, condition the write on it,
//! re-read on a lost race. Secondary effects (table release, audit,
//! notifications) run after the primary commit and are individually caught.
//!
//! [`Operator`]: crate::auth::Operator

pub mod kitchen;
pub mod merge;
pub mod money;
pub mod order_flow;
pub mod reservation_flow;
pub mod reset;
pub mod table_flow;

#[cfg(test)]
pub(crate) mod testutil;
