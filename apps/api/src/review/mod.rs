//! The review lifecycle: session state, partial rollback, and the action
//! processor that drives accept/reject decisions.

pub mod actions;
pub mod handlers;
pub mod rollback;
pub mod session;
