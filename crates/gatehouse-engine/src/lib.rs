//! Access-event decision engine for the gatehouse edge device.
//!
//! This crate contains the per-tag visit state machine, the local
//! collaborator replica it consults, and the decision logic that turns a tag
//! read into a decided access event plus a feedback command. Everything here
//! is synchronous and in-memory: decisions never wait on the network, and a
//! restart deliberately forgets all visit state (everyone is treated as
//! absent again).

pub mod decision;
pub mod replica;
pub mod report;
pub mod visit;

pub use decision::{Decision, DecisionEngine};
pub use replica::{CollaboratorReplica, PolicyAnswer, SharedReplica, shared_replica};
pub use report::{PresentEntry, SessionReport, SessionStats};
pub use visit::{Passage, VisitState, VisitStateStore};
