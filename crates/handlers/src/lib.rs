//! Metaphore bot event handlers.
//!
//! This crate provides the two handlers (greeting new contributors, publishing
//! metaphor stories from closed issues) and the [`EventRouter`] that dispatches
//! one trigger event to one of them.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Handlers sequence calls between business logic in
//! the [`pipeline`] crate and the GitHub port traits. They contain no domain
//! rules of their own: classification, rendering and slug rules all live in
//! [`pipeline`].

pub mod greeting;
pub mod outcome;
pub mod publisher;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use greeting::{GreetingConfig, GreetingHandler};
pub use outcome::{Publication, RunOutcome};
pub use publisher::{PublisherConfig, StoryPublisher};
pub use router::EventRouter;
