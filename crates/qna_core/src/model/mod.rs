//! Record types for the Q&A store.
//!
//! # Responsibility
//! - Define the three entity kinds and the capability trait the lifecycle
//!   service is generic over.
//!
//! # Invariants
//! - Every record is identified by a sequence-assigned `EntityId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod answer;
pub mod entity;
pub mod question;
pub mod user;
