//! Use-case services over the entity stores.
//!
//! # Responsibility
//! - Apply not-found and compensating-action policies on top of repository
//!   contracts.
//! - Keep callers decoupled from SQLite details.

pub mod entity_service;
