//! Foundation types for the Quarry object database.
//!
//! This crate provides the content-addressed identifier type used throughout
//! the quarry system. Every other quarry crate that touches objects depends
//! on `quarry-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (SHA-1 digest, 40 hex chars)

pub mod error;
pub mod object;

pub use error::IdError;
pub use object::ObjectId;
