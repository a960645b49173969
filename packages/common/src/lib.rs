//! # Vellum Common
//!
//! Shared leaf utilities: the sanitization boundary and heading slug
//! generation. Pure functions only — every crate above routes untrusted
//! strings through here before they become attributes or markup.

pub mod sanitize;
pub mod slug;

pub use sanitize::*;
pub use slug::*;
