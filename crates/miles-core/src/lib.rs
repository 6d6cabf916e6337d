//! # miles-core
//! Foundation types, pure derivations, and collaborator traits for Miles.

pub mod aggregate;
pub mod catalog;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod traits;
pub mod types;
