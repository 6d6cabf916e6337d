//! Scenario and property test suite for Miles.
//!
//! Integration tests live under `tests/`; [`helpers`] provides scripted
//! collaborators shared between them.

pub mod helpers;
