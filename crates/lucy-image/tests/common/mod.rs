//! Common test infrastructure for lucy-image tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `fixtures`: Manifest and manifest list JSON builders
//! - `mock_server`: Wiremock registry and token endpoint helpers

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::*;
