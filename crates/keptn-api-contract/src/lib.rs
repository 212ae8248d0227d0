//! Keptn control-plane REST API contract types and validation
//!
//! This crate defines the wire types exchanged with the control plane
//! (projects, events, sequence control) together with the local checks
//! that run before a request is sent. The types are shared between the
//! REST client, the client traits and the CLI.

pub mod error;
pub mod page;
pub mod types;
pub mod validation;

pub use error::*;
pub use page::*;
pub use types::*;
