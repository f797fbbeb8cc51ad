//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Wire model
//! - A request is an optional JSON body (`{ "action": ..., "input": ... }`) plus
//!   pass-through metadata (headers)
//! - A response is exactly one of `{ "data": ... }` or `{ "error": "..." }`,
//!   paired with an HTTP-equivalent status code

mod error;
mod manifest;
mod request;
mod responder;
mod response;

pub use error::*;
pub use manifest::*;
pub use request::*;
pub use responder::*;
pub use response::*;
