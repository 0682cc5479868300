//! Access control primitives for Solid pods
//!
//! - [`parse_capability_header`] decodes the `WAC-Allow` header a server
//!   advertises on every resource.
//! - [`find_writable`] probes candidate documents and keeps those the
//!   current identity may modify.
//! - [`is_member`], [`is_any_member`] and [`authorize`] decide group
//!   membership by reading the group document.

mod error;
pub use error::*;

mod wac;
pub use wac::*;

mod writable;
pub use writable::*;

mod group;
pub use group::*;
