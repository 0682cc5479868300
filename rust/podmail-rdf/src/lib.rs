//! RDF data model for the podmail resolution engine.
//!
//! This crate provides the value types shared by every other podmail crate:
//! [`Term`]s, [`Triple`]s as they come out of a parsed document, [`Quad`]s
//! tagged with the document they were fetched from, and the append-only
//! [`Store`] a single resolution run accumulates its knowledge in.
#![warn(missing_docs)]

mod error;
pub use error::*;

mod term;
pub use term::*;

mod quad;
pub use quad::*;

mod store;
pub use store::*;

mod parse;
pub use parse::*;

/// Well known vocabulary IRIs.
pub mod vocab;
