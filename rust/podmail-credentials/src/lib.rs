//! Email verification tokens.
//!
//! A token binds a WebID to an email address and records whether the address
//! was verified. Tokens are ES256 signed JSON Web Tokens in compact form:
//! `header.payload.signature`, each part base64url encoded without padding.
//!
//! The token is the only state the notification service keeps about a
//! person. A verified token is stored in the person's own pod and read back
//! whenever a notification has to be delivered.

mod error;
pub use error::*;

mod claim;
pub use claim::*;

mod codec;
pub use codec::*;
