//! Email notifications for people who keep their data in Solid pods.
//!
//! The service keeps no account database. A person proves they control an
//! email address by following a signed link; the resulting verified token is
//! written into a settings document of their own pod. To deliver a
//! notification, the service crawls the recipient's pod, finds the tokens,
//! verifies them and mails every verified address.
//!
//! [`Service`] ties the pieces together:
//!
//! - [`Service::initialize`], [`Service::check_link`] and [`Service::finish`]
//!   implement the verification flow
//! - [`Service::status`] reports whether a person has a verified address
//! - [`Service::notify`] delivers a [`Notification`]
//! - [`Service::authorize`] restricts the service to members of configured groups
//!
//! HTTP routing, HTML templates and SMTP delivery live outside this crate;
//! mail leaves through the [`Mailer`] trait.

mod config;
pub use config::*;

mod error;
pub use error::*;

mod mailer;
pub use mailer::*;

mod discovery;
pub use discovery::*;

mod service;
pub use service::*;

mod status;
pub use status::*;

mod integration;
pub use integration::*;

mod notification;
pub use notification::*;
