//! Transactional email: account verification and password reset.
//!
//! [`Mailer`] is the seam the API depends on. [`EmailDelivery`] sends over
//! SMTP; [`LogMailer`] stands in when SMTP is not configured.

pub mod delivery;
pub mod templates;

pub use delivery::{EmailConfig, EmailDelivery, EmailError, LogMailer, Mailer, OutgoingEmail};
