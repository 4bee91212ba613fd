//! Outbound email for account lifecycle events.
//!
//! This module provides a service for sending transactional emails like
//! welcome messages and password reset links, using the SMTP configuration
//! from the main config file.

mod email;

pub use email::EmailService;
