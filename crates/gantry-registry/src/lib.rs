//! Package registry publishing for Gantry
//!
//! Publishes through the `npm` CLI rather than the registry HTTP
//! protocol; the one-time password comes from an injectable provider
//! so tests never need a terminal.

pub mod error;
pub mod npm;
pub mod otp;

pub use error::{RegistryError, Result};
pub use npm::NpmPublisher;
pub use otp::OtpProvider;
