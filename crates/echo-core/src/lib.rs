//! Echo core crate - shared error type, configuration and the message
//! protocol spoken between the control surface and the content script.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::EchoConfig;
pub use error::{EchoError, Result};
pub use protocol::{ContentRequest, ContentResponse, INSERT_REPORT_ACTION};
