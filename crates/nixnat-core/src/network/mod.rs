//! Network layer: request authentication and the HTTP transport.
//!
//! This module provides:
//! - [`Auth`], the cookie-or-credentials choice made once per request
//! - [`Transport`], the seam every archive call goes through
//! - [`HttpTransport`], the reqwest implementation of that seam

mod auth;
mod client;
mod transport;

pub use auth::{session_cookie_string, Auth};
pub use client::{HttpTransport, HttpTransportConfig};
pub use transport::Transport;
