//! Cluster client and transport.
//!
//! This module provides the [`Clientset`] used to reach every resource family,
//! the [`Transport`] seam it is built on, and authentication types ([`Auth`]).

mod auth;
mod clientset;
mod error;
pub mod testing;
mod transport;

pub use auth::Auth;
pub use clientset::{Clientset, ConnectionSettings};
pub use error::{ClientError, Result};
pub(crate) use error::is_unknown_route;
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, RawResponse, Transport, TransportOptions};
