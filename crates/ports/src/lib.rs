//! # quick-links-ports
//!
//! Port traits for the quick-links hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// Only settings persistence and property fetching suspend, so every port
/// method that does I/O returns one of these.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod logger;
pub mod property_source;
pub mod settings_store;

pub use logger::*;
pub use property_source::*;
pub use settings_store::*;

// Domain types used in port signatures.
pub use quick_links_domain::{
    ObjectType, PortalId, PropertyName, PropertyValues, RecordId, SettingsDocument,
};
