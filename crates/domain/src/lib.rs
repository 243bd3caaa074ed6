//! # quick-links-domain
//!
//! Settings model and the configuration resolution engine for the quick-links
//! panel:
//!
//! - **Primitives** - `PortalId`, `ObjectType`, `RecordId`, `PropertyName`
//! - **Model** - `ButtonDescriptor`, `CanonicalSettings`, `RenderedButton`, `ScopeKey`
//! - **Extraction** - flat or `{value}`-wrapped property values to strings
//! - **URL normalization** - explicit scheme or "no URL"
//! - **Migration** - every historical persisted layout to `CanonicalSettings`
//! - **Resolution** - descriptors plus property values to rendered buttons
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O; every function here is synchronous and side-effect free

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use quick_links_shared::shared_crate_version;

pub mod descriptor;
pub mod extract;
pub mod migrate;
pub mod primitives;
pub mod resolve;
pub mod scope;
pub mod settings;
pub mod url;

pub use descriptor::{
    ButtonDescriptor, DEFAULT_BUTTON_COUNT, LabelType, MAX_BUTTONS_PER_SCOPE, RenderedButton,
    default_descriptors, default_label,
};
pub use extract::{PropertyValues, extract_named, extract_property_value};
pub use migrate::{
    DocumentShape, Migration, MigrationNote, migrate, migrate_loaded, migrate_with_report,
};
pub use primitives::{ObjectType, PortalId, PrimitiveError, PropertyName, RecordId};
pub use resolve::{invalid_property_names, required_properties, resolve_buttons};
pub use scope::ScopeKey;
pub use settings::{CanonicalSettings, SettingsDocument};
pub use url::normalize_url;

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
