//! # quick-links-app
//!
//! Application use cases for the quick-links panel: loading settings,
//! rendering a record's links, and editing the configuration.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod editor;
pub mod load_settings;
mod log_fields;
pub mod render_quick_links;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use editor::{ButtonPatch, ConfigurationEditor, EditorError, SaveFailure};
pub use load_settings::{
    LoadReport, LoadSettingsDeps, LoadedSettings, USING_DEFAULTS_WARNING, load_settings,
};
pub use render_quick_links::{
    EmptyStateHint, RenderOutcome, RenderQuickLinksDeps, RenderQuickLinksInput,
    RenderQuickLinksOutput, render_quick_links,
};

#[cfg(test)]
mod tests {
    use super::*;
    use quick_links_domain::domain_crate_version;
    use quick_links_ports::ports_crate_version;
    use quick_links_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        assert_eq!(app_crate_version(), ports_crate_version());
        assert_eq!(app_crate_version(), domain_crate_version());
        assert_eq!(app_crate_version(), shared_crate_version());
    }
}
