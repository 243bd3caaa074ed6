//! # quick-links-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Logger selection.
mod logger_factory;
/// Property source selection.
mod property_factory;
/// Composition root.
pub mod runtime;
/// Settings store selection.
mod store_factory;

pub use config_check::{load_effective_config, load_effective_config_json};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use logger_factory::{LogFormat, build_logger};
pub use property_factory::build_property_source;
pub use runtime::{QuickLinksRuntime, RuntimeOptions, config_root};
pub use store_factory::{build_settings_store, endpoint_config};

// Error metadata reaches stdout through the CLI.
pub use quick_links_shared::redact_if_secret;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_links_adapters::adapters_crate_version;
    use quick_links_app::app_crate_version;
    use quick_links_config::config_crate_version;
    use quick_links_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("quick-links-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn infra_depends_on_app_adapters_config() {
        let deps = workspace_deps();
        let required = [
            "quick-links-app",
            "quick-links-adapters",
            "quick-links-config",
        ];

        for expected in required {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn infra_shares_the_workspace_version() {
        let version = infra_crate_version();
        assert_eq!(version, app_crate_version());
        assert_eq!(version, adapters_crate_version());
        assert_eq!(version, config_crate_version());
        assert_eq!(version, shared_crate_version());
    }
}
