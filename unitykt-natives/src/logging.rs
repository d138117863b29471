//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; embedding applications usually
//! install their own subscriber. [`init`] is a convenience for tools and
//! tests that have none.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "unitykt_natives=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// Returns `false` if a global subscriber was already set.
pub fn init(default_directive: &str) -> bool {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), default_directive);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// First valid filter of `env_directive`, `default_directive` and
/// [`DEFAULT_DIRECTIVE`].
fn build_filter(env_directive: Option<String>, default_directive: &str) -> EnvFilter {
    env_directive
        .filter(|directive| !directive.is_empty())
        .ok_or(())
        .and_then(|directive| EnvFilter::try_new(directive).map_err(|_| ()))
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        // The first call may lose to another test that already installed one.
        let _ = init("debug");
        assert!(!init(DEFAULT_DIRECTIVE));
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        let _ = init("not a [valid directive");
        assert!(!init("also=[invalid"));
    }

    fn rendered(filter: EnvFilter) -> String {
        filter.to_string().to_lowercase()
    }

    #[test]
    fn test_env_directive_wins() {
        assert_eq!(rendered(build_filter(Some("warn".into()), "debug")), "warn");
    }

    #[test]
    fn test_default_directive_used_without_env() {
        assert_eq!(rendered(build_filter(None, "debug")), "debug");
        assert_eq!(rendered(build_filter(Some(String::new()), "debug")), "debug");
    }

    #[test]
    fn test_invalid_env_directive_uses_default() {
        let filter = build_filter(Some("unitykt_natives=notalevel".into()), "debug");
        assert_eq!(rendered(filter), "debug");
    }

    #[test]
    fn test_invalid_default_uses_crate_directive() {
        let filter = build_filter(None, "unitykt_natives=notalevel");
        assert_eq!(rendered(filter), DEFAULT_DIRECTIVE);
    }
}
