//! Backend registry.
//!
//! Static access to all backend descriptors, and the central point for
//! resolving CLI names and aliases.

use std::collections::HashMap;
use std::sync::OnceLock;

use tandem_core::BackendKind;

use crate::descriptor::BackendDescriptor;
use crate::gemini::gemini_descriptor;
use crate::openai::openai_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all backend descriptors.
static DESCRIPTORS: OnceLock<Vec<BackendDescriptor>> = OnceLock::new();

/// Static storage for CLI name to backend kind mapping.
static CLI_NAME_MAP: OnceLock<HashMap<String, BackendKind>> = OnceLock::new();

fn init_descriptors() -> Vec<BackendDescriptor> {
    vec![gemini_descriptor(), openai_descriptor()]
}

/// Builds the CLI name to backend kind mapping.
fn build_cli_name_map(descriptors: &[BackendDescriptor]) -> HashMap<String, BackendKind> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli.name.to_string(), desc.id);

        for alias in desc.cli.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }

    map
}

// ============================================================================
// Backend Registry
// ============================================================================

/// Global registry of all backend descriptors.
pub struct BackendRegistry;

impl BackendRegistry {
    /// Returns all backend descriptors.
    pub fn all() -> &'static [BackendDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a backend descriptor by kind.
    pub fn get(id: BackendKind) -> Option<&'static BackendDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name to backend kind mapping.
    pub fn cli_name_map() -> &'static HashMap<String, BackendKind> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a backend by CLI name or alias, case-insensitively.
    pub fn get_by_cli_name(name: &str) -> Option<&'static BackendDescriptor> {
        let kind = Self::cli_name_map().get(&name.trim().to_ascii_lowercase())?;
        Self::get(*kind)
    }

    /// Returns all backend kinds.
    pub fn kinds() -> Vec<BackendKind> {
        Self::all().iter().map(|d| d.id).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_descriptor() {
        for kind in BackendKind::all() {
            let desc = BackendRegistry::get(*kind);
            assert!(desc.is_some(), "missing descriptor for {kind:?}");
            assert_eq!(desc.unwrap().id, *kind);
        }
        assert_eq!(BackendRegistry::kinds().len(), BackendKind::all().len());
    }

    #[test]
    fn test_cli_name_lookup() {
        assert_eq!(
            BackendRegistry::get_by_cli_name("gemini").map(|d| d.id),
            Some(BackendKind::Gemini)
        );
        assert_eq!(
            BackendRegistry::get_by_cli_name("OpenAI").map(|d| d.id),
            Some(BackendKind::OpenAi)
        );
        assert_eq!(
            BackendRegistry::get_by_cli_name("google").map(|d| d.id),
            Some(BackendKind::Gemini)
        );
        assert_eq!(
            BackendRegistry::get_by_cli_name("chatgpt").map(|d| d.id),
            Some(BackendKind::OpenAi)
        );
        assert!(BackendRegistry::get_by_cli_name("claude").is_none());
    }

    #[test]
    fn test_cli_names_match_kind() {
        for desc in BackendRegistry::all() {
            assert_eq!(desc.cli_name(), desc.id.cli_name());
            assert_eq!(desc.display_name(), desc.id.display_name());
        }
    }
}
