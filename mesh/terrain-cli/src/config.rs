//! Print parameter resolution from a JSON file and command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mesh_terrain::{PartialParams, TerrainParams};

/// Read a JSON parameter file.
pub fn load_config(path: &Path) -> Result<PartialParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Combine the config file (if any) with flag overrides.
///
/// Without a file every unset flag takes its default. With a file, the
/// file must set every numeric parameter and flags override it.
pub fn resolve_params(
    file: Option<PartialParams>,
    flags: PartialParams,
) -> Result<TerrainParams> {
    let base = file.unwrap_or_else(|| TerrainParams::default().into());
    base.merge(flags).resolve().context("Invalid print parameters")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_terrain::TerrainError;

    const FULL: &str = r#"{
    "print_height": 8.0,
    "print_width": 100.0,
    "base_offset": 1.0,
    "base_thickness": 2.0,
    "header": "Snowdon"
}"#;

    #[test]
    fn defaults_without_file() {
        let params = resolve_params(None, PartialParams::default()).unwrap();
        assert_eq!(params, TerrainParams::default());
    }

    #[test]
    fn flags_override_defaults() {
        let flags = PartialParams {
            print_width: Some(200.0),
            ..PartialParams::default()
        };
        let params = resolve_params(None, flags).unwrap();
        assert_eq!(params.print_width, 200.0);
        assert_eq!(params.print_height, 5.0);
    }

    #[test]
    fn file_values_and_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("print.json");
        fs::write(&path, FULL).unwrap();

        let file = load_config(&path).unwrap();
        let flags = PartialParams {
            base_offset: Some(0.0),
            ..PartialParams::default()
        };
        let params = resolve_params(Some(file), flags).unwrap();
        assert_eq!(params.print_height, 8.0);
        assert_eq!(params.base_offset, 0.0);
        assert_eq!(params.header, "Snowdon");
    }

    #[test]
    fn incomplete_file_is_rejected() {
        let file: PartialParams = serde_json::from_str(r#"{"print_height": 8.0}"#).unwrap();
        let err = resolve_params(Some(file), PartialParams::default()).unwrap_err();
        let cause = err.downcast_ref::<TerrainError>().unwrap();
        assert!(matches!(
            cause,
            TerrainError::MissingParameter {
                name: "print_width"
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("print.json");
        fs::write(&path, r#"{"print_hieght": 8.0}"#).unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn invalid_value_is_rejected() {
        let flags = PartialParams {
            base_thickness: Some(0.0),
            ..PartialParams::default()
        };
        assert!(resolve_params(None, flags).is_err());
    }
}
