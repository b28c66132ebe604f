//! Project file loading and validation.

use crate::error::ConfigFileError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the project file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "gatewise.toml";

/// Loads and validates `gatewise.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigFileError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a project file from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigFileError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigFileError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks required fields, port roles, port shapes and cell definitions.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigFileError> {
    if config.design.top.is_empty() {
        return Err(ConfigFileError::MissingField("design.top".to_string()));
    }
    if config.design.netlist.is_empty() {
        return Err(ConfigFileError::MissingField("design.netlist".to_string()));
    }

    for (name, port) in &config.ports {
        if port.clock && port.reset {
            return Err(ConfigFileError::ValidationError(format!(
                "port '{name}' is both clock and reset"
            )));
        }
        match (port.elements, port.element_width) {
            (None, None) => {}
            (Some(elements), Some(width)) if elements > 0 && width > 0 => {}
            (Some(_), Some(_)) => {
                return Err(ConfigFileError::ValidationError(format!(
                    "port '{name}' has a zero-sized shape"
                )))
            }
            _ => {
                return Err(ConfigFileError::ValidationError(format!(
                    "port '{name}' needs both elements and element_width"
                )))
            }
        }
    }

    for role in ["clock", "reset"] {
        let count = config
            .ports
            .values()
            .filter(|p| if role == "clock" { p.clock } else { p.reset })
            .count();
        if count > 1 {
            return Err(ConfigFileError::ValidationError(format!(
                "{count} ports are marked as {role}"
            )));
        }
    }

    config.cell_library()?;
    Ok(())
}
