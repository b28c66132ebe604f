//! Opening a design from a `gatewise.toml` project directory.

use crate::design::Design;
use crate::error::DesignError;
use crate::ports::PortShape;
use gatewise_config::load_config;
use std::path::Path;
use tracing::debug;

impl Design {
    /// Loads `gatewise.toml` from `project_dir`, opens the netlist it names
    /// (relative to `project_dir`) with the configured cell library, and
    /// applies every port role and shape.
    pub fn open_project(project_dir: impl AsRef<Path>) -> Result<Self, DesignError> {
        let project_dir = project_dir.as_ref();
        let config = load_config(project_dir)?;
        let library = config.cell_library()?;
        let netlist_path = project_dir.join(&config.design.netlist);
        debug!(
            "Opening project {}: top '{}', {} library cells",
            project_dir.display(),
            config.design.top,
            library.len()
        );

        let mut design = Design::open_file(&config.design.top, netlist_path, library)?;
        if let Some(clock) = config.clock_port() {
            design.set_clock(clock)?;
        }
        if let Some(reset) = config.reset_port() {
            design.set_reset(reset)?;
        }
        for (name, port) in &config.ports {
            if let Some((elements, element_width)) = port.shape() {
                design.set_port_shape(
                    name,
                    PortShape {
                        elements,
                        element_width,
                    },
                )?;
            }
        }
        Ok(design)
    }
}
