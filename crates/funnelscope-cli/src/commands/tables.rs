use anyhow::Result;
use funnelscope_core::SimulationTables;

/// Print the built-in simulation tables as JSON, ready to edit and pass to `--tables`
pub fn execute() -> Result<()> {
    crate::print_json(&SimulationTables::default())
}
