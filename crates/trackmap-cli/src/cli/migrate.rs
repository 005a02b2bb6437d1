//! `new` and `migrate` commands.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use trackmap::{MapData, CURRENT_VERSION};

use super::common::{read_map, write_map};

pub fn cmd_new(output: Option<&Path>) -> Result<()> {
    write_map(output, &MapData::new())
}

/// Loading migrates; saving always writes the current version.
pub fn cmd_migrate(map_path: &Path, output: Option<&Path>) -> Result<()> {
    let map = read_map(map_path)?;
    info!(version = CURRENT_VERSION, walls = map.walls.len(), "migrated map");
    write_map(output, &map)
}
