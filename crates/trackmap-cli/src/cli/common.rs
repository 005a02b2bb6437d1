//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use trackmap::MapData;

/// Load a map file, migrating it to the current version.
pub fn read_map(path: &Path) -> Result<MapData> {
    MapData::load(path).with_context(|| format!("failed to load map {}", path.display()))
}

/// Write `content` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

pub fn write_map(output: Option<&Path>, map: &MapData) -> Result<()> {
    write_output(output, &map.to_json_string()?)
}
