//! Zone lookup command.

use std::path::Path;

use anyhow::Result;

use trackmap::Point;

use super::common::read_map;

/// Prints the zone ID, or `none`.
pub fn cmd_zone(map_path: &Path, x: f64, y: f64) -> Result<()> {
    let map = read_map(map_path)?;
    match map.zone_at(Point::new(x, y)) {
        Some(id) => println!("{id}"),
        None => println!("none"),
    }
    Ok(())
}
