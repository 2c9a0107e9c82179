use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use glam::Vec2;

pub fn run(map: Option<&Path>, x: f32, y: f32) -> Result<(), String> {
    let index = super::load_map(map)?;
    let point = Vec2::new(x, y);

    println!(
        "  {} ({x}, {y}) {}",
        "Locate".bold(),
        format!("in '{}'", index.name()).dimmed()
    );
    println!();

    let Some(subsector) = index.find_subsector(point) else {
        println!("  {}", "(no subsector: map has no BSP leaves)".dimmed());
        return Ok(());
    };
    let sector = index.find_sector(point);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Subsector", "Sector", "Floor", "Ceiling", "Tag"]);
    let (floor, ceiling, tag) = match sector.and_then(|s| index.sector(s)) {
        Some(s) => (
            s.floor_height.to_string(),
            s.ceiling_height.to_string(),
            s.tag.to_string(),
        ),
        None => ("--".into(), "--".into(), "--".into()),
    };
    table.add_row(vec![
        subsector.to_string(),
        super::sector_cell(sector),
        floor,
        ceiling,
        tag,
    ]);
    println!("{table}");

    if let Some(bounds) = index.map().bounds() {
        if !bounds.contains(point) {
            println!(
                "  {} point lies outside the map bounds; the nearest leaf was used",
                "NOTE".yellow().bold()
            );
        }
    }

    Ok(())
}
