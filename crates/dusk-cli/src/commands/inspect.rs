use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use dusk_sim::ThingKind;
use glam::Vec2;

pub fn run(map: Option<&Path>, show_things: bool) -> Result<(), String> {
    let index = super::load_map(map)?;
    let data = index.map();

    println!("  {} '{}'", "Map".bold(), index.name());
    println!(
        "  {} vertices, {} linedefs, {} sidedefs, {} sectors",
        data.vertices.len(),
        data.linedefs.len(),
        data.sidedefs.len(),
        data.sectors.len()
    );
    println!(
        "  {} segs, {} subsectors, {} nodes, {} things",
        data.segs.len(),
        data.subsectors.len(),
        data.nodes.len(),
        data.things.len()
    );
    if let Some(bounds) = data.bounds() {
        println!(
            "  Bounds: ({}, {}) to ({}, {})",
            bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
        );
    }
    let blockmap = index.blockmap();
    println!(
        "  Blockmap: {}x{} cells {}",
        blockmap.columns,
        blockmap.rows,
        format!("(origin {}, {})", blockmap.origin.x, blockmap.origin.y).dimmed()
    );
    println!(
        "  Reject table: {}",
        if index.has_reject() {
            "present".normal()
        } else {
            "absent (all sectors visible)".dimmed()
        }
    );
    let malformed = index.malformed_references();
    if malformed > 0 {
        println!(
            "  {} {malformed} malformed reference(s), resolved as not found",
            "WARN".yellow().bold()
        );
    }
    println!();

    println!("  {}", "Sectors".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Sector", "Floor", "Ceiling", "Light", "Tag", "Special", "Neighbors",
    ]);
    for (i, sector) in index.sectors().iter().enumerate() {
        let neighbors: Vec<String> = index.neighbors(i).iter().map(|n| n.to_string()).collect();
        let ceiling = if sector.is_sky_ceiling() {
            format!("{} (sky)", sector.ceiling_height)
        } else {
            sector.ceiling_height.to_string()
        };
        table.add_row(vec![
            i.to_string(),
            sector.floor_height.to_string(),
            ceiling,
            sector.light_level.to_string(),
            tag_cell(sector.tag),
            sector.special.to_string(),
            neighbors.join(", "),
        ]);
    }
    println!("{table}");

    let specials: Vec<_> = data
        .linedefs
        .iter()
        .enumerate()
        .filter(|(_, l)| l.special != 0)
        .collect();
    if !specials.is_empty() {
        println!();
        println!("  {}", "Line Specials".bold().underline());
        println!();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Line", "Special", "Tag", "Front", "Back"]);
        for (i, line) in specials {
            let (front, back) = index.line_sectors(i);
            table.add_row(vec![
                i.to_string(),
                line.special.to_string(),
                tag_cell(line.tag),
                super::sector_cell(front),
                super::sector_cell(back),
            ]);
        }
        println!("{table}");
    }

    if show_things {
        println!();
        println!("  {}", "Things".bold().underline());
        println!();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Type", "Kind", "Position", "Angle", "Sector"]);
        for (i, spawn) in data.things.iter().enumerate() {
            let kind = ThingKind::from_doomednum(spawn.doomednum)
                .map_or_else(|| "player start".to_string(), |k| k.label());
            let sector = index.find_sector(Vec2::new(spawn.x, spawn.y));
            table.add_row(vec![
                i.to_string(),
                spawn.doomednum.to_string(),
                kind,
                format!("({}, {})", spawn.x, spawn.y),
                spawn.angle.to_string(),
                super::sector_cell(sector),
            ]);
        }
        println!("{table}");
    }

    Ok(())
}

fn tag_cell(tag: u16) -> String {
    if tag == 0 {
        "--".to_string()
    } else {
        tag.to_string()
    }
}
