use std::path::Path;

use super::run::{Script, Session, simulate};

pub fn run(
    what: &str,
    map: Option<&Path>,
    config: Option<&Path>,
    ticks: u64,
    script: &Script,
    output: Option<&Path>,
) -> Result<(), String> {
    let mut content = match what {
        "map" => {
            let index = super::load_map(map)?;
            index
                .map()
                .to_json()
                .map_err(|e| format!("JSON serialization error: {e}"))?
        }
        "save" => {
            let Session { sim, .. } = simulate(map, config, None, ticks, script)?;
            sim.save_data()
                .and_then(|save| save.to_json())
                .map_err(|e| format!("JSON serialization error: {e}"))?
        }
        "snapshot" => {
            let Session { sim, frame_loop, .. } = simulate(map, config, None, ticks, script)?;
            let snapshot = frame_loop
                .snapshot(&sim)
                .map_err(|e| format!("snapshot failed: {e}"))?;
            serde_json::to_string_pretty(&snapshot)
                .map_err(|e| format!("JSON serialization error: {e}"))?
        }
        _ => {
            return Err(format!(
                "unsupported export: \"{what}\". Use: map, save, snapshot"
            ));
        }
    };
    content.push('\n');

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}
