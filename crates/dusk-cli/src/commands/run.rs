use std::path::Path;

use clap::Args;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use dusk_sim::clock::TIC_SECONDS;
use dusk_sim::thing::ThingState;
use dusk_sim::{
    FrameLoop, FrameTally, PlayerIntent, SimEventKind, Simulation, present_frame,
};

/// Input held for the whole run.
#[derive(Args, Debug, Clone, Default)]
pub struct Script {
    /// Forward input, -1 to 1
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub forward: f32,

    /// Strafe input, -1 (left) to 1 (right)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub strafe: f32,

    /// Turn input, -1 (right) to 1 (left)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub turn: f32,

    /// Hold the run modifier
    #[arg(long)]
    pub run: bool,

    /// Hold the trigger
    #[arg(long)]
    pub fire: bool,

    /// Press use every N ticks (0 = never)
    #[arg(long, default_value = "0")]
    pub use_every: u64,
}

impl Script {
    /// The intent for the frame that will run `tick`.
    fn intent_at(&self, tick: u64) -> PlayerIntent {
        PlayerIntent {
            forward: self.forward,
            strafe: self.strafe,
            turn: self.turn,
            run: self.run,
            fire: self.fire,
            use_line: self.use_every > 0 && tick % self.use_every == 0,
            ..PlayerIntent::default()
        }
    }
}

/// A finished headless run.
pub struct Session {
    pub sim: Simulation,
    pub frame_loop: FrameLoop,
    pub tally: FrameTally,
}

/// Load a level and drive it through a [`FrameLoop`] at exactly one tick per
/// frame until `ticks` ticks have run, presenting every frame.
pub fn simulate(
    map: Option<&Path>,
    config: Option<&Path>,
    seed: Option<u64>,
    ticks: u64,
    script: &Script,
) -> Result<Session, String> {
    let index = super::load_map(map)?;
    let mut config = super::load_config(config)?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut frame_loop = FrameLoop::new(config.frame_loop.clone());
    let mut sim = Simulation::new(config);
    sim.load_level(index);
    let mut tally = FrameTally::default();

    frame_loop.start(0.0);
    let mut frame: u64 = 0;
    while sim.current_tick() < ticks {
        frame += 1;
        let intent = script.intent_at(sim.current_tick());
        let report = frame_loop
            .frame(&mut sim, frame as f64 * TIC_SECONDS, &intent)
            .map_err(|e| format!("simulation error: {e}"))?;
        if report.ticks > 0 {
            present_frame(&sim, &mut tally).map_err(|e| format!("presentation error: {e}"))?;
        }
    }
    frame_loop.stop();

    Ok(Session {
        sim,
        frame_loop,
        tally,
    })
}

pub fn run(
    map: Option<&Path>,
    config: Option<&Path>,
    ticks: u64,
    seed: Option<u64>,
    script: &Script,
    verbose: bool,
) -> Result<(), String> {
    let Session {
        sim,
        frame_loop,
        tally,
    } = simulate(map, config, seed, ticks, script)?;
    let level = sim.level().ok_or("no level loaded")?;

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        level.map().name(),
        format!(
            "({ticks} ticks, seed={}, {:.1}s)",
            sim.config().seed,
            sim.clock().time()
        )
        .dimmed()
    );
    println!(
        "  {} events logged, {} frames presented at {:.0} fps",
        sim.events().len(),
        tally.frames,
        frame_loop.fps()
    );
    if tally.frames > 0 {
        println!(
            "  Last frame: {} walls, {} sprites {}",
            tally.walls,
            tally.sprites,
            format!(
                "(avg {:.1} walls)",
                tally.total_walls as f64 / tally.frames as f64
            )
            .dimmed()
        );
    }
    println!();

    // Events
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    SimEventKind::ThingKilled { .. }
                        | SimEventKind::PlayerKilled { .. }
                        | SimEventKind::Locked { .. }
                        | SimEventKind::LineActivated { .. }
                )
            })
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                let label = match event.kind {
                    SimEventKind::ThingKilled { .. } => "KILL".red().bold(),
                    SimEventKind::PlayerKilled { .. } => "DEATH".red().bold(),
                    SimEventKind::Locked { .. } => "LOCKED".yellow().bold(),
                    _ => "LINE".cyan().bold(),
                };
                println!("  {label}  {}", event.description);
            }
            println!();
        }
    }

    // Player
    let player = level.player();
    println!("  {}", "Player".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Health", "Armor", "Weapon", "Ammo", "Keys", "Position", "Sector",
    ]);
    let ammo = player
        .inventory
        .ready
        .info()
        .ammo
        .map_or_else(|| "--".to_string(), |a| player.inventory.ammo(a).to_string());
    let health = if player.alive {
        player.health.to_string()
    } else {
        format!("{} (dead)", player.health)
    };
    table.add_row(vec![
        health,
        player.armor.to_string(),
        player.inventory.ready.info().name.to_string(),
        ammo,
        player.inventory.keys.to_string(),
        format!("({:.1}, {:.1})", player.position.x, player.position.y),
        super::sector_cell(player.sector),
    ]);
    println!("{table}");
    println!();

    // Things
    println!("  {}", "Things".bold().underline());
    println!();
    if level.things().is_empty() {
        println!("  {}", "(none left)".dimmed());
        return Ok(());
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind", "State", "Health", "Position", "Sector"]);
    for thing in level.things().iter() {
        let state = match thing.state {
            ThingState::Dead => "dead".red().to_string(),
            ThingState::Chase => "chase".yellow().to_string(),
            ThingState::Melee => "melee".red().bold().to_string(),
            ThingState::Idle => "idle".dimmed().to_string(),
        };
        table.add_row(vec![
            thing.id.to_string(),
            thing.kind.label(),
            state,
            thing.health.to_string(),
            format!("({:.1}, {:.1})", thing.position.x, thing.position.y),
            super::sector_cell(thing.sector),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn colorize_event(kind: &SimEventKind, desc: &str) -> String {
    match kind {
        SimEventKind::ThingKilled { .. } | SimEventKind::PlayerKilled { .. } => {
            desc.red().bold().to_string()
        }
        SimEventKind::PlayerDamaged { .. } | SimEventKind::ThingDamaged { .. } => {
            desc.red().to_string()
        }
        SimEventKind::Locked { .. } | SimEventKind::MonsterWoke { .. } => desc.yellow().to_string(),
        SimEventKind::ItemPickedUp { .. } => desc.green().to_string(),
        SimEventKind::LineActivated { .. }
        | SimEventKind::SectorActionStarted { .. }
        | SimEventKind::SectorActionReversed { .. }
        | SimEventKind::SectorActionFinished { .. } => desc.cyan().to_string(),
        SimEventKind::WeaponFired { .. } => desc.dimmed().to_string(),
    }
}
