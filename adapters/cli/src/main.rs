#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter for Rootbound.
//!
//! Loads optional settings from TOML, replays a scripted move sequence against
//! a fresh world and prints the event log followed by an ASCII frame of the
//! rows around the player.

mod frame;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rootbound_core::{config::WorldConfig, Command, Direction, Event};
use rootbound_system_flower::{Flower, FlowerTuning};
use rootbound_world::{self as world, query, World};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rootbound")]
#[command(about = "Replay a scripted Rootbound session and print the final frame")]
struct Args {
    /// World seed; overrides the seed from the settings file
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with optional `[world]` and `[flower]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Moves to replay: w/a/s/d spread up/left/down/right, r retreats, . idles
    #[arg(short, long, default_value = "")]
    moves: String,

    /// Rows printed above and below the player (defaults to the view height)
    #[arg(long)]
    rows: Option<u32>,

    /// Print every event, not only the notable ones
    #[arg(short, long)]
    verbose: bool,
}

/// Settings file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    world: WorldConfig,
    flower: FlowerTuning,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    run(&args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.world.seed = seed;
    }
    let commands = parse_moves(&args.moves)?;
    let half_height = args.rows.unwrap_or(settings.world.view_half_height);

    let mut world = World::new(settings.world, Box::new(Flower::new(settings.flower)))
        .context("invalid world configuration")?;
    println!("{}", query::welcome_banner(&world));

    let mut events = Vec::new();
    for command in commands {
        debug!(?command, "applying command");
        world::apply(&mut world, command, &mut events);
    }

    for event in &events {
        match describe(event) {
            Some(line) => println!("{line}"),
            None if args.verbose => println!("{event:?}"),
            None => {}
        }
    }

    print!("{}", frame::render(&world, half_height));
    println!("{}", status_line(&world));
    info!(tick = query::tick(&world), events = events.len(), "session finished");
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse settings in {}", path.display()))
}

fn parse_moves(script: &str) -> Result<Vec<Command>> {
    script
        .chars()
        .filter(|symbol| !symbol.is_whitespace())
        .map(|symbol| match symbol.to_ascii_lowercase() {
            'w' => Ok(spread(Direction::Up)),
            'a' => Ok(spread(Direction::Left)),
            's' => Ok(spread(Direction::Down)),
            'd' => Ok(spread(Direction::Right)),
            'r' => Ok(Command::Retreat),
            '.' => Ok(Command::Idle),
            other => Err(anyhow!("unknown move {other:?}; expected one of w a s d r .")),
        })
        .collect()
}

const fn spread(direction: Direction) -> Command {
    Command::Spread { direction }
}

/// Human readable line for events worth showing without `--verbose`.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::Audio { cue } => format!("audio: {}", cue.name()),
        Event::PlayerMoved { from, to } => format!("player {from} -> {to}"),
        Event::SpreadRejected { direction, reason } => {
            format!("spread {direction:?} rejected: {reason}")
        }
        Event::RetreatRejected => "retreat rejected".to_owned(),
        Event::PlacementRejected {
            kind,
            origin,
            reason,
        } => format!("{kind:?} at {origin} rejected: {reason}"),
        Event::NourishmentChanged {
            delta,
            total,
            source,
        } => format!("nourishment {delta:+.1} from {source:?}, now {total:.1}"),
        Event::EnemyDied { entity, cause } => format!("{entity:?} died ({cause:?})"),
        Event::FluidLost { coord, amount } => format!("{amount:.2} water lost at {coord}"),
        Event::Victory => "the flower is in full bloom".to_owned(),
        Event::GameOver => "the flower withered".to_owned(),
        _ => return None,
    };
    Some(line)
}

fn status_line(world: &World) -> String {
    let state = if query::has_won(world) {
        "won"
    } else if query::is_game_over(world) {
        "game over"
    } else {
        "growing"
    };
    format!(
        "tick {} | nourishment {:.1} | {state}",
        query::tick(world),
        query::nourishment(world)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootbound_core::AudioCue;

    #[test]
    fn moves_map_to_commands() {
        let commands = parse_moves("sD r.").expect("valid script");
        assert_eq!(
            commands,
            vec![
                spread(Direction::Down),
                spread(Direction::Right),
                Command::Retreat,
                Command::Idle,
            ]
        );
    }

    #[test]
    fn unknown_moves_are_rejected() {
        let error = parse_moves("sx").expect_err("x is not a move");
        assert!(error.to_string().contains("'x'"));
    }

    #[test]
    fn settings_fill_missing_tables_with_defaults() {
        let settings: Settings = toml::from_str(
            "[world]\nseed = 42\n\n[flower]\nstarting_nourishment = 50.0\n",
        )
        .expect("valid toml");
        assert_eq!(settings.world.seed, 42);
        assert_eq!(settings.world.map_width, WorldConfig::default().map_width);
        assert_eq!(settings.flower.starting_nourishment, 50.0);
    }

    #[test]
    fn missing_settings_file_names_the_path() {
        let error = load_settings(Some(Path::new("/nonexistent/rootbound.toml")))
            .expect_err("file does not exist");
        assert!(error.to_string().contains("/nonexistent/rootbound.toml"));
    }

    #[test]
    fn audio_cues_use_their_names() {
        let line = describe(&Event::Audio { cue: AudioCue::Hit });
        assert_eq!(line.as_deref(), Some("audio: hit"));
        assert_eq!(describe(&Event::TimeAdvanced { tick: 3 }), None);
    }
}
