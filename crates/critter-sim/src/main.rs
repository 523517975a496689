//! Headless driver for the critter engine
//!
//! Builds a small arena, lets its creatures act for a number of turns and
//! prints what happened.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use critter_core::creature::{CreatureSize, FactionId, MoverFlags};
use critter_core::map::DistanceMode;
use critter_core::special::{GunAttack, LeapAttack, MeleeAttack, RangeBand, Targeting};
use critter_core::{
    Creature, EngineOptions, EngineResult, Map, Simulation, TickResult, Tripoint, World,
    WorldEvent,
};

/// Run creatures around an arena without a display
#[derive(Parser, Debug)]
#[command(name = "critter-sim")]
#[command(author, version, about = "Watch creatures hunt, flee and shoot", long_about = None)]
struct Args {
    /// Engine options (JSON); defaults to the user config directory
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of turns to run
    #[arg(short = 't', long = "ticks", default_value_t = 50)]
    ticks: u64,

    /// RNG seed, overriding the config
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Distance metric (Roguelike or Trigonometric)
    #[arg(short = 'd', long = "distance")]
    distance: Option<String>,

    /// Print the effective options as JSON and exit
    #[arg(long = "dump-config")]
    dump_config: bool,

    /// Print every logged event
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

const ARENA: &[&str] = &[
    "########################",
    "#......................#",
    "#..####.......~~~......#",
    "#..#..+.......~~~...^..#",
    "#..####................#",
    "#..........RRR.........#",
    "#......................#",
    "########################",
];

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let options = match load_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("critter-sim: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.dump_config {
        println!("{}", options.to_config_string());
        return ExitCode::SUCCESS;
    }

    let world = match build_arena(options) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("critter-sim: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut sim = Simulation::new(world);
    let result = sim.run(args.ticks);
    print_summary(&sim, result, args.verbose);
    ExitCode::SUCCESS
}

/// Default config location
fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("critter-sim");
    path.push("options.json");
    path
}

fn parse_distance(name: &str) -> Option<DistanceMode> {
    DistanceMode::iter().find(|m| m.to_string().eq_ignore_ascii_case(name))
}

fn load_options(args: &Args) -> EngineResult<EngineOptions> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    let mut options = if path.exists() {
        tracing::info!(path = %path.display(), "loading options");
        EngineOptions::load_from_file(&path)?
    } else if args.config.is_some() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
        .into());
    } else {
        EngineOptions::default()
    };

    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(name) = &args.distance {
        let Some(mode) = parse_distance(name) else {
            let known: Vec<String> = DistanceMode::iter().map(|m| m.to_string()).collect();
            return Err(critter_core::EngineError::InvalidConfig(format!(
                "unknown distance mode '{name}' (expected one of {})",
                known.join(", ")
            )));
        };
        options.distance_mode = mode;
        options.path.mode = mode;
    }
    Ok(options)
}

/// An arena with the avatar, a few hostiles and a friendly turret
fn build_arena(options: EngineOptions) -> EngineResult<World> {
    let mut world = World::new(Map::from_ascii(ARENA), options);

    world.abilities.register(MeleeAttack::bite("bite", 10))?;
    world.abilities.register(MeleeAttack::new("grab").with_grab(true))?;
    world.abilities.register(LeapAttack::new("pounce", 4.0))?;
    world.abilities.register(
        GunAttack::new("turret_smg")
            .with_ammo("9mm")
            .with_ranges(vec![RangeBand::new(1, 5, 3), RangeBand::new(6, 12, 1)])
            .with_targeting(Targeting::default()),
    )?;

    let spawn = |world: &mut World, c: Creature| {
        let pos = c.pos;
        world
            .spawn(c)
            .ok_or(critter_core::EngineError::OutOfBounds(pos))
    };

    let mut you = Creature::avatar(Tripoint::new(2, 1, 0));
    you.hp = 60;
    you.hp_max = 60;
    spawn(&mut world, you)?;

    let mut turret = Creature::new("turret", Tripoint::new(4, 6, 0)).with_flags(MoverFlags::IMMOBILE);
    turret.friendly = -1;
    turret.faction = FactionId::PLAYER;
    turret.ammo.insert("9mm".into(), 40);
    spawn(&mut world, turret.with_special("turret_smg"))?;

    for x in [18, 20] {
        let zombie = Creature::new("zombie", Tripoint::new(x, 6, 0))
            .with_flags(MoverFlags::SMELLS | MoverFlags::GROUP_BASH)
            .with_special("bite");
        spawn(&mut world, zombie)?;
    }

    let mut brute = Creature::new("zombie brute", Tripoint::new(21, 1, 0))
        .with_flags(MoverFlags::PUSH_MON | MoverFlags::DESTROYS)
        .with_special("grab");
    brute.size = CreatureSize::Large;
    brute.hp = 40;
    brute.hp_max = 40;
    brute.bash_skill = 20;
    spawn(&mut world, brute)?;

    let mut cat = Creature::new("feral cat", Tripoint::new(16, 3, 0))
        .with_flags(MoverFlags::HIT_AND_RUN | MoverFlags::ANIMAL)
        .with_special("pounce");
    cat.size = CreatureSize::Small;
    cat.speed = 130;
    spawn(&mut world, cat)?;

    let mut mole = Creature::new("mole", Tripoint::new(12, 6, 0)).with_flags(MoverFlags::DIGS);
    mole.faction = FactionId::ANIMAL;
    mole.size = CreatureSize::Tiny;
    spawn(&mut world, mole)?;

    Ok(world)
}

fn print_summary(sim: &Simulation, result: TickResult, verbose: bool) {
    let world = sim.world();
    if verbose {
        for entry in world.events.entries() {
            println!("[{:>4}] {:?}", entry.turn, entry.event);
        }
    }

    let (mut moves, mut attacks, mut hits, mut abilities, mut deaths) = (0, 0, 0, 0, 0);
    for event in world.events.iter() {
        match event {
            WorldEvent::Moved { .. } => moves += 1,
            WorldEvent::Attacked { hit, .. } => {
                attacks += 1;
                if *hit {
                    hits += 1;
                }
            }
            WorldEvent::AbilityUsed { .. } => abilities += 1,
            WorldEvent::Died { .. } => deaths += 1,
            _ => {}
        }
    }

    println!("turns run:  {}", world.turn);
    println!("events:     {}", world.events.len());
    println!("moves:      {moves}");
    println!("attacks:    {attacks} ({hits} hit)");
    println!("abilities:  {abilities}");
    println!("deaths:     {deaths}");
    if result == TickResult::AvatarGone {
        println!("the avatar did not survive");
    }
    println!();
    println!("survivors:");
    for c in world.creatures.iter() {
        println!("  {:<14} hp {:>3}/{:<3} at {}", c.name, c.hp.max(0), c.hp_max, c.pos);
    }
}
