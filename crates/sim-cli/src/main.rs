use std::env;
use std::fs;

use contracts::{Cmp, Condition, SimConfig, TickRule, VerbDef, VerbEffect};
use sim_core::{Portal, Simulation, World, WorldError};

const DEMO_SCRIPT: &[&str] = &[
    "look",
    "toggle stove",
    "open cupboard",
    "open window",
    "heat kettle",
    "heat kettle",
    "heat kettle",
    "heat kettle",
    "pour kettle",
    "nibble jar",
    "look",
];

fn print_usage() {
    println!("sim-cli <command>");
    println!("commands:");
    println!("  demo [steps]");
    println!("    runs the built-in kitchen scenario (default: whole script)");
    println!("  script <file>");
    println!("    feeds one action label per line to the kitchen scenario");
    println!("  actions");
    println!("    prints the kitchen scenario's initial action catalog");
    println!("  snapshot");
    println!("    prints the kitchen scenario's initial world snapshot as JSON");
}

fn parse_steps(value: Option<&String>, fallback: usize) -> Result<usize, String> {
    let Some(raw) = value else {
        return Ok(fallback);
    };
    raw.parse::<usize>()
        .map_err(|_| format!("invalid steps: {raw}"))
}

/// Scenario setup is the external collaborator's job; the CLI plays that
/// role with a fixed kitchen world.
fn build_kitchen() -> Result<Simulation, WorldError> {
    let mut world = World::new("kitchen");

    let stove = world.spawn_in(world.root(), "stove")?;
    world.entity_mut(stove)?.set_property("lit", false);

    let kettle = world.spawn_in(stove, "kettle")?;
    {
        let entity = world.entity_mut(kettle)?;
        entity.set_property("temp", 20_i64);
        entity.set_property("cups", 0_i64);
        // Cools toward room temperature every step, boils past 100.
        entity.tick_rules.push(TickRule::Adjust {
            key: "temp".to_string(),
            delta: -1.0,
            min: Some(20.0),
            max: None,
        });
        entity.tick_rules.push(TickRule::SetWhen {
            key: "temp".to_string(),
            cmp: Cmp::Ge,
            threshold: 100.0,
            set_key: "boiling".to_string(),
            set_value: true.into(),
        });
    }

    let cupboard = world.spawn_in(world.root(), "cupboard")?;
    world.entity_mut(cupboard)?.portal = Some(Portal::closed());
    let jar = world.spawn_in(cupboard, "jar")?;
    world.entity_mut(jar)?.set_property("cookies", 3_i64);

    let window = world.spawn_in(world.root(), "window")?;
    world.entity_mut(window)?.portal = Some(Portal::sealed());

    let verbs = vec![
        VerbDef::new(
            "heat",
            VerbEffect::Adjust {
                key: "temp".to_string(),
                delta: 25.0,
            },
        ),
        VerbDef::new(
            "toggle",
            VerbEffect::Toggle {
                key: "lit".to_string(),
            },
        ),
        VerbDef::new("open", VerbEffect::Open),
        VerbDef::new("close", VerbEffect::Close),
        VerbDef::new(
            "pour",
            VerbEffect::Adjust {
                key: "cups".to_string(),
                delta: 1.0,
            },
        )
        .with_requires(Condition::new("boiling", Cmp::Eq, true)),
        VerbDef::new(
            "nibble",
            VerbEffect::Adjust {
                key: "cookies".to_string(),
                delta: -1.0,
            },
        ),
    ];

    Ok(Simulation::new(SimConfig::default(), world, verbs))
}

fn kitchen_simulation() -> Result<Simulation, String> {
    build_kitchen().map_err(|err| format!("failed to build demo world: {err}"))
}

fn run_demo(args: &[String]) -> Result<(), String> {
    let steps = parse_steps(args.get(2), DEMO_SCRIPT.len())?;
    let mut sim = kitchen_simulation()?;

    println!("{}", sim.observation());
    println!();
    for label in DEMO_SCRIPT.iter().take(steps) {
        println!("> {label}");
        println!("{}", sim.step(label));
    }
    println!();
    println!("actions after tick {}:", sim.tick());
    for label in sim.current_actions() {
        println!("  {label}");
    }
    println!();
    println!("transcript:");
    for record in sim.records() {
        println!("  {record}");
    }
    Ok(())
}

fn run_script(args: &[String]) -> Result<(), String> {
    let path = args.get(2).ok_or_else(|| "missing script file".to_string())?;
    let script = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
    let labels = script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let mut sim = kitchen_simulation()?;
    for observation in sim.run(&labels) {
        println!("{observation}");
    }
    Ok(())
}

fn list_actions() -> Result<(), String> {
    let sim = kitchen_simulation()?;
    for label in sim.current_actions() {
        println!("{label}");
    }
    Ok(())
}

fn print_snapshot() -> Result<(), String> {
    let sim = kitchen_simulation()?;
    let rendered = serde_json::to_string_pretty(&sim.snapshot())
        .map_err(|err| format!("failed to render snapshot: {err}"))?;
    println!("{rendered}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("demo") => run_demo(&args),
        Some("script") => run_script(&args),
        Some("actions") => list_actions(),
        Some("snapshot") => print_snapshot(),
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}
