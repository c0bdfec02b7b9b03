// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing rounds and sampling paths
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use frontline_engine::config::{PathStrategy, RoundConfig, TeamConfig};
use frontline_engine::path::generate_walk;
use frontline_engine::phase::UiBroadcaster;
use frontline_engine::round::{setup_round, ObjectiveDeficitBleed};
use frontline_engine::types::{CancelToken, Team, TeamRole};
use frontline_engine::zones::{Zone, ZoneGraph};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "frontline-runner", about = "Round orchestrator demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single round from staging through action
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Zone graph JSON file (falls back to the built-in demo map)
        #[arg(short, long)]
        graph: Option<PathBuf>,
        /// Round config JSON file (falls back to a demo config)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Sample graph-walk paths and print their distribution
    Paths {
        #[arg(short = 'n', long, default_value_t = 1000)]
        samples: u64,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long)]
        graph: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { seed, graph, config } => cmd_play(seed, graph, config),
        Commands::Paths { samples, seed, graph } => cmd_paths(samples, seed, graph),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── Demo data ──────────────────────────────────────────────────────────

/// Small branching map used when no graph file is given.
fn demo_graph() -> ZoneGraph {
    ZoneGraph::new(vec![
        Zone::main_base("North Base", "north", &[("Farm", 3.0), ("Quarry", 1.0)]),
        Zone::objective("Farm", &[("Village", 2.0), ("Quarry", 1.0)]),
        Zone::objective("Quarry", &[("Village", 1.0), ("Depot", 2.0)]),
        Zone::objective("Village", &[("Depot", 1.0), ("South Base", 1.0)]),
        Zone::objective("Depot", &[("South Base", 1.0)]),
        Zone::main_base("South Base", "south", &[]),
    ])
    .expect("demo graph is valid")
}

fn demo_config() -> RoundConfig {
    RoundConfig {
        teams: [
            TeamConfig::new("north", TeamRole::Random),
            TeamConfig::new("south", TeamRole::Random),
        ],
        path: PathStrategy::GraphWalk,
        staging_seconds: Some(5),
        starting_tickets: 300,
    }
}

fn load_graph(path: Option<PathBuf>) -> Result<ZoneGraph, String> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(&p)
                .map_err(|e| format!("cannot read {}: {e}", p.display()))?;
            ZoneGraph::from_json(&json).map_err(|e| e.to_string())
        }
        None => Ok(demo_graph()),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RoundConfig, String> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(&p)
                .map_err(|e| format!("cannot read {}: {e}", p.display()))?;
            RoundConfig::from_json(&json).map_err(|e| e.to_string())
        }
        None => Ok(demo_config()),
    }
}

// ── Console UI ─────────────────────────────────────────────────────────

struct ConsoleUi;

impl UiBroadcaster for ConsoleUi {
    fn show_countdown(&mut self, team: &Team, message: &str, remaining_secs: u64) {
        println!("  [{team}] {message} {remaining_secs}s");
    }
    fn show_message(&mut self, team: &Team, message: &str) {
        println!("  [{team}] {message}");
    }
    fn clear_ui(&mut self, team: &Team) {
        println!("  [{team}] (ui cleared)");
    }
}

// ── Commands ───────────────────────────────────────────────────────────

fn cmd_play(seed: u64, graph: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), String> {
    let graph = load_graph(graph)?;
    let config = load_config(config)?;
    let cancel = CancelToken::new();

    println!("=== Frontline round: seed={seed} ===\n");
    let mut round = setup_round(&config, &graph, seed, &cancel).map_err(|e| e.to_string())?;

    let [team_a, team_b] = round.roles().teams().clone();
    println!("Teams:");
    for team in [&team_a, &team_b] {
        println!("  {team} -- role: {}", round.roles().role_of(team.id));
    }
    println!("Objective path: {}\n", round.path());

    let mut ui = ConsoleUi;
    round.begin(&mut ui).map_err(|e| e.to_string())?;

    // Drive staging with one-second ticks until action begins. A
    // staging phase without a duration never auto-advances, so push it.
    println!("-- staging --");
    if config.staging_seconds.is_none() {
        round.advance_phase(&mut ui).map_err(|e| e.to_string())?;
    }
    while round
        .current_phase()
        .is_some_and(|p| p.display_name.as_deref() == Some("Staging"))
    {
        round.tick(1.0, &mut ui).map_err(|e| e.to_string())?;
    }

    // Scripted action phase: the attacker (or team 1) rolls up the
    // objectives; the other side bleeds until its tickets run out.
    println!("\n-- action --");
    let capturing = round.roles().attacker().cloned().unwrap_or_else(|_| team_a.clone());
    let bleeding = if capturing.id == team_a.id { team_b.clone() } else { team_a.clone() };
    let objective_count = round.path().objectives().len();
    let bleed_model = ObjectiveDeficitBleed;

    for i in 0..objective_count {
        round
            .objective_captured(&capturing, 20)
            .map_err(|e| e.to_string())?;
        println!(
            "  {capturing} took objective {}/{objective_count}; {bleeding} bleed: {:?}",
            i + 1,
            round.bleed_severity(&bleeding, &bleed_model)
        );
    }

    let mut minute = 0u32;
    while round.round_over().is_none() {
        minute += 1;
        round
            .tracker_mut()
            .increment_tickets(&bleeding, -30)
            .map_err(|e| e.to_string())?;
        round.tick(60.0, &mut ui).map_err(|e| e.to_string())?;
    }

    println!("\nTicket events:");
    for event in round.tracker_mut().drain_events() {
        println!(
            "  {} tickets -> {} (change {})",
            event.team, event.new_number, event.change
        );
    }

    let winner = round.round_over().expect("loop exited on round over");
    println!("\nRound over after {minute} bleed minutes. Winner: {winner}");
    Ok(())
}

fn cmd_paths(samples: u64, seed: u64, graph: Option<PathBuf>) -> Result<(), String> {
    let graph = load_graph(graph)?;
    let cancel = CancelToken::new();

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut failures = 0u64;
    for i in 0..samples {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i));
        match generate_walk(&graph, &mut rng, &cancel) {
            Ok(path) => *counts.entry(path.to_string()).or_insert(0) += 1,
            Err(_) => failures += 1,
        }
    }

    println!("=== {samples} sampled paths ({failures} failures) ===\n");
    let mut rows: Vec<(String, u64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    for (route, n) in rows {
        let pct = n as f64 / samples as f64 * 100.0;
        println!("  {n:>6} ({pct:>5.1}%)  {route}");
    }
    Ok(())
}
