//! Debug script to print every stage of the resolution for a scenario
//!
//! Usage: debug_stages <scenario.yaml> [defender]

use dice_odds::config::ScenarioConfig;
use dice_odds::pipeline::{trace, ResolutionPlan, ResolutionState};
use std::env;
use tracing_subscriber::EnvFilter;

fn print_state(label: &str, state: &ResolutionState) {
    println!(
        "  {:<8} dice: {:>8.3}  crits: {:>7.3}  auto-wound: {:>7.3}  auto-fail: {:>7.3}  non-crit: {:>8.3}",
        label,
        state.dice,
        state.criticals,
        state.auto_wounds,
        state.auto_failed_saves,
        state.non_critical
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <scenario.yaml> [defender]", args[0]);
        std::process::exit(2);
    }

    let config = match ScenarioConfig::from_file(&args[1]) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            std::process::exit(1);
        }
    };

    let defenders = match args.get(2) {
        Some(name) => match config.only(name) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => config.defenders.clone(),
    };

    for (name, defender) in &defenders {
        let plan = ResolutionPlan::new(&config.attacker, defender);
        println!("\n=== {} ===", name);
        println!(
            "  hit {}+ (crit {}+)  wound {}+ (crit {}+)  save {}+  fnp {}+  W{}",
            plan.hit_threshold,
            plan.critical_hit,
            plan.wound_threshold,
            plan.critical_wound,
            plan.save,
            plan.feel_no_pain,
            defender.wounds
        );
        println!(
            "  torrent: {}  rr hit 1s/all: {}/{}  rr wound 1s/all: {}/{}  fish hits/wounds: {}/{}",
            plan.torrent,
            plan.reroll_hit_ones,
            plan.reroll_hit_all,
            plan.reroll_wound_ones,
            plan.reroll_wound_all,
            plan.fish_hits,
            plan.fish_wounds
        );

        match trace(&config.attacker, defender) {
            Ok(stages) => {
                print_state("attacks", &stages.attacks);
                print_state("hits", &stages.hits);
                print_state("wounds", &stages.wounds);
                print_state("saves", &stages.saves);
                println!("  damage per failed save: {:.3}", stages.damage_per_failed_save);
                println!(
                    "  destroyed: {}  remaining health: {:.3}/{}  models lost: {:.2}  health lost: {:.2}",
                    stages.result.average_models_destroyed,
                    stages.result.average_remaining_health,
                    defender.wounds,
                    stages.result.average_total_models_lost(defender.wounds as f64),
                    stages.result.average_health_lost(defender.wounds as f64)
                );
            }
            Err(e) => println!("  error: {}", e),
        }
    }
}
