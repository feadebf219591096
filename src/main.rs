//! CLI entry point: evaluate one attacker against a defender table

use clap::{ArgAction, Parser, ValueEnum};
use dice_odds::config::ScenarioConfig;
use dice_odds::roster::evaluate_roster;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dice-odds")]
#[command(version)]
#[command(about = "Expected casualties of a weapon profile against a defender table", long_about = None)]
struct Args {
    /// Path to the scenario file (YAML or JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Only evaluate this defender
    #[arg(short, long)]
    defender: Option<String>,

    /// Evaluate defenders in parallel
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,

    /// Log more (-v info, -vv debug with per-stage expectations, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Load scenario
    let config = match ScenarioConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(
        path = %args.config.display(),
        defenders = config.defenders.len(),
        "scenario loaded"
    );

    // Pick defenders
    let defenders = match &args.defender {
        Some(name) => match config.only(name) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => config.defenders.clone(),
    };

    // Run resolutions
    let start = Instant::now();
    let reports = match evaluate_roster(&config.attacker, &defenders, args.parallel) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    // Output results
    match args.output {
        OutputFormat::Text => {
            println!("=== Expected Casualties ===");
            println!("Attacker: {} models, A{}, BS{}+, S{}, AP-{}, D{}",
                config.attacker.model_count,
                config.attacker.attacks,
                config.attacker.hit_threshold,
                config.attacker.strength,
                config.attacker.armor_penetration,
                config.attacker.damage,
            );
            println!();
            println!("{:<24} {:>8} {:>10}", "Defender", "Dead", "HP lost");
            for report in &reports {
                println!(
                    "{:<24} {:>8.2} {:>10.2}",
                    report.defender, report.average_models_lost, report.average_health_lost
                );
            }

            if args.timing {
                println!();
                println!("--- Performance ---");
                println!("Total time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "attacker": config.attacker,
                "parallel": args.parallel,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "reports": reports,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Failed to serialize results: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
