use env_logger::Env;
use hadron_runner::{RunnerConfig, SimulationRunner};

fn print_help() {
    eprintln!(
        r#"Hadron Sim - drive the time engine for a fixed span of simulated time

USAGE:
    hadron-sim [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    HADRON_MODE         virtual | real (default: virtual)
    HADRON_TICKS        Ticks to simulate (default: 100)
    HADRON_STEP         Ticks per advancement in virtual mode (default: 1)
    RUST_LOG            Log level filter

EXAMPLES:
    # Run with defaults
    hadron-sim

    # Run with config file
    hadron-sim --config sim.json

    # Two seconds of wall-clock time
    HADRON_MODE=real HADRON_TICKS=2000 hadron-sim
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            log::info!("Loading configuration from: {}", path);
            RunnerConfig::from_file(&path)?
        }
        None => {
            log::info!("Using default configuration");
            RunnerConfig::default()
        }
    };
    config.apply_env()?;

    let runner = SimulationRunner::new(config)?;
    let report = runner.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
