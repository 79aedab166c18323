//! Theater booking CLI.
//!
//! Commands:
//! - run: Book seats for every customer in an input file, concurrently
//! - generate: Write a random contended booking workload

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use booking_kernel::{BookingConfig, BookingEvent, BookingKernel, GridConfig};
use theater_booking::generator::{WorkloadConfig, WorkloadGenerator};
use theater_booking::input::{InputLimits, load_bookings};
use theater_booking::layout::Layout;
use theater_booking::report::{RunReport, format_elapsed};

#[derive(Parser)]
#[command(name = "theater-booking")]
#[command(version)]
#[command(about = "Concurrent theater seat booking")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Book seats for every customer in an input file
    Run {
        /// Booking requests, one attempt per line
        input: PathBuf,

        /// JSON configuration file (flags below override it)
        #[arg(long, env = "THEATER_BOOKING_CONFIG")]
        config: Option<PathBuf>,

        /// Number of aisles
        #[arg(long)]
        aisles: Option<usize>,

        /// Seats in each aisle
        #[arg(long)]
        seats_per_aisle: Option<usize>,

        /// Minimum simulated hold per successful acquisition (ms)
        #[arg(long)]
        hold_min_ms: Option<u64>,

        /// Maximum simulated hold per successful acquisition (ms)
        #[arg(long)]
        hold_max_ms: Option<u64>,

        /// Random seed for hold durations
        #[arg(long)]
        seed: Option<u64>,

        /// Save a JSON run report (timestamp is added to the file name)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print only the event log and layout
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate a random booking workload
    Generate {
        /// Number of customers
        #[arg(long, default_value = "10")]
        customers: usize,

        /// Maximum attempts per customer
        #[arg(long, default_value = "3")]
        max_attempts: usize,

        /// Maximum seats per attempt
        #[arg(long, default_value = "3")]
        max_seats: usize,

        /// Number of aisles
        #[arg(long, default_value = "5")]
        aisles: usize,

        /// Seats in each aisle
        #[arg(long, default_value = "12")]
        seats_per_aisle: usize,

        /// Probability that an attempt targets the front seats
        #[arg(long, default_value = "0.5", value_parser = parse_probability)]
        contention: f64,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            input,
            config,
            aisles,
            seats_per_aisle,
            hold_min_ms,
            hold_max_ms,
            seed,
            output,
            quiet,
        } => {
            let mut booking_config = match &config {
                Some(path) => BookingConfig::load(path)
                    .with_context(|| format!("Loading config {}", path.display()))?,
                None => BookingConfig::default(),
            };
            if let Some(aisles) = aisles {
                booking_config.grid.aisles = aisles;
            }
            if let Some(seats) = seats_per_aisle {
                booking_config.grid.seats_per_aisle = seats;
            }
            if let Some(ms) = hold_min_ms {
                booking_config.hold.min_ms = ms;
            }
            if let Some(ms) = hold_max_ms {
                booking_config.hold.max_ms = ms;
            }
            if seed.is_some() {
                booking_config.seed = seed;
            }
            booking_config.validate()?;

            let customers = load_bookings(&input, &InputLimits::default())?;
            let kernel = BookingKernel::new(booking_config.clone())?;

            let printer = tokio::spawn(print_events(kernel.sink().subscribe()));

            let started_at = Utc::now();
            let outcome = kernel.run(customers).await?;
            kernel.sink().unsubscribe();
            printer.await?;

            println!();
            print!("{}", Layout(&outcome.snapshot));

            let report = RunReport::new(booking_config, Some(input), started_at, outcome);

            if !quiet {
                println!();
                println!("{}", report.summary);
                println!("Elapsed: {}", format_elapsed(report.elapsed()));
            }

            if let Some(output) = output {
                let path = report.output_path(&output);
                report.save(&path)?;
                info!(path = %path.display(), run_id = %report.run_id, "Saved run report");
            }
        }

        Commands::Generate {
            customers,
            max_attempts,
            max_seats,
            aisles,
            seats_per_aisle,
            contention,
            seed,
            out,
        } => {
            let config = WorkloadConfig {
                customers,
                max_attempts,
                max_seats,
                grid: GridConfig {
                    aisles,
                    seats_per_aisle,
                },
                contention,
            };
            let text = WorkloadGenerator::new(config, seed).generate();

            match out {
                Some(path) => {
                    std::fs::write(&path, &text)
                        .with_context(|| format!("Writing workload {}", path.display()))?;
                    info!(path = %path.display(), customers, "Wrote booking workload");
                }
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}

/// Print event lines as the sink appends them.
fn parse_probability(arg: &str) -> Result<f64, String> {
    let value: f64 = arg.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not a probability between 0 and 1"))
    }
}

async fn print_events(mut events: mpsc::UnboundedReceiver<BookingEvent>) {
    while let Some(event) = events.recv().await {
        println!("{}", event);
    }
}
