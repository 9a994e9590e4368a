//! Looped SOS IIR verification tool
//!
//! Usage:
//!   sos-verify run [--type lowpass] [--order 4] [--stimulus sine:1000:0.25] [--json]
//!   sos-verify widths [--order 8] [--data-width 24]

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use sos_core::{FilterConfig, FilterType};
use sos_verify::{ReportFormat, Stimulus, VerifyConfig, VerifyRunner};

#[derive(Parser)]
#[command(name = "sos-verify", about = "Looped SOS IIR verification harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Filter type (lowpass, highpass)
    #[arg(short = 't', long = "type", default_value = "lowpass")]
    filter_type: FilterType,

    /// Filter order (even)
    #[arg(short, long, default_value_t = 4)]
    order: u32,

    /// Data width in bits
    #[arg(short, long, default_value_t = 16)]
    data_width: u32,

    /// Coefficient width in bits
    #[arg(short, long, default_value_t = 16)]
    coefficient_width: u32,

    /// Guard bits on the section state
    #[arg(long, default_value_t = 4)]
    overhead_bits: u32,
}

impl FilterArgs {
    fn config(&self) -> FilterConfig {
        FilterConfig::default()
            .with_filter_type(self.filter_type)
            .with_order(self.order)
            .with_data_width(self.data_width)
            .with_coefficient_width(self.coefficient_width)
            .with_overhead_bits(self.overhead_bits)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the filter against the float reference and score it
    Run {
        #[command(flatten)]
        filter: FilterArgs,

        /// Cutoff as a fraction of the sample rate
        #[arg(long, default_value_t = 0.125)]
        cutoff: f64,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44100.0)]
        sample_rate: f64,

        /// Number of samples
        #[arg(short = 'n', long, default_value_t = 100)]
        samples: usize,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stimulus: random, impulse, step, sine[:<hz>[:<amplitude>]]
        #[arg(long, default_value = "random")]
        stimulus: Stimulus,

        /// Cycles between start pulses (default: sections + 10)
        #[arg(long)]
        clocks_per_sample: Option<usize>,

        /// Section carrying the programmable numerator
        #[arg(long, default_value_t = 0)]
        shaping_section: usize,

        /// Maximum NMSE in dB
        #[arg(long, default_value_t = -20.0, allow_hyphen_values = true)]
        max_nmse_db: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the register widths derived from a configuration
    Widths {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            filter,
            cutoff,
            sample_rate,
            samples,
            seed,
            stimulus,
            clocks_per_sample,
            shaping_section,
            max_nmse_db,
            json,
        } => {
            let config = VerifyConfig {
                filter: filter.config(),
                sample_rate,
                cutoff,
                shaping_section,
                samples,
                seed,
                clocks_per_sample,
                stimulus,
                max_nmse_db,
                ..Default::default()
            };
            run(config, json)
        }
        Commands::Widths { filter } => print_widths(&filter.config()),
    }
}

fn run(config: VerifyConfig, json: bool) -> Result<()> {
    let report = VerifyRunner::new(config).run()?;
    let format = if json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    println!("{}", report.generate(format));

    if !report.passed {
        bail!("verification failed: {}", report.summary());
    }
    Ok(())
}

fn print_widths(config: &FilterConfig) -> Result<()> {
    config.validate()?;
    println!("{config}");
    println!("  sections:          {}", config.sections());
    println!("  fraction bits:     {}", config.fraction_bits());
    println!("  state:             {} bits", config.state_width());
    println!("  accumulator:       {} bits", config.accumulator_width());
    println!("  output saturation: {} bits", config.output_saturation_width());
    println!("  datapath:          {} bits", config.datapath_width());
    Ok(())
}
