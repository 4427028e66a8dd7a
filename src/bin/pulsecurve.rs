//! Pulsecurve CLI - Command-line interface for pulsecurve
//!
//! Commands:
//! - analyze: Run the full pipeline on a DATA/CF1 pair and emit a report
//! - calibrate: Compute the distance per pulse from a CF1 file
//! - impact: Detect the impact point in a DATA file

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pulsecurve::impact::{detect_impact_checked, DetectorConfig, LEGACY_IMPACT_OFFSET};
use pulsecurve::sequence::TruncationPolicy;
use pulsecurve::{calibrate, parse_parameters, parse_raw_sequence, BrakeAnalyzer};
use pulsecurve::PULSECURVE_VERSION;

/// Pulsecurve - brake curve analysis for encoder pulse logs
#[derive(Parser)]
#[command(name = "pulsecurve")]
#[command(version = PULSECURVE_VERSION)]
#[command(about = "Analyze escalator/lift brake encoder pulse logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a DATA/CF1 pair and emit a JSON report
    Analyze {
        /// DATA file path (use - for stdin)
        #[arg(short, long)]
        data: PathBuf,

        /// CF1 parameter file path
        #[arg(short, long)]
        cf1: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Impact detection threshold
        #[arg(long, default_value = "2.0")]
        threshold: f64,

        /// Report the impact at window offset 12 instead of 13
        #[arg(long)]
        legacy_offset: bool,

        /// Truncate by dropping consecutive duplicates instead of the
        /// windowed-prefix rule
        #[arg(long)]
        dedup_policy: bool,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Compute the distance per pulse from a CF1 file
    Calibrate {
        /// CF1 parameter file path
        #[arg(short, long)]
        cf1: PathBuf,

        /// Output as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Detect the impact point in a DATA file
    Impact {
        /// DATA file path (use - for stdin)
        #[arg(short, long)]
        data: PathBuf,

        /// Impact detection threshold
        #[arg(long, default_value = "2.0")]
        threshold: f64,

        /// Output as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            data,
            cf1,
            output,
            threshold,
            legacy_offset,
            dedup_policy,
            pretty,
        } => cmd_analyze(
            &data,
            &cf1,
            &output,
            threshold,
            legacy_offset,
            dedup_policy,
            pretty,
        ),
        Commands::Calibrate { cf1, json } => cmd_calibrate(&cf1, json),
        Commands::Impact {
            data,
            threshold,
            json,
        } => cmd_impact(&data, threshold, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_analyze(
    data: &Path,
    cf1: &Path,
    output: &Path,
    threshold: f64,
    legacy_offset: bool,
    dedup_policy: bool,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data_bytes = read_input(data)?;
    let cf1_bytes = read_input(cf1)?;

    let detector = DetectorConfig {
        threshold,
        impact_offset: if legacy_offset {
            LEGACY_IMPACT_OFFSET
        } else {
            DetectorConfig::default().impact_offset
        },
    };
    let policy = if dedup_policy {
        TruncationPolicy::DedupConsecutive
    } else {
        TruncationPolicy::WindowedPrefix
    };

    let analyzer = BrakeAnalyzer::new().detector(detector).policy(policy);
    let report = analyzer.analyze(&data_bytes, &cf1_bytes)?;

    let json = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };
    write_output(output, &json)?;
    Ok(())
}

fn cmd_calibrate(cf1: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cf1_bytes = read_input(cf1)?;
    let params = parse_parameters(&cf1_bytes)?;
    let calibration = calibrate(&params)?;

    if json {
        println!("{}", serde_json::to_string(&calibration)?);
    } else {
        println!("case:              {}", calibration.case.as_str());
        println!("distance per pulse: {:.6} cm", calibration.cm_per_pulse);
    }
    Ok(())
}

fn cmd_impact(data: &Path, threshold: f64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data_bytes = read_input(data)?;
    let sequence = parse_raw_sequence(&data_bytes)?;
    let result = detect_impact_checked(&sequence, &DetectorConfig::with_threshold(threshold))?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    match result {
        Some(impact) => {
            println!("impact index:    {}", impact.index);
            println!("non-zero count:  {}", impact.non_zero_count);
            println!("deltas:          {:?}", impact.diagnostics.deltas);
            println!("ratios:          {:?}", impact.diagnostics.ratios);
            println!(
                "above threshold: {} of 4 (threshold {threshold})",
                impact.diagnostics.above_threshold
            );
        }
        None => println!("no impact detected"),
    }
    Ok(())
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading from stdin (pipe a DATA file or press Ctrl-D)...");
        }
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read(path)
    }
}

/// Write to a file, or stdout when the path is `-`.
fn write_output(path: &Path, contents: &str) -> io::Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(contents.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.flush()
    } else {
        fs::write(path, contents)
    }
}
