//! Battery simulator entry point — CLI wiring and config-driven pipeline.

use std::path::Path;
use std::process;

use pv_battery_sim::config::ScenarioConfig;
use pv_battery_sim::io::export::export_csv;
use pv_battery_sim::io::import::read_meter_rows_path;
use pv_battery_sim::reporting::print_report;
use pv_battery_sim::runner::run_scenarios;
use pv_battery_sim::sim::day::merge_rows;

/// Parsed CLI arguments.
struct CliArgs {
    meter_data: Option<String>,
    scenario_path: Option<String>,
    preset: Option<String>,
    export_out: Option<String>,
}

fn print_help() {
    eprintln!("pv-battery-sim — Home solar battery financial impact simulator");
    eprintln!();
    eprintln!("Usage: pv-battery-sim --meter-data <csv> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --meter-data <path>      Half-hourly smart-meter CSV export (required)");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (flat, time-of-use)");
    eprintln!("  --export-out <path>      Export the largest-capacity simulation to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the flat preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        meter_data: None,
        scenario_path: None,
        preset: None,
        export_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--meter-data" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --meter-data requires a path argument");
                    process::exit(1);
                }
                cli.meter_data = Some(args[i].clone());
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--export-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --export-out requires a path argument");
                    process::exit(1);
                }
                cli.export_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then the flat
    // preset default.
    let scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::flat()
    };

    // Validate config before touching the meter data.
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let Some(ref meter_path) = cli.meter_data else {
        eprintln!("error: --meter-data is required");
        print_help();
        process::exit(1);
    };

    // Ingest and merge the raw meter rows.
    let rows = match read_meter_rows_path(Path::new(meter_path)) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let meter_days = merge_rows(&rows);
    if meter_days.is_empty() {
        eprintln!("error: \"{meter_path}\" contains no meter readings");
        process::exit(1);
    }
    eprintln!(
        "Loaded {} readings covering {} days ({} to {})",
        rows.len(),
        meter_days.len(),
        meter_days[0].date,
        meter_days[meter_days.len() - 1].date
    );

    // Run every capacity × tariff scenario.
    let runs = match run_scenarios(&scenario, &meter_days) {
        Ok(runs) => runs,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    print_report(&runs);

    // Export the largest-capacity simulated series if requested.
    if let Some(ref path) = cli.export_out {
        let largest = runs
            .iter()
            .max_by(|a, b| a.capacity_kwh.total_cmp(&b.capacity_kwh));
        if let Some(run) = largest {
            if let Err(e) = export_csv(&run.days, Path::new(path)) {
                eprintln!("error: failed to write CSV: {e}");
                process::exit(1);
            }
            eprintln!(
                "Simulated series for {:.1} kWh written to {path}",
                run.capacity_kwh
            );
        }
    }
}
