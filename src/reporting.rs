//! Plain-text report formatting for scenario results.
//!
//! Pure presentation: the aggregation buckets carry cents, the report prints
//! dollars. Nothing here feeds back into the pipeline.

use crate::aggregate::Bucket;
use crate::runner::CapacityRun;

fn dollars(cents: f64) -> f64 {
    cents / 100.0
}

fn print_bucket_line(key: &str, bucket: &Bucket) {
    println!(
        "  {key:<9} bought {:>9.2} kWh (${:>9.2})  exported {:>9.2} kWh (${:>8.2})  net ${:>9.2}",
        bucket.consumed_kwh,
        dollars(bucket.consumption_cost_cents),
        bucket.generated_kwh,
        dollars(bucket.generation_earnings_cents),
        dollars(bucket.net_cost_cents()),
    );
}

/// Prints per-month and per-year summaries for every scenario.
pub fn print_report(runs: &[CapacityRun]) {
    for run in runs {
        for tariff in &run.tariffs {
            println!(
                "\n=== Battery {:.1} kWh — {} ===",
                run.capacity_kwh, tariff.tariff_name
            );
            for (month, bucket) in &tariff.summary.by_month {
                print_bucket_line(month, bucket);
            }
            for (year, bucket) in &tariff.summary.by_year {
                print_bucket_line(year, bucket);
                println!(
                    "  {year} battery intake {:>8.2} kWh, full-charge days {}",
                    bucket.battery_charged_kwh, bucket.days_reached_full_charge
                );
            }
        }
    }

    print_comparison(runs);
}

/// Prints the cross-scenario yearly net-cost comparison table.
pub fn print_comparison(runs: &[CapacityRun]) {
    println!("\n--- Yearly net cost comparison ---");
    for run in runs {
        for tariff in &run.tariffs {
            for (year, bucket) in &tariff.summary.by_year {
                println!(
                    "{year}  battery {:>5.1} kWh  {:<16} ${:>9.2}",
                    run.capacity_kwh,
                    tariff.tariff_name,
                    dollars(bucket.net_cost_cents()),
                );
            }
        }
    }
}
