use anyhow::{Context, Result};
use colored::Colorize;
use gex_analyzer::{aggregator, config, flip, flow, logging, normalizer};
use gex_analyzer::models::OptionChain;
use serde::Serialize;

/// Full analysis output for one chain snapshot, dumped as JSON when
/// GEX_REPORT is set.
#[derive(Debug, Serialize)]
struct Report {
    symbol: String,
    expiry: String,
    reference_price: f64,
    days_to_expiry: i64,
    atm: aggregator::AtmInfo,
    flow: flow::FlowMetrics,
    flip_zones: Vec<flip::FlipZone>,
    table: aggregator::ExposureTable,
}

fn run_analysis() -> Result<()> {
    let symbol = config::get_symbol();
    let input_path = config::get_input_path();
    let strikes_range = config::get_strikes_range();
    let expiry_index = config::get_expiry_index();
    let risk_free_rate = config::get_risk_free_rate();

    println!("{}", "=".repeat(60).blue());
    println!("{}", "GEX/DEX Exposure Analyzer".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
    println!("{} Symbol: {}", "→".cyan(), symbol.yellow());
    println!("{} Snapshot: {}", "→".cyan(), input_path.yellow());
    println!("{} Strikes range: ±{}", "→".cyan(), strikes_range);
    println!();

    let text = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read chain snapshot: {}", input_path))?;
    let chain: OptionChain =
        serde_json::from_str(&text).context("Failed to parse option chain JSON")?;

    let normalized = normalizer::normalize(&chain, expiry_index)
        .context("Chain normalization failed")?;
    let (time_to_expiry, days_to_expiry) = normalizer::time_to_expiry(&normalized.expiry)?;

    let spec = config::contract_spec(&symbol);
    let (table, atm) = aggregator::aggregate(
        &normalized.quotes,
        normalized.underlying_value,
        &spec,
        strikes_range,
        risk_free_rate,
        time_to_expiry,
    )
    .context("Exposure aggregation failed")?;

    let metrics = flow::analyze(&table, normalized.underlying_value);
    let flip_zones = flip::detect(&table);

    // Summary
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Results".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Expiry: {} ({} days)", "✓".green(), normalized.expiry, days_to_expiry);
    println!("{} Reference: {:.2}", "✓".green(), normalized.underlying_value);
    println!("{} Strikes analyzed: {}", "✓".green(), table.len());
    println!(
        "{} ATM strike: {} (straddle ₹{:.2})",
        "✓".green(),
        atm.atm_strike,
        atm.atm_straddle_premium
    );
    println!();

    let total_call_gex: f64 = table.iter().map(|r| r.call_gex).sum();
    let total_put_gex: f64 = table.iter().map(|r| r.put_gex).sum();
    println!("{} Total Net GEX: {:.4}B", "ℹ".blue(), metrics.gex_total);
    println!("{} Call GEX: {:.4}B | Put GEX: {:.4}B", "ℹ".blue(), total_call_gex, total_put_gex);
    println!("{} Total Net DEX: {:.4}B", "ℹ".blue(), metrics.dex_total);
    println!();
    println!("{} GEX near bias: {}", "ℹ".blue(), metrics.gex_near_bias.to_string().yellow());
    println!("{} DEX near bias: {}", "ℹ".blue(), metrics.dex_near_bias.to_string().yellow());
    println!("{} Combined bias: {}", "ℹ".blue(), metrics.combined_bias.to_string().yellow());
    println!();

    if flip_zones.is_empty() {
        println!("{} No gamma flip zones detected", "ℹ".blue());
    } else {
        println!("{} {} gamma flip zone(s) detected:", "⚡".yellow(), flip_zones.len());
        for zone in &flip_zones {
            println!(
                "  {} {} → {} @ {:.2} ({})",
                "⚡".yellow(),
                zone.lower_strike,
                zone.upper_strike,
                zone.flip_price,
                zone.flip_type
            );
        }
    }
    println!();

    // Top hedging-pressure strikes
    let mut by_pressure: Vec<&aggregator::ExposureRow> = table.iter().collect();
    by_pressure.sort_by(|a, b| {
        b.hedging_pressure.abs().partial_cmp(&a.hedging_pressure.abs()).unwrap()
    });
    println!("{}", "Top strikes by hedging pressure:".cyan());
    for row in by_pressure.iter().take(5) {
        println!(
            "  {} {:>8} | Net GEX {:>9.4}B | Pressure {:>7.1}%",
            "→".cyan(),
            row.quote.strike,
            row.net_gex,
            row.hedging_pressure
        );
    }

    if let Some(report_path) = config::get_report_path() {
        let report = Report {
            symbol,
            expiry: normalized.expiry.clone(),
            reference_price: normalized.underlying_value,
            days_to_expiry,
            atm,
            flow: metrics,
            flip_zones,
            table,
        };
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report: {}", report_path))?;
        println!();
        println!("{} Saved report to {}", "✓".green(), report_path.yellow());
    }

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Done!".green().bold());
    println!("{}", "=".repeat(60).blue());

    Ok(())
}

fn main() -> Result<()> {
    logging::init_logging();
    run_analysis()
}
