use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use farmcalc_sdk::{
    format_countdown, quote_exact_in, quote_exact_out, spot_price, to_base_units, to_display_units,
    Decimal, Error as CalcError, FarmSummary, NetworkParams, PoolStorage, Quote, SwapDirection,
};
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod config;
mod snapshot;

use config::Config;
use snapshot::{Snapshot, SnapshotPaths};

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  farmcalc  v{ver}  ·  offline DEX quotes and farm rewards");
    println!("  {}", "─".repeat(62));
    println!("  Input     JSON snapshots of pool storage, farm storage, block head");
    println!("  Math      arbitrary-precision decimal, no floating point");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// farmcalc: swap quotes, projected farm rewards, APR and withdrawal penalty
/// computed from chain snapshots.
///
/// Every command supports --json for machine-readable output.
#[derive(Parser)]
#[command(
    name    = "farmcalc",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Offline quoting and reward projection for a constant-product DEX and its yield farm.",
    after_help = "\
ENVIRONMENT:
  FARMCALC_CONFIG  Path to the TOML config file  [default: built-in defaults]
  RUST_LOG         Log filter, e.g. RUST_LOG=farmcalc_sdk=debug

QUICK START:
  farmcalc quote   --pool pool.json --amount-in 1
  farmcalc farm    --farm farm.json --pool pool.json --head head.json --delegator tz1...
  farmcalc penalty --farm farm.json --delegator tz1...
  farmcalc watch   --farm farm.json --pool pool.json --head head.json --interval 30"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, value_name = "PATH", env = "FARMCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    /// Sell the base asset for the token
    BaseToToken,
    /// Sell the token for the base asset
    TokenToBase,
}

impl From<Direction> for SwapDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::BaseToToken => SwapDirection::BaseToToken,
            Direction::TokenToBase => SwapDirection::TokenToBase,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a swap against a pool snapshot
    ///
    /// Amounts are in display units (e.g. 1.5 XTZ). Exactly one of
    /// --amount-in or --amount-out is required.
    Quote {
        /// Pool storage snapshot (JSON)
        #[arg(long, value_name = "FILE")]
        pool: PathBuf,

        #[arg(long, value_enum, default_value = "base-to-token")]
        direction: Direction,

        /// Amount to sell
        #[arg(long, value_name = "N", conflicts_with = "amount_out", required_unless_present = "amount_out")]
        amount_in: Option<Decimal>,

        /// Amount to receive
        #[arg(long, value_name = "N")]
        amount_out: Option<Decimal>,

        /// Slippage tolerance in percent (e.g. 0.5). Defaults to swap.max_slippage.
        #[arg(long, value_name = "PCT")]
        slippage: Option<Decimal>,
    },

    /// Show farm APR, stake, projected reward and penalty status
    Farm {
        #[command(flatten)]
        files: SnapshotArgs,

        /// Address of the viewing delegator
        #[arg(long, value_name = "ADDR")]
        delegator: Option<String>,
    },

    /// Check whether withdrawing now would be charged the early-withdrawal fee
    Penalty {
        /// Farm storage snapshot (JSON)
        #[arg(long, value_name = "FILE")]
        farm: PathBuf,

        #[arg(long, value_name = "ADDR")]
        delegator: String,

        /// Evaluation time as a UNIX timestamp [default: now]
        #[arg(long, value_name = "UNIX")]
        now: Option<i64>,
    },

    /// Re-read the snapshots on a timer and print the farm view on each tick
    ///
    /// Stops on Ctrl-C. A failed read keeps the previous figures.
    Watch {
        #[command(flatten)]
        files: SnapshotArgs,

        #[arg(long, value_name = "ADDR")]
        delegator: Option<String>,

        /// Seconds between refreshes. Defaults to watch.interval_secs.
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

#[derive(clap::Args)]
struct SnapshotArgs {
    /// Farm storage snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    farm: PathBuf,

    /// Pool storage snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    pool: PathBuf,

    /// Block head snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    head: PathBuf,
}

impl SnapshotArgs {
    fn paths(&self) -> SnapshotPaths {
        SnapshotPaths {
            farm: self.farm.clone(),
            pool: self.pool.clone(),
            head: self.head.clone(),
        }
    }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Quote { pool, direction, amount_in, amount_out, slippage } => {
            cmd_quote(
                &config, pool, (*direction).into(),
                amount_in.as_ref(), amount_out.as_ref(), slippage.as_ref(),
                cli.json,
            )
            .await?;
        }
        Commands::Farm { files, delegator } => {
            cmd_farm(&config, &files.paths(), delegator.as_deref(), cli.json).await?;
        }
        Commands::Penalty { farm, delegator, now } => {
            cmd_penalty(farm, delegator, *now, cli.json).await?;
        }
        Commands::Watch { files, delegator, interval } => {
            let secs = interval.unwrap_or(config.watch.interval_secs);
            cmd_watch(&config, &files.paths(), delegator.as_deref(), secs, cli.json).await?;
        }
    }

    Ok(())
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

/// Base units → display string, trimmed to `decimals` places. Falls back to
/// base units when `decimals` is out of range.
fn display_amount(amount: &Decimal, decimals: u32) -> String {
    match to_display_units(amount, decimals) {
        Ok(display) => display.to_string(),
        Err(_) => format!("{amount} (base units)"),
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

/// Slippage given in percent, as a ratio.
fn slippage_ratio(config: &Config, pct: Option<&Decimal>) -> Result<Decimal> {
    let Some(pct) = pct else {
        return Ok(config.swap.max_slippage.clone());
    };
    if pct.is_negative() || *pct > Decimal::from(100u32) {
        return Err(anyhow!("--slippage {pct} is out of range. Allowed: 0–100 (percent)."));
    }
    Ok(pct.shifted_by(-2))
}

// ─── quote ───────────────────────────────────────────────────────────────────

async fn cmd_quote(
    config: &Config,
    pool_path: &Path,
    direction: SwapDirection,
    amount_in: Option<&Decimal>,
    amount_out: Option<&Decimal>,
    slippage_pct: Option<&Decimal>,
    json_output: bool,
) -> Result<()> {
    let pool = snapshot::load_pool(pool_path).await?;
    let slippage = slippage_ratio(config, slippage_pct)?;

    let (sym_in, sym_out, dec_in, dec_out) = match direction {
        SwapDirection::BaseToToken => (
            &config.pool.base_symbol, &config.pool.token_symbol,
            config.pool.base_decimals, config.pool.token_decimals,
        ),
        SwapDirection::TokenToBase => (
            &config.pool.token_symbol, &config.pool.base_symbol,
            config.pool.token_decimals, config.pool.base_decimals,
        ),
    };

    let request = match (amount_in, amount_out) {
        (Some(a), _) => QuoteRequest::ExactIn(to_base_units(a, dec_in)?),
        (None, Some(a)) => QuoteRequest::ExactOut(to_base_units(a, dec_out)?),
        (None, None) => return Err(anyhow!("Pass --amount-in or --amount-out")),
    };
    let quote = quote_or_unavailable(&pool, direction, &request, &slippage)?;
    let rate = spot_price(&pool.reserves, direction, dec_in, dec_out).ok();

    if json_output {
        println!("{}", quote_json(quote.as_ref(), rate.as_ref(), &slippage));
        return Ok(());
    }

    let Some(q) = quote else {
        println!("─── Quote ────────────────────────────────────────────────────────");
        println!("  Rate             unavailable (pool has no liquidity)");
        return Ok(());
    };
    println!("─── Quote ────────────────────────────────────────────────────────");
    println!("  You sell         {} {sym_in}", display_amount(&q.input_amount, dec_in));
    println!("  You receive      {} {sym_out}", display_amount(&q.output_amount, dec_out));
    println!(
        "  Minimum out      {} {sym_out}  ({}% slippage)",
        display_amount(&q.minimum_output_after_slippage, dec_out),
        slippage.shifted_by(2),
    );
    println!("  Pool fee         {} bps", pool.reserves.fee_rate_bps);
    println!("  Price impact     {}%", q.price_impact_pct.round_dp(4));
    println!(
        "  Spot rate        1 {sym_in} = {} {sym_out}",
        or_na(rate.map(|r| r.round_dp(6).to_string())),
    );
    Ok(())
}

/// Amount in base units, on the side the trader fixes.
enum QuoteRequest {
    ExactIn(Decimal),
    ExactOut(Decimal),
}

/// Quote, or `None` when the pool cannot price the swap at all (empty reserves).
/// Any other calculation error, such as insufficient liquidity, is returned.
fn quote_or_unavailable(
    pool: &PoolStorage,
    direction: SwapDirection,
    request: &QuoteRequest,
    slippage: &Decimal,
) -> Result<Option<Quote>> {
    let result = match request {
        QuoteRequest::ExactIn(amount) => {
            if amount.is_negative() {
                return Err(anyhow!("--amount-in must not be negative"));
            }
            quote_exact_in(&pool.reserves, direction, amount, slippage)
        }
        QuoteRequest::ExactOut(amount) => {
            if amount.is_negative() {
                return Err(anyhow!("--amount-out must not be negative"));
            }
            quote_exact_out(&pool.reserves, direction, amount, slippage)
        }
    };
    match result {
        Ok(q) => Ok(Some(q)),
        Err(CalcError::PoolUninitialized | CalcError::DivisionByZero) => Ok(None),
        Err(e) => Err(e).context("Cannot quote this swap"),
    }
}

fn quote_json(quote: Option<&Quote>, rate: Option<&Decimal>, slippage: &Decimal) -> serde_json::Value {
    match quote {
        Some(q) => json!({
            "status":       "ok",
            "command":      "quote",
            "quote":        q,
            "spot_price":   rate,
            "slippage":     slippage,
        }),
        None => json!({
            "status":  "unavailable",
            "command": "quote",
            "reason":  "pool has no liquidity",
        }),
    }
}

// ─── farm ────────────────────────────────────────────────────────────────────

fn summary_json(summary: &FarmSummary, delegator: Option<&str>) -> serde_json::Value {
    json!({
        "status":    "ok",
        "command":   "farm",
        "delegator": delegator,
        "summary":   summary,
    })
}

fn print_summary(config: &Config, summary: &FarmSummary, delegator: Option<&str>) {
    let params: &NetworkParams = &config.network;
    let lp = params.lp_token_decimals;
    let reward = params.reward_token_decimals;

    println!("─── Farm @ level {} ──────────────────────────────────────────", summary.block_level);
    println!("  Total staked     {} LP", display_amount(&summary.total_staked, lp));
    println!("  APR              {}", or_na(summary.apr.as_ref().map(|a| format!("{}%", a.round_dp(2)))));
    if let Some(address) = delegator {
        println!("  Delegator        {address}");
        println!("  Your stake       {} LP", display_amount(&summary.personal_stake, lp));
        println!(
            "  Unclaimed        {}",
            or_na(summary.unclaimed_reward.as_ref().map(|r| display_amount(r, reward))),
        );
    }

    let penalty = &summary.penalty;
    if !penalty.fee_percentage.is_positive() {
        println!("  Penalty          none");
        return;
    }
    println!(
        "  Penalty          {}% fee for withdrawals within {}.",
        penalty.fee_percentage, penalty.period,
    );
    if penalty.applies {
        println!("                   {} left", format_countdown(penalty.remaining_seconds));
        println!(
            "                   fee on full stake: {} LP",
            display_amount(&penalty.withdrawal_fee_on_full_stake, lp),
        );
    }
}

async fn cmd_farm(config: &Config, paths: &SnapshotPaths, delegator: Option<&str>, json_output: bool) -> Result<()> {
    let snap = Snapshot::load(paths).await?;
    let summary = FarmSummary::compute(&snap.farm, &snap.pool, delegator, &snap.head, &config.network);
    if json_output {
        println!("{}", summary_json(&summary, delegator));
    } else {
        print_summary(config, &summary, delegator);
    }
    Ok(())
}

// ─── penalty ─────────────────────────────────────────────────────────────────

async fn cmd_penalty(farm_path: &Path, delegator: &str, now: Option<i64>, json_output: bool) -> Result<()> {
    let storage = snapshot::load_farm(farm_path).await?;
    let now = now.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let terms = storage.farm.penalty();
    let record = storage.delegator(delegator);

    let applies = terms.penalty_applies(record, now);
    let remaining = terms.penalty_remaining_seconds(record, now);
    let stake = record.map(|r| r.lp_token_balance.clone()).unwrap_or_default();
    let fee = terms.withdrawal_fee(&stake, record, now);

    if json_output {
        println!("{}", json!({
            "status":            "ok",
            "command":           "penalty",
            "delegator":         delegator,
            "known_delegator":   record.is_some(),
            "fee_percentage":    terms.fee_percentage,
            "period_seconds":    terms.period_seconds,
            "applies":           applies,
            "remaining_seconds": remaining,
            "withdrawal_fee":    fee,
        }));
        return Ok(());
    }

    println!("─── Withdrawal Penalty ───────────────────────────────────────────");
    println!("  Delegator        {delegator}");
    if record.is_none() {
        println!("  Stake            none in this farm");
    }
    if !terms.is_enabled() {
        println!("  Penalty          none");
        return Ok(());
    }
    println!(
        "  Terms            {}% fee for withdrawals within {}.",
        terms.fee_percentage, terms.describe_period(),
    );
    if applies {
        println!("  Status           active, {} left", format_countdown(remaining));
        println!("  Fee on stake     {fee} (base units)");
    } else {
        println!("  Status           no fee applies");
    }
    Ok(())
}

// ─── watch ───────────────────────────────────────────────────────────────────

async fn cmd_watch(
    config: &Config,
    paths: &SnapshotPaths,
    delegator: Option<&str>,
    interval_secs: u64,
    json_output: bool,
) -> Result<()> {
    if interval_secs == 0 {
        return Err(anyhow!("--interval must be greater than zero"));
    }
    log::info!("watching snapshots every {interval_secs}s; Ctrl-C to stop");
    watch_until(config, paths, delegator, Duration::from_secs(interval_secs), json_output, tokio::signal::ctrl_c())
        .await;
    Ok(())
}

/// Refresh and print on every tick until `stop` resolves. Returns the last
/// snapshot shown, if any.
async fn watch_until<F: Future>(
    config: &Config,
    paths: &SnapshotPaths,
    delegator: Option<&str>,
    period: Duration,
    json_output: bool,
    stop: F,
) -> Option<Snapshot> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut current: Option<Snapshot> = None;
    // One listener for the whole loop, so a signal during a refresh is not lost.
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                current = refresh(current, Snapshot::load(paths).await);
                if let Some(snap) = &current {
                    let summary = FarmSummary::compute(&snap.farm, &snap.pool, delegator, &snap.head, &config.network);
                    if json_output {
                        println!("{}", summary_json(&summary, delegator));
                    } else {
                        print_summary(config, &summary, delegator);
                        println!();
                    }
                }
            }
            _ = &mut stop => {
                log::info!("stopping watch");
                break;
            }
        }
    }
    current
}

/// Last read wins: a loaded snapshot replaces the previous one wholesale, a
/// failed read keeps it.
fn refresh(current: Option<Snapshot>, loaded: Result<Snapshot>) -> Option<Snapshot> {
    match loaded {
        Ok(snap) => Some(snap),
        Err(e) => {
            log::warn!("refresh failed, keeping previous snapshot: {e:#}");
            current
        }
    }
}
