//! Single market maker iteration.
//!
//! Stage order is fixed and strictly sequential:
//! funding check → volatility → reservation price → budget allocation →
//! ladder generation → current-state read → reconcile → submit.
//! A funding shortfall short-circuits to the result; any I/O failure aborts
//! the run. There are no internal retries — the scheduler re-invokes the
//! whole pass.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::funding::{check_and_fund, FundingOutcome};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hpx_core::{BalancesSnapshot, Price};
use hpx_model::{
    build_ladder, calculate_orders, geometric_taper, normalized_inventory, realized_volatility,
    resample_closes, reservation_price, side_budgets, split_spread,
};
use hpx_venue::{await_indexed, IndexApi, LedgerApi};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Structured result of one iteration, the engine's only output besides
/// the submitted orders. Serialized for the scheduler to branch on: a
/// funding soft-failure is not a hard failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationResult {
    pub success: bool,
    pub orders_placed: usize,
    pub insufficient_funds: bool,
    pub balances: Option<BalancesSnapshot>,
    pub message: String,
}

impl IterationResult {
    /// Result for a fatal failure surfaced at the process boundary.
    pub fn fatal(message: String) -> Self {
        Self {
            success: false,
            orders_placed: 0,
            insufficient_funds: false,
            balances: None,
            message,
        }
    }
}

/// Hours until the next daily settlement checkpoint.
///
/// The checkpoint occurs `checkpoint_secs` after UTC midnight; when
/// today's has already passed, the next day's applies, so the horizon is
/// always positive.
fn time_to_checkpoint_hours(now: DateTime<Utc>, checkpoint_secs: u32) -> f64 {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc();
    let mut checkpoint = midnight + ChronoDuration::seconds(i64::from(checkpoint_secs));
    if checkpoint <= now {
        checkpoint += ChronoDuration::days(1);
    }
    (checkpoint - now).num_milliseconds() as f64 / 3_600_000.0
}

fn format_ladder<T: fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run one complete market maker iteration.
pub async fn run_iteration<L: LedgerApi, I: IndexApi>(
    config: &AppConfig,
    ledger: &L,
    index: &I,
) -> AppResult<IterationResult> {
    info!(
        dry_run = config.dry_run,
        grid_levels = config.grid_levels,
        spread_amount = %config.spread_amount,
        float_amount = %config.float_amount,
        max_position = %config.max_position,
        risk_aversion = %config.risk_aversion,
        active_quoting_ratio = %config.active_quoting_ratio,
        taper_ratio = %config.taper_ratio,
        "Market maker iteration"
    );

    // Funding gate: soft outcomes end the run without touching the ledger.
    let funding = check_and_fund(ledger, config).await?;
    if !funding.is_ready() {
        let message = match funding.outcome {
            FundingOutcome::InsufficientGas => format!(
                "Insufficient gas: {} < {} required",
                funding.balances.gas, config.min_gas_balance
            ),
            FundingOutcome::InsufficientCollateral => format!(
                "Insufficient collateral: {} < {} required",
                funding.balances.total_collateral(),
                config.min_collateral_balance
            ),
            FundingOutcome::Ready => unreachable!(),
        };
        return Ok(IterationResult {
            success: false,
            orders_placed: 0,
            insufficient_funds: true,
            balances: Some(funding.balances),
            message,
        });
    }
    let balances = funding.balances;

    let params = ledger.market_params().await?;
    let tick = params.tick_size;
    let spread = Price::new(config.spread_amount);
    if !spread.is_tick_multiple(tick) {
        return Err(AppError::Config(format!(
            "spread amount ({spread}) is not divisible by tick size ({tick}), \
             please adjust the spread amount"
        )));
    }

    // Volatility from the historical index series.
    let now = Utc::now();
    let now_secs = now.timestamp();
    let history = index
        .price_history(now_secs - config.volatility_window_secs, now_secs)
        .await?;
    let closes = resample_closes(&history, config.resample_interval_secs);
    let volatility = realized_volatility(&closes);
    if !volatility.is_valid {
        warn!(
            closes = volatility.sample_count,
            "Too few closes for a volatility estimate, quoting with zero"
        );
    }

    let index_price = ledger.index_price().await?;
    let address = config.quoting_address();
    let position = index.position(params.delivery_date, address).await?;
    let remaining_hours = time_to_checkpoint_hours(now, config.checkpoint_time_secs);

    info!(
        index_price = %index_price,
        delivery_date = params.delivery_date,
        contract_multiplier = %params.contract_multiplier,
        tick_size = %tick,
        position = %position.quantity,
        average_price = %position.average_price,
        unrealized_pnl = %position.unrealized_pnl(index_price),
        remaining_hours,
        sigma_per_step = volatility.sigma_per_step,
        "Market data"
    );

    // Reservation price, rounded onto the tick grid.
    let reservation = reservation_price(
        index_price,
        position.inventory_notional(params.contract_multiplier),
        config.risk_aversion,
        volatility.sigma_per_step,
        remaining_hours,
    )
    .round_to_tick(tick);
    info!(
        reservation = %reservation,
        shift = %(reservation - index_price),
        "Reservation price"
    );

    // Side budgets and per-level allocations.
    let budget = config.quoting_budget();
    let inventory = normalized_inventory(position.quantity, config.max_position);
    let budgets = side_budgets(budget, inventory);
    info!(
        bid_skew = %budgets.bid_skew,
        ask_skew = %budgets.ask_skew,
        budget = %budget,
        bid_budget = %budgets.bid_budget,
        ask_budget = %budgets.ask_budget,
        "Side budgets"
    );

    let bid_allocations = geometric_taper(budgets.bid_budget, config.grid_levels, config.taper_ratio);
    let ask_allocations = geometric_taper(budgets.ask_budget, config.grid_levels, config.taper_ratio);
    let (bid_spread, ask_spread) = split_spread(spread, tick);

    let ladder = build_ladder(
        reservation,
        bid_spread,
        ask_spread,
        tick,
        config.grid_levels,
        &bid_allocations,
        &ask_allocations,
        params.contract_multiplier,
    );
    info!(orders = %format_ladder(&ladder), "Modelled orders");

    // Fresh current-state read; the diff below is only valid against it.
    let resting = index.resting_orders(params.delivery_date, address).await?;
    info!(orders = %format_ladder(&resting), "Current orders");

    let actions = calculate_orders(&ladder, &resting, params.delivery_date);
    info!(orders = %format_ladder(&actions), "Orders to place");

    if actions.is_empty() {
        info!("No orders to place, skipping");
        return Ok(IterationResult {
            success: true,
            orders_placed: 0,
            insufficient_funds: false,
            balances: Some(balances),
            message: "No orders needed".to_string(),
        });
    }

    if config.dry_run {
        info!(count = actions.len(), "Dry run, skipping order placement");
        return Ok(IterationResult {
            success: true,
            orders_placed: 0,
            insufficient_funds: false,
            balances: Some(balances),
            message: format!("Dry run: {} orders modelled, none submitted", actions.len()),
        });
    }

    let receipt = ledger.place_orders(&actions).await?;
    let orders_placed = actions.len();
    info!(sequence = receipt.sequence, orders_placed, "Orders placed");

    if config.confirm_indexed {
        let confirmation = await_indexed(
            index,
            receipt.sequence,
            config.index_poll_attempts,
            Duration::from_millis(config.index_poll_delay_ms),
        )
        .await;
        // The batch has already committed; a confirmation failure only
        // fails the run's status, never the completed side effect.
        if let Err(e) = confirmation {
            warn!(error = %e, "Submitted batch not confirmed by indexer");
            return Ok(IterationResult {
                success: false,
                orders_placed,
                insufficient_funds: false,
                balances: Some(balances),
                message: format!("Placed {orders_placed} orders, unconfirmed: {e}"),
            });
        }
    }

    Ok(IterationResult {
        success: true,
        orders_placed,
        insufficient_funds: false,
        balances: Some(balances),
        message: format!("Placed {orders_placed} orders"),
    })
}
