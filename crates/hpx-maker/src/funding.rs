//! Funding guard.
//!
//! Verifies gas and collateral sufficiency before the engine commits to
//! quoting, and tops the margin account up to its float target from the
//! wallet. Shortfalls are expected operating states, reported as soft
//! outcomes rather than errors.

use crate::config::AppConfig;
use crate::error::AppResult;
use hpx_core::BalancesSnapshot;
use hpx_venue::LedgerApi;
use tracing::{info, warn};

/// Outcome of the funding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingOutcome {
    /// Balances clear the floors; quoting may proceed.
    Ready,
    /// Gas-asset balance below the configured minimum.
    InsufficientGas,
    /// Total collateral (wallet + margin) below the configured minimum.
    InsufficientCollateral,
}

/// Funding check result: the outcome plus the balances it was based on.
#[derive(Debug, Clone, Copy)]
pub struct FundingCheck {
    pub outcome: FundingOutcome,
    pub balances: BalancesSnapshot,
}

impl FundingCheck {
    pub fn is_ready(&self) -> bool {
        self.outcome == FundingOutcome::Ready
    }
}

/// Read balances, enforce the floors, and top up the margin account.
///
/// Floor violations return a soft outcome without attempting any write.
/// When the margin balance is below the float target and the wallet covers
/// the shortfall, one deposit is made before quoting (skipped in dry-run).
/// A shortfall beyond the wallet balance is logged and quoting proceeds
/// with the lower margin.
pub async fn check_and_fund<L: LedgerApi>(
    ledger: &L,
    config: &AppConfig,
) -> AppResult<FundingCheck> {
    let gas = ledger.gas_balance().await?;
    let wallet = ledger.wallet_collateral_balance().await?;
    let margin = ledger.margin_balance().await?;

    let mut balances = BalancesSnapshot {
        gas,
        wallet,
        margin,
    };

    info!(
        gas = %balances.gas,
        wallet = %balances.wallet,
        margin = %balances.margin,
        min_gas = %config.min_gas_balance,
        min_collateral = %config.min_collateral_balance,
        "Balance check"
    );

    if balances.gas < config.min_gas_balance {
        warn!(
            gas = %balances.gas,
            min_required = %config.min_gas_balance,
            "Insufficient gas, pausing until replenished"
        );
        return Ok(FundingCheck {
            outcome: FundingOutcome::InsufficientGas,
            balances,
        });
    }

    if balances.total_collateral() < config.min_collateral_balance {
        warn!(
            total = %balances.total_collateral(),
            min_required = %config.min_collateral_balance,
            "Insufficient collateral, pausing until replenished"
        );
        return Ok(FundingCheck {
            outcome: FundingOutcome::InsufficientCollateral,
            balances,
        });
    }

    if balances.margin < config.float_amount {
        let shortfall = config.float_amount - balances.margin;
        if shortfall <= balances.wallet {
            if config.dry_run {
                info!(%shortfall, "Dry run, skipping margin deposit");
            } else {
                let receipt = ledger.deposit_margin(shortfall).await?;
                info!(
                    deposit = %shortfall,
                    sequence = receipt.sequence,
                    "Deposited to margin account"
                );
                balances.margin += shortfall;
                balances.wallet -= shortfall;
            }
        } else {
            warn!(
                %shortfall,
                wallet = %balances.wallet,
                "Wallet cannot cover margin shortfall, quoting with lower margin"
            );
        }
    }

    Ok(FundingCheck {
        outcome: FundingOutcome::Ready,
        balances,
    })
}
