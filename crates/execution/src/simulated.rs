// In crates/execution/src/simulated.rs

use crate::types::{EntryOrder, Execution, ExitOrder, SimulationSettings};
use crate::{Error, Executor, Result};
use core_types::{Portfolio, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fills every order at the requested price; the only friction is the fee.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    settings: SimulationSettings,
}

impl SimulatedExecutor {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Units bought or sold when `equity` is committed at `price` with leverage.
    fn position_size(&self, equity: Decimal, price: Decimal) -> Result<Decimal> {
        equity
            .checked_mul(self.settings.leverage)
            .and_then(|exposure| exposure.checked_div(price))
            .ok_or_else(|| Error::ExecutionFailed {
                reason: format!(
                    "cannot size a position of {equity} at leverage {} and price {price}",
                    self.settings.leverage
                ),
            })
    }
}

/// Maps an overflowed fill computation to a failed execution.
fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| Error::ExecutionFailed {
        reason: format!("{what} overflowed"),
    })
}

impl Executor for SimulatedExecutor {
    fn name(&self) -> &'static str {
        "SimulatedExecutor"
    }

    /// Processes an entry order (opening a new long or short position).
    fn enter(&self, order: &EntryOrder, portfolio: &mut Portfolio) -> Result<Execution> {
        let prior_profit = portfolio.realized_profit;

        // --- 1. Size against current equity ---
        let amount = self.position_size(portfolio.cash_equity, order.price)?;

        // --- 2. The entry fee is the only realized effect of opening ---
        let fee = checked(
            amount.checked_mul(order.price).and_then(|notional| notional.checked_mul(order.fee_rate)),
            "entry fee",
        )?;
        portfolio.realized_profit = checked(portfolio.realized_profit.checked_sub(fee), "realized profit")?;
        tracing::debug!(side = order.side.as_str(), price = %order.price, %amount, %fee, "Simulated entry fill.");

        Ok(Execution {
            side: order.side,
            price: order.price,
            amount,
            remaining_amount: amount,
            fee,
            prior_profit,
        })
    }

    /// Processes a (possibly partial) closing order.
    fn exit(&self, order: &ExitOrder, portfolio: &mut Portfolio) -> Result<Execution> {
        if order.fraction <= Decimal::ZERO || order.fraction > dec!(1) {
            return Err(Error::InvalidFraction(order.fraction));
        }

        let prior_profit = portfolio.realized_profit;
        let closed = order.amount * order.fraction;
        let fee = checked(
            closed.checked_mul(order.price).and_then(|notional| notional.checked_mul(order.fee_rate)),
            "exit fee",
        )?;

        // --- 1. Book P&L on the closed slice, fee included ---
        let change = match order.side {
            Side::Long if order.entry_reference > Decimal::ZERO => order
                .price
                .checked_mul(dec!(1) - order.fee_rate)
                .and_then(|net| net.checked_sub(order.entry_reference))
                .and_then(|per_unit| closed.checked_mul(per_unit)),
            Side::Short if order.entry_reference < Decimal::ZERO => order
                .price
                .checked_mul(dec!(1) + order.fee_rate)
                .and_then(|gross| gross.checked_add(order.entry_reference))
                .and_then(|per_unit| closed.checked_mul(per_unit))
                .map(|loss| -loss),
            side => {
                return Err(Error::ExecutionFailed {
                    reason: format!(
                        "entry reference {} does not belong to a {} position",
                        order.entry_reference,
                        side.as_str()
                    ),
                });
            }
        };
        portfolio.realized_profit = checked(
            change.and_then(|change| portfolio.realized_profit.checked_add(change)),
            "exit profit",
        )?;

        // --- 2. Rescale what stays open ---
        // Shrink-then-divide-back form must stay as is; stored results depend on it.
        let remaining_amount = closed / order.fraction * (dec!(1) - order.fraction);
        tracing::debug!(
            side = order.side.as_str(),
            price = %order.price,
            %closed,
            remaining = %remaining_amount,
            "Simulated exit fill."
        );

        Ok(Execution {
            side: order.side,
            price: order.price,
            amount: closed,
            remaining_amount,
            fee,
            prior_profit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(leverage: Decimal) -> SimulatedExecutor {
        SimulatedExecutor::new(SimulationSettings {
            fee_rate: dec!(0.001),
            leverage,
        })
    }

    #[test]
    fn entry_sizes_with_leverage_and_charges_fee() {
        let exec = executor(dec!(3));
        let mut portfolio = Portfolio::new(dec!(1000));
        let fill = exec
            .enter(
                &EntryOrder { side: Side::Long, price: dec!(100), fee_rate: dec!(0.001) },
                &mut portfolio,
            )
            .unwrap();

        assert_eq!(fill.amount, dec!(30));
        assert_eq!(fill.fee, dec!(3));
        assert_eq!(portfolio.realized_profit, dec!(-3));
        // cash is folded in by the accumulator, not here
        assert_eq!(portfolio.cash_equity, dec!(1000));
    }

    #[test]
    fn long_exit_books_price_move_net_of_fee() {
        let exec = executor(dec!(1));
        let mut portfolio = Portfolio::new(dec!(1000));
        let fill = exec
            .exit(
                &ExitOrder {
                    side: Side::Long,
                    entry_reference: dec!(100),
                    amount: dec!(10),
                    price: dec!(110),
                    fee_rate: dec!(0.001),
                    fraction: dec!(1),
                },
                &mut portfolio,
            )
            .unwrap();

        // 10 * (110 * 0.999 - 100) = 98.9
        assert_eq!(portfolio.realized_profit, dec!(98.9));
        assert_eq!(fill.remaining_amount, Decimal::ZERO);
    }

    #[test]
    fn short_exit_uses_negative_reference() {
        let exec = executor(dec!(1));
        let mut portfolio = Portfolio::new(dec!(1000));
        exec.exit(
            &ExitOrder {
                side: Side::Short,
                entry_reference: dec!(-100),
                amount: dec!(10),
                price: dec!(60),
                fee_rate: Decimal::ZERO,
                fraction: dec!(1),
            },
            &mut portfolio,
        )
        .unwrap();

        assert_eq!(portfolio.realized_profit, dec!(400));
    }

    #[test]
    fn half_exit_leaves_the_literal_rescaled_amount() {
        let exec = executor(dec!(1));
        let mut portfolio = Portfolio::new(dec!(1000));
        let fill = exec
            .exit(
                &ExitOrder {
                    side: Side::Long,
                    entry_reference: dec!(100),
                    amount: dec!(10),
                    price: dec!(100),
                    fee_rate: Decimal::ZERO,
                    fraction: dec!(0.5),
                },
                &mut portfolio,
            )
            .unwrap();

        assert_eq!(fill.amount, dec!(5));
        // 10 * 0.5 / 0.5 * (1 - 0.5)
        assert_eq!(fill.remaining_amount, dec!(5));
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        let exec = executor(dec!(1));
        let mut portfolio = Portfolio::new(dec!(1000));
        let order = ExitOrder {
            side: Side::Long,
            entry_reference: dec!(100),
            amount: dec!(10),
            price: dec!(100),
            fee_rate: Decimal::ZERO,
            fraction: dec!(0),
        };
        assert_eq!(exec.exit(&order, &mut portfolio), Err(Error::InvalidFraction(dec!(0))));
        assert_eq!(portfolio.realized_profit, Decimal::ZERO);
    }

    #[test]
    fn oversized_leverage_fails_instead_of_overflowing() {
        let exec = executor(Decimal::MAX);
        let mut portfolio = Portfolio::new(dec!(1000));
        let result = exec.enter(
            &EntryOrder { side: Side::Long, price: dec!(100), fee_rate: dec!(0.001) },
            &mut portfolio,
        );

        assert!(matches!(result, Err(Error::ExecutionFailed { .. })));
        assert_eq!(portfolio.realized_profit, Decimal::ZERO);
    }

    #[test]
    fn mismatched_reference_sign_is_rejected() {
        let exec = executor(dec!(1));
        let mut portfolio = Portfolio::new(dec!(1000));
        let order = ExitOrder {
            side: Side::Short,
            entry_reference: dec!(100),
            amount: dec!(10),
            price: dec!(100),
            fee_rate: Decimal::ZERO,
            fraction: dec!(1),
        };
        assert!(matches!(
            exec.exit(&order, &mut portfolio),
            Err(Error::ExecutionFailed { .. })
        ));
    }
}
