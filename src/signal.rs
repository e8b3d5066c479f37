// =============================================================================
// Signal Engine — priority-ordered rule table
// =============================================================================
//
// Maps an indicator snapshot (plus the previous run's snapshot for crossing
// detection) to a buy/sell/hold action.  Rules are evaluated top-down and the
// first one that fires wins, so conflicting indications (RSI says buy, MACD
// says sell) resolve the same way on every run:
//
//   1. trend_consensus — price vs SMA, MACD vs signal line, and RSI momentum
//                        all agree on one direction.
//   2. macd_cross      — the MACD line crossed its signal line since the
//                        previous snapshot (skipped on the first run).
//   3. rsi_reversal    — RSI stretched past the oversold/overbought bands.
//
// Identical (snapshot, previous) inputs always produce the identical action.

use tracing::debug;

use crate::config::SignalParams;
use crate::indicators::IndicatorSnapshot;
use crate::types::{Action, Signal};

pub struct SignalEngine;

impl SignalEngine {
    /// Derive the action for one symbol.
    ///
    /// `previous` is the snapshot from the last completed run, used only for
    /// crossing detection; `None` disables the crossing rule.
    pub fn evaluate(
        snapshot: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
        params: &SignalParams,
    ) -> Signal {
        let fired = trend_consensus(snapshot, params)
            .or_else(|| macd_cross(snapshot, previous))
            .or_else(|| rsi_reversal(snapshot, params));

        let (action, rule) = fired.unwrap_or((Action::Hold, "hold"));

        debug!(
            symbol = %snapshot.symbol,
            action = %action,
            rule,
            close = snapshot.close,
            sma = snapshot.sma,
            macd = snapshot.macd,
            macd_signal = snapshot.macd_signal,
            rsi = snapshot.rsi,
            "signal evaluated"
        );

        Signal {
            symbol: snapshot.symbol.clone(),
            timestamp: snapshot.timestamp,
            action,
            rule: rule.to_string(),
        }
    }
}

/// Rule 1: all three indicators agree on one direction.
fn trend_consensus(
    snapshot: &IndicatorSnapshot,
    params: &SignalParams,
) -> Option<(Action, &'static str)> {
    let bullish = snapshot.close > snapshot.sma
        && snapshot.macd > snapshot.macd_signal
        && snapshot.rsi > params.rsi_bull_level;
    if bullish {
        return Some((Action::Buy, "trend_consensus"));
    }

    let bearish = snapshot.close < snapshot.sma
        && snapshot.macd < snapshot.macd_signal
        && snapshot.rsi < params.rsi_bull_level;
    if bearish {
        return Some((Action::Sell, "trend_consensus"));
    }

    None
}

/// Rule 2: the MACD line crossed its signal line between the previous snapshot
/// and this one.
fn macd_cross(
    snapshot: &IndicatorSnapshot,
    previous: Option<&IndicatorSnapshot>,
) -> Option<(Action, &'static str)> {
    let prev = previous?;

    let was_below = prev.macd <= prev.macd_signal;
    let is_above = snapshot.macd > snapshot.macd_signal;
    if was_below && is_above {
        return Some((Action::Buy, "macd_cross"));
    }

    let was_above = prev.macd >= prev.macd_signal;
    let is_below = snapshot.macd < snapshot.macd_signal;
    if was_above && is_below {
        return Some((Action::Sell, "macd_cross"));
    }

    None
}

/// Rule 3: RSI stretched into the reversal bands.
fn rsi_reversal(
    snapshot: &IndicatorSnapshot,
    params: &SignalParams,
) -> Option<(Action, &'static str)> {
    if snapshot.rsi < params.rsi_oversold {
        return Some((Action::Buy, "rsi_reversal"));
    }
    if snapshot.rsi > params.rsi_overbought {
        return Some((Action::Sell, "rsi_reversal"));
    }
    None
}
