// =============================================================================
// Market Session — is the exchange open right now?
// =============================================================================
//
// The session is expressed as UTC wall-clock open/close times plus a
// weekday check.  Exchange holidays are not modelled; a run on a holiday
// fetches data, finds no new bar, and places nothing.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};

use crate::config::SessionParams;

/// Parsed session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSession {
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketSession {
    /// Parse "HH:MM" open/close strings from the config.
    pub fn from_params(params: &SessionParams) -> Result<Self> {
        let open = NaiveTime::parse_from_str(&params.open_utc, "%H:%M")
            .with_context(|| format!("invalid session open time {:?}", params.open_utc))?;
        let close = NaiveTime::parse_from_str(&params.close_utc, "%H:%M")
            .with_context(|| format!("invalid session close time {:?}", params.close_utc))?;
        if open >= close {
            anyhow::bail!(
                "session open {} must precede close {}",
                params.open_utc,
                params.close_utc
            );
        }
        Ok(Self { open, close })
    }

    /// Whether `now` falls inside the trading session (inclusive bounds,
    /// weekdays only).
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        match now.weekday() {
            Weekday::Sat | Weekday::Sun => return false,
            _ => {}
        }
        let t = now.time();
        t >= self.open && t <= self.close
    }
}
