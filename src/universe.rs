// =============================================================================
// Universe Resolution — which tickers the engine evaluates
// =============================================================================
//
// Resolution order:
//   1. SENTINEL_SYMBOLS env var (comma separated) — operator override.
//   2. Remote symbol list (plain text / CSV export from the constituents
//      collaborator), when `universe_url` is configured and reachable.
//   3. The static `symbols` list from the runtime config.
//
// A fetch failure never aborts the run; it falls back to the static list.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::RuntimeConfig;

/// Env var holding a comma-separated symbol override.
pub const SYMBOLS_ENV: &str = "SENTINEL_SYMBOLS";

/// Resolve the ticker universe for this run.
pub async fn resolve_universe(config: &RuntimeConfig) -> Vec<String> {
    if let Ok(raw) = std::env::var(SYMBOLS_ENV) {
        let symbols = parse_symbol_list(&raw);
        if !symbols.is_empty() {
            info!(count = symbols.len(), "universe from {SYMBOLS_ENV} override");
            return symbols;
        }
    }

    if let Some(url) = &config.universe_url {
        match fetch_symbol_list(url).await {
            Ok(symbols) if !symbols.is_empty() => {
                info!(count = symbols.len(), url = %url, "universe from remote list");
                return symbols;
            }
            Ok(_) => warn!(url = %url, "remote universe list was empty — using static list"),
            Err(e) => warn!(url = %url, error = %e, "remote universe fetch failed — using static list"),
        }
    }

    info!(count = config.symbols.len(), "universe from static config");
    config.symbols.clone()
}

/// Fetch and parse a remote plain-text/CSV symbol list.
async fn fetch_symbol_list(url: &str) -> Result<Vec<String>> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build universe HTTP client")?;

    let resp = client
        .get(url)
        .send()
        .await
        .context("universe list request failed")?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("universe endpoint returned {status}");
    }

    let text = resp
        .text()
        .await
        .context("failed to read universe list body")?;

    Ok(parse_symbol_list(&text))
}

/// Parse a symbol list: one or more symbols per line, comma separated,
/// `#` starts a comment. Symbols are upper-cased and de-duplicated while
/// preserving first-seen order.
pub fn parse_symbol_list(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut symbols = Vec::new();

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("");
        for field in line.split(',') {
            let symbol = field.trim().to_uppercase();
            if symbol.is_empty() {
                continue;
            }
            if seen.insert(symbol.clone()) {
                symbols.push(symbol);
            }
        }
    }

    symbols
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comma_separated() {
        assert_eq!(
            parse_symbol_list("aapl, msft,NVDA"),
            vec!["AAPL", "MSFT", "NVDA"]
        );
    }

    #[test]
    fn parse_one_per_line_with_comments() {
        let text = "# S&P export\nAAPL\nMSFT # mega cap\n\nBRK.B\n";
        assert_eq!(parse_symbol_list(text), vec!["AAPL", "MSFT", "BRK.B"]);
    }

    #[test]
    fn parse_dedupes_preserving_order() {
        assert_eq!(
            parse_symbol_list("AAPL,msft\nAAPL\nGOOGL,MSFT"),
            vec!["AAPL", "MSFT", "GOOGL"]
        );
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_symbol_list("").is_empty());
        assert!(parse_symbol_list("# only a comment\n").is_empty());
    }
}
