//! Fixed-point amount conversions
//!
//! Every monetary value crosses the contract boundary as an integer scaled
//! by 10^18. User input and display strings are converted here.

use ethers::types::U256;
use ethers::utils::{format_units, parse_units, ParseUnits};

/// Token decimals at the contract boundary (mock USDC uses 18).
pub const DECIMALS: u32 = 18;

/// Parse a user-supplied decimal string into a scaled integer amount.
///
/// Rejects empty, malformed, negative and zero input. The error string is
/// suitable for direct display.
pub fn parse_amount(input: &str) -> Result<U256, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Amount is empty".to_string());
    }
    if trimmed.starts_with('-') {
        return Err(format!("Amount must be positive: {}", trimmed));
    }

    let parsed: ParseUnits =
        parse_units(trimmed, DECIMALS).map_err(|e| format!("Invalid amount {}: {}", trimmed, e))?;

    let value = match parsed {
        ParseUnits::U256(v) => v,
        ParseUnits::I256(_) => return Err(format!("Amount must be positive: {}", trimmed)),
    };

    if value.is_zero() {
        return Err("Amount must be greater than 0".to_string());
    }

    Ok(value)
}

/// Render a scaled integer amount as a decimal string, trailing zeros trimmed.
pub fn format_amount(value: U256) -> String {
    let raw = format_units(value, DECIMALS).unwrap_or_else(|_| value.to_string());
    trim_fraction(&raw)
}

/// Render a basis-points value as a percentage with two decimals,
/// e.g. 825 -> "8.25".
pub fn format_bps(value: U256) -> String {
    let bps = value.low_u64();
    format!("{}.{:02}", bps / 100, bps % 100)
}

fn trim_fraction(s: &str) -> String {
    match s.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int.to_string()
            } else {
                format!("{}.{}", int, frac)
            }
        }
        None => s.to_string(),
    }
}
