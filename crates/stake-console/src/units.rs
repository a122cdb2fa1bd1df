//! Conversion between the ledger's integer base units and its decimal
//! display denomination.
//!
//! Base-unit amounts can exceed the range a double represents exactly, so
//! both directions use `u128` arithmetic only.

use crate::error::{require, EngineError};

/// Base units per display unit, as a power of ten.
pub const BASE_UNIT_DECIMALS: u32 = 18;

const BASE: u128 = 10u128.pow(BASE_UNIT_DECIMALS);

/// Parses a decimal string in the display denomination into base units.
///
/// Accepts plain decimals only: digits with at most one `.`. Signs,
/// exponents, separators, and fractions finer than the base-unit exponent
/// are rejected.
pub fn to_base_units(amount: &str) -> Result<u128, EngineError> {
    let s = amount.trim();
    require!(!s.is_empty(), invalid(amount));

    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };
    require!(!whole.is_empty() || !frac.is_empty(), invalid(amount));
    require!(whole.chars().all(|c| c.is_ascii_digit()), invalid(amount));
    require!(frac.chars().all(|c| c.is_ascii_digit()), invalid(amount));
    require!(frac.len() <= BASE_UNIT_DECIMALS as usize, invalid(amount));

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid(amount))?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<18}").parse().map_err(|_| invalid(amount))?
    };

    whole_units
        .checked_mul(BASE)
        .and_then(|scaled| scaled.checked_add(frac_units))
        .ok_or_else(|| invalid(amount))
}

/// Renders base units as a decimal string in the display denomination.
///
/// Exact inverse of [`to_base_units`]: trailing fractional zeros are
/// trimmed and whole values keep a single `.0`.
pub fn to_display_units(base: u128) -> String {
    let whole = base / BASE;
    let frac = base % BASE;
    if frac == 0 {
        return format!("{whole}.0");
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

fn invalid(amount: &str) -> EngineError {
    EngineError::InvalidAmountFormat(format!("{:?} is not a plain decimal", amount.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(to_base_units("1").unwrap(), BASE);
        assert_eq!(to_base_units("1.0").unwrap(), BASE);
        assert_eq!(to_base_units("0.07").unwrap(), 70_000_000_000_000_000);
        assert_eq!(to_base_units(".5").unwrap(), 500_000_000_000_000_000);
        assert_eq!(to_base_units("2.").unwrap(), 2 * BASE);
        assert_eq!(to_base_units(" 1.5 ").unwrap(), 1_500_000_000_000_000_000);
        assert_eq!(to_base_units("0").unwrap(), 0);
    }

    #[test]
    fn rejects_non_numeric_and_negative_input() {
        for bad in ["", " ", ".", "-1", "+1", "abc", "1.2.3", "1e18", "1,5"] {
            assert!(
                matches!(to_base_units(bad), Err(EngineError::InvalidAmountFormat(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_precision_below_one_base_unit() {
        assert!(to_base_units("0.0000000000000000001").is_err());
    }

    #[test]
    fn rejects_out_of_range_amounts() {
        // Just above u128::MAX once scaled.
        assert!(to_base_units("400000000000000000000.0").is_err());
    }

    #[test]
    fn renders_trimmed_fractions() {
        assert_eq!(to_display_units(0), "0.0");
        assert_eq!(to_display_units(BASE), "1.0");
        assert_eq!(to_display_units(1_070_000_000_000_000_000), "1.07");
        assert_eq!(to_display_units(1), "0.000000000000000001");
    }

    #[test]
    fn round_trips_exactly() {
        let samples = [
            0u128,
            1,
            999,
            70_000_000_000_000_000,
            BASE,
            BASE + 70_000_000_000_000_000,
            123_456_789_012_345_678_901_234_567,
            u128::MAX,
        ];
        for x in samples {
            assert_eq!(to_base_units(&to_display_units(x)).unwrap(), x);
        }
    }
}
