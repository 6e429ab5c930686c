//! Display units for monetary amounts.

use serde::{Deserialize, Serialize};

/// Unit used to render base-unit amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayUnit {
    /// Whole coins, 8 decimals
    #[default]
    Coin,
    /// Milli-coins, 5 decimals
    Milli,
    /// Micro-coins, 2 decimals
    Micro,
}

impl DisplayUnit {
    /// Number of fractional digits shown.
    #[must_use]
    pub fn decimals(self) -> u32 {
        match self {
            Self::Coin => 8,
            Self::Milli => 5,
            Self::Micro => 2,
        }
    }

    /// Base units per displayed unit.
    #[must_use]
    pub fn factor(self) -> u64 {
        10u64.pow(self.decimals())
    }

    /// Unit label for a ticker, e.g. `mFTC`.
    #[must_use]
    pub fn label(self, ticker: &str) -> String {
        match self {
            Self::Coin => ticker.to_string(),
            Self::Milli => format!("m{ticker}"),
            Self::Micro => format!("µ{ticker}"),
        }
    }

    /// Parse a unit name as used in configuration and environment overrides.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coin" => Some(Self::Coin),
            "milli" => Some(Self::Milli),
            "micro" => Some(Self::Micro),
            _ => None,
        }
    }

    /// Render a signed base-unit amount with fixed decimals.
    ///
    /// With `plus_sign`, positive amounts carry a leading `+`.
    #[must_use]
    pub fn format(self, amount: i64, plus_sign: bool) -> String {
        let magnitude = amount.unsigned_abs();
        let factor = self.factor();
        let whole = magnitude / factor;
        let fraction = magnitude % factor;
        let sign = if amount < 0 {
            "-"
        } else if amount > 0 && plus_sign {
            "+"
        } else {
            ""
        };
        format!(
            "{sign}{whole}.{fraction:0width$}",
            width = self.decimals() as usize
        )
    }

    /// Render with the unit label appended.
    #[must_use]
    pub fn format_with_label(self, amount: i64, ticker: &str, plus_sign: bool) -> String {
        format!("{} {}", self.format(amount, plus_sign), self.label(ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coin() {
        assert_eq!(DisplayUnit::Coin.format(150_000_000, false), "1.50000000");
        assert_eq!(DisplayUnit::Coin.format(150_000_000, true), "+1.50000000");
        assert_eq!(DisplayUnit::Coin.format(-1, true), "-0.00000001");
        assert_eq!(DisplayUnit::Coin.format(0, true), "0.00000000");
    }

    #[test]
    fn test_format_smaller_units() {
        assert_eq!(DisplayUnit::Milli.format(150_000_000, false), "1500.00000");
        assert_eq!(DisplayUnit::Micro.format(-123_456, false), "-1234.56");
    }

    #[test]
    fn test_format_extremes_do_not_overflow() {
        assert_eq!(
            DisplayUnit::Coin.format(i64::MIN, false),
            "-92233720368.54775808"
        );
    }

    #[test]
    fn test_labels_and_parse() {
        assert_eq!(DisplayUnit::Milli.label("FTC"), "mFTC");
        assert_eq!(
            DisplayUnit::Coin.format_with_label(100_000_000, "FTC", false),
            "1.00000000 FTC"
        );
        assert_eq!(DisplayUnit::parse(" Micro "), Some(DisplayUnit::Micro));
        assert_eq!(DisplayUnit::parse("satoshi"), None);
    }
}
