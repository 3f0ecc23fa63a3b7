//! Converts free-text recipe durations ("1 hour 30 mins", "45min", "1h 15m")
//! into minutes.

/// A parsed duration in minutes
///
/// `Unbounded` stands for both "no limit" and "unknown": a recipe whose timing
/// cannot be read must never be excluded by a strict time filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Minutes {
    Bounded(u32),
    Unbounded,
}

impl Minutes {
    /// Known minutes, or 0 when unbounded
    pub fn or_zero(self) -> u32 {
        match self {
            Minutes::Bounded(m) => m,
            Minutes::Unbounded => 0,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Minutes::Unbounded)
    }
}

/// Parses a free-text duration.
///
/// Every token starting with a number contributes to the total. Its unit comes
/// from the token's own suffix ("1h", "30min") or else from the following token.
/// Hours are recognised by "hour", "hr" or a bare "h"; anything else counts as
/// minutes. Empty input, unparseable input, a zero total and a total too large
/// to represent all yield [`Minutes::Unbounded`].
pub fn parse(duration: &str) -> Minutes {
    let lowered = duration.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut total = 0.0_f64;
    for (i, token) in tokens.iter().enumerate() {
        let Some((value, suffix)) = leading_number(token) else {
            continue;
        };

        let unit = if suffix.is_empty() {
            tokens.get(i + 1).copied().unwrap_or("")
        } else {
            suffix
        };

        total += if is_hour_unit(unit) { value * 60.0 } else { value };
    }

    let minutes = total.round();
    if minutes <= 0.0 || !minutes.is_finite() || minutes > u32::MAX as f64 {
        Minutes::Unbounded
    } else {
        Minutes::Bounded(minutes as u32)
    }
}

/// Splits a token into its leading numeric value and the rest
fn leading_number(token: &str) -> Option<(f64, &str)> {
    let end = token
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(token.len());

    let value = token[..end].parse::<f64>().ok()?;
    Some((value, &token[end..]))
}

fn is_hour_unit(unit: &str) -> bool {
    let unit = unit.trim_matches(|c: char| !c.is_ascii_alphabetic());
    unit.contains("hour") || unit.contains("hr") || unit == "h"
}
