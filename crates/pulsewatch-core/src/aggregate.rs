//! Reduction of a statewise payload into the figures shown in a notification.

use serde::{Deserialize, Serialize};

use crate::record::RegionRecord;

/// Day-over-day changes, read from the aggregate row only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deltas {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

/// Totals summed over the per-region rows plus the aggregate row's deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSnapshot {
    pub confirmed: i64,
    pub active: i64,
    pub recoveries: i64,
    pub deaths: i64,
    pub deltas: Deltas,
}

/// Reduce `rows` into an [`AggregatedSnapshot`].
///
/// Row 0 contributes only its delta columns; rows 1.. contribute their counts.
/// Totals saturate at the `i64` bounds.
/// Returns `None` for an empty slice, since there is no aggregate row to read.
pub fn aggregate(rows: &[RegionRecord]) -> Option<AggregatedSnapshot> {
    let (head, regions) = rows.split_first()?;

    let mut snapshot = AggregatedSnapshot {
        deltas: Deltas {
            confirmed: parse_count(&head.deltaconfirmed),
            deaths: parse_count(&head.deltadeaths),
            recovered: parse_count(&head.deltarecovered),
        },
        ..Default::default()
    };

    for row in regions {
        snapshot.confirmed = snapshot.confirmed.saturating_add(parse_count(&row.confirmed));
        snapshot.active = snapshot.active.saturating_add(parse_count(&row.active));
        snapshot.recoveries = snapshot.recoveries.saturating_add(parse_count(&row.recovered));
        snapshot.deaths = snapshot.deaths.saturating_add(parse_count(&row.deaths));
    }

    Some(snapshot)
}

/// Parse a count column.
///
/// Takes an optional sign and the leading ASCII digits after trimming, so
/// `"12"`, `" 12 "` and `"12 (est.)"` all yield 12. Anything without leading
/// digits yields 0.
pub fn parse_count(s: &str) -> i64 {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().unwrap_or(0);

    if negative { -value } else { value }
}
