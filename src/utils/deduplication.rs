//! Bar ordering and deduplication
//!
//! Providers occasionally return overlapping or out-of-order rows (a
//! partial last bar repeated with a newer value, for example). Everything
//! downstream assumes strictly ascending, unique timestamps.

use crate::models::Ohlcv;

/// Sort bars by time and drop duplicate timestamps, keeping the last
/// occurrence of each.
pub fn sort_and_dedup(bars: Vec<Ohlcv>) -> Vec<Ohlcv> {
    let mut indexed: Vec<(usize, Ohlcv)> = bars.into_iter().enumerate().collect();
    // Stable on time, later input position wins ties below
    indexed.sort_by(|(ia, a), (ib, b)| a.time.cmp(&b.time).then(ia.cmp(ib)));

    let mut result: Vec<Ohlcv> = Vec::with_capacity(indexed.len());
    for (_, bar) in indexed {
        match result.last_mut() {
            Some(prev) if prev.time == bar.time => *prev = bar,
            _ => result.push(bar),
        }
    }
    result
}

/// Whether timestamps are strictly ascending
pub fn is_strictly_ascending(bars: &[Ohlcv]) -> bool {
    bars.windows(2).all(|w| w[0].time < w[1].time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(day: i64, close: f64) -> Ohlcv {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        Ohlcv::new(t, close, close, close, close, 100)
    }

    #[test]
    fn test_sort_and_dedup_keeps_last() {
        let bars = vec![bar(2, 3.0), bar(0, 1.0), bar(1, 2.0), bar(2, 30.0), bar(0, 10.0)];
        let result = sort_and_dedup(bars);

        assert_eq!(result.len(), 3);
        assert!(is_strictly_ascending(&result));
        assert_eq!(result[0].close, 10.0);
        assert_eq!(result[1].close, 2.0);
        assert_eq!(result[2].close, 30.0);
    }

    #[test]
    fn test_is_strictly_ascending() {
        assert!(is_strictly_ascending(&[]));
        assert!(is_strictly_ascending(&[bar(0, 1.0), bar(1, 1.0)]));
        assert!(!is_strictly_ascending(&[bar(1, 1.0), bar(1, 1.0)]));
        assert!(!is_strictly_ascending(&[bar(1, 1.0), bar(0, 1.0)]));
    }
}
