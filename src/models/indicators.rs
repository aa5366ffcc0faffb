//! Technical indicators over full price series
//!
//! # Warm-up Convention
//! **CRITICAL**: Every function returns one value per input bar, and bars
//! before an indicator is defined hold `f64::NAN` (not 0.0). The feature
//! builder relies on this to apply its forward-fill → backward-fill → zero
//! policy; returning zeros here would silently change model input.
//!
//! ## Smoothing
//! - EMA seeds with the simple mean of its first `period` values, then uses
//!   `α = 2 / (period + 1)`.
//! - RSI, ATR and ADX use Wilder smoothing seeded by a simple mean.
//! - Standard deviations are population (ddof = 0).

/// Calculate Simple Moving Average for a given period
///
/// A window containing any NaN yields NaN.
///
/// # Arguments
/// * `values` - Input series, oldest first
/// * `period` - Period for the moving average (e.g., 20, 50)
///
/// # Returns
/// * Vector of MA values (first `period - 1` values are NaN)
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut sma = vec![f64::NAN; values.len()];
    if period == 0 {
        return sma;
    }

    for (offset, window) in values.windows(period).enumerate() {
        sma[offset + period - 1] = window.iter().sum::<f64>() / period as f64;
    }

    sma
}

/// Calculate Exponential Moving Average
///
/// Leading NaNs are skipped; the EMA is seeded with the SMA of the first
/// `period` defined values.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut ema = vec![f64::NAN; values.len()];

    if period == 0 {
        return ema;
    }

    let first = match values.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return ema,
    };

    let seed_end = first + period;
    if seed_end > values.len() {
        return ema;
    }

    let seed: f64 = values[first..seed_end].iter().sum::<f64>() / period as f64;
    ema[seed_end - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..values.len() {
        if values[i].is_nan() {
            ema[i] = prev;
            continue;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        ema[i] = prev;
    }

    ema
}

/// Apply Wilder smoothing to a series whose first defined value is at `start`.
///
/// The seed at `start + period - 1` is the simple mean of the first `period`
/// values; afterwards `prev + (x - prev) / period`.
fn wilder_smooth(values: &[f64], start: usize, period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || start + period > values.len() {
        return out;
    }

    let seed_idx = start + period - 1;
    let seed: f64 = values[start..=seed_idx].iter().sum::<f64>() / period as f64;
    out[seed_idx] = seed;

    let n = period as f64;
    let mut prev = seed;
    for i in (seed_idx + 1)..values.len() {
        prev = (prev * (n - 1.0) + values[i]) / n;
        out[i] = prev;
    }
    out
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone)]
pub struct MacdOutput {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Calculate MACD (fast EMA - slow EMA), its signal EMA and histogram
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd, signal);

    let histogram = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdOutput {
        macd,
        signal: signal_line,
        histogram,
    }
}

/// Calculate Relative Strength Index with Wilder smoothing
///
/// # Returns
/// * RSI in [0, 100]; the first `period` values are NaN. A flat window
///   (no gains, no losses) is NaN as well.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut rsi = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return rsi;
    }

    // Changes start at bar 1
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let avg_gain = wilder_smooth(&gains, 1, period);
    let avg_loss = wilder_smooth(&losses, 1, period);

    for i in period..n {
        let total = avg_gain[i] + avg_loss[i];
        if total > 0.0 {
            rsi[i] = 100.0 * avg_gain[i] / total;
        }
    }

    rsi
}

/// Bollinger Bands columns
#[derive(Debug, Clone)]
pub struct BollingerOutput {
    pub lower: Vec<f64>,
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    /// Band width as a percentage of the middle band
    pub bandwidth: Vec<f64>,
    /// Position of close within the bands (0 = lower, 1 = upper)
    pub percent: Vec<f64>,
}

/// Calculate Bollinger Bands with population standard deviation
///
/// # Arguments
/// * `closes` - Closing prices
/// * `period` - Rolling window (20)
/// * `num_std` - Standard-deviation multiplier (2.0)
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerOutput {
    let n = closes.len();
    let middle = calculate_sma(closes, period);
    let mut lower = vec![f64::NAN; n];
    let mut upper = vec![f64::NAN; n];
    let mut bandwidth = vec![f64::NAN; n];
    let mut percent = vec![f64::NAN; n];

    if period == 0 || n < period {
        return BollingerOutput { lower, middle, upper, bandwidth, percent };
    }

    for i in (period - 1)..n {
        let mid = middle[i];
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|c| (c - mid).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        lower[i] = mid - num_std * std;
        upper[i] = mid + num_std * std;

        if mid != 0.0 {
            bandwidth[i] = 100.0 * (upper[i] - lower[i]) / mid;
        }
        let range = upper[i] - lower[i];
        if range != 0.0 {
            percent[i] = (closes[i] - lower[i]) / range;
        }
    }

    BollingerOutput { lower, middle, upper, bandwidth, percent }
}

/// Calculate the stochastic oscillator (%K, %D)
///
/// Raw %K = 100 * (close - lowest low) / (highest high - lowest low) over
/// `k_period` bars; %K is its `smooth_k` SMA and %D the `d_period` SMA of %K.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    smooth_k: usize,
    d_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let n = closes.len();
    let mut raw_k = vec![f64::NAN; n];

    if k_period > 0 && n >= k_period {
        for i in (k_period - 1)..n {
            let start = i + 1 - k_period;
            let highest = highs[start..=i].iter().cloned().fold(f64::MIN, f64::max);
            let lowest = lows[start..=i].iter().cloned().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range > 0.0 {
                raw_k[i] = 100.0 * (closes[i] - lowest) / range;
            }
        }
    }

    let k = calculate_sma(&raw_k, smooth_k);
    let d = calculate_sma(&k, d_period);
    (k, d)
}

/// True range per bar; the first bar uses high - low.
pub fn calculate_true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (0..closes.len())
        .map(|i| {
            if i == 0 {
                highs[0] - lows[0]
            } else {
                let prev_close = closes[i - 1];
                (highs[i] - lows[i])
                    .max((highs[i] - prev_close).abs())
                    .max((lows[i] - prev_close).abs())
            }
        })
        .collect()
}

/// Calculate Average True Range with Wilder smoothing (the `ATRr` variant)
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let tr = calculate_true_range(highs, lows, closes);
    wilder_smooth(&tr, 0, period)
}

/// ADX with its directional indicators
#[derive(Debug, Clone)]
pub struct AdxOutput {
    pub adx: Vec<f64>,
    pub di_plus: Vec<f64>,
    pub di_minus: Vec<f64>,
}

/// Calculate ADX, +DI and -DI with Wilder smoothing
///
/// 1. +DM / -DM and true range from consecutive bars
/// 2. Wilder-smooth all three over `period`
/// 3. DI = 100 * smoothed DM / smoothed TR
/// 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
/// 5. ADX = Wilder-smoothed DX
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> AdxOutput {
    let n = closes.len();
    let mut di_plus = vec![f64::NAN; n];
    let mut di_minus = vec![f64::NAN; n];
    let mut adx = vec![f64::NAN; n];

    if period == 0 || n <= period {
        return AdxOutput { adx, di_plus, di_minus };
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];
        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }
    let tr = calculate_true_range(highs, lows, closes);

    let smoothed_plus = wilder_smooth(&plus_dm, 1, period);
    let smoothed_minus = wilder_smooth(&minus_dm, 1, period);
    let smoothed_tr = wilder_smooth(&tr, 1, period);

    let mut dx = vec![f64::NAN; n];
    for i in period..n {
        if smoothed_tr[i] > 0.0 {
            di_plus[i] = 100.0 * smoothed_plus[i] / smoothed_tr[i];
            di_minus[i] = 100.0 * smoothed_minus[i] / smoothed_tr[i];
        } else {
            di_plus[i] = 0.0;
            di_minus[i] = 0.0;
        }
        let di_sum = di_plus[i] + di_minus[i];
        dx[i] = if di_sum > 0.0 {
            100.0 * (di_plus[i] - di_minus[i]).abs() / di_sum
        } else {
            0.0
        };
    }

    let smoothed_dx = wilder_smooth(&dx, period, period);
    adx.copy_from_slice(&smoothed_dx);

    AdxOutput { adx, di_plus, di_minus }
}

/// Calculate On-Balance Volume
///
/// Cumulative and never reset. The first bar counts as an up bar.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut obv = Vec::with_capacity(closes.len());
    let mut running = 0.0;
    for i in 0..closes.len() {
        let signed = if i == 0 || closes[i] > closes[i - 1] {
            volumes[i]
        } else if closes[i] < closes[i - 1] {
            -volumes[i]
        } else {
            0.0
        };
        running += signed;
        obv.push(running);
    }
    obv
}

/// Calculate session-anchored VWAP
///
/// Accumulates typical price × volume and volume, restarting whenever the
/// session key changes (one key per calendar day). Bars with no accumulated
/// volume yet are NaN.
pub fn calculate_session_vwap<K: PartialEq>(typical: &[f64], volumes: &[f64], sessions: &[K]) -> Vec<f64> {
    let mut vwap = vec![f64::NAN; typical.len()];
    let mut dollar_volume = 0.0;
    let mut cum_volume = 0.0;

    for i in 0..typical.len() {
        if i > 0 && sessions[i] != sessions[i - 1] {
            dollar_volume = 0.0;
            cum_volume = 0.0;
        }
        dollar_volume += typical[i] * volumes[i];
        cum_volume += volumes[i];
        if cum_volume > 0.0 {
            vwap[i] = dollar_volume / cum_volume;
        }
    }

    vwap
}
