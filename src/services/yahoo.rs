//! Yahoo Finance chart API client
//!
//! `GET {base}/v8/finance/chart/{symbol}?range=..&interval=..&events=div,split`
//!
//! Prices are split/dividend adjusted: when the payload carries `adjclose`,
//! open/high/low/close are scaled by `adjclose / close`. The exchange
//! timezone from `meta.exchangeTimezoneName` travels with the bars.

use crate::error::{AppError, Result};
use crate::models::{provider_symbol, Ohlcv, PriceHistory, Timeframe, BASE_COLUMNS};
use crate::services::price_history::PriceHistoryProvider;
use crate::utils::deduplication::sort_and_dedup;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<HashMap<String, Option<Vec<Option<f64>>>>>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooFinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "Invalid YAHOO_BASE_URL: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Created Yahoo Finance client");
        Ok(Self { base_url, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(&self, ticker: &str, timeframe: Timeframe) -> Result<PriceHistory> {
        let symbol = provider_symbol(ticker);
        let url = self.chart_url(&symbol);

        debug!(
            symbol = %symbol,
            range = timeframe.provider_range(),
            interval = timeframe.provider_interval(),
            "Fetching price history"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", timeframe.provider_range()),
                ("interval", timeframe.provider_interval()),
                ("events", "div,split"),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamProvider(format!("Request for {} failed: {}", symbol, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamProvider(format!("Failed to read response body: {}", e)))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::EmptyHistory(symbol));
        }
        if !status.is_success() {
            return Err(AppError::UpstreamProvider(format!(
                "Yahoo Finance returned status {} for {}",
                status, symbol
            )));
        }

        let history = parse_chart_response(&symbol, &body)?;
        info!(
            symbol = %symbol,
            bars = history.bars.len(),
            timezone = ?history.timezone,
            "Fetched price history"
        );
        Ok(history)
    }
}

/// Parse a chart API body into adjusted, sorted, de-duplicated bars.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<PriceHistory> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::UpstreamProvider(format!("Invalid chart payload for {}: {}", symbol, e)))?;

    if let Some(err) = envelope.chart.error {
        let code = err.code.unwrap_or_default();
        let description = err.description.unwrap_or_default();
        if code.eq_ignore_ascii_case("Not Found") {
            return Err(AppError::EmptyHistory(symbol.to_string()));
        }
        return Err(AppError::UpstreamProvider(format!("{}: {} {}", symbol, code, description)));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(AppError::EmptyHistory(symbol.to_string()));
    };
    if result.timestamp.is_empty() {
        return Err(AppError::EmptyHistory(symbol.to_string()));
    }

    let timezone = result
        .meta
        .and_then(|meta| meta.exchange_timezone_name)
        .and_then(|name| exchange_timezone(symbol, &name));

    let indicators = result
        .indicators
        .ok_or_else(|| AppError::UpstreamProvider(format!("{}: payload has no indicators", symbol)))?;
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::UpstreamProvider(format!("{}: payload has no quote block", symbol)))?;

    let mut quote: HashMap<String, Vec<Option<f64>>> = quote
        .into_iter()
        .filter_map(|(name, values)| values.map(|v| (name.to_lowercase(), v)))
        .collect();
    if let Some(missing) = BASE_COLUMNS.iter().find(|c| !quote.contains_key(**c)) {
        return Err(AppError::MissingColumn(missing.to_string()));
    }
    let mut take = |name: &str| quote.remove(name).unwrap_or_default();
    let opens = take("open");
    let highs = take("high");
    let lows = take("low");
    let closes = take("close");
    let volumes = take("volume");

    let adjcloses = indicators.adjclose.into_iter().next().map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped = 0usize;

    for (i, ts) in result.timestamp.iter().enumerate() {
        let row = (
            at(&opens, i),
            at(&highs, i),
            at(&lows, i),
            at(&closes, i),
            at(&volumes, i),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            dropped += 1;
            continue;
        };
        let Some(time) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            dropped += 1;
            continue;
        };

        let factor = adjcloses
            .as_ref()
            .and_then(|a| at(a, i))
            .filter(|_| close != 0.0)
            .map(|adj| adj / close)
            .unwrap_or(1.0);

        let bar = Ohlcv::new(
            time,
            open * factor,
            high * factor,
            low * factor,
            close * factor,
            volume.max(0.0).round() as u64,
        )
        .with_symbol(symbol);
        if !bar.is_consistent() {
            dropped += 1;
            continue;
        }
        bars.push(bar);
    }

    if dropped > 0 {
        warn!(symbol = %symbol, dropped, "Dropped bars with missing or inconsistent fields");
    }

    let bars = sort_and_dedup(bars);
    if bars.is_empty() {
        return Err(AppError::EmptyHistory(symbol.to_string()));
    }
    Ok(PriceHistory::new(bars).with_timezone(timezone))
}

fn exchange_timezone(symbol: &str, name: &str) -> Option<Tz> {
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(e) => {
            warn!(symbol = %symbol, timezone = %name, error = %e, "Unknown exchange timezone, using market default");
            None
        }
    }
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten().filter(|v| v.is_finite())
}
