use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::models::Candle;

const API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
// Yahoo rejects requests without a browser User-Agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

/// Downloads the last `days_back` days of intraday candles for `ticker`.
///
/// Yahoo caps intraday history at 60 days, so `days_back` should stay below
/// that.
pub fn fetch_candles(
    symbol: &str,
    ticker: &str,
    interval: &str,
    days_back: i64,
) -> Result<Vec<Candle>, Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECONDS))
        .user_agent(USER_AGENT)
        .build()?;

    let end = Utc::now();
    let start = end - chrono::Duration::days(days_back);

    println!(
        "[Yahoo] Fetching {} {} candles from {} to {} ...",
        ticker,
        interval,
        start.date_naive(),
        end.date_naive()
    );

    let url = format!("{}/{}", API_URL, ticker);
    log::debug!(
        "GET {}?interval={}&period1={}&period2={}",
        url,
        interval,
        start.timestamp(),
        end.timestamp()
    );

    let response = client
        .get(&url)
        .query(&[
            ("interval", interval.to_string()),
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
        ])
        .send()?;

    if !response.status().is_success() {
        return Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Request not successful: {}", response.status()),
        )));
    }

    let chart = response.json::<ChartResponse>()?;
    let candles = chart_to_candles(symbol, chart)?;

    match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => println!(
            "[Yahoo] Fetched {} candles. Range: {} -> {}",
            candles.len(),
            first.candle_time,
            last.candle_time
        ),
        _ => println!("[Yahoo] Fetched 0 candles."),
    }

    Ok(candles)
}

/// Flattens a chart response into candles, stamped with `symbol` and sorted
/// by time. Rows with a missing price are dropped.
pub fn chart_to_candles(
    symbol: &str,
    response: ChartResponse,
) -> Result<Vec<Candle>, Box<dyn std::error::Error>> {
    let error_message = match &response.chart.error {
        Some(error) => format!("{}: {}", error.code, error.description),
        None => "Yahoo Finance returned no data. Check ticker or internet connection.".to_string(),
    };

    let data = match response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    {
        Some(data) => data,
        None => return Err(no_data_error(&error_message)),
    };

    let timestamps = match data.timestamp {
        Some(timestamps) if !timestamps.is_empty() => timestamps,
        _ => return Err(no_data_error(&error_message)),
    };

    let quote = match data.indicators.quote.into_iter().next() {
        Some(quote) => quote,
        None => return Err(no_data_error(&error_message)),
    };

    let mut candles: Vec<Candle> = vec![];

    for (i, &ts) in timestamps.iter().enumerate() {
        // pre-open and half-formed rows come back with null prices
        let (open, high, low, close) = match (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) {
            (Some(open), Some(high), Some(low), Some(close)) => (open, high, low, close),
            _ => continue,
        };

        // epoch seconds are UTC; replay_candles stores naive UTC timestamps
        let candle_time = match DateTime::from_timestamp(ts, 0) {
            Some(datetime) => datetime.naive_utc(),
            None => continue,
        };

        // Yahoo sometimes returns volume as a float
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0) as i64;

        candles.push(Candle {
            symbol: symbol.to_string(),
            candle_time,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    candles.sort_by_key(|candle| candle.candle_time);

    Ok(candles)
}

fn no_data_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        message.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // three 5m slots on 2024-01-02, deliberately out of order
    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"exchangeTimezoneName": "Asia/Kolkata"},
                "timestamp": [1704167100, 1704166800, 1704167400],
                "indicators": {
                    "quote": [{
                        "open":   [21727.75, 21720.1, null],
                        "high":   [21737.6,  21729.0, 21745.0],
                        "low":    [21722.2,  21715.35, 21738.1],
                        "close":  [21731.4,  21727.65, 21741.9],
                        "volume": [null, 350.9, 61200]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn sample_candles() -> Vec<Candle> {
        let response: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        chart_to_candles("NIFTY50", response).unwrap()
    }

    #[test]
    fn drops_rows_with_missing_prices() {
        let candles = sample_candles();

        // the 03:50 slot has a null open and must not survive
        assert_eq!(candles.len(), 2);
        assert!(candles.iter().all(|c| c.symbol == "NIFTY50"));
    }

    #[test]
    fn sorts_ascending_and_converts_epoch_to_naive_utc() {
        let candles = sample_candles();

        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 40, 0)
            .unwrap();
        assert_eq!(candles[0].candle_time, expected);
        assert!(candles[0].candle_time < candles[1].candle_time);
    }

    #[test]
    fn coerces_null_and_fractional_volume() {
        let candles = sample_candles();

        // 03:40 slot carries 350.9, 03:45 slot carries null
        assert_eq!(candles[0].volume, 350);
        assert_eq!(candles[1].volume, 0);
    }

    #[test]
    fn reports_provider_error() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();

        let error = chart_to_candles("NIFTY50", response).unwrap_err();
        assert!(error.to_string().contains("No data found"));
    }

    #[test]
    fn empty_timestamps_count_as_no_data() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": {"quote": [{
                        "open": [], "high": [], "low": [], "close": [], "volume": []
                    }]}
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();

        let error = chart_to_candles("NIFTY50", response).unwrap_err();
        assert!(error.to_string().contains("no data"));
    }

    #[test]
    fn all_rows_dropped_is_not_an_error() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704166800],
                    "indicators": {"quote": [{
                        "open": [null], "high": [null], "low": [null],
                        "close": [null], "volume": [null]
                    }]}
                }],
                "error": null
            }
        }"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();

        let candles = chart_to_candles("NIFTY50", response).unwrap();
        assert!(candles.is_empty());
    }
}
