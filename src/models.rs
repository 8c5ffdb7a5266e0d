use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::replay_candles;

/// One 5-minute OHLCV bar as stored in `replay_candles`.
///
/// `candle_time` is naive UTC; `(symbol, candle_time)` is the primary key.
#[derive(Debug, Clone, PartialEq, Insertable, Queryable)]
#[diesel(table_name = replay_candles)]
pub struct Candle {
    pub symbol: String,
    pub candle_time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}
