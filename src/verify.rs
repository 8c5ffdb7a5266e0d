use chrono::NaiveDateTime;
use diesel::dsl::{count_star, max, min};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Row count and time range stored for one symbol.
#[derive(Debug, PartialEq)]
pub struct CandleSummary {
    pub symbol: String,
    pub candles: i64,
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

/// Reads back what `replay_candles` holds for `symbol_p`, or `None` when the
/// table has no rows for it.
pub fn candle_summary(
    connection: &mut PgConnection,
    symbol_p: &str,
) -> Result<Option<CandleSummary>, Box<dyn std::error::Error>> {
    use crate::schema::replay_candles::dsl::{candle_time, replay_candles, symbol};

    let (candles, earliest, latest) = replay_candles
        .filter(symbol.eq(symbol_p))
        .select((count_star(), min(candle_time), max(candle_time)))
        .first::<(i64, Option<NaiveDateTime>, Option<NaiveDateTime>)>(connection)?;

    match (earliest, latest) {
        (Some(earliest), Some(latest)) => Ok(Some(CandleSummary {
            symbol: symbol_p.to_string(),
            candles,
            earliest,
            latest,
        })),
        _ => Ok(None),
    }
}
