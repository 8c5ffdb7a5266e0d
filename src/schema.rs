diesel::table! {
    replay_candles (symbol, candle_time) {
        symbol -> Varchar,
        candle_time -> Timestamp,
        open -> Float8,
        high -> Float8,
        low -> Float8,
        close -> Float8,
        volume -> Int8,
    }
}
