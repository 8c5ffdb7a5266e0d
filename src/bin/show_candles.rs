extern crate diesel;
extern crate replay_loader;

use self::diesel::prelude::*;
use self::replay_loader::models::*;
use self::replay_loader::*;

// cargo run --bin show_candles

fn main() {
    use replay_loader::schema::replay_candles::dsl::*;

    env_logger::init();

    let connection = &mut establish_connection().expect("Error connecting to database");
    let results = replay_candles
        .filter(symbol.eq(SYMBOL))
        .order(candle_time.desc())
        .limit(20)
        .load::<Candle>(connection)
        .expect("Error loading candles");

    println!("Displaying {} candles", results.len());
    for candle in results {
        println!(
            "{}  o:{:.2} h:{:.2} l:{:.2} c:{:.2} vol:{}",
            candle.candle_time, candle.open, candle.high, candle.low, candle.close, candle.volume
        );
    }
}
