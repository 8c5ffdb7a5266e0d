extern crate diesel;
extern crate replay_loader;

use self::diesel::pg::PgConnection;
use self::replay_loader::*;

// cargo run --bin load_candles

fn main() {
    env_logger::init();

    println!("{}", "=".repeat(60));
    println!("  NIFTY candle loader: Yahoo Finance -> replay_candles");
    println!("{}", "=".repeat(60));

    let candles = match chart_data::fetch_candles(SYMBOL, YF_TICKER, INTERVAL, DAYS_BACK) {
        Ok(candles) => candles,
        Err(error) => {
            eprintln!("[ERROR] {}", error);
            std::process::exit(1);
        }
    };

    println!("[DB] Connecting to {} ...", strip_credentials(&database_url()));

    let report = {
        let mut connection = connect_or_exit();
        match loader::load_candles(&mut connection, &candles, BATCH_SIZE) {
            Ok(report) => report,
            Err(error) => {
                eprintln!("[ERROR] {}", error);
                std::process::exit(1);
            }
        }
    };

    println!();
    println!("{}", "-".repeat(60));

    let summary = {
        let mut connection = connect_or_exit();
        match verify::candle_summary(&mut connection, SYMBOL) {
            Ok(summary) => summary,
            Err(error) => {
                eprintln!("[ERROR] {}", error);
                std::process::exit(1);
            }
        }
    };

    if let Some(summary) = summary {
        println!("  symbol   : {}", summary.symbol);
        println!("  candles  : {}", summary.candles);
        println!("  earliest : {}", summary.earliest);
        println!("  latest   : {}", summary.latest);
    }

    println!("{}", "-".repeat(60));
    println!(
        "  inserted={}  skipped(duplicates)={}",
        report.inserted, report.skipped
    );
    println!();
    println!("  Ready to replay:");
    println!("  curl -X POST http://localhost:9080/api/v1/market-data/replay/start");
    println!("{}", "=".repeat(60));
}

fn connect_or_exit() -> PgConnection {
    match establish_connection() {
        Ok(connection) => connection,
        Err(error) => {
            eprintln!("[ERROR] DB connection failed: {}", error);
            eprintln!("       Is the dev stack running? docker compose -f docker-compose.dev.yml up -d");
            std::process::exit(1);
        }
    }
}
