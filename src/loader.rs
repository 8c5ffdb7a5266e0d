use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::models::Candle;

/// Outcome of one load run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl LoadReport {
    fn record(&mut self, rows_affected: usize) {
        if rows_affected > 0 {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Upserts `candles` into `replay_candles`, committing every `batch_size`
/// rows. Rows already present keep their stored values and count as skipped.
pub fn load_candles(
    connection: &mut PgConnection,
    candles: &[Candle],
    batch_size: usize,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let mut report = LoadReport::default();
    let total = candles.len();
    let mut done = 0;

    for batch in candles.chunks(batch_size) {
        connection.transaction::<_, diesel::result::Error, _>(|connection| {
            for candle in batch {
                match insert_candle(connection, candle) {
                    Ok(rows_affected) => report.record(rows_affected),
                    Err(error) => {
                        println!("[WARN] Skipped row {}: {}", candle.candle_time, error);
                        report.skipped += 1;
                    }
                }
            }
            Ok(())
        })?;

        done += batch.len();
        println!(
            "  Progress: {}/{} ({:.0}%)  inserted={}  skipped={}",
            done,
            total,
            done as f64 / total as f64 * 100.0,
            report.inserted,
            report.skipped
        );
    }

    Ok(report)
}

fn insert_candle(
    connection: &mut PgConnection,
    candle: &Candle,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::replay_candles::dsl::{candle_time, replay_candles, symbol};

    diesel::insert_into(replay_candles)
        .values(candle)
        .on_conflict((symbol, candle_time))
        .do_nothing()
        .execute(connection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_fresh_rows_as_inserted() {
        let mut report = LoadReport::default();

        report.record(1);
        report.record(1);
        report.record(1);

        assert_eq!(
            report,
            LoadReport {
                inserted: 3,
                skipped: 0
            }
        );
    }

    #[test]
    fn counts_conflicts_as_skipped() {
        let mut report = LoadReport::default();

        for i in 0..500 {
            // an upsert that hits an existing row reports zero affected rows
            report.record(if i % 50 == 0 { 0 } else { 1 });
        }

        assert_eq!(
            report,
            LoadReport {
                inserted: 490,
                skipped: 10
            }
        );
    }
}
