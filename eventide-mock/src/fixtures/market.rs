use chrono::{NaiveDate, NaiveDateTime};
use eventide_core::EventSet;
use eventide_core::normalize::RawArray;

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .and_then(|date| date.and_hms_opt(21, 0, 0))
        .expect("valid fixture date")
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .and_then(|date| date.and_hms_opt(h, m, 0))
        .expect("valid fixture time")
}

/// Daily closing prices, indexed by `symbol`, three sessions each.
///
/// Features: `close` (`FLOAT64`), `volume` (`INT64`).
#[must_use]
pub fn closes() -> EventSet {
    let rows = [
        ("AAPL", 2, 190.0, 1_000_i64),
        ("AAPL", 3, 191.0, 2_000),
        ("AAPL", 4, 192.0, 3_000),
        ("MSFT", 2, 420.0, 1_000),
        ("MSFT", 3, 421.0, 2_000),
        ("MSFT", 4, 422.0, 3_000),
    ];
    let ts = rows.iter().map(|r| Some(day(r.1))).collect();
    let symbol: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let close: Vec<f64> = rows.iter().map(|r| r.2).collect();
    let volume: Vec<i64> = rows.iter().map(|r| r.3).collect();
    eventide_core::event_set(
        RawArray::DateTime(ts),
        [
            ("symbol", RawArray::from(symbol)),
            ("close", RawArray::from(close)),
            ("volume", RawArray::from(volume)),
        ],
        &["symbol"],
        None,
    )
    .expect("closes fixture is well formed")
}

/// Intraday trades, indexed by `symbol`, unevenly spaced.
///
/// The first `AAPL` trade precedes every close, so sampling the closes onto
/// these trades leaves it with missing values.
///
/// Features: `price` (`FLOAT64`).
#[must_use]
pub fn trades() -> EventSet {
    let rows = [
        ("AAPL", at(2, 15, 30), 189.5),
        ("AAPL", at(3, 10, 0), 190.2),
        ("AAPL", at(3, 14, 45), 190.8),
        ("MSFT", at(3, 11, 15), 419.0),
    ];
    eventide_core::event_set(
        RawArray::DateTime(rows.iter().map(|r| Some(r.1)).collect()),
        [
            ("symbol", RawArray::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            ("price", RawArray::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        ],
        &["symbol"],
        None,
    )
    .expect("trades fixture is well formed")
}
