use eventide::{Graph, MapFunction, Value, evaluate};
use eventide_mock::fixtures::market;
use tracing_subscriber::fmt::format::FmtSpan;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=eventide=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let closes = market::closes();
    let trades = market::trades();

    // 1. Resample the daily closes onto every trade, then compare the trade
    //    price with the last known close.
    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone())?;
    let t = g.input("trades", trades.schema().clone())?;
    let close = g.select(&c, &["close"])?;
    let at_trade = g.sample(&close, &t)?;
    let premium = g.subtract(&t, &at_trade)?;
    let pct = g.map(
        &premium,
        MapFunction::value(|v| Ok(Value::Float64(v.as_f64().unwrap_or(f64::NAN) / 100.0))),
    )?;
    g.output("premium", &pct)?;

    // 2. Evaluate with the default reference backend.
    let out = evaluate(&g, [("closes", closes), ("trades", trades)], &["premium"])?;

    // 3. Print per symbol.
    for (key, data) in out["premium"].as_ref() {
        println!("{key}: {:?} at {:?}", data.features()[0], data.timestamps());
    }
    Ok(())
}
