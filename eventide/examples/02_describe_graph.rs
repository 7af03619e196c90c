use eventide::{Graph, GraphDescription};
use eventide_mock::fixtures::market;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let closes = market::closes();

    let mut g = Graph::new();
    let c = g.input("closes", closes.schema().clone())?;
    let avg = g.moving_average(&c, 3.0 * 86_400.0)?;
    g.set_name(avg.node, "three_day_mean")?;
    let lagged = g.lag(&avg, 86_400.0)?;
    g.output("tomorrow", &lagged)?;

    // The description is plain data: print it, store it, diff it.
    let json = serde_json::to_string_pretty(&g.describe())?;
    println!("{json}");

    let parsed: GraphDescription = serde_json::from_str(&json)?;
    println!("{} nodes, outputs: {:?}", parsed.nodes.len(), parsed.outputs.keys().collect::<Vec<_>>());
    Ok(())
}
