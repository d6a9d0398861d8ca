//! `gwalink generations`: print the keyword processing order.

use anyhow::{Context, Result};
use gwalink_deps::keyword_generations;
use gwalink_schema::{Keyword, Layer};

pub fn run(layer: Layer, json: bool) -> Result<()> {
    let gens = keyword_generations(layer)
        .with_context(|| format!("layering {layer} keywords"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&gens)?);
    } else {
        print!("{}", render(layer, &gens));
    }
    Ok(())
}

fn render(layer: Layer, gens: &[Vec<Keyword>]) -> String {
    let mut out = format!("{} generations ({layer} layer)\n", gens.len());
    for (i, group) in gens.iter().enumerate() {
        let names: Vec<&str> = group.iter().map(|kw| kw.as_str()).collect();
        out.push_str(&format!("  {i}: {}\n", names.join(", ")));
    }
    out
}
