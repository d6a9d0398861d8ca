//! `gwalink keywords`: describe the keyword catalogue.

use anyhow::Result;
use gwalink_schema::{Keyword, Layer};

pub fn run(layer: Option<Layer>) -> Result<()> {
    print!("{}", render(layer));
    Ok(())
}

fn layers_of(kw: Keyword) -> &'static str {
    match (kw.in_layer(Layer::Design), kw.in_layer(Layer::Analysis)) {
        (true, true) => "both",
        (true, false) => "design",
        (false, true) => "analysis",
        (false, false) => "-",
    }
}

fn render(layer: Option<Layer>) -> String {
    let keywords = match layer {
        Some(layer) => Keyword::in_layer_all(layer),
        None => Keyword::ALL.to_vec(),
    };
    let mut out = String::new();
    for kw in keywords {
        let refs: Vec<&str> = kw.references().iter().map(|r| r.as_str()).collect();
        out.push_str(&format!(
            "{:<16} {:<7} {:<9} {}\n",
            kw.as_str(),
            kw.set_command().as_str(),
            layers_of(kw),
            refs.join(" ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_catalogue_has_one_line_per_keyword() {
        assert_eq!(render(None).lines().count(), Keyword::ALL.len());
    }

    #[test]
    fn layer_filter_drops_other_layer() {
        let text = render(Some(Layer::Design));
        assert!(text.lines().any(|l| l.starts_with("MEMB ")));
        assert!(!text.lines().any(|l| l.starts_with("EL ")));
    }

    #[test]
    fn line_shows_set_command_and_references() {
        let text = render(None);
        let line = text
            .lines()
            .find(|l| l.starts_with("LOAD_2D_THERMAL"))
            .unwrap();
        assert!(line.contains("SET_AT"));
        assert!(line.ends_with("MEMB EL LOAD_TITLE"));
        assert_eq!(layers_of(Keyword::Rigid), "analysis");
    }
}
