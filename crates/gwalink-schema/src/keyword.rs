//! The keyword catalogue.
//!
//! Every native record kind is identified by a GWA keyword. Each keyword owns
//! an independent index space and carries static metadata: how its records
//! are written back (`SET` or `SET_AT`), which model layers it belongs to and
//! which other keywords its records reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// How records of a keyword are written back to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetCommand {
    /// `SET`: the index is a free identity.
    Set,
    /// `SET_AT`: the index is a position in an ordered list.
    SetAt,
}

impl SetCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetCommand::Set => "SET",
            SetCommand::SetAt => "SET_AT",
        }
    }
}

/// A model layer of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    /// Members and design-level entities.
    Design,
    /// Elements and analysis-level entities.
    Analysis,
    /// Union of both layers.
    Both,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Design => write!(f, "design"),
            Layer::Analysis => write!(f, "analysis"),
            Layer::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "design" => Ok(Layer::Design),
            "analysis" => Ok(Layer::Analysis),
            "both" => Ok(Layer::Both),
            other => Err(format!(
                "unknown layer '{other}' (expected design, analysis or both)"
            )),
        }
    }
}

/// A native record type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Keyword {
    // Definitions
    Axis,
    PropMass,
    PropSpr,
    MatSteel,
    MatConcrete,
    MatAnal,
    Section,
    Prop2d,

    // Cases and tasks
    LoadTitle,
    Task,
    Anal,
    Combination,

    // Geometry
    Node,
    El,
    Memb,
    Assembly,
    Rigid,
    GenRest,

    // Grids
    GridPlane,
    GridSurface,
    GridLine,
    Polyline,
    Align,
    Path,

    // Influence
    InfNode,
    InfBeam,

    // Loading
    LoadNode,
    LoadBeam,
    Load2dFace,
    Load2dThermal,
    LoadGridArea,
    LoadGridLine,
    LoadGravity,
}

/// Static metadata of one keyword.
#[derive(Debug, Clone, Copy)]
struct KeywordInfo {
    name: &'static str,
    set_command: SetCommand,
    design: bool,
    analysis: bool,
    references: &'static [Keyword],
}

const fn set(
    name: &'static str,
    design: bool,
    analysis: bool,
    references: &'static [Keyword],
) -> KeywordInfo {
    KeywordInfo {
        name,
        set_command: SetCommand::Set,
        design,
        analysis,
        references,
    }
}

const fn set_at(name: &'static str, references: &'static [Keyword]) -> KeywordInfo {
    KeywordInfo {
        name,
        set_command: SetCommand::SetAt,
        design: true,
        analysis: true,
        references,
    }
}

impl Keyword {
    /// Every keyword, in catalogue order.
    pub const ALL: [Keyword; 33] = [
        Keyword::Axis,
        Keyword::PropMass,
        Keyword::PropSpr,
        Keyword::MatSteel,
        Keyword::MatConcrete,
        Keyword::MatAnal,
        Keyword::Section,
        Keyword::Prop2d,
        Keyword::LoadTitle,
        Keyword::Task,
        Keyword::Anal,
        Keyword::Combination,
        Keyword::Node,
        Keyword::El,
        Keyword::Memb,
        Keyword::Assembly,
        Keyword::Rigid,
        Keyword::GenRest,
        Keyword::GridPlane,
        Keyword::GridSurface,
        Keyword::GridLine,
        Keyword::Polyline,
        Keyword::Align,
        Keyword::Path,
        Keyword::InfNode,
        Keyword::InfBeam,
        Keyword::LoadNode,
        Keyword::LoadBeam,
        Keyword::Load2dFace,
        Keyword::Load2dThermal,
        Keyword::LoadGridArea,
        Keyword::LoadGridLine,
        Keyword::LoadGravity,
    ];

    fn info(self) -> KeywordInfo {
        use Keyword::*;
        match self {
            Axis => set("AXIS", true, true, &[]),
            PropMass => set("PROP_MASS", true, true, &[]),
            PropSpr => set("PROP_SPR", true, true, &[Axis]),
            MatSteel => set("MAT_STEEL", true, true, &[]),
            MatConcrete => set("MAT_CONCRETE", true, true, &[]),
            MatAnal => set("MAT_ANAL", true, true, &[]),
            Section => set("SECTION", true, true, &[MatSteel, MatConcrete]),
            Prop2d => set("PROP_2D", true, true, &[Axis, MatSteel, MatConcrete, MatAnal]),
            LoadTitle => set("LOAD_TITLE", true, true, &[]),
            Task => set("TASK", true, true, &[]),
            Anal => set("ANAL", true, true, &[Task, LoadTitle]),
            Combination => set("COMBINATION", true, true, &[Anal]),
            Node => set("NODE", true, true, &[Axis, PropMass, PropSpr]),
            El => set("EL", false, true, &[Node, Section, Prop2d, PropSpr, PropMass]),
            Memb => set("MEMB", true, false, &[Node, PropSpr, Section, Prop2d]),
            Assembly => set("ASSEMBLY", true, true, &[Node, Memb, El]),
            Rigid => set("RIGID", false, true, &[Node]),
            GenRest => set("GEN_REST", true, true, &[Node]),
            GridPlane => set("GRID_PLANE", true, true, &[Axis]),
            GridSurface => set("GRID_SURFACE", true, true, &[GridPlane, Memb, El]),
            GridLine => set("GRID_LINE", true, true, &[]),
            Polyline => set("POLYLINE", true, true, &[GridPlane]),
            Align => set("ALIGN", true, true, &[GridSurface]),
            Path => set("PATH", true, true, &[Align]),
            InfNode => set("INF_NODE", true, true, &[Node, Axis]),
            InfBeam => set("INF_BEAM", false, true, &[El]),
            LoadNode => set_at("LOAD_NODE", &[Node, LoadTitle, Axis]),
            LoadBeam => set_at("LOAD_BEAM", &[Memb, El, LoadTitle, Axis]),
            Load2dFace => set_at("LOAD_2D_FACE", &[Memb, El, LoadTitle, Axis]),
            Load2dThermal => set_at("LOAD_2D_THERMAL", &[Memb, El, LoadTitle]),
            LoadGridArea => set_at("LOAD_GRID_AREA", &[GridSurface, LoadTitle, Polyline, Axis]),
            LoadGridLine => set_at("LOAD_GRID_LINE", &[GridSurface, LoadTitle, Polyline, Axis]),
            LoadGravity => set_at("LOAD_GRAVITY", &[Node, Memb, El, LoadTitle]),
        }
    }

    /// The GWA keyword text, e.g. `"LOAD_2D_THERMAL"`.
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    pub fn set_command(self) -> SetCommand {
        self.info().set_command
    }

    /// Keywords whose indices appear in records of this keyword.
    pub fn references(self) -> &'static [Keyword] {
        self.info().references
    }

    /// Whether this keyword is part of the given model layer.
    pub fn in_layer(self, layer: Layer) -> bool {
        let info = self.info();
        match layer {
            Layer::Design => info.design,
            Layer::Analysis => info.analysis,
            Layer::Both => info.design || info.analysis,
        }
    }

    /// All keywords belonging to a layer, in catalogue order.
    pub fn in_layer_all(layer: Layer) -> Vec<Keyword> {
        Self::ALL
            .iter()
            .copied()
            .filter(|kw| kw.in_layer(layer))
            .collect()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // GWA keywords may carry a version suffix, e.g. "MEMB.8"
        let bare = s.trim().split('.').next().unwrap_or_default();
        Self::ALL
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(bare))
            .ok_or_else(|| RecordError::UnknownKeyword(s.to_string()))
    }
}

impl From<Keyword> for &'static str {
    fn from(kw: Keyword) -> Self {
        kw.as_str()
    }
}

impl TryFrom<String> for Keyword {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kw in Keyword::ALL {
            assert_eq!(kw.as_str().parse::<Keyword>().unwrap(), kw);
        }
    }

    #[test]
    fn parse_accepts_version_suffix_and_case() {
        assert_eq!("MEMB.8".parse::<Keyword>().unwrap(), Keyword::Memb);
        assert_eq!("load_2d_thermal".parse::<Keyword>().unwrap(), Keyword::Load2dThermal);
        assert!(matches!(
            "BOGUS".parse::<Keyword>(),
            Err(RecordError::UnknownKeyword(name)) if name == "BOGUS"
        ));
    }

    #[test]
    fn serde_uses_gwa_name() {
        let json = serde_json::to_string(&Keyword::Prop2d).unwrap();
        assert_eq!(json, "\"PROP_2D\"");
        let kw: Keyword = serde_json::from_str("\"GRID_SURFACE\"").unwrap();
        assert_eq!(kw, Keyword::GridSurface);
        assert!(serde_json::from_str::<Keyword>("\"NOPE\"").is_err());
    }

    #[test]
    fn layers_split_members_and_elements() {
        assert!(Keyword::Memb.in_layer(Layer::Design));
        assert!(!Keyword::Memb.in_layer(Layer::Analysis));
        assert!(Keyword::El.in_layer(Layer::Analysis));
        assert!(!Keyword::El.in_layer(Layer::Design));
        assert!(Keyword::Node.in_layer(Layer::Design) && Keyword::Node.in_layer(Layer::Analysis));
        assert_eq!(Keyword::in_layer_all(Layer::Both).len(), Keyword::ALL.len());
    }

    #[test]
    fn loads_are_set_at() {
        assert_eq!(Keyword::Load2dThermal.set_command(), SetCommand::SetAt);
        assert_eq!(Keyword::Memb.set_command(), SetCommand::Set);
        assert_eq!(SetCommand::SetAt.as_str(), "SET_AT");
    }

    #[test]
    fn references_stay_inside_catalogue() {
        for kw in Keyword::ALL {
            assert!(!kw.references().contains(&kw), "{kw} references itself");
        }
        assert!(Keyword::Memb.references().contains(&Keyword::Node));
    }

    #[test]
    fn layer_parsing() {
        assert_eq!("Design".parse::<Layer>().unwrap(), Layer::Design);
        assert!("sideways".parse::<Layer>().is_err());
        assert_eq!(Layer::Analysis.to_string(), "analysis");
    }
}
