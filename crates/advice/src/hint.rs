use buildspace_common::Material;
use serde::{Deserialize, Serialize};

/// Themes offered when the player asks for a new idea.
pub const THEMES: [&str; 5] = [
    "Sky Castle",
    "Underground Bunker",
    "Floating Garden",
    "Obsidian Tower",
    "Cozy Cottage",
];

/// Most materials a hint may suggest.
pub const MAX_SUGGESTED: usize = 4;

/// A building idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub title: String,
    pub description: String,
    #[serde(rename = "suggestedMaterials")]
    pub suggested_materials: Vec<String>,
}

impl Hint {
    /// Returned whenever a real hint cannot be obtained.
    pub fn fallback() -> Self {
        Self {
            title: "Simple Cabin".into(),
            description: "A cozy place to stay the night. Classic and reliable.".into(),
            suggested_materials: vec!["wood".into(), "log".into(), "cobblestone".into()],
        }
    }

    /// Suggested names that match a placeable material, in order.
    pub fn materials(&self) -> Vec<Material> {
        self.suggested_materials
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

impl std::fmt::Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.description)?;
        write!(f, "Materials: {}", self.suggested_materials.join(", "))
    }
}
