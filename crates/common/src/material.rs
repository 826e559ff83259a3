use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Block material. The palette is closed: blocks carry nothing beyond this tag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Dirt,
    #[default]
    Grass,
    Glass,
    Wood,
    Log,
    Cobblestone,
}

/// Unknown material name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown material {0:?}")]
pub struct UnknownMaterial(pub String);

impl Material {
    pub const ALL: [Material; 6] = [
        Material::Dirt,
        Material::Grass,
        Material::Glass,
        Material::Wood,
        Material::Log,
        Material::Cobblestone,
    ];

    /// Hot-bar slots 1 through 5. Glass is not on the bar.
    pub const HOTBAR: [Material; 5] = [
        Material::Grass,
        Material::Dirt,
        Material::Wood,
        Material::Log,
        Material::Cobblestone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Material::Dirt => "dirt",
            Material::Grass => "grass",
            Material::Glass => "glass",
            Material::Wood => "wood",
            Material::Log => "log",
            Material::Cobblestone => "cobblestone",
        }
    }

    /// sRGB-encoded RGBA colour, as authored. UI swatches take this directly.
    pub fn color(self) -> [f32; 4] {
        match self {
            Material::Dirt => rgb(0x8B, 0x45, 0x13),
            Material::Grass => rgb(0x22, 0x8B, 0x22),
            Material::Glass => [0.68, 0.85, 0.90, 0.5],
            Material::Wood => rgb(0xD2, 0xB4, 0x8C),
            Material::Log => rgb(0x5D, 0x40, 0x37),
            Material::Cobblestone => rgb(0x80, 0x80, 0x80),
        }
    }

    /// `color()` with RGB decoded to linear light, for shading into an sRGB
    /// render target. Alpha is unchanged.
    pub fn linear_color(self) -> [f32; 4] {
        let [r, g, b, a] = self.color();
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
    }

    pub fn is_translucent(self) -> bool {
        matches!(self, Material::Glass)
    }

    /// Zero-based hot-bar slot, if the material is on the bar.
    pub fn hotbar_slot(self) -> Option<usize> {
        Self::HOTBAR.iter().position(|m| *m == self)
    }
}

/// Decode one sRGB channel in `0..=1` to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Material::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMaterial(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Cobblestone".parse::<Material>(), Ok(Material::Cobblestone));
        assert_eq!(" log ".parse::<Material>(), Ok(Material::Log));
        assert!("obsidian".parse::<Material>().is_err());
    }

    #[test]
    fn hotbar_order() {
        assert_eq!(Material::HOTBAR[0], Material::Grass);
        assert_eq!(Material::Cobblestone.hotbar_slot(), Some(4));
        assert_eq!(Material::Glass.hotbar_slot(), None);
    }

    #[test]
    fn only_glass_is_translucent() {
        for m in Material::ALL {
            assert_eq!(m.is_translucent(), m == Material::Glass);
            assert_eq!(m.color()[3] < 1.0, m.is_translucent());
        }
    }

    #[test]
    fn linear_colour_decodes_srgb() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        // Mid grey is much darker in linear light.
        assert!((srgb_to_linear(0x80 as f32 / 255.0) - 0.2158).abs() < 1e-3);

        let [r, g, b, a] = Material::Cobblestone.linear_color();
        assert!((r - 0.2158).abs() < 1e-3);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 1.0);
        assert_eq!(Material::Glass.linear_color()[3], 0.5);
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Material::Wood).unwrap();
        assert_eq!(json, "\"wood\"");
        let back: Material = serde_json::from_str("\"glass\"").unwrap();
        assert_eq!(back, Material::Glass);
    }
}
