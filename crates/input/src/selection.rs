use buildspace_common::Material;

/// The material the next placement will use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialSelection {
    current: Material,
}

impl MaterialSelection {
    pub fn current(&self) -> Material {
        self.current
    }

    /// Returns true if the selection changed.
    pub fn select(&mut self, material: Material) -> bool {
        if self.current == material {
            return false;
        }
        tracing::debug!(from = %self.current, to = %material, "material selected");
        self.current = material;
        true
    }

    /// Select by 1-based hot-bar slot. Out-of-range slots are ignored.
    pub fn select_slot(&mut self, slot: usize) -> Option<Material> {
        let material = *Material::HOTBAR.get(slot.checked_sub(1)?)?;
        self.select(material);
        Some(material)
    }
}
