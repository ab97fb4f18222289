use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use super::types::{MaterialId, Transparency, Voxel};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("materials config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("material `air` is reserved and must stay empty")]
    ReservedAir,
    #[error("material table is full ({0} entries)")]
    Full(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDef {
    pub id: MaterialId,
    pub name: String,
    pub transparency: Transparency,
    pub color: [u8; 4],
}

#[derive(Clone, Debug)]
pub struct MaterialRegistry {
    materials: Vec<MaterialDef>,
    by_name: HashMap<String, MaterialId>,
}

const BUILTIN: &[(&str, Transparency, [u8; 4])] = &[
    ("air", Transparency::Empty, [0, 0, 0, 0]),
    ("water", Transparency::Translucent, [48, 92, 196, 160]),
    ("ice", Transparency::Translucent, [186, 220, 240, 200]),
    ("rock", Transparency::Opaque, [118, 116, 112, 255]),
    ("dirt", Transparency::Opaque, [121, 85, 58, 255]),
    ("grass", Transparency::Opaque, [86, 148, 62, 255]),
    ("sand", Transparency::Opaque, [219, 204, 150, 255]),
    ("gravel", Transparency::Opaque, [136, 128, 122, 255]),
    ("snow", Transparency::Opaque, [244, 246, 250, 255]),
];

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MaterialRegistry {
    /// Registry with the materials worldgen needs. `air` is always id 0.
    pub fn builtin() -> Self {
        let mut reg = Self {
            materials: Vec::with_capacity(BUILTIN.len()),
            by_name: HashMap::new(),
        };
        for (name, transparency, color) in BUILTIN {
            // Cannot overflow: the builtin table is tiny.
            let _ = reg.upsert(name, *transparency, *color);
        }
        reg
    }

    /// Builtin materials, recoloured or extended by a `[materials.<name>]` TOML table.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        let mut reg = Self::builtin();
        reg.apply(cfg)?;
        Ok(reg)
    }

    /// Applies overrides parsed as part of a larger config file.
    pub fn apply(&mut self, cfg: MaterialsConfig) -> Result<(), RegistryError> {
        let mut entries: Vec<(String, MaterialEntry)> = cfg.materials.into_iter().collect();
        // HashMap iteration order is nondeterministic; sort keys so new ids are stable.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, entry) in entries {
            let existing = self.get_by_name(&name).cloned();
            let transparency = entry
                .transparency
                .or(existing.as_ref().map(|m| m.transparency))
                .unwrap_or(Transparency::Opaque);
            let color = entry
                .color
                .or(existing.as_ref().map(|m| m.color))
                .unwrap_or([255, 0, 255, 255]);
            if name == "air" && transparency != Transparency::Empty {
                return Err(RegistryError::ReservedAir);
            }
            self.upsert(&name, transparency, color)?;
        }
        Ok(())
    }

    fn upsert(
        &mut self,
        name: &str,
        transparency: Transparency,
        color: [u8; 4],
    ) -> Result<MaterialId, RegistryError> {
        if let Some(id) = self.by_name.get(name).copied() {
            let def = &mut self.materials[id.0 as usize];
            def.transparency = transparency;
            def.color = color;
            return Ok(id);
        }
        let raw = u16::try_from(self.materials.len())
            .map_err(|_| RegistryError::Full(self.materials.len()))?;
        let id = MaterialId(raw);
        self.by_name.insert(name.to_string(), id);
        self.materials.push(MaterialDef {
            id,
            name: name.to_string(),
            transparency,
            color,
        });
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(id.0 as usize)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&MaterialDef> {
        self.id_by_name(name).and_then(|id| self.get(id))
    }

    pub fn id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    /// Transparency class of a voxel; unknown ids count as opaque.
    #[inline]
    pub fn transparency(&self, v: Voxel) -> Transparency {
        if v.is_air() {
            return Transparency::Empty;
        }
        self.get(v.id)
            .map(|m| m.transparency)
            .unwrap_or(Transparency::Opaque)
    }

    #[inline]
    pub fn color(&self, id: MaterialId) -> [u8; 4] {
        self.get(id).map(|m| m.color).unwrap_or([255, 0, 255, 255])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.iter()
    }
}

// --- Config ---

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub materials: HashMap<String, MaterialEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MaterialEntry {
    #[serde(default)]
    pub transparency: Option<Transparency>,
    #[serde(default)]
    pub color: Option<[u8; 4]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_reserves_air_at_zero() {
        let reg = MaterialRegistry::builtin();
        assert_eq!(reg.id_by_name("air"), Some(MaterialId::AIR));
        assert_eq!(reg.transparency(Voxel::AIR), Transparency::Empty);
        let water = reg.id_by_name("water").unwrap();
        assert_eq!(reg.transparency(Voxel::new(water)), Transparency::Translucent);
    }

    #[test]
    fn unknown_ids_are_opaque() {
        let reg = MaterialRegistry::builtin();
        assert_eq!(
            reg.transparency(Voxel::new(MaterialId(9_999))),
            Transparency::Opaque
        );
    }
}
