use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const AIR: MaterialId = MaterialId(0);
}

// Compact voxel representation stored in chunk buffers
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct Voxel {
    pub id: MaterialId,
}

impl Voxel {
    pub const AIR: Voxel = Voxel { id: MaterialId::AIR };

    #[inline]
    pub const fn new(id: MaterialId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.id == MaterialId::AIR
    }
}

/// Face-culling class. Faces between two voxels of the same class are hidden.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    Empty,
    Translucent,
    Opaque,
}

impl Transparency {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Transparency::Empty)
    }

    /// Whether something at this class blocks movement and rays.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Transparency::Opaque)
    }
}
