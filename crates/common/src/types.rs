use glam::{EulerRot, IVec3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a placed block.
///
/// Only used to keep render lists stable; blocks are looked up and compared by
/// position, never by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockKey(pub Uuid);

impl BlockKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for logs and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for BlockKey {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer cell on the unit block grid. A block at `p` occupies `[p - 0.5, p + 0.5]`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Snap a continuous position to the nearest cell.
    pub fn round(v: Vec3) -> Self {
        let r = v.round();
        Self::new(r.x as i32, r.y as i32, r.z as i32)
    }

    /// Snap each component up to the next integer.
    pub fn ceil(v: Vec3) -> Self {
        let c = v.ceil();
        Self::new(c.x as i32, c.y as i32, c.z as i32)
    }

    /// The cell containing a continuous point.
    pub fn containing(v: Vec3) -> Self {
        let f = (v + Vec3::splat(0.5)).floor();
        Self::new(f.x as i32, f.y as i32, f.z as i32)
    }

    /// Neighbouring cell across the given face, or `None` past the edge of
    /// the `i32` grid.
    pub fn offset(self, face: Face) -> Option<Self> {
        let n = face.normal();
        Some(Self::new(
            self.x.checked_add(n.x)?,
            self.y.checked_add(n.y)?,
            self.z.checked_add(n.z)?,
        ))
    }

    pub fn center(self) -> Vec3 {
        self.as_ivec3().as_vec3()
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        p.as_ivec3()
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six faces of a unit cube, in face-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

/// Face index outside `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("face index {0} is out of range 0..=5")]
pub struct FaceIndexError(pub u8);

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn index(self) -> u8 {
        match self {
            Face::PosX => 0,
            Face::NegX => 1,
            Face::PosY => 2,
            Face::NegY => 3,
            Face::PosZ => 4,
            Face::NegZ => 5,
        }
    }

    pub fn normal(self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }
}

impl TryFrom<u8> for Face {
    type Error = FaceIndexError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Face::ALL
            .get(index as usize)
            .copied()
            .ok_or(FaceIndexError(index))
    }
}

/// First-person viewpoint. Yaw turns about +Y, pitch about the camera's X axis;
/// at yaw 0 the camera looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl CameraPose {
    pub const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Rotation about +Y only, used for walking.
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Apply a pointer-lock mouse delta. Moving right turns right, moving down looks down.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }
}
