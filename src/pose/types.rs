//! Core pose and tracker types.

use serde::{Deserialize, Serialize};

/// Number of tracked body parts.
pub const TRACKER_COUNT: usize = 6;

/// Dimensionality of one feature vector: three position components followed
/// by four quaternion components.
pub const FEATURE_DIMS: usize = 7;

/// A 3D position in meters, y-up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A rotation as a unit quaternion (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// The no-rotation quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Heading around the vertical axis, in radians.
    ///
    /// Computed from the rotated z-axis projected onto the horizontal plane,
    /// so it is well defined for any unit quaternion.
    pub fn yaw(&self) -> f64 {
        let fx = 2.0 * (self.x * self.z + self.w * self.y);
        let fz = 1.0 - 2.0 * (self.x * self.x + self.y * self.y);
        fx.atan2(fz)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

/// The six tracked body parts, in their fixed slot order.
///
/// The slot index is stable: it names model files on disk and keys the
/// per-tracker buffers, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerSlot {
    Head,
    LeftHand,
    RightHand,
    Hip,
    LeftFoot,
    RightFoot,
}

impl TrackerSlot {
    /// All slots in index order.
    pub const ALL: [TrackerSlot; TRACKER_COUNT] = [
        TrackerSlot::Head,
        TrackerSlot::LeftHand,
        TrackerSlot::RightHand,
        TrackerSlot::Hip,
        TrackerSlot::LeftFoot,
        TrackerSlot::RightFoot,
    ];

    /// Stable slot index used in model file names and vote tallies.
    pub const fn index(&self) -> usize {
        match self {
            TrackerSlot::Head => 0,
            TrackerSlot::LeftHand => 1,
            TrackerSlot::RightHand => 2,
            TrackerSlot::Hip => 3,
            TrackerSlot::LeftFoot => 4,
            TrackerSlot::RightFoot => 5,
        }
    }

    /// The tracker name the hosting application reports for this slot.
    pub const fn name(&self) -> &'static str {
        match self {
            TrackerSlot::Head => "head",
            TrackerSlot::LeftHand => "lHand",
            TrackerSlot::RightHand => "rHand",
            TrackerSlot::Hip => "hip",
            TrackerSlot::LeftFoot => "lFoot",
            TrackerSlot::RightFoot => "rFoot",
        }
    }

    /// Resolve a reported tracker name to its slot.
    pub fn from_name(name: &str) -> Option<TrackerSlot> {
        TrackerSlot::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

/// One tracker's raw pose at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Frame timestamp in seconds, as reported by the hosting application.
    pub time: f64,
    pub position: Vec3,
    pub rotation: Quat,
}

impl PoseSample {
    pub fn new(time: f64, position: Vec3, rotation: Quat) -> Self {
        Self {
            time,
            position,
            rotation,
        }
    }
}

/// A normalized feature vector, tagged with the per-session sample index it
/// was ingested at. The index is shared across trackers within one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub index: u64,
    pub values: [f64; FEATURE_DIMS],
}

impl FeatureVector {
    pub fn new(index: u64, values: [f64; FEATURE_DIMS]) -> Self {
        Self { index, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indices_are_stable() {
        for (position, slot) in TrackerSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
    }

    #[test]
    fn test_slot_name_round_trip() {
        for slot in TrackerSlot::ALL {
            assert_eq!(TrackerSlot::from_name(slot.name()), Some(slot));
        }
    }

    #[test]
    fn test_unknown_tracker_name() {
        assert_eq!(TrackerSlot::from_name("chest"), None);
        assert_eq!(TrackerSlot::from_name(""), None);
        // Lookup is case sensitive, matching the reported names exactly
        assert_eq!(TrackerSlot::from_name("Head"), None);
    }

    #[test]
    fn test_yaw_of_identity_is_zero() {
        assert!(Quat::identity().yaw().abs() < 1e-12);
    }

    #[test]
    fn test_yaw_of_quarter_turn() {
        // 90 degrees around the vertical axis
        let half = std::f64::consts::FRAC_PI_4;
        let q = Quat::new(0.0, half.sin(), 0.0, half.cos());
        assert!((q.yaw() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_vec3_length() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert!((v.length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_vector_carries_index() {
        let f = FeatureVector::new(42, [0.0; FEATURE_DIMS]);
        assert_eq!(f.index, 42);
        assert_eq!(f.values.len(), FEATURE_DIMS);
    }
}
