//! Session-start reference frame and pose normalization.
//!
//! Feature vectors are expressed relative to where the user stood at session
//! start: the horizontal start position and heading are removed, and the
//! height axis is rescaled from the user's head height to a fixed reference
//! height. Trained models therefore transfer between users and play spaces.

use tracing::warn;

use crate::pose::types::{FeatureVector, PoseSample, Quat, Vec3};

/// Default height in meters that user height is rescaled to.
pub const REFERENCE_HEIGHT: f64 = 1.8;

/// Head heights below this are treated as a tracking glitch.
const MIN_USER_HEIGHT: f64 = 0.1;

/// Reference frame captured from the head pose at session start.
#[derive(Debug, Clone, Copy)]
pub struct SessionReference {
    start_x: f64,
    start_z: f64,
    yaw_cos: f64,
    yaw_sin: f64,
    user_height: f64,
    reference_height: f64,
}

impl SessionReference {
    /// Capture a reference frame from the head pose at session start.
    ///
    /// The head height doubles as the user's height for scaling; a degenerate
    /// value falls back to `reference_height` so later samples stay finite.
    pub fn capture(head_position: Vec3, head_rotation: Quat, reference_height: f64) -> Self {
        let user_height = if head_position.y > MIN_USER_HEIGHT {
            head_position.y
        } else {
            warn!(
                height = head_position.y,
                "head height too small for scaling, using reference height"
            );
            reference_height
        };
        let yaw = head_rotation.yaw();
        Self {
            start_x: head_position.x,
            start_z: head_position.z,
            yaw_cos: yaw.cos(),
            yaw_sin: yaw.sin(),
            user_height,
            reference_height,
        }
    }

    /// Normalize one raw sample into a feature vector tagged with `index`.
    pub fn normalize(&self, sample: &PoseSample, index: u64) -> FeatureVector {
        let tx = sample.position.x - self.start_x;
        let ty = sample.position.y;
        let tz = sample.position.z - self.start_z;
        let values = [
            tx * self.yaw_cos - tz * self.yaw_sin,
            (ty / self.user_height) * self.reference_height,
            tz * self.yaw_cos + tx * self.yaw_sin,
            sample.rotation.x,
            sample.rotation.y,
            sample.rotation.z,
            sample.rotation.w,
        ];
        FeatureVector::new(index, values)
    }

    /// Height used for scaling, after any fallback.
    pub fn user_height(&self) -> f64 {
        self.user_height
    }
}
