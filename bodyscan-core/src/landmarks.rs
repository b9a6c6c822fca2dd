//! Pose landmarks as delivered by the pose engine, one set per video frame.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of landmarks in a full-body pose.
pub const LANDMARK_COUNT: usize = 33;

// Fixed indices of the pose model. These must never be reordered.
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Skeleton edges used by the overlay.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// A single body keypoint in normalized image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }
}

/// Exactly [`LANDMARK_COUNT`] landmarks, indexed positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Returns `None` unless the slice holds exactly 33 landmarks.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    /// Build from a flat `[x, y, z, visibility, x, y, ...]` buffer.
    pub fn from_flat(data: &[f64]) -> Option<Self> {
        if data.len() != LANDMARK_COUNT * 4 {
            return None;
        }

        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (point, chunk) in points.iter_mut().zip(data.chunks_exact(4)) {
            *point = Landmark::new(chunk[0], chunk[1], chunk[2], chunk[3]);
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Landmark> {
        self.points.iter()
    }

    pub fn nose(&self) -> &Landmark {
        &self.points[NOSE]
    }

    pub fn left_shoulder(&self) -> &Landmark {
        &self.points[LEFT_SHOULDER]
    }

    pub fn right_shoulder(&self) -> &Landmark {
        &self.points[RIGHT_SHOULDER]
    }

    pub fn left_hip(&self) -> &Landmark {
        &self.points[LEFT_HIP]
    }

    pub fn right_hip(&self) -> &Landmark {
        &self.points[RIGHT_HIP]
    }

    pub fn left_ankle(&self) -> &Landmark {
        &self.points[LEFT_ANKLE]
    }

    pub fn right_ankle(&self) -> &Landmark {
        &self.points[RIGHT_ANKLE]
    }
}

impl core::ops::Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Landmark {
        &self.points[index]
    }
}

impl core::ops::IndexMut<usize> for LandmarkSet {
    fn index_mut(&mut self, index: usize) -> &mut Landmark {
        &mut self.points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_requires_full_pose() {
        let short = [Landmark::default(); 32];
        assert!(LandmarkSet::from_slice(&short).is_none());

        let full = [Landmark::default(); LANDMARK_COUNT];
        assert!(LandmarkSet::from_slice(&full).is_some());
    }

    #[test]
    fn test_from_flat_keeps_positional_order() {
        let mut data = [0.0; LANDMARK_COUNT * 4];
        data[LEFT_HIP * 4] = 0.42;
        data[LEFT_HIP * 4 + 1] = 0.55;
        data[LEFT_HIP * 4 + 3] = 0.9;

        let set = LandmarkSet::from_flat(&data).unwrap();
        assert_eq!(set.left_hip().x, 0.42);
        assert_eq!(set.left_hip().y, 0.55);
        assert_eq!(set.left_hip().visibility, 0.9);
        assert_eq!(set.right_hip().x, 0.0);
    }

    #[test]
    fn test_from_flat_rejects_wrong_length() {
        assert!(LandmarkSet::from_flat(&[0.0; 99]).is_none());
    }

    #[test]
    fn test_connections_stay_in_range() {
        for (a, b) in POSE_CONNECTIONS {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
