//! Camera-facing face detection.
//!
//! Maps a view direction onto one of the six faces of an axis-aligned cube by
//! picking the dominant axis of the vector. The comparisons are strict and run
//! X first, then Y, and everything else (ties included) lands on the Z faces,
//! so the zero vector resolves to [`Face::Front`].

use glam::Vec3;

/// One of the six axis-aligned faces the camera can be looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl Face {
    /// All faces, in table order.
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Top,
        Face::Bottom,
    ];

    /// Position of this face in per-face lookup tables.
    pub const fn index(self) -> usize {
        match self {
            Face::Front => 0,
            Face::Back => 1,
            Face::Left => 2,
            Face::Right => 3,
            Face::Top => 4,
            Face::Bottom => 5,
        }
    }

    /// Lowercase name, used for logs and the status line.
    pub const fn name(self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Back => "back",
            Face::Left => "left",
            Face::Right => "right",
            Face::Top => "top",
            Face::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the face whose axis dominates `direction`.
///
/// The vector does not need to be normalized; only signs and relative
/// magnitudes matter.
///
/// ```
/// use cubeview::{Face, Vec3, classify};
///
/// assert_eq!(classify(Vec3::new(0.2, -3.0, 1.0)), Face::Bottom);
/// assert_eq!(classify(Vec3::ZERO), Face::Front);
/// ```
pub fn classify(direction: Vec3) -> Face {
    let abs = direction.abs();

    if abs.x > abs.y && abs.x > abs.z {
        if direction.x > 0.0 { Face::Right } else { Face::Left }
    } else if abs.y > abs.x && abs.y > abs.z {
        if direction.y > 0.0 { Face::Top } else { Face::Bottom }
    } else if direction.z > 0.0 {
        Face::Back
    } else {
        Face::Front
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axes_map_to_their_sign() {
        assert_eq!(classify(Vec3::X), Face::Right);
        assert_eq!(classify(Vec3::NEG_X), Face::Left);
        assert_eq!(classify(Vec3::Y), Face::Top);
        assert_eq!(classify(Vec3::NEG_Y), Face::Bottom);
        assert_eq!(classify(Vec3::Z), Face::Back);
        assert_eq!(classify(Vec3::NEG_Z), Face::Front);
    }

    #[test]
    fn unnormalized_input_is_fine() {
        assert_eq!(classify(Vec3::new(-12.0, 3.0, 4.0)), Face::Left);
        assert_eq!(classify(Vec3::new(0.1, 0.5, -0.2)), Face::Top);
        assert_eq!(classify(Vec3::new(0.0, 0.0, 5.0)), Face::Back);
    }

    #[test]
    fn zero_vector_is_front() {
        assert_eq!(classify(Vec3::ZERO), Face::Front);
    }

    #[test]
    fn ties_fall_through_to_z() {
        assert_eq!(classify(Vec3::new(1.0, 1.0, 0.0)), Face::Front);
        assert_eq!(classify(Vec3::new(-1.0, 1.0, 0.5)), Face::Back);
        // x ties with z, so x is not strictly dominant
        assert_eq!(classify(Vec3::new(2.0, 0.0, -2.0)), Face::Front);
        // y ties with z
        assert_eq!(classify(Vec3::new(0.0, -3.0, 3.0)), Face::Back);
        // the default orbit start position looks down the diagonal
        assert_eq!(classify(Vec3::new(-1.0, -1.0, -1.0).normalize()), Face::Front);
    }

    #[test]
    fn table_indices_are_unique() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
        assert_eq!(Face::Bottom.to_string(), "bottom");
    }
}
