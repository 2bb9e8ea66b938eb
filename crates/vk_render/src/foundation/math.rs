//! Math types and helpers backed by nalgebra

/// 4x4 column-major matrix
pub type Mat4 = nalgebra::Matrix4<f32>;
/// 3-component vector
pub type Vec3 = nalgebra::Vector3<f32>;

/// Rotation about the Z axis (the axis pointing out of the screen).
///
/// With the swapchain presenting an XY plane, this spins geometry in place.
pub fn rotation_z(angle_radians: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::z_axis(), angle_radians)
}

/// Export a matrix as the column-major 2D array layout push constants use.
///
/// nalgebra stores matrices column-major, matching what GLSL expects for a
/// `mat4` push constant, so each output row is one source column.
pub fn mat4_to_push(m: &Mat4) -> [[f32; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (c, col) in m.column_iter().enumerate() {
        for r in 0..4 {
            out[c][r] = col[r];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_rotation_z_zero_is_identity() {
        assert_relative_eq!(rotation_z(0.0), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_z_quarter_turn_maps_x_to_y() {
        let rotated = rotation_z(FRAC_PI_2).transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(rotated, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_mat4_to_push_is_column_major() {
        let mut m = Mat4::identity();
        m[(0, 3)] = 5.0; // translation x lives in column 3
        let push = mat4_to_push(&m);

        assert_relative_eq!(push[3][0], 5.0, epsilon = EPSILON);
        assert_relative_eq!(push[0][0], 1.0, epsilon = EPSILON);
        assert_relative_eq!(push[1][1], 1.0, epsilon = EPSILON);
    }
}
