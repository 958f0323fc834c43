/// A point or direction in world space
pub type Vec3 = [f64; 3];

/// A 3x3 matrix in row-major order
pub type Mat3 = [[f64; 3]; 3];

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Builds the rotation matrix for Euler angles applied in X, Y, Z order
pub fn rotation_matrix(angles: &Vec3) -> Mat3 {
    let (sin_x, cos_x) = angles[0].sin_cos();
    let (sin_y, cos_y) = angles[1].sin_cos();
    let (sin_z, cos_z) = angles[2].sin_cos();

    let rotation_x = [[1.0, 0.0, 0.0], [0.0, cos_x, -sin_x], [0.0, sin_x, cos_x]];
    let rotation_y = [[cos_y, 0.0, sin_y], [0.0, 1.0, 0.0], [-sin_y, 0.0, cos_y]];
    let rotation_z = [[cos_z, -sin_z, 0.0], [sin_z, cos_z, 0.0], [0.0, 0.0, 1.0]];

    multiply_matrices(&multiply_matrices(&rotation_x, &rotation_y), &rotation_z)
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: &Vec3, s: f64) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn length(v: &Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Returns the unit vector along `v`, or `v` unchanged when it has no length
pub fn normalize(v: &Vec3) -> Vec3 {
    let length = length(v);
    if length == 0.0 {
        *v
    } else {
        scale(v, 1.0 / length)
    }
}

/// Calculates the normal vector of a triangle
pub fn calculate_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let u = sub(b, a);
    let v = sub(c, a);
    let normal = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    normalize(&normal)
}

/// Calculates the diffuse light intensity based on the normal vector and light position
pub fn calculate_light_intensity(normal: &Vec3, position: &Vec3, light_pos: &Vec3) -> f64 {
    let light_dir = normalize(&sub(light_pos, position));
    dot(normal, &light_dir).max(0.0)
}

/// Moves `current` toward `target` by `fraction` of the remaining gap
pub fn approach(current: f64, target: f64, fraction: f64) -> f64 {
    current + (target - current) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn rotation_matrix_is_identity_at_rest() {
        let m = rotation_matrix(&[0.0, 0.0, 0.0]);
        let v = multiply_matrix_vector(&m, &[1.0, 2.0, 3.0]);
        assert_eq!(v, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn rotation_about_z_turns_x_into_y() {
        let m = rotation_matrix(&[0.0, 0.0, std::f64::consts::FRAC_PI_2]);
        let v = multiply_matrix_vector(&m, &[1.0, 0.0, 0.0]);
        assert!(approx_eq!(f64, v[0], 0.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, v[1], 1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, v[2], 0.0, epsilon = 1e-12));
    }

    #[test]
    fn counter_clockwise_triangle_faces_positive_z() {
        let n = calculate_normal(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!(n, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn light_behind_surface_contributes_nothing() {
        let lit = calculate_light_intensity(&[0.0, 0.0, 1.0], &[0.0; 3], &[0.0, 0.0, 5.0]);
        let unlit = calculate_light_intensity(&[0.0, 0.0, 1.0], &[0.0; 3], &[0.0, 0.0, -5.0]);
        assert!(approx_eq!(f64, lit, 1.0));
        assert!(approx_eq!(f64, unlit, 0.0));
    }

    #[test]
    fn approach_covers_a_tenth_of_the_gap() {
        assert!(approx_eq!(f64, approach(0.0, 1.0, 0.1), 0.1, epsilon = 1e-12));
        assert!(approx_eq!(f64, approach(0.5, -0.5, 0.1), 0.4, epsilon = 1e-12));
    }

    #[test]
    fn normalize_leaves_zero_vector_alone() {
        assert_eq!(normalize(&[0.0; 3]), [0.0; 3]);
    }
}
