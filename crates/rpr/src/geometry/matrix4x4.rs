use super::Vec3;

/// Affine transform in the layout the engine expects with `transpose = true`:
/// row-major, translation in the last column.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4x4 {
    pub data: [[f32; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4::identity()
    }
}

impl Matrix4x4 {
    pub fn identity() -> Self {
        Matrix4x4::scale(Vec3(1.0, 1.0, 1.0))
    }

    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn create(a11: f32, a12: f32, a13: f32, a14: f32,
                  a21: f32, a22: f32, a23: f32, a24: f32,
                  a31: f32, a32: f32, a33: f32, a34: f32,
                  a41: f32, a42: f32, a43: f32, a44: f32) -> Self {
        Matrix4x4 {
            data: [[a11, a12, a13, a14],
                   [a21, a22, a23, a24],
                   [a31, a32, a33, a34],
                   [a41, a42, a43, a44]]
        }
    }

    pub fn translation(offset: Vec3) -> Matrix4x4 {
        let mut m = Matrix4x4::identity();
        m.data[0][3] = offset.0;
        m.data[1][3] = offset.1;
        m.data[2][3] = offset.2;
        m
    }

    pub fn scale(factors: Vec3) -> Matrix4x4 {
        let mut data = [[0.0; 4]; 4];
        data[0][0] = factors.0;
        data[1][1] = factors.1;
        data[2][2] = factors.2;
        data[3][3] = 1.0;
        Matrix4x4 { data }
    }

    /// Gauss-Jordan elimination with partial pivoting. `None` for singular matrices.
    pub fn invert(&self) -> Option<Matrix4x4> {
        let mut a = self.data;
        let mut inv = Matrix4x4::identity().data;

        for col in 0..4 {
            let pivot = (col..4).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
            if a[pivot][col].abs() < 1e-12 {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);

            let scale = 1.0 / a[col][col];
            for k in 0..4 {
                a[col][k] *= scale;
                inv[col][k] *= scale;
            }

            for row in (0..4).filter(|&row| row != col) {
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }

        Some(Matrix4x4 { data: inv })
    }

    pub fn matmul(a: Matrix4x4, b: Matrix4x4) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (i, row) in data.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| a.data[i][k] * b.data[k][j]).sum();
            }
        }
        Matrix4x4 { data }
    }

    pub fn transpose(&mut self) {
        *self = self.transposed();
    }

    pub fn transposed(&self) -> Matrix4x4 {
        let mut data = [[0.0; 4]; 4];
        for (i, row) in self.data.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                data[j][i] = *value;
            }
        }
        Matrix4x4 { data }
    }

    pub fn translation_part(&self) -> Vec3 {
        Vec3(self.data[0][3], self.data[1][3], self.data[2][3])
    }

    /// Flattened row by row, the order handed to the engine.
    pub fn to_row_major(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.data.as_flattened());
        out
    }

    /// Element-wise blend between two motion keys.
    pub fn lerp(a: &Matrix4x4, b: &Matrix4x4, t: f32) -> Matrix4x4 {
        let mut data = a.data;
        for (row, other) in data.iter_mut().zip(b.data.iter()) {
            for (value, target) in row.iter_mut().zip(other.iter()) {
                *value = *value * (1.0 - t) + target * t;
            }
        }
        Matrix4x4 { data }
    }

    fn row(&self, i: usize) -> Vec3 {
        Vec3(self.data[i][0], self.data[i][1], self.data[i][2])
    }

    fn column(&self, j: usize) -> Vec3 {
        Vec3(self.data[0][j], self.data[1][j], self.data[2][j])
    }

    pub fn apply_point(&self, p: Vec3) -> Vec3 {
        let project = |i: usize| Vec3::dot(self.row(i), p) + self.data[i][3];
        let w = Vec3(self.data[3][0], self.data[3][1], self.data[3][2]);
        let w = Vec3::dot(w, p) + self.data[3][3];
        Vec3(project(0), project(1), project(2)) / w
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        Vec3(Vec3::dot(self.row(0), v), Vec3::dot(self.row(1), v), Vec3::dot(self.row(2), v))
    }

    /// Transposed upper 3x3 applied to `v`. With the inverse matrix this maps normals.
    pub fn apply_vector_transposed(&self, v: Vec3) -> Vec3 {
        Vec3(
            Vec3::dot(self.column(0), v),
            Vec3::dot(self.column(1), v),
            Vec3::dot(self.column(2), v),
        )
    }
}

impl From<[f32; 16]> for Matrix4x4 {
    fn from(value: [f32; 16]) -> Self {
        let mut data = [[0.0; 4]; 4];
        for (row, chunk) in data.iter_mut().zip(value.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Matrix4x4 { data }
    }
}

// inner arrays are rows; glTF's column-major arrays need a transpose afterwards
impl From<[[f32; 4]; 4]> for Matrix4x4 {
    fn from(value: [[f32; 4]; 4]) -> Self {
        Self { data: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &Matrix4x4, b: &Matrix4x4) -> bool {
        a.to_row_major()
            .iter()
            .zip(b.to_row_major())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn invert_translation() {
        let m = Matrix4x4::translation(Vec3(-2.0, 1.0, 0.5));
        let inv = m.invert().expect("translation is invertible");
        assert!(approx_eq(&Matrix4x4::matmul(m, inv), &Matrix4x4::identity()));
        assert_eq!(inv.translation_part(), Vec3(2.0, -1.0, -0.5));
    }

    #[test]
    fn invert_needs_a_pivot_swap() {
        #[rustfmt::skip]
        let m = Matrix4x4::create(
            0.0, 0.0, -0.1, 2.0,
            0.0, 0.1, 0.0, 0.8,
            0.1, 0.0, 0.0, 2.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let inv = m.invert().expect("permuted scale is invertible");
        assert!(approx_eq(&Matrix4x4::matmul(m, inv), &Matrix4x4::identity()));
        assert!(approx_eq(&Matrix4x4::matmul(inv, m), &Matrix4x4::identity()));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix4x4::scale(Vec3(1.0, 0.0, 1.0)).invert().is_none());
    }

    #[test]
    fn normals_follow_the_inverse_transpose() {
        let m = Matrix4x4::scale(Vec3(2.0, 1.0, 1.0));
        let inv = m.invert().unwrap();
        // a 45 degree slope gets flatter when stretched along x
        let n = inv.apply_vector_transposed(Vec3(1.0, 1.0, 0.0));
        assert_eq!(n, Vec3(0.5, 1.0, 0.0));
        assert_eq!(m.apply_point(Vec3(1.0, 2.0, 3.0)), Vec3(2.0, 2.0, 3.0));
    }

    #[test]
    fn row_major_keeps_translation_in_last_column() {
        let flat = Matrix4x4::translation(Vec3(4.0, 5.0, 6.0)).to_row_major();
        assert_eq!([flat[3], flat[7], flat[11], flat[15]], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(Matrix4x4::from(flat), Matrix4x4::translation(Vec3(4.0, 5.0, 6.0)));
    }
}
