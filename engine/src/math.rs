//! Math types for uniforms and vertex data.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut, Mul};

macro_rules! impl_vector {
    ($({
        $Vec:ident, $dim:expr => $($field:ident),+
    }),+ $(,)?) => {
        $(
            #[doc = concat!("A ", stringify!($dim), "-dimensional vector.")]
            #[derive(Default, Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
            #[repr(C)]
            #[must_use]
            pub struct $Vec {
                $(pub $field: f32),+
            }

            impl $Vec {
                #[doc = concat!("Create a ", stringify!($dim), "-dimensional vector from given coordinates.")]
                #[inline]
                pub const fn new($($field: f32),+) -> Self {
                    Self { $($field),+ }
                }

                /// Converts the vector into an array of `f32`.
                #[must_use]
                #[inline]
                pub fn to_array(self) -> [f32; $dim] {
                    [$(self.$field),+]
                }

                /// Mutable view of the vector as an array, e.g. for editing through UI widgets.
                #[must_use]
                #[inline]
                pub fn as_array_mut(&mut self) -> &mut [f32; $dim] {
                    bytemuck::cast_mut(self)
                }
            }

            impl From<[f32; $dim]> for $Vec {
                #[inline]
                fn from(array: [f32; $dim]) -> Self {
                    bytemuck::cast(array)
                }
            }

            impl From<$Vec> for [f32; $dim] {
                #[inline]
                fn from(vector: $Vec) -> Self {
                    vector.to_array()
                }
            }
        )+
    };
}

impl_vector!(
    { Vec3, 3 => x, y, z },
    { Vec4, 4 => x, y, z, w },
);

/// A column-major 4x4 matrix, laid out the way `glUniformMatrix4fv` expects.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
#[must_use]
pub struct Mat4 {
    cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    /// Construct an identity matrix.
    #[inline]
    pub const fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Create a 4x4 matrix from given columns.
    #[inline]
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Create an orthographic projection matrix mapping the given box to clip space.
    #[inline]
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near_clip: f32,
        far_clip: f32,
    ) -> Self {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let fnear = 1.0 / (far_clip - near_clip);
        let mut matrix = Self::identity();

        matrix[(0, 0)] = 2.0 * rl;
        matrix[(1, 1)] = 2.0 * tb;
        matrix[(2, 2)] = -2.0 * fnear;

        matrix[(3, 0)] = -(right + left) * rl;
        matrix[(3, 1)] = -(top + bottom) * tb;
        matrix[(3, 2)] = -(far_clip + near_clip) * fnear;

        matrix
    }

    /// Create a translation matrix for the given position.
    #[inline]
    pub fn translation(position: impl Into<Vec3>) -> Self {
        let position = position.into();
        let mut matrix = Self::identity();
        matrix[(3, 0)] = position.x;
        matrix[(3, 1)] = position.y;
        matrix[(3, 2)] = position.z;
        matrix
    }

    /// The matrix as 16 contiguous column-major floats.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.cols)
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    /// Index by `(column, row)`.
    fn index(&self, (col, row): (usize, usize)) -> &Self::Output {
        &self.cols[col][row]
    }
}

impl IndexMut<(usize, usize)> for Mat4 {
    fn index_mut(&mut self, (col, row): (usize, usize)) -> &mut Self::Output {
        &mut self.cols[col][row]
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut matrix = Self::zeroed();
        for col in 0..4 {
            for row in 0..4 {
                matrix[(col, row)] = (0..4).map(|k| self[(k, row)] * rhs[(col, k)]).sum();
            }
        }
        matrix
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Self::Output {
        let v = rhs.to_array();
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|k| self[(k, row)] * v[k]).sum();
        }
        out.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vec4, b: Vec4) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(a, b)| (a - b).abs() <= 1e-5)
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m * Mat4::identity(), m);
        assert_eq!(Mat4::identity() * m, m);
    }

    #[test]
    fn translation_moves_points() {
        let m = Mat4::translation(Vec3::new(200.0, 100.0, 0.0));
        let p = m * Vec4::new(-50.0, 50.0, 0.0, 1.0);
        assert_eq!(p, Vec4::new(150.0, 150.0, 0.0, 1.0));
    }

    #[test]
    fn orthographic_maps_to_clip_space() {
        let proj = Mat4::orthographic(0.0, 960.0, 0.0, 540.0, -1.0, 1.0);
        assert!(approx_eq(
            proj * Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(-1.0, -1.0, 0.0, 1.0)
        ));
        assert!(approx_eq(
            proj * Vec4::new(960.0, 540.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 0.0, 1.0)
        ));
        assert!(approx_eq(
            proj * Vec4::new(480.0, 270.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0)
        ));
    }

    #[test]
    fn multiplication_applies_right_to_left() {
        let proj = Mat4::orthographic(0.0, 960.0, 0.0, 540.0, -1.0, 1.0);
        let model = Mat4::translation(Vec3::new(480.0, 270.0, 0.0));
        let mvp = proj * Mat4::identity() * model;
        assert!(approx_eq(
            mvp * Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0)
        ));
    }

    #[test]
    fn slice_is_column_major() {
        let m = Mat4::translation(Vec3::new(4.0, 5.0, 6.0));
        let slice = m.as_slice();
        assert_eq!(slice.len(), 16);
        assert_eq!(&slice[12..15], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn vector_array_views() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v.as_array_mut()[1] = 7.0;
        assert_eq!(v, Vec3::from([1.0, 7.0, 3.0]));
        assert_eq!(<[f32; 4]>::from(Vec4::new(1.0, 2.0, 3.0, 4.0)), [1.0, 2.0, 3.0, 4.0]);
    }
}
