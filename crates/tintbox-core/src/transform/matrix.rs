//! 4×5 affine color matrix over RGBA.
//!
//! Row `i` computes output channel `i` as a linear combination of the input
//! R, G, B, A channels plus a constant offset in column 5. Offsets are in
//! normalized channel units, so `1.0` is full scale.
//!
//! ```text
//! | R' |   | m00 m01 m02 m03 | m04 |   | R |
//! | G' | = | m10 m11 m12 m13 | m14 | × | G |
//! | B' |   | m20 m21 m22 m23 | m24 |   | B |
//! | A' |   | m30 m31 m32 m33 | m34 |   | A |
//!                                      | 1 |
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of rows (output channels).
pub const ROWS: usize = 4;
/// Number of columns (four channel weights plus one offset).
pub const COLUMNS: usize = 5;
/// Total coefficient count.
pub const LEN: usize = ROWS * COLUMNS;

/// Column index of the constant offset.
const OFFSET: usize = 4;

/// A 4×5 color matrix stored row-major as 20 coefficients in `[R, G, B, A]`
/// row order.
#[derive(Clone, Copy, PartialEq)]
pub struct ColorMatrix([f64; LEN]);

impl ColorMatrix {
    /// The no-op transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// Build a matrix from 20 row-major coefficients.
    pub const fn from_array(coefficients: [f64; LEN]) -> Self {
        Self(coefficients)
    }

    /// Build a matrix from four `[r, g, b, a, offset]` rows.
    pub fn from_rows(rows: [[f64; COLUMNS]; ROWS]) -> Self {
        let mut m = [0.0; LEN];
        for (i, row) in rows.iter().enumerate() {
            m[i * COLUMNS..(i + 1) * COLUMNS].copy_from_slice(row);
        }
        Self(m)
    }

    /// The 20 row-major coefficients.
    pub const fn as_array(&self) -> &[f64; LEN] {
        &self.0
    }

    /// The matrix as four `[r, g, b, a, offset]` rows.
    pub fn rows(&self) -> [[f64; COLUMNS]; ROWS] {
        std::array::from_fn(|i| std::array::from_fn(|j| self.get(i, j)))
    }

    /// Coefficient at `row`, `col`.
    ///
    /// # Panics
    /// Panics if `row >= 4` or `col >= 5`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < ROWS && col < COLUMNS, "matrix index ({row}, {col}) out of range");
        self.0[row * COLUMNS + col]
    }

    /// Coefficients narrowed to `f32` for GPU upload.
    pub fn to_f32_array(&self) -> [f32; LEN] {
        self.0.map(|c| c as f32)
    }

    /// Whether every coefficient matches the identity exactly.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Element-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Evaluate the affine map on one normalized RGBA color. No clamping.
    #[inline]
    pub fn transform(&self, rgba: [f64; 4]) -> [f64; 4] {
        let m = &self.0;
        std::array::from_fn(|i| {
            let r = i * COLUMNS;
            m[r] * rgba[0]
                + m[r + 1] * rgba[1]
                + m[r + 2] * rgba[2]
                + m[r + 3] * rgba[3]
                + m[r + OFFSET]
        })
    }

    /// Compose two transforms: the result applies `inner` first, then `outer`.
    ///
    /// Treats both operands as 5×5 augmented matrices whose implicit last
    /// row is `[0, 0, 0, 0, 1]`:
    ///
    /// ```text
    /// out[i][j] = Σk outer[i][k] × inner[k][j]                  (j < 4)
    /// out[i][4] = Σk outer[i][k] × inner[k][4] + outer[i][4]
    /// ```
    pub fn compose(outer: &Self, inner: &Self) -> Self {
        let mut out = [0.0; LEN];
        for i in 0..ROWS {
            for j in 0..COLUMNS {
                let mut sum = 0.0;
                for k in 0..ROWS {
                    sum += outer.get(i, k) * inner.get(k, j);
                }
                if j == OFFSET {
                    sum += outer.get(i, OFFSET);
                }
                out[i * COLUMNS + j] = sum;
            }
        }
        Self(out)
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; LEN]> for ColorMatrix {
    fn from(coefficients: [f64; LEN]) -> Self {
        Self(coefficients)
    }
}

impl fmt::Debug for ColorMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for row in self.rows() {
            list.entry(&row);
        }
        list.finish()
    }
}

impl Serialize for ColorMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColorMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        let coefficients: [f64; LEN] = values.try_into().map_err(|v: Vec<f64>| {
            serde::de::Error::invalid_length(v.len(), &"exactly 20 color matrix coefficients")
        })?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(serde::de::Error::custom("color matrix coefficients must be finite"));
        }
        Ok(Self(coefficients))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn sample_a() -> ColorMatrix {
        ColorMatrix::from_rows([
            [0.9, 0.1, 0.0, 0.0, 0.05],
            [0.2, 0.7, 0.1, 0.0, -0.02],
            [0.0, 0.3, 0.6, 0.1, 0.1],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    fn sample_b() -> ColorMatrix {
        ColorMatrix::from_rows([
            [1.2, -0.1, 0.0, 0.0, -0.1],
            [0.0, 1.1, 0.0, 0.0, 0.0],
            [0.05, 0.05, 0.9, 0.0, 0.2],
            [0.0, 0.0, 0.0, 0.8, 0.1],
        ])
    }

    fn sample_c() -> ColorMatrix {
        ColorMatrix::from_rows([
            [0.393, 0.769, 0.189, 0.0, 0.0],
            [0.349, 0.686, 0.168, 0.0, 0.0],
            [0.272, 0.534, 0.131, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn test_identity_has_unit_diagonal_and_zero_offsets() {
        let m = ColorMatrix::IDENTITY;
        for i in 0..ROWS {
            for j in 0..COLUMNS {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(m.get(i, j), expected, "({i}, {j})");
            }
        }
    }

    #[test]
    fn test_compose_with_identity_is_noop() {
        let m = sample_a();
        assert!(ColorMatrix::compose(&ColorMatrix::IDENTITY, &m).approx_eq(&m, EPSILON));
        assert!(ColorMatrix::compose(&m, &ColorMatrix::IDENTITY).approx_eq(&m, EPSILON));
    }

    #[test]
    fn test_compose_is_associative() {
        let (a, b, c) = (sample_a(), sample_b(), sample_c());
        let left = ColorMatrix::compose(&a, &ColorMatrix::compose(&b, &c));
        let right = ColorMatrix::compose(&ColorMatrix::compose(&a, &b), &c);
        assert!(left.approx_eq(&right, EPSILON), "{left:?} vs {right:?}");
    }

    #[test]
    fn test_compose_applies_inner_first() {
        let (outer, inner) = (sample_a(), sample_b());
        let color = [0.3, 0.6, 0.9, 0.75];
        let sequential = outer.transform(inner.transform(color));
        let combined = ColorMatrix::compose(&outer, &inner).transform(color);
        for c in 0..4 {
            assert!(
                (sequential[c] - combined[c]).abs() < EPSILON,
                "channel {c}: {} vs {}",
                sequential[c],
                combined[c]
            );
        }
    }

    #[test]
    fn test_compose_is_not_commutative() {
        let ab = ColorMatrix::compose(&sample_a(), &sample_b());
        let ba = ColorMatrix::compose(&sample_b(), &sample_a());
        assert!(!ab.approx_eq(&ba, EPSILON));
    }

    #[test]
    fn test_from_rows_round_trips_through_rows() {
        let m = sample_c();
        assert_eq!(ColorMatrix::from_rows(m.rows()), m);
    }

    #[test]
    fn test_serde_rejects_wrong_length() {
        let err = serde_json::from_str::<ColorMatrix>("[1, 0, 0]").unwrap_err();
        assert!(err.to_string().contains("20"), "{err}");
    }

    #[test]
    fn test_serde_flat_array() {
        let json = serde_json::to_string(&ColorMatrix::IDENTITY).unwrap();
        assert_eq!(
            json,
            "[1.0,0.0,0.0,0.0,0.0,0.0,1.0,0.0,0.0,0.0,0.0,0.0,1.0,0.0,0.0,0.0,0.0,0.0,1.0,0.0]"
        );
        let back: ColorMatrix = serde_json::from_str(&json).unwrap();
        assert!(back.is_identity());
    }
}
