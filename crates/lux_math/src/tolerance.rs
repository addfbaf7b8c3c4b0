/// Numeric tolerance shared by every intersection routine.
///
/// Hits closer than `epsilon` along the ray are discarded, near-parallel
/// configurations (denominators or determinants below `epsilon`) count as a
/// miss, and secondary rays are offset from surfaces by `epsilon` along the
/// normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub epsilon: f32,
}

impl Tolerance {
    /// Default tolerance tuned for single precision scenes of roughly unit scale.
    pub const DEFAULT: Tolerance = Tolerance { epsilon: 1e-4 };

    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// True if `x` is close enough to zero to be treated as zero.
    #[inline]
    pub fn is_zero(&self, x: f32) -> bool {
        x.abs() < self.epsilon
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
