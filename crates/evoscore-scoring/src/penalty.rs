use crate::BScoreConfigError;

/// A logarithmic barrier around a `[min, max]` band of fractions.
///
/// Values inside the band cost nothing. Outside it the relative distance to the band is
///
/// - `1 - value / min` below the band
/// - `(value - max) / (1 - max)` above the band
///
/// and the penalty is `hardness × ln(1 - distance)`: zero at the boundary, strictly
/// negative outside, and unbounded as the distance approaches one.
///
/// The distance saturates at one, so values outside `[0, 1]` (or above a band that ends
/// at 1) cost negative infinity rather than NaN.
///
/// # Example
///
/// ```
/// use evoscore_scoring::ThresholdPenalty;
///
/// let band = ThresholdPenalty::new(0.5, 0.8, 1.0).unwrap();
/// assert_eq!(band.penalty(0.6), 0.0);
/// assert!(band.penalty(0.4) < 0.0);
/// assert!(band.penalty(0.1) < band.penalty(0.4));
/// assert_eq!(band.penalty(0.0), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPenalty {
    min: f64,
    max: f64,
    hardness: f64,
}

impl ThresholdPenalty {
    /// Requires `0 < min <= max <= 1` and `hardness > 0`.
    pub fn new(min: f64, max: f64, hardness: f64) -> Result<Self, BScoreConfigError> {
        if !(0.0 < min && min <= max && max <= 1.0) {
            return Err(BScoreConfigError::InvalidThresholds { min, max });
        }
        if hardness.is_nan() || hardness <= 0.0 {
            return Err(BScoreConfigError::NonPositiveHardness { hardness });
        }
        Ok(Self { min, max, hardness })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn hardness(&self) -> f64 {
        self.hardness
    }

    /// Returns the relative distance from `value` to the band, in `[0, 1]`.
    #[must_use]
    pub fn distance(&self, value: f64) -> f64 {
        let dst = if value < self.min {
            1.0 - value / self.min
        } else if value > self.max {
            if self.max < 1.0 {
                (value - self.max) / (1.0 - self.max)
            } else {
                1.0
            }
        } else {
            0.0
        };
        dst.min(1.0)
    }

    #[must_use]
    pub fn penalty(&self, value: f64) -> f64 {
        self.hardness * (1.0 - self.distance(value)).ln()
    }
}
