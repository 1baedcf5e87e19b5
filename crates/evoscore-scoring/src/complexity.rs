//! Occam's razor calibration.
//!
//! The complexity penalty of a candidate is `complexity × coef` whenever the penalty is
//! enabled. The coefficient is derived either from an alphabet size and a noise level
//! (a Bayesian argument: each extra symbol costs as much as the information one noisy
//! observation carries) or directly from a complexity ratio (`coef = 1 / ratio`).
//!
//! | Form     | Coefficient                    | Enabled when      |
//! |----------|--------------------------------|-------------------|
//! | discrete | `-ln(a) / ln(p / (1 - p))`     | `0 < p < 0.5`     |
//! | contin   | `2 σ² ln(a)`                   | `σ > 0`           |
//! | ratio    | `1 / ratio`                    | `ratio > 0`       |

/// The Occam's razor calibration of a scorer.
///
/// The default value is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexityPenalty {
    enabled: bool,
    coef: f64,
}

impl ComplexityPenalty {
    pub const DISABLED: Self = Self {
        enabled: false,
        coef: 0.0,
    };

    /// Calibrates from the alphabet size and the probability `p` that an output is noisy.
    ///
    /// Disabled unless `0 < p < 0.5`: at `p >= 0.5` the data carries no information, so
    /// no amount of simplicity can be traded against it.
    ///
    /// # Examples
    ///
    /// ```
    /// use evoscore_scoring::ComplexityPenalty;
    ///
    /// let penalty = ComplexityPenalty::discrete(4, 0.1);
    /// assert!(penalty.is_enabled());
    /// assert!((penalty.coef() - 4.0_f64.ln() / 9.0_f64.ln()).abs() < 1e-12);
    ///
    /// assert!(!ComplexityPenalty::discrete(4, 0.5).is_enabled());
    /// ```
    #[must_use]
    pub fn discrete(alphabet_size: usize, noise: f64) -> Self {
        let penalty = if noise > 0.0 && noise < 0.5 {
            Self::enabled(-ln_alphabet(alphabet_size) / (noise / (1.0 - noise)).ln())
        } else {
            Self::DISABLED
        };
        tracing::info!(
            alphabet_size,
            noise,
            complexity_ratio = penalty.ratio(),
            "calibrated discrete complexity penalty"
        );
        penalty
    }

    /// Calibrates from the alphabet size and the standard deviation of the output noise.
    #[must_use]
    pub fn contin(alphabet_size: usize, stdev: f64) -> Self {
        let penalty = if stdev > 0.0 {
            Self::enabled(ln_alphabet(alphabet_size) * 2.0 * stdev * stdev)
        } else {
            Self::DISABLED
        };
        tracing::info!(
            alphabet_size,
            stdev,
            complexity_ratio = penalty.ratio(),
            "calibrated contin complexity penalty"
        );
        penalty
    }

    /// Calibrates from a complexity ratio; the coefficient is its reciprocal.
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        let penalty = if ratio > 0.0 {
            Self::enabled(1.0 / ratio)
        } else {
            Self::DISABLED
        };
        tracing::info!(complexity_ratio = ratio, "calibrated complexity penalty from ratio");
        penalty
    }

    fn enabled(coef: f64) -> Self {
        Self {
            enabled: true,
            coef,
        }
    }

    /// Divides the coefficient, for scorers whose components are normalized by the
    /// table size.
    #[must_use]
    pub fn scaled(self, divisor: f64) -> Self {
        Self {
            coef: self.coef / divisor,
            ..self
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn coef(&self) -> f64 {
        self.coef
    }

    /// Returns `1 / coef`, or infinity when the penalty is disabled or zero.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.enabled && self.coef != 0.0 {
            1.0 / self.coef
        } else {
            f64::INFINITY
        }
    }

    /// Returns the penalty for a candidate of the given complexity.
    #[must_use]
    pub fn penalty(&self, complexity: f64) -> f64 {
        if self.enabled {
            complexity * self.coef
        } else {
            0.0
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn ln_alphabet(alphabet_size: usize) -> f64 {
    (alphabet_size as f64).ln()
}
