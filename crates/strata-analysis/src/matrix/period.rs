//! Period of a class from the diagonal of its submatrix powers.
//!
//! For `t = 1..=n` (n = class size) the submatrix is raised to the power `t`;
//! whenever some diagonal entry is strictly positive, some member can return
//! to itself in exactly `t` steps and `t` is recorded. The period is the
//! greatest common divisor of the recorded times.
//!
//! Only returns observed within `n` steps are considered. A class where no
//! return is observed (a transient singleton without self-loop) has an
//! undetermined period, which is kept distinct from a period of 1.

use std::fmt;

use serde::Serialize;

use super::Matrix;

/// Period of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// No return observed within `size` steps.
    Undetermined,
    /// GCD of the observed return times (always ≥ 1).
    Periodic(usize),
}

impl Period {
    /// Numeric form: the period, or 0 for [`Period::Undetermined`].
    #[must_use]
    pub const fn as_raw(self) -> usize {
        match self {
            Self::Undetermined => 0,
            Self::Periodic(p) => p,
        }
    }

    /// Return `true` for a period of exactly 1.
    #[must_use]
    pub const fn is_aperiodic(self) -> bool {
        matches!(self, Self::Periodic(1))
    }

    const fn from_raw(raw: usize) -> Self {
        if raw == 0 {
            Self::Undetermined
        } else {
            Self::Periodic(raw)
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined => write!(f, "undetermined"),
            Self::Periodic(p) => write!(f, "{p}"),
        }
    }
}

/// Compute the period of a class submatrix.
#[must_use]
pub fn period(sub_matrix: &Matrix) -> Period {
    let n = sub_matrix.size();
    let mut power = sub_matrix.clone();
    let mut divisor = 0;

    for t in 1..=n {
        if power.has_positive_diagonal() {
            divisor = gcd(divisor, t);
        }
        if t < n {
            power = power.product(sub_matrix);
        }
    }

    Period::from_raw(divisor)
}

/// Euclid's algorithm; `gcd(0, t) = t`, so folding from 0 over an empty set
/// yields 0.
const fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
