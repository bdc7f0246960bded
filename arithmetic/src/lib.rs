//! Integer math helpers shared by the epoch-transition engine.
//!
//! Everything here is deliberately narrow: unsigned, saturating where the consensus rules call
//! for saturation, and widened to 128 bits wherever a product of two `u64` balances could
//! overflow before the corresponding division brings it back down.

use easy_ext::ext;

#[ext(pub, name = U64Ext)]
impl u64 {
    /// Integer square root, defined as `0` for `0`. Uses Newton's method, which converges to the
    /// unique `x` with `x * x <= n < (x + 1) * (x + 1)` in a handful of iterations for any `u64`.
    #[must_use]
    fn integer_sqrt(self) -> u64 {
        isqrt(self)
    }

    /// `self * numerator / denominator`, rounded down, computed with a `u128` intermediate so the
    /// multiplication cannot overflow. Returns `0` if `denominator` is `0` rather than panicking;
    /// callers that can reach a zero denominator are expected to have already floored it (see
    /// `EpochSummary::total_active_stake`).
    #[must_use]
    fn mul_div_floor(self, numerator: u64, denominator: u64) -> u64 {
        mul_div_floor_u128(self, numerator, denominator)
    }
}

/// Integer square root, defined as `0` for `0`.
#[must_use]
pub fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }

    let mut x = n;
    let mut y = x / 2 + 1;

    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }

    x
}

/// `value * numerator / denominator`, rounded down, via a `u128` intermediate.
#[must_use]
pub fn mul_div_floor_u128(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }

    let product = u128::from(value) * u128::from(numerator);

    u64::try_from(product / u128::from(denominator)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0 => 0)]
    #[test_case(1 => 1)]
    #[test_case(2 => 1)]
    #[test_case(3 => 1)]
    #[test_case(4 => 2)]
    #[test_case(8 => 2)]
    #[test_case(9 => 3)]
    #[test_case(3_200_000_000_000 => 1_788_854)]
    #[test_case(u64::MAX => 4_294_967_295)]
    fn isqrt_matches_reference(n: u64) -> u64 {
        isqrt(n)
    }

    #[test]
    fn mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor_u128(32_000_000_000, 96_000_000_000, 3_200_000_000_000), 960_000_000);
    }

    #[test]
    fn mul_div_floor_with_zero_denominator_is_zero() {
        assert_eq!(mul_div_floor_u128(1, 1, 0), 0);
    }

    #[test]
    fn mul_div_floor_does_not_overflow_u64() {
        assert_eq!(
            mul_div_floor_u128(u64::MAX, u64::MAX, u64::MAX),
            u64::MAX,
        );
    }
}
