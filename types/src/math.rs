//! Fixed-point helpers for settlement math.
//!
//! Every amount is a `u128` raw unit. Per-weight quantities carry an extra
//! factor of [`SCALE`]. All helpers are checked: `None` means the result does
//! not fit, and callers turn that into their crate's arithmetic fault.

/// Fixed-point scale of the reward-per-weight accumulator (1e18).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// `a * b / d`, floored. `None` if the quotient does not fit or `d == 0`.
///
/// The product is formed in 256 bits, so only the result has to fit in a
/// `u128`.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    mul_add_div_rem(a, b, 0, d).map(|(q, _)| q)
}

/// `(a * b + c) / d` and its remainder. `None` if the quotient does not fit
/// or `d == 0`.
pub fn mul_add_div_rem(a: u128, b: u128, c: u128, d: u128) -> Option<(u128, u128)> {
    if d == 0 {
        return None;
    }
    let (hi, lo) = widening_mul(a, b);
    let (lo, overflow) = lo.overflowing_add(c);
    let hi = hi.checked_add(u128::from(overflow))?;
    div_wide(hi, lo, d)
}

const LOW_64: u128 = u64::MAX as u128;

/// Full 256-bit product as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_64);
    let (b1, b0) = (b >> 64, b & LOW_64);
    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & LOW_64) + (p10 & LOW_64);
    let lo = (p00 & LOW_64) | ((mid & LOW_64) << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Divide the 256-bit value `hi:lo` by `d`. The quotient fits in 128 bits
/// exactly when `hi < d`.
fn div_wide(hi: u128, lo: u128, d: u128) -> Option<(u128, u128)> {
    if hi >= d {
        return None;
    }
    if hi == 0 {
        return Some((lo / d, lo % d));
    }
    let mut rem = hi;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let top = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        // With the top bit set the shifted value is at least 2^128 > d.
        if top == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1 << bit;
        }
    }
    Some((quotient, rem))
}

/// `amount * pct / 100`, floored. `None` on overflow.
pub fn percent_of(amount: u128, pct: u32) -> Option<u128> {
    mul_div(amount, pct as u128, 100)
}

/// `amount * per_mille / 1000`, floored. `None` on overflow.
pub fn per_mille_of(amount: u128, per_mille: u32) -> Option<u128> {
    mul_div(amount, per_mille as u128, 1000)
}
