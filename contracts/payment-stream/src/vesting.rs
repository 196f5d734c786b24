//! Overflow-checked amount arithmetic and the stream vesting clock.

use soroban_sdk::{Env, I256};

use crate::Error;

/// Checked addition over the i128 amount domain.
pub fn checked_add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::ArithmeticOverflow)
}

/// Checked subtraction over the i128 amount domain.
pub fn checked_sub(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_sub(b).ok_or(Error::ArithmeticOverflow)
}

/// Compute `amount * numerator / denominator`, floor-rounded toward zero.
///
/// The product is carried in a 256-bit intermediate so that
/// `amount * numerator` never wraps before the division narrows it back
/// down. All inputs must be non-negative and the denominator non-zero.
pub fn proportion(
    env: &Env,
    amount: i128,
    numerator: i128,
    denominator: i128,
) -> Result<i128, Error> {
    if amount < 0 || numerator < 0 || denominator <= 0 {
        return Err(Error::ArithmeticOverflow);
    }

    let product = I256::from_i128(env, amount).mul(&I256::from_i128(env, numerator));
    let quotient = product.div(&I256::from_i128(env, denominator));

    quotient.to_i128().ok_or(Error::ArithmeticOverflow)
}

/// Amount vested at `reference_time` for a linear schedule.
///
/// The vesting clock only counts seconds the stream has actually spent
/// running: elapsed wall-clock time is clamped to the stream window and
/// then reduced by `total_paused_duration`, so time spent paused is
/// excluded permanently. Callers pick the reference time: the current
/// ledger timestamp for a running stream, or the pause instant for a
/// paused one, which is what pins the vested amount during a pause.
pub fn vested_amount(
    env: &Env,
    total_amount: i128,
    start_time: u64,
    end_time: u64,
    total_paused_duration: u64,
    reference_time: u64,
) -> Result<i128, Error> {
    // Creation guarantees end_time > start_time.
    let duration = end_time - start_time;

    let in_window = reference_time.min(end_time).saturating_sub(start_time);
    let elapsed = in_window.saturating_sub(total_paused_duration);

    proportion(env, total_amount, elapsed as i128, duration as i128)
}
