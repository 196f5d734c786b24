//! Overflow-checked amount arithmetic for distribution splits.

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
/// The multiply runs in 256 bits so a large weight times a large net pool
/// cannot wrap before the division brings the share back into range. All
/// inputs must be non-negative and the denominator non-zero.
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
