//! Pure number kernels behind the `fibonacci`, `prime`, `hcf` and `lcm` keys.
//!
//! Every function re-checks its own bounds so it is safe to call without the
//! dispatcher in front of it.

use thiserror::Error;

/// Largest accepted `fibonacci` input.
pub const FIBONACCI_MAX: i64 = 50;

/// Largest accepted `prime` array.
pub const PRIME_MAX_ELEMENTS: usize = 1000;

/// Largest accepted `hcf`/`lcm` array.
pub const DIVISOR_MAX_ELEMENTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("Input must be a non-negative integer")]
    Negative,

    #[error("Fibonacci input too large (max 50)")]
    FibonacciTooLarge,

    #[error("Array cannot be empty")]
    Empty,

    #[error("Array too large (max {0} elements)")]
    TooManyElements(usize),

    #[error("Array cannot contain zero")]
    ContainsZero,

    #[error("LCM result exceeds supported range")]
    Overflow,
}

/// First `n` terms of 0, 1, 1, 2, 3, ...
pub fn fibonacci(n: i64) -> Result<Vec<u64>, KernelError> {
    if n < 0 {
        return Err(KernelError::Negative);
    }
    if n > FIBONACCI_MAX {
        return Err(KernelError::FibonacciTooLarge);
    }

    let n = n as usize;
    let mut sequence = Vec::with_capacity(n);
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        sequence.push(a);
        (a, b) = (b, a + b);
    }
    Ok(sequence)
}

pub fn is_prime(x: i64) -> bool {
    if x < 2 {
        return false;
    }
    if x == 2 {
        return true;
    }
    if x % 2 == 0 {
        return false;
    }

    // i * i stays below u64::MAX for any divisor up to sqrt(i64::MAX)
    let x = x as u64;
    let mut i = 3u64;
    while i * i <= x {
        if x % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Primes from `values`, in their original order.
pub fn filter_primes(values: &[i64]) -> Result<Vec<i64>, KernelError> {
    check_len(values, PRIME_MAX_ELEMENTS)?;
    Ok(values.iter().copied().filter(|&v| is_prime(v)).collect())
}

/// Euclid on absolute values. `gcd(0, 0)` is 0.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `|a * b| / gcd(a, b)`, or `None` when the result overflows.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

pub fn hcf_of(values: &[i64]) -> Result<u64, KernelError> {
    check_divisor_input(values)?;
    Ok(values
        .iter()
        .map(|v| v.unsigned_abs())
        .fold(0, gcd))
}

pub fn lcm_of(values: &[i64]) -> Result<u64, KernelError> {
    check_divisor_input(values)?;
    values
        .iter()
        .map(|v| v.unsigned_abs())
        .try_fold(1u64, lcm)
        .ok_or(KernelError::Overflow)
}

fn check_len(values: &[i64], max: usize) -> Result<(), KernelError> {
    if values.is_empty() {
        return Err(KernelError::Empty);
    }
    if values.len() > max {
        return Err(KernelError::TooManyElements(max));
    }
    Ok(())
}

fn check_divisor_input(values: &[i64]) -> Result<(), KernelError> {
    check_len(values, DIVISOR_MAX_ELEMENTS)?;
    if values.contains(&0) {
        return Err(KernelError::ContainsZero);
    }
    Ok(())
}
