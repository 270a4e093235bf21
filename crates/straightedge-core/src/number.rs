//! Exact real numbers for compass-and-straightedge coordinates.
//!
//! Every coordinate produced by intersecting lines and circles is built from
//! rationals with the four field operations and square roots. [`Surd`] stores
//! such numbers exactly as a sum of rational multiples of square roots of
//! square-free integers:
//!
//! ```text
//! q₀ + q₁·√r₁ + q₂·√r₂ + …      qᵢ ∈ ℚ \ {0},  rᵢ square-free, pairwise distinct
//! ```
//!
//! Square roots of distinct square-free integers are linearly independent over
//! the rationals, so this form is canonical: two `Surd`s are numerically equal
//! exactly when their term maps are equal. That is what lets geometric
//! elements use derived `Eq` and `Hash` for identity.
//!
//! # Example
//!
//! ```
//! # use straightedge_core::number::{Surd, DEFAULT_FACTOR_LIMIT};
//! let three_quarters = Surd::from_ratio(3, 4);
//! let root = three_quarters.sqrt(DEFAULT_FACTOR_LIMIT).unwrap();
//! assert_eq!(root.to_string(), "√3/2");
//! assert_eq!(&root * &root, three_quarters);
//! ```

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound for trial division when extracting square factors.
pub const DEFAULT_FACTOR_LIMIT: u64 = 1_000_000;

/// Radicals nested deeper than this are reported as [`NumberError::NotInField`].
const MAX_DENEST_DEPTH: u32 = 6;

/// Errors raised by exact arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("square root of a negative number")]
    Negative,

    #[error("division by zero")]
    DivisionByZero,

    #[error("square root of {0} cannot be written with nested quadratic radicals")]
    NotInField(String),

    #[error("radicand {radicand} has a prime factor above the factoring limit {limit}")]
    RadicandTooLarge { radicand: String, limit: u64 },

    #[error("malformed number: {0}")]
    Malformed(String),
}

/// The square root of a square-free positive integer, stored as its sorted prime factors.
///
/// The empty factor list is the rational unit `√1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Radical(Vec<u64>);

impl Radical {
    /// The rational unit.
    pub fn one() -> Self {
        Self(Vec::new())
    }

    /// Builds a radical from prime factors.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::Malformed`] unless the factors are strictly
    /// increasing and greater than one.
    pub fn from_primes(primes: Vec<u64>) -> Result<Self, NumberError> {
        let increasing = primes.windows(2).all(|pair| pair[0] < pair[1]);
        if !increasing || primes.first().is_some_and(|&p| p < 2) {
            return Err(NumberError::Malformed(format!(
                "radicand factors {primes:?} are not strictly increasing primes"
            )));
        }
        Ok(Self(primes))
    }

    /// Returns `true` for the rational unit.
    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// The prime factors of the radicand, ascending.
    pub fn primes(&self) -> &[u64] {
        &self.0
    }

    /// The radicand as an integer.
    pub fn radicand(&self) -> BigUint {
        self.0
            .iter()
            .fold(BigUint::one(), |acc, &p| acc * BigUint::from(p))
    }

    fn contains(&self, prime: u64) -> bool {
        self.0.binary_search(&prime).is_ok()
    }

    fn without(&self, prime: u64) -> Self {
        Self(self.0.iter().copied().filter(|&p| p != prime).collect())
    }

    /// Multiplies two radicals: `√r · √s = g · √(r·s / g²)` where `g` is the
    /// product of the shared primes.
    fn product(&self, other: &Radical) -> (BigInt, Radical) {
        let mut shared = BigInt::one();
        let mut primes = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => {
                    primes.push(self.0[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    primes.push(other.0[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    shared *= BigInt::from(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        primes.extend_from_slice(&self.0[i..]);
        primes.extend_from_slice(&other.0[j..]);
        (shared, Radical(primes))
    }
}

impl fmt::Display for Radical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "√{}", self.radicand())
    }
}

/// An exact real number in a multi-quadratic field.
///
/// See the [module documentation](self) for the representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Term>", try_from = "Vec<Term>")]
pub struct Surd {
    terms: BTreeMap<Radical, BigRational>,
}

impl Surd {
    /// Zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// One.
    pub fn one() -> Self {
        Self::from_rational(BigRational::one())
    }

    /// Creates a number from an exact rational.
    pub fn from_rational(value: BigRational) -> Self {
        let mut surd = Self::zero();
        surd.add_term(Radical::one(), value);
        surd
    }

    /// Creates the rational `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn from_ratio(numer: i64, denom: i64) -> Self {
        Self::from_rational(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    fn from_prime_root(prime: u64) -> Self {
        let mut surd = Self::zero();
        surd.add_term(Radical(vec![prime]), BigRational::one());
        surd
    }

    fn from_unsigned(value: u64) -> Self {
        Self::from_rational(BigRational::from_integer(BigInt::from(value)))
    }

    /// Returns `true` if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns `true` if this number has no irrational part.
    pub fn is_rational(&self) -> bool {
        self.terms.keys().all(Radical::is_one)
    }

    /// Returns the value as a rational, if it is one.
    pub fn to_rational(&self) -> Option<BigRational> {
        if !self.is_rational() {
            return None;
        }
        Some(
            self.terms
                .get(&Radical::one())
                .cloned()
                .unwrap_or_else(BigRational::zero),
        )
    }

    /// Iterates over `(radical, coefficient)` terms in canonical order.
    pub fn terms(&self) -> impl Iterator<Item = (&Radical, &BigRational)> {
        self.terms.iter()
    }

    /// Floating point approximation, for presentation only.
    pub fn to_f64(&self) -> f64 {
        self.terms
            .iter()
            .map(|(radical, coefficient)| {
                let root = radical
                    .radicand()
                    .to_f64()
                    .map_or(f64::NAN, f64::sqrt);
                coefficient.to_f64().unwrap_or(f64::NAN) * root
            })
            .sum()
    }

    /// Multiplies by a rational.
    pub fn scale(&self, factor: &BigRational) -> Self {
        let mut out = Self::zero();
        for (radical, coefficient) in &self.terms {
            out.add_term(radical.clone(), coefficient * factor);
        }
        out
    }

    /// Returns `self * self`.
    pub fn square(&self) -> Self {
        self * self
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        if self.cmp_zero() == Ordering::Less {
            -self
        } else {
            self.clone()
        }
    }

    /// Exact sign of this number, as its ordering relative to zero.
    pub fn cmp_zero(&self) -> Ordering {
        let Some(prime) = self.largest_prime() else {
            return self
                .terms
                .get(&Radical::one())
                .map_or(Ordering::Equal, |q| q.cmp(&BigRational::zero()));
        };

        // self = a + b·√p with a, b free of p
        let (a, b) = self.split(prime);
        let sign_a = a.cmp_zero();
        let sign_b = b.cmp_zero();
        match (sign_a, sign_b) {
            (sign, Ordering::Equal) | (Ordering::Equal, sign) => sign,
            _ if sign_a == sign_b => sign_a,
            _ => {
                // Opposite signs: the larger magnitude wins.
                let gap = &a.square() - &(&b.square() * &Self::from_unsigned(prime));
                let sign = gap.cmp_zero();
                if sign_a == Ordering::Greater {
                    sign
                } else {
                    sign.reverse()
                }
            }
        }
    }

    /// Exact numeric comparison.
    ///
    /// This differs from the derived [`Ord`], which orders the canonical
    /// representation and is only meant for deterministic sorting.
    pub fn cmp_value(&self, other: &Surd) -> Ordering {
        (self - other).cmp_zero()
    }

    /// Multiplicative inverse.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] for zero.
    pub fn recip(&self) -> Result<Surd, NumberError> {
        if self.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        let Some(prime) = self.largest_prime() else {
            let value = self.to_rational().unwrap_or_else(BigRational::zero);
            return Ok(Self::from_rational(value.recip()));
        };

        // 1 / (a + b√p) = (a - b√p) / (a² - p·b²)
        let (a, b) = self.split(prime);
        let conjugate = &a - &(&b * &Self::from_prime_root(prime));
        let norm = &a.square() - &(&b.square() * &Self::from_unsigned(prime));
        Ok(&conjugate * &norm.recip()?)
    }

    /// Exact division.
    ///
    /// # Errors
    ///
    /// Returns [`NumberError::DivisionByZero`] if `divisor` is zero.
    pub fn checked_div(&self, divisor: &Surd) -> Result<Surd, NumberError> {
        Ok(self * &divisor.recip()?)
    }

    /// Exact square root.
    ///
    /// Rational radicands are factored by trial division up to `factor_limit`.
    /// Irrational radicands are denested as `√(a + b√p) = c + e√p`.
    ///
    /// # Errors
    ///
    /// - [`NumberError::Negative`] for negative input.
    /// - [`NumberError::RadicandTooLarge`] if factoring exceeds `factor_limit`.
    /// - [`NumberError::NotInField`] if the root cannot be denested.
    pub fn sqrt(&self, factor_limit: u64) -> Result<Surd, NumberError> {
        match self.cmp_zero() {
            Ordering::Less => return Err(NumberError::Negative),
            Ordering::Equal => return Ok(Self::zero()),
            Ordering::Greater => {}
        }
        self.denest(factor_limit, MAX_DENEST_DEPTH)?
            .ok_or_else(|| NumberError::NotInField(self.to_string()))
    }

    /// Square root of a positive number, or `None` when it has no denested form.
    fn denest(&self, factor_limit: u64, depth: u32) -> Result<Option<Surd>, NumberError> {
        let Some(prime) = self.largest_prime() else {
            let value = self.to_rational().unwrap_or_else(BigRational::zero);
            return rational_sqrt(&value, factor_limit).map(Some);
        };
        if depth == 0 {
            return Ok(None);
        }

        let (a, b) = self.split(prime);
        let norm = &a.square() - &(&b.square() * &Self::from_unsigned(prime));
        let delta = match norm.cmp_zero() {
            Ordering::Less => return Ok(None),
            Ordering::Equal => Self::zero(),
            Ordering::Greater => match norm.denest(factor_limit, depth - 1)? {
                Some(delta) => delta,
                None => return Ok(None),
            },
        };

        let half = BigRational::new(BigInt::one(), BigInt::from(2));
        let root_p = Self::from_prime_root(prime);
        for candidate in [&a + &delta, &a - &delta] {
            let c_squared = candidate.scale(&half);
            if c_squared.cmp_zero() != Ordering::Greater {
                continue;
            }
            let Some(c) = c_squared.denest(factor_limit, depth - 1)? else {
                continue;
            };
            let e = &b * &(&c * &Self::from_unsigned(2)).recip()?;
            let root = &c + &(&e * &root_p);
            if &root.square() == self {
                return Ok(Some(root.abs()));
            }
        }
        Ok(None)
    }

    fn largest_prime(&self) -> Option<u64> {
        self.terms
            .keys()
            .filter_map(|radical| radical.0.last().copied())
            .max()
    }

    /// Splits `self` into `(a, b)` with `self = a + b·√prime`.
    fn split(&self, prime: u64) -> (Surd, Surd) {
        let mut a = Self::zero();
        let mut b = Self::zero();
        for (radical, coefficient) in &self.terms {
            if radical.contains(prime) {
                b.add_term(radical.without(prime), coefficient.clone());
            } else {
                a.add_term(radical.clone(), coefficient.clone());
            }
        }
        (a, b)
    }

    fn add_term(&mut self, radical: Radical, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        let entry = self.terms.entry(radical).or_insert_with(BigRational::zero);
        *entry += coefficient;
        if entry.is_zero() {
            self.terms.retain(|_, q| !q.is_zero());
        }
    }
}

/// `√(n/d) = √(n·d) / d`, with the square part of `n·d` pulled out.
fn rational_sqrt(value: &BigRational, factor_limit: u64) -> Result<Surd, NumberError> {
    if value.is_negative() {
        return Err(NumberError::Negative);
    }
    if value.is_zero() {
        return Ok(Surd::zero());
    }
    let product = value.numer().magnitude() * value.denom().magnitude();
    let (square, primes) = split_square(&product, factor_limit)?;
    let mut root = Surd::zero();
    root.add_term(
        Radical(primes),
        BigRational::new(BigInt::from(square), value.denom().clone()),
    );
    Ok(root)
}

/// Writes `n = s² · r` with `r` square-free, returning `s` and the primes of `r`.
fn split_square(n: &BigUint, factor_limit: u64) -> Result<(BigUint, Vec<u64>), NumberError> {
    let mut rest = n.clone();
    let mut square = BigUint::one();
    let mut primes = Vec::new();
    let mut k: u64 = 2;
    while BigUint::from(k) * BigUint::from(k) <= rest {
        if k > factor_limit {
            return Err(NumberError::RadicandTooLarge {
                radicand: n.to_string(),
                limit: factor_limit,
            });
        }
        let divisor = BigUint::from(k);
        let mut odd = false;
        loop {
            let (quotient, remainder) = rest.div_rem(&divisor);
            if !remainder.is_zero() {
                break;
            }
            rest = quotient;
            odd = !odd;
            if !odd {
                square *= &divisor;
            }
        }
        if odd {
            primes.push(k);
        }
        k += if k == 2 { 1 } else { 2 };
    }
    if rest > BigUint::one() {
        let prime = rest.to_u64().ok_or_else(|| NumberError::RadicandTooLarge {
            radicand: n.to_string(),
            limit: factor_limit,
        })?;
        primes.push(prime);
    }
    Ok((square, primes))
}

impl From<i64> for Surd {
    fn from(value: i64) -> Self {
        Self::from_rational(BigRational::from_integer(BigInt::from(value)))
    }
}

impl From<i32> for Surd {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<BigInt> for Surd {
    fn from(value: BigInt) -> Self {
        Self::from_rational(BigRational::from_integer(value))
    }
}

impl From<BigRational> for Surd {
    fn from(value: BigRational) -> Self {
        Self::from_rational(value)
    }
}

impl Add<&Surd> for &Surd {
    type Output = Surd;

    fn add(self, rhs: &Surd) -> Surd {
        let mut out = self.clone();
        for (radical, coefficient) in &rhs.terms {
            out.add_term(radical.clone(), coefficient.clone());
        }
        out
    }
}

impl Sub<&Surd> for &Surd {
    type Output = Surd;

    fn sub(self, rhs: &Surd) -> Surd {
        let mut out = self.clone();
        for (radical, coefficient) in &rhs.terms {
            out.add_term(radical.clone(), -coefficient.clone());
        }
        out
    }
}

impl Mul<&Surd> for &Surd {
    type Output = Surd;

    fn mul(self, rhs: &Surd) -> Surd {
        let mut out = Surd::zero();
        for (left_radical, left) in &self.terms {
            for (right_radical, right) in &rhs.terms {
                let (shared, radical) = left_radical.product(right_radical);
                out.add_term(radical, left * right * BigRational::from_integer(shared));
            }
        }
        out
    }
}

impl Neg for &Surd {
    type Output = Surd;

    fn neg(self) -> Surd {
        Surd {
            terms: self
                .terms
                .iter()
                .map(|(radical, coefficient)| (radical.clone(), -coefficient.clone()))
                .collect(),
        }
    }
}

impl Neg for Surd {
    type Output = Surd;

    fn neg(self) -> Surd {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<Surd> for Surd {
            type Output = Surd;

            fn $method(self, rhs: Surd) -> Surd {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Surd> for Surd {
            type Output = Surd;

            fn $method(self, rhs: &Surd) -> Surd {
                (&self).$method(rhs)
            }
        }

        impl $trait<Surd> for &Surd {
            type Output = Surd;

            fn $method(self, rhs: Surd) -> Surd {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (position, (radical, coefficient)) in self.terms.iter().enumerate() {
            let magnitude = coefficient.abs();
            match (position, coefficient.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if radical.is_one() {
                write!(f, "{magnitude}")?;
                continue;
            }
            if !magnitude.numer().is_one() {
                write!(f, "{}", magnitude.numer())?;
            }
            write!(f, "{radical}")?;
            if !magnitude.denom().is_one() {
                write!(f, "/{}", magnitude.denom())?;
            }
        }
        Ok(())
    }
}

/// Serialized form of one term: `coefficient · √(product of radicand primes)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Rational coefficient as `n` or `n/d`.
    pub coefficient: String,
    /// Prime factors of the radicand, ascending; empty for the rational part.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub radicand: Vec<u64>,
}

impl From<Surd> for Vec<Term> {
    fn from(surd: Surd) -> Self {
        surd.terms
            .into_iter()
            .map(|(radical, coefficient)| Term {
                coefficient: coefficient.to_string(),
                radicand: radical.0,
            })
            .collect()
    }
}

impl TryFrom<Vec<Term>> for Surd {
    type Error = NumberError;

    fn try_from(terms: Vec<Term>) -> Result<Self, Self::Error> {
        let mut surd = Surd::zero();
        for term in terms {
            let coefficient = BigRational::from_str(&term.coefficient)
                .map_err(|err| NumberError::Malformed(format!("{}: {err}", term.coefficient)))?;
            surd.add_term(Radical::from_primes(term.radicand)?, coefficient);
        }
        Ok(surd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(n: i64) -> Surd {
        Surd::from(n).sqrt(DEFAULT_FACTOR_LIMIT).unwrap()
    }

    #[test]
    fn test_rational_sqrt_extracts_square_part() {
        assert_eq!(root(4), Surd::from(2));
        assert_eq!(root(12).to_string(), "2√3");
        assert_eq!(root(8), &Surd::from(2) * &root(2));
        assert_eq!(Surd::from_ratio(1, 4).sqrt(DEFAULT_FACTOR_LIMIT).unwrap(), Surd::from_ratio(1, 2));
    }

    #[test]
    fn test_products_of_radicals_are_canonical() {
        assert_eq!(&root(2) * &root(3), root(6));
        assert_eq!(&root(6) * &root(3), &Surd::from(3) * &root(2));
        assert_eq!(root(3).square(), Surd::from(3));
    }

    #[test]
    fn test_addition_cancels_terms() {
        let x = &Surd::from(1) + &root(3);
        let y = &Surd::from(1) - &root(3);
        assert_eq!(&x + &y, Surd::from(2));
        assert!((&x - &x).is_zero());
        assert!((&x - &x).terms().next().is_none());
    }

    #[test]
    fn test_sign_of_mixed_terms() {
        // 2 - √3 > 0, 1 - √3 < 0, √2 + √3 - √10 < 0
        assert_eq!((&Surd::from(2) - &root(3)).cmp_zero(), Ordering::Greater);
        assert_eq!((&Surd::from(1) - &root(3)).cmp_zero(), Ordering::Less);
        let mixed = &(&root(2) + &root(3)) - &root(10);
        assert_eq!(mixed.cmp_zero(), Ordering::Less);
        assert_eq!(Surd::zero().cmp_zero(), Ordering::Equal);
    }

    #[test]
    fn test_recip_rationalizes_denominator() {
        let x = &Surd::from(1) + &root(2);
        let inverse = x.recip().unwrap();
        assert_eq!(&x * &inverse, Surd::one());
        assert_eq!(inverse, &root(2) - &Surd::from(1));

        let y = &(&root(2) + &root(3)) + &Surd::from(1);
        assert_eq!(&y * &y.recip().unwrap(), Surd::one());
        assert_eq!(Surd::zero().recip(), Err(NumberError::DivisionByZero));
    }

    #[test]
    fn test_denesting() {
        // √(2 + √3) = (√6 + √2) / 2
        let x = &Surd::from(2) + &root(3);
        let expected = (&root(6) + &root(2)).scale(&BigRational::new(1.into(), 2.into()));
        assert_eq!(x.sqrt(DEFAULT_FACTOR_LIMIT).unwrap(), expected);

        // √(3 + 2√2) = 1 + √2
        let y = &Surd::from(3) + &(&Surd::from(2) * &root(2));
        assert_eq!(y.sqrt(DEFAULT_FACTOR_LIMIT).unwrap(), &Surd::one() + &root(2));
    }

    #[test]
    fn test_sqrt_failures() {
        assert_eq!(Surd::from(-1).sqrt(DEFAULT_FACTOR_LIMIT), Err(NumberError::Negative));
        let not_denestable = &Surd::from(1) + &root(2);
        assert!(matches!(
            not_denestable.sqrt(DEFAULT_FACTOR_LIMIT),
            Err(NumberError::NotInField(_))
        ));
        // 1_000_003 is prime, far above the limit
        let big = Surd::from(1_000_003_i64 * 1_000_003 * 2);
        assert!(matches!(
            big.sqrt(1_000),
            Err(NumberError::RadicandTooLarge { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Surd::zero().to_string(), "0");
        assert_eq!(Surd::from_ratio(-3, 4).to_string(), "-3/4");
        let x = &Surd::from_ratio(1, 2) - &root(3).scale(&BigRational::new(1.into(), 2.into()));
        assert_eq!(x.to_string(), "1/2 - √3/2");
    }

    #[test]
    fn test_serde_roundtrip_preserves_identity() {
        let x = &Surd::from_ratio(1, 2) + &root(6);
        let json = serde_json::to_string(&x).unwrap();
        let back: Surd = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
    }

    #[test]
    fn test_malformed_radicand_is_rejected() {
        let json = r#"[{"coefficient":"1","radicand":[3,2]}]"#;
        assert!(serde_json::from_str::<Surd>(json).is_err());
    }

    #[test]
    fn test_to_f64() {
        let x = &Surd::from_ratio(1, 2) + &root(3);
        assert!((x.to_f64() - (0.5 + 3f64.sqrt())).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn surd_strategy() -> impl Strategy<Value = Surd> {
        (-20i64..20, 1i64..6, -20i64..20, prop::sample::select(vec![2i64, 3, 5, 6]))
            .prop_map(|(rational, denom, coefficient, radicand)| {
                let root = Surd::from(radicand).sqrt(DEFAULT_FACTOR_LIMIT).unwrap();
                &Surd::from_ratio(rational, denom) + &(&Surd::from(coefficient) * &root)
            })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Multiplying by the inverse yields one.
    fn check_recip_is_inverse(x: Surd) -> Result<(), TestCaseError> {
        prop_assume!(!x.is_zero());
        let inverse = x.recip().unwrap();
        prop_assert_eq!(&x * &inverse, Surd::one());
        Ok(())
    }

    /// The exact sign agrees with the floating point approximation.
    fn check_sign_matches_approximation(x: Surd) -> Result<(), TestCaseError> {
        let approx = x.to_f64();
        prop_assume!(approx.abs() > 1e-9);
        let expected = if approx > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        prop_assert_eq!(x.cmp_zero(), expected);
        Ok(())
    }

    /// The square root of a square is the absolute value.
    fn check_sqrt_of_square(x: Surd) -> Result<(), TestCaseError> {
        let root = x.square().sqrt(DEFAULT_FACTOR_LIMIT);
        prop_assert_eq!(root, Ok(x.abs()));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn recip_is_inverse(x in surd_strategy()) {
            check_recip_is_inverse(x)?;
        }

        #[test]
        fn sign_matches_approximation(x in surd_strategy()) {
            check_sign_matches_approximation(x)?;
        }

        #[test]
        fn sqrt_of_square(x in surd_strategy()) {
            check_sqrt_of_square(x)?;
        }
    }
}
