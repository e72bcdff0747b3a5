//! Bounded uniform sampling without replacement
//!
//! Given `N` candidates and a requested size `k`: when `N <= k` every
//! candidate is returned as [`SampleOutcome::Complete`]; otherwise exactly
//! `k` distinct candidates are drawn uniformly at random and returned as
//! [`SampleOutcome::Sampled`], in their original relative order.

use crate::domain::{AuditError, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Requested sample size, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleSize(usize);

impl SampleSize {
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] when `k <= 0`
    pub fn new(k: i64) -> Result<Self> {
        if k <= 0 {
            return Err(AuditError::InvalidInput(format!(
                "sample size must be > 0, got {k}"
            )));
        }
        usize::try_from(k)
            .map(Self)
            .map_err(|_| AuditError::InvalidInput(format!("sample size {k} is too large")))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a sampling step
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome<T> {
    /// Candidate set was no larger than the requested size; all returned
    Complete(Vec<T>),
    /// A strict random subset of the candidates
    Sampled(Vec<T>),
}

impl<T> SampleOutcome<T> {
    pub fn items(&self) -> &[T] {
        match self {
            SampleOutcome::Complete(items) | SampleOutcome::Sampled(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            SampleOutcome::Complete(items) | SampleOutcome::Sampled(items) => items,
        }
    }

    /// True when every candidate is in the result
    pub fn is_complete(&self) -> bool {
        matches!(self, SampleOutcome::Complete(_))
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Transforms the items while keeping the variant
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SampleOutcome<U> {
        match self {
            SampleOutcome::Complete(items) => {
                SampleOutcome::Complete(items.into_iter().map(f).collect())
            }
            SampleOutcome::Sampled(items) => {
                SampleOutcome::Sampled(items.into_iter().map(f).collect())
            }
        }
    }
}

/// Random sampler over an injectable RNG
pub struct Sampler<R: Rng = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Non-reproducible sampler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sampler for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl<R: Rng> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws `min(N, k)` distinct candidates
    pub fn sample<T>(&mut self, candidates: Vec<T>, size: SampleSize) -> SampleOutcome<T> {
        let k = size.get();
        if candidates.len() <= k {
            return SampleOutcome::Complete(candidates);
        }

        let mut picked = index::sample(&mut self.rng, candidates.len(), k).into_vec();
        picked.sort_unstable();

        let mut slots: Vec<Option<T>> = candidates.into_iter().map(Some).collect();
        let chosen = picked
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        SampleOutcome::Sampled(chosen)
    }
}

impl<R: Rng> fmt::Debug for Sampler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}
