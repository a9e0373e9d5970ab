use crate::{data::ObservationSequence, hmm::Model};
use rand_xoshiro::{
    Xoshiro256PlusPlus,
    rand_core::{RngCore, SeedableRng},
};

/// Derives one independent seed per restart from a master seed.
///
/// Each restart seeds its own generator from its entry, so a restart draws
/// the same initial model whether restarts run in order or concurrently.
#[must_use]
pub fn restart_seeds(master: u64, restarts: usize) -> Vec<u64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(master);
    (0..restarts).map(|_| rng.next_u64()).collect()
}

/// A seed taken from the system clock, for runs without a configured seed.
#[must_use]
pub fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    // Truncation keeps the fast-changing low bits
    #[allow(clippy::cast_possible_truncation)]
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

/// A uniform draw from `[0, 1)` using the top 53 bits of a `u64`.
#[inline]
#[allow(clippy::cast_precision_loss)]
fn unit_f64<R: RngCore>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
}

/// Draws an index from the categorical distribution `probs`.
#[inline]
fn categorical<R: RngCore>(rng: &mut R, probs: &[f64]) -> usize {
    let u = unit_f64(rng);
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return i;
        }
    }
    // Rounding can leave the cumulative sum just under one
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}

/// A uniformly random observation sequence over `n_symbols` symbols.
///
/// ## Panics
///
/// `n_symbols` must be nonzero.
#[must_use]
pub fn rand_observations(n_symbols: usize, length: usize, seed: u64) -> ObservationSequence {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let symbols = (0..length).map(|_| rng.next_u32() as usize % n_symbols).collect();
    ObservationSequence::new_unchecked(symbols, n_symbols)
}

/// Samples a hidden state path of `length` steps from `model` along with the
/// observations it emits.
#[must_use]
pub fn sample_observations(model: &Model, length: usize, seed: u64) -> (Vec<usize>, ObservationSequence) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut states = Vec::with_capacity(length);
    let mut symbols = Vec::with_capacity(length);

    let mut state = categorical(&mut rng, model.initial());
    for t in 0..length {
        if t > 0 {
            state = categorical(&mut rng, model.transition().row(state));
        }
        states.push(state);
        symbols.push(categorical(&mut rng, model.emission().row(state)));
    }

    (states, ObservationSequence::new_unchecked(symbols, model.n_symbols()))
}
