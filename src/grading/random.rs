use rand::Rng;

/// Source of uniform draws in `[0, 1)` used to shuffle choices.
pub trait RandomSource {
    fn next(&mut self) -> f64;
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next(&mut self) -> f64 {
        self()
    }
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

pub fn identity_permutation(count: usize) -> Vec<usize> {
    (0..count).collect()
}

/// Draws items one at a time from the remaining candidates.
pub fn random_permutation(count: usize, random: &mut dyn RandomSource) -> Vec<usize> {
    let mut remaining = identity_permutation(count);
    let mut permutation = Vec::with_capacity(count);
    while !remaining.is_empty() {
        let draw = (random.next() * remaining.len() as f64).floor() as usize;
        permutation.push(remaining.remove(draw.min(remaining.len() - 1)));
    }
    permutation
}

pub(crate) fn is_permutation(permutation: &[usize], count: usize) -> bool {
    let mut seen = vec![false; count];
    permutation.len() == count
        && permutation.iter().all(|&i| i < count && !std::mem::replace(&mut seen[i], true))
}
