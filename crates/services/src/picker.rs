use rand::Rng;

use flashcards_core::session::IndexPicker;

/// Thread-local RNG backed index picker, the production random source for
/// quiz draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl IndexPicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_bounds() {
        let mut picker = RandomPicker;
        for len in 1..=8 {
            for _ in 0..100 {
                assert!(picker.pick(len) < len);
            }
        }
    }

    #[test]
    fn draws_are_roughly_uniform() {
        let mut picker = RandomPicker;
        let mut counts = [0usize; 4];
        for _ in 0..10_000 {
            counts[picker.pick(4)] += 1;
        }

        // Expected 2500 per bucket; the band is several standard deviations
        // wide so the test stays stable.
        for count in counts {
            assert!((2200..=2800).contains(&count), "skewed draw counts: {counts:?}");
        }
    }
}
