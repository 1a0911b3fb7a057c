//! Small deterministic RNG for names, ids and mock wallet addresses.
//!
//! Seeded explicitly so tests are reproducible; the browser build seeds it
//! from the clock.

// ── RNG (64-bit LCG) ──────────────────────────────────────────

fn next_rng(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

#[derive(Clone, Debug)]
pub struct SeedRng {
    seed: u64,
}

impl SeedRng {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Uniform-ish value in `0..max`. `max` must be non-zero.
    pub fn range(&mut self, max: u32) -> u32 {
        self.seed = next_rng(self.seed);
        ((self.seed >> 33) % max as u64) as u32
    }

    /// `len` lowercase hex digits.
    pub fn hex(&mut self, len: usize) -> String {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        (0..len)
            .map(|_| DIGITS[self.range(16) as usize] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeedRng::new(7);
        let mut b = SeedRng::new(7);
        for _ in 0..20 {
            assert_eq!(a.range(1000), b.range(1000));
        }
    }

    #[test]
    fn range_stays_below_max() {
        let mut rng = SeedRng::new(1);
        for _ in 0..1000 {
            assert!(rng.range(10) < 10);
        }
    }

    #[test]
    fn hex_has_requested_length() {
        let mut rng = SeedRng::new(3);
        let s = rng.hex(40);
        assert_eq!(s.len(), 40);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
