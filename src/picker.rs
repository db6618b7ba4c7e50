use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{RandPathError, Result};
use crate::scan::FileRecord;

/// Uniform choice over a scan result. Seeded once per process.
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    /// Seed from the wall clock. Not suitable for anything security related.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::seeded(seed)
    }

    pub fn seeded(seed: u64) -> Self {
        tracing::debug!("Random picker seeded with {}", seed);
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pick<'a>(&mut self, files: &'a [FileRecord]) -> Result<&'a FileRecord> {
        if files.is_empty() {
            return Err(RandPathError::EmptySelection);
        }
        let index = self.rng.random_range(0..files.len());
        Ok(&files[index])
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::from_time()
    }
}
