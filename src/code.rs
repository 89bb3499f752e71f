//! Room code generator
//!
//! Hands out short fixed-width codes that are unique among active rooms.
//! Codes are drawn at random from the whole space and rejected while they
//! collide with the live active set, so a released code is eligible again
//! on the very next draw.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::CodeConfig;
use crate::error::RegistryError;
use crate::types::RoomCode;

/// Generator and bookkeeper of active room codes
#[derive(Debug)]
pub struct CodeGenerator {
    config: CodeConfig,
    capacity: u64,
    active: HashSet<RoomCode>,
    rng: StdRng,
}

impl CodeGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new(config: CodeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a generator with a caller-supplied RNG (deterministic in tests)
    pub fn with_rng(config: CodeConfig, rng: StdRng) -> Self {
        let capacity = config.capacity();
        Self {
            config,
            capacity,
            active: HashSet::new(),
            rng,
        }
    }

    /// Produce a code not currently active and mark it active
    ///
    /// Fails with `CodeSpaceExhausted` only when every code is in use.
    pub fn generate(&mut self) -> Result<RoomCode, RegistryError> {
        if self.active.len() as u64 >= self.capacity {
            return Err(RegistryError::CodeSpaceExhausted {
                capacity: self.capacity,
            });
        }

        for _ in 0..self.config.max_attempts {
            let index = self.rng.gen_range(0..self.capacity);
            let code = self.encode(index);
            if self.active.insert(code.clone()) {
                return Ok(code);
            }
        }

        // Sampling kept colliding: walk the space from a random start.
        warn!(
            active = self.active.len(),
            capacity = self.capacity,
            "Room code sampling saturated, scanning code space"
        );
        let start = self.rng.gen_range(0..self.capacity);
        for offset in 0..self.capacity {
            let index = if offset < self.capacity - start {
                start + offset
            } else {
                offset - (self.capacity - start)
            };
            let code = self.encode(index);
            if self.active.insert(code.clone()) {
                return Ok(code);
            }
        }

        Err(RegistryError::CodeSpaceExhausted {
            capacity: self.capacity,
        })
    }

    /// Mark a code as free for reuse
    ///
    /// Returns false if the code was not active.
    pub fn release(&mut self, code: &RoomCode) -> bool {
        let released = self.active.remove(code);
        if released {
            debug!(room_code = %code, "Room code released");
        }
        released
    }

    /// Fixed-width base-N rendering of an index into the code space
    fn encode(&self, mut index: u64) -> RoomCode {
        let base = self.config.alphabet.len() as u64;
        let mut chars = vec![self.config.alphabet[0]; self.config.length];
        for slot in chars.iter_mut().rev() {
            *slot = self.config.alphabet[(index % base) as usize];
            index /= base;
        }
        RoomCode(chars.into_iter().collect())
    }
}
