//! RNG module - deterministic randomness for spawning
//!
//! Everything random in a session (bonus candidate order, demo drops) goes
//! through [`SimpleRng`], so a seed plus an input log reproduces a run exactly.
//!
//! [`BlockBag`] is a shuffle-bag over the active [`SpawnRange`]: each bag holds
//! every spawn type once, drawn in shuffled order before the next bag is
//! shuffled.

use crate::types::{BlockType, SpawnRange};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max). Returns 0 when `max` is 0.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current state; `SimpleRng::new(rng.state())` continues the same sequence.
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Shuffle-bag of spawn types.
#[derive(Debug, Clone)]
pub struct BlockBag {
    spawn: SpawnRange,
    bag: Vec<BlockType>,
    bag_index: usize,
}

impl BlockBag {
    pub fn new(spawn: SpawnRange) -> Self {
        Self {
            spawn,
            bag: Vec::with_capacity(spawn.count() as usize),
            bag_index: 0,
        }
    }

    fn refill(&mut self, rng: &mut SimpleRng) {
        self.bag.clear();
        self.bag.extend(self.spawn.types());
        rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// Draw the next block type, refilling from `rng` when the bag is empty.
    pub fn draw(&mut self, rng: &mut SimpleRng) -> BlockType {
        if self.bag_index >= self.bag.len() {
            self.refill(rng);
        }
        let block = self.bag[self.bag_index];
        self.bag_index += 1;
        block
    }

    /// Types left in the current bag.
    pub fn remaining(&self) -> &[BlockType] {
        &self.bag[self.bag_index.min(self.bag.len())..]
    }

    pub fn spawn(&self) -> SpawnRange {
        self.spawn
    }
}
