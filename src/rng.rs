//! Random number streams
//!
//! The simulation draws from two independent streams:
//! - `seeded`: round setup, serve selection and contact tie-breaks. Replays
//!   reset it to the recorded seed, so every draw here must happen in the
//!   same order whether or not a side is computer controlled.
//! - `live`: momentary computer-player choices. Those choices end up in the
//!   resolved input that a replay stores, so this stream never needs to
//!   reproduce.

use std::fmt;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::RAND_MAX;

/// A source of integers in `0..=RAND_MAX`
pub trait RandStream {
    fn next_rand(&mut self) -> i32;
}

impl<R: RngCore> RandStream for R {
    #[inline]
    fn next_rand(&mut self) -> i32 {
        (self.next_u32() >> 17) as i32 & RAND_MAX
    }
}

/// Adapter turning a closure into a stream (fixed sequences in tests, or a
/// caller's own generator when reconstructing a replay)
pub struct FnRand<F>(pub F);

impl<F: FnMut() -> i32> RandStream for FnRand<F> {
    #[inline]
    fn next_rand(&mut self) -> i32 {
        (self.0)() & RAND_MAX
    }
}

/// The pair of streams owned by a match
pub struct Rng {
    seed: u64,
    seeded: Box<dyn RandStream>,
    live: Box<dyn RandStream>,
}

impl fmt::Debug for Rng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rng").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl Rng {
    /// Seeded stream from `seed`, live stream from the OS
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            seeded: Box::new(Pcg32::seed_from_u64(seed)),
            live: Box::new(Pcg32::from_os_rng()),
        }
    }

    /// Both streams derived from `seed`. Used by tests and headless runs that
    /// want the computer players to be reproducible too.
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed,
            seeded: Box::new(Pcg32::seed_from_u64(seed)),
            live: Box::new(Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7)),
        }
    }

    /// Build from caller-supplied streams
    pub fn with_streams(seed: u64, seeded: Box<dyn RandStream>, live: Box<dyn RandStream>) -> Self {
        Self { seed, seeded, live }
    }

    /// Seed the seeded stream was last reset to
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reset the seeded stream to the start of `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.seeded = Box::new(Pcg32::seed_from_u64(seed));
    }

    /// Replace the seeded stream
    pub fn set_seeded(&mut self, stream: Box<dyn RandStream>) {
        self.seeded = stream;
    }

    /// Replace the live stream
    pub fn set_live(&mut self, stream: Box<dyn RandStream>) {
        self.live = stream;
    }

    /// Next value of the replay-relevant stream
    #[inline]
    pub fn seeded(&mut self) -> i32 {
        self.seeded.next_rand()
    }

    /// Next value of the cosmetic/decision stream
    #[inline]
    pub fn live(&mut self) -> i32 {
        self.live.next_rand()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_stay_in_range() {
        let mut rng = Rng::deterministic(7);
        for _ in 0..10_000 {
            let s = rng.seeded();
            let l = rng.live();
            assert!((0..=RAND_MAX).contains(&s));
            assert!((0..=RAND_MAX).contains(&l));
        }
    }

    #[test]
    fn test_seeded_stream_reproduces() {
        let mut a = Rng::new(1234);
        let mut b = Rng::new(1234);
        let xs: Vec<i32> = (0..32).map(|_| a.seeded()).collect();
        let ys: Vec<i32> = (0..32).map(|_| b.seeded()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_live_draws_do_not_disturb_seeded_stream() {
        let mut a = Rng::deterministic(99);
        let mut b = Rng::deterministic(99);
        for _ in 0..17 {
            a.live();
        }
        let xs: Vec<i32> = (0..8).map(|_| a.seeded()).collect();
        let ys: Vec<i32> = (0..8).map(|_| b.seeded()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let mut rng = Rng::new(5);
        let first: Vec<i32> = (0..4).map(|_| rng.seeded()).collect();
        rng.reseed(5);
        let again: Vec<i32> = (0..4).map(|_| rng.seeded()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_caller_supplied_stream() {
        let mut n = 0;
        let mut rng = Rng::deterministic(0);
        rng.set_seeded(Box::new(FnRand(move || {
            n += 1;
            n
        })));
        assert_eq!(rng.seeded(), 1);
        assert_eq!(rng.seeded(), 2);
        assert_eq!(rng.seeded(), 3);
    }
}
