// SPDX-License-Identifier: MPL-2.0

//! Caption catalog
//!
//! A fresh capture gets one phrase drawn uniformly from [`CAPTIONS`]. The draw
//! goes through [`IndexSource`] so callers can supply their own randomness.

use rand::Rng;

/// Phrases a new capture may be captioned with, in catalog order
pub const CAPTIONS: [&str; 98] = [
    "Captured Moment",
    "Today's Mood",
    "Flash of Reality",
    "Instant Memory",
    "Little Snapshot",
    "Polaroid Vibes",
    "Frame of the Day",
    "Caught on Camera",
    "Spontaneous Moment",
    "Frozen Second",
    "This Happened",
    "Unplanned Beauty",
    "Look What Happened",
    "Instant Classic",
    "Smile... it's today",
    "Proof I was here",
    "A tiny miracle",
    "Hey, that's me!",
    "A moment worth keeping",
    "Sunlight & feelings",
    "Soft memories",
    "The world paused here",
    "Caught in 4:5",
    "Not AI, I swear",
    "Looking good, probably",
    "Main character moment",
    "This is my face today",
    "Blink and it's ruined",
    "Accidentally iconic",
    "Just vibing",
    "Raw & unfiltered",
    "No caption needed",
    "Pure existence",
    "Candid energy",
    "Unscripted life",
    "Living proof",
    "Snapshot therapy",
    "Moment of zen",
    "Vintage me",
    "Retro feels",
    "Time capsule",
    "Memory unlocked",
    "Core memory",
    "Flash fiction",
    "Picture perfect chaos",
    "Beautifully random",
    "Perfectly imperfect",
    "Caught slacking",
    "Evidence of joy",
    "Proof of concept",
    "Reality check",
    "Vibe check passed",
    "Golden hour soul",
    "Midnight thoughts",
    "Morning person energy",
    "Weekend mood",
    "Monday vibes",
    "Living my best life",
    "Thriving actually",
    "Existing beautifully",
    "Spontaneous selfie",
    "Unposed & proud",
    "Natural habitat",
    "In my element",
    "Peak performance",
    "Chaotic good",
    "Soft launch",
    "Hard launch",
    "Plot twist",
    "Character development",
    "Lore drop",
    "Canon event",
    "Side quest complete",
    "Achievement unlocked",
    "Level up",
    "New skin unlocked",
    "Rare footage",
    "Behind the scenes",
    "Director's cut",
    "Deleted scene",
    "Bonus content",
    "Limited edition me",
    "One of one",
    "Collector's item",
    "Vintage original",
    "Timeless classic",
    "Forever mood",
    "Eternal vibe",
    "Infinite energy",
    "Cosmic alignment",
    "Universal truth",
    "Existential proof",
    "Philosophy in pixels",
    "Art in motion",
    "Poetry in pause",
    "Beauty in bytes",
    "Digital nostalgia",
    "Analog heart",
];

/// Source of uniformly distributed catalog indices
pub trait IndexSource: Send {
    /// Index in `0..len`; `len` is never zero
    fn next_index(&mut self, len: usize) -> usize;
}

/// [`IndexSource`] backed by any `rand` generator
pub struct RngSource<R>(pub R);

impl<R: Rng + Send> IndexSource for RngSource<R> {
    fn next_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

impl RngSource<rand::rngs::StdRng> {
    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        RngSource(rand::rngs::StdRng::from_entropy())
    }
}

/// Draw a caption from the catalog.
///
/// Out-of-range indices from a misbehaving source are clamped to the last entry.
pub fn pick_caption(source: &mut dyn IndexSource) -> &'static str {
    let index = source.next_index(CAPTIONS.len()).min(CAPTIONS.len() - 1);
    CAPTIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Fixed(usize);

    impl IndexSource for Fixed {
        fn next_index(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn picks_the_indexed_caption() {
        assert_eq!(pick_caption(&mut Fixed(0)), "Captured Moment");
        assert_eq!(pick_caption(&mut Fixed(97)), "Analog heart");
        assert_eq!(pick_caption(&mut Fixed(10_000)), "Analog heart");
    }

    #[test]
    fn seeded_sources_agree() {
        let mut a = RngSource(StdRng::seed_from_u64(7));
        let mut b = RngSource(StdRng::seed_from_u64(7));

        for _ in 0..20 {
            assert_eq!(pick_caption(&mut a), pick_caption(&mut b));
        }
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut source = RngSource(StdRng::seed_from_u64(42));
        for _ in 0..1_000 {
            assert!(source.next_index(CAPTIONS.len()) < CAPTIONS.len());
        }
    }
}
