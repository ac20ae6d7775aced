//! Drawer and word selection strategies.
//!
//! The round engine asks a [`Selector`] for the next `(drawer, word)` pair
//! whenever a round starts. Swapping the strategy never touches the state
//! machine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use scrawl_protocol::PlayerId;

use crate::WordBank;

/// The drawer and word for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPick {
    pub drawer: PlayerId,
    /// Normalized (uppercase) word from the bank.
    pub word: String,
}

/// Chooses who draws next and what they draw.
pub trait Selector: Send + 'static {
    /// Pick the next round.
    ///
    /// `candidates` is the current roster, non-empty and sorted by id.
    /// `previous` is the last round's pick, if any.
    fn pick_next(
        &mut self,
        candidates: &[PlayerId],
        words: &WordBank,
        previous: Option<&RoundPick>,
    ) -> RoundPick;
}

// ---------------------------------------------------------------------------
// RandomSelector
// ---------------------------------------------------------------------------

/// Unweighted random drawer and word. The same player may draw twice in a
/// row and words may repeat.
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RandomSelector {
    fn pick_next(
        &mut self,
        candidates: &[PlayerId],
        words: &WordBank,
        _previous: Option<&RoundPick>,
    ) -> RoundPick {
        use rand::Rng;

        let drawer = candidates[self.rng.random_range(0..candidates.len())];
        let word = words.pick_with(&mut self.rng).to_string();
        RoundPick { drawer, word }
    }
}

// ---------------------------------------------------------------------------
// RotatingSelector
// ---------------------------------------------------------------------------

/// Round-robin drawer, random word without immediate repeats.
///
/// The next drawer is the smallest id greater than the previous drawer,
/// wrapping to the smallest id overall. Ids stay stable while the roster
/// changes, so departures and late joiners slot in naturally.
pub struct RotatingSelector {
    rng: StdRng,
}

impl RotatingSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RotatingSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RotatingSelector {
    fn pick_next(
        &mut self,
        candidates: &[PlayerId],
        words: &WordBank,
        previous: Option<&RoundPick>,
    ) -> RoundPick {
        let drawer = previous
            .and_then(|prev| candidates.iter().copied().find(|id| *id > prev.drawer))
            .unwrap_or(candidates[0]);
        let word = words
            .pick_excluding(&mut self.rng, previous.map(|p| p.word.as_str()))
            .to_string();
        RoundPick { drawer, word }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<PlayerId> {
        raw.iter().copied().map(PlayerId).collect()
    }

    #[test]
    fn test_random_picks_from_candidates_and_bank() {
        let words = WordBank::default();
        let candidates = ids(&[1, 2, 3]);
        let mut selector = RandomSelector::seeded(42);

        for _ in 0..50 {
            let pick = selector.pick_next(&candidates, &words, None);
            assert!(candidates.contains(&pick.drawer));
            assert!(words.contains(&pick.word));
        }
    }

    #[test]
    fn test_random_is_deterministic_for_a_seed() {
        let words = WordBank::default();
        let candidates = ids(&[1, 2, 3, 4]);
        let mut a = RandomSelector::seeded(9);
        let mut b = RandomSelector::seeded(9);

        for _ in 0..10 {
            assert_eq!(
                a.pick_next(&candidates, &words, None),
                b.pick_next(&candidates, &words, None)
            );
        }
    }

    #[test]
    fn test_rotating_starts_with_lowest_id() {
        let words = WordBank::default();
        let mut selector = RotatingSelector::seeded(1);
        let pick = selector.pick_next(&ids(&[4, 7, 9]), &words, None);
        assert_eq!(pick.drawer, PlayerId(4));
    }

    #[test]
    fn test_rotating_advances_and_wraps() {
        let words = WordBank::default();
        let candidates = ids(&[4, 7, 9]);
        let mut selector = RotatingSelector::seeded(1);

        let mut previous = selector.pick_next(&candidates, &words, None);
        let mut order = vec![previous.drawer];
        for _ in 0..3 {
            previous = selector.pick_next(&candidates, &words, Some(&previous));
            order.push(previous.drawer);
        }
        assert_eq!(order, ids(&[4, 7, 9, 4]));
    }

    #[test]
    fn test_rotating_skips_departed_drawer() {
        let words = WordBank::default();
        let mut selector = RotatingSelector::seeded(1);
        let previous = RoundPick {
            drawer: PlayerId(7),
            word: "TREE".into(),
        };
        // Player 7 left; 9 is next in line.
        let pick = selector.pick_next(&ids(&[4, 9]), &words, Some(&previous));
        assert_eq!(pick.drawer, PlayerId(9));
    }

    #[test]
    fn test_rotating_never_repeats_word_back_to_back() {
        let words = WordBank::new(["cat", "dog", "owl"]).unwrap();
        let candidates = ids(&[1, 2]);
        let mut selector = RotatingSelector::seeded(5);

        let mut previous = selector.pick_next(&candidates, &words, None);
        for _ in 0..30 {
            let next = selector.pick_next(&candidates, &words, Some(&previous));
            assert_ne!(next.word, previous.word);
            previous = next;
        }
    }
}
