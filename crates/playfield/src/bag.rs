use super::PieceKind;
use qf_core::*;
use rand::seq::SliceRandom;

/// Shared-sequence piece source.
///
/// A bag holds an ordered list of "sets", each a Fisher-Yates shuffle of
/// the 49-piece multiset (seven of each kind), and a cursor walking them.
/// Rooms generate one set and push it to every member, so competitors draw
/// identical sequences. Sets are appended whole, never spliced.
#[derive(Debug, Clone, Default)]
pub struct PieceBag {
    sets: Vec<Vec<PieceKind>>,
    set: usize,
    pos: usize,
}

/// Builds one freshly shuffled set.
pub fn fresh_set(rng: &mut impl rand::Rng) -> Vec<PieceKind> {
    let mut set: Vec<PieceKind> = PieceKind::ALL
        .into_iter()
        .flat_map(|kind| std::iter::repeat_n(kind, BAG_COPIES))
        .collect();
    set.shuffle(rng);
    set
}

impl PieceBag {
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends a whole set to the tail of the queue.
    pub fn push_set(&mut self, set: Vec<PieceKind>) {
        assert_eq!(set.len(), BAG_SET_LEN, "sets are appended whole");
        self.sets.push(set);
    }
    /// Pieces ahead of the cursor across all queued sets.
    pub fn remaining(&self) -> usize {
        self.sets
            .iter()
            .skip(self.set)
            .map(Vec::len)
            .sum::<usize>()
            .saturating_sub(self.pos)
    }
    /// True once the cursor is in the final queued set with at most the
    /// low-water count left. The owner should request another set now;
    /// retrieval itself never blocks on it.
    pub fn almost_empty(&self) -> bool {
        self.set + 1 >= self.sets.len() && self.remaining() <= BAG_LOW_WATER
    }
    /// Draws the next piece, advancing to the next set when the current
    /// one is exhausted. Running completely dry is a sequencing bug: the
    /// low-water signal exists so this is never reached.
    pub fn next_piece(&mut self) -> PieceKind {
        if self.pos >= self.sets.get(self.set).map_or(0, Vec::len) && self.set < self.sets.len() {
            self.set += 1;
            self.pos = 0;
        }
        let set = self
            .sets
            .get(self.set)
            .unwrap_or_else(|| panic!("piece bag ran dry at set {}", self.set));
        let kind = set[self.pos];
        self.pos += 1;
        kind
    }
}
