//! Session leaderboard
//!
//! Lives in memory for as long as the application runs; nothing is written
//! to disk. Entries are kept best first, ties keep their arrival order.

use serde::{Deserialize, Serialize};

use crate::sim::BallType;

/// Entries kept on the board
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Largest ball type reached in the round
    pub best: BallType,
    pub merges: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a round scoring `score` would make the board. Zero never does.
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_none_or(|lowest| score > lowest.score))
    }

    /// 1-based position `score` would take on the board
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score)
            .then(|| self.entries.partition_point(|e| e.score >= score) + 1)
    }

    /// Record a finished round, returning its 1-based rank if it made the board
    pub fn add_score(&mut self, score: u64, best: BallType, merges: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(rank - 1, HighScoreEntry { score, best, merges });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|top| top.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.add_score(0, BallType::White, 0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_sorted_descending_with_ranks() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(10, BallType::Violet, 4), Some(1));
        assert_eq!(scores.add_score(30, BallType::Orange, 9), Some(1));
        assert_eq!(scores.add_score(20, BallType::Violet, 6), Some(2));
        // Ties go below the earlier round
        assert_eq!(scores.add_score(20, BallType::Yellow, 7), Some(3));
        let order: Vec<_> = scores.entries.iter().map(|e| (e.score, e.best)).collect();
        assert_eq!(
            order,
            vec![
                (30, BallType::Orange),
                (20, BallType::Violet),
                (20, BallType::Yellow),
                (10, BallType::Violet)
            ]
        );
        assert_eq!(scores.top_score(), Some(30));
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(s * 10, BallType::Red, 1);
        }
        assert!(!scores.qualifies(5));
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(15), Some(10));
        assert_eq!(scores.add_score(1000, BallType::Black, 50), Some(1));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }
}
