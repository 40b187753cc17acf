use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Competitive tier derived from a user's accumulated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    Bronze,
    Prata,
    Ouro,
    Platina,
    Diamante,
    Mestre,
    #[serde(rename = "Grão-Mestre")]
    GraoMestre,
}

/// Minimum points per tier, highest first. Anything below the last entry is Bronze.
const THRESHOLDS: [(i64, Rank); 6] = [
    (10_000, Rank::GraoMestre),
    (7_500, Rank::Mestre),
    (5_000, Rank::Diamante),
    (2_500, Rank::Platina),
    (1_000, Rank::Ouro),
    (500, Rank::Prata),
];

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Bronze,
        Rank::Prata,
        Rank::Ouro,
        Rank::Platina,
        Rank::Diamante,
        Rank::Mestre,
        Rank::GraoMestre,
    ];

    /// First matching threshold wins.
    pub fn from_points(points: i64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(min, _)| points >= *min)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::Bronze)
    }

    /// Minimum points needed to hold this rank.
    pub fn threshold(self) -> i64 {
        THRESHOLDS
            .iter()
            .find(|(_, rank)| *rank == self)
            .map(|(min, _)| *min)
            .unwrap_or(0)
    }

    pub fn next(self) -> Option<Rank> {
        Self::ALL
            .iter()
            .position(|r| *r == self)
            .and_then(|i| Self::ALL.get(i + 1))
            .copied()
    }

    /// Points still missing to reach the next tier, `None` at the top.
    pub fn points_to_next(points: i64) -> Option<i64> {
        Self::from_points(points)
            .next()
            .map(|next| next.threshold() - points.max(0))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Bronze => "Bronze",
            Rank::Prata => "Prata",
            Rank::Ouro => "Ouro",
            Rank::Platina => "Platina",
            Rank::Diamante => "Diamante",
            Rank::Mestre => "Mestre",
            Rank::GraoMestre => "Grão-Mestre",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown rank label: {0}")]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownRank(s.to_string()))
    }
}
