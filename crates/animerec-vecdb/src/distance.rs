use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dissimilarity between two embeddings. Lower is closer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Squared Euclidean distance. For unit vectors this is `2 - 2·cos`,
    /// so relevance (`1 - distance`) can go negative.
    #[default]
    SquaredL2,
    /// `1 - cos`.
    Cosine,
}

impl DistanceMetric {
    /// Computes the distance between two equally sized vectors.
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredL2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (na * nb)
                }
            }
        }
    }

    /// Name stored alongside a collection.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SquaredL2 => "l2",
            Self::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l2" | "squared_l2" => Ok(Self::SquaredL2),
            "cosine" | "cos" => Ok(Self::Cosine),
            other => Err(format!("unknown distance metric: {other}")),
        }
    }
}
