use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to one stored chunk.
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key holding the identifier of the item a chunk belongs to.
pub const ITEM_ID_KEY: &str = "anime_id";
/// Metadata key holding the display title of the item a chunk belongs to.
pub const ITEM_TITLE_KEY: &str = "anime_title";

/// Item id used when a hit carries no usable id.
pub const UNKNOWN_ITEM_ID: &str = "unknown";
/// Title used when a hit carries no usable title.
pub const UNKNOWN_ITEM_TITLE: &str = "Unknown";
/// Distance used when a hit carries no distance (relevance `0.0`).
pub const DEFAULT_DISTANCE: f64 = 1.0;

/// Raw nearest-neighbor output of a similarity search.
///
/// The three sequences are positionally aligned and ordered by ascending
/// distance. `metadatas` and `distances` may be absent altogether, and any
/// single metadata entry may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Chunk texts.
    pub documents: Vec<String>,
    /// Per-chunk metadata, if the backend returned any.
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    /// Per-chunk distances (dissimilarity, lower is better).
    #[serde(default)]
    pub distances: Option<Vec<f64>>,
}

impl SearchResults {
    /// Number of usable hits: the shortest of the sequences that are present.
    ///
    /// An empty `metadatas` or `distances` list counts as absent.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut len = self.documents.len();
        if let Some(metadatas) = self.present_metadatas() {
            len = len.min(metadatas.len());
        }
        if let Some(distances) = self.present_distances() {
            len = len.min(distances.len());
        }
        len
    }

    /// Returns `true` if there are no usable hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the raw sequences into hits, defaulting anything missing.
    #[must_use]
    pub fn hits(&self) -> Vec<ChunkHit> {
        let metadatas = self.present_metadatas();
        let distances = self.present_distances();
        (0..self.len())
            .map(|i| {
                let metadata = metadatas.and_then(|m| m[i].as_ref());
                let distance = distances.map(|d| d[i]);
                ChunkHit::from_parts(self.documents[i].clone(), metadata, distance)
            })
            .collect()
    }

    fn present_metadatas(&self) -> Option<&[Option<Metadata>]> {
        self.metadatas.as_deref().filter(|m| !m.is_empty())
    }

    fn present_distances(&self) -> Option<&[f64]> {
        self.distances.as_deref().filter(|d| !d.is_empty())
    }
}

/// One nearest-neighbor search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkHit {
    /// Chunk text.
    pub text: String,
    /// Identifier of the source item.
    pub item_id: String,
    /// Display title of the source item.
    pub item_title: String,
    /// Dissimilarity score reported by the index.
    pub distance: f64,
}

impl ChunkHit {
    /// Creates a hit from already-resolved fields.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        item_id: impl Into<String>,
        item_title: impl Into<String>,
        distance: f64,
    ) -> Self {
        Self {
            text: text.into(),
            item_id: item_id.into(),
            item_title: item_title.into(),
            distance,
        }
    }

    /// Builds a hit from possibly partial search output.
    ///
    /// Missing metadata behaves like an empty mapping. String values are used
    /// verbatim, numbers and booleans are stringified, anything else falls
    /// back to the defaults. A missing distance becomes [`DEFAULT_DISTANCE`].
    ///
    /// Ids are compared as strings afterwards, so a numeric id `7` and a
    /// string id `"7"` name the same item.
    #[must_use]
    pub fn from_parts(text: String, metadata: Option<&Metadata>, distance: Option<f64>) -> Self {
        let field = |key: &str| metadata.and_then(|m| m.get(key)).and_then(scalar_to_string);

        Self {
            text,
            item_id: field(ITEM_ID_KEY).unwrap_or_else(|| UNKNOWN_ITEM_ID.to_string()),
            item_title: field(ITEM_TITLE_KEY).unwrap_or_else(|| UNKNOWN_ITEM_TITLE.to_string()),
            distance: distance.unwrap_or(DEFAULT_DISTANCE),
        }
    }

    /// Relevance of this hit: `1.0 - distance`, unclamped.
    #[must_use]
    pub fn relevance(&self) -> f64 {
        1.0 - self.distance
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
