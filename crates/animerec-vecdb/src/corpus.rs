//! # Corpus Ingestion
//!
//! Reads the anime CSV, turns every row into one text record and splits the
//! records into chunks carrying the metadata the selector groups by.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use animerec_core::Metadata;
use animerec_core::types::hit::{ITEM_ID_KEY, ITEM_TITLE_KEY, UNKNOWN_ITEM_TITLE};
use serde::{Deserialize, Serialize};

use crate::chunker::TextChunker;
use crate::error::Result;

const TITLE_MARKER: &str = "Title:";
const OVERVIEW_MARKER: &str = "Overview:";

/// Cell values treated as missing, as spreadsheet exports write them.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One catalog entry flattened to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeRecord {
    /// Zero-based row index, as a string.
    pub id: String,
    /// Title parsed from the text, or `"Unknown"`.
    pub title: String,
    /// All present cell values joined by single spaces.
    pub text: String,
}

impl AnimeRecord {
    /// Builds a record from the cells of row `index`.
    pub fn from_fields<'a>(index: usize, fields: impl IntoIterator<Item = &'a str>) -> Self {
        let text = fields
            .into_iter()
            .filter(|f| !MISSING_MARKERS.iter().any(|m| m == f))
            .collect::<Vec<_>>()
            .join(" ");
        let title = extract_title(&text).unwrap_or_else(|| UNKNOWN_ITEM_TITLE.to_string());

        Self {
            id: index.to_string(),
            title,
            text,
        }
    }
}

/// Extracts the title from text shaped like `"Title: X Overview: Y ..."`.
///
/// Takes what follows the first `Title:` up to the next `Title:` or the first
/// `Overview:` after it, trimmed. Returns `None` if there is no `Title:`.
#[must_use]
pub fn extract_title(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(TITLE_MARKER)?;
    let rest = rest.split(TITLE_MARKER).next().unwrap_or(rest);
    let title = rest.split(OVERVIEW_MARKER).next().unwrap_or(rest);
    Some(title.trim().to_string())
}

/// Loads every data row of a headed CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid UTF-8 CSV.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<AnimeRecord>> {
    let file = File::open(path.as_ref())?;
    read_csv(file)
}

/// Reads every data row of a headed CSV stream.
///
/// # Errors
///
/// Returns an error if the stream is not valid UTF-8 CSV.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<AnimeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        records.push(AnimeRecord::from_fields(index, row.iter()));
    }
    Ok(records)
}

/// Metadata stored next to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub anime_id: String,
    pub anime_title: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl ChunkMetadata {
    /// Converts to the loose mapping returned by searches.
    #[must_use]
    pub fn to_map(&self) -> Metadata {
        let mut map = Metadata::new();
        map.insert(ITEM_ID_KEY.into(), self.anime_id.clone().into());
        map.insert(ITEM_TITLE_KEY.into(), self.anime_title.clone().into());
        map.insert("chunk_index".into(), self.chunk_index.into());
        map.insert("total_chunks".into(), self.total_chunks.into());
        map
    }
}

/// A chunk ready to be embedded and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusChunk {
    /// `"{row}_{chunk}"`.
    pub id: String,
    /// Chunk text.
    pub document: String,
    /// Owning record.
    pub metadata: ChunkMetadata,
}

/// Splits every record into chunks.
#[must_use]
pub fn chunk_records(records: &[AnimeRecord], chunker: &TextChunker) -> Vec<CorpusChunk> {
    let mut out = Vec::new();
    for record in records {
        let pieces = chunker.chunk(&record.text);
        let total = pieces.len();
        for (chunk_index, document) in pieces.into_iter().enumerate() {
            out.push(CorpusChunk {
                id: format!("{}_{chunk_index}", record.id),
                document,
                metadata: ChunkMetadata {
                    anime_id: record.id.clone(),
                    anime_title: record.title.clone(),
                    chunk_index,
                    total_chunks: total,
                },
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkerConfig;

    const SAMPLE: &str = "\
Name,combined_info
Naruto,Title: Naruto Overview: A ninja seeks recognition. Genres: Action
Bebop,Title: Cowboy Bebop Overview: Bounty hunters in space. Genres: Sci-Fi
Mystery,Just some text without markers
";

    #[test]
    fn title_extraction() {
        assert_eq!(
            extract_title("Title: Naruto Overview: ninjas").as_deref(),
            Some("Naruto")
        );
        assert_eq!(extract_title("Title:   Spaced   ").as_deref(), Some("Spaced"));
        assert_eq!(
            extract_title("Title: A Title: B Overview: c").as_deref(),
            Some("A")
        );
        assert_eq!(extract_title("no marker"), None);
    }

    #[test]
    fn reads_rows_with_index_ids() {
        let records = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, "0");
        assert_eq!(records[0].title, "Naruto");
        assert_eq!(
            records[0].text,
            "Naruto Title: Naruto Overview: A ninja seeks recognition. Genres: Action"
        );
        assert_eq!(records[1].title, "Cowboy Bebop");
        assert_eq!(records[2].id, "2");
        assert_eq!(records[2].title, "Unknown");
    }

    #[test]
    fn missing_cells_are_skipped() {
        let record = AnimeRecord::from_fields(4, ["Title: X", "", "NaN", "Overview: y", "null"]);
        assert_eq!(record.text, "Title: X Overview: y");
        assert_eq!(record.title, "X");
    }

    #[test]
    fn chunks_carry_metadata() {
        let records = vec![
            AnimeRecord::from_fields(0, ["Title: Long Overview: abcdefghijklmnopqrstuvwxyz"]),
            AnimeRecord::from_fields(1, ["Title: Short"]),
        ];
        let chunker = TextChunker::new(ChunkerConfig::new(20, 5).unwrap());
        let chunks = chunk_records(&records, &chunker);

        let long: Vec<_> = chunks.iter().filter(|c| c.metadata.anime_id == "0").collect();
        assert!(long.len() > 1);
        assert_eq!(long[0].id, "0_0");
        assert_eq!(long[1].id, "0_1");
        assert!(long.iter().all(|c| c.metadata.total_chunks == long.len()));
        assert!(long.iter().all(|c| c.metadata.anime_title == "Long"));

        let short = chunks.last().unwrap();
        assert_eq!(short.id, "1_0");
        assert_eq!(short.metadata.total_chunks, 1);
    }

    #[test]
    fn metadata_map_uses_selector_keys() {
        let meta = ChunkMetadata {
            anime_id: "3".into(),
            anime_title: "Trigun".into(),
            chunk_index: 1,
            total_chunks: 2,
        };
        let map = meta.to_map();
        assert_eq!(map[ITEM_ID_KEY], "3");
        assert_eq!(map[ITEM_TITLE_KEY], "Trigun");
        assert_eq!(map["chunk_index"], 1);

        let back: ChunkMetadata =
            serde_json::from_value(serde_json::Value::Object(map)).unwrap();
        assert_eq!(back, meta);
    }
}
