//! # Vector Store
//!
//! A persistent chunk collection in a single SQLite file. Embeddings are
//! stored as little-endian `f32` blobs and searched with an exact scan,
//! which is plenty for a catalog of a few thousand titles.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use animerec_core::{Metadata, RecommenderError, SearchResults, SimilaritySearch};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use crate::chunker::{ChunkerConfig, TextChunker};
use crate::corpus::{AnimeRecord, CorpusChunk, chunk_records, load_csv};
use crate::distance::DistanceMetric;
use crate::embeddings::Embedder;
use crate::error::{Result, VecDbError};

/// Collection the recommender reads from.
pub const DEFAULT_COLLECTION: &str = "anime_collection";
/// Database file created inside the persist directory.
pub const DATABASE_FILE: &str = "vectors.sqlite3";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS collections (
    name      TEXT PRIMARY KEY,
    metric    TEXT NOT NULL,
    dimension INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS chunks (
    collection TEXT NOT NULL,
    seq        INTEGER NOT NULL,
    id         TEXT NOT NULL,
    document   TEXT NOT NULL,
    metadata   TEXT NOT NULL,
    embedding  BLOB NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS chunks_by_seq ON chunks (collection, seq);
";

/// Store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Collection name.
    pub collection: String,
    /// Metric used when a collection is built.
    pub metric: DistanceMetric,
    /// Chunking applied to corpus records.
    pub chunker: ChunkerConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            metric: DistanceMetric::default(),
            chunker: ChunkerConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Set the collection name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the chunking parameters.
    pub fn with_chunker(mut self, chunker: ChunkerConfig) -> Self {
        self.chunker = chunker;
        self
    }
}

struct CollectionInfo {
    metric: DistanceMetric,
    dimension: usize,
}

/// Embedded similarity search over one chunk collection.
pub struct VectorStore<E> {
    conn: Mutex<Connection>,
    embedder: E,
    config: StoreConfig,
}

impl<E: Embedder> VectorStore<E> {
    /// Opens (creating if needed) the store under `persist_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open(persist_dir: impl AsRef<Path>, embedder: E, config: StoreConfig) -> Result<Self> {
        let dir = persist_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DATABASE_FILE);
        debug!(path = %path.display(), "opening vector store");
        Self::with_connection(Connection::open(path)?, embedder, config)
    }

    /// Opens a store that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot initialize.
    pub fn open_in_memory(embedder: E, config: StoreConfig) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, embedder, config)
    }

    fn with_connection(conn: Connection, embedder: E, config: StoreConfig) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            config,
        })
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reads the corpus CSV and rebuilds the collection from it.
    ///
    /// Returns the number of stored chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV cannot be read, embedding fails or the
    /// database write fails. A failed rebuild leaves the old collection.
    pub fn build_from_csv(&self, csv_path: impl AsRef<Path>) -> Result<usize> {
        let csv_path = csv_path.as_ref();
        let records = load_csv(csv_path)?;
        info!(path = %csv_path.display(), rows = records.len(), "loaded corpus");
        self.build_from_records(&records)
    }

    /// Chunks, embeds and stores `records`, replacing the collection.
    ///
    /// # Errors
    ///
    /// See [`VectorStore::build_from_csv`].
    pub fn build_from_records(&self, records: &[AnimeRecord]) -> Result<usize> {
        let chunker = TextChunker::new(self.config.chunker);
        let chunks = chunk_records(records, &chunker);
        let texts: Vec<&str> = chunks.iter().map(|c| c.document.as_str()).collect();
        let embeddings = self.embedder.embed(&texts)?;
        info!(
            collection = %self.config.collection,
            chunks = chunks.len(),
            "embedded corpus"
        );
        self.replace_collection(&chunks, &embeddings)
    }

    fn replace_collection(
        &self,
        chunks: &[CorpusChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<usize> {
        let dimension = self.embedder.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(VecDbError::InvalidDimension {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let name = &self.config.collection;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM chunks WHERE collection = ?1", params![name])?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.execute(
            "INSERT INTO collections (name, metric, dimension) VALUES (?1, ?2, ?3)",
            params![name, self.config.metric.as_str(), dimension as i64],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO chunks (collection, seq, id, document, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (seq, (chunk, embedding)) in chunks.iter().zip(embeddings).enumerate() {
                let metadata = serde_json::to_string(&chunk.metadata)?;
                insert.execute(params![
                    name,
                    seq as i64,
                    chunk.id,
                    chunk.document,
                    metadata,
                    encode_vector(embedding),
                ])?;
            }
        }
        tx.commit()?;

        info!(collection = %name, chunks = chunks.len(), "vector store built");
        Ok(chunks.len())
    }

    /// Whether the collection has been built.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn collection_exists(&self) -> Result<bool> {
        let conn = self.lock()?;
        Ok(collection_info(&conn, &self.config.collection)?.is_some())
    }

    /// Number of chunks stored in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![self.config.collection],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Returns up to `k` chunks nearest to `query`, closest first.
    ///
    /// Chunks at equal distance keep their insertion order.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::CollectionNotFound` if the collection was never
    /// built, or an embedding/database error.
    pub fn query(&self, query: &str, k: usize) -> Result<SearchResults> {
        let vector = self.embedder.embed_one(query)?;

        let conn = self.lock()?;
        let info = collection_info(&conn, &self.config.collection)?
            .ok_or_else(|| VecDbError::CollectionNotFound(self.config.collection.clone()))?;
        if vector.len() != info.dimension {
            return Err(VecDbError::InvalidDimension {
                expected: info.dimension,
                actual: vector.len(),
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, document, metadata, embedding FROM chunks
             WHERE collection = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![self.config.collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, document, metadata, blob) = row?;
            let embedding = decode_vector(&blob);
            if embedding.len() != info.dimension {
                warn!(%id, "skipping chunk with corrupt embedding");
                continue;
            }
            let distance = info.metric.distance(&vector, &embedding);
            scored.push((distance, document, parse_metadata(&id, &metadata)));
        }

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);
        debug!(k, returned = scored.len(), "similarity query");

        let mut results = SearchResults {
            documents: Vec::with_capacity(scored.len()),
            metadatas: Some(Vec::with_capacity(scored.len())),
            distances: Some(Vec::with_capacity(scored.len())),
        };
        for (distance, document, metadata) in scored {
            results.documents.push(document);
            if let Some(m) = results.metadatas.as_mut() {
                m.push(metadata);
            }
            if let Some(d) = results.distances.as_mut() {
                d.push(f64::from(distance));
            }
        }
        Ok(results)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| VecDbError::Poisoned)
    }
}

impl<E: Embedder> SimilaritySearch for VectorStore<E> {
    fn query_similar(&self, query: &str, k: usize) -> animerec_core::Result<SearchResults> {
        self.query(query, k).map_err(RecommenderError::from)
    }
}

fn collection_info(conn: &Connection, name: &str) -> Result<Option<CollectionInfo>> {
    let row = conn
        .query_row(
            "SELECT metric, dimension FROM collections WHERE name = ?1",
            params![name],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((metric, dimension)) => {
            let metric = metric.parse::<DistanceMetric>().unwrap_or_else(|err: String| {
                warn!(%err, "unknown metric stored, falling back to default");
                DistanceMetric::default()
            });
            Ok(Some(CollectionInfo {
                metric,
                dimension: usize::try_from(dimension).unwrap_or_default(),
            }))
        }
    }
}

fn parse_metadata(id: &str, raw: &str) -> Option<Metadata> {
    match serde_json::from_str::<Metadata>(raw) {
        Ok(map) => Some(map),
        Err(err) => {
            warn!(%id, %err, "dropping unreadable chunk metadata");
            None
        }
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
