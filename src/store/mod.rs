// LanceDB vector store module
// Holds (segment, embedding) pairs and serves nearest-neighbor retrieval

#[cfg(test)]
mod tests;

use crate::ChatError;
use crate::config::Config;
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const TABLE_NAME: &str = "segments";
const DEFAULT_VECTOR_DIMENSION: usize = 768;

/// Durable vector store backed by LanceDB. Append-only: segments are never
/// mutated once stored, and every addition is persisted by LanceDB itself.
pub struct VectorStore {
    connection: Connection,
    vector_dimension: usize,
}

/// A stored segment together with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    /// Unique identifier for this record
    pub id: String,
    /// The embedding vector, produced by the configured embedding model
    pub vector: Vec<f32>,
    /// The segment text
    pub content: String,
    /// Origin label (file name or URL)
    pub source: String,
    /// Index of the segment within its source
    pub chunk_index: u32,
    /// RFC3339 timestamp when this record was created
    pub created_at: String,
}

/// Nearest-neighbor search result.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub content: String,
    pub source: String,
    pub chunk_index: u32,
    pub similarity_score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Whether a persisted store exists on disk for this configuration.
    #[inline]
    pub fn exists(config: &Config) -> bool {
        config.store_path().exists()
    }

    /// Open an existing persisted store. Fails with [`ChatError::StoreLoad`]
    /// when the directory is missing or unreadable.
    #[inline]
    pub async fn open(config: &Config) -> Result<Self, ChatError> {
        let db_path = config.store_path();
        if !db_path.exists() {
            return Err(ChatError::StoreLoad(format!(
                "Store directory does not exist: {}",
                db_path.display()
            )));
        }

        debug!("Opening LanceDB store at {:?}", db_path);
        let connection = Self::connect(&db_path).await.map_err(ChatError::StoreLoad)?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChatError::StoreLoad(format!("Failed to list tables: {}", e)))?;

        if !table_names.contains(&TABLE_NAME.to_string()) {
            return Err(ChatError::StoreLoad(format!(
                "Store at {} has no segments table",
                db_path.display()
            )));
        }

        let mut store = Self {
            connection,
            vector_dimension: DEFAULT_VECTOR_DIMENSION,
        };
        store.vector_dimension = store.detect_vector_dimension().await?;

        info!(
            "Opened vector store at {:?} ({} dimensions)",
            db_path, store.vector_dimension
        );
        Ok(store)
    }

    /// Create a new store with an empty segments table.
    #[inline]
    pub async fn create(config: &Config) -> Result<Self, ChatError> {
        let db_path = config.store_path();
        debug!("Creating LanceDB store at {:?}", db_path);

        std::fs::create_dir_all(&db_path).map_err(|e| {
            ChatError::Store(format!("Failed to create store directory: {}", e))
        })?;

        let connection = Self::connect(&db_path).await.map_err(ChatError::Store)?;

        let store = Self {
            connection,
            vector_dimension: DEFAULT_VECTOR_DIMENSION,
        };

        // Placeholder dimension; the table is recreated with the real one on
        // the first insert if it differs.
        let schema = store.create_schema(DEFAULT_VECTOR_DIMENSION);
        store
            .connection
            .create_empty_table(TABLE_NAME, schema)
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to create table: {}", e)))?;

        info!("Created empty vector store at {:?}", db_path);
        Ok(store)
    }

    async fn connect(db_path: &Path) -> Result<Connection, String> {
        let uri = format!("file://{}", db_path.display());
        lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| format!("Failed to connect to LanceDB: {}", e))
    }

    /// Detect vector dimension from the existing table schema
    async fn detect_vector_dimension(&self) -> Result<usize, ChatError> {
        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| ChatError::StoreLoad(format!("Failed to open table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| ChatError::StoreLoad(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(ChatError::StoreLoad(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    fn create_schema(&self, vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("content", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Append segment records to the store. LanceDB persists the mutation
    /// before this returns.
    #[inline]
    pub async fn add_segments(&mut self, records: Vec<SegmentRecord>) -> Result<(), ChatError> {
        if records.is_empty() {
            debug!("No segments to store");
            return Ok(());
        }

        debug!("Storing batch of {} segments", records.len());

        let vector_dim = records[0].vector.len();
        if vector_dim != self.vector_dimension {
            let count = self.count_segments().await?;
            if count > 0 {
                return Err(ChatError::Store(format!(
                    "Embedding dimension {} does not match existing store dimension {}",
                    vector_dim, self.vector_dimension
                )));
            }
            info!(
                "Vector dimension changed from {} to {} on empty store, recreating table",
                self.vector_dimension, vector_dim
            );
            self.recreate_table_with_dimension(vector_dim).await?;
            self.vector_dimension = vector_dim;
        }

        if records.iter().any(|r| r.vector.len() != vector_dim) {
            return Err(ChatError::Store(
                "Segment batch contains vectors of differing dimensions".to_string(),
            ));
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to open table: {}", e)))?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to insert segments: {}", e)))?;

        info!("Stored {} segments", records.len());
        Ok(())
    }

    async fn recreate_table_with_dimension(&self, vector_dim: usize) -> Result<(), ChatError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| ChatError::Store(format!("Failed to drop table: {}", e)))?;
        }

        let schema = self.create_schema(vector_dim);
        self.connection
            .create_empty_table(TABLE_NAME, schema)
            .execute()
            .await
            .map_err(|e| {
                ChatError::Store(format!("Failed to create table with new dimensions: {}", e))
            })?;

        Ok(())
    }

    fn create_record_batch(&self, records: &[SegmentRecord]) -> Result<RecordBatch, ChatError> {
        let len = records.len();
        let vector_dim = self.vector_dimension;

        let mut ids = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);

        for record in records {
            ids.push(record.id.as_str());
            contents.push(record.content.as_str());
            sources.push(record.source.as_str());
            chunk_indices.push(record.chunk_index);
            created_ats.push(record.created_at.as_str());
            flat_values.extend_from_slice(&record.vector);
        }

        let schema = self.create_schema(vector_dim);

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| ChatError::Store(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| ChatError::Store(format!("Failed to create record batch: {}", e)))
    }

    /// Retrieve the `limit` segments nearest to the query vector.
    #[inline]
    pub async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, ChatError> {
        debug!("Searching for similar segments with limit: {}", limit);

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to open table: {}", e)))?;

        let query = table
            .vector_search(query_vector)
            .map_err(|e| ChatError::Store(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit);

        let results = query
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, ChatError> {
        let mut search_results = Vec::new();

        while let Some(batch_result) = results
            .try_next()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to read result stream: {}", e)))?
        {
            let parsed_batch = Self::parse_search_batch(&batch_result)?;
            search_results.extend(parsed_batch);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, ChatError> {
        let mut search_results = Vec::new();
        let num_rows = batch.num_rows();

        let contents = Self::string_column(batch, "content")?;
        let sources = Self::string_column(batch, "source")?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| ChatError::Store("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| ChatError::Store("Invalid chunk_index column type".to_string()))?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        for row in 0..num_rows {
            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            // Convert distance to similarity score (higher is better)
            let similarity_score = 1.0 - distance;

            search_results.push(SearchResult {
                content: contents.value(row).to_string(),
                source: sources.value(row).to_string(),
                chunk_index: chunk_indices.value(row),
                similarity_score,
                distance,
            });
        }

        debug!("Parsed {} search results", search_results.len());
        Ok(search_results)
    }

    fn string_column<'a>(
        batch: &'a RecordBatch,
        name: &str,
    ) -> Result<&'a StringArray, ChatError> {
        batch
            .column_by_name(name)
            .ok_or_else(|| ChatError::Store(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| ChatError::Store(format!("Invalid {} column type", name)))
    }

    /// Total number of segments stored.
    #[inline]
    pub async fn count_segments(&self) -> Result<u64, ChatError> {
        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| ChatError::Store(format!("Failed to open table: {}", e)))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| ChatError::Store(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    #[inline]
    pub fn vector_dimension(&self) -> usize {
        self.vector_dimension
    }
}
