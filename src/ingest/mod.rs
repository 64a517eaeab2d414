// Dataset ingestion
// A flat CSV (id, title, summary, url, lat, long, date) is the source of
// truth for the vector store. Rows missing any required field are skipped.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm::EmbeddingProvider;
use crate::models::Event;
use crate::types::{AppError, AppResult};
use crate::vector_store::{StoredRecord, VectorStore};

/// Fields arrive as strings so one bad cell invalidates a row, not the file.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    lat: String,
    #[serde(default)]
    long: String,
    #[serde(default)]
    date: String,
}

pub fn load_dataset(path: &Path) -> AppResult<Vec<Event>> {
    let file = std::fs::File::open(path).map_err(|e| {
        AppError::Internal(format!("failed to open dataset {}: {e}", path.display()))
    })?;
    read_dataset(file)
}

pub fn read_dataset<R: Read>(reader: R) -> AppResult<Vec<Event>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in csv_reader.deserialize::<RawRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                warn!("skipping unreadable row {index}: {error}");
                skipped += 1;
                continue;
            }
        };
        match parse_row(row, index) {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }

    info!("loaded {} events from dataset ({skipped} rows skipped)", events.len());
    Ok(events)
}

fn parse_row(row: RawRow, index: usize) -> Option<Event> {
    if row.title.trim().is_empty() || row.summary.trim().is_empty() {
        return None;
    }
    let lat: f64 = row.lat.trim().parse().ok()?;
    let long: f64 = row.long.trim().parse().ok()?;
    let date: NaiveDate = row.date.trim().parse().ok()?;

    let id = if row.id.trim().is_empty() {
        format!("item-{index}")
    } else {
        row.id.trim().to_string()
    };

    Some(Event {
        id,
        title: row.title.trim().to_string(),
        summary: row.summary.trim().to_string(),
        url: row.url.trim().to_string(),
        lat,
        long,
        date,
        score: None,
    })
}

/// Embeds `"{title} {summary}"` per event and adds records to the store in
/// batches, so a large dataset does not overwhelm the embedding API.
pub async fn ingest(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingProvider,
    events: &[Event],
    batch_size: usize,
) -> AppResult<()> {
    for (batch_index, batch) in events.chunks(batch_size.max(1)).enumerate() {
        let mut records = Vec::with_capacity(batch.len());
        for event in batch {
            let document = format!("{} {}", event.title, event.summary);
            let embedding = embedder.embed(&document).await?;
            records.push(StoredRecord {
                embedding,
                document,
                event: event.clone(),
            });
        }
        store.add(&records).await?;
        info!("added batch {} to collection", batch_index + 1);
    }
    Ok(())
}

/// Local fallback when the search service is unreachable: case-insensitive
/// substring match over title and summary.
pub fn scan_keyword(events: &[Event], keyword: &str) -> Vec<Event> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    events
        .iter()
        .filter(|event| {
            event.title.to_lowercase().contains(&needle)
                || event.summary.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
