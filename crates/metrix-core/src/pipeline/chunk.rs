//! Buffered artifact writer that commits every `chunk_size` records.

use tracing::debug;
use uuid::Uuid;

use crate::models::{Artifact, ArtifactCounts};
use crate::store::{ArtifactStore, StoreResult};

/// What has been durably committed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    pub chunks: u64,
    pub counts: ArtifactCounts,
}

/// Accumulates artifacts in arrival order and hands each full chunk to
/// [`ArtifactStore::insert_chunk`]. A chunk is committed before the next
/// one is started; a failed commit leaves earlier chunks in place.
pub struct ChunkWriter<'a, S: ?Sized> {
    store: &'a S,
    project_id: Uuid,
    chunk_size: usize,
    buffer: Vec<Artifact>,
    stats: ChunkStats,
}

impl<'a, S: ArtifactStore + ?Sized> ChunkWriter<'a, S> {
    pub fn new(store: &'a S, project_id: Uuid, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            store,
            project_id,
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
            stats: ChunkStats::default(),
        }
    }

    pub async fn push(&mut self, artifact: Artifact) -> StoreResult<()> {
        self.buffer.push(artifact);
        if self.buffer.len() >= self.chunk_size {
            self.commit().await?;
        }
        Ok(())
    }

    pub async fn extend(&mut self, artifacts: impl IntoIterator<Item = Artifact>) -> StoreResult<()> {
        for artifact in artifacts {
            self.push(artifact).await?;
        }
        Ok(())
    }

    /// Commit whatever is buffered, even a partial chunk.
    pub async fn flush(&mut self) -> StoreResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.commit().await
    }

    pub fn stats(&self) -> ChunkStats {
        self.stats
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let chunk = std::mem::take(&mut self.buffer);
        self.store.insert_chunk(self.project_id, &chunk).await?;

        for artifact in &chunk {
            self.stats.counts.record(artifact.kind());
        }
        self.stats.chunks += 1;

        debug!(
            project_id = %self.project_id,
            chunk = self.stats.chunks,
            size = chunk.len(),
            "Chunk committed"
        );

        self.buffer = Vec::with_capacity(self.chunk_size);
        Ok(())
    }
}
