//! Catalog service
//!
//! The only orchestration in the system: `add` enriches then inserts, every
//! other operation passes straight through to storage.

use std::sync::Arc;

use music_lib_common::{Error, Result};
use tracing::{debug, info};

use crate::enrichment::MetadataProvider;
use crate::models::{Song, SongId, SongPartial};
use crate::pagination::Pagination;
use crate::repository::SongRepository;

/// Song catalog operations exposed to the HTTP layer
#[derive(Clone)]
pub struct SongService {
    repository: Arc<dyn SongRepository>,
    metadata: Arc<dyn MetadataProvider>,
}

impl SongService {
    pub fn new(repository: Arc<dyn SongRepository>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            repository,
            metadata,
        }
    }

    /// Enrich and store a new song
    ///
    /// Release date, text and link are always replaced by the provider's
    /// answer, blank when the lookup failed.
    pub async fn add(&self, mut song: Song) -> Result<SongId> {
        let detail = self.metadata.lookup(&song.artist, &song.name).await;

        song.release_date = detail.release_date;
        song.text = detail.text;
        song.link = detail.link;

        let id = self.repository.insert(&song).await?;
        info!(id, name = %song.name, artist = %song.artist, "Song added");
        Ok(id)
    }

    pub async fn get_by_id(&self, id: SongId) -> Result<SongPartial> {
        self.repository.get_by_id(id).await
    }

    pub async fn get_all(&self, filter: &Song, pagination: Pagination) -> Result<Vec<SongPartial>> {
        self.repository.get_all(filter, pagination).await
    }

    /// Apply a partial update
    ///
    /// Fails fast with [`Error::NoFieldsSpecified`] before touching storage.
    /// An unknown id is not an error.
    pub async fn update(&self, id: SongId, song: &SongPartial) -> Result<()> {
        if song.has_no_fields() {
            return Err(Error::NoFieldsSpecified);
        }

        let rows_affected = self.repository.update(id, song).await?;
        if rows_affected == 0 {
            debug!(id, "Update matched no song");
        }
        Ok(())
    }

    pub async fn delete(&self, id: SongId) -> Result<()> {
        self.repository.delete(id).await
    }

    pub async fn get_text(&self, id: SongId) -> Result<String> {
        self.repository.get_text(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::SongDetail;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records inserted songs and counts update calls
    #[derive(Default)]
    struct RecordingRepository {
        inserted: Mutex<Vec<Song>>,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl SongRepository for RecordingRepository {
        async fn insert(&self, song: &Song) -> Result<SongId> {
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(song.clone());
            Ok(inserted.len() as SongId)
        }

        async fn get_by_id(&self, _id: SongId) -> Result<SongPartial> {
            Ok(SongPartial::default())
        }

        async fn get_all(&self, _filter: &Song, _pagination: Pagination) -> Result<Vec<SongPartial>> {
            Ok(Vec::new())
        }

        async fn update(&self, _id: SongId, _song: &SongPartial) -> Result<u64> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn delete(&self, _id: SongId) -> Result<()> {
            Ok(())
        }

        async fn get_text(&self, _id: SongId) -> Result<String> {
            Ok(String::new())
        }
    }

    /// Returns a fixed detail and remembers what it was asked
    struct FixedProvider {
        detail: SongDetail,
        asked: Mutex<Vec<(String, String)>>,
    }

    impl FixedProvider {
        fn new(detail: SongDetail) -> Self {
            Self {
                detail,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MetadataProvider for FixedProvider {
        async fn lookup(&self, artist: &str, title: &str) -> SongDetail {
            self.asked
                .lock()
                .unwrap()
                .push((artist.to_string(), title.to_string()));
            self.detail.clone()
        }
    }

    fn build_service(
        repository: Arc<RecordingRepository>,
        provider: Arc<FixedProvider>,
    ) -> SongService {
        SongService::new(repository, provider)
    }

    #[tokio::test]
    async fn test_add_overwrites_with_enrichment() {
        let repository = Arc::new(RecordingRepository::default());
        let provider = Arc::new(FixedProvider::new(SongDetail {
            release_date: "09.10.1971".to_string(),
            text: "Imagine there's no heaven".to_string(),
            link: "http://example.com/imagine".to_string(),
        }));
        let service = build_service(repository.clone(), provider.clone());

        let id = service
            .add(Song {
                name: "Imagine".to_string(),
                artist: "John Lennon".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(
            provider.asked.lock().unwrap()[0],
            ("John Lennon".to_string(), "Imagine".to_string())
        );

        let inserted = repository.inserted.lock().unwrap();
        let stored = &inserted[0];
        assert_eq!(stored.name, "Imagine");
        assert_eq!(stored.release_date, "09.10.1971");
        assert_eq!(stored.text, "Imagine there's no heaven");
        assert_eq!(stored.link, "http://example.com/imagine");
    }

    #[tokio::test]
    async fn test_add_blanks_caller_fields_when_enrichment_empty() {
        let repository = Arc::new(RecordingRepository::default());
        let provider = Arc::new(FixedProvider::new(SongDetail::default()));
        let service = build_service(repository.clone(), provider);

        service
            .add(Song {
                name: "Imagine".to_string(),
                artist: "John Lennon".to_string(),
                release_date: "01.01.2000".to_string(),
                text: "caller lyrics".to_string(),
                link: "http://caller".to_string(),
            })
            .await
            .unwrap();

        let inserted = repository.inserted.lock().unwrap();
        let stored = &inserted[0];
        assert!(stored.release_date.is_empty());
        assert!(stored.text.is_empty());
        assert!(stored.link.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_fields_never_reaches_storage() {
        let repository = Arc::new(RecordingRepository::default());
        let provider = Arc::new(FixedProvider::new(SongDetail::default()));
        let service = build_service(repository.clone(), provider);

        let result = service.update(1, &SongPartial::default()).await;

        assert!(matches!(result, Err(Error::NoFieldsSpecified)));
        assert_eq!(repository.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_succeeds() {
        let repository = Arc::new(RecordingRepository::default());
        let provider = Arc::new(FixedProvider::new(SongDetail::default()));
        let service = build_service(repository.clone(), provider);

        let partial = SongPartial {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(service.update(999, &partial).await.is_ok());
        assert_eq!(repository.updates.load(Ordering::SeqCst), 1);
    }
}
