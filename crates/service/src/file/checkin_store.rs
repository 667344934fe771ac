use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::checkin::domain::{Document, UserId, UserUpdate};
use crate::checkin::repository::DocumentRepository;
use crate::errors::ServiceError;
use crate::storage::json_document_store::JsonDocumentStore;

/// File-backed check-in document (`users` + `sharedItems`) persisted as pretty JSON.
#[derive(Clone)]
pub struct FileDocumentRepository {
    store: Arc<JsonDocumentStore<Document>>,
}

impl FileDocumentRepository {
    /// Initialize the repository from the given file path. Creates the file if missing.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocumentStore::<Document>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }
}

#[async_trait]
impl DocumentRepository for FileDocumentRepository {
    async fn load(&self) -> Result<Document, ServiceError> {
        let doc = self.store.read().await?;
        if doc.has_legacy_checkins() {
            debug!(path = %self.path().display(), "legacy top-level checkins present; left as is");
        }
        Ok(doc)
    }

    async fn apply(&self, user_id: &UserId, update: UserUpdate) -> Result<(), ServiceError> {
        let user_id = user_id.clone();
        self.store
            .update(move |doc| {
                doc.apply(&user_id, update);
                Ok(())
            })
            .await
    }
}
