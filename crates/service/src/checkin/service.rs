use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::domain::{UserId, UserState, UserUpdate};
use super::repository::DocumentRepository;
use crate::errors::ServiceError;

/// Check-in business service independent of web framework
pub struct CheckinService<R: DocumentRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: DocumentRepository + ?Sized> CheckinService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Fetch a user's state merged with the shared item list.
    ///
    /// # Examples
    /// ```
    /// use service::checkin::{CheckinService, UserId, repository::mock::MockDocumentRepository};
    /// use std::sync::Arc;
    /// let svc = CheckinService::new(Arc::new(MockDocumentRepository::default()));
    /// let user = UserId::parse(Some("u2")).unwrap();
    /// let view = tokio_test::block_on(svc.fetch(&user)).unwrap();
    /// assert_eq!(view["streak"], 0);
    /// assert_eq!(view["sharedItems"], serde_json::json!([]));
    /// ```
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn fetch(&self, user_id: &UserId) -> Result<UserState, ServiceError> {
        let doc = self.repo.load().await?;
        Ok(doc.user_view(user_id))
    }

    /// Replace a user's state with `payload`, minus `sharedItems`, which replaces
    /// the shared list when supplied.
    ///
    /// # Examples
    /// ```
    /// use service::checkin::{CheckinService, UserId, repository::mock::MockDocumentRepository};
    /// use serde_json::json;
    /// use std::sync::Arc;
    /// let svc = CheckinService::new(Arc::new(MockDocumentRepository::default()));
    /// let u1 = UserId::parse(Some("u1")).unwrap();
    /// tokio_test::block_on(svc.save(&u1, json!({"streak": 5, "sharedItems": ["itemA"]}))).unwrap();
    /// let view = tokio_test::block_on(svc.fetch(&u1)).unwrap();
    /// assert_eq!(serde_json::Value::Object(view), json!({"streak": 5, "sharedItems": ["itemA"]}));
    /// ```
    #[instrument(skip(self, user_id, payload), fields(user_id = %user_id))]
    pub async fn save(&self, user_id: &UserId, payload: Value) -> Result<(), ServiceError> {
        let update = UserUpdate::from_payload(payload)?;
        let replaced_shared = update.shared_items.is_some();
        self.repo.apply(user_id, update).await?;
        info!(replaced_shared, "user_state_saved");
        Ok(())
    }
}
