use async_trait::async_trait;

use super::domain::{Document, UserId, UserUpdate};
use crate::errors::ServiceError;

/// Persistence seam for the check-in document.
/// `apply` must be one indivisible read-modify-write of the whole document.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn load(&self) -> Result<Document, ServiceError>;
    async fn apply(&self, user_id: &UserId, update: UserUpdate) -> Result<(), ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockDocumentRepository {
        doc: Mutex<Document>,
        loads: AtomicUsize,
        applies: AtomicUsize,
        failing: AtomicBool,
    }

    impl MockDocumentRepository {
        pub fn with_document(doc: Document) -> Self {
            Self { doc: Mutex::new(doc), ..Default::default() }
        }

        pub fn snapshot(&self) -> Document {
            self.doc.lock().unwrap().clone()
        }

        /// Number of repository calls made so far (loads + applies).
        pub fn calls(&self) -> usize {
            self.loads.load(Ordering::SeqCst) + self.applies.load(Ordering::SeqCst)
        }

        /// Make every subsequent call fail with a storage error.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Storage("mock storage failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentRepository for MockDocumentRepository {
        async fn load(&self) -> Result<Document, ServiceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.doc.lock().unwrap().clone())
        }

        async fn apply(&self, user_id: &UserId, update: UserUpdate) -> Result<(), ServiceError> {
            self.applies.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.doc.lock().unwrap().apply(user_id, update);
            Ok(())
        }
    }
}
