use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed document store.
///
/// Holds no copy of the document in memory: every call goes back to disk.
/// All access is serialized through one async mutex so a read-modify-write
/// cycle can never interleave with another one in the same process.
/// Writes land in a sibling `.tmp` file which is then renamed over the target.
pub struct JsonDocumentStore<D> {
    file_path: PathBuf,
    gate: Mutex<()>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> JsonDocumentStore<D>
where
    D: Serialize + DeserializeOwned + Default + Send,
{
    /// Open the store at `path`. Creates the file with `D::default()` if missing;
    /// an existing file is left untouched.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = Self { file_path: path.into(), gate: Mutex::new(()), _doc: PhantomData };
        store.init().await?;
        Ok(Arc::new(store))
    }

    async fn init(&self) -> Result<(), ServiceError> {
        if fs::try_exists(&self.file_path).await.map_err(ServiceError::storage)? {
            return Ok(());
        }
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
            }
        }
        debug!(path = %self.file_path.display(), "creating empty document");
        self.write(&D::default()).await
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and parse the whole document.
    pub async fn read(&self) -> Result<D, ServiceError> {
        let _guard = self.gate.lock().await;
        self.load().await
    }

    /// Read, mutate via `f`, then persist the whole document.
    /// Nothing is written if `f` fails.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut D) -> Result<R, ServiceError> + Send,
        R: Send,
    {
        let _guard = self.gate.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(out)
    }

    async fn load(&self) -> Result<D, ServiceError> {
        let bytes = fs::read(&self.file_path).await.map_err(ServiceError::storage)?;
        serde_json::from_slice(&bytes).map_err(ServiceError::storage)
    }

    async fn write(&self, doc: &D) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(ServiceError::storage)?;
        let tmp = temp_path(&self.file_path);

        let mut file = fs::File::create(&tmp).await.map_err(ServiceError::storage)?;
        if let Err(e) = write_all_synced(&mut file, &data).await {
            drop(file);
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(e));
        }
        drop(file);

        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(e));
        }
        Ok(())
    }
}

async fn write_all_synced(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

fn temp_path(final_path: &Path) -> PathBuf {
    let mut temp = final_path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}
