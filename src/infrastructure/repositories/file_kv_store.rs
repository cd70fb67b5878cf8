use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::outbound::KeyValueStorePort;
use crate::common::errors::{DomainError, ErrorContext};

/**
 * Almacén clave-valor sobre el sistema de archivos.
 *
 * Cada clave se guarda como `<dir>/<key>.json`. Las escrituras van primero a
 * un archivo temporal y después se renombran para no dejar contenido a medias.
 */
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Crea el almacén, creando el directorio si no existe
    pub async fn new(root: PathBuf) -> Result<Self, DomainError> {
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create data directory {}", root.display()))?;

        tracing::info!("Key-value store initialized at {}", root.display());
        Ok(Self { root })
    }

    /// Resuelve la ruta física de una clave, rechazando nombres que escapen del directorio
    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if !valid {
            return Err(DomainError::validation_error(
                "KeyValueStore",
                format!("Invalid storage key: {:?}", key),
            ));
        }

        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::internal_error(
                "KeyValueStore",
                format!("Failed to read {}: {}", path.display(), e),
            )
            .with_source(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, value)
            .await
            .with_context(|| format!("Failed to write temporary file {}", temp_path.display()))?;

        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to rename {} to {}", temp_path.display(), path.display()))?;

        tracing::debug!("Stored key {} at {}", key, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::internal_error(
                "KeyValueStore",
                format!("Failed to remove {}: {}", path.display(), e),
            )
            .with_source(e)),
        }
    }
}
