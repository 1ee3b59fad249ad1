use crate::source::error::SourceError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "swat_meteo_cache";

/// Default cache location below the platform cache directory.
pub fn get_cache_dir() -> Result<PathBuf, SourceError> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or(SourceError::CacheDirResolution)
}

pub async fn ensure_cache_dir_exists(path: &Path) -> Result<(), SourceError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(SourceError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::other("cache path exists but is not a directory"),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| SourceError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(SourceError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_creates_nested_cache_dir() {
        let dir = tempdir().unwrap();
        let cache = dir.path().join("a").join("b");

        ensure_cache_dir_exists(&cache).await.unwrap();
        // Existing directories are accepted.
        ensure_cache_dir_exists(&cache).await.unwrap();

        assert!(cache.is_dir());
    }

    #[tokio::test]
    async fn test_rejects_file_in_place_of_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("cache");
        std::fs::write(&file, b"not a dir").unwrap();

        let err = ensure_cache_dir_exists(&file).await.unwrap_err();

        assert!(matches!(err, SourceError::CacheDirCreation(..)));
    }
}
