//! File resource loading
//!
//! Opens a file and describes it for the engine: length and modification
//! time from metadata, a weak tag derived from both.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::fs::File;

use super::ResourceDescriptor;
use crate::http::etag::EntityTag;

/// Open `path` for streaming and describe it
///
/// The file name feeds Content-Type lookup; the descriptor carries no
/// download name.
pub async fn open_file_resource(path: &Path) -> io::Result<(File, ResourceDescriptor)> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Not a regular file: {}", path.display()),
        ));
    }

    let length = metadata.len();
    let last_modified = metadata.modified().ok().map(DateTime::<Utc>::from);
    let etag = last_modified.map(|modified| {
        EntityTag::weak(format!("{:x}-{length:x}", modified.timestamp()))
    });

    let descriptor = ResourceDescriptor {
        length: Some(length),
        last_modified,
        etag,
        file_name: path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string),
        ..ResourceDescriptor::default()
    };
    Ok((file, descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_describe_file() {
        let path = std::env::temp_dir().join(format!("http_delivery_file_{}.txt", std::process::id()));
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let (_file, resource) = open_file_resource(&path).await.unwrap();
        assert_eq!(resource.length, Some(11));
        assert!(resource.last_modified.is_some());
        assert!(resource.etag.as_ref().is_some_and(EntityTag::is_weak));
        assert!(resource.file_name.as_deref().is_some_and(|n| n.ends_with(".txt")));
        assert!(resource.download_name.is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let result = open_file_resource(&std::env::temp_dir()).await;
        assert!(result.is_err());
    }
}
