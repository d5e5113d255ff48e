//! Writing extracted artwork to disk

use obae_types::ExtractedImage;
use std::path::{Path, PathBuf};

/// Write each image as `<name>-<n>.<ext>`, numbering from 1
///
/// Creates `dir` if needed. Returns the written paths in archive order.
pub async fn write_images(
    dir: &Path,
    name: &str,
    images: &[ExtractedImage],
) -> std::io::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let path = dir.join(format!("{name}-{}.{}", index + 1, image.format.extension()));
        tokio::fs::write(&path, &image.bytes).await?;
        written.push(path);
    }
    Ok(written)
}
