//! On-disk photo persistence and listing.
//!
//! Filenames are `<UTC timestamp>_<label>.<ext>`, where capture events
//! label as `<tag>_<row>`, so a directory listing reads as a mission
//! timeline. Listing is newest-first, the order operators want.

use std::path::PathBuf;

use chrono::Utc;

use super::{CameraError, Frame};
use crate::mission::capture::CaptureEvent;

pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Persist a frame for a path-relative capture event. Returns the
    /// filename written.
    pub async fn persist_capture(
        &self,
        frame: &Frame,
        event: &CaptureEvent,
    ) -> Result<String, CameraError> {
        self.persist_labeled(frame, &format!("{}_{}", event.tag, event.row))
            .await
    }

    /// Persist a frame under an arbitrary label (manual operator captures).
    pub async fn persist_labeled(
        &self,
        frame: &Frame,
        label: &str,
    ) -> Result<String, CameraError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "{}_{}.{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            label,
            frame.extension()
        );
        tokio::fs::write(self.dir.join(&name), &frame.bytes).await?;
        tracing::info!("photo saved: {}", name);
        Ok(name)
    }

    /// All stored photo filenames, newest first.
    pub async fn list(&self) -> Result<Vec<String>, CameraError> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // No photos taken yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Ok(name) = entry.file_name().into_string() {
                    names.push(name);
                }
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::capture::CaptureTag;

    fn frame() -> Frame {
        Frame {
            bytes: vec![1, 2, 3],
            content_type: "image/bmp",
        }
    }

    #[tokio::test]
    async fn persists_capture_with_tag_and_row_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());
        let event = CaptureEvent {
            tag: CaptureTag::RowEnd,
            row: 2,
        };
        let name = store.persist_capture(&frame(), &event).await.unwrap();
        assert!(name.contains("_rowend_2."));
        assert!(name.ends_with(".bmp"));
        assert_eq!(
            tokio::fs::read(dir.path().join(&name)).await.unwrap(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());
        // Timestamp-prefixed names sort lexically, so seed files directly.
        for name in ["20250101_000000_start_1.bmp", "20250101_000005_end_3.bmp"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        let listed = store.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                "20250101_000005_end_3.bmp".to_string(),
                "20250101_000000_start_1.bmp".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = PhotoStore::new("/nonexistent/never-created");
        assert!(store.list().await.unwrap().is_empty());
    }
}
