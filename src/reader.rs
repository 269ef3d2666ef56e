use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::{Result, VoicesError};

/// Configuration for manuscript reading
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192, // WHY: manuscripts are small; 8KB keeps syscalls low without waste
        }
    }
}

/// Statistics for one manuscript read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub chars_read: u64,
    pub duration_ms: u64,
}

/// Async reader that loads a whole manuscript with `\n` line endings
pub struct ManuscriptReader {
    config: ReaderConfig,
}

impl ManuscriptReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a UTF-8 manuscript line by line and join it back with `\n`
    ///
    /// `\r\n` endings are dropped by the line reader, so the returned text only
    /// contains `\n`. A file that is missing, cannot be opened or is not valid
    /// UTF-8 is [`VoicesError::NotFound`] so batch runs can skip it.
    pub async fn read_manuscript<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of manuscript: {}", path.display());

        let file = File::open(path).await.map_err(|e| {
            warn!("Failed to open manuscript {}: {}", path.display(), e);
            VoicesError::unreadable(path, e)
        })?;

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut text = String::new();
        let mut line_count = 0u64;

        while let Some(line) = lines.next_line().await.map_err(|e| {
            warn!("UTF-8 decoding error in {} at line {}: {}", path.display(), line_count + 1, e);
            VoicesError::unreadable(path, e)
        })? {
            if line_count > 0 {
                text.push('\n');
            }
            text.push_str(&line);
            line_count += 1;
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: line_count,
            chars_read: text.chars().count() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Read {}: {} lines, {} chars in {}ms",
            path.display(),
            stats.lines_read,
            stats.chars_read,
            stats.duration_ms
        );
        Ok((text, stats))
    }
}

/// Read a whole UTF-8 side file such as a character map; only a missing file is `NotFound`
pub async fn read_to_string_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let path = file_path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| VoicesError::from_io(path, e))
}

/// Read a whole input file that is not line-oriented, such as a sentence table
///
/// Like [`ManuscriptReader::read_manuscript`], any open or decode failure is
/// [`VoicesError::NotFound`].
pub async fn read_input_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let path = file_path.as_ref();
    tokio::fs::read_to_string(path).await.map_err(|e| {
        warn!("Failed to read input {}: {}", path.display(), e);
        VoicesError::unreadable(path, e)
    })
}

/// Convenience function for reading a single manuscript with default configuration
pub async fn read_manuscript_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = ManuscriptReader::new(ReaderConfig::default());
    let (text, _stats) = reader.read_manuscript(file_path).await?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    async fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).await.unwrap();
        file_path
    }

    #[tokio::test]
    async fn test_read_manuscript() {
        let temp_dir = TempDir::new().unwrap();
        let reader = ManuscriptReader::new(ReaderConfig::default());
        let file_path = create_test_file(temp_dir.path(), "play.txt", b"VLADIMIR:\nHello.\n\nESTRAGON:\nHi.\n").await;

        let (text, stats) = reader.read_manuscript(&file_path).await.unwrap();

        assert_eq!(text, "VLADIMIR:\nHello.\n\nESTRAGON:\nHi.");
        assert_eq!(stats.lines_read, 5);
    }

    #[tokio::test]
    async fn test_crlf_is_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "crlf.txt", b"one\r\ntwo\r\n\r\nthree").await;

        let text = read_manuscript_async(&file_path).await.unwrap();
        assert_eq!(text, "one\ntwo\n\nthree");
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "empty.txt", b"").await;

        let (text, stats) = ManuscriptReader::new(ReaderConfig::default())
            .read_manuscript(&file_path)
            .await
            .unwrap();
        assert_eq!(text, "");
        assert_eq!(stats.lines_read, 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_manuscript_async(temp_dir.path().join("missing.txt")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = read_to_string_async(temp_dir.path().join("missing.json")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_utf8_input_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "bad.txt", &[0xFF, 0xFE, 0x41]).await;

        let err = read_manuscript_async(&file_path).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("bad.txt"));

        let err = read_input_async(&file_path).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_utf8_side_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(temp_dir.path(), "map.json", &[0xFF, 0xFE, 0x41]).await;

        let err = read_to_string_async(&file_path).await.unwrap_err();
        assert!(matches!(err, VoicesError::Io { .. }));
    }

    #[tokio::test]
    async fn test_small_buffer_unicode() {
        let temp_dir = TempDir::new().unwrap();
        let reader = ManuscriptReader::new(ReaderConfig { buffer_size: 16 });
        let content = "어린 왕자가 말했다.\n\u{201C}양 한 마리만 그려 줘!\u{201D}";
        let file_path = create_test_file(temp_dir.path(), "ko.txt", content.as_bytes()).await;

        let (text, stats) = reader.read_manuscript(&file_path).await.unwrap();
        assert_eq!(text, content);
        assert_eq!(stats.lines_read, 2);
    }
}
