use std::io;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} shrank while reading: got {read} of {expected} bytes", .path.display())]
    Truncated {
        path: PathBuf,
        read: usize,
        expected: usize,
    },

    #[error("Status file read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Full contents of the status file as of one read
#[derive(Debug)]
pub struct StatusFile {
    pub contents: String,
    pub modified: DateTime<Utc>,
}

#[derive(Debug)]
pub enum FileRead {
    /// The client's copy is current; content was not read
    NotModified { modified: DateTime<Utc> },
    Loaded(StatusFile),
}

/// True when a client copy from `since` is still current for a file last
/// modified at `modified`. HTTP dates carry whole seconds only.
pub fn is_unmodified_since(modified: DateTime<Utc>, since: DateTime<Utc>) -> bool {
    since.timestamp() >= modified.timestamp()
}

/// Open, stat and read the status file.
///
/// The work runs in its own task: if the requesting connection goes away the
/// read still runs to completion and the handle is closed.
pub async fn read_status_file(
    path: PathBuf,
    if_modified_since: Option<DateTime<Utc>>,
) -> Result<FileRead, SourceError> {
    tokio::spawn(read_file(path, if_modified_since)).await?
}

async fn read_file(
    path: PathBuf,
    if_modified_since: Option<DateTime<Utc>>,
) -> Result<FileRead, SourceError> {
    let mut file = match File::open(&path).await {
        Ok(file) => file,
        Err(source) => return Err(SourceError::Open { path, source }),
    };

    let metadata = match file.metadata().await {
        Ok(metadata) => metadata,
        Err(source) => return Err(SourceError::Stat { path, source }),
    };
    let modified: DateTime<Utc> = match metadata.modified() {
        Ok(modified) => modified.into(),
        Err(source) => return Err(SourceError::Stat { path, source }),
    };

    if let Some(since) = if_modified_since {
        if is_unmodified_since(modified, since) {
            return Ok(FileRead::NotModified { modified });
        }
    }

    let expected = metadata.len() as usize;
    let buf = match read_to_len(&mut file, expected).await {
        Ok(buf) => buf,
        Err(ReadFailure::Io(source)) => return Err(SourceError::Read { path, source }),
        Err(ReadFailure::Eof { read }) => {
            return Err(SourceError::Truncated {
                path,
                read,
                expected,
            })
        }
    };

    Ok(FileRead::Loaded(StatusFile {
        contents: String::from_utf8_lossy(&buf).into_owned(),
        modified,
    }))
}

#[derive(Debug)]
enum ReadFailure {
    Io(io::Error),
    /// Reader hit end of input after `read` bytes
    Eof { read: usize },
}

/// Read exactly `expected` bytes. Reads may come back short; they are
/// accumulated until the size is met.
async fn read_to_len<R: AsyncRead + Unpin>(
    reader: &mut R,
    expected: usize,
) -> Result<Vec<u8>, ReadFailure> {
    let mut buf = vec![0u8; expected];
    let mut filled = 0;
    while filled < expected {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(ReadFailure::Eof { read: filled }),
            Ok(n) => filled += n,
            Err(e) => return Err(ReadFailure::Io(e)),
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use chrono::Duration;
    use tokio::io::AsyncWriteExt;

    fn status_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_unmodified_since_uses_whole_seconds() {
        let modified = DateTime::from_timestamp(1_700_000_000, 900_000_000).unwrap();
        let same_second = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert!(is_unmodified_since(modified, same_second));
        assert!(is_unmodified_since(modified, same_second + Duration::seconds(5)));
        assert!(!is_unmodified_since(modified, same_second - Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_reads_whole_file() {
        let contents = "info {\n\tcreated=1\n}\n".repeat(1000);
        let file = status_file(&contents);

        match read_status_file(file.path().to_path_buf(), None).await.unwrap() {
            FileRead::Loaded(loaded) => assert_eq!(loaded.contents, contents),
            other => panic!("expected content, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_modified_when_client_is_current() {
        let file = status_file("info {\n}\n");
        let since = Utc::now() + Duration::hours(1);

        let result = read_status_file(file.path().to_path_buf(), Some(since)).await.unwrap();
        assert!(matches!(result, FileRead::NotModified { .. }));
    }

    #[tokio::test]
    async fn test_modified_when_client_is_stale() {
        let file = status_file("info {\n}\n");
        let since = DateTime::from_timestamp(0, 0).unwrap();

        let result = read_status_file(file.path().to_path_buf(), Some(since)).await.unwrap();
        assert!(matches!(result, FileRead::Loaded(_)));
    }

    #[tokio::test]
    async fn test_not_modified_skips_reading() {
        // A directory opens and stats fine but cannot be read.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("entry"), "x").unwrap();
        let since = Utc::now() + Duration::hours(1);

        let result = read_status_file(dir.path().to_path_buf(), Some(since)).await.unwrap();
        assert!(matches!(result, FileRead::NotModified { .. }));

        let err = read_status_file(dir.path().to_path_buf(), None).await.unwrap_err();
        assert!(matches!(err, SourceError::Read { .. } | SourceError::Truncated { .. }));
    }

    #[tokio::test]
    async fn test_short_reads_are_accumulated() {
        let contents = b"hoststatus {\n\thost_name=web01\n}\n".repeat(50);
        let (mut reader, mut writer) = tokio::io::duplex(1);

        let expected = contents.clone();
        let writer_task = tokio::spawn(async move {
            writer.write_all(&expected).await.unwrap();
        });

        let buf = read_to_len(&mut reader, contents.len()).await.unwrap();
        assert_eq!(buf, contents);
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_early_eof_is_truncation() {
        let mut reader: &[u8] = b"info {\n";

        match read_to_len(&mut reader, 100).await {
            Err(ReadFailure::Eof { read }) => assert_eq!(read, 7),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_length_read() {
        let mut reader: &[u8] = b"";
        assert!(read_to_len(&mut reader, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_status_file(dir.path().join("status.dat"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Open { .. }));
    }
}
