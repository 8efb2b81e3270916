//! Staging upload route.
//!
//! Locally there is no storage provider to presign against, so issued
//! upload targets point back at this route, which streams the body into
//! the staging directory.

use axum::body::{Body, Bytes};
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::routing::put;
use axum::{BoxError, Router};
use futures::{Stream, TryStreamExt};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio::io::BufWriter;
use tokio_util::io::StreamReader;
use tracing::info;

pub fn staging_router(staging_dir: PathBuf) -> Router {
    Router::new()
        .route("/upload/:key", put(put_upload))
        .with_state(staging_dir)
}

async fn put_upload(
    State(staging_dir): State<PathBuf>,
    AxumPath(key): AxumPath<String>,
    body: Body,
) -> Result<StatusCode, (StatusCode, String)> {
    if !key_is_valid(&key) {
        return Err((StatusCode::BAD_REQUEST, String::from("Invalid key")));
    }

    tokio::fs::create_dir_all(&staging_dir)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let path = staging_dir.join(&key);
    info!(path = %path.display(), "staging new upload");
    stream_to_file(&path, body.into_data_stream()).await?;
    Ok(StatusCode::OK)
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &Path, stream: S) -> Result<(), (StatusCode, String)>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    async {
        let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let body_reader = StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = BufWriter::new(File::create(path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;

        Ok::<_, io::Error>(())
    }
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

// Staging keys are single flat names; anything path-like is rejected
fn key_is_valid(key: &str) -> bool {
    let path = Path::new(key);
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        type E = std::io::Error;

        let test_data = "Hello, world!";
        let mock_stream = stream::iter(vec![Ok::<bytes::Bytes, E>(Bytes::from(test_data))]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_ok());

        let file_contents = fs::read_to_string(file_path).unwrap();
        assert_eq!(file_contents, test_data);
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        let mock_stream = stream::iter(vec![Err("Test error")]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            (StatusCode::INTERNAL_SERVER_ERROR, "Test error".to_string())
        );
    }

    #[test]
    fn flat_keys_are_valid() {
        assert!(key_is_valid("abc"));
        assert!(key_is_valid("f81d4fae-7dec-11d0-a765-00a0c91e6bf6"));
    }

    #[test]
    fn path_like_keys_are_rejected() {
        assert!(!key_is_valid("../escape"));
        assert!(!key_is_valid("nested/key"));
        assert!(!key_is_valid("."));
        assert!(!key_is_valid(""));
    }

    #[tokio::test]
    async fn put_writes_into_the_staging_dir() {
        let staging = tempdir().unwrap();
        let app = staging_router(staging.path().to_path_buf());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("PUT")
                    .uri("/upload/abc")
                    .body(Body::from("raw video bytes"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = fs::read_to_string(staging.path().join("abc")).unwrap();
        assert_eq!(stored, "raw video bytes");
    }
}
