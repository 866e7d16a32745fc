//! Response builders for the pixel endpoint.

use std::io;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures::stream::{self, TryStream};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::store::ResolvedImage;

/// Fixed past date that makes every response already expired.
pub const EXPIRED_DATE: &str = "Sat, 26 Jul 1997 05:00:00 GMT";

/// Read size for streamed image bodies.
const CHUNK_SIZE: usize = 16 * 1024;

/// Open the image and stream it with no-cache headers.
///
/// Content-Length is the file size at open time and the body is capped to it.
/// Conditional request headers are deliberately not consulted.
pub async fn image_response(image: &ResolvedImage) -> io::Result<Response> {
    let file = File::open(&image.path).await?;
    let len = file.metadata().await?.len();

    let body = Body::from_stream(chunks(file.take(len)));

    Ok((StatusCode::OK, image_headers(image.content_type, len), body).into_response())
}

/// Headers of [`image_response`] without a body, for HEAD requests.
pub async fn image_head_response(image: &ResolvedImage) -> io::Result<Response> {
    let len = tokio::fs::metadata(&image.path).await?.len();

    Ok((StatusCode::OK, image_headers(image.content_type, len)).into_response())
}

fn image_headers(content_type: &'static str, len: u64) -> [(HeaderName, HeaderValue); 5] {
    [
        (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static(EXPIRED_DATE)),
    ]
}

fn chunks<R>(reader: R) -> impl TryStream<Ok = Bytes, Error = io::Error> + Send + 'static
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::try_unfold(reader, |mut reader| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some((Bytes::from(buf), reader)))
    })
}

/// 503 with an empty body, used when no image can be served.
pub fn unavailable() -> Response {
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

/// 500 with an empty body, used when a selected image can no longer be read.
pub fn server_error() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
