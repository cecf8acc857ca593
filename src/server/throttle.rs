//! Speed-limited file streaming for downloads.

use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream `file` in chunks, pacing the output to at most `bytes_per_sec`.
///
/// Before each chunk the stream sleeps until the bytes already sent fit in
/// the elapsed time. A limit of 0 streams at full speed.
pub fn throttled_stream(
    file: File,
    bytes_per_sec: u64,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    let chunk = match bytes_per_sec {
        0 => CHUNK_SIZE,
        limit => (limit as usize).clamp(1, CHUNK_SIZE),
    };
    let reader = ReaderStream::with_capacity(file, chunk);
    let start = Instant::now();

    stream::unfold((reader, 0u64), move |(mut reader, sent)| async move {
        if bytes_per_sec > 0 && sent > 0 {
            let due = Duration::from_millis(sent.saturating_mul(1000) / bytes_per_sec);
            let elapsed = start.elapsed();
            if elapsed < due {
                tokio::time::sleep(due - elapsed).await;
            }
        }

        let item = reader.next().await?;
        let sent = sent + item.as_ref().map_or(0, |b| b.len() as u64);
        Some((item, (reader, sent)))
    })
}
