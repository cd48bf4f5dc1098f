//! Streaming body copy
//!
//! Writes a decided byte window from a seekable async source to a sink in
//! fixed-size chunks. Cancellation ends the copy quietly.

use std::future::Future;
use std::io::{self, SeekFrom};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::http::range::ByteRange;

/// How a body copy ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Every requested byte was written (or the source ran out first)
    Completed(u64),
    /// The cancel future resolved; `written` bytes reached the sink
    Aborted { written: u64 },
}

/// Copy `range` (or everything from the current position) from `source` to `sink`
///
/// # Arguments
/// * `range` - Byte window to copy; `None` copies the whole source
/// * `buffer_size` - Chunk size for each read (at least 1)
/// * `cancel` - Resolves when the transport gave up; checked before every
///   read and write
pub async fn copy_body<R, W, C>(
    source: &mut R,
    sink: &mut W,
    range: Option<ByteRange>,
    buffer_size: usize,
    cancel: C,
) -> io::Result<CopyOutcome>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
    C: Future<Output = ()>,
{
    tokio::pin!(cancel);

    let mut remaining = match range {
        Some(range) => {
            source.seek(SeekFrom::Start(range.from)).await?;
            Some(range.len())
        }
        None => None,
    };

    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut written = 0u64;

    loop {
        let want = match remaining {
            Some(0) => break,
            Some(left) => usize::try_from(left).map_or(buffer.len(), |left| left.min(buffer.len())),
            None => buffer.len(),
        };

        let read = tokio::select! {
            biased;
            () = &mut cancel => return Ok(CopyOutcome::Aborted { written }),
            read = source.read(&mut buffer[..want]) => read?,
        };
        if read == 0 {
            break;
        }

        tokio::select! {
            biased;
            () = &mut cancel => return Ok(CopyOutcome::Aborted { written }),
            result = sink.write_all(&buffer[..read]) => result?,
        }

        written += read as u64;
        if let Some(left) = remaining.as_mut() {
            *left -= read as u64;
        }
    }

    sink.flush().await?;
    Ok(CopyOutcome::Completed(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{pending, poll_fn, ready};
    use std::task::Poll;
    use std::io::Cursor;

    fn source() -> Cursor<Vec<u8>> {
        Cursor::new((0u8..100).collect())
    }

    #[tokio::test]
    async fn test_copy_whole_body() {
        let mut sink = Vec::new();
        let outcome = copy_body(&mut source(), &mut sink, None, 7, pending())
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Completed(100));
        assert_eq!(sink, (0u8..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_copy_window() {
        let mut sink = Vec::new();
        let range = Some(ByteRange { from: 90, to: 99 });
        let outcome = copy_body(&mut source(), &mut sink, range, 4, pending())
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Completed(10));
        assert_eq!(sink, (90u8..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_copy_window_past_end_of_source() {
        let mut sink = Vec::new();
        let range = Some(ByteRange { from: 95, to: 199 });
        let outcome = copy_body(&mut source(), &mut sink, range, 64, pending())
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Completed(5));
    }

    #[tokio::test]
    async fn test_cancel_aborts_without_error() {
        let mut sink = Vec::new();
        let outcome = copy_body(&mut source(), &mut sink, None, 8, ready(()))
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Aborted { written: 0 });
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_some_chunks() {
        // Cancel is polled before every read and write: read, write, read,
        // write, then fires ahead of the third read
        let mut polls = 0;
        let cancel = poll_fn(move |_| {
            polls += 1;
            if polls >= 5 {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        });

        let mut sink = Vec::new();
        let outcome = copy_body(&mut source(), &mut sink, None, 10, cancel)
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Aborted { written: 20 });
        assert_eq!(sink, (0u8..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_zero_buffer_size_still_copies() {
        let mut sink = Vec::new();
        let range = Some(ByteRange { from: 0, to: 2 });
        let outcome = copy_body(&mut source(), &mut sink, range, 0, pending())
            .await
            .unwrap();
        assert_eq!(outcome, CopyOutcome::Completed(3));
        assert_eq!(sink, vec![0, 1, 2]);
    }
}
