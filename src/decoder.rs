use bytes::{Buf, BytesMut};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_stream::Stream;

pub const DEFAULT_READ_SIZE: usize = 256;

/// Turns a byte stream into a stream of text chunks.
///
/// Each successful read becomes one chunk. Bytes are decoded as UTF-8; a
/// multi-byte sequence cut by a read boundary is held back until the rest
/// arrives, and invalid bytes are replaced with U+FFFD.
pub struct TextDecoder<R> {
    reader: R,
    scratch: Box<[u8]>,
    pending: BytesMut,
}

impl<R> TextDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_read_size(reader, DEFAULT_READ_SIZE)
    }

    pub fn with_read_size(reader: R, read_size: usize) -> Self {
        Self {
            reader,
            scratch: vec![0u8; read_size.max(4)].into_boxed_slice(),
            pending: BytesMut::new(),
        }
    }
}

impl<R> Stream for TextDecoder<R>
where
    R: AsyncRead + Unpin,
{
    type Item = std::io::Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let mut read_buf = ReadBuf::new(&mut this.scratch);
            match Pin::new(&mut this.reader).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(Ok(())) => {
                    let filled = read_buf.filled();
                    if filled.is_empty() {
                        // EOF: whatever is left can never complete.
                        if this.pending.is_empty() {
                            return Poll::Ready(None);
                        }
                        let tail = String::from_utf8_lossy(&this.pending).into_owned();
                        this.pending.clear();
                        return Poll::Ready(Some(Ok(tail)));
                    }
                    this.pending.extend_from_slice(filled);
                    let text = decode_available(&mut this.pending);
                    if !text.is_empty() {
                        return Poll::Ready(Some(Ok(text)));
                    }
                }
            }
        }
    }
}

/// Decodes the longest decodable prefix of `pending`, leaving an
/// incomplete trailing sequence in place.
pub(crate) fn decode_available(pending: &mut BytesMut) -> String {
    let mut out = String::new();
    let mut start = 0;
    while start < pending.len() {
        match std::str::from_utf8(&pending[start..]) {
            Ok(text) => {
                out.push_str(text);
                start = pending.len();
            }
            Err(e) => {
                let valid = e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&pending[start..start + valid]));
                match e.error_len() {
                    Some(invalid) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start += valid + invalid;
                    }
                    None => {
                        start += valid;
                        break;
                    }
                }
            }
        }
    }
    pending.advance(start);
    out
}
