use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter, Result};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::protocol::Response;

// Requests are single JSON lines. Anything longer than this is not a pack
// request and is refused before it is buffered any further.
const MAX_REQUEST_SIZE: usize = 64 * 1024;

/// A client connection speaking newline delimited JSON: one request body per
/// line in, one [`Response`] per line out.
#[derive(Debug)]
pub(crate) struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    buffer: Vec<u8>,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream) -> Connection {
        let (reader, writer) = stream.into_split();
        Connection {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            buffer: Vec::with_capacity(512),
        }
    }

    /// Next request body, or `None` once the client has closed the stream.
    pub(crate) async fn read_request(&mut self) -> Result<Option<String>> {
        read_request(&mut self.reader, &mut self.buffer).await
    }

    pub(crate) async fn write_response(&mut self, response: &Response) -> Result<()> {
        let line = response
            .to_line()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

async fn read_request<R: AsyncBufRead + Unpin>(r: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    loop {
        buf.clear();
        let len = (&mut *r).take(MAX_REQUEST_SIZE as u64 + 1).read_until(b'\n', buf).await?;
        if len == 0 {
            return Ok(None);
        }
        if len > MAX_REQUEST_SIZE {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "request too large"));
        }

        let line = std::str::from_utf8(&buf[..len])
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "request is not utf-8"))?
            .trim();
        // blank keep-alive lines are skipped
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
}
