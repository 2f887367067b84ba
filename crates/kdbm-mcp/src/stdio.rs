//! Stdio transport: a single session over stdin/stdout, one JSON message per
//! line. Logs must go to stderr when this transport is active.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::McpError;
use crate::protocol::Message;
use crate::server::{McpServer, Session};

/// Run one session on the process's stdin and stdout.
pub async fn run(server: Arc<McpServer>) -> Result<(), McpError> {
    tracing::info!("Starting server with stdio transport");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(&server, stdin, stdout).await
}

/// Serve newline-delimited messages from `input`, writing replies to `output`.
///
/// Oversized lines get an error reply and blank lines are skipped; the
/// session ends at end of input.
pub async fn serve_lines<R, W>(server: &McpServer, mut input: R, mut output: W) -> Result<(), McpError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new();
    if let Some(greeting) = session.open(server) {
        write_message(&mut output, &greeting).await?;
    }

    let limit = server.config().max_message_size;
    while let Some(frame) = read_frame(&mut input, limit).await? {
        let reply = match frame {
            Frame::Oversized(size) => {
                tracing::warn!(size, limit, "message exceeds size limit");
                Message::error(
                    Some(serde_json::Value::String(session.id().to_string())),
                    format!("message of {} bytes exceeds limit of {} bytes", size, limit),
                )
            }
            Frame::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match session.handle(server, line).await {
                    Some(reply) => reply,
                    None => break,
                }
            }
        };
        write_message(&mut output, &reply).await?;
    }

    session.close();
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    Oversized(usize),
}

/// Read one newline-terminated frame, buffering at most `limit` bytes.
///
/// The remainder of an oversized line is consumed and counted but not kept.
/// Returns `None` at end of input.
async fn read_frame<R>(input: &mut R, limit: usize) -> Result<Option<Frame>, McpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut size = 0usize;
    loop {
        let available = input.fill_buf().await?;
        if available.is_empty() {
            if size == 0 {
                return Ok(None);
            }
            break;
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        size += chunk.len();
        if size <= limit {
            buf.extend_from_slice(chunk);
        } else if !buf.is_empty() {
            buf = Vec::new();
        }

        let used = chunk.len() + usize::from(newline.is_some());
        input.consume(used);
        if newline.is_some() {
            break;
        }
    }

    if size > limit {
        return Ok(Some(Frame::Oversized(size)));
    }
    Ok(Some(Frame::Line(String::from_utf8_lossy(&buf).into_owned())))
}

async fn write_message<W>(output: &mut W, message: &Message) -> Result<(), McpError>
where
    W: AsyncWrite + Unpin,
{
    let mut text = message.encode()?;
    text.push('\n');
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_oversized_line_is_counted_not_buffered() {
        let mut text = "x".repeat(100);
        text.push_str("\n{\"id\":1}\nlast");
        let mut input = BufReader::with_capacity(16, text.as_bytes());

        assert_eq!(
            read_frame(&mut input, 10).await.unwrap(),
            Some(Frame::Oversized(100))
        );
        assert_eq!(
            read_frame(&mut input, 10).await.unwrap(),
            Some(Frame::Line("{\"id\":1}".to_string()))
        );
        assert_eq!(
            read_frame(&mut input, 10).await.unwrap(),
            Some(Frame::Line("last".to_string()))
        );
        assert_eq!(read_frame(&mut input, 10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blank_line_is_an_empty_frame() {
        let mut input: &[u8] = b"\n";
        assert_eq!(
            read_frame(&mut input, 10).await.unwrap(),
            Some(Frame::Line(String::new()))
        );
        assert_eq!(read_frame(&mut input, 10).await.unwrap(), None);
    }
}
