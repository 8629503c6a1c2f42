use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

use crate::config::StartupConfig;
use crate::error::{ChatError, ProtocolError};
use crate::error::handlers::{client_message, handle_error};
use crate::lifecycle::LifecycleController;
use crate::middleware::logging::{log_disconnect, log_event};
use crate::presence::ConnectionId;
use crate::protocol::{ServerEvent, encode_event, parse_line};
use crate::router::OutboundReceiver;

/// Outcome of reading one inbound line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// The peer closed the connection.
    Eof,
    /// A complete line (or the final unterminated one) is in the buffer.
    Line,
    /// The line exceeded the limit; it was discarded up to its newline.
    TooLong,
}

/// Handles one relay connection using Tokio async runtime.
///
/// - Reads one JSON event per line and dispatches it to the controller.
/// - A writer task drains the connection's outbound channel to the socket.
/// - EOF or a socket error is a disconnect. Malformed lines are answered
///   with an `error` event and the connection stays open.
///
/// The connection's outbound channel must already be registered; `outbound`
/// is its receiving end.
pub async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    connection_id: ConnectionId,
    outbound: OutboundReceiver,
    controller: Arc<LifecycleController>,
    startup: Arc<StartupConfig>,
) {
    let (read_half, write_half) = stream.into_split();
    let writer = tokio::spawn(write_events(write_half, outbound, connection_id));

    let max_length = startup.max_line_length;
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        let parsed = match read_bounded_line(&mut reader, &mut buf, max_length).await {
            Ok(LineRead::Eof) => {
                info!("Connection closed by client {}", connection_id);
                break;
            }
            Ok(LineRead::TooLong) => Err(ProtocolError::TooLong { max: max_length }),
            Ok(LineRead::Line) => {
                if buf.trim_ascii().is_empty() {
                    continue;
                }
                parse_line(&buf, max_length)
            }
            Err(e) => {
                error!("Failed to read from {}: {}", connection_id, e);
                break;
            }
        };

        let result = match parsed {
            Ok(event) => {
                log_event(connection_id, &event);
                controller.handle(connection_id, event).await
            }
            Err(e) => Err(ChatError::from(e)),
        };

        if let Err(e) = result {
            handle_error(connection_id, &e);
            controller
                .router()
                .send_to_connection(&connection_id, ServerEvent::error(client_message(&e)))
                .await;
        }
    }

    // Unregistering drops the last sender, so the writer flushes what is
    // queued and exits.
    controller.disconnect(connection_id).await;
    if let Err(e) = writer.await {
        warn!("Writer task for {} failed: {}", connection_id, e);
    }
    log_disconnect(connection_id, peer);
}

/// Reads one line into `buf` without ever buffering more than `max_length + 1`
/// bytes of it.
async fn read_bounded_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_length: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = max_length as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.len() > max_length && buf.last() != Some(&b'\n') {
        skip_line(reader).await?;
        buf.clear();
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line)
}

/// Consumes input up to and including the next newline, or to EOF.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

async fn write_events(
    mut writer: OwnedWriteHalf,
    mut outbound: OutboundReceiver,
    connection_id: ConnectionId,
) {
    while let Some(event) = outbound.recv().await {
        let line = match encode_event(&event) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode event for {}: {}", connection_id, e);
                continue;
            }
        };
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!("Failed to write to {}: {}", connection_id, e);
            break;
        }
    }
    let _ = writer.shutdown().await;
}
