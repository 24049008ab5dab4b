use std::sync::Arc;

use anyhow::{Context, Result};
use request_http_parser::parser::{Method, Request};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot::Receiver,
};

use crate::notification::svc::Notification;

const CORS_HEADERS: &str = "Access-Control-Allow-Origin: *\r\n\
            Access-Control-Allow-Methods: POST, GET, OPTIONS\r\n\
            Access-Control-Allow-Headers: Content-Type\r\n\
            Access-Control-Max-Age: 86400\r\n";

pub const BAD_REQUEST: &str = "HTTP/1.1 400 Bad Request\r\n\
            Content-Type: application/json\r\n";
pub const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n";
pub const PAYLOAD_TOO_LARGE: &str = "HTTP/1.1 413 Payload Too Large\r\n";
pub const INTERNAL_ERROR: &str = "HTTP/1.1 500 Internal Server Error\r\n";
pub const SERVICE_UNAVAILABLE: &str = "HTTP/1.1 503 Service Unavailable\r\n\
            Content-Type: application/json\r\n";
pub const OPTIONS_CORS: &str = "HTTP/1.1 204 No Content\r\n";
pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
            Content-Type: application/json\r\n";

pub const MAX_REQUEST_SIZE: usize = 16 * 1024;

pub struct Server {
    notification: Arc<Notification>,
}

impl Server {
    pub fn new(notification: Arc<Notification>) -> Self {
        Self { notification }
    }

    pub async fn start(&self, addr: &str, mut shutdown_rx: Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        log::info!("[Server] Running on http://{addr}");

        loop {
            tokio::select! {
                conn = listener.accept() => {
                    let Some((mut stream, peer)) = accepted(conn) else {
                        continue;
                    };
                    let notification = self.notification.clone();
                    tokio::spawn(async move {
                        let (reader, writer) = stream.split();
                        if let Err(e) = Self::handle_client(&notification, reader, writer).await {
                            log::warn!("[Server] connection error from {peer}: {e}");
                        }
                    });
                }
                _ = &mut shutdown_rx => {
                    log::info!("[Server] Shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn handle_client<Reader, Writer>(
        notification: &Notification,
        mut reader: Reader,
        mut writer: Writer,
    ) -> Result<()>
    where
        Reader: AsyncRead + Unpin,
        Writer: AsyncWrite + Unpin,
    {
        let raw = match read_request(&mut reader).await? {
            Some(raw) => raw,
            None => {
                log::warn!("[Server] request too large");
                write_response(&mut writer, PAYLOAD_TOO_LARGE, "Request too large").await?;
                return Ok(());
            }
        };
        let request = String::from_utf8_lossy(&raw);
        let request = match Request::new(&request) {
            Ok(req) => req,
            Err(e) => {
                log::warn!("[Server] malformed request: {e}");
                let content = r#"{"error":"invalid request"}"#;
                write_response(&mut writer, BAD_REQUEST, content).await?;
                return Ok(());
            }
        };

        // Router
        let (status, content) = match (&request.method, request.path.as_str()) {
            (Method::OPTIONS, _) => (OPTIONS_CORS.to_string(), String::new()),
            (Method::POST, "/push/subscribe") => notification.register_subs(&request).await,
            (Method::POST, "/push/unsubscribe") => notification.remove_subs(&request).await,
            (Method::POST, "/push/unsubscribe-all") => notification.remove_all_subs().await,
            (Method::POST, "/push/send") => notification.push_notification(&request).await,
            _ => (NOT_FOUND.to_string(), "404 Not Found".to_string()),
        };
        let status_line = status.lines().next().unwrap_or_default();
        log::debug!("[Server] {} -> {status_line}", request.path);

        write_response(&mut writer, &status, &content).await?;
        Ok(())
    }
}

/// A failed accept (fd exhaustion, aborted handshake) drops that connection
/// only; the listener keeps serving.
fn accepted<T>(conn: std::io::Result<T>) -> Option<T> {
    match conn {
        Ok(conn) => Some(conn),
        Err(e) => {
            log::warn!("[Server] accept failed: {e}");
            None
        }
    }
}

/// Read one request: headers, then as much body as `Content-Length` says.
/// `None` once the request exceeds [`MAX_REQUEST_SIZE`].
async fn read_request<Reader>(reader: &mut Reader) -> Result<Option<Vec<u8>>>
where
    Reader: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    loop {
        let size = reader
            .read(&mut chunk)
            .await
            .context("Failed to read stream")?;
        buffer.extend_from_slice(&chunk[..size]);
        if buffer.len() > MAX_REQUEST_SIZE {
            return Ok(None);
        }
        if size == 0 || is_complete(&buffer) {
            return Ok(Some(buffer));
        }
    }
}

fn is_complete(buffer: &[u8]) -> bool {
    let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buffer[..head_end]);
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buffer.len() - (head_end + 4) >= content_length
}

async fn write_response<Writer>(writer: &mut Writer, status: &str, content: &str) -> Result<()>
where
    Writer: AsyncWrite + Unpin,
{
    let response = format!(
        "{status}{CORS_HEADERS}Content-Length: {}\r\nConnection: close\r\n\r\n{content}",
        content.len()
    );
    writer
        .write_all(response.as_bytes())
        .await
        .context("Failed to write")?;
    writer.flush().await.context("Failed to flush")?;
    Ok(())
}
