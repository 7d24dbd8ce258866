//! Minimal inbound SMTP receiver feeding the ingestion pipeline.
//!
//! Supports HELO/EHLO, MAIL, RCPT, DATA, RSET, NOOP and QUIT. Recipients
//! outside the configured domain are refused at RCPT time. A pipeline
//! failure after DATA maps to 451 (storage, sender retries) or 554
//! (parse/validation, sender bounces).

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{ingest_message, Envelope};
use crate::config::SmtpConfig;
use crate::db::Database;
use crate::{Result, TempboxError};

/// Inbound SMTP server.
pub struct SmtpServer {
    config: SmtpConfig,
    domain: String,
    db: Database,
}

/// Per-connection envelope state.
#[derive(Default)]
struct Session {
    greeted: bool,
    mail_from: Option<String>,
    recipients: Vec<String>,
}

impl Session {
    fn reset(&mut self) {
        self.mail_from = None;
        self.recipients.clear();
    }
}

impl SmtpServer {
    /// Create a new SMTP server.
    pub fn new(config: SmtpConfig, domain: String, db: Database) -> Self {
        Self { config, domain, db }
    }

    /// Run the server, accepting connections until the task is dropped.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("SMTP server listening on {}", local_addr);

        self.serve(listener).await
    }

    /// Bind and return the bound address; connections are served on a
    /// background task. Useful for tests binding port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("SMTP server listening on {}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = self.serve(listener).await {
                warn!("SMTP server error: {}", e);
            }
        });

        Ok(local_addr)
    }

    async fn serve(self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            debug!("SMTP connection from {}", peer);

            let db = self.db.clone();
            let domain = self.domain.clone();
            let config = self.config.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, db, domain, config).await {
                    debug!("SMTP session with {} ended with error: {}", peer, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    db: Database,
    domain: String,
    config: SmtpConfig,
) -> Result<()> {
    let (read_half, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let read_timeout = Duration::from_secs(config.read_timeout_secs);

    writer
        .write_all(format!("220 {domain} Tempbox ESMTP\r\n").as_bytes())
        .await?;

    let mut session = Session::default();

    loop {
        let line = match read_line(&mut reader, read_timeout).await? {
            Some(line) => line,
            None => return Ok(()), // client disconnected
        };

        let (verb, rest) = split_command(&line);
        match verb.as_str() {
            "HELO" => {
                session.greeted = true;
                session.reset();
                writer
                    .write_all(format!("250 {domain}\r\n").as_bytes())
                    .await?;
            }
            "EHLO" => {
                session.greeted = true;
                session.reset();
                let reply = format!(
                    "250-{domain}\r\n250 SIZE {}\r\n",
                    config.max_message_bytes
                );
                writer.write_all(reply.as_bytes()).await?;
            }
            "MAIL" => {
                if !session.greeted {
                    writer.write_all(b"503 5.5.1 send HELO first\r\n").await?;
                    continue;
                }
                match parse_path(rest, "FROM") {
                    Some(address) => {
                        session.reset();
                        session.mail_from = Some(address);
                        writer.write_all(b"250 2.1.0 OK\r\n").await?;
                    }
                    None => {
                        writer
                            .write_all(b"501 5.5.4 syntax: MAIL FROM:<address>\r\n")
                            .await?;
                    }
                }
            }
            "RCPT" => {
                if session.mail_from.is_none() {
                    writer.write_all(b"503 5.5.1 need MAIL first\r\n").await?;
                    continue;
                }
                match parse_path(rest, "TO") {
                    Some(address) if recipient_in_domain(&address, &domain) => {
                        session.recipients.push(address);
                        writer.write_all(b"250 2.1.5 OK\r\n").await?;
                    }
                    Some(address) => {
                        debug!(recipient = %address, "Refusing recipient outside domain");
                        writer
                            .write_all(b"550 5.1.1 mailbox unavailable\r\n")
                            .await?;
                    }
                    None => {
                        writer
                            .write_all(b"501 5.5.4 syntax: RCPT TO:<address>\r\n")
                            .await?;
                    }
                }
            }
            "DATA" => {
                if session.recipients.is_empty() {
                    writer.write_all(b"503 5.5.1 need RCPT first\r\n").await?;
                    continue;
                }
                writer
                    .write_all(b"354 End data with <CRLF>.<CRLF>\r\n")
                    .await?;

                let body = read_data(&mut reader, read_timeout, config.max_message_bytes).await?;
                let body = match body {
                    Some(body) => body,
                    None => {
                        writer
                            .write_all(b"552 5.3.4 message exceeds size limit\r\n")
                            .await?;
                        session.reset();
                        continue;
                    }
                };

                let envelope = Envelope {
                    from: session.mail_from.clone().unwrap_or_default(),
                    recipients: session.recipients.clone(),
                };
                match ingest_message(db.pool(), &envelope, &body).await {
                    Ok(stored) => {
                        info!(
                            count = stored.len(),
                            from = %envelope.from,
                            "Accepted inbound message"
                        );
                        writer.write_all(b"250 2.0.0 OK: queued\r\n").await?;
                    }
                    Err(TempboxError::Parse(_)) | Err(TempboxError::Validation(_)) => {
                        writer
                            .write_all(b"554 5.6.0 message rejected\r\n")
                            .await?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Storage failure, asking sender to retry");
                        writer
                            .write_all(b"451 4.3.0 temporary failure, try again\r\n")
                            .await?;
                    }
                }
                session.reset();
            }
            "RSET" => {
                session.reset();
                writer.write_all(b"250 2.0.0 OK\r\n").await?;
            }
            "NOOP" => {
                writer.write_all(b"250 2.0.0 OK\r\n").await?;
            }
            "QUIT" => {
                writer.write_all(b"221 2.0.0 bye\r\n").await?;
                return Ok(());
            }
            _ => {
                writer
                    .write_all(b"500 5.5.2 command not recognized\r\n")
                    .await?;
            }
        }
    }
}

/// Read one CRLF-terminated line, None on EOF.
async fn read_line(
    reader: &mut BufReader<ReadHalf<TcpStream>>,
    read_timeout: Duration,
) -> Result<Option<String>> {
    let mut line = String::new();
    let n = timeout(read_timeout, reader.read_line(&mut line))
        .await
        .map_err(|_| {
            TempboxError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "client read timed out",
            ))
        })??;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Read the DATA section up to the lone-dot terminator, undoing dot
/// stuffing. Returns None when the message exceeds the size limit (the
/// remainder is still consumed so the session stays in sync).
///
/// Reads raw bytes, not UTF-8 lines; 8-bit message bodies must reach the
/// parser instead of killing the session.
async fn read_data(
    reader: &mut BufReader<ReadHalf<TcpStream>>,
    read_timeout: Duration,
    max_bytes: usize,
) -> Result<Option<Vec<u8>>> {
    let mut body: Vec<u8> = Vec::new();
    let mut oversize = false;

    loop {
        let mut line: Vec<u8> = Vec::new();
        let n = timeout(read_timeout, reader.read_until(b'\n', &mut line))
            .await
            .map_err(|_| {
                TempboxError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "client read timed out",
                ))
            })??;
        if n == 0 {
            return Err(TempboxError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed during DATA",
            )));
        }

        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        if line == b"." {
            break;
        }

        // Dot stuffing: a leading ".." encodes a line starting with "."
        let content: &[u8] = if line.starts_with(b"..") {
            &line[1..]
        } else {
            &line
        };

        if !oversize {
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
            if body.len() > max_bytes {
                oversize = true;
            }
        }
    }

    if oversize {
        Ok(None)
    } else {
        Ok(Some(body))
    }
}

/// Split an SMTP command line into an uppercase verb and the remainder.
fn split_command(line: &str) -> (String, &str) {
    let trimmed = line.trim_start();
    match trimmed.find(|c: char| c == ' ' || c == ':') {
        Some(pos) => (trimmed[..pos].to_ascii_uppercase(), &trimmed[pos..]),
        None => (trimmed.to_ascii_uppercase(), ""),
    }
}

/// Extract the address from a `FROM:<addr>` / `TO:<addr>` argument.
///
/// An explicit empty angle pair (`<>`, the null reverse-path of bounce
/// messages) yields an empty address; a missing address is a syntax error.
fn parse_path(rest: &str, keyword: &str) -> Option<String> {
    let rest = rest.trim_start_matches([' ', ':']).trim();
    let prefix = rest.get(..keyword.len())?;
    if !prefix.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = rest[keyword.len()..].trim_start().strip_prefix(':')?.trim();

    let bracketed = rest.starts_with('<');
    let inner = rest
        .strip_prefix('<')
        .and_then(|r| r.split('>').next())
        .unwrap_or_else(|| rest.split_whitespace().next().unwrap_or(""));

    let address = inner.trim();
    if address.is_empty() && !bracketed {
        None
    } else {
        Some(address.to_string())
    }
}

/// Check that the recipient belongs to the served domain.
fn recipient_in_domain(address: &str, domain: &str) -> bool {
    address
        .rsplit_once('@')
        .map(|(local, addr_domain)| !local.is_empty() && addr_domain.eq_ignore_ascii_case(domain))
        .unwrap_or(false)
}
