//! JSON echo server.
//!
//! Run with: cargo run --example echo_server
//!
//! Plain HTTP requests get a short text body; upgrade requests are answered
//! and every JSON message is echoed back with a timestamp.

use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::error::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use wsraw::protocol::HandshakeRequest;
use wsraw::{Config, Connection, JsonEcho, read_request_head};

const ADDR: &str = "127.0.0.1:1337";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let listener = TcpListener::bind(ADDR).await?;
    log::info!("server listening at {}", ADDR);

    loop {
        let (stream, addr) = listener.accept().await?;

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                log::error!("connection {} failed: {}", addr, e);
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::server();

    let (head, rest) = match read_request_head(&mut stream, &config).await {
        Ok(parts) => parts,
        Err(wsraw::Error::ConnectionClosed) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let request = HandshakeRequest::parse(&head)?;
    if !request.is_upgrade() {
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\nhey there")
            .await?;
        return Ok(());
    }

    log::info!("{} connected", request.key().unwrap_or("(no key)"));
    let mut conn = Connection::upgrade(stream, &request, &rest, config).await?;
    conn.serve(&mut JsonEcho::new()).await?;
    Ok(())
}
