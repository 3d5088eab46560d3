//! WebSocket client transport
//!
//! `tungstenite` over a host TCP socket, with rustls for `wss://`. The
//! opening handshake (and the TLS handshake) is blocking and bounded by the
//! socket timeouts; afterwards the socket is switched to non-blocking so
//! [`MessageTransport::poll`] never stalls the main loop.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::{ClientConfig, RootCertStore};
use tungstenite::client::IntoClientRequest;
use tungstenite::error::UrlError;
use tungstenite::handshake::HandshakeError;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Connector, Message, WebSocket};

use transit_core::traits::{MessageTransport, TransportEvent};

/// Default connect and I/O timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Transport errors
#[derive(Debug)]
pub enum WsError {
    /// TCP connect or socket setup failed
    Connect(io::Error),
    /// TLS client setup failed
    Tls(rustls::Error),
    /// URL, handshake or protocol error
    WebSocket(tungstenite::Error),
    NotOpen,
}

impl From<tungstenite::Error> for WsError {
    fn from(e: tungstenite::Error) -> Self {
        WsError::WebSocket(e)
    }
}

impl From<rustls::Error> for WsError {
    fn from(e: rustls::Error) -> Self {
        WsError::Tls(e)
    }
}

impl core::fmt::Display for WsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WsError::Connect(e) => write!(f, "connect failed: {}", e),
            WsError::Tls(e) => write!(f, "TLS setup failed: {}", e),
            WsError::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            WsError::NotOpen => f.write_str("connection not open"),
        }
    }
}

fn would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(e) if e.kind() == io::ErrorKind::WouldBlock)
}

fn tcp(socket: &Socket) -> Option<&TcpStream> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => Some(stream),
        MaybeTlsStream::Rustls(stream) => Some(&stream.sock),
        _ => None,
    }
}

/// Root store from the bundled Mozilla roots, ring as crypto provider
fn tls_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// WebSocket client implementing [`MessageTransport`]
pub struct WsClient {
    timeout: Duration,
    tls: Option<Arc<ClientConfig>>,
    socket: Option<Socket>,
}

impl Default for WsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WsClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// `timeout` bounds the TCP connect, both handshakes and every
    /// blocking write
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            tls: None,
            socket: None,
        }
    }

    fn open(&self, host: &str, port: u16) -> Result<TcpStream, WsError> {
        let mut last_error = io::Error::new(io::ErrorKind::NotFound, "host did not resolve");
        for addr in (host, port).to_socket_addrs().map_err(WsError::Connect)? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
                        .and_then(|()| stream.set_nodelay(true))
                        .map_err(WsError::Connect)?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_error = e;
                }
            }
        }
        Err(WsError::Connect(last_error))
    }

    fn tls_connector(&mut self) -> Result<Connector, WsError> {
        let config = match &self.tls {
            Some(config) => config.clone(),
            None => {
                let config = tls_config()?;
                self.tls = Some(config.clone());
                config
            }
        };
        Ok(Connector::Rustls(config))
    }

    /// Send whatever is queued (close replies, pongs) and forget the socket
    fn shut_down(&mut self, send_close: bool) {
        let Some(mut socket) = self.socket.take() else {
            return;
        };
        if let Some(stream) = tcp(&socket) {
            let _ = stream.set_nonblocking(false);
        }
        if send_close {
            let _ = socket.close(None);
        }
        let _ = socket.flush();
    }
}

impl MessageTransport for WsClient {
    type Error = WsError;

    fn connect(&mut self, url: &str) -> Result<(), WsError> {
        self.close();

        let request = url.into_client_request()?;
        let secure = request.uri().scheme_str() == Some("wss");
        let host = request
            .uri()
            .host()
            .ok_or(tungstenite::Error::Url(UrlError::NoHostName))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = request
            .uri()
            .port_u16()
            .unwrap_or(if secure { 443 } else { 80 });

        let stream = self.open(&host, port)?;
        let connector = if secure {
            Some(self.tls_connector()?)
        } else {
            None
        };
        let (socket, response) = tungstenite::client_tls_with_config(request, stream, None, connector)
            .map_err(|e| match e {
                HandshakeError::Failure(e) => WsError::WebSocket(e),
                HandshakeError::Interrupted(_) => {
                    WsError::Connect(io::ErrorKind::TimedOut.into())
                }
            })?;
        debug!("WebSocket upgraded ({})", response.status());

        tcp(&socket)
            .ok_or(WsError::NotOpen)?
            .set_nonblocking(true)
            .map_err(WsError::Connect)?;
        self.socket = Some(socket);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        let socket = self.socket.as_mut().ok_or(WsError::NotOpen)?;
        match socket.send(Message::Text(text.into())) {
            Ok(()) => Ok(()),
            // Queued, flushed by the next read
            Err(e) if would_block(&e) => Ok(()),
            Err(e) => {
                warn!("WebSocket send failed: {}", e);
                self.socket = None;
                Err(e.into())
            }
        }
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        loop {
            let socket = self.socket.as_mut()?;
            match socket.read() {
                Ok(Message::Text(text)) => return Some(TransportEvent::Text(text)),
                Ok(Message::Ping(_)) => {
                    // The pong is queued by the read
                    let _ = socket.flush();
                    return Some(TransportEvent::Ping);
                }
                Ok(Message::Pong(_)) => return Some(TransportEvent::Pong),
                Ok(Message::Close(_)) => {
                    debug!("Server closed the connection");
                    self.shut_down(false);
                    return Some(TransportEvent::Closed);
                }
                Ok(Message::Binary(data)) => {
                    trace!("Ignoring binary message ({} bytes)", data.len());
                }
                Ok(Message::Frame(_)) => {}
                Err(e) if would_block(&e) => return None,
                Err(tungstenite::Error::ConnectionClosed) => {
                    self.socket = None;
                    return Some(TransportEvent::Closed);
                }
                Err(e) => {
                    warn!("WebSocket read failed: {}", e);
                    self.socket = None;
                    return Some(TransportEvent::Closed);
                }
            }
        }
    }

    fn close(&mut self) {
        self.shut_down(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Instant;

    /// Accept one WebSocket client on loopback and run `server` on it
    fn serve<T, F>(server: F) -> (u16, JoinHandle<T>)
    where
        T: Send + 'static,
        F: FnOnce(WebSocket<TcpStream>) -> T + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            server(tungstenite::accept(stream).unwrap())
        });
        (port, handle)
    }

    fn connected(port: u16) -> WsClient {
        let mut client = WsClient::with_timeout(Duration::from_secs(5));
        client.connect(&format!("ws://127.0.0.1:{port}/")).unwrap();
        client
    }

    fn next_event(client: &mut WsClient) -> Option<TransportEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(event) = client.poll() {
                return Some(event);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_text_both_ways() {
        let (port, server) = serve(|mut ws| {
            let request = ws.read().unwrap();
            ws.send(Message::Text("{\"event\":\"heartbeat\"}".into()))
                .unwrap();
            let _ = ws.read();
            request
        });

        let mut client = connected(port);
        assert!(client.is_open());
        client.send_text("{\"event\":\"schedule:subscribe\"}").unwrap();

        assert_eq!(
            next_event(&mut client),
            Some(TransportEvent::Text("{\"event\":\"heartbeat\"}".into()))
        );
        client.close();
        assert_eq!(
            server.join().unwrap(),
            Message::Text("{\"event\":\"schedule:subscribe\"}".into())
        );
    }

    #[test]
    fn test_ping_answered_with_pong() {
        let (port, server) = serve(|mut ws| {
            ws.send(Message::Ping(b"hb".to_vec())).unwrap();
            ws.read().unwrap()
        });

        let mut client = connected(port);
        assert_eq!(next_event(&mut client), Some(TransportEvent::Ping));
        assert_eq!(server.join().unwrap(), Message::Pong(b"hb".to_vec()));
        assert!(client.is_open());
    }

    #[test]
    fn test_server_close_is_reported_and_answered() {
        let (port, server) = serve(|mut ws| {
            ws.close(None).unwrap();
            // Completes once the client's close reply arrives
            loop {
                match ws.read() {
                    Ok(_) => continue,
                    Err(e) => return matches!(e, tungstenite::Error::ConnectionClosed),
                }
            }
        });

        let mut client = connected(port);
        assert_eq!(next_event(&mut client), Some(TransportEvent::Closed));
        assert!(!client.is_open());
        assert_eq!(client.poll(), None);
        assert!(server.join().unwrap());
    }

    #[test]
    fn test_local_close_has_no_event() {
        let (port, server) = serve(|mut ws| ws.read().unwrap());

        let mut client = connected(port);
        client.close();

        assert!(!client.is_open());
        assert_eq!(client.poll(), None);
        assert!(matches!(server.join().unwrap(), Message::Close(_)));
    }

    #[test]
    fn test_send_when_closed() {
        let mut client = WsClient::new();
        assert!(matches!(client.send_text("x"), Err(WsError::NotOpen)));
    }

    #[test]
    fn test_refused() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut client = WsClient::with_timeout(Duration::from_millis(500));
        let result = client.connect(&format!("ws://127.0.0.1:{port}/"));
        assert!(matches!(result, Err(WsError::Connect(_))));
        assert!(!client.is_open());
    }

    #[test]
    fn test_unsupported_scheme() {
        let mut client = WsClient::new();
        let result = client.connect("http://127.0.0.1/");
        assert!(matches!(result, Err(WsError::WebSocket(_))));
    }

    #[test]
    fn test_wss_speaks_tls() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut record_type = [0u8; 1];
            stream.read_exact(&mut record_type).unwrap();
            record_type[0]
        });

        let mut client = WsClient::with_timeout(Duration::from_secs(2));
        let result = client.connect(&format!("wss://127.0.0.1:{port}/"));

        // TLS handshake record, then the server hangs up
        assert_eq!(server.join().unwrap(), 0x16);
        assert!(result.is_err());
        assert!(!matches!(result, Err(WsError::Tls(_))));
    }
}
