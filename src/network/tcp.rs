//! TCP transport: newline-delimited JSON [`WireFrame`]s over tokio sockets.
//!
//! Identifiers look like `ttt-1234567@127.0.0.1:40123`. Only the part after
//! `@` is used to connect; the tag makes each session's identifier fresh.

use crate::config::NetworkConfig;
use crate::error::TransportError;
use crate::network::protocol::{Notification, WireFrame};
use crate::network::transport::{ConnectionHandle, EventSender, PeerTransport, TransportEvent};
use rand::Rng;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Link {
    outbox: mpsc::UnboundedSender<WireFrame>,
    task: Option<JoinHandle<()>>,
}

#[derive(Clone, Default)]
struct Links(Arc<Mutex<HashMap<ConnectionHandle, Link>>>);

impl Links {
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionHandle, Link>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, handle: ConnectionHandle) -> mpsc::UnboundedReceiver<WireFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(
            handle,
            Link {
                outbox: tx,
                task: None,
            },
        );
        rx
    }

    fn attach(&self, handle: ConnectionHandle, task: JoinHandle<()>) {
        match self.lock().get_mut(&handle) {
            Some(link) => link.task = Some(task),
            // already finished and unregistered
            None => task.abort(),
        }
    }

    fn remove(&self, handle: &ConnectionHandle) -> Option<Link> {
        self.lock().remove(handle)
    }
}

struct TcpSession {
    id: u64,
    identifier: String,
    acceptor: JoinHandle<()>,
    next_connection: Arc<AtomicU64>,
}

pub struct TcpTransport {
    config: NetworkConfig,
    events: EventSender,
    runtime: Handle,
    session: Option<TcpSession>,
    next_session: u64,
    links: Links,
}

impl TcpTransport {
    /// Must be called from within a tokio runtime.
    pub fn new(config: NetworkConfig, events: EventSender) -> Self {
        Self::with_runtime(config, events, Handle::current())
    }

    pub fn with_runtime(config: NetworkConfig, events: EventSender, runtime: Handle) -> Self {
        Self {
            config,
            events,
            runtime,
            session: None,
            next_session: 0,
            links: Links::default(),
        }
    }
}

/// Extracts the socket address from `tag@addr` (or a bare address).
pub fn parse_identifier(identifier: &str) -> Result<SocketAddr, TransportError> {
    let addr = identifier
        .rsplit_once('@')
        .map_or(identifier, |(_, addr)| addr)
        .trim();
    addr.parse()
        .map_err(|_| TransportError::InvalidIdentifier(identifier.to_string()))
}

fn session_tag() -> String {
    format!("ttt-{}", rand::thread_rng().gen_range(0..10_000_000u32))
}

impl PeerTransport for TcpTransport {
    fn open_session(&mut self) -> Result<String, TransportError> {
        self.destroy_session();

        let listener = std::net::TcpListener::bind((self.config.bind_host.as_str(), 0))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        self.next_session += 1;
        let id = self.next_session;
        let identifier = format!("{}@{}", session_tag(), addr);
        let next_connection = Arc::new(AtomicU64::new(0));

        let acceptor = self.runtime.spawn(accept_loop(
            listener,
            id,
            Arc::clone(&next_connection),
            self.events.clone(),
            self.links.clone(),
            Duration::from_millis(self.config.connect_timeout_ms),
        ));

        info!(%identifier, "tcp session listening");
        self.session = Some(TcpSession {
            id,
            identifier: identifier.clone(),
            acceptor,
            next_connection,
        });
        Ok(identifier)
    }

    fn session(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.id)
    }

    fn connect(&mut self, identifier: &str) -> Result<ConnectionHandle, TransportError> {
        let session = self.session.as_ref().ok_or(TransportError::NoSession)?;
        let addr = parse_identifier(identifier)?;

        let handle = ConnectionHandle {
            session: session.id,
            connection: session.next_connection.fetch_add(1, Ordering::Relaxed) + 1,
        };
        let outbox = self.links.register(handle);
        let task = self.runtime.spawn(dial(
            addr,
            handle,
            session.identifier.clone(),
            identifier.to_string(),
            outbox,
            self.events.clone(),
            self.links.clone(),
            Duration::from_millis(self.config.connect_timeout_ms),
        ));
        self.links.attach(handle, task);
        debug!(%handle, %addr, "dialing");
        Ok(handle)
    }

    fn send(
        &mut self,
        handle: ConnectionHandle,
        payload: &Notification,
    ) -> Result<(), TransportError> {
        let links = self.links.lock();
        let link = links.get(&handle).ok_or(TransportError::NotOpen(handle))?;
        link.outbox
            .send(WireFrame::Notify(*payload))
            .map_err(|_| TransportError::NotOpen(handle))
    }

    fn close(&mut self, handle: ConnectionHandle) {
        if let Some(link) = self.links.remove(&handle) {
            if let Some(task) = link.task {
                task.abort();
            }
            debug!(%handle, "connection closed locally");
        }
    }

    fn destroy_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.acceptor.abort();
        let owned: Vec<ConnectionHandle> = self
            .links
            .lock()
            .keys()
            .filter(|h| h.session == session.id)
            .copied()
            .collect();
        for handle in owned {
            self.close(handle);
        }
        info!(identifier = %session.identifier, "tcp session destroyed");
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.destroy_session();
    }
}

async fn accept_loop(
    listener: std::net::TcpListener,
    session: u64,
    next_connection: Arc<AtomicU64>,
    events: EventSender,
    links: Links,
    handshake_timeout: Duration,
) {
    let listener = match TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            warn!(error = %e, "failed to start listener");
            return;
        }
    };

    loop {
        let (socket, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let handle = ConnectionHandle {
            session,
            connection: next_connection.fetch_add(1, Ordering::Relaxed) + 1,
        };
        debug!(%handle, %peer_addr, "incoming connection");
        let _ = events.send(TransportEvent::Incoming(handle));

        let outbox = links.register(handle);
        let task = tokio::spawn(answer(
            socket,
            handle,
            outbox,
            events.clone(),
            links.clone(),
            handshake_timeout,
        ));
        links.attach(handle, task);
    }
}

/// Inbound side: wait for the peer's `Hello`, then run the link.
async fn answer(
    socket: TcpStream,
    handle: ConnectionHandle,
    outbox: mpsc::UnboundedReceiver<WireFrame>,
    events: EventSender,
    links: Links,
    handshake_timeout: Duration,
) {
    let (reader, writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    let hello = tokio::time::timeout(handshake_timeout, lines.next_line()).await;
    let remote = match hello {
        Ok(Ok(Some(line))) => match WireFrame::decode(&line) {
            Ok(WireFrame::Hello { identifier }) => identifier,
            Ok(other) => {
                fail(&events, &links, handle, format!("expected hello, got {:?}", other));
                return;
            }
            Err(e) => {
                fail(&events, &links, handle, format!("bad hello: {}", e));
                return;
            }
        },
        Ok(Ok(None)) => {
            fail(&events, &links, handle, "closed before hello".to_string());
            return;
        }
        Ok(Err(e)) => {
            fail(&events, &links, handle, e.to_string());
            return;
        }
        Err(_) => {
            fail(&events, &links, handle, "handshake timed out".to_string());
            return;
        }
    };

    let _ = events.send(TransportEvent::Open {
        handle,
        remote,
        reliable: true,
    });
    run_link(lines, writer, handle, outbox, events, links).await;
}

/// Outbound side: connect, introduce ourselves, then run the link.
#[allow(clippy::too_many_arguments)]
async fn dial(
    addr: SocketAddr,
    handle: ConnectionHandle,
    local_identifier: String,
    remote_identifier: String,
    outbox: mpsc::UnboundedReceiver<WireFrame>,
    events: EventSender,
    links: Links,
    connect_timeout: Duration,
) {
    let socket = match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(socket)) => socket,
        Ok(Err(e)) => {
            fail(&events, &links, handle, e.to_string());
            return;
        }
        Err(_) => {
            fail(&events, &links, handle, "connect timed out".to_string());
            return;
        }
    };

    let (reader, mut writer) = socket.into_split();
    let hello = WireFrame::Hello {
        identifier: local_identifier,
    };
    if let Err(e) = write_frame(&mut writer, &hello).await {
        fail(&events, &links, handle, e.to_string());
        return;
    }

    let _ = events.send(TransportEvent::Open {
        handle,
        remote: remote_identifier,
        reliable: true,
    });
    let lines = BufReader::new(reader).lines();
    run_link(lines, writer, handle, outbox, events, links).await;
}

async fn run_link(
    mut lines: Lines<BufReader<OwnedReadHalf>>,
    mut writer: OwnedWriteHalf,
    handle: ConnectionHandle,
    mut outbox: mpsc::UnboundedReceiver<WireFrame>,
    events: EventSender,
    links: Links,
) {
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match WireFrame::decode(&line) {
                    Ok(WireFrame::Notify(payload)) => {
                        let _ = events.send(TransportEvent::Message { handle, payload });
                    }
                    Ok(WireFrame::Hello { .. }) => debug!(%handle, "ignoring repeated hello"),
                    Err(e) => {
                        warn!(%handle, error = %e, "undecodable frame");
                        let _ = events.send(TransportEvent::Malformed {
                            handle,
                            reason: e.to_string(),
                        });
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(%handle, error = %e, "read failed");
                    break;
                }
            },
            frame = outbox.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write_frame(&mut writer, &frame).await {
                        warn!(%handle, error = %e, "write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }

    if links.remove(&handle).is_some() {
        debug!(%handle, "connection closed by peer");
        let _ = events.send(TransportEvent::Closed(handle));
    }
}

async fn write_frame(writer: &mut OwnedWriteHalf, frame: &WireFrame) -> Result<(), TransportError> {
    let line = frame.encode()?;
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}

fn fail(events: &EventSender, links: &Links, handle: ConnectionHandle, reason: String) {
    if links.remove(&handle).is_some() {
        warn!(%handle, %reason, "connection failed");
        let _ = events.send(TransportEvent::Failed { handle, reason });
    }
}
