//! In-process transport. Sessions on the same [`MemoryNetwork`] can reach
//! each other by identifier; events are delivered synchronously to the
//! owners' channels.

use crate::error::TransportError;
use crate::network::protocol::Notification;
use crate::network::transport::{ConnectionHandle, EventSender, PeerTransport, TransportEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Default)]
struct NetworkInner {
    next_session: u64,
    next_connection: u64,
    endpoints: HashMap<String, Endpoint>,
    links: HashMap<ConnectionHandle, Link>,
}

struct Endpoint {
    session: u64,
    events: EventSender,
}

struct Link {
    peer: ConnectionHandle,
    peer_events: EventSender,
}

/// Shared switchboard for [`MemoryTransport`]s.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<NetworkInner>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, NetworkInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live connection ends, both directions counted.
    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }
}

pub struct MemoryTransport {
    network: MemoryNetwork,
    events: EventSender,
    session: Option<(u64, String)>,
}

impl MemoryTransport {
    pub fn new(network: MemoryNetwork, events: EventSender) -> Self {
        Self {
            network,
            events,
            session: None,
        }
    }
}

impl PeerTransport for MemoryTransport {
    fn open_session(&mut self) -> Result<String, TransportError> {
        self.destroy_session();

        let mut net = self.network.lock();
        net.next_session += 1;
        let session = net.next_session;
        let identifier = format!("mem-{}", session);
        net.endpoints.insert(
            identifier.clone(),
            Endpoint {
                session,
                events: self.events.clone(),
            },
        );
        drop(net);

        debug!(%identifier, "memory session opened");
        self.session = Some((session, identifier.clone()));
        Ok(identifier)
    }

    fn session(&self) -> Option<u64> {
        self.session.as_ref().map(|(id, _)| *id)
    }

    fn connect(&mut self, identifier: &str) -> Result<ConnectionHandle, TransportError> {
        let (session, local_id) = self.session.clone().ok_or(TransportError::NoSession)?;

        let mut net = self.network.lock();
        let (remote_session, remote_events) = match net.endpoints.get(identifier) {
            Some(endpoint) => (endpoint.session, endpoint.events.clone()),
            None => return Err(TransportError::UnknownPeer(identifier.to_string())),
        };
        net.next_connection += 1;
        let connection = net.next_connection;

        let local = ConnectionHandle {
            session,
            connection,
        };
        let remote = ConnectionHandle {
            session: remote_session,
            connection,
        };
        net.links.insert(
            local,
            Link {
                peer: remote,
                peer_events: remote_events.clone(),
            },
        );
        net.links.insert(
            remote,
            Link {
                peer: local,
                peer_events: self.events.clone(),
            },
        );
        drop(net);

        let _ = remote_events.send(TransportEvent::Incoming(remote));
        let _ = remote_events.send(TransportEvent::Open {
            handle: remote,
            remote: local_id,
            reliable: true,
        });
        let _ = self.events.send(TransportEvent::Open {
            handle: local,
            remote: identifier.to_string(),
            reliable: true,
        });
        Ok(local)
    }

    fn send(
        &mut self,
        handle: ConnectionHandle,
        payload: &Notification,
    ) -> Result<(), TransportError> {
        let net = self.network.lock();
        let link = net.links.get(&handle).ok_or(TransportError::NotOpen(handle))?;
        let _ = link.peer_events.send(TransportEvent::Message {
            handle: link.peer,
            payload: *payload,
        });
        Ok(())
    }

    fn close(&mut self, handle: ConnectionHandle) {
        let mut net = self.network.lock();
        if let Some(link) = net.links.remove(&handle) {
            net.links.remove(&link.peer);
            let _ = link.peer_events.send(TransportEvent::Closed(link.peer));
        }
    }

    fn destroy_session(&mut self) {
        let Some((session, identifier)) = self.session.take() else {
            return;
        };
        let owned: Vec<ConnectionHandle> = {
            let mut net = self.network.lock();
            net.endpoints.remove(&identifier);
            net.links
                .keys()
                .filter(|h| h.session == session)
                .copied()
                .collect()
        };
        for handle in owned {
            self.close(handle);
        }
        debug!(%identifier, "memory session destroyed");
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.destroy_session();
    }
}
