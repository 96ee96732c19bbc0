//! Registry of live WebSocket clients.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chatbotx_session::ServerFrame;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::bot::BotReply;

/// Greeting pushed to every new connection.
pub const WELCOME_MESSAGE: &str = "Connected successfully! How can I help you today?";
/// Notice sent before an idle connection is closed.
pub const TIMEOUT_MESSAGE: &str = "Connection timed out due to inactivity";

/// Instructions for a connection's writer task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Frame(ServerFrame),
    Close,
}

pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

struct Connection {
    token: u64,
    sender: OutboundSender,
    connected_at: DateTime<Utc>,
    last_activity: Instant,
    last_activity_at: DateTime<Utc>,
}

/// Public view of one connection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionInfo {
    pub client_id: String,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStats {
    pub total_connections: usize,
    pub total_rooms: usize,
    /// Members per room
    pub rooms: BTreeMap<String, usize>,
    pub connected_clients: Vec<String>,
}

/// Tracks connections by client id plus named broadcast rooms.
///
/// Each connection is represented by the sending half of an unbounded
/// channel drained by a per-socket writer task, so every method here is
/// synchronous.
#[derive(Default)]
pub struct ConnectionManager {
    connections: RwLock<HashMap<String, Connection>>,
    rooms: RwLock<HashMap<String, HashSet<String>>>,
    next_token: AtomicU64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client and greet it.
    ///
    /// Returns a token identifying this particular connection; pass it to
    /// [`ConnectionManager::release`] when the socket ends. A reconnect with
    /// the same id closes and replaces the previous channel.
    pub fn connect(&self, client_id: &str, sender: OutboundSender) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let previous = self.connections.write().insert(
            client_id.to_string(),
            Connection {
                token,
                sender,
                connected_at: now,
                last_activity: Instant::now(),
                last_activity_at: now,
            },
        );
        if let Some(previous) = previous {
            debug!(client_id = %client_id, "Replacing existing connection");
            let _ = previous.sender.send(Outbound::Close);
        }

        info!(client_id = %client_id, total = self.connection_count(), "Client connected");
        self.send_system(client_id, WELCOME_MESSAGE, None);
        token
    }

    /// Remove a client and its room memberships.
    pub fn disconnect(&self, client_id: &str) -> bool {
        let removed = self.connections.write().remove(client_id).is_some();
        self.leave_all_rooms(client_id);
        if removed {
            info!(client_id = %client_id, total = self.connection_count(), "Client disconnected");
        }
        removed
    }

    /// Disconnect `client_id` only if `token` still names its live connection.
    pub fn release(&self, client_id: &str, token: u64) -> bool {
        let is_current = self
            .connections
            .read()
            .get(client_id)
            .is_some_and(|c| c.token == token);
        is_current && self.disconnect(client_id)
    }

    /// Whether `token` still names the live connection of `client_id`.
    pub fn is_current(&self, client_id: &str, token: u64) -> bool {
        self.connections
            .read()
            .get(client_id)
            .is_some_and(|c| c.token == token)
    }

    /// Queue a frame for one client. A closed channel disconnects the client.
    pub fn send_personal(&self, client_id: &str, frame: ServerFrame) -> bool {
        let result = {
            let mut connections = self.connections.write();
            match connections.get_mut(client_id) {
                Some(conn) => {
                    let ok = conn.sender.send(Outbound::Frame(frame)).is_ok();
                    if ok {
                        conn.last_activity = Instant::now();
                        conn.last_activity_at = Utc::now();
                    }
                    Some(ok)
                }
                None => None,
            }
        };

        match result {
            Some(true) => true,
            Some(false) => {
                warn!(client_id = %client_id, "Send failed, dropping connection");
                self.disconnect(client_id);
                false
            }
            None => false,
        }
    }

    /// Send to every client except `exclude`. Returns the number reached.
    pub fn broadcast(&self, frame: &ServerFrame, exclude: Option<&str>) -> usize {
        let targets: Vec<String> = self
            .connections
            .read()
            .keys()
            .filter(|id| Some(id.as_str()) != exclude)
            .cloned()
            .collect();
        targets
            .iter()
            .filter(|id| self.send_personal(id, frame.clone()))
            .count()
    }

    /// Send to every member of `room` except `exclude`.
    pub fn send_to_room(&self, room: &str, frame: &ServerFrame, exclude: Option<&str>) -> usize {
        let members = self.room_members(room);
        members
            .iter()
            .filter(|id| Some(id.as_str()) != exclude)
            .filter(|id| self.send_personal(id, frame.clone()))
            .count()
    }

    /// Add a client to a room. Returns false if it was already a member.
    pub fn join_room(&self, client_id: &str, room: &str) -> bool {
        let joined = self
            .rooms
            .write()
            .entry(room.to_string())
            .or_default()
            .insert(client_id.to_string());
        if joined {
            debug!(client_id = %client_id, room = %room, "Joined room");
        }
        joined
    }

    /// Remove a client from a room; empty rooms are dropped.
    pub fn leave_room(&self, client_id: &str, room: &str) -> bool {
        let mut rooms = self.rooms.write();
        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let left = members.remove(client_id);
        if members.is_empty() {
            rooms.remove(room);
        }
        left
    }

    fn leave_all_rooms(&self, client_id: &str) {
        let mut rooms = self.rooms.write();
        for members in rooms.values_mut() {
            members.remove(client_id);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    /// Sorted member ids of a room.
    pub fn room_members(&self, room: &str) -> Vec<String> {
        let mut members: Vec<String> = self
            .rooms
            .read()
            .get(room)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_connected(&self, client_id: &str) -> bool {
        self.connections.read().contains_key(client_id)
    }

    /// `online` for connected clients, `offline` otherwise.
    pub fn user_status(&self, client_id: &str) -> &'static str {
        if self.is_connected(client_id) {
            "online"
        } else {
            "offline"
        }
    }

    pub fn connection_info(&self, client_id: &str) -> Option<ConnectionInfo> {
        self.connections
            .read()
            .get(client_id)
            .map(|c| ConnectionInfo {
                client_id: client_id.to_string(),
                connected_at: c.connected_at,
                last_activity: c.last_activity_at,
                status: "online".to_string(),
            })
    }

    pub fn stats(&self) -> ConnectionStats {
        let mut connected_clients: Vec<String> =
            self.connections.read().keys().cloned().collect();
        connected_clients.sort();
        let rooms: BTreeMap<String, usize> = self
            .rooms
            .read()
            .iter()
            .map(|(room, members)| (room.clone(), members.len()))
            .collect();

        ConnectionStats {
            total_connections: connected_clients.len(),
            total_rooms: rooms.len(),
            rooms,
            connected_clients,
        }
    }

    /// Refresh a client's activity timestamp.
    pub fn touch(&self, client_id: &str) {
        if let Some(conn) = self.connections.write().get_mut(client_id) {
            conn.last_activity = Instant::now();
            conn.last_activity_at = Utc::now();
        }
    }

    pub fn send_typing(&self, client_id: &str, is_typing: bool) -> bool {
        self.send_personal(client_id, ServerFrame::typing(is_typing))
    }

    pub fn send_system(&self, client_id: &str, message: &str, message_type: Option<&str>) -> bool {
        let frame = match message_type {
            Some(kind) => ServerFrame::system_with_type(message, kind),
            None => ServerFrame::system(message),
        };
        self.send_personal(client_id, frame)
    }

    pub fn send_error(&self, client_id: &str, message: &str) -> bool {
        self.send_personal(client_id, ServerFrame::error(message))
    }

    pub fn send_bot_response(&self, client_id: &str, reply: &BotReply) -> bool {
        self.send_personal(client_id, reply.to_frame())
    }

    /// Warn, close and disconnect clients idle for longer than `timeout`.
    ///
    /// Returns the ids that were removed.
    pub fn cleanup_inactive(&self, timeout: Duration) -> Vec<String> {
        let idle: Vec<(String, OutboundSender)> = self
            .connections
            .read()
            .iter()
            .filter(|(_, c)| c.last_activity.elapsed() > timeout)
            .map(|(id, c)| (id.clone(), c.sender.clone()))
            .collect();

        for (client_id, sender) in &idle {
            let _ = sender.send(Outbound::Frame(ServerFrame::system_with_type(
                TIMEOUT_MESSAGE,
                "warning",
            )));
            let _ = sender.send(Outbound::Close);
            self.disconnect(client_id);
        }

        if !idle.is_empty() {
            info!(count = idle.len(), "Cleaned up inactive connections");
        }
        idle.into_iter().map(|(id, _)| id).collect()
    }

    /// Run [`ConnectionManager::cleanup_inactive`] every `interval`.
    pub fn spawn_cleanup_task(
        self: Arc<Self>,
        interval: Duration,
        timeout: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.cleanup_inactive(timeout);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn connect(manager: &ConnectionManager, id: &str) -> (u64, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (manager.connect(id, tx), rx)
    }

    fn next_frame(rx: &mut UnboundedReceiver<Outbound>) -> ServerFrame {
        match rx.try_recv() {
            Ok(Outbound::Frame(frame)) => frame,
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_connect_sends_welcome() {
        let manager = ConnectionManager::new();
        let (_, mut rx) = connect(&manager, "c1");

        match next_frame(&mut rx) {
            ServerFrame::System { message, .. } => assert_eq!(message, WELCOME_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
        assert!(manager.is_connected("c1"));
        assert_eq!(manager.user_status("c1"), "online");
        assert_eq!(manager.user_status("c2"), "offline");
    }

    #[test]
    fn test_reconnect_replaces_channel() {
        let manager = ConnectionManager::new();
        let (old_token, mut old_rx) = connect(&manager, "c1");
        let (new_token, _new_rx) = connect(&manager, "c1");

        next_frame(&mut old_rx);
        assert_eq!(old_rx.try_recv().unwrap(), Outbound::Close);
        assert_eq!(manager.connection_count(), 1);

        // The stale socket finishing must not remove the new connection
        assert!(!manager.release("c1", old_token));
        assert!(manager.is_connected("c1"));
        assert!(manager.release("c1", new_token));
        assert!(!manager.is_connected("c1"));
    }

    #[test]
    fn test_failed_send_disconnects() {
        let manager = ConnectionManager::new();
        let (_, rx) = connect(&manager, "c1");
        drop(rx);

        assert!(!manager.send_typing("c1", true));
        assert!(!manager.is_connected("c1"));
    }

    #[test]
    fn test_rooms() {
        let manager = ConnectionManager::new();
        let (_, mut rx1) = connect(&manager, "c1");
        let (_, mut rx2) = connect(&manager, "c2");
        next_frame(&mut rx1);
        next_frame(&mut rx2);

        assert!(manager.join_room("c1", "cs101"));
        assert!(!manager.join_room("c1", "cs101"));
        assert!(manager.join_room("c2", "cs101"));
        assert_eq!(manager.room_members("cs101"), vec!["c1", "c2"]);

        let sent = manager.send_to_room("cs101", &ServerFrame::system("hi room"), Some("c1"));
        assert_eq!(sent, 1);
        assert!(rx1.try_recv().is_err());
        assert!(matches!(next_frame(&mut rx2), ServerFrame::System { .. }));

        assert!(manager.leave_room("c1", "cs101"));
        assert!(!manager.leave_room("c1", "cs101"));
        manager.disconnect("c2");
        assert!(manager.room_members("cs101").is_empty());
        assert_eq!(manager.stats().total_rooms, 0);
    }

    #[test]
    fn test_broadcast_and_stats() {
        let manager = ConnectionManager::new();
        let (_, _rx1) = connect(&manager, "b");
        let (_, _rx2) = connect(&manager, "a");
        manager.join_room("a", "lobby");

        assert_eq!(manager.broadcast(&ServerFrame::system("all"), None), 2);
        assert_eq!(manager.broadcast(&ServerFrame::system("most"), Some("a")), 1);

        let stats = manager.stats();
        assert_eq!(stats.total_connections, 2);
        assert_eq!(stats.connected_clients, vec!["a", "b"]);
        assert_eq!(stats.rooms.get("lobby"), Some(&1));
    }

    #[test]
    fn test_cleanup_inactive() {
        let manager = ConnectionManager::new();
        let (_, mut idle_rx) = connect(&manager, "idle");
        next_frame(&mut idle_rx);
        std::thread::sleep(Duration::from_millis(30));
        let (_, _active_rx) = connect(&manager, "active");

        let removed = manager.cleanup_inactive(Duration::from_millis(20));
        assert_eq!(removed, vec!["idle"]);
        assert!(manager.is_connected("active"));
        assert!(!manager.is_connected("idle"));

        match next_frame(&mut idle_rx) {
            ServerFrame::System {
                message,
                message_type,
                ..
            } => {
                assert_eq!(message, TIMEOUT_MESSAGE);
                assert_eq!(message_type.as_deref(), Some("warning"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(idle_rx.try_recv().unwrap(), Outbound::Close);
    }

    #[test]
    fn test_touch_refreshes_activity() {
        let manager = ConnectionManager::new();
        let (_, _rx) = connect(&manager, "c1");
        std::thread::sleep(Duration::from_millis(30));
        manager.touch("c1");
        assert!(manager.cleanup_inactive(Duration::from_millis(20)).is_empty());
    }
}
