use core::{
    fmt::{self, Display},
    time::Duration,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};

pub use model::Session;

/// Shared handle to a session. Holding the lock serializes every request of that browser.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Opaque random identifier handed to the browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId([u8; 16]);

impl SessionId {
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Parses the hexadecimal form produced by [`Display`].
    pub fn from_hex(text: &[u8]) -> Option<Self> {
        let mut bytes = [0; 16];
        hex::decode_to_slice(text, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for SessionId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

struct Entry {
    session: SessionHandle,
    last_seen: Instant,
}

/// In-memory key-value store of every live session.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Entry>,
}

impl SessionStore {
    /// Takes ownership of a session under a new random identifier.
    pub fn insert(&self, session: Session) -> (SessionId, SessionHandle) {
        let session = Arc::new(Mutex::new(session));
        loop {
            let id = SessionId::random();
            use dashmap::mapref::entry::Entry::Vacant;
            if let Vacant(entry) = self.sessions.entry(id) {
                entry.insert(Entry { session: session.clone(), last_seen: Instant::now() });
                log::debug!("Created session {id}.");
                return (id, session);
            }
        }
    }

    /// Looks up a session and marks it as recently used.
    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let mut entry = self.sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Drops every session that has been idle for at least `ttl`. Sessions currently
    /// borrowed by a request are kept. Returns the number of sessions removed.
    pub fn purge_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| Arc::strong_count(&entry.session) > 1 || now.duration_since(entry.last_seen) < ttl);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            log::debug!("Purged {purged} idle sessions.");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
