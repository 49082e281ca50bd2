use hyper::{header::COOKIE, HeaderMap};
use store::SessionId;

pub const COOKIE_NAME: &str = "sid";

/// Extracts the raw session cookie from a map of headers.
pub fn extract_session(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get_all(COOKIE)
        .into_iter()
        .flat_map(|value| value.as_bytes().split(|&byte| byte == b';'))
        .filter_map(|section| {
            let mid = section.iter().position(|&byte| byte == b'=')?;
            let (left, right) = section.split_at(mid);
            Some((left.trim_ascii(), right[1..].trim_ascii()))
        })
        .find_map(|(key, session)| (key == COOKIE_NAME.as_bytes()).then_some(session))
}

/// Binds session identifiers to a server secret so that the cookie cannot be forged.
///
/// The cookie value is the hexadecimal session ID followed by a dot and the hexadecimal
/// Blake3 keyed hash of the ID. The key itself is derived from the configured secret.
pub struct Signer {
    key: [u8; blake3::KEY_LEN],
}

impl Signer {
    const CONTEXT: &'static str = "trivia 2024-06-01 session cookie";

    pub fn new(secret: &str) -> Self {
        Self { key: blake3::derive_key(Self::CONTEXT, secret.as_bytes()) }
    }

    fn tag(&self, id: &SessionId) -> blake3::Hash {
        blake3::keyed_hash(&self.key, id.as_bytes())
    }

    pub fn sign(&self, id: &SessionId) -> String {
        format!("{id}.{}", self.tag(id).to_hex())
    }

    /// Recovers the session ID from a cookie value, provided its tag is authentic.
    pub fn verify(&self, cookie: &[u8]) -> Option<SessionId> {
        let mid = cookie.iter().position(|&byte| byte == b'.')?;
        let (id, tag) = cookie.split_at(mid);
        let id = SessionId::from_hex(id)?;

        let mut expected = [0; blake3::OUT_LEN];
        hex::decode_to_slice(&tag[1..], &mut expected).ok()?;

        // Constant-time comparison
        (self.tag(&id) == blake3::Hash::from(expected)).then_some(id)
    }

    /// Full `Set-Cookie` header value for the given session.
    pub fn set_cookie(&self, id: &SessionId) -> String {
        format!("{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax", self.sign(id))
    }
}
