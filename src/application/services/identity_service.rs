//! Signed user identity cookie.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::entities::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Name of the identity cookie.
pub const COOKIE_NAME: &str = "token";

/// Cookie lifetime in seconds.
pub const COOKIE_MAX_AGE: u64 = 1200;

/// Issues and verifies the `token` cookie that groups requests by user.
///
/// The cookie value is `<id>.<hex HMAC-SHA256(id)>`. It identifies a browser
/// session for history purposes only and carries no authority.
#[derive(Clone)]
pub struct IdentityService {
    signing_secret: String,
}

impl IdentityService {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
        }
    }

    fn mac(&self, user_id: UserId) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(user_id.to_string().as_bytes());
        mac
    }

    fn sign(&self, user_id: UserId) -> String {
        hex::encode(self.mac(user_id).finalize().into_bytes())
    }

    /// Returns a fresh random user id.
    pub fn issue(&self) -> UserId {
        UserId(i64::from(rand::random::<u32>()))
    }

    /// Encodes a user id as a signed cookie value.
    pub fn encode(&self, user_id: UserId) -> String {
        format!("{}.{}", user_id, self.sign(user_id))
    }

    /// Decodes a cookie value, returning `None` if it is malformed or the
    /// signature does not match.
    pub fn verify(&self, value: &str) -> Option<UserId> {
        let (id, signature) = value.split_once('.')?;
        let user_id = UserId(id.parse().ok()?);
        let signature = hex::decode(signature).ok()?;

        self.mac(user_id).verify_slice(&signature).ok()?;

        Some(user_id)
    }

    /// Renders the `Set-Cookie` header value for a user.
    pub fn set_cookie(&self, user_id: UserId) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly",
            COOKIE_NAME,
            self.encode(user_id),
            COOKIE_MAX_AGE
        )
    }
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService").finish_non_exhaustive()
    }
}
