use std::collections::HashMap;

use anyhow::{Result, bail};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::application::AppError;
use crate::domain::{CARD_OWNER_ROLE, Principal};

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "cashcard";

/// Compared against on an unknown user so misses cost the same as mismatches.
const MISSING_USER_PASSWORD: &str = "\u{0}missing-user\u{0}";

#[derive(Debug, Clone)]
struct User {
    password: String,
    roles: Vec<String>,
}

/// In-memory set of users allowed to sign in with HTTP Basic credentials.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, password: &str, roles: &[&str]) -> Self {
        self.insert(
            name.to_string(),
            password.to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    /// Build a store from `name:password[:role+role]` entries.
    /// Entries without roles get the card owner role.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut store = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let mut parts = entry.splitn(3, ':');
            let (name, password) = match (parts.next(), parts.next()) {
                (Some(name), Some(password)) if !name.is_empty() && !password.is_empty() => {
                    (name, password)
                }
                _ => bail!("Invalid user entry '{}'. Use name:password[:roles]", entry),
            };
            let roles = match parts.next() {
                Some(roles) => roles
                    .split('+')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect(),
                None => vec![CARD_OWNER_ROLE.to_string()],
            };
            if store.users.contains_key(name) {
                bail!("Duplicate user '{}'", name);
            }
            store.insert(name.to_string(), password.to_string(), roles);
        }
        Ok(store)
    }

    fn insert(&mut self, name: String, password: String, roles: Vec<String>) {
        self.users.insert(name, User { password, roles });
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Resolve an `Authorization` header value into a principal.
    ///
    /// Any failure, whether malformed header, unknown user or wrong
    /// password, is reported as `Unauthenticated`.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AppError> {
        let (name, password) = authorization
            .and_then(decode_basic)
            .ok_or(AppError::Unauthenticated)?;

        let user = self.users.get(&name);
        let expected = user.map_or(MISSING_USER_PASSWORD, |u| u.password.as_str());
        let matches = constant_time_eq(expected.as_bytes(), password.as_bytes());

        match user {
            Some(user) if matches => Ok(Principal {
                name,
                roles: user.roles.clone(),
            }),
            _ => Err(AppError::Unauthenticated),
        }
    }
}

/// Reject principals that lack the card owner role.
pub fn authorize(principal: &Principal) -> Result<(), AppError> {
    if principal.has_role(CARD_OWNER_ROLE) {
        Ok(())
    } else {
        Err(AppError::Forbidden(principal.name.clone()))
    }
}

/// Encode credentials as an `Authorization` header value.
pub fn basic_header(name: &str, password: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{name}:{password}")))
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, password) = decoded.split_once(':')?;
    Some((name.to_string(), password.to_string()))
}

/// Compare without stopping at the first difference or at a length mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = u8::from(a.len() != b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= x ^ y;
    }
    diff == 0
}
