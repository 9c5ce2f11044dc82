// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Generate an opaque 22-character base64url token from 16 random bytes.
///
/// Tokens carry no padding and are safe to embed in actor and message IDs.
pub fn random_token() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

/// Actor identifier of the form `local@hive`.
///
/// The part before the first `@` names the actor within its hive; the part
/// after it names the owning hive. An ID without `@` is *unqualified* and is
/// stamped with the local hive ID when it passes through a hive.
///
/// # Example
/// ```rust
/// use waggle::util::{ActorId, HiveId};
///
/// let hive = HiveId::generate();
/// let id = ActorId::join("worker", &hive);
/// assert!(id.is_qualified());
/// assert_eq!(id.local_part(), "worker");
/// assert_eq!(id.hive_part(), Some(hive.as_str()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an existing ID string, qualified or not.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Compose a qualified ID from an unqualified local part and a hive ID.
    pub fn join(local: &str, hive: &HiveId) -> Self {
        debug_assert!(!local.contains('@'), "local id must be unqualified");
        Self(format!("{local}@{}", hive.as_str()))
    }

    /// Whether this ID carries a hive part.
    pub fn is_qualified(&self) -> bool {
        self.0.contains('@')
    }

    /// Split into `(local, hive)` on the first `@` only, so an embedded `@`
    /// stays in the hive part.
    pub fn split(&self) -> (&str, Option<&str>) {
        match self.0.split_once('@') {
            Some((local, hive)) => (local, Some(hive)),
            None => (self.0.as_str(), None),
        }
    }

    /// The local part of the ID.
    pub fn local_part(&self) -> &str {
        self.split().0
    }

    /// The hive part of the ID, if qualified.
    pub fn hive_part(&self) -> Option<&str> {
        self.split().1
    }

    /// Return this ID qualified with `hive`, or unchanged when it already
    /// names a hive.
    pub fn qualify(&self, hive: &HiveId) -> ActorId {
        if self.is_qualified() {
            self.clone()
        } else {
            Self(format!("{}@{}", self.0, hive.as_str()))
        }
    }

    /// The full ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a hive, fixed for the hive's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiveId(String);

impl HiveId {
    /// Generate a fresh random hive ID.
    pub fn generate() -> Self {
        Self(random_token())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HiveId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Message identifier of the form `<token>:<counter>`.
///
/// The token is fixed per hive lifetime and the counter increases
/// monotonically, so IDs are unique within a hive and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Compose an ID from a hive-lifetime token and a sequence number.
    pub fn compose(token: &str, seq: u64) -> Self {
        Self(format!("{token}:{seq}"))
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}
