//! Newtype domain identifiers.
//!
//! Every resource kind that carries a server-assigned identity is represented
//! as a distinct newtype wrapping an `i64`. This prevents accidentally
//! interchanging — for example — a [`CommandId`] with a [`PlatformId`] even
//! though both are integers under the hood.
//!
//! Remote identifiers are owned by the Crank server: they appear after the
//! first successful create and are only ever held here by value. [`LocalId`]
//! is the one exception — a client-side token for resources the server gives
//! no individually addressable id (see the identity allocator in the
//! reconcile crate).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for i64-wrapped newtypes (server-assigned integers).
// Generates: struct (Copy, Ord), new(), as_i64(), Display.
// ---------------------------------------------------------------------------
macro_rules! remote_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from a raw server-assigned integer.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

remote_id! {
    /// Identifies a watched source repository registered with the server.
    RepositoryId
}

remote_id! {
    /// Identifies a container command the server can run in response to
    /// repository events.
    CommandId
}

remote_id! {
    /// Identifies a VCS platform the server supports (GitHub, GitLab, Gitea).
    ///
    /// The supported-platform table is server-owned; these ids are never
    /// created or deleted by this client.
    PlatformId
}

remote_id! {
    /// Identifies a key/value setting attached to a command.
    SettingId
}

remote_id! {
    /// Identifies a single execution of a command.
    RunId
}

remote_id! {
    /// Identifies a user account on the server.
    UserId
}

remote_id! {
    /// Identifies an API key pair belonging to a user.
    ApiKeyId
}

remote_id! {
    /// Identifies a received hook event.
    EventId
}

// ---------------------------------------------------------------------------
// Identifiers — locally allocated
// ---------------------------------------------------------------------------

/// A locally-unique token standing in for resources that have no remote
/// identity (e.g. a VCS token, which the server keys by platform).
///
/// Allocated by the reconcile crate's identity allocator; never sent to the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    /// Creates a [`LocalId`], returning `None` if the token is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let t = token.into();
        if t.is_empty() { None } else { Some(Self(t)) }
    }

    /// Creates a [`LocalId`] from a prefix and a counter value. Infallible:
    /// the counter digits alone make the token non-empty.
    pub fn from_parts(prefix: impl std::fmt::Display, count: u64) -> Self {
        Self(format!("{prefix}{count:05}"))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
