//! Conversation protocols: short display codes such as `7QK2ZP0M4A` that
//! attendants read out to clients.
//!
//! A protocol is only drawn at random here. Uniqueness comes from the
//! `UNIQUE` constraint on `conversations.protocol`: [`insert_with_unique_protocol`]
//! keeps drawing new codes while the store reports a collision on that
//! column, up to [`MAX_PROTOCOL_ATTEMPTS`] inserts.

use std::{fmt, future::Future};

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::conversations::{Conversation, NewConversation};

pub const PROTOCOL_LEN: usize = 10;
pub const PROTOCOL_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const MAX_PROTOCOL_ATTEMPTS: u32 = 10;

/// Column carrying the uniqueness constraint a collision is reported on.
pub const PROTOCOL_FIELD: &str = "protocol";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Protocol(String);

impl Protocol {
    /// Draws [`PROTOCOL_LEN`] symbols from [`PROTOCOL_ALPHABET`], each
    /// independently and uniformly.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..PROTOCOL_LEN)
            .map(|_| PROTOCOL_ALPHABET[rng.random_range(0..PROTOCOL_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a single insert attempt was rejected by the store.
#[derive(Debug, Error)]
pub enum InsertError<E> {
    #[error("value for `{field}` is already taken")]
    UniqueViolation { field: String },
    #[error(transparent)]
    Other(E),
}

/// Where conversations get persisted.
///
/// Implementations must report a rejected duplicate as
/// [`InsertError::UniqueViolation`] naming the offending column, so the
/// retry policy never has to look inside backend-specific errors.
pub trait ConversationStore {
    type Error;

    fn insert_conversation(
        &self,
        new: &NewConversation,
        protocol: &Protocol,
    ) -> impl Future<Output = Result<Conversation, InsertError<Self::Error>>> + Send;
}

#[derive(Debug, Error)]
pub enum ProtocolError<E> {
    #[error("no unique protocol found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(InsertError<E>),
}

/// States of the insert policy. Starts at `Attempting(0)`; every other
/// variant is terminal.
#[derive(Debug)]
pub enum Attempt<T, E> {
    Attempting(u32),
    Created(T),
    Exhausted(u32),
    Failed(InsertError<E>),
}

impl<T, E> Attempt<T, E> {
    /// Transition out of `Attempting(n)` given the outcome of its insert.
    pub fn after(n: u32, max: u32, result: Result<T, InsertError<E>>) -> Self {
        match result {
            Ok(record) => Attempt::Created(record),
            Err(InsertError::UniqueViolation { field }) if field == PROTOCOL_FIELD => {
                if n + 1 < max {
                    Attempt::Attempting(n + 1)
                } else {
                    Attempt::Exhausted(n + 1)
                }
            }
            Err(err) => Attempt::Failed(err),
        }
    }
}

/// Inserts `new` under a freshly drawn protocol, drawing again whenever the
/// store reports the protocol as taken.
///
/// Any failure other than a protocol collision is returned right away,
/// including uniqueness violations on other columns.
pub async fn insert_with_unique_protocol<S, R>(
    store: &S,
    rng: &mut R,
    new: &NewConversation,
) -> Result<Conversation, ProtocolError<S::Error>>
where
    S: ConversationStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut state = Attempt::Attempting(0);
    loop {
        state = match state {
            Attempt::Attempting(n) => {
                let protocol = Protocol::generate(rng);
                let result = store.insert_conversation(new, &protocol).await;
                if matches!(&result, Err(InsertError::UniqueViolation { field }) if field == PROTOCOL_FIELD) {
                    debug!(attempt = n + 1, %protocol, "protocol collision, drawing again");
                }
                Attempt::after(n, MAX_PROTOCOL_ATTEMPTS, result)
            }
            Attempt::Created(conversation) => return Ok(conversation),
            Attempt::Exhausted(attempts) => {
                warn!(attempts, "gave up looking for a free protocol");
                return Err(ProtocolError::Exhausted { attempts });
            }
            Attempt::Failed(err) => return Err(ProtocolError::Store(err)),
        };
    }
}
