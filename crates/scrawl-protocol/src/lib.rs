//! Wire protocol for Scrawl.
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Player`],
//!   [`GameStateView`], ...) — the events exchanged with browser clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (events) → Session (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    Avatar, ClientEvent, GameStateView, MessageKind, Player, PlayerId, Recipient,
    ServerEvent, SessionId, SessionStatus,
};
