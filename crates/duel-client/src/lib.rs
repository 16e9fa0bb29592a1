//! duel-client
//!
//! Client-side synchronization engine for the duel server protocol:
//! - [`transport`] : length-framed byte channel (trait + TCP impl)
//! - [`manager`]   : the message router and duel-state mirror driver
//! - [`executor`]  : the decision callback boundary
//! - [`client`]    : join handshake and the lockstep receive loop
//! - [`config`]    : environment-variable configuration
//!
//! The duel rule engine stays on the server; this client only mirrors
//! announced state and answers choice prompts.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod manager;
pub mod transport;

pub use client::DuelClient;
pub use config::Config;
pub use error::ClientError;
pub use executor::DuelExecutor;
pub use manager::{GameManager, Handled};
pub use transport::{TcpTransport, Transport};
