//! duel-core
//!
//! Pure duel-state logic:
//! - player / location / position / phase enumerations
//! - card arena and per-player fields
//! - the duel aggregate mirroring server-side truth
//! - deck lists and command choice sets

pub mod attribute;
pub mod card;
pub mod card_type;
pub mod commands;
pub mod deck;
pub mod duel;
pub mod field;
pub mod location;
pub mod phase;
pub mod player;
pub mod position;
pub mod race;
pub mod zone;

pub use attribute::Attribute;
pub use card::{Card, CardHandle};
pub use card_type::CardType;
pub use commands::{BattlePhaseCommands, MainPhaseCommands};
pub use deck::Deck;
pub use duel::{ChainLink, Duel};
pub use field::Field;
pub use location::Location;
pub use phase::Phase;
pub use player::Player;
pub use position::Position;
pub use race::Race;
