//! Card representation.
//!
//! Cards live in an arena owned by [`crate::Duel`]; everything else
//! refers to them through [`CardHandle`] indices. Relationship fields
//! (equip, target) are handle sets, so the cyclic equip/target graph
//! never turns into ownership cycles.

use std::collections::HashMap;

use crate::attribute::Attribute;
use crate::card_type::CardType;
use crate::player::Player;
use crate::position::Position;
use crate::race::Race;

/// Stable handle to a card in the duel arena.
///
/// Handles stay valid for the lifetime of one duel; a new duel starts
/// from an empty arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardHandle(u32);

impl CardHandle {
    pub(crate) fn new(index: usize) -> Self {
        CardHandle(index as u32)
    }

    pub(crate) fn arena_index(self) -> usize {
        self.0 as usize
    }
}

/// A single tracked card.
///
/// `id` is 0 until the server reveals the card's identity; a zero id
/// turning non-zero is the normal reveal path. All attribute fields
/// mirror server-supplied values and are never inferred locally.
#[derive(Debug, Clone)]
pub struct Card {
    /// Card code; 0 while the card is hidden from this client.
    pub id: u32,
    pub controller: Player,
    pub position: Position,
    pub alias: u32,
    pub card_type: CardType,
    pub level: u32,
    pub rank: u32,
    pub attribute: Attribute,
    pub race: Race,
    pub attack: i32,
    pub defence: i32,
    pub base_attack: i32,
    pub base_defence: i32,
    /// Reason flags for the card's latest movement.
    pub reason: u32,
    pub reason_card: Option<CardHandle>,
    pub status: u32,
    pub lscale: u32,
    pub rscale: u32,
    pub link: u32,
    pub link_marker: u32,

    /// Counter type -> count. Wholly replaced on each counters update.
    pub counters: HashMap<u16, u16>,
    /// Card codes of the overlay units stacked under this card.
    pub overlays: Vec<u32>,

    /// The card this one is equipped to, if any.
    pub equip_target: Option<CardHandle>,
    /// Cards equipped to this one.
    pub equip_cards: Vec<CardHandle>,
    /// Cards this one currently targets.
    pub target_cards: Vec<CardHandle>,
    /// Cards currently targeting this one.
    pub targeted_by: Vec<CardHandle>,

    /// Battle-command bookkeeping for the current battle phase.
    pub can_direct_attack: bool,
    pub attacked: bool,
}

impl Card {
    pub fn new(controller: Player) -> Self {
        Card {
            id: 0,
            controller,
            position: Position::default(),
            alias: 0,
            card_type: CardType::default(),
            level: 0,
            rank: 0,
            attribute: Attribute::default(),
            race: Race::default(),
            attack: 0,
            defence: 0,
            base_attack: 0,
            base_defence: 0,
            reason: 0,
            reason_card: None,
            status: 0,
            lscale: 0,
            rscale: 0,
            link: 0,
            link_marker: 0,
            counters: HashMap::new(),
            overlays: Vec::new(),
            equip_target: None,
            equip_cards: Vec::new(),
            target_cards: Vec::new(),
            targeted_by: Vec::new(),
            can_direct_attack: false,
            attacked: false,
        }
    }

    pub fn is_faceup(&self) -> bool {
        self.position.is_faceup()
    }
}
