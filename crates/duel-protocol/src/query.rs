//! Card attribute query streams.
//!
//! Data-update messages carry, per card, a self-terminating sequence
//! of `(u16 size, u32 code, payload)` records. A size of 0 (or the END
//! code) terminates the card's stream. A code this client does not
//! recognize consumes exactly its declared length and is otherwise
//! ignored, so newer server attributes pass through harmlessly.

use duel_core::{Attribute, CardHandle, CardType, Duel, Player, Position, Race};

use crate::packet::{Packet, ProtocolError};

pub const ID: u32 = 0x1;
pub const POSITION: u32 = 0x2;
pub const ALIAS: u32 = 0x4;
pub const TYPE: u32 = 0x8;
pub const LEVEL: u32 = 0x10;
pub const RANK: u32 = 0x20;
pub const ATTRIBUTE: u32 = 0x40;
pub const RACE: u32 = 0x80;
pub const ATTACK: u32 = 0x100;
pub const DEFENCE: u32 = 0x200;
pub const BASE_ATTACK: u32 = 0x400;
pub const BASE_DEFENCE: u32 = 0x800;
pub const REASON: u32 = 0x1000;
pub const REASON_CARD: u32 = 0x2000;
pub const EQUIP_CARD: u32 = 0x4000;
pub const TARGET_CARD: u32 = 0x8000;
pub const OVERLAY_CARD: u32 = 0x10000;
pub const COUNTERS: u32 = 0x20000;
pub const CONTROLLER: u32 = 0x40000;
pub const STATUS: u32 = 0x80000;
pub const IS_PUBLIC: u32 = 0x100000;
pub const LSCALE: u32 = 0x200000;
pub const RSCALE: u32 = 0x400000;
pub const LINK: u32 = 0x800000;
pub const IS_HIDDEN: u32 = 0x1000000;
pub const COVER: u32 = 0x2000000;
pub const END: u32 = 0x8000_0000;

/// Consume one card's query stream and apply every recognized record
/// to `card`.
pub fn apply_card_updates(
    packet: &mut Packet,
    duel: &mut Duel,
    card: CardHandle,
) -> Result<(), ProtocolError> {
    loop {
        let size = packet.read_u16()? as usize;
        if size == 0 {
            return Ok(());
        }

        let code = packet.read_u32()?;
        match code {
            ID => {
                duel.card_mut(card).id = packet.read_u32()?;
            }
            POSITION => {
                duel.card_mut(card).position = packet.read_position()?;
            }
            ALIAS => {
                duel.card_mut(card).alias = packet.read_u32()?;
            }
            TYPE => {
                duel.card_mut(card).card_type = CardType::from_raw(packet.read_u32()?);
            }
            LEVEL => {
                duel.card_mut(card).level = packet.read_u32()?;
            }
            RANK => {
                duel.card_mut(card).rank = packet.read_u32()?;
            }
            ATTRIBUTE => {
                duel.card_mut(card).attribute = Attribute::from_raw(packet.read_u32()?);
            }
            RACE => {
                duel.card_mut(card).race = Race::from_raw(packet.read_u32()?);
            }
            ATTACK => {
                duel.card_mut(card).attack = packet.read_u32()? as i32;
            }
            DEFENCE => {
                duel.card_mut(card).defence = packet.read_u32()? as i32;
            }
            BASE_ATTACK => {
                duel.card_mut(card).base_attack = packet.read_u32()? as i32;
            }
            BASE_DEFENCE => {
                duel.card_mut(card).base_defence = packet.read_u32()? as i32;
            }
            REASON => {
                duel.card_mut(card).reason = packet.read_u32()?;
            }
            REASON_CARD => {
                let referenced = read_card_ref(packet, duel)?;
                duel.card_mut(card).reason_card = referenced;
            }
            EQUIP_CARD => {
                if let Some(target) = read_card_ref(packet, duel)? {
                    duel.equip(card, target);
                }
            }
            TARGET_CARD => {
                let count = packet.read_u32()?;
                let mut targets = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    if let Some(target) = read_card_ref(packet, duel)? {
                        targets.push(target);
                    }
                }
                duel.replace_targets(card, targets);
            }
            OVERLAY_CARD => {
                let count = packet.read_u32()?;
                let mut overlays = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    overlays.push(packet.read_id()?);
                }
                duel.card_mut(card).overlays = overlays;
            }
            COUNTERS => {
                let count = packet.read_u32()?;
                let mut counters = std::collections::HashMap::new();
                for _ in 0..count {
                    let info = packet.read_u32()?;
                    let counter_type = (info & 0xffff) as u16;
                    let counter_count = (info >> 16) as u16;
                    counters.insert(counter_type, counter_count);
                }
                // Counters are replaced wholesale, never merged.
                duel.card_mut(card).counters = counters;
            }
            CONTROLLER => {
                let controller = read_player(packet)?;
                duel.card_mut(card).controller = controller;
            }
            STATUS => {
                duel.card_mut(card).status = packet.read_u32()?;
            }
            IS_PUBLIC => {
                let _ = packet.read_bool()?;
            }
            LSCALE => {
                duel.card_mut(card).lscale = packet.read_u32()?;
            }
            RSCALE => {
                duel.card_mut(card).rscale = packet.read_u32()?;
            }
            LINK => {
                duel.card_mut(card).link = packet.read_u32()?;
                duel.card_mut(card).link_marker = packet.read_u32()?;
            }
            IS_HIDDEN | COVER => {}
            END => return Ok(()),
            _ => {
                // Unknown attribute: the declared size covers the code
                // itself plus its value bytes.
                packet.read_bytes(size.saturating_sub(4))?;
            }
        }
    }
}

/// A `(controller, location, index, position)` card reference inside a
/// query record, resolved against the duel. `None` when the triple
/// names no trackable slot.
fn read_card_ref(packet: &mut Packet, duel: &mut Duel) -> Result<Option<CardHandle>, ProtocolError> {
    let controller = read_player(packet)?;
    let location = packet.read_location()?;
    let index = packet.read_u32()? as usize;
    let _position: Position = packet.read_position()?;
    Ok(duel.get_or_create(controller, location, index))
}

fn read_player(packet: &mut Packet) -> Result<Player, ProtocolError> {
    Player::from_index(packet.read_u8()?).ok_or(ProtocolError::InvalidField("player"))
}
