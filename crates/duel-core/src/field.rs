//! One player's side of the field.
//!
//! Piles (deck, hand, graveyard, banished, extra deck, overlay) are
//! ordered growable sequences; monster and spell zones are fixed slot
//! arrays so empty zones stay addressable.

use crate::card::CardHandle;
use crate::location::Location;
use crate::zone::{MONSTER_SLOT_COUNT, SPELL_SLOT_COUNT};

/// Per-player card placement, keyed by [`Location`].
#[derive(Debug, Default)]
pub struct Field {
    pub deck: Vec<CardHandle>,
    pub hand: Vec<CardHandle>,
    pub grave: Vec<CardHandle>,
    pub banished: Vec<CardHandle>,
    pub extra: Vec<CardHandle>,
    pub overlay: Vec<CardHandle>,
    pub monster_zones: [Option<CardHandle>; MONSTER_SLOT_COUNT],
    pub spell_zones: [Option<CardHandle>; SPELL_SLOT_COUNT],

    /// Transient: a battle declaration is currently pointed at this side.
    pub under_attack: bool,
}

impl Field {
    pub fn new() -> Self {
        Field::default()
    }

    /// The handle at `(location, index)`, if the slot exists and is
    /// occupied.
    pub fn get(&self, location: Location, index: usize) -> Option<CardHandle> {
        if location.is_overlay() {
            return self.overlay.get(index).copied();
        }
        if location.intersects(Location::MONSTER_ZONE) {
            return self.monster_zones.get(index).copied().flatten();
        }
        if location.intersects(Location::SPELL_ZONE) {
            return self.spell_zones.get(index).copied().flatten();
        }
        self.pile(location)?.get(index).copied()
    }

    /// Put `handle` at `(location, index)`.
    ///
    /// Zone slots are overwritten; pile inserts clamp to the current
    /// length. Returns false when the location names no trackable
    /// pile or the zone index is out of range.
    pub fn place(&mut self, location: Location, index: usize, handle: CardHandle) -> bool {
        if location.is_overlay() {
            let at = index.min(self.overlay.len());
            self.overlay.insert(at, handle);
            return true;
        }
        if location.intersects(Location::MONSTER_ZONE) {
            if let Some(slot) = self.monster_zones.get_mut(index) {
                *slot = Some(handle);
                return true;
            }
            return false;
        }
        if location.intersects(Location::SPELL_ZONE) {
            if let Some(slot) = self.spell_zones.get_mut(index) {
                *slot = Some(handle);
                return true;
            }
            return false;
        }
        match self.pile_mut(location) {
            Some(pile) => {
                let at = index.min(pile.len());
                pile.insert(at, handle);
                true
            }
            None => false,
        }
    }

    /// Remove and return whatever occupies `(location, index)`.
    pub fn remove(&mut self, location: Location, index: usize) -> Option<CardHandle> {
        if location.is_overlay() {
            if index < self.overlay.len() {
                return Some(self.overlay.remove(index));
            }
            return None;
        }
        if location.intersects(Location::MONSTER_ZONE) {
            return self.monster_zones.get_mut(index)?.take();
        }
        if location.intersects(Location::SPELL_ZONE) {
            return self.spell_zones.get_mut(index)?.take();
        }
        let pile = self.pile_mut(location)?;
        if index < pile.len() {
            Some(pile.remove(index))
        } else {
            None
        }
    }

    /// Every slot of a location in order, `None` for empty zone slots.
    ///
    /// Returns `None` when the location names no trackable pile.
    pub fn all(&self, location: Location) -> Option<Vec<Option<CardHandle>>> {
        if location.is_overlay() {
            return Some(self.overlay.iter().map(|h| Some(*h)).collect());
        }
        if location.intersects(Location::MONSTER_ZONE) {
            return Some(self.monster_zones.to_vec());
        }
        if location.intersects(Location::SPELL_ZONE) {
            return Some(self.spell_zones.to_vec());
        }
        self.pile(location)
            .map(|pile| pile.iter().map(|h| Some(*h)).collect())
    }

    fn pile(&self, location: Location) -> Option<&Vec<CardHandle>> {
        if location.intersects(Location::DECK) {
            Some(&self.deck)
        } else if location.intersects(Location::HAND) {
            Some(&self.hand)
        } else if location.intersects(Location::GRAVE) {
            Some(&self.grave)
        } else if location.intersects(Location::BANISHED) {
            Some(&self.banished)
        } else if location.intersects(Location::EXTRA_DECK) {
            Some(&self.extra)
        } else {
            None
        }
    }

    fn pile_mut(&mut self, location: Location) -> Option<&mut Vec<CardHandle>> {
        if location.intersects(Location::DECK) {
            Some(&mut self.deck)
        } else if location.intersects(Location::HAND) {
            Some(&mut self.hand)
        } else if location.intersects(Location::GRAVE) {
            Some(&mut self.grave)
        } else if location.intersects(Location::BANISHED) {
            Some(&mut self.banished)
        } else if location.intersects(Location::EXTRA_DECK) {
            Some(&mut self.extra)
        } else {
            None
        }
    }
}
