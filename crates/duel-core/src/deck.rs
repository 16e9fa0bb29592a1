//! Deck lists.
//!
//! A deck is three lists of card codes in submission order. Loading a
//! list from disk is the caller's business; the client only needs the
//! codes to submit on join and after side-deck changes.

/// The main / extra / side card-code lists this client duels with.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub main: Vec<u32>,
    pub extra: Vec<u32>,
    pub side: Vec<u32>,
}

impl Deck {
    pub fn new(main: Vec<u32>, extra: Vec<u32>, side: Vec<u32>) -> Self {
        Deck { main, extra, side }
    }

    pub fn count_main(&self) -> usize {
        self.main.len()
    }

    pub fn count_extra(&self) -> usize {
        self.extra.len()
    }

    pub fn count_side(&self) -> usize {
        self.side.len()
    }
}
