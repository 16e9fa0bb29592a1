//! Example: connect to a duel server with a trivial executor.
//!
//! Usage:
//!
//! ```bash
//! DUEL_SERVER_HOST=127.0.0.1 DUEL_SERVER_PORT=7911 \
//!     cargo run --example first_choice
//! ```
//!
//! The executor always takes the first available option: it never
//! activates effects, passes every optional prompt, and ends its
//! phases as soon as the server allows. Useful as a protocol smoke
//! test against a real server, not as an opponent worth fearing.

use duel_client::{Config, DuelClient, DuelExecutor, TcpTransport};
use duel_core::{
    Attribute, BattlePhaseCommands, CardHandle, Deck, Duel, Location, MainPhaseCommands, Player,
    Position, Race,
};

struct FirstChoice;

impl DuelExecutor for FirstChoice {
    fn on_start(&mut self, _duel: &Duel) {}

    fn on_new_turn(&mut self, duel: &Duel) {
        println!("turn {} ({:?})", duel.turn, duel.turn_player);
    }

    fn on_new_phase(&mut self, _duel: &Duel) {}

    fn on_win(&mut self, _duel: &Duel, win: bool) {
        println!("duel over, {}", if win { "won" } else { "lost" });
    }

    fn on_rematch(&mut self, _won_match: bool) -> bool {
        false
    }

    fn change_side(&mut self, _deck: &mut Deck) {}

    fn select_hand(&mut self) -> u8 {
        1
    }

    fn select_tp(&mut self) -> bool {
        true
    }

    fn select_mainphase_action(&mut self, _duel: &Duel, commands: &MainPhaseCommands) -> u32 {
        // Prefer ending the phase; the encoding packs the action kind
        // into the low bits of the response word.
        if commands.can_end {
            7
        } else if commands.can_battle {
            6
        } else {
            0
        }
    }

    fn select_battle_action(&mut self, _duel: &Duel, commands: &BattlePhaseCommands) -> u32 {
        if commands.can_end {
            3
        } else {
            2
        }
    }

    fn select_effect_yn(&mut self, _duel: &Duel, _card: CardHandle, _description: u64) -> bool {
        false
    }

    fn select_yn(&mut self, _duel: &Duel) -> bool {
        false
    }

    fn select_battle_replay(&mut self, _duel: &Duel) -> bool {
        false
    }

    fn select_option(&mut self, _duel: &Duel, _options: &[u64]) -> u32 {
        0
    }

    fn select_card(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        min: u32,
        _max: u32,
        _cancelable: bool,
        _hint: u64,
    ) -> Vec<u32> {
        (0..min).collect()
    }

    fn select_tribute(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        min: u32,
        _max: u32,
        _cancelable: bool,
        _hint: u64,
    ) -> Vec<u32> {
        (0..min).collect()
    }

    fn select_chain(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        _descriptions: &[u64],
        forced: bool,
    ) -> i32 {
        if forced {
            0
        } else {
            -1
        }
    }

    fn select_place(
        &mut self,
        _duel: &Duel,
        _player: Player,
        _location: Location,
        choices: &[u8],
    ) -> u8 {
        choices.first().copied().unwrap_or(0)
    }

    fn select_position(&mut self, _duel: &Duel, _card_id: u32, choices: &[Position]) -> Position {
        choices.first().copied().unwrap_or(Position::FACEUP_ATTACK)
    }

    fn select_sum(
        &mut self,
        _duel: &Duel,
        _choices: &[(CardHandle, u16, u16)],
        _sum: i64,
        min: u32,
        _max: u32,
        _exact: bool,
        _hint: u64,
    ) -> Vec<u32> {
        (0..min).collect()
    }

    fn select_unselect(
        &mut self,
        _duel: &Duel,
        _choices: &[CardHandle],
        min: u32,
        _max: u32,
        _cancelable: bool,
        _hint: u64,
    ) -> Vec<u32> {
        if min == 0 {
            Vec::new()
        } else {
            vec![0]
        }
    }

    fn select_counter(
        &mut self,
        _duel: &Duel,
        _counter_type: u16,
        quantity: u32,
        _cards: &[CardHandle],
        counts: &[u16],
    ) -> Vec<u16> {
        // Greedily pay from the first candidates.
        let mut remaining = quantity;
        counts
            .iter()
            .map(|available| {
                let used = u32::from(*available).min(remaining);
                remaining -= used;
                used as u16
            })
            .collect()
    }

    fn announce_number(&mut self, _choices: &[u32]) -> u32 {
        0
    }

    fn announce_race(&mut self, choices: &[Race], count: u8) -> Vec<Race> {
        choices.iter().copied().take(count as usize).collect()
    }

    fn announce_attribute(&mut self, choices: &[Attribute], count: u8) -> Vec<Attribute> {
        choices.iter().copied().take(count as usize).collect()
    }

    fn sort_cards(&mut self, _duel: &Duel, cards: &[CardHandle]) -> Vec<u8> {
        (0..cards.len() as u8).collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    eprintln!("Connecting to {} as {}", config.socket_addr_string(), config.name);

    // A deck would normally come from the caller; an empty list is
    // enough to exercise the join flow against a no-check server.
    let deck = Deck::default();

    let transport = TcpTransport::connect(&config.socket_addr_string()).await?;
    let mut client = DuelClient::with_config(transport, deck, FirstChoice, &config);
    client.run().await?;

    eprintln!("Connection closed.");
    Ok(())
}
