//! Choice sets for the two command prompts.
//!
//! These are decoded candidate sets the executor picks from. The list
//! order mirrors the wire order exactly because idle/battle replies
//! encode the chosen list index.

use crate::card::CardHandle;

/// Everything the turn player may do at a main phase prompt.
#[derive(Debug, Default)]
pub struct MainPhaseCommands {
    pub summonable: Vec<CardHandle>,
    pub spsummonable: Vec<CardHandle>,
    pub repositionable: Vec<CardHandle>,
    pub msetable: Vec<CardHandle>,
    pub ssetable: Vec<CardHandle>,
    pub activatable: Vec<CardHandle>,
    /// Effect descriptions, parallel to `activatable`.
    pub activation_descs: Vec<u64>,
    pub can_battle: bool,
    pub can_end: bool,
    pub can_shuffle: bool,
}

/// Everything the turn player may do at a battle phase prompt.
#[derive(Debug, Default)]
pub struct BattlePhaseCommands {
    pub activatable: Vec<CardHandle>,
    /// Effect descriptions, parallel to `activatable`.
    pub activation_descs: Vec<u64>,
    pub attackable: Vec<CardHandle>,
    pub can_main2: bool,
    pub can_end: bool,
}
