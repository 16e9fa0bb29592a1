//! Wire discriminants and protocol constants.
//!
//! This module defines:
//! - Message ids for both directions of the connection.
//! - The inner game-message ids carried by the game envelope.
//! - Server error kinds.
//! - The join handshake constant.
//!
//! The actual decode logic lives with the message router; dispatch is
//! a closed mapping, so an id missing from `from_u8` is deliberately
//! ignored rather than guessed at.

/// Handshake constant carried by the join acknowledgement. A mismatch
/// is fatal; the connection must be aborted before any deck is sent.
pub const SERVER_HANDSHAKE: u32 = 3_321_300_001;

/// Client-to-server message ids.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CtosMessage {
    Response = 0x01,
    UpdateDeck = 0x02,
    HandResult = 0x03,
    TpResult = 0x04,
    PlayerInfo = 0x10,
    CreateGame = 0x11,
    JoinGame = 0x12,
    LeaveGame = 0x13,
    Surrender = 0x14,
    TimeConfirm = 0x15,
    Chat = 0x16,
    ToDuelist = 0x20,
    ToSpectator = 0x21,
    Ready = 0x22,
    NotReady = 0x23,
    Kick = 0x24,
    Start = 0x25,
    RematchResponse = 0xf0,
}

/// Server-to-client message ids (the outer dispatch level).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StocMessage {
    GameMsg = 0x01,
    ErrorMsg = 0x02,
    SelectHand = 0x03,
    SelectTp = 0x04,
    HandResult = 0x05,
    TpResult = 0x06,
    ChangeSide = 0x07,
    WaitingSideChange = 0x08,
    CreateGame = 0x11,
    JoinGame = 0x12,
    TypeChange = 0x13,
    LeaveGame = 0x14,
    DuelStart = 0x15,
    DuelEnd = 0x16,
    Replay = 0x17,
    TimeLimit = 0x18,
    Chat = 0x19,
    PlayerEnter = 0x20,
    PlayerChange = 0x21,
    WatchChange = 0x22,
    NewReplay = 0x30,
    CatchUp = 0xf0,
    Rematch = 0xf1,
    WaitingRematch = 0xf2,
}

impl StocMessage {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(StocMessage::GameMsg),
            0x02 => Some(StocMessage::ErrorMsg),
            0x03 => Some(StocMessage::SelectHand),
            0x04 => Some(StocMessage::SelectTp),
            0x05 => Some(StocMessage::HandResult),
            0x06 => Some(StocMessage::TpResult),
            0x07 => Some(StocMessage::ChangeSide),
            0x08 => Some(StocMessage::WaitingSideChange),
            0x11 => Some(StocMessage::CreateGame),
            0x12 => Some(StocMessage::JoinGame),
            0x13 => Some(StocMessage::TypeChange),
            0x14 => Some(StocMessage::LeaveGame),
            0x15 => Some(StocMessage::DuelStart),
            0x16 => Some(StocMessage::DuelEnd),
            0x17 => Some(StocMessage::Replay),
            0x18 => Some(StocMessage::TimeLimit),
            0x19 => Some(StocMessage::Chat),
            0x20 => Some(StocMessage::PlayerEnter),
            0x21 => Some(StocMessage::PlayerChange),
            0x22 => Some(StocMessage::WatchChange),
            0x30 => Some(StocMessage::NewReplay),
            0xf0 => Some(StocMessage::CatchUp),
            0xf1 => Some(StocMessage::Rematch),
            0xf2 => Some(StocMessage::WaitingRematch),
            _ => None,
        }
    }
}

/// Inner game-message ids carried by [`StocMessage::GameMsg`].
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameMessage {
    Retry = 1,
    Hint = 2,
    Waiting = 3,
    Start = 4,
    Win = 5,
    UpdateData = 6,
    UpdateCard = 7,
    RequestDeck = 8,
    SelectBattleCmd = 10,
    SelectIdleCmd = 11,
    SelectEffectYn = 12,
    SelectYesNo = 13,
    SelectOption = 14,
    SelectCard = 15,
    SelectChain = 16,
    SelectPlace = 18,
    SelectPosition = 19,
    SelectTribute = 20,
    SortChain = 21,
    SelectCounter = 22,
    SelectSum = 23,
    SelectDisfield = 24,
    SortCard = 25,
    SelectUnselect = 26,
    ConfirmDecktop = 30,
    ConfirmCards = 31,
    ShuffleDeck = 32,
    ShuffleHand = 33,
    RefreshDeck = 34,
    SwapGraveDeck = 35,
    ShuffleSetCard = 36,
    ReverseDeck = 37,
    DeckTop = 38,
    ShuffleExtra = 39,
    NewTurn = 40,
    NewPhase = 41,
    ConfirmExtratop = 42,
    Move = 50,
    PosChange = 53,
    Set = 54,
    Swap = 55,
    FieldDisabled = 56,
    Summoning = 60,
    Summoned = 61,
    SpSummoning = 62,
    SpSummoned = 63,
    FlipSummoning = 64,
    FlipSummoned = 65,
    Chaining = 70,
    Chained = 71,
    ChainSolving = 72,
    ChainSolved = 73,
    ChainEnd = 74,
    ChainNegated = 75,
    ChainDisabled = 76,
    CardSelected = 80,
    RandomSelected = 81,
    BecomeTarget = 83,
    Draw = 90,
    Damage = 91,
    Recover = 92,
    Equip = 93,
    LpUpdate = 94,
    Unequip = 95,
    CardTarget = 96,
    CancelTarget = 97,
    PayLpCost = 100,
    AddCounter = 101,
    RemoveCounter = 102,
    Attack = 110,
    Battle = 111,
    AttackDisabled = 112,
    DamageStepStart = 113,
    DamageStepEnd = 114,
    MissedEffect = 120,
    BeChainTarget = 121,
    CreateRelation = 122,
    ReleaseRelation = 123,
    TossCoin = 130,
    TossDice = 131,
    RockPaperScissors = 132,
    HandResult = 133,
    AnnounceRace = 140,
    AnnounceAttrib = 141,
    AnnounceCard = 142,
    AnnounceNumber = 143,
    CardHint = 160,
    TagSwap = 161,
    ReloadField = 162,
    AiName = 163,
    ShowHint = 164,
    PlayerHint = 165,
    MatchKill = 170,
    CustomMsg = 180,
    DuelWinner = 200,
}

impl GameMessage {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(GameMessage::Retry),
            2 => Some(GameMessage::Hint),
            3 => Some(GameMessage::Waiting),
            4 => Some(GameMessage::Start),
            5 => Some(GameMessage::Win),
            6 => Some(GameMessage::UpdateData),
            7 => Some(GameMessage::UpdateCard),
            8 => Some(GameMessage::RequestDeck),
            10 => Some(GameMessage::SelectBattleCmd),
            11 => Some(GameMessage::SelectIdleCmd),
            12 => Some(GameMessage::SelectEffectYn),
            13 => Some(GameMessage::SelectYesNo),
            14 => Some(GameMessage::SelectOption),
            15 => Some(GameMessage::SelectCard),
            16 => Some(GameMessage::SelectChain),
            18 => Some(GameMessage::SelectPlace),
            19 => Some(GameMessage::SelectPosition),
            20 => Some(GameMessage::SelectTribute),
            21 => Some(GameMessage::SortChain),
            22 => Some(GameMessage::SelectCounter),
            23 => Some(GameMessage::SelectSum),
            24 => Some(GameMessage::SelectDisfield),
            25 => Some(GameMessage::SortCard),
            26 => Some(GameMessage::SelectUnselect),
            30 => Some(GameMessage::ConfirmDecktop),
            31 => Some(GameMessage::ConfirmCards),
            32 => Some(GameMessage::ShuffleDeck),
            33 => Some(GameMessage::ShuffleHand),
            34 => Some(GameMessage::RefreshDeck),
            35 => Some(GameMessage::SwapGraveDeck),
            36 => Some(GameMessage::ShuffleSetCard),
            37 => Some(GameMessage::ReverseDeck),
            38 => Some(GameMessage::DeckTop),
            39 => Some(GameMessage::ShuffleExtra),
            40 => Some(GameMessage::NewTurn),
            41 => Some(GameMessage::NewPhase),
            42 => Some(GameMessage::ConfirmExtratop),
            50 => Some(GameMessage::Move),
            53 => Some(GameMessage::PosChange),
            54 => Some(GameMessage::Set),
            55 => Some(GameMessage::Swap),
            56 => Some(GameMessage::FieldDisabled),
            60 => Some(GameMessage::Summoning),
            61 => Some(GameMessage::Summoned),
            62 => Some(GameMessage::SpSummoning),
            63 => Some(GameMessage::SpSummoned),
            64 => Some(GameMessage::FlipSummoning),
            65 => Some(GameMessage::FlipSummoned),
            70 => Some(GameMessage::Chaining),
            71 => Some(GameMessage::Chained),
            72 => Some(GameMessage::ChainSolving),
            73 => Some(GameMessage::ChainSolved),
            74 => Some(GameMessage::ChainEnd),
            75 => Some(GameMessage::ChainNegated),
            76 => Some(GameMessage::ChainDisabled),
            80 => Some(GameMessage::CardSelected),
            81 => Some(GameMessage::RandomSelected),
            83 => Some(GameMessage::BecomeTarget),
            90 => Some(GameMessage::Draw),
            91 => Some(GameMessage::Damage),
            92 => Some(GameMessage::Recover),
            93 => Some(GameMessage::Equip),
            94 => Some(GameMessage::LpUpdate),
            95 => Some(GameMessage::Unequip),
            96 => Some(GameMessage::CardTarget),
            97 => Some(GameMessage::CancelTarget),
            100 => Some(GameMessage::PayLpCost),
            101 => Some(GameMessage::AddCounter),
            102 => Some(GameMessage::RemoveCounter),
            110 => Some(GameMessage::Attack),
            111 => Some(GameMessage::Battle),
            112 => Some(GameMessage::AttackDisabled),
            113 => Some(GameMessage::DamageStepStart),
            114 => Some(GameMessage::DamageStepEnd),
            120 => Some(GameMessage::MissedEffect),
            121 => Some(GameMessage::BeChainTarget),
            122 => Some(GameMessage::CreateRelation),
            123 => Some(GameMessage::ReleaseRelation),
            130 => Some(GameMessage::TossCoin),
            131 => Some(GameMessage::TossDice),
            132 => Some(GameMessage::RockPaperScissors),
            133 => Some(GameMessage::HandResult),
            140 => Some(GameMessage::AnnounceRace),
            141 => Some(GameMessage::AnnounceAttrib),
            142 => Some(GameMessage::AnnounceCard),
            143 => Some(GameMessage::AnnounceNumber),
            160 => Some(GameMessage::CardHint),
            161 => Some(GameMessage::TagSwap),
            162 => Some(GameMessage::ReloadField),
            163 => Some(GameMessage::AiName),
            164 => Some(GameMessage::ShowHint),
            165 => Some(GameMessage::PlayerHint),
            170 => Some(GameMessage::MatchKill),
            180 => Some(GameMessage::CustomMsg),
            200 => Some(GameMessage::DuelWinner),
            _ => None,
        }
    }
}

/// Server error notification kinds (all unrecoverable at this layer).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Join = 1,
    Deck = 2,
    Side = 3,
    Version = 4,
    Version2 = 5,
}

impl ErrorKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(ErrorKind::Join),
            2 => Some(ErrorKind::Deck),
            3 => Some(ErrorKind::Side),
            4 => Some(ErrorKind::Version),
            5 => Some(ErrorKind::Version2),
            _ => None,
        }
    }
}
