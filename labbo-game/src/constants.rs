//! Centralized balance and topology constants for the Labbo Fantasy rules engine.
//!
//! Board layout and enemy tables are fixed at compile time so that changes to
//! them go through code review. Run-economy knobs that designers tune live in
//! [`crate::rules::RulesConfig`] instead.

// Board topology -----------------------------------------------------------
pub(crate) const START_TILE: u32 = 1;
pub(crate) const FINAL_TILE: u32 = 17;
pub(crate) const SPECIAL_TILE_STRIDE: u32 = 4;
pub(crate) const EQUIPMENT_GATE_TILE: u32 = 2;
pub(crate) const EXPLORE_TILES: [u32; 7] = [2, 4, 7, 12, 18, 21, 23];
pub(crate) const DEV_MODE_POSITION: u32 = FINAL_TILE - 1;

// Progression journal --------------------------------------------------------
pub const LOG_JOURNAL_CAP: usize = 32;

// Region banding (name, first tile, last tile) ------------------------------
pub(crate) const REGION_BANDS: [(&str, u32, u32); 4] = [
    ("BLAZING FOREST", 1, 5),
    ("ELECTRIC WASTELAND", 6, 9),
    ("ACID SWAMP", 10, 13),
    ("ASTRAL REALM", 14, 17),
];

// Ordinary enemy scaling ---------------------------------------------------
pub(crate) const ORDINARY_HP_BASE: i32 = 20;
pub(crate) const ORDINARY_HP_PER_REGION: i32 = 10;
pub(crate) const ORDINARY_DAMAGE_MIN: i32 = 4;
pub(crate) const ORDINARY_DAMAGE_MAX: i32 = 6;
pub(crate) const ORDINARY_DAMAGE_PER_REGION: f64 = 1.5;
pub(crate) const ORDINARY_FIRE_REGION: u8 = 1;
pub(crate) const ORDINARY_BURN_CHANCE: f64 = 0.3;

// Boss tuning --------------------------------------------------------------
pub(crate) const BOSS_BURN_CHANCE: f64 = 0.5;
pub(crate) const FIRE_TELEGRAPH_CHANCE: f64 = 0.5;
pub(crate) const FINAL_TELEGRAPH_CHANCE: f64 = 0.35;
pub(crate) const FINAL_SKILL_SCALE: f64 = 1.5;

// Telegraphed skills -------------------------------------------------------
pub(crate) const ELECTRICAL_FIRE_DAMAGE: i32 = 8;
pub(crate) const CHEMICAL_FIRE_DAMAGE: i32 = 9;
pub(crate) const DEBRIS_ACCUMULATION_DAMAGE: i32 = 10;
