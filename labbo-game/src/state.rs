use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::boss::EnemyTag;
use crate::cards::CardId;
use crate::constants::{LOG_JOURNAL_CAP, START_TILE};
use crate::map::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Head,
    Body,
    Hands,
}

impl EquipmentSlot {
    pub const ALL: [Self; 3] = [Self::Head, Self::Body, Self::Hands];
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Head => "head",
            Self::Body => "body",
            Self::Hands => "hands",
        })
    }
}

/// Protective gear. Each piece fits exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gear {
    Goggles,
    Mask,
    GasMask,
    LabCoat,
    Armor,
    Gloves,
    Gauntlets,
}

impl Gear {
    pub const ALL: [Self; 7] = [
        Self::Goggles,
        Self::Mask,
        Self::GasMask,
        Self::LabCoat,
        Self::Armor,
        Self::Gloves,
        Self::Gauntlets,
    ];

    #[must_use]
    pub const fn slot(self) -> EquipmentSlot {
        match self {
            Self::Goggles | Self::Mask | Self::GasMask => EquipmentSlot::Head,
            Self::LabCoat | Self::Armor => EquipmentSlot::Body,
            Self::Gloves | Self::Gauntlets => EquipmentSlot::Hands,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Goggles => "goggles",
            Self::Mask => "mask",
            Self::GasMask => "gasmask",
            Self::LabCoat => "labcoat",
            Self::Armor => "armor",
            Self::Gloves => "gloves",
            Self::Gauntlets => "gauntlets",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Goggles => "Protective Goggles",
            Self::Mask => "Face Mask",
            Self::GasMask => "Gas Mask",
            Self::LabCoat => "Lab Coat",
            Self::Armor => "Battle Armor",
            Self::Gloves => "Rubber Gloves",
            Self::Gauntlets => "Steel Gauntlets",
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Gear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gear| gear.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown gear `{s}`"))
    }
}

/// Three independently nullable gear slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub head: Option<Gear>,
    pub body: Option<Gear>,
    pub hands: Option<Gear>,
}

impl Equipment {
    /// Every slot filled with its first catalog piece.
    #[must_use]
    pub const fn full_set() -> Self {
        Self {
            head: Some(Gear::Goggles),
            body: Some(Gear::LabCoat),
            hands: Some(Gear::Gloves),
        }
    }

    #[must_use]
    pub const fn get(&self, slot: EquipmentSlot) -> Option<Gear> {
        match slot {
            EquipmentSlot::Head => self.head,
            EquipmentSlot::Body => self.body,
            EquipmentSlot::Hands => self.hands,
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Gear> {
        match slot {
            EquipmentSlot::Head => &mut self.head,
            EquipmentSlot::Body => &mut self.body,
            EquipmentSlot::Hands => &mut self.hands,
        }
    }

    /// Put `gear` in its slot, returning whatever it replaced.
    pub fn equip(&mut self, gear: Gear) -> Option<Gear> {
        self.slot_mut(gear.slot()).replace(gear)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Gear> {
        self.slot_mut(slot).take()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.head.is_some() && self.body.is_some() && self.hands.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Active,
    Won,
    GameOver,
}

impl RunStatus {
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Bookkeeping for the encounter currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSnapshot {
    pub tile: TileId,
    pub battle_start_hp: i32,
    /// This encounter is the step onto a branch's first tile.
    pub entered_branch: bool,
}

/// Cross-encounter progression. Mutated only through [`crate::ledger::ProgressionLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub current_position: TileId,
    pub previous_position: TileId,
    pub completed_tiles: BTreeSet<TileId>,
    pub on_branch: bool,
    pub branch_return_tile: Option<TileId>,
    pub max_hp: i32,
    pub current_hp: i32,
    pub badges: BTreeSet<EnemyTag>,
    pub owned_cards: BTreeSet<CardId>,
    pub explorable_pool: Vec<CardId>,
    pub equipment: Equipment,
    pub healing_available: bool,
    pub death_count: u8,
    pub run_status: RunStatus,
    pub dev_mode: bool,
    pub encounter: Option<EncounterSnapshot>,
    /// Most recent lifecycle log keys, oldest first.
    #[serde(default)]
    pub logs: VecDeque<String>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            current_position: START_TILE,
            previous_position: START_TILE,
            completed_tiles: BTreeSet::from([START_TILE]),
            on_branch: false,
            branch_return_tile: None,
            max_hp: 50,
            current_hp: 50,
            badges: BTreeSet::new(),
            owned_cards: BTreeSet::new(),
            explorable_pool: Vec::new(),
            equipment: Equipment::default(),
            healing_available: true,
            death_count: 0,
            run_status: RunStatus::Active,
            dev_mode: false,
            encounter: None,
            logs: VecDeque::new(),
        }
    }
}

impl ProgressionState {
    /// Append a log key, dropping the oldest past [`LOG_JOURNAL_CAP`].
    pub(crate) fn push_log(&mut self, entry: impl Into<String>) {
        if self.logs.len() == LOG_JOURNAL_CAP {
            self.logs.pop_front();
        }
        self.logs.push_back(entry.into());
    }

    /// The latest `n` log keys, oldest first.
    #[must_use]
    pub fn recent_logs(&self, n: usize) -> Vec<&str> {
        let skip = self.logs.len().saturating_sub(n);
        self.logs.iter().skip(skip).map(String::as_str).collect()
    }

    #[must_use]
    pub const fn is_fully_equipped(&self) -> bool {
        self.equipment.is_complete()
    }

    #[must_use]
    pub fn owns(&self, card: &CardId) -> bool {
        self.owned_cards.contains(card)
    }

    #[must_use]
    pub const fn battle_start_hp(&self) -> Option<i32> {
        match self.encounter {
            Some(snapshot) => Some(snapshot.battle_start_hp),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.run_status.is_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gear_lands_in_its_own_slot() {
        let mut equipment = Equipment::default();
        assert_eq!(equipment.equip(Gear::Mask), None);
        assert_eq!(equipment.equip(Gear::GasMask), Some(Gear::Mask));
        assert_eq!(equipment.get(EquipmentSlot::Head), Some(Gear::GasMask));
        assert!(!equipment.is_complete());
        equipment.equip(Gear::Armor);
        equipment.equip(Gear::Gauntlets);
        assert!(equipment.is_complete());
        assert_eq!(equipment.unequip(EquipmentSlot::Body), Some(Gear::Armor));
        assert!(!equipment.is_complete());
    }

    #[test]
    fn gear_parses_from_keys() {
        assert_eq!("gasmask".parse::<Gear>(), Ok(Gear::GasMask));
        assert_eq!(" LabCoat ".parse::<Gear>(), Ok(Gear::LabCoat));
        assert!("helmet".parse::<Gear>().is_err());
        let json = serde_json::to_string(&Gear::LabCoat).unwrap();
        assert_eq!(json, "\"labcoat\"");
    }

    #[test]
    fn fresh_state_starts_on_tile_one() {
        let state = ProgressionState::default();
        assert_eq!(state.current_position, 1);
        assert!(state.completed_tiles.contains(&1));
        assert_eq!(state.current_hp, state.max_hp);
        assert!(state.healing_available);
        assert!(!state.is_over());
        assert_eq!(state.battle_start_hp(), None);
    }
}
