//! Enemy tables: identities, stat profiles and telegraphed skills.
use crate::constants::{
    BOSS_BURN_CHANCE, CHEMICAL_FIRE_DAMAGE, DEBRIS_ACCUMULATION_DAMAGE, ELECTRICAL_FIRE_DAMAGE,
    FINAL_SKILL_SCALE, FINAL_TELEGRAPH_CHANCE, FIRE_TELEGRAPH_CHANCE, ORDINARY_BURN_CHANCE,
    ORDINARY_DAMAGE_MAX, ORDINARY_DAMAGE_MIN, ORDINARY_DAMAGE_PER_REGION, ORDINARY_FIRE_REGION,
    ORDINARY_HP_BASE, ORDINARY_HP_PER_REGION,
};
use crate::numbers::{scale_ceil, scale_floor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enemy identity. Every boss maps to exactly one badge and one reward card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTag {
    Ordinary,
    Fire,
    Flood,
    Elec,
    Sharp,
    Acid,
    Nuclear,
    Final,
}

impl EnemyTag {
    /// All boss tags in story order.
    pub const BOSSES: [Self; 7] = [
        Self::Fire,
        Self::Flood,
        Self::Elec,
        Self::Sharp,
        Self::Acid,
        Self::Nuclear,
        Self::Final,
    ];

    #[must_use]
    pub const fn is_boss(self) -> bool {
        !matches!(self, Self::Ordinary)
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ordinary => "MONSTER",
            Self::Fire => "FIRE MONSTER",
            Self::Flood => "WATER ELEMENTAL",
            Self::Elec => "ELECTRIC BEAST",
            Self::Sharp => "BLADE DEMON",
            Self::Acid => "ACID SLIME",
            Self::Nuclear => "NUCLEAR HORROR",
            Self::Final => "FINAL BOSS",
        }
    }

    /// Name of the badge earned by defeating this enemy, if any.
    #[must_use]
    pub const fn badge_name(self) -> Option<&'static str> {
        match self {
            Self::Ordinary => None,
            Self::Fire => Some("FIRE MASTER"),
            Self::Flood => Some("FLOOD WALKER"),
            Self::Elec => Some("ELECTRIC CHAMPION"),
            Self::Sharp => Some("BLADE DANCER"),
            Self::Acid => Some("ACID SURVIVOR"),
            Self::Nuclear => Some("RADIATION PROOF"),
            Self::Final => Some("REALM CONQUEROR"),
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Fire => "fire",
            Self::Flood => "flood",
            Self::Elec => "elec",
            Self::Sharp => "sharp",
            Self::Acid => "acid",
            Self::Nuclear => "nuclear",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for EnemyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Named skills a boss can telegraph before unleashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    ElectricalFire,
    ChemicalFire,
    DebrisAccumulation,
}

impl SkillId {
    pub const ALL: [Self; 3] = [
        Self::ElectricalFire,
        Self::ChemicalFire,
        Self::DebrisAccumulation,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ElectricalFire => "ELECTRICAL FIRE",
            Self::ChemicalFire => "CHEMICAL FIRE",
            Self::DebrisAccumulation => "DEBRIS ACCUMULATION",
        }
    }

    #[must_use]
    pub const fn base_damage(self) -> i32 {
        match self {
            Self::ElectricalFire => ELECTRICAL_FIRE_DAMAGE,
            Self::ChemicalFire => CHEMICAL_FIRE_DAMAGE,
            Self::DebrisAccumulation => DEBRIS_ACCUMULATION_DAMAGE,
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A skill announced one turn before it lands, with its tier-scaled damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegraphedSkill {
    pub skill: SkillId,
    pub damage: i32,
}

/// Resolved combat stats for one enemy in one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub tag: EnemyTag,
    pub max_hp: i32,
    /// Multiplier applied to all player damage dealt to this enemy.
    pub mitigation: f64,
    pub damage_min: i32,
    pub damage_max: i32,
    pub telegraph_chance: f64,
    pub burn_chance: f64,
}

impl EnemyProfile {
    /// Build the profile for `tag` fought in `region` (1-based).
    ///
    /// `boss_mitigation_override` replaces the boss mitigation table when the
    /// debug challenge mode is active. Ordinary enemies are never mitigated.
    #[must_use]
    pub fn for_enemy(tag: EnemyTag, region: u8, boss_mitigation_override: Option<f64>) -> Self {
        let (max_hp, mitigation, damage_min, damage_max) = match tag {
            EnemyTag::Ordinary => {
                let region_i = i32::from(region);
                let bump = scale_floor(region_i, ORDINARY_DAMAGE_PER_REGION);
                (
                    ORDINARY_HP_BASE + ORDINARY_HP_PER_REGION * region_i,
                    1.0,
                    ORDINARY_DAMAGE_MIN + bump,
                    ORDINARY_DAMAGE_MAX + bump,
                )
            }
            EnemyTag::Fire => (80, 0.7, 6, 9),
            EnemyTag::Flood => (90, 0.7, 6, 9),
            EnemyTag::Elec => (100, 0.65, 7, 10),
            EnemyTag::Sharp => (110, 0.65, 7, 10),
            EnemyTag::Acid => (120, 0.6, 8, 11),
            EnemyTag::Nuclear => (130, 0.6, 8, 11),
            EnemyTag::Final => (150, 0.5, 12, 16),
        };
        let mitigation = match boss_mitigation_override {
            Some(value) if tag.is_boss() => value,
            _ => mitigation,
        };
        let telegraph_chance = match tag {
            EnemyTag::Fire => FIRE_TELEGRAPH_CHANCE,
            EnemyTag::Final => FINAL_TELEGRAPH_CHANCE,
            _ => 0.0,
        };
        let burn_chance = match tag {
            EnemyTag::Fire | EnemyTag::Final => BOSS_BURN_CHANCE,
            EnemyTag::Ordinary if region == ORDINARY_FIRE_REGION => ORDINARY_BURN_CHANCE,
            _ => 0.0,
        };
        Self {
            tag,
            max_hp,
            mitigation,
            damage_min,
            damage_max,
            telegraph_chance,
            burn_chance,
        }
    }

    /// Damage the player's `power` deals after this enemy's mitigation.
    #[must_use]
    pub fn mitigate(&self, power: i32) -> i32 {
        scale_floor(power, self.mitigation).max(0)
    }

    /// Skill as this enemy would unleash it. The final boss hits 50% harder.
    #[must_use]
    pub fn telegraph(&self, skill: SkillId) -> TelegraphedSkill {
        let damage = if self.tag == EnemyTag::Final {
            scale_ceil(skill.base_damage(), FINAL_SKILL_SCALE)
        } else {
            skill.base_damage()
        };
        TelegraphedSkill { skill, damage }
    }

    #[must_use]
    pub fn can_burn(&self) -> bool {
        self.burn_chance > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_table_matches_story_order() {
        let hps: Vec<i32> = EnemyTag::BOSSES
            .iter()
            .map(|tag| EnemyProfile::for_enemy(*tag, 1, None).max_hp)
            .collect();
        assert_eq!(hps, vec![80, 90, 100, 110, 120, 130, 150]);
    }

    #[test]
    fn ordinary_enemy_scales_with_region() {
        let first = EnemyProfile::for_enemy(EnemyTag::Ordinary, 1, None);
        assert_eq!(first.max_hp, 30);
        assert_eq!((first.damage_min, first.damage_max), (5, 7));
        assert!((first.burn_chance - 0.3).abs() < f64::EPSILON);

        let third = EnemyProfile::for_enemy(EnemyTag::Ordinary, 3, None);
        assert_eq!(third.max_hp, 50);
        assert_eq!((third.damage_min, third.damage_max), (8, 10));
        assert!(!third.can_burn());
        assert!((third.mitigation - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn debug_override_only_touches_bosses() {
        let boss = EnemyProfile::for_enemy(EnemyTag::Final, 4, Some(0.85));
        assert!((boss.mitigation - 0.85).abs() < f64::EPSILON);
        let grunt = EnemyProfile::for_enemy(EnemyTag::Ordinary, 4, Some(0.85));
        assert!((grunt.mitigation - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn final_boss_scales_skills_up() {
        let fire = EnemyProfile::for_enemy(EnemyTag::Fire, 1, None);
        let last = EnemyProfile::for_enemy(EnemyTag::Final, 4, None);
        let scaled: Vec<i32> = SkillId::ALL
            .iter()
            .map(|skill| last.telegraph(*skill).damage)
            .collect();
        assert_eq!(scaled, vec![12, 14, 15]);
        assert_eq!(fire.telegraph(SkillId::ChemicalFire).damage, 9);
        assert!((last.telegraph_chance - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn mitigation_floors_player_damage() {
        let fire = EnemyProfile::for_enemy(EnemyTag::Fire, 1, None);
        assert_eq!(fire.mitigate(10), 7);
        let elec = EnemyProfile::for_enemy(EnemyTag::Elec, 2, None);
        assert_eq!(elec.mitigate(10), 6);
    }
}
