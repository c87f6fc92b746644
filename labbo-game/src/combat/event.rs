use crate::boss::{EnemyTag, SkillId};
use crate::cards::CardId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Boss rewards never offer more than a card and a max HP boost.
pub type RewardOptions = SmallVec<[RewardOption; 2]>;

/// One of the two choices offered after a boss falls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardOption {
    Card(CardId),
    MaxHpBoost(i32),
}

impl fmt::Display for RewardOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(id) => write!(f, "card {id}"),
            Self::MaxHpBoost(amount) => write!(f, "+{amount} max HP and full heal"),
        }
    }
}

/// Append-only battle log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    BattleStarted {
        enemy: EnemyTag,
        enemy_hp: i32,
        player_hp: i32,
    },
    PlayerAttacked {
        card: CardId,
        dealt: i32,
        enemy_hp: i32,
    },
    ShieldGained {
        amount: i32,
        total: i32,
    },
    PlayerHealed {
        amount: i32,
        hp: i32,
    },
    BurnCured,
    TurnSkipped,
    SupportCalled,
    InstantKill,
    SkillTelegraphed {
        skill: SkillId,
        damage: i32,
    },
    SkillCountered {
        card: CardId,
        skill: SkillId,
    },
    CounterDamage {
        dealt: i32,
        enemy_hp: i32,
    },
    Reflected {
        dealt: i32,
        enemy_hp: i32,
    },
    CounterMissed {
        card: Option<CardId>,
        skill: SkillId,
    },
    SkillLanded {
        skill: SkillId,
        raw: i32,
        taken: i32,
        hp: i32,
    },
    EnemyAttacked {
        raw: i32,
        taken: i32,
        absorbed: i32,
        equipment_saved: i32,
        hp: i32,
    },
    BurnApplied {
        turns: u8,
    },
    BurnTick {
        damage: i32,
        remaining: u8,
        hp: i32,
    },
    BurnExpired,
    EnemyDefeated {
        enemy: EnemyTag,
    },
    PlayerDefeated,
    RewardOffered {
        options: RewardOptions,
    },
    RewardChosen {
        option: RewardOption,
    },
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BattleStarted {
                enemy,
                enemy_hp,
                player_hp,
            } => write!(f, "{enemy} appears with {enemy_hp} HP (you: {player_hp} HP)"),
            Self::PlayerAttacked {
                card,
                dealt,
                enemy_hp,
            } => write!(f, "{card} deals {dealt} damage, enemy at {enemy_hp}"),
            Self::ShieldGained { amount, total } => {
                write!(f, "gained {amount} shield ({total} total)")
            }
            Self::PlayerHealed { amount, hp } => write!(f, "healed {amount} HP, now {hp}"),
            Self::BurnCured => f.write_str("burn cured"),
            Self::TurnSkipped => f.write_str("turn skipped"),
            Self::SupportCalled => f.write_str("support called, no-backup surcharge lifted"),
            Self::InstantKill => f.write_str("instant kill"),
            Self::SkillTelegraphed { skill, damage } => {
                write!(f, "{skill} incoming for {damage}, choose a response")
            }
            Self::SkillCountered { card, skill } => write!(f, "{card} counters {skill}"),
            Self::CounterDamage { dealt, enemy_hp } => {
                write!(f, "counter bonus deals {dealt} damage, enemy at {enemy_hp}")
            }
            Self::Reflected { dealt, enemy_hp } => {
                write!(f, "reflected {dealt} damage, enemy at {enemy_hp}")
            }
            Self::CounterMissed { card, skill } => match card {
                Some(card) => write!(f, "{card} cannot counter {skill}"),
                None => write!(f, "no counter against {skill}"),
            },
            Self::SkillLanded {
                skill,
                raw,
                taken,
                hp,
            } => write!(f, "{skill} hits for {raw}, took {taken}, now {hp} HP"),
            Self::EnemyAttacked {
                raw,
                taken,
                absorbed,
                equipment_saved,
                hp,
            } => write!(
                f,
                "enemy attacks for {raw}: blocked {absorbed}, equipment saved {equipment_saved}, took {taken}, now {hp} HP"
            ),
            Self::BurnApplied { turns } => write!(f, "burning for {turns} turns"),
            Self::BurnTick {
                damage,
                remaining,
                hp,
            } => write!(f, "burn deals {damage} ({remaining} left), now {hp} HP"),
            Self::BurnExpired => f.write_str("burn wore off"),
            Self::EnemyDefeated { enemy } => write!(f, "{enemy} defeated"),
            Self::PlayerDefeated => f.write_str("you were defeated"),
            Self::RewardOffered { options } => {
                let listed: Vec<String> = options.iter().map(ToString::to_string).collect();
                write!(f, "choose a reward: {}", listed.join(" or "))
            }
            Self::RewardChosen { option } => write!(f, "took {option}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = BattleEvent::SkillTelegraphed {
            skill: SkillId::ChemicalFire,
            damage: 9,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "skill_telegraphed");
        assert_eq!(json["skill"], "chemical_fire");
        assert_eq!(event.to_string(), "CHEMICAL FIRE incoming for 9, choose a response");
    }

    #[test]
    fn reward_offer_lists_both_options() {
        let event = BattleEvent::RewardOffered {
            options: smallvec::smallvec![
                RewardOption::Card(CardId::from("boss_fire")),
                RewardOption::MaxHpBoost(10),
            ],
        };
        assert_eq!(
            event.to_string(),
            "choose a reward: card boss_fire or +10 max HP and full heal"
        );
    }
}
