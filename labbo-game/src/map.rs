//! Board topology: the main path, its branch spurs, region banding and access rules.
use crate::boss::EnemyTag;
use crate::constants::{
    EXPLORE_TILES, FINAL_TILE, REGION_BANDS, SPECIAL_TILE_STRIDE, START_TILE,
};
use crate::state::ProgressionState;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TileId = u32;

/// What happens when a tile is entered through normal routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileActivity {
    /// Start, special, final and branch-terminal tiles. Boss tiles among them
    /// are still forced encounters.
    None,
    Battle,
    Explore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    BlazingForest,
    ElectricWasteland,
    AcidSwamp,
    AstralRealm,
}

impl Region {
    pub const ALL: [Self; 4] = [
        Self::BlazingForest,
        Self::ElectricWasteland,
        Self::AcidSwamp,
        Self::AstralRealm,
    ];

    /// 1-based region number used for ordinary enemy scaling.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::BlazingForest => 1,
            Self::ElectricWasteland => 2,
            Self::AcidSwamp => 3,
            Self::AstralRealm => 4,
        }
    }

    const fn band(self) -> (&'static str, TileId, TileId) {
        REGION_BANDS[self.number() as usize - 1]
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.band().0
    }

    #[must_use]
    pub const fn first_tile(self) -> TileId {
        self.band().1
    }

    #[must_use]
    pub const fn last_tile(self) -> TileId {
        self.band().2
    }

    fn containing(tile: TileId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|region| (region.first_tile()..=region.last_tile()).contains(&tile))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cosmetic side of the board a branch is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// An optional spur off the main path ending in its own boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub origin: TileId,
    pub direction: Direction,
    pub tiles: Vec<TileId>,
}

impl Branch {
    #[must_use]
    pub fn first(&self) -> Option<TileId> {
        self.tiles.first().copied()
    }

    #[must_use]
    pub fn terminal(&self) -> Option<TileId> {
        self.tiles.last().copied()
    }

    #[must_use]
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    fn index_of(&self, tile: TileId) -> Option<usize> {
        self.tiles.iter().position(|candidate| *candidate == tile)
    }
}

/// Which path a tile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TilePath {
    Main,
    Branch { origin: TileId },
}

/// Static description of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub path: TilePath,
    pub activity: TileActivity,
    pub region: Region,
    pub enemy: Option<EnemyTag>,
}

/// Immutable board graph. Built once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGraph {
    final_tile: TileId,
    branches: Vec<Branch>,
}

impl Default for MapGraph {
    fn default() -> Self {
        Self {
            final_tile: FINAL_TILE,
            branches: vec![
                Branch {
                    origin: 3,
                    direction: Direction::Up,
                    tiles: vec![18, 19],
                },
                Branch {
                    origin: 7,
                    direction: Direction::Down,
                    tiles: vec![20, 21, 22],
                },
                Branch {
                    origin: 11,
                    direction: Direction::Up,
                    tiles: vec![23, 25, 26, 24],
                },
            ],
        }
    }
}

impl MapGraph {
    #[must_use]
    pub const fn start_tile(&self) -> TileId {
        START_TILE
    }

    #[must_use]
    pub const fn final_tile(&self) -> TileId {
        self.final_tile
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[must_use]
    pub const fn is_main(&self, tile: TileId) -> bool {
        tile >= START_TILE && tile <= self.final_tile
    }

    #[must_use]
    pub fn contains(&self, tile: TileId) -> bool {
        self.is_main(tile) || self.branch_of(tile).is_some()
    }

    /// The branch containing `tile`, if it is a branch tile.
    #[must_use]
    pub fn branch_of(&self, tile: TileId) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.contains(tile))
    }

    /// The branch forking off main-path tile `tile`, if any.
    #[must_use]
    pub fn branch_at_origin(&self, tile: TileId) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.origin == tile)
    }

    #[must_use]
    pub fn is_branch_terminal(&self, tile: TileId) -> bool {
        self.branches
            .iter()
            .any(|branch| branch.terminal() == Some(tile))
    }

    /// Every fourth main-path tile after the start, excluding the final tile.
    #[must_use]
    pub const fn is_special(&self, tile: TileId) -> bool {
        tile > START_TILE
            && tile < self.final_tile
            && (tile - START_TILE) % SPECIAL_TILE_STRIDE == 0
    }

    /// Tiles that always launch a boss battle regardless of activity.
    #[must_use]
    pub fn is_forced_boss(&self, tile: TileId) -> bool {
        self.is_special(tile) || tile == self.final_tile || self.is_branch_terminal(tile)
    }

    #[must_use]
    pub fn tile_activity(&self, tile: TileId) -> TileActivity {
        if !self.contains(tile)
            || tile == START_TILE
            || tile == self.final_tile
            || self.is_special(tile)
            || self.is_branch_terminal(tile)
        {
            return TileActivity::None;
        }
        if EXPLORE_TILES.contains(&tile) {
            TileActivity::Explore
        } else {
            TileActivity::Battle
        }
    }

    /// Region of `tile`. Branch tiles inherit their origin's region.
    #[must_use]
    pub fn region_of(&self, tile: TileId) -> Option<Region> {
        if self.is_main(tile) {
            return Region::containing(tile);
        }
        self.branch_of(tile)
            .and_then(|branch| Region::containing(branch.origin))
    }

    #[must_use]
    pub fn enemy_for(&self, tile: TileId) -> EnemyTag {
        match tile {
            5 => EnemyTag::Fire,
            9 => EnemyTag::Elec,
            13 => EnemyTag::Acid,
            19 => EnemyTag::Flood,
            22 => EnemyTag::Sharp,
            24 => EnemyTag::Nuclear,
            t if t == self.final_tile => EnemyTag::Final,
            _ => EnemyTag::Ordinary,
        }
    }

    /// Whether the player described by `state` may enter `tile` now.
    #[must_use]
    pub fn can_access(&self, tile: TileId, state: &ProgressionState) -> bool {
        if !self.contains(tile) || state.completed_tiles.contains(&tile) {
            return false;
        }
        if tile == state.current_position {
            return true;
        }
        if self.is_main(tile) {
            return !state.on_branch && tile == state.current_position + 1;
        }
        let Some(branch) = self.branch_of(tile) else {
            return false;
        };
        if state.on_branch {
            let Some(target) = branch.index_of(tile) else {
                return false;
            };
            return match branch.index_of(state.current_position) {
                Some(current) => target == current + 1,
                None => false,
            };
        }
        state.current_position == branch.origin && branch.first() == Some(tile)
    }

    /// Static description of every tile, main path first.
    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        let main = (START_TILE..=self.final_tile).map(|id| (id, TilePath::Main));
        let spurs = self.branches.iter().flat_map(|branch| {
            branch.tiles.iter().map(|id| {
                (
                    *id,
                    TilePath::Branch {
                        origin: branch.origin,
                    },
                )
            })
        });
        main.chain(spurs)
            .filter_map(|(id, path)| {
                let region = self.region_of(id)?;
                let activity = self.tile_activity(id);
                let enemy = (activity == TileActivity::Battle || self.is_forced_boss(id))
                    .then(|| self.enemy_for(id));
                Some(Tile {
                    id,
                    path,
                    activity,
                    region,
                    enemy,
                })
            })
            .collect()
    }
}
