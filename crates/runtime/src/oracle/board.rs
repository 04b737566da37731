//! Hexagonal board served through [`terra_core::BoardService`].
//!
//! Hexes use axial coordinates and are identified as `"q,r"`. The layout is
//! fixed when the board is built; only the placed tiles change during a game.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use terra_core::state::PlacementResult;
use terra_core::{
    BoardService, HexId, PlacementBonus, PlayerId, ResourceKind, RulesError, TileKind,
};

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Steps from the board centre.
    pub const fn distance_from_origin(&self) -> i32 {
        let s = -self.q - self.r;
        let (q, r) = (self.q.abs(), self.r.abs());
        let s = s.abs();
        if q >= r && q >= s {
            q
        } else if r >= s {
            r
        } else {
            s
        }
    }

    pub fn neighbors(self) -> impl Iterator<Item = Hex> {
        Self::DIRECTIONS
            .into_iter()
            .map(move |(dq, dr)| Hex::new(self.q + dq, self.r + dr))
    }

    pub fn id(&self) -> HexId {
        HexId::new(format!("{},{}", self.q, self.r))
    }

    pub fn parse(id: &HexId) -> Option<Self> {
        let (q, r) = id.as_str().split_once(',')?;
        Some(Self::new(q.trim().parse().ok()?, r.trim().parse().ok()?))
    }
}

#[derive(Clone, Debug, Default)]
struct Cell {
    ocean_reserved: bool,
    bonuses: Vec<PlacementBonus>,
}

#[derive(Clone, Debug)]
struct PlacedTile {
    kind: TileKind,
    /// Oceans belong to nobody.
    owner: Option<PlayerId>,
}

/// Board with placement rules:
/// - oceans only on reserved hexes
/// - greeneries next to the owner's tiles when such a hex is free
/// - cities never next to another city
pub struct HexBoard {
    cells: BTreeMap<Hex, Cell>,
    tiles: Mutex<BTreeMap<Hex, PlacedTile>>,
}

impl HexBoard {
    /// An empty hexagon of `radius` rings around the centre.
    pub fn new(radius: i32) -> Self {
        let mut cells = BTreeMap::new();
        for q in -radius..=radius {
            for r in -radius..=radius {
                let hex = Hex::new(q, r);
                if hex.distance_from_origin() <= radius {
                    cells.insert(hex, Cell::default());
                }
            }
        }
        Self {
            cells,
            tiles: Mutex::new(BTreeMap::new()),
        }
    }

    /// Radius 4 (61 hexes) with twelve ocean hexes and a spread of bonuses.
    pub fn standard() -> Self {
        let oceans = [
            (-4, 0),
            (-3, 0),
            (-2, 0),
            (0, -4),
            (1, -4),
            (4, -4),
            (4, -3),
            (2, 0),
            (3, 0),
            (0, 3),
            (-1, 4),
            (0, 4),
        ];
        let plants = PlacementBonus::Resource {
            kind: ResourceKind::Plants,
            amount: 2,
        };
        let steel = PlacementBonus::Resource {
            kind: ResourceKind::Steel,
            amount: 2,
        };
        let titanium = PlacementBonus::Resource {
            kind: ResourceKind::Titanium,
            amount: 1,
        };
        let draw = PlacementBonus::CardDraw { count: 1 };

        let mut board = Self::new(4).with_oceans(oceans.map(|(q, r)| Hex::new(q, r)));
        for (q, r) in [(-2, 0), (-1, 0), (0, 0), (1, 0), (-3, 1), (-2, 1), (-1, 1)] {
            board = board.with_bonus(Hex::new(q, r), plants);
        }
        for (q, r) in [(2, -3), (3, -3), (-4, 2)] {
            board = board.with_bonus(Hex::new(q, r), steel);
        }
        for (q, r) in [(0, -3), (3, 1)] {
            board = board.with_bonus(Hex::new(q, r), titanium);
        }
        for (q, r) in [(1, 2), (-3, 3)] {
            board = board.with_bonus(Hex::new(q, r), draw);
        }
        board
    }

    /// Reserves hexes for oceans; hexes outside the board are ignored.
    pub fn with_oceans(mut self, hexes: impl IntoIterator<Item = Hex>) -> Self {
        for hex in hexes {
            if let Some(cell) = self.cells.get_mut(&hex) {
                cell.ocean_reserved = true;
            }
        }
        self
    }

    pub fn with_bonus(mut self, hex: Hex, bonus: PlacementBonus) -> Self {
        if let Some(cell) = self.cells.get_mut(&hex) {
            cell.bonuses.push(bonus);
        }
        self
    }

    pub fn hex_count(&self) -> usize {
        self.cells.len()
    }

    fn tiles(&self) -> MutexGuard<'_, BTreeMap<Hex, PlacedTile>> {
        self.tiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn legal_hexes(
        &self,
        tiles: &BTreeMap<Hex, PlacedTile>,
        tile: TileKind,
        player: &PlayerId,
    ) -> Vec<Hex> {
        let free = self
            .cells
            .iter()
            .filter(|(hex, _)| !tiles.contains_key(hex));

        match tile {
            TileKind::Ocean => free
                .filter(|(_, cell)| cell.ocean_reserved)
                .map(|(hex, _)| *hex)
                .collect(),
            TileKind::City => free
                .filter(|(hex, cell)| {
                    !cell.ocean_reserved
                        && !hex
                            .neighbors()
                            .any(|n| tiles.get(&n).is_some_and(|t| t.kind == TileKind::City))
                })
                .map(|(hex, _)| *hex)
                .collect(),
            TileKind::Greenery => {
                let land: Vec<Hex> = free
                    .filter(|(_, cell)| !cell.ocean_reserved)
                    .map(|(hex, _)| *hex)
                    .collect();
                let next_to_own: Vec<Hex> = land
                    .iter()
                    .copied()
                    .filter(|hex| {
                        hex.neighbors().any(|n| {
                            tiles
                                .get(&n)
                                .is_some_and(|t| t.owner.as_ref() == Some(player))
                        })
                    })
                    .collect();
                if next_to_own.is_empty() {
                    land
                } else {
                    next_to_own
                }
            }
        }
    }
}

impl Default for HexBoard {
    fn default() -> Self {
        Self::standard()
    }
}

impl BoardService for HexBoard {
    fn available_hexes(&self, tile: TileKind, player: &PlayerId) -> Vec<HexId> {
        let tiles = self.tiles();
        self.legal_hexes(&tiles, tile, player)
            .iter()
            .map(Hex::id)
            .collect()
    }

    fn place_tile(
        &self,
        tile: TileKind,
        hex: &HexId,
        player: &PlayerId,
    ) -> Result<PlacementResult, RulesError> {
        let target = Hex::parse(hex)
            .filter(|h| self.cells.contains_key(h))
            .ok_or_else(|| RulesError::invalid_target(format!("{hex} is not on the board")))?;

        let mut tiles = self.tiles();
        if !self.legal_hexes(&tiles, tile, player).contains(&target) {
            return Err(RulesError::invalid_target(format!(
                "{tile} cannot be placed on {hex}"
            )));
        }

        let adjacent_oceans = target
            .neighbors()
            .filter(|n| tiles.get(n).is_some_and(|t| t.kind == TileKind::Ocean))
            .count() as u32;
        let owner = (tile != TileKind::Ocean).then(|| player.clone());
        tiles.insert(target, PlacedTile { kind: tile, owner });

        let bonuses = self
            .cells
            .get(&target)
            .map(|cell| cell.bonuses.clone())
            .unwrap_or_default();
        Ok(PlacementResult {
            bonuses,
            adjacent_oceans,
        })
    }

    fn tile_count(&self, tile: TileKind, owner: Option<&PlayerId>) -> u32 {
        self.tiles()
            .values()
            .filter(|t| t.kind == tile && owner.is_none_or(|o| t.owner.as_ref() == Some(o)))
            .count() as u32
    }

    fn city_vp(&self, player: &PlayerId) -> i32 {
        let tiles = self.tiles();
        tiles
            .iter()
            .filter(|(_, t)| t.kind == TileKind::City && t.owner.as_ref() == Some(player))
            .map(|(hex, _)| {
                hex.neighbors()
                    .filter(|n| tiles.get(n).is_some_and(|t| t.kind == TileKind::Greenery))
                    .count() as i32
            })
            .sum()
    }
}
