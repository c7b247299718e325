//! Map Descriptor
//!
//! Immutable per-match map: dimensions, coordinate origin and static terrain.
//! Built once, validated on construction, then shared by `Arc` between the
//! live state and every snapshot taken from it.

use serde::{Serialize, Deserialize};

use crate::core::location::MapLocation;
use crate::error::StateError;

/// Largest accepted side length.
pub const MAX_MAP_SIDE: u32 = 1024;

/// Static terrain kind of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainTile {
    /// Traversable ground
    #[default]
    Land,
    /// Impassable to ground units; airborne units fly over it
    Void,
}

/// Wire shape of a map descriptor before validation.
///
/// Empty `terrain` means all land.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapDescriptor {
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    /// World coordinate of the top-left cell
    #[serde(default)]
    pub origin: MapLocation,
    /// Row-major terrain
    #[serde(default)]
    pub terrain: Vec<TerrainTile>,
}

/// Validated map descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MapDescriptor")]
pub struct GameMap {
    width: u32,
    height: u32,
    origin: MapLocation,
    /// Row-major, `width * height` cells
    terrain: Vec<TerrainTile>,
}

impl TryFrom<MapDescriptor> for GameMap {
    type Error = StateError;

    fn try_from(raw: MapDescriptor) -> Result<Self, Self::Error> {
        if raw.terrain.is_empty() {
            GameMap::open(raw.width, raw.height, raw.origin)
        } else {
            GameMap::new(raw.width, raw.height, raw.origin, raw.terrain)
        }
    }
}

impl GameMap {
    /// Build a map from explicit terrain (row-major).
    pub fn new(
        width: u32,
        height: u32,
        origin: MapLocation,
        terrain: Vec<TerrainTile>,
    ) -> Result<Self, StateError> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if terrain.len() != expected {
            return Err(StateError::InvalidDescriptor(format!(
                "terrain has {} cells, expected {}x{} = {}",
                terrain.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self { width, height, origin, terrain })
    }

    /// Build an all-land map.
    pub fn open(width: u32, height: u32, origin: MapLocation) -> Result<Self, StateError> {
        validate_dimensions(width, height)?;
        let cells = width as usize * height as usize;
        Ok(Self { width, height, origin, terrain: vec![TerrainTile::Land; cells] })
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// World coordinate of the top-left cell.
    #[inline]
    pub fn origin(&self) -> MapLocation {
        self.origin
    }

    /// Is `location` (world coordinates) on the map?
    pub fn contains(&self, location: MapLocation) -> bool {
        self.cell_index(location).is_some()
    }

    /// Terrain at `location`, `None` when off the map.
    pub fn terrain_at(&self, location: MapLocation) -> Option<TerrainTile> {
        self.cell_index(location).map(|i| self.terrain[i])
    }

    /// Convert world coordinates to map-relative ones.
    pub fn to_local(&self, location: MapLocation) -> MapLocation {
        location - self.origin
    }

    fn cell_index(&self, location: MapLocation) -> Option<usize> {
        let local = self.to_local(location);
        let x = u32::try_from(local.x).ok().filter(|x| *x < self.width)?;
        let y = u32::try_from(local.y).ok().filter(|y| *y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), StateError> {
    if width == 0 || height == 0 {
        return Err(StateError::InvalidDescriptor(format!(
            "map dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if width > MAX_MAP_SIDE || height > MAX_MAP_SIDE {
        return Err(StateError::InvalidDescriptor(format!(
            "map dimensions {}x{} exceed {}",
            width, height, MAX_MAP_SIDE
        )));
    }
    Ok(())
}
