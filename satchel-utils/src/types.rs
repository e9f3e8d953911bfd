// Wrapper types making it harder to accidentaly mix up columns, rows and pixels.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

// A cell coordinate on the grid. Signed so that callers can express positions left of or above the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellPos {
    pub col: i32,
    pub row: i32,
}

impl CellPos {
    pub const ORIGIN: CellPos = CellPos { col: 0, row: 0 };

    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns this position shifted by the given column and row deltas, or `None` if either
    /// coordinate would overflow.
    #[must_use]
    pub const fn checked_offset(self, dcol: i32, drow: i32) -> Option<Self> {
        match (self.col.checked_add(dcol), self.row.checked_add(drow)) {
            (Some(col), Some(row)) => Some(Self { col, row }),
            _ => None,
        }
    }
}

impl Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

impl FromStr for CellPos {
    type Err = String;

    // Accepts "col,row" with optional surrounding parentheses and whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() != 2 {
            return Err(format!("Invalid cell position: {s}"));
        }

        let col = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid column: {}", parts[0]))?;
        let row = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid row: {}", parts[1]))?;

        Ok(CellPos { col, row })
    }
}

// The rectangular extent an item covers, in cells. Both sides are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFootprint", into = "RawFootprint")]
pub struct Footprint {
    width: i32,
    height: i32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint {
        width: 1,
        height: 1,
    };

    /// Creates a footprint, or `None` if either side is smaller than one cell.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Option<Self> {
        if width < 1 || height < 1 {
            return None;
        }
        Some(Self { width, height })
    }

    #[must_use]
    pub const fn width(self) -> i32 {
        self.width
    }

    #[must_use]
    pub const fn height(self) -> i32 {
        self.height
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Cells covered when anchored at `origin`, row-major.
    ///
    /// Cells past `i32::MAX` can't exist on any grid and are left out.
    pub fn cells_at(self, origin: CellPos) -> impl Iterator<Item = CellPos> {
        (0..self.height).flat_map(move |drow| {
            (0..self.width).filter_map(move |dcol| origin.checked_offset(dcol, drow))
        })
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Serialize, Deserialize)]
struct RawFootprint {
    width: i32,
    height: i32,
}

impl TryFrom<RawFootprint> for Footprint {
    type Error = String;

    fn try_from(raw: RawFootprint) -> Result<Self, Self::Error> {
        Footprint::new(raw.width, raw.height)
            .ok_or_else(|| format!("Invalid footprint: {}x{}", raw.width, raw.height))
    }
}

impl From<Footprint> for RawFootprint {
    fn from(footprint: Footprint) -> Self {
        RawFootprint {
            width: footprint.width,
            height: footprint.height,
        }
    }
}

// A point in the grid's local render space, in pixels. y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
