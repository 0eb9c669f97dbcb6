/// Category palette and color allocation
///
/// Each new category gets a color not yet used on the board, chosen at
/// random. Once every palette color is taken, colors are reused at random.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use taskboard_shared::sync::colors::{pick, CategoryColor};
///
/// let used: HashSet<_> = [CategoryColor::Blue].into_iter().collect();
/// assert_ne!(pick(&used), CategoryColor::Blue);
/// ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A palette color
///
/// Stored and serialized as its utility-class string (e.g. `"bg-blue-200"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryColor {
    #[serde(rename = "bg-blue-200")]
    Blue,
    #[serde(rename = "bg-purple-200")]
    Purple,
    #[serde(rename = "bg-green-200")]
    Green,
    #[serde(rename = "bg-orange-200")]
    Orange,
    #[serde(rename = "bg-pink-200")]
    Pink,
    #[serde(rename = "bg-teal-200")]
    Teal,
    #[serde(rename = "bg-indigo-200")]
    Indigo,
    #[serde(rename = "bg-rose-200")]
    Rose,
    #[serde(rename = "bg-amber-200")]
    Amber,
    #[serde(rename = "bg-cyan-200")]
    Cyan,
    #[serde(rename = "bg-yellow-200")]
    Yellow,
}

/// Every color a category can have
pub const PALETTE: [CategoryColor; 11] = [
    CategoryColor::Blue,
    CategoryColor::Purple,
    CategoryColor::Green,
    CategoryColor::Orange,
    CategoryColor::Pink,
    CategoryColor::Teal,
    CategoryColor::Indigo,
    CategoryColor::Rose,
    CategoryColor::Amber,
    CategoryColor::Cyan,
    CategoryColor::Yellow,
];

impl CategoryColor {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryColor::Blue => "bg-blue-200",
            CategoryColor::Purple => "bg-purple-200",
            CategoryColor::Green => "bg-green-200",
            CategoryColor::Orange => "bg-orange-200",
            CategoryColor::Pink => "bg-pink-200",
            CategoryColor::Teal => "bg-teal-200",
            CategoryColor::Indigo => "bg-indigo-200",
            CategoryColor::Rose => "bg-rose-200",
            CategoryColor::Amber => "bg-amber-200",
            CategoryColor::Cyan => "bg-cyan-200",
            CategoryColor::Yellow => "bg-yellow-200",
        }
    }

    /// Parses a stored value, `None` if it is not a palette color
    pub fn from_storage(value: &str) -> Option<Self> {
        PALETTE.iter().copied().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks a color for a new category using the thread-local RNG
pub fn pick(used: &HashSet<CategoryColor>) -> CategoryColor {
    pick_with(used, &mut rand::thread_rng())
}

/// Picks a color uniformly among those not in `used`, or among the whole
/// palette when none are left
pub fn pick_with<R: Rng + ?Sized>(used: &HashSet<CategoryColor>, rng: &mut R) -> CategoryColor {
    let available: Vec<CategoryColor> = PALETTE
        .iter()
        .copied()
        .filter(|color| !used.contains(color))
        .collect();

    let candidates: &[CategoryColor] = if available.is_empty() {
        &PALETTE
    } else {
        &available
    };

    candidates.choose(rng).copied().unwrap_or(PALETTE[0])
}
