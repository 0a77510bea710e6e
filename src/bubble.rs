//! Bubble entities and the randomized spawn rules.
//!
//! Positions and sizes live in virtual pixels; the front-end maps terminal
//! cells onto that space. Coordinates are top-left anchored with y growing
//! downward.

use rand::seq::SliceRandom;
use rand::Rng;

pub type BubbleId = u64;
pub type PopupId = u64;

/// Viewports at or below this width use the compact spawn profile.
pub const COMPACT_VIEWPORT_MAX_PX: f64 = 768.0;

/// The fixed 6-entry palette bubbles are colored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleColor {
    Pink,
    Cyan,
    Yellow,
    Green,
    Red,
    Blue,
}

impl BubbleColor {
    pub const PALETTE: [BubbleColor; 6] = [
        BubbleColor::Pink,
        BubbleColor::Cyan,
        BubbleColor::Yellow,
        BubbleColor::Green,
        BubbleColor::Red,
        BubbleColor::Blue,
    ];
}

/// Sizing constants selected by viewport class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnProfile {
    pub min_size: f64,
    pub max_size: f64,
    pub padding: f64,
}

impl SpawnProfile {
    pub const WIDE: SpawnProfile = SpawnProfile {
        min_size: 30.0,
        max_size: 80.0,
        padding: 5.0,
    };

    /// Larger minimum size and padding so bubbles stay tappable on narrow
    /// viewports.
    pub const COMPACT: SpawnProfile = SpawnProfile {
        min_size: 40.0,
        max_size: 70.0,
        padding: 10.0,
    };

    pub fn for_viewport_width(width_px: f64) -> Self {
        if width_px <= COMPACT_VIEWPORT_MAX_PX {
            Self::COMPACT
        } else {
            Self::WIDE
        }
    }
}

/// Play-area bounds in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

/// A live bubble. Owned exclusively by the session's collection; `popped`
/// marks the 300ms terminal animation window before removal.
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: BubbleColor,
    pub spawned_at_ms: u64,
    pub popped: bool,
}

impl Bubble {
    /// Create a bubble with randomized size, position and color, kept inside
    /// the padded play-area bounds.
    pub fn spawn<R: Rng>(
        id: BubbleId,
        area: PlayArea,
        profile: SpawnProfile,
        now_ms: u64,
        rng: &mut R,
    ) -> Self {
        let size = rng.gen_range(profile.min_size..=profile.max_size);

        // Degenerate (tiny) play areas collapse the range to the padding
        // corner instead of panicking on an empty range.
        let max_x = (area.width - size - profile.padding).max(profile.padding);
        let max_y = (area.height - size - profile.padding).max(profile.padding);
        let x = rng.gen_range(profile.padding..=max_x);
        let y = rng.gen_range(profile.padding..=max_y);

        let color = *BubbleColor::PALETTE.choose(rng).unwrap_or(&BubbleColor::Cyan);

        Self {
            id,
            x,
            y,
            size,
            color,
            spawned_at_ms: now_ms,
            popped: false,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        let r = self.size / 2.0;
        (self.x + r, self.y + r)
    }

    /// Whether a pointer press at `(px, py)` lands inside this bubble.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let (cx, cy) = self.center();
        let r = self.size / 2.0;
        (px - cx).powi(2) + (py - cy).powi(2) <= r * r
    }
}

/// Transient `+N` indicator shown at a popped bubble's position.
#[derive(Debug, Clone)]
pub struct ScorePopup {
    pub id: PopupId,
    pub x: f64,
    pub y: f64,
    pub text: String,
}
