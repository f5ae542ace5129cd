//! Grid track sizes

use std::fmt;

/// The size of one column track in the rendered grid.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSize {
    /// Fixed pixel width.
    Px(f32),
    /// Flexible track: at least `min` pixels, shares the remaining space.
    MinMax { min: f32 },
    /// Non-pixel CSS length, passed through verbatim.
    Css(String),
}

impl TrackSize {
    /// Returns the fixed pixel width, if this is a fixed track.
    pub fn pixels(&self) -> Option<f32> {
        match self {
            TrackSize::Px(px) => Some(*px),
            _ => None,
        }
    }

    /// Returns `true` for flexible tracks.
    pub fn is_flexible(&self) -> bool {
        matches!(self, TrackSize::MinMax { .. })
    }
}

impl fmt::Display for TrackSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSize::Px(px) => write!(f, "{}px", px),
            TrackSize::MinMax { min } => write!(f, "minmax({}px, 1fr)", min),
            TrackSize::Css(css) => f.write_str(css),
        }
    }
}
