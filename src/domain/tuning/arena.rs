use crate::domain::state::Bounds;

/// Default visible region and edge margin used until the host reports its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaTuning {
    pub width: f64,
    pub height: f64,

    /// Distance entities are kept away from each edge.
    pub margin: f64,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            margin: 50.0,
        }
    }
}

impl ArenaTuning {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height, self.margin)
    }
}
