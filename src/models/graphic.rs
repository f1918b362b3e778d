use super::geometry::Extent;
use geo::Geometry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 1.0,
    };
    pub const WHITE: Rgba = Rgba {
        red: 255,
        green: 255,
        blue: 255,
        alpha: 1.0,
    };
}

/// How a graphic composites onto the effect layer beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Normal,
    /// Punches the graphic's footprint out of everything drawn before it
    CutOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graphic {
    pub geometry: Geometry<f64>,
    pub fill: Rgba,
    pub blend: Blend,
}

impl Graphic {
    /// Opaque dark fill covering the whole world.
    pub fn world_mask() -> Self {
        Graphic {
            geometry: Extent::WORLD.into(),
            fill: Rgba::BLACK,
            blend: Blend::Normal,
        }
    }

    /// White, outline-free fill that reveals `boundary` through the mask.
    pub fn cut_out(boundary: Geometry<f64>) -> Self {
        Graphic {
            geometry: boundary,
            fill: Rgba::WHITE,
            blend: Blend::CutOut,
        }
    }
}
