use geo::{BoundingRect, Geometry, Polygon, Rect, coord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Full geographic world, used for the dark mask graphic.
    pub const WORLD: Extent = Extent {
        xmin: -180.0,
        ymin: -90.0,
        xmax: 180.0,
        ymax: 90.0,
    };

    /// Bounding extent of a geometry; `None` for empty geometries.
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(Extent::from)
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.xmin, y: self.ymin },
            coord! { x: self.xmax, y: self.ymax },
        )
        .to_polygon()
    }
}

impl From<(f64, f64, f64, f64)> for Extent {
    fn from(extent: (f64, f64, f64, f64)) -> Self {
        Extent {
            xmin: extent.0,
            ymin: extent.1,
            xmax: extent.2,
            ymax: extent.3,
        }
    }
}

impl From<Rect<f64>> for Extent {
    fn from(rect: Rect<f64>) -> Self {
        Extent::from((rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

impl From<Extent> for Geometry<f64> {
    fn from(extent: Extent) -> Self {
        Geometry::Polygon(extent.to_polygon())
    }
}
