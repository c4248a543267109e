use geo::{Coord, LineString, Point};

/// Closed exterior boundary of one polygonal area, as drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(Vec<Coord<f64>>);

impl Ring {
    #[inline] pub fn new(points: Vec<Coord<f64>>) -> Self { Self(points) }

    #[inline] pub fn points(&self) -> &[Coord<f64>] { &self.0 }

    #[inline] pub fn len(&self) -> usize { self.0.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<&LineString<f64>> for Ring {
    fn from(line: &LineString<f64>) -> Self { Self(line.0.clone()) }
}

/// Polygonal content of one parcel record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParcelShape {
    SinglePolygon(Ring),
    PolygonCollection(Vec<Ring>),
}

impl ParcelShape {
    /// All rings of the shape, in source order.
    pub fn rings(&self) -> &[Ring] {
        match self {
            Self::SinglePolygon(ring) => std::slice::from_ref(ring),
            Self::PolygonCollection(rings) => rings,
        }
    }

    pub fn into_rings(self) -> Vec<Ring> {
        match self {
            Self::SinglePolygon(ring) => vec![ring],
            Self::PolygonCollection(rings) => rings,
        }
    }
}

/// Decoded parcel geometry: the rings to draw plus one label anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedParcel {
    pub shape: ParcelShape,
    /// Centroid of the whole geometry, not of any single member.
    pub centroid: Point<f64>,
}
