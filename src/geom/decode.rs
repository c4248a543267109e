use geo::{Centroid, Geometry};
use thiserror::Error;

use crate::geom::{DecodedParcel, ParcelShape, Ring};
use crate::io::wkt::read_wkt;

/// Why a record's geometry cannot be drawn. All variants are record-local.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("geometry is empty")]
    EmptyGeometry,

    #[error("geometry could not be parsed: {0}")]
    ParseFailure(String),

    #[error("unsupported geometry type {0}")]
    UnsupportedShape(&'static str),
}

/// Decode geometry text into exterior rings and the centroid of the whole shape.
/// Interior rings (holes) are not drawn.
pub fn decode(text: Option<&str>) -> Result<DecodedParcel, DecodeError> {
    let text = text.map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(DecodeError::EmptyGeometry)?;

    let geometry = read_wkt(text)
        .map_err(|e| DecodeError::ParseFailure(format!("{e:#}")))?;

    let (shape, centroid) = match &geometry {
        Geometry::Polygon(polygon) => {
            (ParcelShape::SinglePolygon(Ring::from(polygon.exterior())), polygon.centroid())
        }
        Geometry::MultiPolygon(polygons) => {
            let rings = polygons.iter()
                .map(|polygon| Ring::from(polygon.exterior()))
                .filter(|ring| !ring.is_empty())
                .collect();
            (ParcelShape::PolygonCollection(rings), polygons.centroid())
        }
        other => return Err(DecodeError::UnsupportedShape(type_name(other))),
    };

    if shape.rings().iter().all(Ring::is_empty) { return Err(DecodeError::EmptyGeometry) }
    let centroid = centroid.ok_or(DecodeError::EmptyGeometry)?;

    Ok(DecodedParcel { shape, centroid })
}

fn type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
