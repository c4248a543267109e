use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::{Coord, Point};
use log::trace;

use crate::drawing::placement::{LabelRequest, PLACEMENTS, Placement, plain};
use crate::geom::Ring;
use crate::io::dxf::{self, DxfVersion, TextEncoding};

/// Layer holding parcel boundaries.
pub const PARCEL_LAYER: &str = "PARCELS";

/// Layer holding parcel labels.
pub const LABEL_LAYER: &str = "LABELS";

/// A named layer and its ACI colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub name: &'static str,
    pub color: i16,
}

impl Layer {
    /// The mandatory layer "0".
    pub(crate) const DEFAULT: Layer = Layer { name: "0", color: 7 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HAlign { Left = 0, Center = 1, Right = 2 }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VAlign { Baseline = 0, Bottom = 1, Middle = 2, Top = 3 }

#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub layer: &'static str,
    pub points: Vec<Coord<f64>>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntity {
    pub layer: &'static str,
    pub text: String,
    pub insert: Coord<f64>,
    pub height: f64,
    pub halign: HAlign,
    pub valign: VAlign,
    pub align_point: Option<Coord<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MTextEntity {
    pub layer: &'static str,
    pub text: String,
    pub insert: Coord<f64>,
    pub height: f64,
    pub attachment: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Boundary(Boundary),
    Text(TextEntity),
    MText(MTextEntity),
}

impl Entity {
    #[inline] pub fn is_boundary(&self) -> bool { matches!(self, Self::Boundary(_)) }

    #[inline] pub fn is_label(&self) -> bool { matches!(self, Self::Text(_) | Self::MText(_)) }
}

/// The in-progress drawing for one district.
#[derive(Debug)]
pub struct DistrictDocument {
    version: DxfVersion,
    layers: [Layer; 2],
    entities: Vec<Entity>,
}

impl DistrictDocument {
    pub fn new(version: DxfVersion) -> Self {
        Self {
            version,
            layers: [
                Layer { name: PARCEL_LAYER, color: 7 },
                Layer { name: LABEL_LAYER, color: 1 },
            ],
            entities: Vec::new(),
        }
    }

    #[inline] pub fn version(&self) -> DxfVersion { self.version }

    #[inline] pub fn layers(&self) -> &[Layer] { &self.layers }

    #[inline] pub fn entities(&self) -> &[Entity] { &self.entities }

    pub fn boundary_count(&self) -> usize { self.entities.iter().filter(|e| e.is_boundary()).count() }

    pub fn label_count(&self) -> usize { self.entities.iter().filter(|e| e.is_label()).count() }

    /// Append a closed boundary polyline on the parcel layer.
    pub fn add_boundary(&mut self, ring: Ring) {
        self.entities.push(Entity::Boundary(Boundary {
            layer: PARCEL_LAYER,
            points: ring.points().to_vec(),
            closed: true,
        }));
    }

    /// Append a label centred at `position`, falling back through less capable
    /// placements as needed. Returns the placement that was used.
    pub fn add_label(&mut self, text: &str, position: Point<f64>, height: f64) -> Placement {
        let request = LabelRequest { text, position: position.0, height };

        for &(placement, applicable, strategy) in PLACEMENTS {
            if !applicable(&request, self.version) { continue }
            match strategy(&request) {
                Ok(entity) => {
                    self.entities.push(entity);
                    return placement;
                }
                Err(e) => trace!("[drawing] {placement:?} placement failed for '{text}': {e}"),
            }
        }

        self.entities.push(plain(&request));
        Placement::Plain
    }

    /// Serialise the drawing to `path` with the first encoding in `encodings`
    /// that can represent it, consuming the document.
    pub fn finalize(self, path: &Path, encodings: &[TextEncoding]) -> Result<(PathBuf, TextEncoding)> {
        let (bytes, encoding) = dxf::serialize(&self, encodings)
            .with_context(|| format!("[drawing] Failed to serialize {}", path.display()))?;
        let path = dxf::write_atomic(path, &bytes)?;
        Ok((path, encoding))
    }
}
