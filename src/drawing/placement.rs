//! Label placement strategies, most capable first.

use geo::Coord;
use thiserror::Error;

use crate::drawing::{Entity, HAlign, LABEL_LAYER, MTextEntity, TextEntity, VAlign};
use crate::io::dxf::DxfVersion;

/// Height used by plain placement when the requested one is unusable.
pub const DEFAULT_TEXT_HEIGHT: f64 = 2.5;

/// Rough glyph advance as a fraction of text height, for manual centring.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// MTEXT attachment point: middle centre.
const ATTACH_MIDDLE_CENTER: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// TEXT with middle/centre alignment and an alignment point.
    Aligned,
    /// MTEXT attached at its middle centre.
    MText,
    /// TEXT whose insertion point is offset by its estimated half extents.
    Manual,
    /// TEXT at the insertion point, no alignment.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum PlacementError {
    #[error("text height {0} is not a positive finite number")]
    InvalidHeight(f64),

    #[error("position ({0}, {1}) is not finite")]
    NonFinitePosition(f64, f64),
}

pub(crate) struct LabelRequest<'a> {
    pub text: &'a str,
    pub position: Coord<f64>,
    pub height: f64,
}

impl LabelRequest<'_> {
    #[inline] fn is_single_line(&self) -> bool { !self.text.contains(['\n', '\r']) }

    fn checked(&self) -> Result<(), PlacementError> {
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(PlacementError::InvalidHeight(self.height));
        }
        if !(self.position.x.is_finite() && self.position.y.is_finite()) {
            return Err(PlacementError::NonFinitePosition(self.position.x, self.position.y));
        }
        Ok(())
    }
}

type Applicable = fn(&LabelRequest, DxfVersion) -> bool;

type Strategy = fn(&LabelRequest) -> Result<Entity, PlacementError>;

fn single_line(request: &LabelRequest, _: DxfVersion) -> bool { request.is_single_line() }

fn mtext_supported(_: &LabelRequest, version: DxfVersion) -> bool { version.supports_mtext() }

fn always(_: &LabelRequest, _: DxfVersion) -> bool { true }

/// Fallible strategies in the order they are tried; [`plain`] follows them all.
pub(crate) const PLACEMENTS: &[(Placement, Applicable, Strategy)] = &[
    (Placement::Aligned, single_line, aligned),
    (Placement::MText, mtext_supported, mtext),
    (Placement::Manual, always, manual),
];

fn aligned(request: &LabelRequest) -> Result<Entity, PlacementError> {
    request.checked()?;
    Ok(Entity::Text(TextEntity {
        layer: LABEL_LAYER,
        text: request.text.to_string(),
        insert: request.position,
        height: request.height,
        halign: HAlign::Center,
        valign: VAlign::Middle,
        align_point: Some(request.position),
    }))
}

fn mtext(request: &LabelRequest) -> Result<Entity, PlacementError> {
    request.checked()?;
    Ok(Entity::MText(MTextEntity {
        layer: LABEL_LAYER,
        text: request.text.to_string(),
        insert: request.position,
        height: request.height,
        attachment: ATTACH_MIDDLE_CENTER,
    }))
}

fn manual(request: &LabelRequest) -> Result<Entity, PlacementError> {
    request.checked()?;
    let text = flatten(request.text);
    let width = GLYPH_WIDTH_RATIO * request.height * text.chars().count() as f64;
    Ok(Entity::Text(TextEntity {
        layer: LABEL_LAYER,
        insert: Coord {
            x: request.position.x - width / 2.0,
            y: request.position.y - request.height / 2.0,
        },
        text,
        height: request.height,
        halign: HAlign::Left,
        valign: VAlign::Baseline,
        align_point: None,
    }))
}

/// Plain insertion never fails: unusable numbers are replaced by defaults.
pub(crate) fn plain(request: &LabelRequest) -> Entity {
    let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
    let height = if request.height.is_finite() && request.height > 0.0 { request.height } else { DEFAULT_TEXT_HEIGHT };

    Entity::Text(TextEntity {
        layer: LABEL_LAYER,
        text: flatten(request.text),
        insert: Coord { x: finite_or_zero(request.position.x), y: finite_or_zero(request.position.y) },
        height,
        halign: HAlign::Left,
        valign: VAlign::Baseline,
        align_point: None,
    })
}

fn flatten(text: &str) -> String {
    text.split(['\n', '\r']).filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}
