mod document;
mod placement;

pub use document::{
    Boundary, DistrictDocument, Entity, HAlign, LABEL_LAYER, Layer, MTextEntity, PARCEL_LAYER, TextEntity, VAlign,
};
pub use placement::{DEFAULT_TEXT_HEIGHT, Placement};
