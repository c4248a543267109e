#![doc = "Streams cadastral parcels from PostGIS into one DXF drawing per district"]
mod common;
mod drawing;
mod export;
mod geom;
mod io;
mod source;

#[doc(inline)]
pub use common::{FOLDED_LETTERS, UNKNOWN_FILENAME, fold_script, normalize_label, resolve_escapes, sanitize_filename};

#[doc(inline)]
pub use geom::{DecodeError, DecodedParcel, ParcelShape, Ring, decode};

#[doc(inline)]
pub use drawing::{
    Boundary, DEFAULT_TEXT_HEIGHT, DistrictDocument, Entity, HAlign, LABEL_LAYER, Layer, MTextEntity,
    PARCEL_LAYER, Placement, TextEntity, VAlign,
};

#[doc(inline)]
pub use io::dxf::{DEFAULT_ENCODINGS, DxfVersion, SerializationFailure, TextEncoding};

#[doc(inline)]
pub use export::{DistrictExporter, DistrictReport, DistrictStats, ExportOptions, ExportSummary, export};

#[doc(inline)]
pub use source::{DEFAULT_FETCH_SIZE, ParcelRecord, ParcelSource, ParcelStream, SourceConfig};

#[cfg(feature = "postgres")]
#[doc(inline)]
pub use source::{ConnectionConfig, PostgresSource, build_query};
