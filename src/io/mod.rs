//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `wkt` - Well-Known Text (and EWKT) geometry reading
//! - `dxf` - DXF drawing output with text-encoding fallback

pub mod dxf;
pub(crate) mod wkt;
