//! DXF format writing operations for district drawings.

mod encoding;
mod writer;

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};

pub use encoding::{DEFAULT_ENCODINGS, SerializationFailure, TextEncoding};
pub(crate) use encoding::{serialize, write_atomic};
pub(crate) use writer::render_dxf;

/// DXF release to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DxfVersion {
    /// AutoCAD R12: POLYLINE/VERTEX entities, no handles, no MTEXT.
    R12,
    /// AutoCAD 2000: LWPOLYLINE, MTEXT, handles and subclass markers.
    #[default]
    R2000,
}

impl DxfVersion {
    /// Value of the `$ACADVER` header variable.
    #[inline]
    pub fn acadver(self) -> &'static str {
        match self {
            Self::R12 => "AC1009",
            Self::R2000 => "AC1015",
        }
    }

    #[inline] pub fn supports_mtext(self) -> bool { self == Self::R2000 }

    #[inline] pub fn has_handles(self) -> bool { self == Self::R2000 }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::R12 => "R12", Self::R2000 => "R2000" })
    }
}

impl FromStr for DxfVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "R12" | "AC1009" => Ok(Self::R12),
            "R2000" | "AC1015" => Ok(Self::R2000),
            other => bail!("[io::dxf] Unsupported DXF version '{other}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_names_and_codes() {
        assert_eq!("r12".parse::<DxfVersion>().unwrap(), DxfVersion::R12);
        assert_eq!("AC1009".parse::<DxfVersion>().unwrap(), DxfVersion::R12);
        assert_eq!("R2000".parse::<DxfVersion>().unwrap(), DxfVersion::R2000);
        assert_eq!("ac1015".parse::<DxfVersion>().unwrap(), DxfVersion::R2000);
        assert!("R14".parse::<DxfVersion>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for version in [DxfVersion::R12, DxfVersion::R2000] {
            assert_eq!(version.to_string().parse::<DxfVersion>().unwrap(), version);
        }
    }
}
