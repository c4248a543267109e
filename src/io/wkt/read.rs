//! WKT / EWKT reading operations.

use anyhow::{Context, Result, anyhow, bail};
use geo::{CoordsIter, Geometry};
use wkt::TryFromWkt;

/// Read a geometry from WKT text, accepting an optional EWKT `SRID=n;` prefix.
///
/// The SRID only has to be well formed; coordinates are used as stored.
pub fn read_wkt(text: &str) -> Result<Geometry<f64>> {
    let body = strip_srid(text.trim())?;
    let geometry = Geometry::<f64>::try_from_wkt_str(body)
        .map_err(|e| anyhow!("[io::wkt::read] Invalid WKT: {e}"))?;

    if geometry.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        bail!("[io::wkt::read] Non-finite coordinate");
    }
    Ok(geometry)
}

fn strip_srid(text: &str) -> Result<&str> {
    if !text.get(..5).is_some_and(|tag| tag.eq_ignore_ascii_case("SRID=")) { return Ok(text) }

    let (prefix, body) = text.split_once(';')
        .ok_or_else(|| anyhow!("[io::wkt::read] SRID prefix is missing ';'"))?;
    prefix[5..].trim().parse::<i32>()
        .with_context(|| format!("[io::wkt::read] Invalid SRID '{}'", &prefix[5..]))?;
    Ok(body)
}
