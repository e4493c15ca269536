//! Imported triangle-soup models.
//!
//! Raw model data is a flat float stream of 12-value records, one per
//! triangle: a face normal followed by three vertex positions, each stored
//! `(x, z, y)`. Ingestion swaps the last two components to bring the data
//! into the editor's `+Y`-up convention and replicates the face normal to
//! all three vertices.
//!
//! The record layout is that of binary STL, which [`parse_stl_binary`]
//! reads directly.

use std::path::Path;

use glam::Vec3;

use crate::error::{ResourceError, ResourceResult};
use crate::geometry::{Geometry, GeometryBuilder};

/// Floats per triangle record.
pub const RECORD_LEN: usize = 12;

const STL_HEADER_LEN: usize = 80;
const STL_RECORD_BYTES: usize = 50;

/// Checks that `data` is a whole number of finite triangle records.
pub fn validate_records(data: &[f32]) -> ResourceResult<()> {
    if data.is_empty() || data.len() % RECORD_LEN != 0 {
        return Err(ResourceError::InvalidModelData(format!(
            "expected a non-zero multiple of {RECORD_LEN} floats, got {}",
            data.len()
        )));
    }
    if let Some(index) = data.iter().position(|v| !v.is_finite()) {
        return Err(ResourceError::InvalidModelData(format!(
            "non-finite value at index {index}"
        )));
    }
    Ok(())
}

/// Builds geometry from raw triangle records.
pub fn generate_model(data: &[f32]) -> ResourceResult<Geometry> {
    validate_records(data)?;

    let swizzle = |v: &[f32]| Vec3::new(v[0], v[2], v[1]);
    let mut builder = GeometryBuilder::with_capacity(data.len() / RECORD_LEN * 3);
    for record in data.chunks_exact(RECORD_LEN) {
        let normal = swizzle(&record[0..3]);
        for vertex in record[3..].chunks_exact(3) {
            builder.push_vertex(swizzle(vertex), normal, Vec3::ZERO);
        }
    }

    let geometry = builder.build();
    tracing::debug!(
        "Ingested model with {} triangles",
        geometry.vertex_count() / 3
    );
    Ok(geometry)
}

/// Converts binary STL bytes into triangle records.
pub fn parse_stl_binary(bytes: &[u8]) -> ResourceResult<Vec<f32>> {
    if bytes.len() < STL_HEADER_LEN + 4 {
        return Err(ResourceError::InvalidModelData(
            "STL file shorter than its header".to_string(),
        ));
    }

    let count_bytes: [u8; 4] = bytes[STL_HEADER_LEN..STL_HEADER_LEN + 4]
        .try_into()
        .map_err(|_| ResourceError::InvalidModelData("truncated triangle count".to_string()))?;
    let count = u32::from_le_bytes(count_bytes) as usize;

    let body = &bytes[STL_HEADER_LEN + 4..];
    if body.len() < count * STL_RECORD_BYTES {
        return Err(ResourceError::InvalidModelData(format!(
            "STL declares {count} triangles but holds {}",
            body.len() / STL_RECORD_BYTES
        )));
    }

    let mut data = Vec::with_capacity(count * RECORD_LEN);
    for record in body.chunks_exact(STL_RECORD_BYTES).take(count) {
        // 12 little-endian floats, then a 2-byte attribute count we ignore.
        for value in record[..RECORD_LEN * 4].chunks_exact(4) {
            data.push(f32::from_le_bytes([value[0], value[1], value[2], value[3]]));
        }
    }
    Ok(data)
}

/// Parses whitespace- or comma-separated floats.
pub fn parse_float_text(text: &str) -> ResourceResult<Vec<f32>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f32>().map_err(|_| {
                ResourceError::InvalidModelData(format!("not a number: {token:?}"))
            })
        })
        .collect()
}

/// Reads triangle records from a file.
///
/// Files with an `.stl` extension are read as binary STL, anything else as
/// float text.
pub fn load_model_file(path: &Path) -> ResourceResult<Vec<f32>> {
    if !path.exists() {
        return Err(ResourceError::FileNotFound(path.to_path_buf()));
    }

    let is_stl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));
    let data = if is_stl {
        parse_stl_binary(&std::fs::read(path)?)?
    } else {
        parse_float_text(&std::fs::read_to_string(path)?)?
    };

    validate_records(&data)?;
    tracing::debug!("Loaded {} model records from {}", data.len() / RECORD_LEN, path.display());
    Ok(data)
}
