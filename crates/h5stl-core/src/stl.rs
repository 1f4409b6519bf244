//! Binary layout: an 80-byte free-form header, a little-endian `u32`
//! triangle count, then one 50-byte record per triangle (normal, three
//! vertices, 2-byte attribute count).

use crate::error::FormatError;
use crate::geom::Vec3;
use crate::model::{Triangle, TriangleMesh};
use std::io::Cursor;
use stl_io::{AsciiStlReader, BinaryStlReader};
use tracing::debug;

pub const HEADER_LEN: usize = 80;
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
pub const RECORD_LEN: usize = 50;

/// MIME type the backend declares for STL artifacts.
pub const STL_MIME: &str = "application/stl";

/// Binary only. The declared count must account for every byte after the
/// preamble.
pub fn decode(bytes: &[u8]) -> Result<TriangleMesh, FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::Empty);
    }
    if bytes.len() < PREAMBLE_LEN {
        return Err(FormatError::MissingHeader {
            len: bytes.len(),
            min: PREAMBLE_LEN,
        });
    }

    let declared = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
    let expected = PREAMBLE_LEN as u64 + u64::from(declared) * RECORD_LEN as u64;
    if expected != bytes.len() as u64 {
        return Err(FormatError::CountMismatch {
            declared,
            expected,
            actual: bytes.len(),
        });
    }

    let mut cursor = Cursor::new(bytes);
    let reader = BinaryStlReader::create_triangle_iterator(&mut cursor).map_err(binary_err)?;
    let mesh = collect(reader).map_err(binary_err)?;
    debug!(triangles = mesh.len(), bytes = bytes.len(), "decoded binary STL");
    Ok(mesh)
}

/// Binary wins whenever the declared count matches the length.
pub fn decode_auto(bytes: &[u8]) -> Result<TriangleMesh, FormatError> {
    match decode(bytes) {
        Ok(mesh) => Ok(mesh),
        Err(err) if looks_like_ascii(bytes) => {
            debug!(%err, "not a consistent binary STL, trying ASCII");
            decode_ascii(bytes)
        }
        Err(err) => Err(err),
    }
}

pub fn decode_ascii(bytes: &[u8]) -> Result<TriangleMesh, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|_| FormatError::NotText)?;
    if text.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let mut cursor = Cursor::new(bytes);
    let reader = AsciiStlReader::create_triangle_iterator(&mut cursor).map_err(ascii_err)?;
    let mesh = collect(reader).map_err(ascii_err)?;
    debug!(triangles = mesh.len(), "decoded ASCII STL");
    Ok(mesh)
}

/// Writes a binary STL. Stored normals are written unchanged.
pub fn encode(mesh: &TriangleMesh, header_label: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(PREAMBLE_LEN + mesh.len() * RECORD_LEN);

    let mut header = [0u8; HEADER_LEN];
    let label = header_label.as_bytes();
    let n = label.len().min(HEADER_LEN);
    header[..n].copy_from_slice(&label[..n]);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(mesh.len() as u32).to_le_bytes());

    for tri in &mesh.triangles {
        for v in std::iter::once(&tri.normal).chain(tri.vertices.iter()) {
            out.extend_from_slice(&v.x.to_le_bytes());
            out.extend_from_slice(&v.y.to_le_bytes());
            out.extend_from_slice(&v.z.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}

fn looks_like_ascii(bytes: &[u8]) -> bool {
    !bytes.contains(&0)
        && std::str::from_utf8(bytes)
            .is_ok_and(|text| text.split_whitespace().next() == Some("solid"))
}

fn collect<I>(reader: I) -> std::io::Result<TriangleMesh>
where
    I: Iterator<Item = std::io::Result<stl_io::Triangle>>,
{
    let triangles = reader
        .map(|t| {
            t.map(|t| {
                let [a, b, c] = t.vertices.map(|v| Vec3::from_array(<[f32; 3]>::from(v)));
                Triangle::new(Vec3::from_array(<[f32; 3]>::from(t.normal)), [a, b, c])
            })
        })
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(TriangleMesh::new(triangles))
}

fn binary_err(err: std::io::Error) -> FormatError {
    FormatError::Binary(err.to_string())
}

fn ascii_err(err: std::io::Error) -> FormatError {
    FormatError::Ascii(err.to_string())
}
