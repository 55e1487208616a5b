use std::io::Cursor;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use scene::components::MeshGeometry;

#[derive(Debug)]
pub enum PlyDecodeError {
    Parse(std::io::Error),
    MissingVertices,
    MissingCoordinate { vertex: usize, axis: &'static str },
    FaceIndexOutOfRange { face: usize, index: i64 },
}

impl std::fmt::Display for PlyDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlyDecodeError::Parse(e) => write!(f, "ply parse error: {e}"),
            PlyDecodeError::MissingVertices => write!(f, "ply has no vertex element"),
            PlyDecodeError::MissingCoordinate { vertex, axis } => {
                write!(f, "vertex {vertex} has no numeric '{axis}' property")
            }
            PlyDecodeError::FaceIndexOutOfRange { face, index } => {
                write!(f, "face {face} references vertex {index} which does not exist")
            }
        }
    }
}

impl std::error::Error for PlyDecodeError {}

/// Decodes an ascii or binary PLY payload into renderable geometry.
///
/// Reads `x`/`y`/`z`, optional `red`/`green`/`blue` and the
/// `vertex_indices` (or `vertex_index`) face list. Polygons with more than
/// three corners are fan-triangulated. A file that yields no triangles is
/// returned as a point cloud.
pub fn decode_ply(bytes: &[u8]) -> Result<MeshGeometry, PlyDecodeError> {
    let mut reader = Cursor::new(bytes);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(PlyDecodeError::Parse)?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or(PlyDecodeError::MissingVertices)?;

    let mut positions = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());
    for (i, vertex) in vertices.iter().enumerate() {
        let coord = |axis: &'static str| {
            vertex
                .get(axis)
                .and_then(scalar_f32)
                .ok_or(PlyDecodeError::MissingCoordinate { vertex: i, axis })
        };
        positions.push([coord("x")?, coord("y")?, coord("z")?]);

        if let (Some(r), Some(g), Some(b)) = (
            vertex.get("red").and_then(color_channel),
            vertex.get("green").and_then(color_channel),
            vertex.get("blue").and_then(color_channel),
        ) {
            colors.push([r, g, b]);
        }
    }

    // `element face 0` and faces without an index list leave no triangles.
    let indices = match ply.payload.get("face") {
        Some(faces) => Some(triangulate_faces(faces, positions.len())?),
        None => None,
    }
    .filter(|indices| !indices.is_empty());

    log::debug!(
        "decoded ply: {} vertices, {} colours, {} faces",
        positions.len(),
        colors.len(),
        ply.payload.get("face").map_or(0, Vec::len)
    );

    let geometry = MeshGeometry {
        positions,
        colors: None,
        indices,
    };
    // Partial colour data (some vertices without rgb) is discarded.
    Ok(geometry.with_colors(colors))
}

fn triangulate_faces(
    faces: &[DefaultElement],
    vertex_count: usize,
) -> Result<Vec<u32>, PlyDecodeError> {
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for (face_index, face) in faces.iter().enumerate() {
        let Some(corners) = face
            .get("vertex_indices")
            .or_else(|| face.get("vertex_index"))
            .and_then(index_list)
        else {
            continue;
        };

        for &corner in &corners {
            if corner < 0 || corner as usize >= vertex_count {
                return Err(PlyDecodeError::FaceIndexOutOfRange {
                    face: face_index,
                    index: corner,
                });
            }
        }

        for k in 1..corners.len().saturating_sub(1) {
            indices.push(corners[0] as u32);
            indices.push(corners[k] as u32);
            indices.push(corners[k + 1] as u32);
        }
    }
    Ok(indices)
}

fn scalar_f32(p: &Property) -> Option<f32> {
    match p {
        Property::Char(v) => Some(*v as f32),
        Property::UChar(v) => Some(*v as f32),
        Property::Short(v) => Some(*v as f32),
        Property::UShort(v) => Some(*v as f32),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        _ => None,
    }
}

/// Integer channels are normalized by their type's maximum, float channels
/// are taken as-is.
fn color_channel(p: &Property) -> Option<f32> {
    match p {
        Property::UChar(v) => Some(*v as f32 / u8::MAX as f32),
        Property::UShort(v) => Some(*v as f32 / u16::MAX as f32),
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        _ => None,
    }
}

fn index_list(p: &Property) -> Option<Vec<i64>> {
    match p {
        Property::ListChar(v) => Some(v.iter().map(|&i| i as i64).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&i| i as i64).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&i| i as i64).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&i| i as i64).collect()),
        Property::ListInt(v) => Some(v.iter().map(|&i| i as i64).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&i| i as i64).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{PlyDecodeError, decode_ply};
    use pretty_assertions::assert_eq;

    const COLORED_QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0 0 0 255 0
1 1 0 0 0 255
0 1 0 255 255 255
4 0 1 2 3
";

    const POINTS: &str = "ply
format ascii 1.0
element vertex 2
property float x
property float y
property float z
end_header
0.5 1.5 -2
3 4 5
";

    #[test]
    fn quad_is_fan_triangulated_with_colors() {
        let g = decode_ply(COLORED_QUAD.as_bytes()).expect("decode");
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.indices, Some(vec![0, 1, 2, 0, 2, 3]));
        let colors = g.colors.expect("colors");
        assert_eq!(colors[0], [1.0, 0.0, 0.0]);
        assert_eq!(colors[3], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn file_without_faces_is_point_cloud() {
        let g = decode_ply(POINTS.as_bytes()).expect("decode");
        assert!(g.is_point_cloud());
        assert!(g.colors.is_none());
        assert_eq!(g.positions, vec![[0.5, 1.5, -2.0], [3.0, 4.0, 5.0]]);
    }

    #[test]
    fn empty_face_element_is_point_cloud() {
        let with_empty_faces = POINTS.replace(
            "end_header",
            "element face 0\nproperty list uchar int vertex_indices\nend_header",
        );
        let g = decode_ply(with_empty_faces.as_bytes()).expect("decode");
        assert!(g.is_point_cloud());
        assert_eq!(g.indices, None);
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn faces_without_index_list_are_point_cloud() {
        let unlisted = COLORED_QUAD
            .replace("property list uchar int vertex_indices", "property uchar flags")
            .replace("4 0 1 2 3", "7");
        let g = decode_ply(unlisted.as_bytes()).expect("decode");
        assert!(g.is_point_cloud());
        assert!(g.colors.is_some());
    }

    #[test]
    fn out_of_range_face_is_rejected() {
        let bad = COLORED_QUAD.replace("4 0 1 2 3", "4 0 1 2 9");
        let err = decode_ply(bad.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PlyDecodeError::FaceIndexOutOfRange { face: 0, index: 9 }
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = decode_ply(b"not a ply file").unwrap_err();
        assert!(matches!(err, PlyDecodeError::Parse(_)));
    }
}
