//! OBJ file parsing into an intermediate polygon soup
//!
//! The parser only builds the raw model: position and texcoord arrays plus
//! per-shape faces of vertex references. Triangulation and normal
//! reconstruction happen afterwards in [`crate::assets::mesh_builder`].

use crate::assets::LoadError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A single corner of a face: a position index plus an optional texcoord index
///
/// Position indices are validated at parse time and always refer into
/// [`PolygonSoup::positions`]. Texcoord indices may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    /// Index into the position array
    pub position: usize,
    /// Index into the texcoord array, if the face corner carries one
    pub texcoord: Option<usize>,
}

/// A named group of faces sharing one centroid for normal orientation
#[derive(Debug, Clone, Default)]
pub struct Shape {
    /// Shape name from the `o`/`g` directive, empty for the implicit shape
    pub name: String,
    /// Faces as ordered vertex reference lists, arbitrary vertex count
    pub faces: Vec<Vec<VertexRef>>,
}

/// Unordered polygon-mesh model parsed from an OBJ file
#[derive(Debug, Clone, Default)]
pub struct PolygonSoup {
    /// 3D positions referenced by faces
    pub positions: Vec<[f32; 3]>,
    /// 2D texture coordinates referenced by faces, may be empty
    pub texcoords: Vec<[f32; 2]>,
    /// Shapes, each an independent list of faces
    pub shapes: Vec<Shape>,
}

impl PolygonSoup {
    /// Parse an OBJ file from disk
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        log::debug!("Parsing OBJ file: {}", path.display());
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::parse_lines(reader.lines().map(|line| line.map_err(LoadError::Io)))
    }

    /// Parse OBJ source held in memory
    pub fn parse_str(source: &str) -> Result<Self, LoadError> {
        Self::parse_lines(source.lines().map(|line| Ok(line.to_string())))
    }

    fn parse_lines<I>(lines: I) -> Result<Self, LoadError>
    where
        I: Iterator<Item = Result<String, LoadError>>,
    {
        let mut soup = Self::default();
        let mut current = Shape::default();

        for (line_no, line) in lines.enumerate() {
            let line = line?;
            let line = line.trim();
            let line_no = line_no + 1;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => soup.positions.push(parse_floats::<3>(&parts, line_no)?),
                "vt" => soup.texcoords.push(parse_floats::<2>(&parts, line_no)?),
                "f" => {
                    let mut face = Vec::with_capacity(parts.len() - 1);
                    for corner in &parts[1..] {
                        face.push(soup.parse_vertex_ref(corner, line_no)?);
                    }
                    current.faces.push(face);
                }
                "o" | "g" => {
                    // Faces parsed so far belong to the previous shape
                    if !current.faces.is_empty() {
                        soup.shapes.push(std::mem::take(&mut current));
                    }
                    current.name = parts.get(1).unwrap_or(&"").to_string();
                }
                other => {
                    log::warn!("line {line_no}: unsupported OBJ directive '{other}', skipping");
                }
            }
        }

        if !current.faces.is_empty() {
            soup.shapes.push(current);
        }

        log::debug!(
            "Parsed OBJ: {} positions, {} texcoords, {} shape(s)",
            soup.positions.len(),
            soup.texcoords.len(),
            soup.shapes.len()
        );
        Ok(soup)
    }

    /// Parse one face corner of the form `v`, `v/vt`, `v/vt/vn`, or `v//vn`
    fn parse_vertex_ref(&self, corner: &str, line_no: usize) -> Result<VertexRef, LoadError> {
        let mut fields = corner.split('/');

        let position = fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or_else(|| LoadError::Parse(format!("line {line_no}: empty face corner")))?;
        let position = self.resolve_index(position, self.positions.len(), line_no)?;

        // Empty texcoord field ("v//vn") means the corner has no texcoord.
        // Out-of-range texcoord indices are tolerated here; the mesh builder
        // substitutes zero UVs for them.
        let texcoord = match fields.next() {
            None | Some("") => None,
            Some(field) => {
                let raw: i64 = field.parse().map_err(|_| {
                    LoadError::Parse(format!("line {line_no}: invalid texcoord index '{field}'"))
                })?;
                resolve_signed(raw, self.texcoords.len())
            }
        };

        // Normal indices are ignored: normals are always rebuilt flat
        if let Some(normal) = fields.next() {
            if !normal.is_empty() {
                log::debug!("line {line_no}: ignoring normal index '{normal}' (normals are recomputed)");
            }
        }

        Ok(VertexRef { position, texcoord })
    }

    /// Resolve a 1-based (or negative relative) position index, validating range
    fn resolve_index(&self, field: &str, len: usize, line_no: usize) -> Result<usize, LoadError> {
        let raw: i64 = field.parse().map_err(|_| {
            LoadError::Parse(format!("line {line_no}: invalid position index '{field}'"))
        })?;
        resolve_signed(raw, len).ok_or_else(|| {
            LoadError::Parse(format!(
                "line {line_no}: position index {raw} out of range (1..={len})"
            ))
        })
    }
}

/// Convert an OBJ index (1-based, negative counts back from the end) to 0-based
fn resolve_signed(raw: i64, len: usize) -> Option<usize> {
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        len as i64 + raw
    } else {
        return None;
    };
    usize::try_from(resolved).ok().filter(|&i| i < len)
}

fn parse_floats<const N: usize>(parts: &[&str], line_no: usize) -> Result<[f32; N], LoadError> {
    if parts.len() < N + 1 {
        return Err(LoadError::Parse(format!(
            "line {line_no}: '{}' needs {N} components, found {}",
            parts[0],
            parts.len() - 1
        )));
    }
    let mut out = [0.0f32; N];
    for (slot, field) in out.iter_mut().zip(&parts[1..=N]) {
        *slot = field.parse().map_err(|_| {
            LoadError::Parse(format!("line {line_no}: invalid number '{field}'"))
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn parses_positions_texcoords_and_faces() {
        let soup = PolygonSoup::parse_str(QUAD).unwrap();
        assert_eq!(soup.positions.len(), 4);
        assert_eq!(soup.texcoords.len(), 4);
        assert_eq!(soup.shapes.len(), 1);
        assert_eq!(soup.shapes[0].faces.len(), 1);
        assert_eq!(soup.shapes[0].faces[0].len(), 4);
        assert_eq!(
            soup.shapes[0].faces[0][2],
            VertexRef { position: 2, texcoord: Some(2) }
        );
    }

    #[test]
    fn texcoords_are_optional() {
        let soup = PolygonSoup::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert!(soup.shapes[0].faces[0].iter().all(|r| r.texcoord.is_none()));
    }

    #[test]
    fn double_slash_corner_has_no_texcoord() {
        let soup =
            PolygonSoup::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n")
                .unwrap();
        assert!(soup.shapes[0].faces[0].iter().all(|r| r.texcoord.is_none()));
    }

    #[test]
    fn negative_indices_resolve_relative_to_end() {
        let soup = PolygonSoup::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        let face = &soup.shapes[0].faces[0];
        assert_eq!(face[0].position, 0);
        assert_eq!(face[2].position, 2);
    }

    #[test]
    fn out_of_range_position_index_is_fatal() {
        let err = PolygonSoup::parse_str("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn malformed_number_is_fatal() {
        let err = PolygonSoup::parse_str("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn unsupported_directives_are_skipped() {
        let src = "mtllib scene.mtl\nusemtl wood\ns off\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let soup = PolygonSoup::parse_str(src).unwrap();
        assert_eq!(soup.shapes[0].faces.len(), 1);
    }

    #[test]
    fn object_directives_split_shapes() {
        let src = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
";
        let soup = PolygonSoup::parse_str(src).unwrap();
        assert_eq!(soup.shapes.len(), 2);
        assert_eq!(soup.shapes[0].name, "first");
        assert_eq!(soup.shapes[1].name, "second");
        assert_eq!(soup.shapes[1].faces[0][0].position, 3);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = PolygonSoup::parse_file("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
