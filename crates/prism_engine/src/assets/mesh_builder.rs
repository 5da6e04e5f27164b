//! Polygon soup to flat-shaded triangle mesh conversion
//!
//! Every face is fan-triangulated and every triangle is emitted with three
//! fresh vertices sharing one flat normal. Normals are oriented outward
//! using each shape's centroid as the interior reference point.

use crate::assets::obj_loader::{PolygonSoup, Shape, VertexRef};
use crate::assets::LoadError;
use crate::render::Vertex;
use std::collections::HashSet;
use std::path::Path;

/// Default normal for triangles whose edge cross product collapses
const DEGENERATE_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Squared-length threshold below which the triangle center is considered
/// coincident with the shape centroid (the in-plane ambiguity case)
const OUT_DIR_EPSILON: f32 = 1e-5;

/// Load an OBJ file and build its flat-shaded vertex and index buffers
///
/// Convenience wrapper over [`PolygonSoup::parse_file`] and
/// [`build_flat_mesh`]; this is the `load(path)` entry point of the
/// geometry pipeline.
pub fn load_flat_mesh<P: AsRef<Path>>(path: P) -> Result<(Vec<Vertex>, Vec<u32>), LoadError> {
    let soup = PolygonSoup::parse_file(path)?;
    build_flat_mesh(&soup)
}

/// Triangulate a polygon soup into interleaved vertices and indices
///
/// For each shape independently:
/// 1. the shape centroid is accumulated in f64 over *unique* referenced
///    position indices (deduplicated by index, not by value);
/// 2. each face with at least 3 vertices is fan-triangulated as
///    `(0, k, k+1)`; smaller faces are skipped as degenerate;
/// 3. each triangle gets a flat normal from its edge cross product,
///    falling back to +Z when the cross product collapses;
/// 4. the normal is flipped to face away from the shape centroid. When the
///    triangle center lies on the centroid (flat, symmetric shapes such as
///    ground planes) the tie is broken by forcing the normal upward.
///
/// Vertices are never shared between triangles, so the flat normal is
/// duplicated across each triangle's three output vertices.
///
/// # Errors
/// [`LoadError::EmptyMesh`] when no triangles survive.
pub fn build_flat_mesh(soup: &PolygonSoup) -> Result<(Vec<Vertex>, Vec<u32>), LoadError> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for shape in &soup.shapes {
        append_shape(soup, shape, &mut vertices, &mut indices);
    }

    if vertices.is_empty() || indices.is_empty() {
        return Err(LoadError::EmptyMesh);
    }

    log::debug!(
        "Built flat mesh: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );
    Ok((vertices, indices))
}

fn append_shape(
    soup: &PolygonSoup,
    shape: &Shape,
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
) {
    let centroid = shape_centroid(soup, shape);

    for face in &shape.faces {
        if face.len() < 3 {
            log::debug!(
                "skipping degenerate face with {} vertices in shape '{}'",
                face.len(),
                shape.name
            );
            continue;
        }

        // Fan triangulation anchored at vertex 0: (0, k, k+1)
        for k in 1..face.len() - 1 {
            let corners = [face[0], face[k], face[k + 1]];
            let p0 = position(soup, corners[0]);
            let p1 = position(soup, corners[1]);
            let p2 = position(soup, corners[2]);

            let normal = oriented_flat_normal(p0, p1, p2, centroid);

            for corner in corners {
                vertices.push(Vertex {
                    position: position(soup, corner),
                    normal,
                    tex_coord: texcoord(soup, corner),
                });
                indices.push((vertices.len() - 1) as u32);
            }
        }
    }
}

/// Arithmetic mean of a shape's unique referenced positions, in f64 to
/// limit accumulation drift on large shapes
fn shape_centroid(soup: &PolygonSoup, shape: &Shape) -> [f32; 3] {
    let mut sum = [0.0f64; 3];
    let mut count = 0u64;
    let mut used = HashSet::new();

    for face in &shape.faces {
        for corner in face {
            if used.insert(corner.position) {
                let p = soup.positions[corner.position];
                sum[0] += f64::from(p[0]);
                sum[1] += f64::from(p[1]);
                sum[2] += f64::from(p[2]);
                count += 1;
            }
        }
    }

    if count == 0 {
        return [0.0; 3];
    }
    let inv = 1.0 / count as f64;
    [
        (sum[0] * inv) as f32,
        (sum[1] * inv) as f32,
        (sum[2] * inv) as f32,
    ]
}

/// Flat normal of the triangle `(p0, p1, p2)`, oriented away from `centroid`
///
/// The centroid flip is a deliberate approximation tuned for the convex and
/// flat shapes this pipeline feeds; it is not a solid-angle-correct winding
/// reconstruction and intentionally stays that way.
fn oriented_flat_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3], centroid: [f32; 3]) -> [f32; 3] {
    let e1 = sub(p1, p0);
    let e2 = sub(p2, p0);
    let cross = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    let mut normal = if len > 0.0 {
        [cross[0] / len, cross[1] / len, cross[2] / len]
    } else {
        DEGENERATE_NORMAL
    };

    let face_center = [
        (p0[0] + p1[0] + p2[0]) / 3.0,
        (p0[1] + p1[1] + p2[1]) / 3.0,
        (p0[2] + p1[2] + p2[2]) / 3.0,
    ];
    let out_dir = sub(face_center, centroid);
    let out_len2 = dot(out_dir, out_dir);

    if out_len2 < OUT_DIR_EPSILON {
        // Triangle center coincides with the shape centroid, so "outward"
        // is undefined. Flat ground-like geometry lands here; bias upward.
        if normal[1] < 0.0 {
            normal = [-normal[0], -normal[1], -normal[2]];
        }
    } else if dot(normal, out_dir) < 0.0 {
        normal = [-normal[0], -normal[1], -normal[2]];
    }

    normal
}

fn position(soup: &PolygonSoup, corner: VertexRef) -> [f32; 3] {
    soup.positions[corner.position]
}

/// Texcoord for a corner; zero when absent or out of range
fn texcoord(soup: &PolygonSoup, corner: VertexRef) -> [f32; 2] {
    corner
        .texcoord
        .and_then(|i| soup.texcoords.get(i).copied())
        .unwrap_or([0.0, 0.0])
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const CUBE: &str = "\
v -1 -1 -1
v  1 -1 -1
v  1  1 -1
v -1  1 -1
v -1 -1  1
v  1 -1  1
v  1  1  1
v -1  1  1
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 4 3 7 8
f 1 4 8 5
f 2 3 7 6
";

    fn soup(src: &str) -> PolygonSoup {
        PolygonSoup::parse_str(src).unwrap()
    }

    #[test]
    fn fan_emits_n_minus_2_triangles() {
        // 6 quads -> 12 triangles -> 36 vertices, no sharing
        let (vertices, indices) = build_flat_mesh(&soup(CUBE)).unwrap();
        assert_eq!(indices.len(), 36);
        assert_eq!(vertices.len(), 36);

        let pentagon = "v 0 0 0\nv 1 0 0\nv 1.5 1 0\nv 0.5 2 0\nv -0.5 1 0\nf 1 2 3 4 5\n";
        let (_, indices) = build_flat_mesh(&soup(pentagon)).unwrap();
        assert_eq!(indices.len(), 3 * 3); // n - 2 = 3 triangles
    }

    #[test]
    fn degenerate_faces_emit_nothing() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\nf 1 2 3\n";
        let (vertices, _) = build_flat_mesh(&soup(src)).unwrap();
        assert_eq!(vertices.len(), 3); // only the triangle survives
    }

    #[test]
    fn all_degenerate_faces_is_empty_mesh() {
        let err = build_flat_mesh(&soup("v 0 0 0\nv 1 0 0\nf 1 2\n")).unwrap_err();
        assert!(matches!(err, LoadError::EmptyMesh));
    }

    #[test]
    fn no_faces_is_empty_mesh() {
        let err = build_flat_mesh(&soup("v 0 0 0\n")).unwrap_err();
        assert!(matches!(err, LoadError::EmptyMesh));
    }

    #[test]
    fn triangle_vertices_share_one_flat_normal() {
        let (vertices, _) = build_flat_mesh(&soup(CUBE)).unwrap();
        for tri in vertices.chunks_exact(3) {
            assert_eq!(tri[0].normal, tri[1].normal);
            assert_eq!(tri[0].normal, tri[2].normal);
        }
    }

    #[test]
    fn cube_normals_point_away_from_centroid() {
        // Unit-length, outward: dot(normal, faceCenter - centroid) >= 0
        let (vertices, _) = build_flat_mesh(&soup(CUBE)).unwrap();
        for tri in vertices.chunks_exact(3) {
            let n = tri[0].normal;
            assert_relative_eq!(dot(n, n).sqrt(), 1.0, epsilon = 1e-5);

            let center = [
                (tri[0].position[0] + tri[1].position[0] + tri[2].position[0]) / 3.0,
                (tri[0].position[1] + tri[1].position[1] + tri[2].position[1]) / 3.0,
                (tri[0].position[2] + tri[1].position[2] + tri[2].position[2]) / 3.0,
            ];
            // Cube centroid is the origin
            assert!(dot(n, center) >= 0.0, "inward normal {n:?} at {center:?}");
        }
    }

    #[test]
    fn unit_square_fans_into_two_triangles_with_plane_normal() {
        // CCW square in the XY plane, in-plane centroid: the upward bias
        // cannot apply (plane normal is +/-Z), so the raw winding normal
        // survives for one fan triangle and the other matches it.
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let (vertices, indices) = build_flat_mesh(&soup(src)).unwrap();
        assert_eq!(indices.len(), 6);
        for v in &vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn flat_ground_triangle_biases_normal_upward() {
        // A single horizontal triangle wound so the raw cross product points
        // down. Its center *is* the shape centroid, so "outward" is
        // undefined and the deliberate vertical-axis policy for ground-like
        // geometry kicks in rather than an arbitrary flip.
        let src = "v 0 0 0\nv 1 0 0\nv 0 0 1\nf 1 2 3\n";
        let (vertices, _) = build_flat_mesh(&soup(src)).unwrap();
        for v in &vertices {
            assert!(v.normal[1] > 0.99, "expected +Y bias, got {:?}", v.normal);
        }
    }

    #[test]
    fn coplanar_centroid_keeps_winding_normal() {
        // For a fanned horizontal quad the triangle centers are offset from
        // the shape centroid, outDir lies in the face plane, and the dot
        // product is zero: the winding normal survives unflipped. The
        // upward bias applies only to the truly coincident case above.
        let src = "v -1 0 -1\nv -1 0 1\nv 1 0 1\nv 1 0 -1\nf 4 3 2 1\n";
        let (vertices, _) = build_flat_mesh(&soup(src)).unwrap();
        for v in &vertices {
            assert!(v.normal[1] < -0.99, "expected raw -Y, got {:?}", v.normal);
        }
    }

    #[test]
    fn colinear_triangle_falls_back_to_default_normal() {
        let src = "v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n";
        let (vertices, _) = build_flat_mesh(&soup(src)).unwrap();
        // Fallback +Z, then the in-plane upward bias leaves it untouched
        assert_eq!(vertices[0].normal, DEGENERATE_NORMAL);
    }

    #[test]
    fn missing_texcoords_emit_zero_uvs() {
        let (vertices, _) =
            build_flat_mesh(&soup("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")).unwrap();
        assert!(vertices.iter().all(|v| v.tex_coord == [0.0, 0.0]));
    }

    #[test]
    fn out_of_range_texcoord_emits_zero_uvs() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/9 3/1\n";
        let (vertices, _) = build_flat_mesh(&soup(src)).unwrap();
        assert_eq!(vertices[1].tex_coord, [0.0, 0.0]);
    }

    #[test]
    fn loading_the_same_file_twice_is_deterministic() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CUBE.as_bytes()).unwrap();

        let (v1, i1) = load_flat_mesh(file.path()).unwrap();
        let (v2, i2) = load_flat_mesh(file.path()).unwrap();
        assert_eq!(i1, i2);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&v1), bytemuck::cast_slice::<_, u8>(&v2));
    }
}
