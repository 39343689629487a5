//! Triangle mesh loaded from the exporter's PLY output.

use nalgebra::{Point3, Vector3};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geometry::section::Section3D;

#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PLY data: {0}")]
    InvalidData(String),

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },
}

pub type MeshResult<T> = std::result::Result<T, MeshError>;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> MeshResult<Self> {
        for (face_idx, face) in faces.iter().enumerate() {
            for &index in face {
                if index >= vertices.len() {
                    return Err(MeshError::IndexOutOfRange {
                        face: face_idx,
                        index: index as i64,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Loads an ASCII or binary PLY file. Polygonal faces are fan-triangulated.
    pub fn from_ply<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let path = path.as_ref();
        let io_err = |source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader).map_err(io_err)?;

        let mut vertices = Vec::new();
        if let Some(vertex_element) = ply.payload.get("vertex") {
            vertices.reserve(vertex_element.len());
            for vertex in vertex_element {
                let x = scalar_property(vertex, "x")?;
                let y = scalar_property(vertex, "y")?;
                let z = scalar_property(vertex, "z")?;
                vertices.push(Point3::new(x, y, z));
            }
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for (face_idx, face) in face_element.iter().enumerate() {
                let indices = face_indices(face)?;
                for &index in &indices {
                    if index < 0 || index as usize >= vertices.len() {
                        return Err(MeshError::IndexOutOfRange {
                            face: face_idx,
                            index,
                            vertex_count: vertices.len(),
                        });
                    }
                }
                // 多邊形以扇形三角化
                for i in 1..indices.len().saturating_sub(1) {
                    faces.push([
                        indices[0] as usize,
                        indices[i] as usize,
                        indices[i + 1] as usize,
                    ]);
                }
            }
        }

        tracing::debug!(
            "Loaded PLY {}: {} vertices, {} triangles",
            path.display(),
            vertices.len(),
            faces.len()
        );

        Ok(Self { vertices, faces })
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Intersects the mesh with a plane. Returns `None` when no face crosses it.
    pub fn section(&self, plane_origin: &Point3<f64>, plane_normal: &Vector3<f64>) -> Option<Section3D> {
        Section3D::from_mesh(self, plane_origin, plane_normal)
    }
}

fn scalar_property(element: &DefaultElement, name: &str) -> MeshResult<f64> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val as f64),
        Some(Property::Double(val)) => Ok(*val),
        Some(Property::Int(val)) => Ok(*val as f64),
        Some(Property::UInt(val)) => Ok(*val as f64),
        Some(Property::Short(val)) => Ok(*val as f64),
        Some(Property::UShort(val)) => Ok(*val as f64),
        Some(Property::Char(val)) => Ok(*val as f64),
        Some(Property::UChar(val)) => Ok(*val as f64),
        _ => Err(MeshError::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

fn face_indices(face: &DefaultElement) -> MeshResult<Vec<i64>> {
    let property = face
        .get("vertex_indices")
        .or_else(|| face.get("vertex_index"));

    let indices = match property {
        Some(Property::ListInt(list)) => list.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUInt(list)) => list.iter().map(|&i| i as i64).collect(),
        Some(Property::ListShort(list)) => list.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUShort(list)) => list.iter().map(|&i| i as i64).collect(),
        Some(Property::ListChar(list)) => list.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUChar(list)) => list.iter().map(|&i| i as i64).collect(),
        _ => {
            return Err(MeshError::InvalidData(
                "Face element has no vertex_indices list".to_string(),
            ))
        }
    };
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    const QUAD_PLY: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 1
0 1 1
4 0 1 2 3
";

    #[test]
    fn test_load_ascii_ply_triangulates_polygons() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quad.ply");
        std::fs::write(&path, QUAD_PLY).unwrap();

        let mesh = TriangleMesh::from_ply(&path).unwrap();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_bounds() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(-1.0, 2.0, 0.5),
                Point3::new(3.0, -2.0, 1.5),
                Point3::new(0.0, 0.0, -0.5),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let bounds = mesh.bounds().unwrap();
        assert_relative_eq!(bounds.min.z, -0.5);
        assert_relative_eq!(bounds.max.x, 3.0);
        assert_relative_eq!(bounds.extents().y, 4.0);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(TriangleMesh::default().bounds().is_none());
    }

    #[test]
    fn test_face_index_out_of_range() {
        let result = TriangleMesh::new(vec![Point3::origin()], vec![[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::IndexOutOfRange { index: 1, .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = TriangleMesh::from_ply("/nonexistent/mesh.ply");
        assert!(matches!(result, Err(MeshError::Io { .. })));
    }
}
