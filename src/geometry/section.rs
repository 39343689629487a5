//! Planar cross-sections of a triangle mesh.

use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::collections::{HashMap, HashSet};

use crate::geometry::mesh::TriangleMesh;

/// Distance below which a vertex is treated as lying on the plane.
const PLANE_EPSILON: f64 = 1e-10;
/// Grid used to merge coincident intersection points.
const MERGE_TOLERANCE: f64 = 1e-8;

/// A 3D cross-section: merged vertices plus polylines indexing into them.
#[derive(Debug, Clone)]
pub struct Section3D {
    pub vertices: Vec<Point3<f64>>,
    pub entities: Vec<Vec<usize>>,
    pub plane_origin: Point3<f64>,
    pub plane_normal: Vector3<f64>,
}

/// A cross-section expressed in plane coordinates.
#[derive(Debug, Clone, Default)]
pub struct Section2D {
    pub vertices: Vec<Point2<f64>>,
    pub entities: Vec<Vec<usize>>,
}

impl Section3D {
    pub(crate) fn from_mesh(
        mesh: &TriangleMesh,
        plane_origin: &Point3<f64>,
        plane_normal: &Vector3<f64>,
    ) -> Option<Self> {
        let normal = plane_normal.try_normalize(f64::EPSILON)?;

        let distances: Vec<f64> = mesh
            .vertices
            .iter()
            .map(|v| (v - plane_origin).dot(&normal))
            .collect();

        let mut merger = VertexMerger::default();
        let mut segments: Vec<(usize, usize)> = Vec::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for face in &mesh.faces {
            let Some((a, b)) = intersect_face(mesh, &distances, face) else {
                continue;
            };
            let ia = merger.index_of(a);
            let ib = merger.index_of(b);
            if ia == ib {
                continue;
            }
            // 共享同一條平面上的邊時只保留一次
            let key = (ia.min(ib), ia.max(ib));
            if seen.insert(key) {
                segments.push((ia, ib));
            }
        }

        if segments.is_empty() {
            return None;
        }

        let entities = chain_segments(merger.vertices.len(), &segments);

        Some(Self {
            vertices: merger.vertices,
            entities,
            plane_origin: *plane_origin,
            plane_normal: normal,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.entities.iter().map(|e| e.len().saturating_sub(1)).sum()
    }

    /// Projects onto the section plane. Also returns the plane-to-world transform.
    ///
    /// For a +Z normal the in-plane axes are world X and Y, so 2D coordinates are
    /// the original X/Y with the plane height dropped.
    pub fn to_planar(&self) -> (Section2D, Matrix4<f64>) {
        let (u, v) = plane_basis(&self.plane_normal);
        let origin = self.plane_origin;

        let vertices = self
            .vertices
            .iter()
            .map(|p| {
                let rel = p - origin;
                Point2::new(rel.dot(&u), rel.dot(&v))
            })
            .collect();

        let n = self.plane_normal;
        #[rustfmt::skip]
        let to_3d = Matrix4::new(
            u.x, v.x, n.x, origin.x,
            u.y, v.y, n.y, origin.y,
            u.z, v.z, n.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        );

        (
            Section2D {
                vertices,
                entities: self.entities.clone(),
            },
            to_3d,
        )
    }
}

impl Section2D {
    pub fn bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let mut iter = self.vertices.iter();
        let first = iter.next()?;
        let (mut min, mut max) = (*first, *first);
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates entities as point lists, skipping dangling indices.
    pub fn polylines(&self) -> impl Iterator<Item = Vec<Point2<f64>>> + '_ {
        self.entities.iter().map(move |entity| {
            entity
                .iter()
                .filter_map(|&i| self.vertices.get(i).copied())
                .collect()
        })
    }
}

fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    // Gram-Schmidt against the normal keeps u = X exactly when normal = ±Z
    let u = (reference - normal * normal.dot(&reference)).normalize();
    let v = normal.cross(&u);
    (u, v)
}

fn intersect_face(
    mesh: &TriangleMesh,
    distances: &[f64],
    face: &[usize; 3],
) -> Option<(Point3<f64>, Point3<f64>)> {
    let d = [distances[face[0]], distances[face[1]], distances[face[2]]];
    let on_plane = d.map(|x| x.abs() <= PLANE_EPSILON);

    // 整個面落在平面上不產生線段
    if on_plane.iter().all(|&b| b) {
        return None;
    }

    let mut points: Vec<Point3<f64>> = Vec::with_capacity(3);
    for i in 0..3 {
        if on_plane[i] {
            points.push(mesh.vertices[face[i]]);
        }
    }
    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        if on_plane[i] || on_plane[j] {
            continue;
        }
        if d[i] * d[j] < 0.0 {
            let a = mesh.vertices[face[i]];
            let b = mesh.vertices[face[j]];
            let t = d[i] / (d[i] - d[j]);
            points.push(a + (b - a) * t);
        }
    }

    if points.len() == 2 {
        Some((points[0], points[1]))
    } else {
        None
    }
}

#[derive(Default)]
struct VertexMerger {
    vertices: Vec<Point3<f64>>,
    lookup: HashMap<(i64, i64, i64), usize>,
}

impl VertexMerger {
    fn index_of(&mut self, p: Point3<f64>) -> usize {
        let key = (
            (p.x / MERGE_TOLERANCE).round() as i64,
            (p.y / MERGE_TOLERANCE).round() as i64,
            (p.z / MERGE_TOLERANCE).round() as i64,
        );
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.vertices.len();
        self.vertices.push(p);
        self.lookup.insert(key, index);
        index
    }
}

/// Joins segments sharing endpoints into polylines. Closed loops repeat their first index.
fn chain_segments(vertex_count: usize, segments: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];
    for (idx, &(a, b)) in segments.iter().enumerate() {
        incident[a].push(idx);
        incident[b].push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut entities = Vec::new();

    let walk = |start: usize, used: &mut Vec<bool>| -> Vec<usize> {
        let mut path = vec![start];
        let mut current = start;
        while let Some(&edge) = incident[current].iter().find(|&&e| !used[e]) {
            used[edge] = true;
            let (a, b) = segments[edge];
            current = if a == current { b } else { a };
            path.push(current);
            if current == start {
                break;
            }
        }
        path
    };

    // 先從端點（度數不為 2）出發走開放折線，再處理剩下的閉合環
    for vertex in 0..vertex_count {
        if incident[vertex].len() != 2 {
            while incident[vertex].iter().any(|&e| !used[e]) {
                entities.push(walk(vertex, &mut used));
            }
        }
    }
    for edge in 0..segments.len() {
        if !used[edge] {
            entities.push(walk(segments[edge].0, &mut used));
        }
    }

    entities
}
