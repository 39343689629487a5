//! Mesh to floor plan: slice above the lowest point, write SVG, rasterize PNG.

pub mod raster;
pub mod svg;

use nalgebra::{Point3, Vector3};
use std::path::Path;

use crate::domain::model::{FloorplanOutputs, FloorplanSettings};
use crate::geometry::mesh::TriangleMesh;
use crate::utils::error::{FloorplanError, Result};

pub const SVG_FILE_NAME: &str = "floorplan.svg";
pub const PNG_FILE_NAME: &str = "floorplan.png";

pub struct FloorplanRenderer {
    settings: FloorplanSettings,
}

impl FloorplanRenderer {
    pub fn new(settings: FloorplanSettings) -> Self {
        Self { settings }
    }

    pub fn render(&self, mesh_path: &Path, output_dir: &Path) -> Result<FloorplanOutputs> {
        std::fs::create_dir_all(output_dir)?;

        tracing::info!("Loading mesh from: {}", mesh_path.display());
        let mesh = TriangleMesh::from_ply(mesh_path)?;
        self.render_mesh(&mesh, output_dir)
    }

    pub fn render_mesh(&self, mesh: &TriangleMesh, output_dir: &Path) -> Result<FloorplanOutputs> {
        std::fs::create_dir_all(output_dir)?;

        let bounds = mesh.bounds().ok_or_else(|| FloorplanError::Rasterization {
            message: "mesh has no vertices".to_string(),
        })?;
        tracing::info!("Mesh bounds: min {}, max {}", bounds.min, bounds.max);
        tracing::info!("Mesh has {} vertices", mesh.vertices.len());

        let slice_height = bounds.min.z + self.settings.slice_offset;
        tracing::info!("Slicing at height: {}", slice_height);

        let section = mesh
            .section(&Point3::new(0.0, 0.0, slice_height), &Vector3::z())
            .ok_or(FloorplanError::NoValidSlice {
                height: slice_height,
            })?;
        tracing::info!(
            "✓ Slice created successfully ({} segments in {} entities)",
            section.segment_count(),
            section.entities.len()
        );

        let (planar, to_3d) = section.to_planar();

        let svg_path = output_dir.join(SVG_FILE_NAME);
        svg::write_svg(&planar, &svg_path)?;
        tracing::info!("✓ SVG saved: {}", svg_path.display());

        let png_path = output_dir.join(PNG_FILE_NAME);
        let canvas = raster::rasterize(&planar, &self.settings);
        canvas.save(&png_path)?;
        tracing::info!("✓ PNG saved: {}", png_path.display());

        Ok(FloorplanOutputs {
            directory: output_dir.to_path_buf(),
            svg_path,
            png_path,
            slice_height,
            mesh_vertex_count: mesh.vertices.len(),
            section_vertex_count: planar.vertices.len(),
            entity_count: planar.entities.len(),
            plane_to_world: std::array::from_fn(|row| std::array::from_fn(|col| to_3d[(row, col)])),
        })
    }
}
