mod common;

use common::{assert_well_formed_svg, write_cube};
use nerf_floorplan::domain::model::FloorplanSettings;
use nerf_floorplan::{FloorplanError, FloorplanRenderer};
use tempfile::TempDir;

#[test]
fn test_render_cube_floorplan() {
    let temp_dir = TempDir::new().unwrap();
    let mesh_path = temp_dir.path().join("cube.ply");
    write_cube(&mesh_path);
    let output_dir = temp_dir.path().join("plan");

    let renderer = FloorplanRenderer::new(FloorplanSettings {
        image_size: 400,
        line_width: 3,
        ..FloorplanSettings::default()
    });
    let outputs = renderer.render(&mesh_path, &output_dir).unwrap();

    assert_eq!(outputs.mesh_vertex_count, 8);
    // 四個角點加上每個側面對角線的交點
    assert_eq!(outputs.section_vertex_count, 8);
    assert_eq!(outputs.entity_count, 1);

    // 平面座標加上切片高度即回到網格座標
    let to_world = outputs.plane_to_world;
    assert_eq!(to_world[0][..3], [1.0, 0.0, 0.0]);
    assert_eq!(to_world[1][..3], [0.0, 1.0, 0.0]);
    assert!((to_world[2][3] - outputs.slice_height).abs() < 1e-12);
    assert_eq!(to_world[3], [0.0, 0.0, 0.0, 1.0]);

    assert_well_formed_svg(&std::fs::read_to_string(&outputs.svg_path).unwrap());

    let png = image::open(&outputs.png_path).unwrap().to_rgb8();
    assert_eq!(png.dimensions(), (400, 400));
    // 邊界在 margin 處，中心保持空白
    assert_eq!(png.get_pixel(200, 200).0, [255, 255, 255]);
    assert_eq!(png.get_pixel(50, 200).0, [0, 0, 0]);
}

#[test]
fn test_slice_above_mesh_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mesh_path = temp_dir.path().join("cube.ply");
    write_cube(&mesh_path);
    let output_dir = temp_dir.path().join("plan");

    let renderer = FloorplanRenderer::new(FloorplanSettings {
        slice_offset: 5.0,
        ..FloorplanSettings::default()
    });
    let result = renderer.render(&mesh_path, &output_dir);

    assert!(matches!(result, Err(FloorplanError::NoValidSlice { .. })));
    assert!(!output_dir.join("floorplan.png").exists());
    assert!(!output_dir.join("floorplan.svg").exists());
}

#[test]
fn test_corrupt_mesh_is_mesh_error() {
    let temp_dir = TempDir::new().unwrap();
    let mesh_path = temp_dir.path().join("broken.ply");
    std::fs::write(&mesh_path, "not a ply file").unwrap();

    let renderer = FloorplanRenderer::new(FloorplanSettings::default());
    let result = renderer.render(&mesh_path, temp_dir.path());

    assert!(matches!(result, Err(FloorplanError::Mesh(_))));
}
