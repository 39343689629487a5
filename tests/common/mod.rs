#![allow(dead_code)]

use std::path::Path;

/// Unit cube, z from 0 to 1, written as quads.
pub const CUBE_PLY: &str = "ply
format ascii 1.0
element vertex 8
property float x
property float y
property float z
element face 6
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
0 0 1
1 0 1
1 1 1
0 1 1
4 0 3 2 1
4 4 5 6 7
4 0 1 5 4
4 1 2 6 5
4 2 3 7 6
4 3 0 4 7
";

pub fn write_cube(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, CUBE_PLY).unwrap();
}

/// Creates `<root>/data/colmap/sparse/0`.
pub fn create_dataset(root: &Path) {
    std::fs::create_dir_all(root.join("data").join("colmap/sparse/0")).unwrap();
}

pub fn pipeline_toml(root: &Path, extra: &str) -> String {
    format!(
        "[pipeline]\nname = 'test-room'\ndata_dir = '{}'\noutput_dir = '{}'\n{}",
        root.join("data").display(),
        root.join("output").display(),
        extra
    )
}

/// Every tag closes with `>`, attribute quotes pair up, each `<path>` is
/// self-closed and sits inside the single root `<svg>` element.
pub fn assert_well_formed_svg(svg: &str) {
    let body = svg.trim();
    assert!(body.starts_with("<?xml"), "missing XML declaration");
    assert!(body.ends_with("</svg>"), "root element not closed last");
    assert_eq!(body.matches("<svg").count(), 1);
    assert_eq!(body.matches("</svg>").count(), 1);

    let root_open = body.find("<svg").unwrap();
    let root_close = body.find("</svg>").unwrap();
    for segment in body.split('<').skip(1) {
        let end = segment
            .find('>')
            .unwrap_or_else(|| panic!("unterminated tag: <{}", segment));
        let tag = &segment[..end];
        assert_eq!(tag.matches('"').count() % 2, 0, "unbalanced quotes in <{}>", tag);
        assert!(
            segment[end + 1..].trim().is_empty(),
            "text outside tags after <{}>",
            tag
        );
        if tag.starts_with("path") {
            assert!(tag.ends_with('/'), "path not self-closed: <{}>", tag);
        }
    }
    for (index, _) in body.match_indices("<path") {
        assert!(root_open < index && index < root_close, "path outside <svg>");
    }
}
