//! SVG serialization of a planar section, independent of the bitmap path.

use std::fmt::Write as _;
use std::path::Path;

use crate::geometry::section::Section2D;
use crate::utils::error::Result;

/// Renders one `<path>` per entity in section coordinates.
pub fn section_to_svg(section: &Section2D) -> String {
    let (min_x, min_y, width, height) = match section.bounds() {
        Some((min, max)) => (min.x, min.y, max.x - min.x, max.y - min.y),
        None => (0.0, 0.0, 0.0, 0.0),
    };
    // 退化軸給一個最小寬度，避免 viewBox 為零
    let extent = width.max(height).max(1e-9);
    let width = width.max(extent * 1e-3);
    let height = height.max(extent * 1e-3);
    let stroke = extent / 500.0;

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.6}" height="{height:.6}" viewBox="{min_x:.6} {min_y:.6} {width:.6} {height:.6}">"#
    );

    for points in section.polylines() {
        if points.len() < 2 {
            continue;
        }
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{}{:.6},{:.6} ", command, p.x, p.y);
        }
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="none" stroke="black" stroke-width="{:.6}"/>"#,
            d.trim_end(),
            stroke
        );
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn write_svg(section: &Section2D, path: &Path) -> Result<()> {
    std::fs::write(path, section_to_svg(section))?;
    Ok(())
}
