//! SVG polygon mask in native pixel space.

use georef_core::{ImageSize, Pt2};

use crate::error::AnnotationError;

/// `<svg width="W" height="H"><polygon points="x1,y1 x2,y2 ..."/></svg>`,
/// coordinates with two decimals.
pub fn svg_polygon(size: ImageSize, points: &[Pt2]) -> String {
    let pts = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"<svg width="{}" height="{}"><polygon points="{pts}"/></svg>"#,
        size.width, size.height
    )
}

/// Read the vertex list back from a polygon selector.
pub fn parse_svg_polygon(svg: &str) -> Result<Vec<Pt2>, AnnotationError> {
    let malformed = |what: &str| AnnotationError::MalformedSelector(what.to_string());

    let start = svg
        .find("points=\"")
        .ok_or_else(|| malformed("no polygon points attribute"))?
        + "points=\"".len();
    let len = svg[start..]
        .find('"')
        .ok_or_else(|| malformed("unterminated points attribute"))?;

    svg[start..start + len]
        .split_whitespace()
        .map(|pair| -> Result<Pt2, AnnotationError> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| malformed(pair))?;
            let x = x.parse::<f64>().map_err(|_| malformed(pair))?;
            let y = y.parse::<f64>().map_err(|_| malformed(pair))?;
            Ok(Pt2::new(x, y))
        })
        .collect()
}
