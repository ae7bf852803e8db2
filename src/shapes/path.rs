//! Custom geometry (`a:custGeom`) to SVG path conversion.
//!
//! Path commands are defined in the path's own coordinate space (`a:path`
//! `w`/`h`); every point is scaled into the element's extent in points.
//! Paths without a declared space fall back to EMU coordinates.

use crate::units::emu_to_pt;
use crate::xml::Element;

/// Convert an `a:custGeom` to an SVG path string for an element of the
/// given size (points). Unknown commands are skipped, keeping the rest of
/// the outline usable.
pub(crate) fn custom_path(cust_geom: &Element, width: f64, height: f64) -> String {
    let mut out = String::new();
    let Some(path_list) = cust_geom.child("a:pathLst") else {
        return out;
    };

    for path in path_list.children("a:path") {
        let sx = scale(path.attr_i64("w"), width);
        let sy = scale(path.attr_i64("h"), height);
        let mut cursor = (0.0, 0.0);

        for cmd in path.elements() {
            match cmd.name() {
                "a:moveTo" => {
                    if let Some(p) = point(cmd, 0, sx, sy) {
                        push(&mut out, 'M', &[p.0, p.1]);
                        cursor = p;
                    }
                },
                "a:lnTo" => {
                    if let Some(p) = point(cmd, 0, sx, sy) {
                        push(&mut out, 'L', &[p.0, p.1]);
                        cursor = p;
                    }
                },
                "a:cubicBezTo" => {
                    if let (Some(c1), Some(c2), Some(p)) = (
                        point(cmd, 0, sx, sy),
                        point(cmd, 1, sx, sy),
                        point(cmd, 2, sx, sy),
                    ) {
                        push(&mut out, 'C', &[c1.0, c1.1, c2.0, c2.1, p.0, p.1]);
                        cursor = p;
                    }
                },
                "a:quadBezTo" => {
                    if let (Some(c), Some(p)) = (point(cmd, 0, sx, sy), point(cmd, 1, sx, sy)) {
                        push(&mut out, 'Q', &[c.0, c.1, p.0, p.1]);
                        cursor = p;
                    }
                },
                "a:arcTo" => {
                    if let Some((end, rx, ry, large, sweep)) = arc(cmd, cursor, sx, sy) {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(&format!(
                            "A {} {} 0 {} {} {} {}",
                            fmt(rx),
                            fmt(ry),
                            large as u8,
                            sweep as u8,
                            fmt(end.0),
                            fmt(end.1)
                        ));
                        cursor = end;
                    }
                },
                "a:close" => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push('Z');
                },
                _ => {},
            }
        }
    }

    out
}

fn scale(space: Option<i64>, target: f64) -> f64 {
    match space {
        Some(w) if w > 0 => target / w as f64,
        // no declared coordinate space: treat the values as EMU
        _ => emu_to_pt(1),
    }
}

fn point(cmd: &Element, n: usize, sx: f64, sy: f64) -> Option<(f64, f64)> {
    let pt = cmd.children("a:pt").nth(n)?;
    let x = pt.attr_i64("x")? as f64 * sx;
    let y = pt.attr_i64("y")? as f64 * sy;
    Some((x, y))
}

/// Elliptical arc: the current point sits at `stAng` on the ellipse; the
/// end point is `swAng` further along. Angles are 60,000ths of a degree.
fn arc(cmd: &Element, cursor: (f64, f64), sx: f64, sy: f64) -> Option<((f64, f64), f64, f64, bool, bool)> {
    let rx = cmd.attr_i64("wR")? as f64 * sx;
    let ry = cmd.attr_i64("hR")? as f64 * sy;
    let st = cmd.attr_i64("stAng")? as f64 / 60_000.0;
    let sw = cmd.attr_i64("swAng")? as f64 / 60_000.0;

    let st_rad = st.to_radians();
    let end_rad = (st + sw).to_radians();
    let center = (
        cursor.0 - rx * st_rad.cos(),
        cursor.1 - ry * st_rad.sin(),
    );
    let end = (
        center.0 + rx * end_rad.cos(),
        center.1 + ry * end_rad.sin(),
    );
    Some((end, rx, ry, sw.abs() > 180.0, sw > 0.0))
}

fn push(out: &mut String, op: char, nums: &[f64]) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push(op);
    for n in nums {
        out.push(' ');
        out.push_str(&fmt(*n));
    }
}

fn fmt(n: f64) -> String {
    let rounded = (n * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
