//! Outline and outer-shadow resolution.

use crate::color::{ColorScope, resolve_solid_fill};
use crate::element::{Border, Shadow};
use crate::units::{angle_to_degrees, emu_to_pt};
use crate::xml::Element;

/// Resolve a shape's border from `p:spPr/a:ln`, falling back to the style
/// matrix reference `p:style/a:lnRef` for the color.
pub(crate) fn resolve_border(shape: &Element, scope: &ColorScope) -> Border {
    let ln = shape.get(&["p:spPr", "a:ln"]);

    let mut width = ln
        .and_then(|l| l.attr_i64("w"))
        .map(emu_to_pt)
        .unwrap_or(0.0);
    if width < 0.0 {
        width = 0.0;
    }

    let color = ln
        .and_then(|l| l.child("a:solidFill"))
        .and_then(|f| resolve_solid_fill(f, scope))
        .or_else(|| {
            shape
                .get(&["p:style", "a:lnRef"])
                .and_then(|r| resolve_solid_fill(r, scope))
        })
        .unwrap_or_default();

    let dash = ln
        .and_then(|l| l.child("a:prstDash"))
        .and_then(|d| d.attr("val"))
        .unwrap_or("solid");
    let (border_type, dasharray) = dash_style(dash);

    Border {
        border_color: color,
        border_width: width,
        border_type: border_type.to_string(),
        border_stroke_dasharray: dasharray.to_string(),
    }
}

/// Map an ECMA preset line dash onto a CSS border style plus an SVG
/// stroke-dasharray. Unknown presets pass the raw name through as the type.
fn dash_style(preset: &str) -> (&str, &'static str) {
    match preset {
        "solid" => ("solid", "0"),
        "dash" => ("dashed", "5"),
        "dashDot" => ("dashed", "5, 5, 1, 5"),
        "dot" => ("dotted", "1, 5"),
        "lgDash" => ("dashed", "10, 5"),
        "lgDashDot" => ("dashed", "10, 5, 1, 5"),
        "lgDashDotDot" => ("dashed", "10, 5, 1, 5, 1, 5"),
        "sysDash" => ("dashed", "5, 2"),
        "sysDashDot" => ("dashed", "5, 2, 1, 5"),
        "sysDashDotDot" => ("dashed", "5, 2, 1, 5, 1, 5"),
        "sysDot" => ("dotted", "2, 5"),
        other => (other, "0"),
    }
}

/// Resolve `a:effectLst/a:outerShdw` into offset/blur/color, offsets being
/// the distance projected along the direction angle.
pub(crate) fn resolve_shadow(shape: &Element, scope: &ColorScope) -> Option<Shadow> {
    let shdw = shape.get(&["p:spPr", "a:effectLst", "a:outerShdw"])?;

    let dist = shdw.attr_i64("dist").map(emu_to_pt).unwrap_or(0.0);
    let dir = angle_to_degrees(shdw.attr_i64("dir")) as f64;
    let blur = shdw.attr_i64("blurRad").map(emu_to_pt).unwrap_or(0.0);
    let color = resolve_solid_fill(shdw, scope).unwrap_or_else(|| "#000000".to_string());

    let rad = dir.to_radians();
    Some(Shadow {
        h: dist * rad.cos(),
        v: dist * rad.sin(),
        blur,
        color,
    })
}
