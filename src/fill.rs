//! Fill resolution: shape fills and the slide background chain.
//!
//! Six fill kinds exist in DrawingML; backgrounds additionally indirect
//! through `a:bgRef` into the theme's format-scheme fill matrices. Image
//! fills dereference their `rId` against the relationship map of whichever
//! part emitted the reference, then read the media from the archive.

use crate::color::{ColorScope, resolve_solid_fill};
use crate::element::{Background, Gradient, GradientStop};
use crate::package::{Relationships, SlideContext};
use crate::units::{GRADIENT_POS_DENOMINATOR, angle_to_degrees};
use crate::xml::Element;

/// Which DrawingML fill a property bag carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FillKind {
    NoFill,
    Solid,
    Gradient,
    Pattern,
    Picture,
    Group,
}

/// Classify the fill child of a property container.
pub(crate) fn fill_kind(node: &Element) -> Option<FillKind> {
    if node.child("a:noFill").is_some() {
        Some(FillKind::NoFill)
    } else if node.child("a:solidFill").is_some() {
        Some(FillKind::Solid)
    } else if node.child("a:gradFill").is_some() {
        Some(FillKind::Gradient)
    } else if node.child("a:pattFill").is_some() {
        Some(FillKind::Pattern)
    } else if node.child("a:blipFill").is_some() {
        Some(FillKind::Picture)
    } else if node.child("a:grpFill").is_some() {
        Some(FillKind::Group)
    } else {
        None
    }
}

/// Which part a fill reference was found on. Selects the relationship map
/// used to dereference `r:embed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FillSource {
    Slide,
    SlideBg,
    LayoutBg,
    MasterBg,
    ThemeBg,
    DiagramBg,
}

/// Relationship map of the part a reference was found on.
pub(crate) fn source_rels<'a>(ctx: &'a SlideContext<'_>, source: FillSource) -> &'a Relationships {
    match source {
        FillSource::Slide | FillSource::SlideBg => &ctx.slide_rels,
        FillSource::LayoutBg => &ctx.layout_rels,
        FillSource::MasterBg => &ctx.master_rels,
        FillSource::ThemeBg => &ctx.pkg.theme_rels,
        FillSource::DiagramBg => &ctx.diagram_rels,
    }
}

/// Resolve an `a:gradFill` into a rotation plus stops sorted ascending by
/// position. The 90 degree offset converts the OOXML gradient angle to the
/// CSS convention.
pub(crate) fn resolve_gradient(grad: &Element, scope: &ColorScope) -> Gradient {
    let mut stops: Vec<(f64, GradientStop)> = Vec::new();
    if let Some(list) = grad.child("a:gsLst") {
        for gs in list.children("a:gs") {
            let pos = gs
                .attr("pos")
                .and_then(|p| p.parse::<f64>().ok())
                .unwrap_or(0.0)
                / GRADIENT_POS_DENOMINATOR;
            let color = resolve_solid_fill(gs, scope).unwrap_or_default();
            stops.push((
                pos,
                GradientStop {
                    pos: format_percent(pos),
                    color,
                },
            ));
        }
    }
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));

    let rot = angle_to_degrees(grad.get(&["a:lin"]).and_then(|l| l.attr_i64("ang"))) + 90;

    Gradient {
        rot,
        colors: stops.into_iter().map(|(_, s)| s).collect(),
    }
}

fn format_percent(pos: f64) -> String {
    if pos.fract() == 0.0 {
        format!("{}%", pos as i64)
    } else {
        format!("{}%", pos)
    }
}

/// Resolve an `a:blipFill` to a data URL via the relationship map of the
/// part the fill came from. Dangling references and vector placeholders
/// resolve to nothing; the caller keeps the element box either way.
pub(crate) fn resolve_image_fill(
    blip_fill: &Element,
    source: FillSource,
    ctx: &SlideContext<'_>,
) -> Option<String> {
    let r_id = blip_fill.child("a:blip").and_then(|b| b.attr("r:embed"))?;
    let Some(rel) = source_rels(ctx, source).get(r_id) else {
        log::warn!("image fill references unknown relationship {}", r_id);
        return None;
    };
    if rel.external {
        return None;
    }
    ctx.media_data_url(&rel.target)
}

/// Walk the background precedence chain: slide `p:bgPr` then `p:bgRef`,
/// then the same two on the layout, then the master. White is the terminal
/// default.
pub(crate) fn resolve_background(ctx: &SlideContext<'_>) -> Background {
    let chain = [
        (&ctx.slide, FillSource::SlideBg),
        (&ctx.layout, FillSource::LayoutBg),
        (&ctx.master, FillSource::MasterBg),
    ];
    for (part, source) in chain {
        let Some(bg) = part.get(&["p:cSld", "p:bg"]) else {
            continue;
        };
        if let Some(props) = bg.child("p:bgPr") {
            if let Some(resolved) = background_from_props(props, source, ctx) {
                return resolved;
            }
        }
        if let Some(style_ref) = bg.child("p:bgRef") {
            if let Some(resolved) = background_from_ref(style_ref, ctx) {
                return resolved;
            }
        }
    }
    Background::Color("#fff".to_string())
}

fn background_from_props(
    props: &Element,
    source: FillSource,
    ctx: &SlideContext<'_>,
) -> Option<Background> {
    let scope = ctx.color_scope(None);
    match fill_kind(props)? {
        FillKind::Solid => {
            let fill = props.child("a:solidFill")?;
            resolve_solid_fill(fill, &scope).map(Background::Color)
        },
        FillKind::Gradient => {
            let grad = props.child("a:gradFill")?;
            Some(Background::Gradient(resolve_gradient(grad, &scope)))
        },
        FillKind::Picture => {
            let blip_fill = props.child("a:blipFill")?;
            resolve_image_fill(blip_fill, source, ctx).map(Background::Image)
        },
        _ => None,
    }
}

/// `a:bgRef` indexes the theme's fill matrices (ECMA-376: 1-999 into
/// `a:fillStyleLst`, 1001 and up into `a:bgFillStyleLst`), with the
/// reference's own scheme color substituted for `phClr` inside the style.
fn background_from_ref(style_ref: &Element, ctx: &SlideContext<'_>) -> Option<Background> {
    let idx: usize = style_ref.attr("idx")?.parse().ok()?;
    if idx == 0 {
        return None;
    }

    let ph_clr = resolve_solid_fill(style_ref, &ctx.color_scope(None));

    let fmt = ctx.theme().get(&["a:themeElements", "a:fmtScheme"])?;
    let style = if idx >= 1001 {
        fmt.child("a:bgFillStyleLst")?.elements().nth(idx - 1001)?
    } else {
        fmt.child("a:fillStyleLst")?.elements().nth(idx - 1)?
    };

    resolve_style_fill(style, ctx, ph_clr.as_deref())
}

fn resolve_style_fill(
    style: &Element,
    ctx: &SlideContext<'_>,
    ph_clr: Option<&str>,
) -> Option<Background> {
    let scope = ctx.color_scope(ph_clr);
    match style.name() {
        "a:solidFill" => resolve_solid_fill(style, &scope).map(Background::Color),
        "a:gradFill" => Some(Background::Gradient(resolve_gradient(style, &scope))),
        "a:blipFill" => resolve_image_fill(style, FillSource::ThemeBg, ctx).map(Background::Image),
        _ => None,
    }
}

/// Resolve a shape's own fill color.
///
/// Precedence: explicit `a:noFill`, then the shape's `a:solidFill`
/// (hex or scheme, with any luminance pair under the color node applied by
/// the modulation chain), then the style matrix reference
/// `p:style/a:fillRef`. Pattern fills surface their foreground color; group
/// fills inherit the enclosing group's fill. Empty means "nothing found".
pub(crate) fn resolve_shape_fill(
    shape: &Element,
    scope: &ColorScope,
    group_fill: Option<&str>,
) -> String {
    if let Some(sp_pr) = shape.child("p:spPr") {
        match fill_kind(sp_pr) {
            Some(FillKind::NoFill) => return "none".to_string(),
            Some(FillKind::Solid) => {
                if let Some(color) = sp_pr
                    .child("a:solidFill")
                    .and_then(|f| resolve_solid_fill(f, scope))
                {
                    return color;
                }
            },
            Some(FillKind::Pattern) => {
                if let Some(color) = sp_pr
                    .get(&["a:pattFill", "a:fgClr"])
                    .and_then(|f| resolve_solid_fill(f, scope))
                {
                    return color;
                }
            },
            Some(FillKind::Group) => {
                return group_fill.unwrap_or("").to_string();
            },
            _ => {},
        }
    }

    shape
        .get(&["p:style", "a:fillRef"])
        .and_then(|r| resolve_solid_fill(r, scope))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element;

    #[test]
    fn classify_fill_kinds() {
        for (xml, expected) in [
            ("<a:noFill/>", FillKind::NoFill),
            ("<a:solidFill/>", FillKind::Solid),
            ("<a:gradFill/>", FillKind::Gradient),
            ("<a:pattFill/>", FillKind::Pattern),
            ("<a:blipFill/>", FillKind::Picture),
            ("<a:grpFill/>", FillKind::Group),
        ] {
            let doc = format!(r#"<p:bgPr xmlns:p="urn:p" xmlns:a="urn:a">{}</p:bgPr>"#, xml);
            let node = Element::parse(doc.as_bytes()).unwrap();
            assert_eq!(fill_kind(&node), Some(expected));
        }
        let empty = Element::parse(br#"<p:bgPr xmlns:p="urn:p"/>"#).unwrap();
        assert_eq!(fill_kind(&empty), None);
    }

    #[test]
    fn gradient_stops_sorted_ascending() {
        let grad = Element::parse(
            br#"<a:gradFill xmlns:a="urn:a"><a:gsLst>
                  <a:gs pos="100000"><a:srgbClr val="000000"/></a:gs>
                  <a:gs pos="0"><a:srgbClr val="FFFFFF"/></a:gs>
                </a:gsLst><a:lin ang="5400000"/></a:gradFill>"#,
        )
        .unwrap();
        let g = resolve_gradient(&grad, &ColorScope::default());
        assert_eq!(g.rot, 180);
        assert_eq!(g.colors.len(), 2);
        assert_eq!(g.colors[0].pos, "0%");
        assert_eq!(g.colors[0].color, "#FFFFFF");
        assert_eq!(g.colors[1].pos, "100%");
        assert_eq!(g.colors[1].color, "#000000");
    }

    #[test]
    fn gradient_rot_defaults_to_90() {
        let grad = Element::parse(
            br#"<a:gradFill xmlns:a="urn:a"><a:gsLst>
                  <a:gs pos="50000"><a:srgbClr val="808080"/></a:gs>
                </a:gsLst></a:gradFill>"#,
        )
        .unwrap();
        let g = resolve_gradient(&grad, &ColorScope::default());
        assert_eq!(g.rot, 90);
        assert_eq!(g.colors[0].pos, "50%");
    }

    #[test]
    fn shape_fill_precedence() {
        let solid = Element::parse(
            br#"<p:sp xmlns:p="urn:p" xmlns:a="urn:a"><p:spPr>
                  <a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>
                </p:spPr></p:sp>"#,
        )
        .unwrap();
        assert_eq!(
            resolve_shape_fill(&solid, &ColorScope::default(), None),
            "#FF0000"
        );

        let none = Element::parse(
            br#"<p:sp xmlns:p="urn:p" xmlns:a="urn:a"><p:spPr><a:noFill/></p:spPr></p:sp>"#,
        )
        .unwrap();
        assert_eq!(resolve_shape_fill(&none, &ColorScope::default(), None), "none");

        let bare = Element::parse(br#"<p:sp xmlns:p="urn:p"><p:spPr/></p:sp>"#).unwrap();
        assert_eq!(resolve_shape_fill(&bare, &ColorScope::default(), None), "");
    }

    #[test]
    fn group_fill_inherits() {
        let grp = Element::parse(
            br#"<p:sp xmlns:p="urn:p" xmlns:a="urn:a"><p:spPr><a:grpFill/></p:spPr></p:sp>"#,
        )
        .unwrap();
        assert_eq!(
            resolve_shape_fill(&grp, &ColorScope::default(), Some("#123456")),
            "#123456"
        );
        assert_eq!(resolve_shape_fill(&grp, &ColorScope::default(), None), "");
    }

    #[test]
    fn pattern_fill_surfaces_foreground() {
        let patt = Element::parse(
            br#"<p:sp xmlns:p="urn:p" xmlns:a="urn:a"><p:spPr>
                  <a:pattFill prst="pct5"><a:fgClr><a:srgbClr val="ABCDEF"/></a:fgClr></a:pattFill>
                </p:spPr></p:sp>"#,
        )
        .unwrap();
        assert_eq!(
            resolve_shape_fill(&patt, &ColorScope::default(), None),
            "#ABCDEF"
        );
    }
}
