//! Shape record synthesis.
//!
//! Combines placeholder-inherited geometry, fill, border, shadow and the
//! rendered text body into the final `shape`/`text` record. Classification
//! follows the geometry: a custom outline is always a shape, a preset
//! outline on a plain object is a shape, and everything else renders as a
//! text box.

use crate::border::{resolve_border, resolve_shadow};
use crate::element::{self, Frame};
use crate::fill::{FillSource, resolve_shape_fill};
use crate::geometry;
use crate::package::SlideContext;
use crate::placeholder::{nv_props, placeholder_ref};
use crate::shapes::path::custom_path;
use crate::text::{TextBodyArgs, build_text_body, is_vertical, v_align};
use crate::units::angle_to_degrees;
use crate::xml::Element;

pub(crate) struct BuildOptions<'a> {
    pub source: FillSource,
    pub group_fill: Option<&'a str>,
    /// Connector shapes (`p:cxnSp`) carry no text and never classify as
    /// text boxes.
    pub connector: bool,
}

pub(crate) fn build_shape(
    node: &Element,
    ctx: &SlideContext<'_>,
    opts: &BuildOptions<'_>,
) -> element::Element {
    // Placeholder resolution: the slide shape's type/idx select the
    // matching layout and master nodes that provide fallbacks.
    let ph = placeholder_ref(node);
    let ph_type = ph.and_then(|p| p.attr("type"));
    let ph_idx = ph.and_then(|p| p.attr("idx"));
    let layout_ph = ctx.layout_index.find(ph_type, ph_idx);
    let master_ph = ctx.master_index.find(ph_type, ph_idx);

    let resolved_type: String = ph_type
        .map(str::to_string)
        .or_else(|| {
            let tx_box = nv_props(node)
                .and_then(|nv| nv.child("p:cNvSpPr"))
                .map(|c| c.attr_bool("txBox"))
                .unwrap_or(false);
            tx_box.then(|| "text".to_string())
        })
        .or_else(|| {
            [layout_ph, master_ph]
                .into_iter()
                .flatten()
                .find_map(|n| placeholder_ref(n).and_then(|p| p.attr("type")))
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if opts.source == FillSource::DiagramBg {
                "diagram".to_string()
            } else {
                "obj".to_string()
            }
        });

    // Geometry through the chain; rotation and flips come from the first
    // transform that exists.
    let slide_xfrm = node.get(&["p:spPr", "a:xfrm"]);
    let layout_xfrm = layout_ph.and_then(|n| n.get(&["p:spPr", "a:xfrm"]));
    let master_xfrm = master_ph.and_then(|n| n.get(&["p:spPr", "a:xfrm"]));
    let chain = [slide_xfrm, layout_xfrm, master_xfrm];

    let (left, top) = geometry::position(&chain);
    let (width, height) = geometry::size(&chain);
    let active_xfrm = chain.into_iter().flatten().next();
    let rotate = angle_to_degrees(active_xfrm.and_then(|x| x.attr_i64("rot")));
    let flip_h = active_xfrm.map(|x| x.attr_bool("flipH")).unwrap_or(false);
    let flip_v = active_xfrm.map(|x| x.attr_bool("flipV")).unwrap_or(false);

    let name = nv_props(node)
        .and_then(|nv| nv.child("p:cNvPr"))
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let frame = Frame {
        left,
        top,
        width,
        height,
        rotate,
        is_flip_h: flip_h.then_some(true),
        is_flip_v: flip_v.then_some(true),
        name,
    };

    let scope = ctx.color_scope(None);
    let fill_color = resolve_shape_fill(node, &scope, opts.group_fill);
    let border = resolve_border(node, &scope);
    let shadow = resolve_shadow(node, &scope);

    let content = node.child("p:txBody").map(|body| {
        let args = TextBodyArgs {
            layout_ph,
            master_ph,
            ph_type: Some(resolved_type.as_str()),
        };
        build_text_body(body, &args, ctx)
    });

    let prst_geom = node
        .get(&["p:spPr", "a:prstGeom"])
        .and_then(|g| g.attr("prst"));
    let cust_geom = node.get(&["p:spPr", "a:custGeom"]);

    if let Some(cust) = cust_geom {
        if resolved_type != "diagram" {
            return element::Element::Shape(element::ShapeElement {
                frame,
                shape_type: "custom".to_string(),
                path: Some(custom_path(cust, width, height)),
                fill_color,
                border,
                shadow,
                content,
            });
        }
    }

    let plain_object = resolved_type == "obj" || opts.connector;
    if let Some(prst) = prst_geom {
        if plain_object {
            return element::Element::Shape(element::ShapeElement {
                frame,
                shape_type: prst.to_string(),
                path: None,
                fill_color,
                border,
                shadow,
                content,
            });
        }
    }

    // Connectors are shapes even when the file spells out no geometry at
    // all; a bare connection defaults to a line.
    if opts.connector {
        return element::Element::Shape(element::ShapeElement {
            frame,
            shape_type: "line".to_string(),
            path: None,
            fill_color,
            border,
            shadow,
            content,
        });
    }

    // Everything else renders as text: placeholders, text boxes, diagram
    // nodes. Text rotation may differ from the box rotation when the shape
    // carries its own text transform.
    let text_rotate = match node.child("p:txXfrm").and_then(|x| x.attr_i64("rot")) {
        Some(rot) => angle_to_degrees(Some(rot)) + 90,
        None => rotate,
    };
    let body = node.child("p:txBody");
    element::Element::Text(element::TextElement {
        frame: Frame {
            rotate: text_rotate,
            ..frame
        },
        fill_color,
        border,
        shadow,
        content: content.unwrap_or_default(),
        is_vertical: body.map(is_vertical).unwrap_or(false),
        v_align: body.and_then(v_align).map(str::to_string),
    })
}
