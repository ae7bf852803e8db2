//! The shape-tree dispatcher.
//!
//! Walks a `p:spTree` in document order and routes each child to its
//! handler: shapes and connectors to the builder, pictures to the media
//! handler, graphic frames to the table/chart/diagram handlers, groups into
//! recursion. `mc:AlternateContent` recurses into its `mc:Fallback` as if
//! it were a group.

pub(crate) mod builder;
pub(crate) mod path;

use crate::chart::build_chart;
use crate::color::resolve_solid_fill;
use crate::element::{self, Frame};
use crate::fill::{FillSource, source_rels};
use crate::geometry::{self, GroupSpace};
use crate::package::SlideContext;
use crate::table::build_table;
use crate::units::{angle_to_degrees, is_external_video_url, mime_for_extension, file_extension};
use crate::xml::Element;

use builder::{BuildOptions, build_shape};

/// Process every child of a shape tree (or group) in document order.
pub(crate) fn process_sp_tree(
    tree: &Element,
    ctx: &SlideContext<'_>,
    source: FillSource,
    group_fill: Option<&str>,
) -> Vec<element::Element> {
    let mut elements = Vec::new();

    for node in tree.elements() {
        match node.name() {
            "p:sp" => elements.push(build_shape(
                node,
                ctx,
                &BuildOptions {
                    source,
                    group_fill,
                    connector: false,
                },
            )),
            "p:cxnSp" => elements.push(build_shape(
                node,
                ctx,
                &BuildOptions {
                    source,
                    group_fill,
                    connector: true,
                },
            )),
            "p:pic" => elements.push(process_picture(node, ctx, source)),
            "p:graphicFrame" => {
                if let Some(el) = process_graphic_frame(node, ctx) {
                    elements.push(el);
                }
            },
            "p:grpSp" => elements.push(process_group(node, ctx, source, group_fill)),
            "mc:AlternateContent" => {
                if let Some(fallback) = node.child("mc:Fallback") {
                    elements.push(process_group(fallback, ctx, source, group_fill));
                }
            },
            // property bags and non-visual wrappers
            _ => {},
        }
    }

    elements
}

/// A group: its own placement plus children re-expressed in the group's
/// child coordinate space. Fills inherit into `a:grpFill` children.
fn process_group(
    node: &Element,
    ctx: &SlideContext<'_>,
    source: FillSource,
    outer_fill: Option<&str>,
) -> element::Element {
    let xfrm = node.get(&["p:grpSpPr", "a:xfrm"]);
    let frame = frame_from_xfrm(xfrm, node);

    let own_fill = node
        .child("p:grpSpPr")
        .and_then(|pr| pr.child("a:solidFill"))
        .and_then(|f| resolve_solid_fill(f, &ctx.color_scope(None)));
    let inherited = own_fill.as_deref().or(outer_fill);

    let mut children = process_sp_tree(node, ctx, source, inherited);

    if let Some(space) = GroupSpace::from_xfrm(xfrm) {
        for child in &mut children {
            space.remap(child.frame_mut());
        }
    }

    element::Element::Group(element::GroupElement {
        frame,
        elements: children,
    })
}

/// A picture: raster image, or embedded/linked audio/video.
fn process_picture(
    node: &Element,
    ctx: &SlideContext<'_>,
    source: FillSource,
) -> element::Element {
    let mut frame = frame_from_xfrm(node.get(&["p:spPr", "a:xfrm"]), node);
    // pictures always state their mirroring, even when false
    frame.is_flip_h.get_or_insert(false);
    frame.is_flip_v.get_or_insert(false);
    let nv_pr = node.get(&["p:nvPicPr", "p:nvPr"]);

    if let Some(link) = nv_pr
        .and_then(|nv| nv.child("a:videoFile"))
        .and_then(|v| v.attr("r:link"))
    {
        return element::Element::Video(media_element(frame, link, ctx, source, true));
    }
    if let Some(link) = nv_pr
        .and_then(|nv| nv.child("a:audioFile"))
        .and_then(|a| a.attr("r:link"))
    {
        return element::Element::Audio(media_element(frame, link, ctx, source, false));
    }

    let src = node
        .child("p:blipFill")
        .and_then(|bf| crate::fill::resolve_image_fill(bf, source, ctx))
        .unwrap_or_default();
    element::Element::Image(element::ImageElement { frame, src })
}

fn media_element(
    frame: Frame,
    r_id: &str,
    ctx: &SlideContext<'_>,
    source: FillSource,
    video: bool,
) -> element::MediaElement {
    let mut media = element::MediaElement {
        frame,
        blob: None,
        src: None,
    };
    let Some(rel) = source_rels(ctx, source).get(r_id) else {
        log::warn!("media references unknown relationship {}", r_id);
        return media;
    };

    if rel.external {
        if !video || is_external_video_url(&rel.target) {
            media.src = Some(rel.target.clone());
        }
        return media;
    }

    let mime = mime_for_extension(file_extension(&rel.target));
    let supported = if video {
        mime.starts_with("video/")
    } else {
        mime.starts_with("audio/")
    };
    if !supported {
        log::warn!("unsupported media extension on {}", rel.target);
        return media;
    }

    media.blob = ctx.media_data_url(&rel.target);
    media
}

/// Route a graphic frame by its payload URI. OLE objects intentionally
/// yield nothing.
fn process_graphic_frame(node: &Element, ctx: &SlideContext<'_>) -> Option<element::Element> {
    let xfrm = node.child("p:xfrm");
    let frame = frame_from_xfrm(xfrm, node);

    let graphic_data = node.get(&["a:graphic", "a:graphicData"])?;
    let uri = graphic_data.attr("uri").unwrap_or("");

    match uri.rsplit('/').next() {
        Some("table") => {
            let tbl = graphic_data.child("a:tbl")?;
            Some(element::Element::Table(build_table(tbl, frame, ctx)))
        },
        Some("chart") => {
            let r_id = graphic_data.child("c:chart").and_then(|c| c.attr("r:id"))?;
            build_chart(r_id, frame, ctx).map(element::Element::Chart)
        },
        Some("diagram") => Some(process_diagram(frame, ctx)),
        Some("ole") => None,
        other => {
            log::debug!("graphic frame with unhandled payload {:?}", other);
            None
        },
    }
}

/// The slide's diagram drawing, flattened through the ordinary shape
/// handler (its `dsp:` prefix was rewritten to `p:` at load time).
fn process_diagram(frame: Frame, ctx: &SlideContext<'_>) -> element::Element {
    let mut elements = Vec::new();
    if let Some(tree) = ctx.diagram.as_ref().and_then(|d| d.child("p:spTree")) {
        for sp in tree.children("p:sp") {
            elements.push(build_shape(
                sp,
                ctx,
                &BuildOptions {
                    source: FillSource::DiagramBg,
                    group_fill: None,
                    connector: false,
                },
            ));
        }
    }
    element::Element::Diagram(element::DiagramElement { frame, elements })
}

/// Placement of a node whose transform sits at the given element (used for
/// pictures, frames and groups, which have no placeholder chain).
fn frame_from_xfrm(xfrm: Option<&Element>, node: &Element) -> Frame {
    let (left, top) = geometry::position(&[xfrm]);
    let (width, height) = geometry::size(&[xfrm]);
    let rotate = angle_to_degrees(xfrm.and_then(|x| x.attr_i64("rot")));
    let flip_h = xfrm.map(|x| x.attr_bool("flipH")).unwrap_or(false);
    let flip_v = xfrm.map(|x| x.attr_bool("flipV")).unwrap_or(false);

    let name = crate::placeholder::nv_props(node)
        .and_then(|nv| nv.child("p:cNvPr"))
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Frame {
        left,
        top,
        width,
        height,
        rotate,
        is_flip_h: flip_h.then_some(true),
        is_flip_v: flip_v.then_some(true),
        name,
    }
}
