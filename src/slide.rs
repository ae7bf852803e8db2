//! Per-slide pipeline: load the part chain, resolve the background, walk
//! the shape tree.

use crate::element::Slide;
use crate::error::Result;
use crate::fill::{FillSource, resolve_background};
use crate::package::Package;
use crate::shapes::process_sp_tree;

/// Convert one slide part into its emitted record. Failures loading the
/// part chain abort the parse; data-level problems inside the slide recover
/// per element.
pub(crate) fn process_slide(pkg: &Package, slide_path: &str) -> Result<Slide> {
    log::debug!("processing {}", slide_path);
    let ctx = pkg.slide_context(slide_path)?;

    let fill = resolve_background(&ctx);
    let elements = ctx
        .sp_tree()
        .map(|tree| process_sp_tree(tree, &ctx, FillSource::Slide, None))
        .unwrap_or_default();

    let name = ctx
        .slide
        .child("p:cSld")
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(Slide {
        fill,
        elements,
        name,
    })
}
