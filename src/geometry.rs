//! Position and size resolution.
//!
//! A shape's transform may live on the shape itself or anywhere up the
//! placeholder chain (slide, then layout, then master); for each axis the
//! first `a:xfrm` that provides the value wins. Group shapes additionally
//! define a child coordinate space that their children must be re-expressed
//! in.

use crate::element::Frame;
use crate::units::emu_to_pt;
use crate::xml::Element;

/// `a:off` of an `a:xfrm`, in points.
pub(crate) fn offset(xfrm: Option<&Element>) -> Option<(f64, f64)> {
    let off = xfrm?.child("a:off")?;
    Some((
        emu_to_pt(off.attr_i64("x")?),
        emu_to_pt(off.attr_i64("y")?),
    ))
}

/// `a:ext` of an `a:xfrm`, in points.
pub(crate) fn extent(xfrm: Option<&Element>) -> Option<(f64, f64)> {
    let ext = xfrm?.child("a:ext")?;
    Some((
        emu_to_pt(ext.attr_i64("cx")?),
        emu_to_pt(ext.attr_i64("cy")?),
    ))
}

/// Resolve a position through the inheritance chain; the first transform
/// providing an offset wins, missing everywhere reads as the origin.
pub(crate) fn position(chain: &[Option<&Element>]) -> (f64, f64) {
    chain
        .iter()
        .find_map(|xfrm| offset(*xfrm))
        .unwrap_or((0.0, 0.0))
}

/// Resolve a size through the inheritance chain, analogous to [`position`].
pub(crate) fn size(chain: &[Option<&Element>]) -> (f64, f64) {
    chain
        .iter()
        .find_map(|xfrm| extent(*xfrm))
        .unwrap_or((0.0, 0.0))
}

/// A group's child coordinate system: scale factors from child extent to
/// group extent, plus the child-space origin. All values in points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupSpace {
    sx: f64,
    sy: f64,
    ch_x: f64,
    ch_y: f64,
}

impl GroupSpace {
    /// Build from a group's `a:xfrm`. Degenerate child extents fall back to
    /// scale 1 so a malformed group passes children through unscaled.
    pub(crate) fn from_xfrm(xfrm: Option<&Element>) -> Option<GroupSpace> {
        let xfrm = xfrm?;
        let (cx, cy) = extent(Some(xfrm)).unwrap_or((0.0, 0.0));
        let ch = xfrm.child("a:chExt");
        let (chcx, chcy) = match ch {
            Some(e) => (
                emu_to_pt(e.attr_i64("cx").unwrap_or(0)),
                emu_to_pt(e.attr_i64("cy").unwrap_or(0)),
            ),
            None => (0.0, 0.0),
        };
        let (ch_x, ch_y) = match xfrm.child("a:chOff") {
            Some(e) => (
                emu_to_pt(e.attr_i64("x").unwrap_or(0)),
                emu_to_pt(e.attr_i64("y").unwrap_or(0)),
            ),
            None => (0.0, 0.0),
        };
        let sx = if chcx > 0.0 { cx / chcx } else { 1.0 };
        let sy = if chcy > 0.0 { cy / chcy } else { 1.0 };
        Some(GroupSpace { sx, sy, ch_x, ch_y })
    }

    /// Re-express a child's placement in the group's frame. Rotation, flips
    /// and colors are untouched.
    pub(crate) fn remap(&self, frame: &mut Frame) {
        frame.left = (frame.left - self.ch_x) * self.sx;
        frame.top = (frame.top - self.ch_y) * self.sy;
        frame.width *= self.sx;
        frame.height *= self.sy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element;

    fn xfrm(body: &str) -> Element {
        Element::parse(format!(r#"<a:xfrm xmlns:a="urn:a">{}</a:xfrm>"#, body).as_bytes()).unwrap()
    }

    #[test]
    fn first_offset_in_chain_wins() {
        let slide = xfrm(r#"<a:off x="914400" y="914400"/><a:ext cx="914400" cy="457200"/>"#);
        let layout = xfrm(r#"<a:off x="0" y="0"/><a:ext cx="1" cy="1"/>"#);
        let (left, top) = position(&[Some(&slide), Some(&layout), None]);
        assert_eq!((left, top), (72.0, 72.0));
        let (w, h) = size(&[Some(&slide), Some(&layout), None]);
        assert_eq!((w, h), (72.0, 36.0));
    }

    #[test]
    fn falls_back_through_chain() {
        let layout = xfrm(r#"<a:off x="12700" y="25400"/>"#);
        let (left, top) = position(&[None, Some(&layout), None]);
        assert_eq!((left, top), (1.0, 2.0));
    }

    #[test]
    fn missing_everywhere_is_zero() {
        assert_eq!(position(&[None, None, None]), (0.0, 0.0));
        assert_eq!(size(&[None, None, None]), (0.0, 0.0));
    }

    #[test]
    fn group_remap_scales_and_translates() {
        // ext 2000x1000, chExt 1000x500: children double in both axes
        let g = xfrm(
            r#"<a:off x="0" y="0"/><a:ext cx="2000" cy="1000"/>
               <a:chOff x="0" y="0"/><a:chExt cx="1000" cy="500"/>"#,
        );
        let space = GroupSpace::from_xfrm(Some(&g)).unwrap();
        let mut frame = Frame {
            left: emu_to_pt(500),
            top: emu_to_pt(250),
            width: emu_to_pt(100),
            height: emu_to_pt(100),
            ..Default::default()
        };
        space.remap(&mut frame);
        assert_eq!(frame.left, emu_to_pt(1000));
        assert_eq!(frame.top, emu_to_pt(500));
        assert_eq!(frame.width, emu_to_pt(200));
        assert_eq!(frame.height, emu_to_pt(200));
    }

    #[test]
    fn identity_child_space_is_identity() {
        let g = xfrm(
            r#"<a:off x="100" y="100"/><a:ext cx="1000" cy="500"/>
               <a:chOff x="100" y="100"/><a:chExt cx="1000" cy="500"/>"#,
        );
        let space = GroupSpace::from_xfrm(Some(&g)).unwrap();
        let mut frame = Frame {
            left: emu_to_pt(300),
            top: emu_to_pt(200),
            width: emu_to_pt(50),
            height: emu_to_pt(60),
            ..Default::default()
        };
        let before = frame.clone();
        space.remap(&mut frame);
        // translated by chOff, scale 1
        assert_eq!(frame.width, before.width);
        assert_eq!(frame.height, before.height);
        assert_eq!(frame.left, before.left - emu_to_pt(100));
        assert_eq!(frame.top, before.top - emu_to_pt(100));
    }
}
