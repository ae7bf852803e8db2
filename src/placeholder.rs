//! Placeholder indices over layout and master shape trees.
//!
//! Slide shapes inherit geometry, fills and text defaults from the matching
//! placeholder on their layout, which in turn inherits from the master. The
//! match key is the placeholder `type` when present, else `idx`. Keys are
//! not unique in malformed decks; entries overwrite in document order so the
//! last one wins deterministically.

use std::collections::HashMap;

use crate::xml::Element;

/// Non-visual property wrappers that may carry the `p:nvPr/p:ph` reference.
const NV_PR_NAMES: [&str; 5] = [
    "p:nvSpPr",
    "p:nvPicPr",
    "p:nvGraphicFramePr",
    "p:nvGrpSpPr",
    "p:nvCxnSpPr",
];

/// The non-visual property wrapper of a shape-tree child, whatever its
/// shape kind.
pub(crate) fn nv_props(node: &Element) -> Option<&Element> {
    NV_PR_NAMES.iter().find_map(|n| node.child(n))
}

/// The `p:ph` placeholder reference of a shape-tree child.
pub(crate) fn placeholder_ref(node: &Element) -> Option<&Element> {
    nv_props(node).and_then(|nv| nv.get(&["p:nvPr", "p:ph"]))
}

/// Shape-tree indices by shape id, placeholder idx, and placeholder type.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaceholderIndex {
    by_id: HashMap<String, Element>,
    by_idx: HashMap<String, Element>,
    by_type: HashMap<String, Element>,
}

impl PlaceholderIndex {
    /// Index the children of a `p:cSld/p:spTree`. Property-bag children
    /// (`p:nvGrpSpPr`, `p:grpSpPr`) are not shapes and are skipped.
    pub(crate) fn build(sp_tree: Option<&Element>) -> PlaceholderIndex {
        let mut index = PlaceholderIndex::default();
        let Some(tree) = sp_tree else {
            return index;
        };

        for node in tree.elements() {
            if matches!(node.name(), "p:nvGrpSpPr" | "p:grpSpPr") {
                continue;
            }
            let Some(nv_pr) = NV_PR_NAMES.iter().find_map(|n| node.child(n)) else {
                continue;
            };

            if let Some(id) = nv_pr.get_attr(&["p:cNvPr"], "id") {
                index.by_id.insert(id.to_string(), node.clone());
            }
            if let Some(ph) = nv_pr.get(&["p:nvPr", "p:ph"]) {
                if let Some(idx) = ph.attr("idx") {
                    index.by_idx.insert(idx.to_string(), node.clone());
                }
                if let Some(ty) = ph.attr("type") {
                    index.by_type.insert(ty.to_string(), node.clone());
                }
            }
        }
        index
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<&Element> {
        self.by_id.get(id)
    }

    pub(crate) fn by_idx(&self, idx: &str) -> Option<&Element> {
        self.by_idx.get(idx)
    }

    pub(crate) fn by_type(&self, ty: &str) -> Option<&Element> {
        self.by_type.get(ty)
    }

    /// Placeholder lookup the way slide shapes search: by type when the
    /// shape carries one, else by idx.
    pub(crate) fn find(&self, ty: Option<&str>, idx: Option<&str>) -> Option<&Element> {
        if let Some(ty) = ty {
            if let Some(found) = self.by_type(ty) {
                return Some(found);
            }
        }
        idx.and_then(|i| self.by_idx(i))
    }
}
