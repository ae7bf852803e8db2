//! Package loading and the per-slide resolution context.
//!
//! The package layer owns the archive, `[Content_Types].xml`, the
//! presentation part and the theme, and builds one [`SlideContext`] per
//! slide: the slide, layout and master trees, the relationship map of every
//! part that can emit an `rId`, the placeholder indices, and the media
//! cache. The context is read-only during slide processing except for the
//! cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use zip::ZipArchive;

use crate::color::ColorScope;
use crate::element::Size;
use crate::error::{Error, Result};
use crate::placeholder::PlaceholderIndex;
use crate::units::{emu_to_pt, file_extension, mime_for_extension};
use crate::xml::Element;

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const LAYOUT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

/// One relationship of a part, keyed by `rId` in [`Relationships`].
#[derive(Debug, Clone)]
pub(crate) struct Relationship {
    /// Tail of the Type URI (`slideLayout`, `image`, `diagramData`, ...).
    pub rel_type: String,
    /// Normalized package path, or the raw URL for external targets.
    pub target: String,
    pub external: bool,
}

/// Relationship map of a single part.
#[derive(Debug, Clone, Default)]
pub(crate) struct Relationships {
    map: HashMap<String, Relationship>,
}

impl Relationships {
    fn parse(bytes: &[u8], base_dir: &str) -> Result<Relationships> {
        let root = Element::parse(bytes)?;
        let mut map = HashMap::new();
        for rel in root.children("Relationship") {
            let (Some(id), Some(ty), Some(target)) =
                (rel.attr("Id"), rel.attr("Type"), rel.attr("Target"))
            else {
                continue;
            };
            let external = rel.attr("TargetMode") == Some("External");
            let target = if external {
                target.to_string()
            } else {
                normalize_target(base_dir, target)
            };
            map.insert(
                id.to_string(),
                Relationship {
                    rel_type: ty.rsplit('/').next().unwrap_or(ty).to_string(),
                    target,
                    external,
                },
            );
        }
        Ok(Relationships { map })
    }

    pub(crate) fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.map.get(r_id)
    }

    /// First relationship whose Type URI ends with the given tail.
    pub(crate) fn first_of_type(&self, tail: &str) -> Option<&Relationship> {
        self.map.values().find(|r| r.rel_type == tail)
    }
}

/// Resolve a relationship target against the directory of its source part,
/// folding `.` and `..` segments: `../media/image1.png` seen from
/// `ppt/slides` becomes `ppt/media/image1.png`.
pub(crate) fn normalize_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// The loaded presentation package.
pub(crate) struct Package {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
    /// Slide part paths in ascending numeric order. The `[Content_Types]`
    /// override list is authoritative for which parts are slides; the rels
    /// file's Id ordering is not reliable for slide order.
    pub slides: Vec<String>,
    /// Layout part paths, same ordering rule.
    pub layouts: Vec<String>,
    pub size: Size,
    pub theme: Element,
    pub theme_path: String,
    pub theme_rels: Relationships,
    pub table_styles: Option<Element>,
    pub default_text_style: Option<Element>,
}

impl Package {
    pub(crate) fn from_bytes(data: Vec<u8>) -> Result<Package> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        let archive = RefCell::new(archive);

        let read = |path: &str| -> Result<Vec<u8>> { read_entry(&archive, path) };

        let content_types = Element::parse(&read("[Content_Types].xml")?)?;
        let mut slides = Vec::new();
        let mut layouts = Vec::new();
        for over in content_types.children("Override") {
            let (Some(part), Some(ct)) = (over.attr("PartName"), over.attr("ContentType")) else {
                continue;
            };
            if ct == SLIDE_CONTENT_TYPE {
                slides.push(part.trim_start_matches('/').to_string());
            } else if ct == LAYOUT_CONTENT_TYPE {
                layouts.push(part.trim_start_matches('/').to_string());
            }
        }
        slides.sort_by_key(|p| numeric_suffix(p));
        layouts.sort_by_key(|p| numeric_suffix(p));

        let presentation = Element::parse(&read("ppt/presentation.xml")?)?;
        let size = presentation
            .child("p:sldSz")
            .map(|s| Size {
                width: emu_to_pt(s.attr_i64("cx").unwrap_or(0)),
                height: emu_to_pt(s.attr_i64("cy").unwrap_or(0)),
            })
            .unwrap_or_default();
        let default_text_style = presentation.child("p:defaultTextStyle").cloned();

        let pres_rels = Relationships::parse(&read("ppt/_rels/presentation.xml.rels")?, "ppt")?;
        let theme_rel = pres_rels
            .first_of_type("theme")
            .ok_or_else(|| Error::RelationshipNotFound("theme".to_string()))?;
        let theme_path = theme_rel.target.clone();
        let theme = Element::parse(&read(&theme_path)?)?;
        let theme_rels = rels_of(&archive, &theme_path)?;

        let table_styles = read("ppt/tableStyles.xml")
            .ok()
            .and_then(|b| Element::parse(&b).ok());

        Ok(Package {
            archive,
            slides,
            layouts,
            size,
            theme,
            theme_path,
            theme_rels,
            table_styles,
            default_text_style,
        })
    }

    /// Read a raw part from the archive.
    pub(crate) fn read(&self, path: &str) -> Result<Vec<u8>> {
        read_entry(&self.archive, path)
    }

    pub(crate) fn read_xml(&self, path: &str) -> Result<Element> {
        Element::parse(&self.read(path)?)
    }

    /// Relationships of a part; a part without a rels file has none.
    pub(crate) fn rels_for(&self, part_path: &str) -> Result<Relationships> {
        rels_of(&self.archive, part_path)
    }

    /// Load everything slide processing needs for one slide part.
    pub(crate) fn slide_context(&self, slide_path: &str) -> Result<SlideContext<'_>> {
        let slide = self.read_xml(slide_path)?;
        let slide_rels = self.rels_for(slide_path)?;

        let layout_rel = slide_rels.first_of_type("slideLayout").ok_or_else(|| {
            Error::RelationshipNotFound(format!("slideLayout for {}", slide_path))
        })?;
        let layout_path = layout_rel.target.clone();
        let layout = self.read_xml(&layout_path)?;
        let layout_rels = self.rels_for(&layout_path)?;

        let master_rel = layout_rels.first_of_type("slideMaster").ok_or_else(|| {
            Error::RelationshipNotFound(format!("slideMaster for {}", layout_path))
        })?;
        let master_path = master_rel.target.clone();
        let master = self.read_xml(&master_path)?;
        let master_rels = self.rels_for(&master_path)?;

        if let Some(theme_rel) = master_rels.first_of_type("theme") {
            if theme_rel.target != self.theme_path {
                log::warn!(
                    "master {} references theme {} but the package theme is {}",
                    master_path,
                    theme_rel.target,
                    self.theme_path
                );
            }
        }

        let (diagram, diagram_rels) = self.load_diagram(&slide_rels)?;

        let layout_index = PlaceholderIndex::build(layout.get(&["p:cSld", "p:spTree"]));
        let master_index = PlaceholderIndex::build(master.get(&["p:cSld", "p:spTree"]));

        Ok(SlideContext {
            pkg: self,
            slide,
            layout,
            master,
            slide_rels,
            layout_rels,
            master_rels,
            diagram_rels,
            diagram,
            layout_index,
            master_index,
            image_cache: RefCell::new(HashMap::new()),
        })
    }

    /// Locate and parse the slide's diagram drawing, if any. The drawing is
    /// referenced either directly from the slide or from the diagram data
    /// part's own rels. Its `dsp:` prefix is rewritten to `p:` on the raw
    /// bytes so the drawing's shapes flow through the ordinary dispatcher.
    fn load_diagram(
        &self,
        slide_rels: &Relationships,
    ) -> Result<(Option<Element>, Relationships)> {
        let drawing_path = match slide_rels.first_of_type("diagramDrawing") {
            Some(rel) => Some(rel.target.clone()),
            None => slide_rels.first_of_type("diagramData").and_then(|data| {
                self.rels_for(&data.target)
                    .ok()
                    .and_then(|r| r.first_of_type("diagramDrawing").map(|d| d.target.clone()))
            }),
        };
        let Some(path) = drawing_path else {
            return Ok((None, Relationships::default()));
        };

        let bytes = self.read(&path)?;
        let rewritten = String::from_utf8_lossy(&bytes).replace("dsp:", "p:");
        let tree = Element::parse(rewritten.as_bytes())?;
        let rels = self.rels_for(&path)?;
        Ok((Some(tree), rels))
    }
}

fn read_entry(archive: &RefCell<ZipArchive<Cursor<Vec<u8>>>>, path: &str) -> Result<Vec<u8>> {
    use std::io::Read as _;
    let mut archive = archive.borrow_mut();
    let mut entry = archive
        .by_name(path)
        .map_err(|_| Error::PartNotFound(path.to_string()))?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

fn rels_of(
    archive: &RefCell<ZipArchive<Cursor<Vec<u8>>>>,
    part_path: &str,
) -> Result<Relationships> {
    let (dir, name) = match part_path.rsplit_once('/') {
        Some((d, n)) => (d, n),
        None => ("", part_path),
    };
    let rels_path = if dir.is_empty() {
        format!("_rels/{}.rels", name)
    } else {
        format!("{}/_rels/{}.rels", dir, name)
    };
    match read_entry(archive, &rels_path) {
        Ok(bytes) => Relationships::parse(&bytes, dir),
        Err(Error::PartNotFound(_)) => Ok(Relationships::default()),
        Err(e) => Err(e),
    }
}

/// Trailing number of a part name (`ppt/slides/slide12.xml` -> 12). Parts
/// without one sort first.
fn numeric_suffix(path: &str) -> u64 {
    let stem = path
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".xml");
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.chars().rev().collect::<String>().parse().unwrap_or(0)
}

/// The per-slide resolution environment. Immutable during processing apart
/// from the media cache.
pub(crate) struct SlideContext<'a> {
    pub pkg: &'a Package,
    pub slide: Element,
    pub layout: Element,
    pub master: Element,
    pub slide_rels: Relationships,
    pub layout_rels: Relationships,
    pub master_rels: Relationships,
    pub diagram_rels: Relationships,
    pub diagram: Option<Element>,
    pub layout_index: PlaceholderIndex,
    pub master_index: PlaceholderIndex,
    image_cache: RefCell<HashMap<String, String>>,
}

impl<'a> SlideContext<'a> {
    pub(crate) fn theme(&self) -> &Element {
        &self.pkg.theme
    }

    /// Active color map: slide override, layout override, then the master's
    /// `p:clrMap`.
    pub(crate) fn color_map(&self) -> Option<&Element> {
        self.slide
            .get(&["p:clrMapOvr", "a:overrideClrMapping"])
            .or_else(|| self.layout.get(&["p:clrMapOvr", "a:overrideClrMapping"]))
            .or_else(|| self.master.child("p:clrMap"))
    }

    pub(crate) fn color_scope<'s>(&'s self, ph_clr: Option<&'s str>) -> ColorScope<'s> {
        ColorScope {
            theme: Some(&self.pkg.theme),
            clr_map: self.color_map(),
            ph_clr,
        }
    }

    /// The master's `p:txStyles` subtree (list-level text defaults).
    pub(crate) fn master_text_styles(&self) -> Option<&Element> {
        self.master.child("p:txStyles")
    }

    pub(crate) fn sp_tree(&self) -> Option<&Element> {
        self.slide.get(&["p:cSld", "p:spTree"])
    }

    /// Extract a media part as a data URL, deduplicating identical targets
    /// through the per-slide cache. `.xml` targets (vector fill parts) and
    /// unreadable members are skipped.
    pub(crate) fn media_data_url(&self, target: &str) -> Option<String> {
        let ext = file_extension(target);
        if ext.eq_ignore_ascii_case("xml") {
            log::debug!("skipping vector media target {}", target);
            return None;
        }
        if let Some(hit) = self.image_cache.borrow().get(target) {
            return Some(hit.clone());
        }
        let bytes = match self.pkg.read(target) {
            Ok(b) => b,
            Err(_) => {
                log::warn!("media target {} missing from package", target);
                return None;
            },
        };
        let url = format!(
            "data:{};base64,{}",
            mime_for_extension(ext),
            BASE64.encode(&bytes)
        );
        self.image_cache
            .borrow_mut()
            .insert(target.to_string(), url.clone());
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_normalization() {
        assert_eq!(
            normalize_target("ppt/slides", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            normalize_target("ppt", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            normalize_target("ppt/slides", "/ppt/media/a.png"),
            "ppt/media/a.png"
        );
        assert_eq!(normalize_target("", "docProps/app.xml"), "docProps/app.xml");
    }

    #[test]
    fn numeric_suffix_ordering() {
        let mut parts = vec![
            "ppt/slides/slide10.xml".to_string(),
            "ppt/slides/slide2.xml".to_string(),
            "ppt/slides/slide1.xml".to_string(),
        ];
        parts.sort_by_key(|p| numeric_suffix(p));
        assert_eq!(
            parts,
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide10.xml"
            ]
        );
    }

    #[test]
    fn rels_parse_and_type_tail() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
          <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
          <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
          <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/video" Target="https://example.com/v.mp4" TargetMode="External"/>
        </Relationships>"#;
        let rels = Relationships::parse(xml, "ppt/slides").unwrap();
        let layout = rels.get("rId1").unwrap();
        assert_eq!(layout.rel_type, "slideLayout");
        assert_eq!(layout.target, "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(rels.get("rId2").unwrap().target, "ppt/media/image1.png");
        let video = rels.get("rId3").unwrap();
        assert!(video.external);
        assert_eq!(video.target, "https://example.com/v.mp4");
        assert!(rels.first_of_type("image").is_some());
        assert!(rels.first_of_type("chart").is_none());
    }
}
