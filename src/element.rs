//! The emitted slide data model.
//!
//! Everything here serializes directly to the JSON tree consumers receive:
//! absolute-positioned element records discriminated by `type`, with all
//! lengths in points, origin top-left, rotation in clockwise degrees.

use serde::Serialize;

/// Placement shared by every visual element: position and size in points,
/// rotation in degrees, optional mirroring.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotate: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_flip_h: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_flip_v: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Border appearance resolved from `a:ln` (or the style matrix fallback).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub border_color: String,
    pub border_width: f64,
    pub border_type: String,
    pub border_stroke_dasharray: String,
}

/// Outer shadow in points; `h`/`v` are the projected offsets of the
/// distance/direction pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub h: f64,
    pub v: f64,
    pub blur: f64,
    pub color: String,
}

/// One gradient stop; `pos` keeps the `"<n>%"` form consumers splice into
/// CSS, `color` is `#RRGGBB[AA]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub pos: String,
    pub color: String,
}

/// A resolved gradient: rotation in CSS degrees and stops sorted ascending
/// by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    pub rot: i64,
    pub colors: Vec<GradientStop>,
}

/// Slide background record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    Color(String),
    Gradient(Gradient),
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color("#fff".to_string())
    }
}

/// A geometric shape (preset or custom outline).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    #[serde(flatten)]
    pub frame: Frame,
    /// Preset geometry name, or `"custom"` when `path` carries the outline.
    /// The wire key is the historical `shapType`.
    #[serde(rename = "shapType")]
    pub shape_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub fill_color: String,
    #[serde(flatten)]
    pub border: Border,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A text box (or placeholder classified as text).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(flatten)]
    pub frame: Frame,
    pub fill_color: String,
    #[serde(flatten)]
    pub border: Border,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    pub content: String,
    pub is_vertical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_align: Option<String>,
}

/// A raster or vector image, inlined as a data URL.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    #[serde(flatten)]
    pub frame: Frame,
    pub src: String,
}

/// Embedded or linked audio/video.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaElement {
    #[serde(flatten)]
    pub frame: Frame,
    /// Embedded bytes as a data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
    /// External URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

/// One table cell. Continuation cells of a merge keep their flags so the
/// consumer can keep grid alignment while suppressing rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_bold: Option<bool>,
}

/// A table: rectangular row-major cell matrix.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableElement {
    #[serde(flatten)]
    pub frame: Frame,
    pub data: Vec<Vec<TableCell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
}

/// One chart series: category labels paired with numeric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// A chart extracted from a graphic frame.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartElement {
    #[serde(flatten)]
    pub frame: Frame,
    /// Raw plot-area chart kind (`barChart`, `pieChart`, ...). Unknown kinds
    /// are recorded unchanged.
    pub chart_type: String,
    pub data: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// A diagram (SmartArt drawing) flattened to its constituent shapes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramElement {
    #[serde(flatten)]
    pub frame: Frame,
    pub elements: Vec<Element>,
}

/// A shape group; children's coordinates are re-expressed in the group's
/// frame.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupElement {
    #[serde(flatten)]
    pub frame: Frame,
    pub elements: Vec<Element>,
}

/// Any visual element of a slide, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Shape(ShapeElement),
    Text(TextElement),
    Image(ImageElement),
    Video(MediaElement),
    Audio(MediaElement),
    Table(TableElement),
    Chart(ChartElement),
    Diagram(DiagramElement),
    Group(GroupElement),
}

impl Element {
    /// Mutable access to the shared placement record.
    pub fn frame_mut(&mut self) -> &mut Frame {
        match self {
            Element::Shape(e) => &mut e.frame,
            Element::Text(e) => &mut e.frame,
            Element::Image(e) => &mut e.frame,
            Element::Video(e) | Element::Audio(e) => &mut e.frame,
            Element::Table(e) => &mut e.frame,
            Element::Chart(e) => &mut e.frame,
            Element::Diagram(e) => &mut e.frame,
            Element::Group(e) => &mut e.frame,
        }
    }

    /// Shared placement record.
    pub fn frame(&self) -> &Frame {
        match self {
            Element::Shape(e) => &e.frame,
            Element::Text(e) => &e.frame,
            Element::Image(e) => &e.frame,
            Element::Video(e) | Element::Audio(e) => &e.frame,
            Element::Table(e) => &e.frame,
            Element::Chart(e) => &e.frame,
            Element::Diagram(e) => &e.frame,
            Element::Group(e) => &e.frame,
        }
    }
}

/// One converted slide.
#[derive(Debug, Clone, Serialize)]
pub struct Slide {
    pub fill: Background,
    pub elements: Vec<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Slide dimensions in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_json_is_tagged_and_camel_cased() {
        let el = Element::Shape(ShapeElement {
            frame: Frame {
                left: 72.0,
                top: 72.0,
                width: 72.0,
                height: 36.0,
                rotate: 0,
                ..Default::default()
            },
            shape_type: "rect".to_string(),
            fill_color: "#FF0000".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "shape");
        assert_eq!(json["shapType"], "rect");
        assert_eq!(json["fillColor"], "#FF0000");
        assert_eq!(json["left"], 72.0);
        // unset optionals stay out of the output
        assert!(json.get("isFlipH").is_none());
        assert!(json.get("shadow").is_none());
    }

    #[test]
    fn background_json_shape() {
        let bg = Background::Gradient(Gradient {
            rot: 180,
            colors: vec![
                GradientStop {
                    pos: "0%".to_string(),
                    color: "#FFFFFF".to_string(),
                },
                GradientStop {
                    pos: "100%".to_string(),
                    color: "#000000".to_string(),
                },
            ],
        });
        let json = serde_json::to_value(&bg).unwrap();
        assert_eq!(json["type"], "gradient");
        assert_eq!(json["value"]["rot"], 180);
        assert_eq!(json["value"]["colors"][0]["pos"], "0%");
    }
}
