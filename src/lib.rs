//! Longan - convert PowerPoint presentations into renderer-agnostic slide
//! descriptions.
//!
//! This library reads a PresentationML (`.pptx`) package and resolves every
//! slide into absolute-positioned elements: shapes, text runs with resolved
//! styling, images, embedded media, tables, charts and diagrams. The output
//! is a plain JSON-serializable tree; consumers can render it with HTML,
//! SVG, canvas or anything else without understanding OOXML, the
//! slide/layout/master/theme inheritance chain, or EMU coordinates.
//!
//! # Example
//!
//! ```no_run
//! use longan::Presentation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pres = Presentation::open("deck.pptx")?;
//! println!("{} x {} pt", pres.size.width, pres.size.height);
//!
//! for slide in &pres.slides {
//!     println!("slide with {} elements", slide.elements.len());
//! }
//!
//! // Or hand the whole tree to a renderer:
//! let json = pres.to_json()?;
//! # Ok(())
//! # }
//! ```

mod border;
mod chart;
mod color;
mod element;
mod error;
mod fill;
mod geometry;
mod package;
mod placeholder;
mod shapes;
mod slide;
mod table;
mod text;
mod units;
mod xml;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

pub use element::{
    Background, Border, ChartElement, ChartSeries, DiagramElement, Element, Frame, Gradient,
    GradientStop, GroupElement, ImageElement, MediaElement, Shadow, ShapeElement, Size, Slide,
    TableCell, TableElement, TextElement,
};
pub use error::{Error, Result};

/// A fully converted presentation: slide dimensions plus one record per
/// slide, in the deck's numeric slide order.
#[derive(Debug, Clone, Serialize)]
pub struct Presentation {
    pub size: Size,
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Convert a `.pptx` file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let pres = longan::Presentation::open("deck.pptx")?;
    /// # Ok::<(), longan::Error>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Presentation> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Convert a package already held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Presentation> {
        let pkg = package::Package::from_bytes(data)?;

        let mut slides = Vec::with_capacity(pkg.slides.len());
        for slide_path in &pkg.slides {
            slides.push(slide::process_slide(&pkg, slide_path)?);
        }

        Ok(Presentation {
            size: pkg.size,
            slides,
        })
    }

    /// Convert a package from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Presentation> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Serialize the whole tree to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
