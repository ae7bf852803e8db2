//! Chart extraction from chart parts.
//!
//! The chart part referenced by a graphic frame is loaded, its plot area
//! located, and the first type group (`c:barChart`, `c:lineChart`, ...)
//! surfaced with its series data. Unknown chart kinds keep their raw tag so
//! the consumer can decide what to do with them.

use crate::element::{ChartElement, ChartSeries, Frame};
use crate::fill::{FillSource, source_rels};
use crate::package::SlideContext;
use crate::xml::Element;

/// Load and extract the chart referenced by `r:id` on the slide.
pub(crate) fn build_chart(
    r_id: &str,
    frame: Frame,
    ctx: &SlideContext<'_>,
) -> Option<ChartElement> {
    let Some(rel) = source_rels(ctx, FillSource::Slide).get(r_id) else {
        log::warn!("chart references unknown relationship {}", r_id);
        return None;
    };
    let space = match ctx.pkg.read_xml(&rel.target) {
        Ok(tree) => tree,
        Err(e) => {
            log::warn!("chart part {} unreadable: {}", rel.target, e);
            return None;
        },
    };

    let style = space
        .child("c:style")
        .and_then(|s| s.attr("val"))
        .map(str::to_string);

    let plot_area = space.get(&["c:chart", "c:plotArea"])?;
    let type_group = plot_area
        .elements()
        .find(|e| e.local_name().ends_with("Chart"))?;

    let chart_type = type_group.local_name().to_string();
    let data = type_group
        .children("c:ser")
        .map(extract_series)
        .collect::<Vec<_>>();

    let attr_of = |name: &str| {
        type_group
            .child(name)
            .and_then(|e| e.attr("val"))
            .map(str::to_string)
    };

    let marker = type_group
        .child("c:marker")
        .map(|m| m.attr("val") != Some("0"));

    Some(ChartElement {
        frame,
        chart_type,
        data,
        marker,
        bar_dir: attr_of("c:barDir"),
        hole_size: attr_of("c:holeSize"),
        grouping: attr_of("c:grouping"),
        style,
    })
}

fn extract_series(ser: &Element) -> ChartSeries {
    let name = ser
        .get(&["c:tx", "c:strRef", "c:strCache"])
        .and_then(first_point_text)
        .unwrap_or_default();

    let categories = ser
        .child("c:cat")
        .and_then(|cat| {
            cat.get(&["c:strRef", "c:strCache"])
                .or_else(|| cat.get(&["c:numRef", "c:numCache"]))
        })
        .map(cache_strings)
        .unwrap_or_default();

    let values = ser
        .get(&["c:val", "c:numRef", "c:numCache"])
        .map(cache_numbers)
        .unwrap_or_default();

    ChartSeries {
        name,
        categories,
        values,
    }
}

fn first_point_text(cache: &Element) -> Option<String> {
    cache
        .children("c:pt")
        .next()
        .and_then(|pt| pt.child("c:v"))
        .map(|v| v.text())
}

/// Points of a string cache in index order; gaps read as empty strings.
fn cache_strings(cache: &Element) -> Vec<String> {
    let points = indexed_points(cache);
    let len = points.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut out = vec![String::new(); len];
    for (i, v) in points {
        out[i] = v;
    }
    out
}

/// Points of a numeric cache in index order; gaps stay `None` so blank
/// cells keep their position.
fn cache_numbers(cache: &Element) -> Vec<Option<f64>> {
    let points = indexed_points(cache);
    let len = points.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut out = vec![None; len];
    for (i, v) in points {
        out[i] = v.trim().parse().ok();
    }
    out
}

fn indexed_points(cache: &Element) -> Vec<(usize, String)> {
    cache
        .children("c:pt")
        .filter_map(|pt| {
            let idx = pt.attr_i64("idx")? as usize;
            let v = pt.child("c:v")?.text();
            Some((idx, v))
        })
        .collect()
}
