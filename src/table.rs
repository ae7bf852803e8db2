//! Table extraction and table-style resolution.
//!
//! A table graphic frame becomes a row-major cell matrix. Per-cell fill and
//! font come first from the cell's own properties, then from the registered
//! table style (`ppt/tableStyles.xml`) restricted to the style slot the
//! cell occupies: corners, first/last row and column, banding, whole table.

use crate::color::{ColorScope, color_node, resolve_color_node, resolve_solid_fill};
use crate::element::{Border, Frame, TableCell, TableElement};
use crate::package::SlideContext;
use crate::text::plain_text;
use crate::units::emu_to_pt;
use crate::xml::Element;

/// Build a table element from an `a:tbl`.
pub(crate) fn build_table(tbl: &Element, frame: Frame, ctx: &SlideContext<'_>) -> TableElement {
    let scope = ctx.color_scope(None);

    let tbl_pr = tbl.child("a:tblPr");
    let flags = TableFlags {
        first_row: tbl_pr.map(|p| p.attr_bool("firstRow")).unwrap_or(false),
        last_row: tbl_pr.map(|p| p.attr_bool("lastRow")).unwrap_or(false),
        first_col: tbl_pr.map(|p| p.attr_bool("firstCol")).unwrap_or(false),
        last_col: tbl_pr.map(|p| p.attr_bool("lastCol")).unwrap_or(false),
        band_row: tbl_pr.map(|p| p.attr_bool("bandRow")).unwrap_or(false),
        band_col: tbl_pr.map(|p| p.attr_bool("bandCol")).unwrap_or(false),
    };

    let style = tbl_pr
        .and_then(|p| p.child("a:tableStyleId"))
        .map(|id| id.text())
        .and_then(|id| find_style(ctx, id.trim()));

    let rows: Vec<&Element> = tbl.children("a:tr").collect();
    let row_count = rows.len();
    let mut data = Vec::with_capacity(row_count);

    for (r, tr) in rows.iter().enumerate() {
        let cells: Vec<&Element> = tr.children("a:tc").collect();
        let col_count = cells.len();
        let mut out_row = Vec::with_capacity(col_count);

        for (c, tc) in cells.iter().enumerate() {
            let mut cell = TableCell {
                text: tc.child("a:txBody").map(|b| plain_text(b)).unwrap_or_default(),
                ..Default::default()
            };

            if let Some(span) = tc.attr_i64("gridSpan").filter(|&s| s > 1) {
                cell.col_span = Some(span as u32);
            }
            if let Some(span) = tc.attr_i64("rowSpan").filter(|&s| s > 1) {
                cell.row_span = Some(span as u32);
            }
            if tc.attr_bool("hMerge") {
                cell.h_merge = Some(true);
            }
            if tc.attr_bool("vMerge") {
                cell.v_merge = Some(true);
            }

            // explicit cell fill beats every style slot
            cell.fill_color = tc
                .get(&["a:tcPr", "a:solidFill"])
                .and_then(|f| resolve_solid_fill(f, &scope));

            if let Some(style) = style {
                let pos = CellPosition {
                    row: r,
                    col: c,
                    last_row: row_count.saturating_sub(1),
                    last_col: col_count.saturating_sub(1),
                };
                apply_style(&mut cell, style, &flags, &pos, &scope);
            }

            out_row.push(cell);
        }
        data.push(out_row);
    }

    let border = style.and_then(|s| whole_table_border(s, &scope));

    TableElement {
        frame,
        data,
        border,
    }
}

struct TableFlags {
    first_row: bool,
    last_row: bool,
    first_col: bool,
    last_col: bool,
    band_row: bool,
    band_col: bool,
}

struct CellPosition {
    row: usize,
    col: usize,
    last_row: usize,
    last_col: usize,
}

fn find_style<'a>(ctx: &'a SlideContext<'_>, style_id: &str) -> Option<&'a Element> {
    ctx.pkg
        .table_styles
        .as_ref()?
        .children("a:tblStyle")
        .find(|s| s.attr("styleId") == Some(style_id))
}

/// Style slots applicable to a cell, least specific first, so later slots
/// override earlier ones. Banding skips the first/last row or column when
/// those overrides are active.
fn slots_for(flags: &TableFlags, pos: &CellPosition) -> Vec<&'static str> {
    let mut slots = vec!["a:wholeTbl"];

    let on_first_row = flags.first_row && pos.row == 0;
    let on_last_row = flags.last_row && pos.row == pos.last_row;
    let on_first_col = flags.first_col && pos.col == 0;
    let on_last_col = flags.last_col && pos.col == pos.last_col;

    if flags.band_row && !on_first_row && !on_last_row {
        let band = pos.row - usize::from(flags.first_row);
        slots.push(if band % 2 == 0 { "a:band1H" } else { "a:band2H" });
    }
    if flags.band_col && !on_first_col && !on_last_col {
        let band = pos.col - usize::from(flags.first_col);
        slots.push(if band % 2 == 0 { "a:band1V" } else { "a:band2V" });
    }

    if on_first_col {
        slots.push("a:firstCol");
    }
    if on_last_col {
        slots.push("a:lastCol");
    }
    if on_first_row {
        slots.push("a:firstRow");
    }
    if on_last_row {
        slots.push("a:lastRow");
    }

    // corner slots win over everything when both toggles combine
    match (on_first_row, on_last_row, on_first_col, on_last_col) {
        (true, _, true, _) => slots.push("a:nwCell"),
        (true, _, _, true) => slots.push("a:neCell"),
        (_, true, true, _) => slots.push("a:swCell"),
        (_, true, _, true) => slots.push("a:seCell"),
        _ => {},
    }

    slots
}

fn apply_style(
    cell: &mut TableCell,
    style: &Element,
    flags: &TableFlags,
    pos: &CellPosition,
    scope: &ColorScope<'_>,
) {
    // most specific slot first; each property keeps the first value found
    for slot_name in slots_for(flags, pos).into_iter().rev() {
        let Some(slot) = style.child(slot_name) else {
            continue;
        };

        if cell.fill_color.is_none() {
            cell.fill_color = slot
                .get(&["a:tcStyle", "a:fill", "a:solidFill"])
                .and_then(|f| resolve_solid_fill(f, scope));
        }

        if let Some(tx) = slot.child("a:tcTxStyle") {
            if cell.font_bold.is_none() && matches!(tx.attr("b"), Some("on") | Some("1")) {
                cell.font_bold = Some(true);
            }
            if cell.font_color.is_none() {
                cell.font_color = color_node(tx)
                    .or_else(|| tx.child("a:fontRef").and_then(color_node))
                    .and_then(|c| resolve_color_node(c, scope));
            }
        }
    }
}

/// The whole-table border from the style's `a:tcBdr`, reading the first
/// edge that defines a line.
fn whole_table_border(style: &Element, scope: &ColorScope<'_>) -> Option<Border> {
    let bdr = style.get(&["a:wholeTbl", "a:tcStyle", "a:tcBdr"])?;
    for edge in ["a:left", "a:top", "a:right", "a:bottom", "a:insideH", "a:insideV"] {
        let Some(ln) = bdr.child(edge).and_then(|e| e.child("a:ln")) else {
            continue;
        };
        let color = ln
            .child("a:solidFill")
            .and_then(|f| resolve_solid_fill(f, scope))
            .unwrap_or_default();
        return Some(Border {
            border_color: color,
            border_width: ln.attr_i64("w").map(emu_to_pt).unwrap_or(1.0),
            border_type: "solid".to_string(),
            border_stroke_dasharray: "0".to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(first_row: bool, band_row: bool) -> TableFlags {
        TableFlags {
            first_row,
            last_row: false,
            first_col: false,
            last_col: false,
            band_row,
            band_col: false,
        }
    }

    #[test]
    fn header_and_banding_slots() {
        let f = flags(true, true);
        let pos = |row| CellPosition {
            row,
            col: 1,
            last_row: 2,
            last_col: 2,
        };
        assert!(slots_for(&f, &pos(0)).contains(&"a:firstRow"));
        // row 1 is the first banded row
        assert!(slots_for(&f, &pos(1)).contains(&"a:band1H"));
        assert!(slots_for(&f, &pos(2)).contains(&"a:band2H"));
    }

    #[test]
    fn banding_without_header_starts_at_row_zero() {
        let f = flags(false, true);
        let pos = |row| CellPosition {
            row,
            col: 0,
            last_row: 3,
            last_col: 1,
        };
        assert!(slots_for(&f, &pos(0)).contains(&"a:band1H"));
        assert!(slots_for(&f, &pos(1)).contains(&"a:band2H"));
    }

    #[test]
    fn corner_slot_combination() {
        let f = TableFlags {
            first_row: true,
            last_row: false,
            first_col: true,
            last_col: false,
            band_row: false,
            band_col: false,
        };
        let slots = slots_for(
            &f,
            &CellPosition {
                row: 0,
                col: 0,
                last_row: 2,
                last_col: 2,
            },
        );
        assert_eq!(slots.last(), Some(&"a:nwCell"));
    }
}
