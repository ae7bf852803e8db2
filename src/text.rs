//! Text body rendering.
//!
//! A `p:txBody` becomes a small HTML fragment: one `div` per paragraph,
//! one `span` per run. Run properties inherit through the same chain as
//! geometry: the run itself, the paragraph defaults, the layout and master
//! placeholder list styles, the master `p:txStyles`, and finally the
//! presentation-wide default text style.

use crate::color::resolve_solid_fill;
use crate::package::SlideContext;
use crate::units::escape_html;
use crate::xml::Element;

/// Arguments threaded through one body's rendering.
pub(crate) struct TextBodyArgs<'a> {
    /// Matching layout placeholder, when the shape is a placeholder.
    pub layout_ph: Option<&'a Element>,
    /// Matching master placeholder.
    pub master_ph: Option<&'a Element>,
    /// Resolved placeholder type (`title`, `body`, ...).
    pub ph_type: Option<&'a str>,
}

/// Render a `p:txBody` to HTML. Empty bodies yield an empty string.
pub(crate) fn build_text_body(
    tx_body: &Element,
    args: &TextBodyArgs<'_>,
    ctx: &SlideContext<'_>,
) -> String {
    let mut html = String::new();
    let mut auto_num = [0u32; 9];

    for para in tx_body.children("a:p") {
        let p_pr = para.child("a:pPr");
        let level = p_pr
            .and_then(|p| p.attr_i64("lvl"))
            .unwrap_or(0)
            .clamp(0, 8) as usize;

        html.push_str("<div");
        if let Some(align) = paragraph_align(p_pr, args.ph_type) {
            html.push_str(&format!(r#" style="text-align:{};""#, align));
        }
        html.push('>');

        if let Some(marker) = bullet_marker(tx_body, p_pr, args, ctx, level, &mut auto_num) {
            html.push_str(&marker);
        }

        for node in para.elements() {
            match node.name() {
                "a:r" | "a:fld" => {
                    let text = node.child("a:t").map(|t| t.text()).unwrap_or_default();
                    html.push_str(&render_run(node, &text, tx_body, p_pr, args, ctx, level));
                },
                "a:br" => html.push_str("<br/>"),
                _ => {},
            }
        }

        html.push_str("</div>");
    }

    html
}

/// `true` when the body is laid out vertically (`bodyPr@vert`).
pub(crate) fn is_vertical(tx_body: &Element) -> bool {
    matches!(
        tx_body.child("a:bodyPr").and_then(|b| b.attr("vert")),
        Some("eaVert") | Some("vert") | Some("vert270") | Some("mongolianVert")
            | Some("wordArtVert") | Some("wordArtVertRtl")
    )
}

/// Vertical anchor of the body (`top`, `center`, `bottom`).
pub(crate) fn v_align(tx_body: &Element) -> Option<&'static str> {
    match tx_body.child("a:bodyPr").and_then(|b| b.attr("anchor")) {
        Some("t") => Some("top"),
        Some("ctr") => Some("center"),
        Some("b") => Some("bottom"),
        _ => None,
    }
}

fn paragraph_align(p_pr: Option<&Element>, ph_type: Option<&str>) -> Option<&'static str> {
    match p_pr.and_then(|p| p.attr("algn")) {
        Some("l") => Some("left"),
        Some("ctr") => Some("center"),
        Some("r") => Some("right"),
        Some("just") => Some("justify"),
        Some(_) => None,
        // centered titles are the PresentationML default
        None => match ph_type {
            Some("ctrTitle") => Some("center"),
            _ => None,
        },
    }
}

fn render_run(
    run: &Element,
    text: &str,
    tx_body: &Element,
    p_pr: Option<&Element>,
    args: &TextBodyArgs<'_>,
    ctx: &SlideContext<'_>,
    level: usize,
) -> String {
    let r_pr = run.child("a:rPr");
    let chain = property_chain(r_pr, p_pr, tx_body, args, ctx, level);

    let mut style = String::new();
    if let Some(b) = first_attr(&chain, "b") {
        if b == "1" {
            style.push_str("font-weight:bold;");
        }
    }
    if let Some(i) = first_attr(&chain, "i") {
        if i == "1" {
            style.push_str("font-style:italic;");
        }
    }
    match first_attr(&chain, "u") {
        Some("none") | None => {},
        Some(_) => style.push_str("text-decoration:underline;"),
    }
    if let Some(strike) = first_attr(&chain, "strike") {
        if strike != "noStrike" {
            style.push_str("text-decoration:line-through;");
        }
    }
    if let Some(sz) = first_attr(&chain, "sz").and_then(|v| v.parse::<f64>().ok()) {
        style.push_str(&format!("font-size:{}pt;", sz / 100.0));
    }
    if let Some(face) = chain
        .iter()
        .find_map(|pr| pr.child("a:latin").and_then(|l| l.attr("typeface")))
    {
        style.push_str(&format!("font-family:{};", face));
    }
    if let Some(color) = chain.iter().find_map(|pr| {
        pr.child("a:solidFill")
            .and_then(|f| resolve_solid_fill(f, &ctx.color_scope(None)))
    }) {
        style.push_str(&format!("color:{};", color));
    }

    if style.is_empty() {
        format!("<span>{}</span>", escape_html(text))
    } else {
        format!(r#"<span style="{}">{}</span>"#, style, escape_html(text))
    }
}

/// Run-property nodes in precedence order: the run, the paragraph default,
/// the placeholder list styles, the master text styles, the presentation
/// default.
fn property_chain<'a>(
    r_pr: Option<&'a Element>,
    p_pr: Option<&'a Element>,
    tx_body: &'a Element,
    args: &TextBodyArgs<'a>,
    ctx: &'a SlideContext<'_>,
    level: usize,
) -> Vec<&'a Element> {
    let mut chain = Vec::new();
    if let Some(pr) = r_pr {
        chain.push(pr);
    }

    let lvl_name = format!("a:lvl{}pPr", level + 1);

    if let Some(def) = p_pr.and_then(|p| p.child("a:defRPr")) {
        chain.push(def);
    }
    if let Some(def) = tx_body
        .child("a:lstStyle")
        .and_then(|l| l.child(&lvl_name))
        .and_then(|l| l.child("a:defRPr"))
    {
        chain.push(def);
    }

    for ph in [args.layout_ph, args.master_ph].into_iter().flatten() {
        if let Some(def) = ph
            .get(&["p:txBody", "a:lstStyle"])
            .and_then(|l| l.child(&lvl_name))
            .and_then(|l| l.child("a:defRPr"))
        {
            chain.push(def);
        }
    }

    if let Some(styles) = ctx.master_text_styles() {
        let slot = match args.ph_type {
            Some("title") | Some("ctrTitle") => "p:titleStyle",
            Some("body") | Some("subTitle") => "p:bodyStyle",
            _ => "p:otherStyle",
        };
        if let Some(def) = styles
            .child(slot)
            .and_then(|s| s.child(&lvl_name))
            .and_then(|l| l.child("a:defRPr"))
        {
            chain.push(def);
        }
    }

    if let Some(def) = ctx
        .pkg
        .default_text_style
        .as_ref()
        .and_then(|d| d.child(&lvl_name))
        .and_then(|l| l.child("a:defRPr"))
    {
        chain.push(def);
    }

    chain
}

fn first_attr<'a>(chain: &[&'a Element], name: &str) -> Option<&'a str> {
    chain.iter().find_map(|pr| pr.attr(name))
}

/// Paragraph bullet: explicit `a:buChar`, an auto-number counter, or the
/// inherited default from the placeholder/master list styles. `a:buNone`
/// suppresses inheritance.
fn bullet_marker(
    tx_body: &Element,
    p_pr: Option<&Element>,
    args: &TextBodyArgs<'_>,
    ctx: &SlideContext<'_>,
    level: usize,
    auto_num: &mut [u32; 9],
) -> Option<String> {
    let bullet_of = |pr: &Element| -> Option<BulletSpec> {
        if pr.child("a:buNone").is_some() {
            return Some(BulletSpec::None);
        }
        if let Some(ch) = pr.child("a:buChar").and_then(|b| b.attr("char")) {
            return Some(BulletSpec::Char(ch.to_string()));
        }
        if pr.child("a:buAutoNum").is_some() {
            return Some(BulletSpec::AutoNum);
        }
        None
    };

    let lvl_name = format!("a:lvl{}pPr", level + 1);
    let mut spec = p_pr.and_then(bullet_of);

    if spec.is_none() {
        let mut level_nodes: Vec<&Element> = Vec::new();
        if let Some(l) = tx_body.child("a:lstStyle").and_then(|l| l.child(&lvl_name)) {
            level_nodes.push(l);
        }
        for ph in [args.layout_ph, args.master_ph].into_iter().flatten() {
            if let Some(l) = ph
                .get(&["p:txBody", "a:lstStyle"])
                .and_then(|l| l.child(&lvl_name))
            {
                level_nodes.push(l);
            }
        }
        if let Some(styles) = ctx.master_text_styles() {
            let slot = match args.ph_type {
                Some("title") | Some("ctrTitle") => "p:titleStyle",
                Some("body") | Some("subTitle") => "p:bodyStyle",
                _ => "p:otherStyle",
            };
            if let Some(l) = styles.child(slot).and_then(|s| s.child(&lvl_name)) {
                level_nodes.push(l);
            }
        }
        spec = level_nodes.iter().find_map(|l| bullet_of(l));
    }

    match spec {
        Some(BulletSpec::Char(ch)) => Some(format!(
            r#"<span class="bullet">{}&nbsp;</span>"#,
            escape_html(&ch)
        )),
        Some(BulletSpec::AutoNum) => {
            auto_num[level] += 1;
            Some(format!(
                r#"<span class="bullet">{}.&nbsp;</span>"#,
                auto_num[level]
            ))
        },
        Some(BulletSpec::None) | None => None,
    }
}

enum BulletSpec {
    None,
    Char(String),
    AutoNum,
}

/// Plain-text extraction for consumers that only need the words (tables
/// use this for cell content).
pub(crate) fn plain_text(tx_body: &Element) -> String {
    let mut out = String::new();
    for para in tx_body.children("a:p") {
        if !out.is_empty() {
            out.push('\n');
        }
        for node in para.elements() {
            match node.name() {
                "a:r" | "a:fld" => {
                    if let Some(t) = node.child("a:t") {
                        out.push_str(&t.text());
                    }
                },
                "a:br" => out.push('\n'),
                _ => {},
            }
        }
    }
    out
}
