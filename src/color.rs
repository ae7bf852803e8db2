//! Color resolution for DrawingML color subtrees.
//!
//! A color element carries one base color (`a:srgbClr`, `a:schemeClr`,
//! `a:scrgbClr`, `a:prstClr`, `a:hslClr`, `a:sysClr`) plus modulation
//! children. The modulations do not commute, so the application order is
//! fixed: alpha, hueMod, lumMod, lumOff, satMod, shade, tint. Scheme names
//! resolve through the active color map into the theme's `a:clrScheme`, with
//! `phClr` substituted by the inherited placeholder color when one is in
//! scope.

use crate::units::percentage;
use crate::xml::Element;

/// Resolution scope for scheme and placeholder colors.
///
/// `theme` is the theme part root. `clr_map` is the active color-map element
/// (slide override, layout override, or the master `p:clrMap`). `ph_clr` is
/// the already-resolved placeholder color, `#RRGGBB` form.
#[derive(Clone, Copy, Default)]
pub(crate) struct ColorScope<'a> {
    pub theme: Option<&'a Element>,
    pub clr_map: Option<&'a Element>,
    pub ph_clr: Option<&'a str>,
}

const BASE_COLOR_KINDS: [&str; 6] = [
    "a:srgbClr",
    "a:schemeClr",
    "a:scrgbClr",
    "a:prstClr",
    "a:hslClr",
    "a:sysClr",
];

/// Resolve a container holding one base-color child (`a:solidFill`, a
/// gradient stop, `a:fgClr`, ...) to `#RRGGBB` or `#RRGGBBAA`.
pub(crate) fn resolve_solid_fill(container: &Element, scope: &ColorScope) -> Option<String> {
    for kind in BASE_COLOR_KINDS {
        if let Some(clr) = container.child(kind) {
            return resolve_color_node(clr, scope);
        }
    }
    None
}

/// The base-color child of a container, if any.
pub(crate) fn color_node(container: &Element) -> Option<&Element> {
    BASE_COLOR_KINDS.iter().find_map(|kind| container.child(kind))
}

/// Resolve a color element itself (one of the six base kinds).
pub(crate) fn resolve_color_node(clr: &Element, scope: &ColorScope) -> Option<String> {
    let base = base_color(clr, scope)?;
    let (mut rgb, _) = parse_hex(&base)?;

    // Alpha first; the flag keeps the suffix through the HSL passes. Full
    // opacity round-trips to the plain 6-digit form.
    let mut alpha: Option<u8> = None;
    if let Some(a) = clr.child("a:alpha").and_then(|e| e.attr("val")) {
        if let Some(f) = percentage(a) {
            if f < 1.0 {
                alpha = Some((f.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
    }

    for (name, apply) in MODULATIONS {
        if let Some(val) = clr.child(name).and_then(|e| e.attr("val")) {
            if let Some(f) = percentage(val) {
                rgb = modulate(rgb, f, apply);
            }
        }
    }

    Some(format!("#{}", encode(rgb, alpha)))
}

/// Look a scheme color name up through the color map and the theme.
///
/// When the mapped slot is `phClr` and a placeholder color is in scope, the
/// placeholder color wins verbatim.
pub(crate) fn scheme_color(name: &str, scope: &ColorScope) -> Option<String> {
    let mut slot = name;

    if let Some(map) = scope.clr_map {
        if let Some(mapped) = map.attr(slot) {
            slot = mapped;
        }
    }
    // Bare background/text references resolve even without a color map.
    slot = match slot {
        "bg1" => "lt1",
        "tx1" => "dk1",
        "bg2" => "lt2",
        "tx2" => "dk2",
        other => other,
    };

    if slot == "phClr" {
        if let Some(ph) = scope.ph_clr {
            return Some(ph.trim_start_matches('#').to_string());
        }
    }

    let scheme = scope
        .theme?
        .get(&["a:themeElements", "a:clrScheme"])?
        .child(&format!("a:{}", slot))?;

    if let Some(srgb) = scheme.child("a:srgbClr").and_then(|e| e.attr("val")) {
        return Some(srgb.to_string());
    }
    scheme
        .child("a:sysClr")
        .and_then(|e| e.attr("lastClr"))
        .map(|v| v.to_string())
}

type Channel = fn(&mut f64, &mut f64, &mut f64, f64);

const MODULATIONS: [(&str, Channel); 6] = [
    ("a:hueMod", |h, _, _, f| *h = (*h * f).rem_euclid(360.0)),
    ("a:lumMod", |_, _, l, f| *l *= f),
    ("a:lumOff", |_, _, l, f| *l += f),
    ("a:satMod", |_, s, _, f| *s *= f),
    ("a:shade", |_, _, l, f| *l *= f),
    ("a:tint", |_, _, l, f| *l += (1.0 - *l) * f),
];

fn modulate(rgb: (u8, u8, u8), f: f64, apply: Channel) -> (u8, u8, u8) {
    let (mut h, mut s, mut l) = rgb_to_hsl(rgb);
    apply(&mut h, &mut s, &mut l, f);
    s = s.clamp(0.0, 1.0);
    l = l.clamp(0.0, 1.0);
    hsl_to_rgb(h, s, l)
}

fn base_color(clr: &Element, scope: &ColorScope) -> Option<String> {
    match clr.name() {
        "a:srgbClr" => clr.attr("val").map(|v| v.to_string()),
        "a:schemeClr" => scheme_color(clr.attr("val")?, scope),
        "a:scrgbClr" => {
            let ch = |name: &str| -> Option<u8> {
                percentage(clr.attr(name)?).map(|f| (f.clamp(0.0, 1.0) * 255.0).round() as u8)
            };
            let (r, g, b) = (ch("r")?, ch("g")?, ch("b")?);
            Some(format!("{:02X}{:02X}{:02X}", r, g, b))
        },
        "a:prstClr" => preset_color(clr.attr("val")?).map(|v| v.to_string()),
        "a:hslClr" => {
            let hue = clr.attr("hue")?.parse::<f64>().ok()? / 100_000.0;
            let sat = percentage(clr.attr("sat")?)?;
            let lum = percentage(clr.attr("lum")?)?;
            let (r, g, b) = hsl_to_rgb(hue.rem_euclid(360.0), sat, lum);
            Some(format!("{:02X}{:02X}{:02X}", r, g, b))
        },
        "a:sysClr" => clr.attr("lastClr").map(|v| v.to_string()),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<((u8, u8, u8), Option<u8>)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let rgb = (byte(0)?, byte(2)?, byte(4)?);
    let alpha = if hex.len() == 8 { Some(byte(6)?) } else { None };
    Some((rgb, alpha))
}

fn encode(rgb: (u8, u8, u8), alpha: Option<u8>) -> String {
    match alpha {
        Some(a) => format!("{:02X}{:02X}{:02X}{:02X}", rgb.0, rgb.1, rgb.2, a),
        None => format!("{:02X}{:02X}{:02X}", rgb.0, rgb.1, rgb.2),
    }
}

/// RGB (0..=255 per channel) to HSL (hue in degrees, sat/lum 0..=1).
pub(crate) fn rgb_to_hsl((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        60.0 * (((g - b) / d).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / d + 2.0)
    } else {
        60.0 * ((r - g) / d + 4.0)
    };
    (h, s, l)
}

/// HSL back to RGB bytes.
pub(crate) fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

/// OOXML preset color names (ST_PresetColorVal) to sRGB hex.
fn preset_color(name: &str) -> Option<&'static str> {
    Some(match name {
        "aliceBlue" => "F0F8FF",
        "antiqueWhite" => "FAEBD7",
        "aqua" => "00FFFF",
        "aquamarine" => "7FFFD4",
        "azure" => "F0FFFF",
        "beige" => "F5F5DC",
        "bisque" => "FFE4C4",
        "black" => "000000",
        "blanchedAlmond" => "FFEBCD",
        "blue" => "0000FF",
        "blueViolet" => "8A2BE2",
        "brown" => "A52A2A",
        "burlyWood" => "DEB887",
        "cadetBlue" => "5F9EA0",
        "chartreuse" => "7FFF00",
        "chocolate" => "D2691E",
        "coral" => "FF7F50",
        "cornflowerBlue" => "6495ED",
        "cornsilk" => "FFF8DC",
        "crimson" => "DC143C",
        "cyan" => "00FFFF",
        "darkBlue" => "00008B",
        "darkCyan" => "008B8B",
        "darkGoldenrod" => "B8860B",
        "darkGray" | "darkGrey" => "A9A9A9",
        "darkGreen" => "006400",
        "darkKhaki" => "BDB76B",
        "darkMagenta" => "8B008B",
        "darkOliveGreen" => "556B2F",
        "darkOrange" => "FF8C00",
        "darkOrchid" => "9932CC",
        "darkRed" => "8B0000",
        "darkSalmon" => "E9967A",
        "darkSeaGreen" => "8FBC8F",
        "darkSlateBlue" => "483D8B",
        "darkSlateGray" | "darkSlateGrey" => "2F4F4F",
        "darkTurquoise" => "00CED1",
        "darkViolet" => "9400D3",
        "deepPink" => "FF1493",
        "deepSkyBlue" => "00BFFF",
        "dimGray" | "dimGrey" => "696969",
        "dodgerBlue" => "1E90FF",
        "firebrick" => "B22222",
        "floralWhite" => "FFFAF0",
        "forestGreen" => "228B22",
        "fuchsia" => "FF00FF",
        "gainsboro" => "DCDCDC",
        "ghostWhite" => "F8F8FF",
        "gold" => "FFD700",
        "goldenrod" => "DAA520",
        "gray" | "grey" => "808080",
        "green" => "008000",
        "greenYellow" => "ADFF2F",
        "honeydew" => "F0FFF0",
        "hotPink" => "FF69B4",
        "indianRed" => "CD5C5C",
        "indigo" => "4B0082",
        "ivory" => "FFFFF0",
        "khaki" => "F0E68C",
        "lavender" => "E6E6FA",
        "lavenderBlush" => "FFF0F5",
        "lawnGreen" => "7CFC00",
        "lemonChiffon" => "FFFACD",
        "ltBlue" | "lightBlue" => "ADD8E6",
        "ltCoral" | "lightCoral" => "F08080",
        "ltCyan" | "lightCyan" => "E0FFFF",
        "ltGoldenrodYellow" | "lightGoldenrodYellow" => "FAFAD2",
        "ltGray" | "ltGrey" | "lightGray" | "lightGrey" => "D3D3D3",
        "ltGreen" | "lightGreen" => "90EE90",
        "ltPink" | "lightPink" => "FFB6C1",
        "ltSalmon" | "lightSalmon" => "FFA07A",
        "ltSeaGreen" | "lightSeaGreen" => "20B2AA",
        "ltSkyBlue" | "lightSkyBlue" => "87CEFA",
        "ltSlateGray" | "ltSlateGrey" | "lightSlateGray" | "lightSlateGrey" => "778899",
        "ltSteelBlue" | "lightSteelBlue" => "B0C4DE",
        "ltYellow" | "lightYellow" => "FFFFE0",
        "lime" => "00FF00",
        "limeGreen" => "32CD32",
        "linen" => "FAF0E6",
        "magenta" => "FF00FF",
        "maroon" => "800000",
        "medAquamarine" | "mediumAquamarine" => "66CDAA",
        "medBlue" | "mediumBlue" => "0000CD",
        "medOrchid" | "mediumOrchid" => "BA55D3",
        "medPurple" | "mediumPurple" => "9370DB",
        "medSeaGreen" | "mediumSeaGreen" => "3CB371",
        "medSlateBlue" | "mediumSlateBlue" => "7B68EE",
        "medSpringGreen" | "mediumSpringGreen" => "00FA9A",
        "medTurquoise" | "mediumTurquoise" => "48D1CC",
        "medVioletRed" | "mediumVioletRed" => "C71585",
        "midnightBlue" => "191970",
        "mintCream" => "F5FFFA",
        "mistyRose" => "FFE4E1",
        "moccasin" => "FFE4B5",
        "navajoWhite" => "FFDEAD",
        "navy" => "000080",
        "oldLace" => "FDF5E6",
        "olive" => "808000",
        "oliveDrab" => "6B8E23",
        "orange" => "FFA500",
        "orangeRed" => "FF4500",
        "orchid" => "DA70D6",
        "paleGoldenrod" => "EEE8AA",
        "paleGreen" => "98FB98",
        "paleTurquoise" => "AFEEEE",
        "paleVioletRed" => "DB7093",
        "papayaWhip" => "FFEFD5",
        "peachPuff" => "FFDAB9",
        "peru" => "CD853F",
        "pink" => "FFC0CB",
        "plum" => "DDA0DD",
        "powderBlue" => "B0E0E6",
        "purple" => "800080",
        "red" => "FF0000",
        "rosyBrown" => "BC8F8F",
        "royalBlue" => "4169E1",
        "saddleBrown" => "8B4513",
        "salmon" => "FA8072",
        "sandyBrown" => "F4A460",
        "seaGreen" => "2E8B57",
        "seaShell" => "FFF5EE",
        "sienna" => "A0522D",
        "silver" => "C0C0C0",
        "skyBlue" => "87CEEB",
        "slateBlue" => "6A5ACD",
        "slateGray" | "slateGrey" => "708090",
        "snow" => "FFFAFA",
        "springGreen" => "00FF7F",
        "steelBlue" => "4682B4",
        "tan" => "D2B48C",
        "teal" => "008080",
        "thistle" => "D8BFD8",
        "tomato" => "FF6347",
        "turquoise" => "40E0D0",
        "violet" => "EE82EE",
        "wheat" => "F5DEB3",
        "white" => "FFFFFF",
        "whiteSmoke" => "F5F5F5",
        "yellow" => "FFFF00",
        "yellowGreen" => "9ACD32",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element;

    fn fill(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    fn theme(accent1: &str) -> Element {
        Element::parse(
            format!(
                r#"<a:theme xmlns:a="urn:a"><a:themeElements><a:clrScheme>
                     <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
                     <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
                     <a:accent1><a:srgbClr val="{accent1}"/></a:accent1>
                   </a:clrScheme></a:themeElements></a:theme>"#
            )
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn srgb_passthrough() {
        let f = fill(r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="FF0000"/></a:solidFill>"#);
        assert_eq!(
            resolve_solid_fill(&f, &ColorScope::default()).unwrap(),
            "#FF0000"
        );
    }

    #[test]
    fn alpha_gives_eight_digits() {
        let f = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="336699"><a:alpha val="50000"/></a:srgbClr></a:solidFill>"#,
        );
        assert_eq!(
            resolve_solid_fill(&f, &ColorScope::default()).unwrap(),
            "#33669980"
        );
    }

    #[test]
    fn full_alpha_round_trips_to_six_digit_form() {
        let f = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="336699"><a:alpha val="100000"/></a:srgbClr></a:solidFill>"#,
        );
        assert_eq!(
            resolve_solid_fill(&f, &ColorScope::default()).unwrap(),
            "#336699"
        );
    }

    #[test]
    fn scheme_lookup_through_theme() {
        let th = theme("4472C4");
        let scope = ColorScope {
            theme: Some(&th),
            ..Default::default()
        };
        let f = fill(r#"<a:solidFill xmlns:a="urn:a"><a:schemeClr val="accent1"/></a:solidFill>"#);
        assert_eq!(resolve_solid_fill(&f, &scope).unwrap(), "#4472C4");
    }

    #[test]
    fn scheme_lookup_through_color_map() {
        let th = theme("4472C4");
        let map = Element::new_for_test("p:clrMap", &[("bg1", "dk1")]);
        let scope = ColorScope {
            theme: Some(&th),
            clr_map: Some(&map),
            ph_clr: None,
        };
        let f = fill(r#"<a:solidFill xmlns:a="urn:a"><a:schemeClr val="bg1"/></a:solidFill>"#);
        assert_eq!(resolve_solid_fill(&f, &scope).unwrap(), "#000000");
    }

    #[test]
    fn bg1_aliases_lt1_without_map() {
        let th = theme("4472C4");
        let scope = ColorScope {
            theme: Some(&th),
            ..Default::default()
        };
        assert_eq!(scheme_color("bg1", &scope).unwrap(), "FFFFFF");
        assert_eq!(scheme_color("tx1", &scope).unwrap(), "000000");
    }

    #[test]
    fn ph_clr_substitution() {
        let scope = ColorScope {
            ph_clr: Some("#ABCDEF"),
            ..Default::default()
        };
        let f = fill(r#"<a:solidFill xmlns:a="urn:a"><a:schemeClr val="phClr"/></a:solidFill>"#);
        assert_eq!(resolve_solid_fill(&f, &scope).unwrap(), "#ABCDEF");
    }

    #[test]
    fn lum_mod_identity() {
        let f = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="4472C4"><a:lumMod val="100000"/><a:lumOff val="0"/></a:srgbClr></a:solidFill>"#,
        );
        assert_eq!(
            resolve_solid_fill(&f, &ColorScope::default()).unwrap(),
            "#4472C4"
        );
    }

    #[test]
    fn tint_one_is_white_shade_zero_is_black() {
        let t = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="4472C4"><a:tint val="100000"/></a:srgbClr></a:solidFill>"#,
        );
        assert_eq!(resolve_solid_fill(&t, &ColorScope::default()).unwrap(), "#FFFFFF");
        let s = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="4472C4"><a:shade val="0"/></a:srgbClr></a:solidFill>"#,
        );
        assert_eq!(resolve_solid_fill(&s, &ColorScope::default()).unwrap(), "#000000");
    }

    #[test]
    fn lum_pair_formula() {
        // lumMod then lumOff compose to L' = L * 0.75 + 0.25
        let f = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:srgbClr val="4472C4"><a:lumMod val="75000"/><a:lumOff val="25000"/></a:srgbClr></a:solidFill>"#,
        );
        let out = resolve_solid_fill(&f, &ColorScope::default()).unwrap();
        let ((r, g, b), _) = parse_hex(&out).unwrap();
        let (_, _, l_in) = rgb_to_hsl((0x44, 0x72, 0xC4));
        let (_, _, l_out) = rgb_to_hsl((r, g, b));
        assert!((l_out - (l_in * 0.75 + 0.25)).abs() < 0.01);
    }

    #[test]
    fn preset_and_scrgb_and_hsl() {
        let p = fill(r#"<a:solidFill xmlns:a="urn:a"><a:prstClr val="navy"/></a:solidFill>"#);
        assert_eq!(resolve_solid_fill(&p, &ColorScope::default()).unwrap(), "#000080");

        let s = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:scrgbClr r="100000" g="0" b="0"/></a:solidFill>"#,
        );
        assert_eq!(resolve_solid_fill(&s, &ColorScope::default()).unwrap(), "#FF0000");

        let h = fill(
            r#"<a:solidFill xmlns:a="urn:a"><a:hslClr hue="0" sat="100000" lum="50000"/></a:solidFill>"#,
        );
        assert_eq!(resolve_solid_fill(&h, &ColorScope::default()).unwrap(), "#FF0000");
    }

    #[test]
    fn hsl_round_trip() {
        for rgb in [(0x44, 0x72, 0xC4), (0, 0, 0), (255, 255, 255), (1, 2, 3)] {
            let (h, s, l) = rgb_to_hsl(rgb);
            assert_eq!(hsl_to_rgb(h, s, l), rgb);
        }
    }
}
