//! Unit conversions and small lexical helpers.
//!
//! All OOXML lengths are English Metric Units (914,400 per inch, 12,700 per
//! point); every coordinate this crate emits is in points. Angles are stored
//! in 1/60,000 degree, percentages in 1/100,000.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

/// Angle denominator: OOXML angles are 60,000ths of a degree.
pub const ANGLE_UNITS_PER_DEGREE: i64 = 60_000;

/// Percentage denominator: OOXML percentages are 1/100,000.
pub const PERCENT_DENOMINATOR: f64 = 100_000.0;

/// Gradient stop positions are 1/1,000 of a percent point.
pub const GRADIENT_POS_DENOMINATOR: f64 = 1_000.0;

#[inline]
pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

/// Convert a 60,000-unit OOXML angle to whole signed degrees.
///
/// Absent angles read as 0.
#[inline]
pub fn angle_to_degrees(units: Option<i64>) -> i64 {
    match units {
        Some(u) => ((u as f64) / ANGLE_UNITS_PER_DEGREE as f64).round() as i64,
        None => 0,
    }
}

/// Parse a 1/100,000 percentage attribute into the 0.0..=1.0 range.
#[inline]
pub fn percentage(val: &str) -> Option<f64> {
    val.parse::<f64>().ok().map(|v| v / PERCENT_DENOMINATOR)
}

/// File extension of a part name, lowercased, without the dot.
pub fn file_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// MIME type for a media extension. Unknown extensions yield `""` so the
/// consumer can decide what to do with the bytes.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "avi" => "video/avi",
        "mpg" => "video/mpg",
        "wmv" => "video/wmv",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "",
    }
}

/// Recognize an external video link: an HTTP/FTP URL ending in a known TLD
/// segment. Relationship targets that fail this test are treated as package
/// members.
pub fn is_external_video_url(s: &str) -> bool {
    let rest = if let Some(r) = s.strip_prefix("https://") {
        r
    } else if let Some(r) = s.strip_prefix("http://") {
        r
    } else if let Some(r) = s.strip_prefix("ftp://") {
        r
    } else {
        return false;
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let tld = host.rsplit('.').next().unwrap_or("");
    matches!(
        tld.to_ascii_lowercase().as_str(),
        "com" | "net" | "org" | "edu" | "gov" | "io" | "tv" | "me" | "info" | "biz" | "cn" | "de"
            | "uk" | "jp" | "fr" | "ru"
    )
}

/// Escape the five XML-significant characters for embedding text in the
/// generated HTML bodies.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Zero-padded two-digit hex for one color channel.
#[inline]
pub fn hex_byte(n: u8) -> String {
    format!("{:02X}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emu_conversions() {
        assert_eq!(emu_to_pt(914_400), 72.0);
        assert_eq!(emu_to_pt(12_700), 1.0);
        assert_eq!(emu_to_pt(0), 0.0);
    }

    #[test]
    fn angles() {
        assert_eq!(angle_to_degrees(Some(5_400_000)), 90);
        assert_eq!(angle_to_degrees(Some(-1_800_000)), -30);
        assert_eq!(angle_to_degrees(None), 0);
    }

    #[test]
    fn percentages() {
        assert_eq!(percentage("75000"), Some(0.75));
        assert_eq!(percentage("100000"), Some(1.0));
        assert_eq!(percentage("x"), None);
    }

    #[test]
    fn mime_table_closed_set() {
        assert_eq!(mime_for_extension("JPG"), "image/jpeg");
        assert_eq!(mime_for_extension("png"), "image/png");
        assert_eq!(mime_for_extension("mp3"), "audio/mpeg");
        assert_eq!(mime_for_extension("xyz"), "");
    }

    #[test]
    fn video_urls() {
        assert!(is_external_video_url("https://example.com/clip.mp4"));
        assert!(is_external_video_url("http://cdn.example.io/v?id=1"));
        assert!(!is_external_video_url("../media/movie1.mp4"));
        assert!(!is_external_video_url("https://host.internal/clip"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_html("a & <b>"), "a &amp; &lt;b&gt;");
        assert_eq!(hex_byte(0x0A), "0A");
    }
}
