//! Parsing of computed CSS color values
//!
//! Layer styles arrive as computed-style strings: `rgb(...)`, `rgba(...)`,
//! hex, or a gradient whose first stop carries the color that matters.

use crate::error::{Result, TintError};
use crate::types::{Rgb, Rgba};

/// Parse a single CSS color value
pub fn parse_css_color(value: &str) -> Result<Rgba> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("transparent") {
        return Ok(Rgba::new(Rgb::BLACK, 0.0));
    }
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    if let Some(rest) = v.strip_prefix("rgba(") {
        return parse_rgba(rest.trim_end_matches(')'));
    }
    if let Some(rest) = v.strip_prefix("rgb(") {
        let (r, g, b) = parse_rgb_components(rest.trim_end_matches(')'))?;
        return Ok(Rgba::opaque(Rgb::new(r, g, b)));
    }
    Err(TintError::InvalidColor(v.to_string()))
}

/// First color that parses inside a larger value such as a gradient
pub fn first_css_color(value: &str) -> Option<Rgba> {
    for (idx, _) in value.char_indices() {
        let rest = &value[idx..];
        let candidate = if rest.starts_with("rgba(") || rest.starts_with("rgb(") {
            rest.find(')').map(|end| &rest[..=end])
        } else if rest.starts_with('#') {
            let digits = rest[1..]
                .chars()
                .take_while(char::is_ascii_hexdigit)
                .count();
            Some(&rest[..=digits])
        } else {
            None
        };

        if let Some(color) = candidate.and_then(|c| parse_css_color(c).ok()) {
            return Some(color);
        }
    }
    None
}

/// Target of the first `url(...)` in a background-image value
pub fn extract_css_url(value: &str) -> Option<String> {
    let start = value.find("url(")? + "url(".len();
    let rest = &value[start..];
    let end = rest.find(')')?;
    let url = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');
    (!url.is_empty()).then(|| url.to_string())
}

fn parse_hex_color(hex: &str) -> Result<Rgba> {
    let value = hex.trim();
    let invalid = || TintError::InvalidColor(format!("#{value}"));
    let bits = match value.len() {
        6 | 8 => u32::from_str_radix(value, 16).map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    Ok(if value.len() == 6 {
        let r = ((bits >> 16) & 0xFF) as u8;
        let g = ((bits >> 8) & 0xFF) as u8;
        let b = (bits & 0xFF) as u8;
        Rgba::opaque(Rgb::new(r, g, b))
    } else {
        let r = ((bits >> 24) & 0xFF) as u8;
        let g = ((bits >> 16) & 0xFF) as u8;
        let b = ((bits >> 8) & 0xFF) as u8;
        let a = f64::from(bits & 0xFF) / 255.0;
        Rgba::new(Rgb::new(r, g, b), a)
    })
}

fn parse_rgba(input: &str) -> Result<Rgba> {
    let parts: Vec<_> = input.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(TintError::InvalidColor(format!(
            "rgba expects 4 components: {input}"
        )));
    }
    let (r, g, b) = parse_rgb_components(&parts[0..3].join(","))?;
    let alpha = parse_alpha(parts[3])?;
    Ok(Rgba::new(Rgb::new(r, g, b), alpha))
}

fn parse_rgb_components(input: &str) -> Result<(u8, u8, u8)> {
    let parts: Vec<_> = input.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(TintError::InvalidColor(format!(
            "rgb expects 3 components: {input}"
        )));
    }
    Ok((
        parse_component(parts[0])?,
        parse_component(parts[1])?,
        parse_component(parts[2])?,
    ))
}

fn parse_component(src: &str) -> Result<u8> {
    let value: f64 = src
        .parse()
        .map_err(|_| TintError::InvalidColor(format!("channel {src}")))?;
    if !(0.0..=255.0).contains(&value) {
        return Err(TintError::InvalidColor(format!("channel out of range {src}")));
    }
    Ok(value.round() as u8)
}

fn parse_alpha(src: &str) -> Result<f64> {
    let invalid = || TintError::InvalidColor(format!("alpha {src}"));
    let value = match src.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().map_err(|_| invalid())? / 100.0,
        None => src.parse::<f64>().map_err(|_| invalid())?,
    };
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(
            parse_css_color("rgb(12, 34, 56)").unwrap(),
            Rgba::opaque(Rgb::new(12, 34, 56))
        );
        assert_eq!(
            parse_css_color("rgba(0, 0, 0, 0.45)").unwrap(),
            Rgba::new(Rgb::BLACK, 0.45)
        );
        assert_eq!(
            parse_css_color("rgba(255,255,255,50%)").unwrap(),
            Rgba::new(Rgb::WHITE, 0.5)
        );
    }

    #[test]
    fn parses_hex() {
        assert_eq!(
            parse_css_color("#1db954").unwrap(),
            Rgba::opaque(Rgb::new(29, 185, 84))
        );
        let with_alpha = parse_css_color("#000000ff").unwrap();
        assert_eq!(with_alpha.alpha, 1.0);
    }

    #[test]
    fn transparent_is_zero_alpha() {
        assert_eq!(parse_css_color("transparent").unwrap().alpha, 0.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_css_color("hsl(10, 20%, 30%)").is_err());
        assert!(parse_css_color("#12345").is_err());
        assert!(parse_css_color("rgb(300, 0, 0)").is_err());
        assert!(parse_css_color("rgba(0, 0, 0)").is_err());
    }

    #[test]
    fn first_color_of_gradient() {
        let gradient = "linear-gradient(180deg, rgba(10, 20, 30, 0.6) 0%, rgba(0, 0, 0, 0.9) 100%)";
        assert_eq!(
            first_css_color(gradient),
            Some(Rgba::new(Rgb::new(10, 20, 30), 0.6))
        );
        assert_eq!(first_css_color("none"), None);
        assert_eq!(
            first_css_color("radial-gradient(#ff0000, #000000)"),
            Some(Rgba::opaque(Rgb::new(255, 0, 0)))
        );
    }

    #[test]
    fn extracts_background_url() {
        assert_eq!(
            extract_css_url(r#"url("https://img.example.com/a.jpg")"#).as_deref(),
            Some("https://img.example.com/a.jpg")
        );
        assert_eq!(
            extract_css_url("url(/covers/b.png), linear-gradient(red, blue)").as_deref(),
            Some("/covers/b.png")
        );
        assert_eq!(extract_css_url("none"), None);
        assert_eq!(extract_css_url("url(\"\")"), None);
    }
}
