//! Print-style subset parsed from template stylesheets.
//!
//! The PDF branch does not embed a browser engine; instead it honors a
//! supported subset of the template CSS: `@page` margins plus
//! per-element font family/size/weight/style, text alignment, block
//! margins, line height and color. Selectors are matched by element
//! name only; anything richer is parsed and ignored. Unknown properties
//! and malformed declarations are skipped with recovery to the next
//! semicolon, the way CSS engines are expected to recover.

use std::collections::HashMap;

use cssparser::{Parser, ParserInput, Token};

/// Generic font family bucket mapped onto the builtin PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// RGB color with components in 0..=1.
pub type Color = (f32, f32, f32);

/// Properties parsed from one declaration block.
#[derive(Debug, Clone, Default)]
pub struct StyleRule {
    pub font_size_pt: Option<f32>,
    pub font_family: Option<FontFamily>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub align: Option<TextAlign>,
    pub margin_top_pt: Option<f32>,
    pub margin_bottom_pt: Option<f32>,
    pub line_height: Option<f32>,
    pub color: Option<Color>,
}

/// Page geometry for pagination, in millimeters. A4 by default.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_right_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_top_mm: 20.0,
            margin_right_mm: 20.0,
            margin_bottom_mm: 20.0,
            margin_left_mm: 20.0,
        }
    }
}

/// Fully resolved style for one element, after cascading defaults,
/// the `body` rule and the element's own rule.
#[derive(Debug, Clone, Copy)]
pub struct ComputedStyle {
    pub size_pt: f32,
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    pub line_height: f32,
    pub color: Color,
}

/// The supported style subset of one template stylesheet.
#[derive(Debug, Clone, Default)]
pub struct PrintStyles {
    pub page: PageGeometry,
    rules: HashMap<String, StyleRule>,
}

const POINTS_PER_MM: f32 = 72.0 / 25.4;

impl PrintStyles {
    /// Parse a stylesheet. Never fails: unsupported constructs are
    /// skipped so an exotic stylesheet degrades instead of aborting
    /// the PDF branch.
    pub fn parse(css: &str) -> PrintStyles {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut styles = PrintStyles::default();

        let mut selector = String::new();
        let mut selectors: Vec<String> = Vec::new();
        let mut at_rule: Option<String> = None;

        loop {
            let token = match parser.next() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::CurlyBracketBlock => {
                    if !selector.trim().is_empty() {
                        selectors.push(selector.trim().to_string());
                    }
                    selector.clear();

                    match at_rule.take().as_deref() {
                        Some("page") => {
                            let rule = parse_block(&mut parser);
                            styles.apply_page_margins(&rule);
                        }
                        Some(_) => {
                            // @media, @font-face and friends: skip.
                            let _ = parser.parse_nested_block(
                                |p| -> Result<(), cssparser::ParseError<'_, ()>> {
                                    while p.next().is_ok() {}
                                    Ok(())
                                },
                            );
                        }
                        None => {
                            let rule = parse_block(&mut parser);
                            for sel in selectors.drain(..) {
                                merge_rule(styles.rules.entry(sel).or_default(), &rule);
                            }
                        }
                    }
                    selectors.clear();
                }
                Token::AtKeyword(name) => {
                    at_rule = Some(name.to_ascii_lowercase());
                }
                Token::Comma => {
                    if !selector.trim().is_empty() {
                        selectors.push(selector.trim().to_string());
                    }
                    selector.clear();
                }
                Token::Ident(name) => {
                    if !selector.is_empty() && !selector.ends_with([' ', '.', '#', ':']) {
                        selector.push(' ');
                    }
                    selector.push_str(&name);
                }
                Token::Delim(c) => selector.push(c),
                Token::Colon => selector.push(':'),
                _ => {}
            }
        }

        styles
    }

    /// Resolve the style for one element name (`body`, `h1`, `p`, ...).
    pub fn computed(&self, element: &str) -> ComputedStyle {
        let mut style = self.base_style();
        apply_element_defaults(&mut style, element);
        if let Some(rule) = self.rules.get(element) {
            apply_rule(&mut style, rule);
        }
        style
    }

    /// The inherited base: built-in defaults overlaid with the `body` rule.
    fn base_style(&self) -> ComputedStyle {
        let mut style = ComputedStyle {
            size_pt: 11.0,
            family: FontFamily::SansSerif,
            bold: false,
            italic: false,
            align: TextAlign::Left,
            margin_top_pt: 0.0,
            margin_bottom_pt: 0.0,
            line_height: 1.3,
            color: (0.0, 0.0, 0.0),
        };
        if let Some(rule) = self.rules.get("body") {
            // Only inherited properties flow down from body.
            if let Some(size) = rule.font_size_pt {
                style.size_pt = size;
            }
            if let Some(family) = rule.font_family {
                style.family = family;
            }
            if let Some(line_height) = rule.line_height {
                style.line_height = line_height;
            }
            if let Some(color) = rule.color {
                style.color = color;
            }
        }
        style
    }

    fn apply_page_margins(&mut self, rule: &StyleRule) {
        if let Some(pt) = rule.margin_top_pt {
            self.page.margin_top_mm = pt / POINTS_PER_MM;
        }
        if let Some(pt) = rule.margin_bottom_pt {
            self.page.margin_bottom_mm = pt / POINTS_PER_MM;
        }
        // The margin shorthand parser only tracks vertical margins for
        // block spacing; @page reuses them for all four sides when the
        // shorthand had a single value.
        if let (Some(top), Some(bottom)) = (rule.margin_top_pt, rule.margin_bottom_pt)
            && (top - bottom).abs() < f32::EPSILON
        {
            self.page.margin_left_mm = top / POINTS_PER_MM;
            self.page.margin_right_mm = top / POINTS_PER_MM;
        }
    }
}

/// UA-style defaults per element, relative to the inherited base.
fn apply_element_defaults(style: &mut ComputedStyle, element: &str) {
    let base = style.size_pt;
    match element {
        "h1" => {
            style.size_pt = base * 1.8;
            style.bold = true;
            style.margin_top_pt = base * 1.2;
            style.margin_bottom_pt = base * 0.6;
        }
        "h2" => {
            style.size_pt = base * 1.4;
            style.bold = true;
            style.margin_top_pt = base;
            style.margin_bottom_pt = base * 0.5;
        }
        "h3" => {
            style.size_pt = base * 1.2;
            style.bold = true;
            style.margin_top_pt = base * 0.8;
            style.margin_bottom_pt = base * 0.4;
        }
        "h4" | "h5" | "h6" => {
            style.bold = true;
            style.margin_top_pt = base * 0.6;
            style.margin_bottom_pt = base * 0.3;
        }
        "p" => {
            style.margin_bottom_pt = base * 0.5;
        }
        "li" => {
            style.margin_bottom_pt = base * 0.2;
        }
        "pre" | "code" => {
            style.family = FontFamily::Monospace;
            style.size_pt = base * 0.9;
            style.margin_bottom_pt = base * 0.5;
        }
        "blockquote" => {
            style.italic = true;
            style.margin_bottom_pt = base * 0.5;
        }
        _ => {}
    }
}

fn apply_rule(style: &mut ComputedStyle, rule: &StyleRule) {
    if let Some(size) = rule.font_size_pt {
        style.size_pt = size;
    }
    if let Some(family) = rule.font_family {
        style.family = family;
    }
    if let Some(bold) = rule.bold {
        style.bold = bold;
    }
    if let Some(italic) = rule.italic {
        style.italic = italic;
    }
    if let Some(align) = rule.align {
        style.align = align;
    }
    if let Some(pt) = rule.margin_top_pt {
        style.margin_top_pt = pt;
    }
    if let Some(pt) = rule.margin_bottom_pt {
        style.margin_bottom_pt = pt;
    }
    if let Some(line_height) = rule.line_height {
        style.line_height = line_height;
    }
    if let Some(color) = rule.color {
        style.color = color;
    }
}

/// Later rules for the same selector override earlier ones per property.
fn merge_rule(into: &mut StyleRule, from: &StyleRule) {
    let StyleRule {
        font_size_pt,
        font_family,
        bold,
        italic,
        align,
        margin_top_pt,
        margin_bottom_pt,
        line_height,
        color,
    } = from.clone();
    if font_size_pt.is_some() {
        into.font_size_pt = font_size_pt;
    }
    if font_family.is_some() {
        into.font_family = font_family;
    }
    if bold.is_some() {
        into.bold = bold;
    }
    if italic.is_some() {
        into.italic = italic;
    }
    if align.is_some() {
        into.align = align;
    }
    if margin_top_pt.is_some() {
        into.margin_top_pt = margin_top_pt;
    }
    if margin_bottom_pt.is_some() {
        into.margin_bottom_pt = margin_bottom_pt;
    }
    if line_height.is_some() {
        into.line_height = line_height;
    }
    if color.is_some() {
        into.color = color;
    }
}

/// Parse the declaration block the parser is currently positioned on.
fn parse_block(parser: &mut Parser) -> StyleRule {
    parser
        .parse_nested_block(|p| -> Result<StyleRule, cssparser::ParseError<'_, ()>> {
            Ok(parse_declaration_block(p))
        })
        .unwrap_or_default()
}

/// Parse `property: value; ...` pairs, skipping to the next semicolon
/// on anything malformed.
fn parse_declaration_block<'i>(input: &mut Parser<'i, '_>) -> StyleRule {
    let mut rule = StyleRule::default();

    loop {
        input.skip_whitespace();
        if input.is_exhausted() {
            break;
        }

        let result: Result<(), cssparser::ParseError<'i, ()>> = input.try_parse(|i| {
            let property = match i.next()? {
                Token::Ident(name) => name.to_ascii_lowercase(),
                _ => return Err(i.new_custom_error(())),
            };

            i.skip_whitespace();
            match i.next()? {
                Token::Colon => {}
                _ => return Err(i.new_custom_error(())),
            }

            let mut values: Vec<Token> = Vec::new();
            loop {
                match i.next() {
                    Ok(Token::Semicolon) => break,
                    Ok(token) => values.push(token.clone()),
                    Err(_) => break,
                }
            }

            apply_property(&mut rule, &property, &values);
            Ok(())
        });

        if result.is_err() {
            // Skip to next semicolon to recover.
            loop {
                match input.next() {
                    Ok(Token::Semicolon) => break,
                    Ok(_) => continue,
                    Err(_) => return rule,
                }
            }
        }
    }

    rule
}

fn apply_property(rule: &mut StyleRule, property: &str, values: &[Token]) {
    match property {
        "font-size" => rule.font_size_pt = values.first().and_then(parse_length_pt),
        "font-family" => rule.font_family = parse_font_family(values),
        "font-weight" => {
            rule.bold = match values.first() {
                Some(Token::Ident(name)) => match name.to_ascii_lowercase().as_str() {
                    "bold" | "bolder" => Some(true),
                    "normal" | "lighter" => Some(false),
                    _ => None,
                },
                Some(Token::Number { value, .. }) => Some(*value >= 600.0),
                _ => None,
            };
        }
        "font-style" => {
            if let Some(Token::Ident(name)) = values.first() {
                rule.italic = match name.to_ascii_lowercase().as_str() {
                    "italic" | "oblique" => Some(true),
                    "normal" => Some(false),
                    _ => None,
                };
            }
        }
        "text-align" => {
            if let Some(Token::Ident(name)) = values.first() {
                rule.align = match name.to_ascii_lowercase().as_str() {
                    "left" | "start" | "justify" => Some(TextAlign::Left),
                    "center" => Some(TextAlign::Center),
                    "right" | "end" => Some(TextAlign::Right),
                    _ => None,
                };
            }
        }
        "line-height" => {
            rule.line_height = match values.first() {
                Some(Token::Number { value, .. }) => Some(*value),
                // Dimension line-heights become a multiplier against
                // the base size only approximately; skip them.
                _ => None,
            };
        }
        "margin" => {
            // Shorthand: 1-4 values; only the vertical pair is used.
            let parsed: Vec<f32> = values.iter().filter_map(parse_length_pt).collect();
            match parsed.len() {
                1 => {
                    rule.margin_top_pt = Some(parsed[0]);
                    rule.margin_bottom_pt = Some(parsed[0]);
                }
                2 | 3 | 4 => {
                    rule.margin_top_pt = Some(parsed[0]);
                    rule.margin_bottom_pt = Some(parsed[parsed.len().min(3) - 1]);
                }
                _ => {}
            }
        }
        "margin-top" => rule.margin_top_pt = values.first().and_then(parse_length_pt),
        "margin-bottom" => rule.margin_bottom_pt = values.first().and_then(parse_length_pt),
        "color" => rule.color = parse_color(values),
        _ => {}
    }
}

/// Convert a length token to points.
fn parse_length_pt(token: &Token) -> Option<f32> {
    match token {
        Token::Dimension { value, unit, .. } => {
            let value = *value;
            match unit.to_ascii_lowercase().as_str() {
                "pt" => Some(value),
                "px" => Some(value * 0.75),
                "em" | "rem" => Some(value * 12.0),
                "mm" => Some(value * POINTS_PER_MM),
                "cm" => Some(value * 10.0 * POINTS_PER_MM),
                "in" => Some(value * 72.0),
                _ => None,
            }
        }
        Token::Number { value, .. } if *value == 0.0 => Some(0.0),
        _ => None,
    }
}

fn parse_font_family(values: &[Token]) -> Option<FontFamily> {
    for token in values {
        let name = match token {
            Token::Ident(name) => name.to_ascii_lowercase(),
            Token::QuotedString(name) => name.to_ascii_lowercase(),
            _ => continue,
        };
        let family = match name.as_str() {
            "monospace" | "courier" | "courier new" | "consolas" => FontFamily::Monospace,
            "serif" | "georgia" | "times" | "times new roman" | "garamond" | "cambria" => {
                FontFamily::Serif
            }
            "sans-serif" | "arial" | "helvetica" | "helvetica neue" | "verdana" | "calibri"
            | "segoe ui" => FontFamily::SansSerif,
            _ => continue,
        };
        return Some(family);
    }
    None
}

fn parse_color(values: &[Token]) -> Option<Color> {
    match values.first()? {
        Token::Hash(hex) | Token::IDHash(hex) => parse_hex_color(hex),
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "black" => Some((0.0, 0.0, 0.0)),
            "white" => Some((1.0, 1.0, 1.0)),
            "gray" | "grey" => Some((0.5, 0.5, 0.5)),
            "darkgray" | "darkgrey" => Some((0.66, 0.66, 0.66)),
            "dimgray" | "dimgrey" => Some((0.41, 0.41, 0.41)),
            "navy" => Some((0.0, 0.0, 0.5)),
            "maroon" => Some((0.5, 0.0, 0.0)),
            "darkslategray" | "darkslategrey" => Some((0.18, 0.31, 0.31)),
            _ => None,
        },
        _ => None,
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    // Slicing below is byte-indexed; a multi-byte char in the token
    // would split a char boundary.
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1].repeat(2))?;
            let g = channel(&hex[1..2].repeat(2))?;
            let b = channel(&hex[2..3].repeat(2))?;
            Some((r, g, b))
        }
        6 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            Some((r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_rule_inherits() {
        let styles = PrintStyles::parse("body { font-size: 10pt; font-family: Georgia, serif; }");
        let p = styles.computed("p");
        assert_eq!(p.size_pt, 10.0);
        assert_eq!(p.family, FontFamily::Serif);
    }

    #[test]
    fn test_element_override() {
        let styles =
            PrintStyles::parse("body { font-size: 10pt; } h1 { font-size: 22pt; text-align: center; }");
        let h1 = styles.computed("h1");
        assert_eq!(h1.size_pt, 22.0);
        assert_eq!(h1.align, TextAlign::Center);
        assert!(h1.bold);
    }

    #[test]
    fn test_heading_defaults_scale_from_base() {
        let styles = PrintStyles::parse("body { font-size: 10pt; }");
        let h1 = styles.computed("h1");
        assert!((h1.size_pt - 18.0).abs() < 0.01);
        assert!(h1.bold);
    }

    #[test]
    fn test_page_margins() {
        let styles = PrintStyles::parse("@page { margin: 2cm; }");
        let page = styles.page;
        assert!((page.margin_top_mm - 20.0).abs() < 0.05);
        assert!((page.margin_left_mm - 20.0).abs() < 0.05);
    }

    #[test]
    fn test_margin_shorthand_vertical_pair() {
        let styles = PrintStyles::parse("p { margin: 4pt 0 8pt 0; }");
        let p = styles.computed("p");
        assert_eq!(p.margin_top_pt, 4.0);
        assert_eq!(p.margin_bottom_pt, 8.0);
    }

    #[test]
    fn test_hex_colors() {
        let styles = PrintStyles::parse("h2 { color: #336699; } h3 { color: #333; }");
        let (r, g, b) = styles.computed("h2").color;
        assert!((r - 0.2).abs() < 0.01 && (g - 0.4).abs() < 0.01 && (b - 0.6).abs() < 0.01);
        let (r, _, _) = styles.computed("h3").color;
        assert!((r - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_hex_color_non_ascii_ignored() {
        // "#üa" is three bytes but two chars; the declaration must be
        // dropped, not split mid-character.
        let styles = PrintStyles::parse("p { color: #\u{fc}a; }");
        assert_eq!(styles.computed("p").color, (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_font_weight_numeric() {
        let styles = PrintStyles::parse("p { font-weight: 700; } li { font-weight: 400; }");
        assert_eq!(styles.computed("p").bold, true);
        assert_eq!(styles.computed("li").bold, false);
    }

    #[test]
    fn test_malformed_declaration_recovers() {
        let styles = PrintStyles::parse("p { co!!lor:; font-size: 13pt; }");
        assert_eq!(styles.computed("p").size_pt, 13.0);
    }

    #[test]
    fn test_unknown_at_rule_skipped() {
        let css = "@media print { p { font-size: 99pt; } } p { font-size: 12pt; }";
        let styles = PrintStyles::parse(css);
        assert_eq!(styles.computed("p").size_pt, 12.0);
    }

    #[test]
    fn test_grouped_selectors() {
        let styles = PrintStyles::parse("h1, h2 { color: navy; }");
        assert_eq!(styles.computed("h1").color, (0.0, 0.0, 0.5));
        assert_eq!(styles.computed("h2").color, (0.0, 0.0, 0.5));
    }
}
