// CSS-style color parsing (#rgb, #rrggbb, rgb(r, g, b), named colors)

use crate::error::{ChartError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{alpha1, char, multispace0, u8 as dec_u8},
    combinator::{all_consuming, map_opt, map_res},
    sequence::{delimited, preceded, tuple},
    IResult,
};
use plotters::style::RGBColor;

const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("lime", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 128)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("lightgray", (211, 211, 211)),
    ("darkgray", (169, 169, 169)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("maroon", (128, 0, 0)),
    ("olive", (128, 128, 0)),
    ("steelblue", (70, 130, 180)),
    ("darkred", (139, 0, 0)),
    ("gold", (255, 215, 0)),
    ("pink", (255, 192, 203)),
    ("brown", (165, 42, 42)),
];

fn hex_value(input: &str) -> IResult<&str, RGBColor> {
    map_res(
        preceded(char('#'), take_while_m_n(3, 6, |c: char| c.is_ascii_hexdigit())),
        |digits: &str| -> std::result::Result<RGBColor, String> {
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).collect(),
                6 => digits.to_string(),
                n => return Err(format!("expected 3 or 6 hex digits, got {}", n)),
            };
            let byte_at = |i: usize| {
                u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|e| e.to_string())
            };
            Ok(RGBColor(byte_at(0)?, byte_at(2)?, byte_at(4)?))
        },
    )(input)
}

fn channel(input: &str) -> IResult<&str, u8> {
    delimited(multispace0, dec_u8, multispace0)(input)
}

fn rgb_function(input: &str) -> IResult<&str, RGBColor> {
    let (input, (r, _, g, _, b)) = delimited(
        tag("rgb("),
        tuple((channel, char(','), channel, char(','), channel)),
        char(')'),
    )(input)?;
    Ok((input, RGBColor(r, g, b)))
}

fn named(input: &str) -> IResult<&str, RGBColor> {
    map_opt(alpha1, |name: &str| {
        let lower = name.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, (r, g, b))| RGBColor(*r, *g, *b))
    })(input)
}

/// Parse a color string into an RGB triple.
pub fn parse_color(input: &str) -> Result<RGBColor> {
    let trimmed = input.trim();
    all_consuming(alt((hex_value, rgb_function, named)))(trimmed)
        .map(|(_, c)| c)
        .map_err(|_| ChartError::InvalidColor(input.to_string()))
}

/// Parse a color, falling back to black when it cannot be understood.
pub fn parse_color_or_black(input: &str) -> RGBColor {
    parse_color(input).unwrap_or_else(|e| {
        log::warn!("{}; using black", e);
        RGBColor(0, 0, 0)
    })
}
