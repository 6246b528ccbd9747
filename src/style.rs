//! Style specs and their canonical resolved form
//!
//! A [`StyleSpec`] is what callers write: partial, with colors as strings.
//! [`build_style`] turns it into a [`CellStyle`] whose colors are validated
//! RGB values. Every sub-record (and every field inside one) is optional, so
//! [`CellStyle::overlay`] only replaces what the patch actually sets.

use crate::error::Result;
use crate::parse::parse_color;
use serde::Deserialize;
use std::fmt;

/// Canonical RGB color, rendered as six uppercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub fn from_rgb(rgb: u32) -> Self {
        Color(rgb & 0x00FF_FFFF)
    }

    pub fn rgb(&self) -> u32 {
        self.0
    }

    pub fn as_hex(&self) -> String {
        format!("{:06X}", self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

/// Color as supplied by a caller
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Hex string, with or without `#`, 3 or 6 digits
    Hex(String),
    /// `{"rgb": "FF0000"}` object form
    Object { rgb: String },
    /// Already resolved
    #[serde(skip)]
    Resolved(Color),
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Hex(s.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(s: String) -> Self {
        ColorSpec::Hex(s)
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        ColorSpec::Resolved(color)
    }
}

/// Resolve an optional color spec; canonical colors pass through unchanged
pub fn resolve_color(input: Option<&ColorSpec>) -> Result<Option<Color>> {
    match input {
        None => Ok(None),
        Some(ColorSpec::Resolved(color)) => Ok(Some(*color)),
        Some(ColorSpec::Hex(hex)) | Some(ColorSpec::Object { rgb: hex }) => {
            parse_color(hex).map(Some)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSpec {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub size: Option<f64>,
    pub name: Option<String>,
    pub color: Option<ColorSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlignmentSpec {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: Option<bool>,
}

/// User-facing style description
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub font: Option<FontSpec>,
    pub fill: Option<ColorSpec>,
    pub alignment: Option<AlignmentSpec>,
}

impl StyleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.font.is_none() && self.fill.is_none() && self.alignment.is_none()
    }

    fn font_mut(&mut self) -> &mut FontSpec {
        self.font.get_or_insert_with(FontSpec::default)
    }

    fn alignment_mut(&mut self) -> &mut AlignmentSpec {
        self.alignment.get_or_insert_with(AlignmentSpec::default)
    }

    pub fn bold(mut self) -> Self {
        self.font_mut().bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.font_mut().italic = Some(true);
        self
    }

    pub fn underline(mut self) -> Self {
        self.font_mut().underline = Some(true);
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_mut().size = Some(size);
        self
    }

    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.font_mut().name = Some(name.into());
        self
    }

    pub fn font_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.font_mut().color = Some(color.into());
        self
    }

    pub fn fill(mut self, color: impl Into<ColorSpec>) -> Self {
        self.fill = Some(color.into());
        self
    }

    pub fn align(mut self, horizontal: HorizontalAlign) -> Self {
        self.alignment_mut().horizontal = Some(horizontal);
        self
    }

    pub fn valign(mut self, vertical: VerticalAlign) -> Self {
        self.alignment_mut().vertical = Some(vertical);
        self
    }

    pub fn wrap_text(mut self) -> Self {
        self.alignment_mut().wrap_text = Some(true);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub size: Option<f64>,
    pub name: Option<String>,
    pub color: Option<Color>,
}

impl FontStyle {
    fn overlay(&self, patch: &FontStyle) -> FontStyle {
        FontStyle {
            bold: patch.bold.or(self.bold),
            italic: patch.italic.or(self.italic),
            underline: patch.underline.or(self.underline),
            size: patch.size.or(self.size),
            name: patch.name.clone().or_else(|| self.name.clone()),
            color: patch.color.or(self.color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    Solid,
}

/// Pattern fill; the xlsx fill model carries both colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStyle {
    pub pattern: FillPattern,
    pub foreground: Color,
    pub background: Color,
}

impl FillStyle {
    pub fn solid(color: Color) -> Self {
        Self {
            pattern: FillPattern::Solid,
            foreground: color,
            background: color,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStyle {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: Option<bool>,
}

impl AlignmentStyle {
    fn overlay(&self, patch: &AlignmentStyle) -> AlignmentStyle {
        AlignmentStyle {
            horizontal: patch.horizontal.or(self.horizontal),
            vertical: patch.vertical.or(self.vertical),
            wrap_text: patch.wrap_text.or(self.wrap_text),
        }
    }
}

/// Resolved style attached to a cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub font: Option<FontStyle>,
    pub fill: Option<FillStyle>,
    pub alignment: Option<AlignmentStyle>,
}

impl CellStyle {
    pub fn is_empty(&self) -> bool {
        self.font.is_none() && self.fill.is_none() && self.alignment.is_none()
    }

    /// Return a new style with `patch` laid over `self`
    pub fn overlay(&self, patch: &CellStyle) -> CellStyle {
        CellStyle {
            font: overlay_with(&self.font, &patch.font, FontStyle::overlay),
            fill: patch.fill.or(self.fill),
            alignment: overlay_with(&self.alignment, &patch.alignment, AlignmentStyle::overlay),
        }
    }
}

fn overlay_with<T: Clone>(
    base: &Option<T>,
    patch: &Option<T>,
    merge: impl Fn(&T, &T) -> T,
) -> Option<T> {
    match (base, patch) {
        (Some(b), Some(p)) => Some(merge(b, p)),
        (None, Some(p)) => Some(p.clone()),
        (b, None) => b.clone(),
    }
}

/// Resolve a style spec. Absent sub-records stay absent.
pub fn build_style(spec: &StyleSpec) -> Result<CellStyle> {
    let font = match &spec.font {
        Some(font) => Some(FontStyle {
            bold: font.bold,
            italic: font.italic,
            underline: font.underline,
            size: font.size,
            name: font.name.clone(),
            color: resolve_color(font.color.as_ref())?,
        }),
        None => None,
    };

    let fill = resolve_color(spec.fill.as_ref())?.map(FillStyle::solid);

    let alignment = spec.alignment.as_ref().map(|a| AlignmentStyle {
        horizontal: a.horizontal,
        vertical: a.vertical,
        wrap_text: a.wrap_text,
    });

    Ok(CellStyle {
        font,
        fill,
        alignment,
    })
}
