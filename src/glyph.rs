//! Large block-letter rendering of the clock digits.
//!
//! Rendering never fails loudly: a bad font produces an empty string, and
//! [`render_time_block`] walks configured font → default font → plain text.

use figlet_rs::FIGfont;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DEFAULT_FONT;

/// Sample used to decide whether a font can draw the clock at all.
pub const TIMER_SAMPLE_TEXT: &str = "00:00:00";
const FONT_FILE_EXTENSION: &str = "flf";

/// FIGlet fonts compiled into the binary alongside FIGlet's own `Standard`.
const BUNDLED_FONTS: &[(&str, &str)] = &[
    ("Block", include_str!("../fonts/Block.flf")),
    ("Dots", include_str!("../fonts/Dots.flf")),
    ("Italic", include_str!("../fonts/Italic.flf")),
    ("Pixel", include_str!("../fonts/Pixel.flf")),
    ("Shadow", include_str!("../fonts/Shadow.flf")),
];

/// Names of every font available without a font directory.
pub fn builtin_fonts() -> impl Iterator<Item = &'static str> {
    std::iter::once(DEFAULT_FONT).chain(BUNDLED_FONTS.iter().map(|(name, _)| *name))
}

fn bundled_font(font: &str) -> Option<&'static str> {
    BUNDLED_FONTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(font))
        .map(|(_, content)| *content)
}

/// `text, font -> block`. Implementations return an empty string on any failure.
pub trait GlyphRenderer {
    fn render(&self, text: &str, font: &str) -> String;
}

/// FIGlet renderer: the built-in fonts plus `.flf` files from `font_dir`. Parsed fonts
/// are cached per renderer.
pub struct FigletRenderer {
    font_dir: PathBuf,
    fonts: RefCell<HashMap<String, Option<FIGfont>>>,
}

impl FigletRenderer {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_dir: font_dir.into(),
            fonts: RefCell::new(HashMap::new()),
        }
    }

    fn load(&self, font: &str) -> Option<FIGfont> {
        if font.eq_ignore_ascii_case(DEFAULT_FONT) {
            return FIGfont::standard().ok();
        }
        let parsed = match bundled_font(font) {
            Some(content) => FIGfont::from_content(content),
            None => {
                let path = self
                    .font_dir
                    .join(format!("{font}.{FONT_FILE_EXTENSION}"));
                FIGfont::from_file(path.to_str()?)
            }
        };
        match parsed {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!(font, error = %err, "font failed to load");
                None
            }
        }
    }
}

impl GlyphRenderer for FigletRenderer {
    fn render(&self, text: &str, font: &str) -> String {
        let key = font.to_lowercase();
        let mut fonts = self.fonts.borrow_mut();
        let entry = fonts.entry(key).or_insert_with(|| self.load(font));
        entry
            .as_ref()
            .and_then(|figfont| figfont.convert(text))
            .map(|figure| figure.to_string())
            .unwrap_or_default()
    }
}

pub fn has_visible_glyphs(text: &str) -> bool {
    text.chars().any(|ch| !ch.is_whitespace())
}

pub fn is_timer_compatible(renderer: &dyn GlyphRenderer, font: &str) -> bool {
    has_visible_glyphs(&renderer.render(TIMER_SAMPLE_TEXT, font))
}

/// Split a rendered block into lines, dropping trailing blank lines. Always yields at
/// least one line.
pub fn to_display_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .replace('\r', "")
        .split('\n')
        .map(str::to_string)
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Render `text` in `font`, retrying with the default font and finally returning the
/// raw text so a frame can always be drawn.
pub fn render_time_block(renderer: &dyn GlyphRenderer, text: &str, font: &str) -> Vec<String> {
    let preferred = renderer.render(text, font);
    if has_visible_glyphs(&preferred) {
        return to_display_lines(&preferred);
    }
    let fallback = renderer.render(text, DEFAULT_FONT);
    if has_visible_glyphs(&fallback) {
        debug!(font, "font produced no glyphs; using default font");
        return to_display_lines(&fallback);
    }
    debug!(font, "no font produced glyphs; using plain text");
    vec![text.to_string()]
}

/// Lazily built font lists. One instance is owned by whoever needs font lookups and
/// passed by reference.
#[derive(Debug)]
pub struct FontCatalog {
    font_dir: PathBuf,
    all: Option<Vec<String>>,
    compatible: Option<Vec<String>>,
}

impl FontCatalog {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_dir: font_dir.into(),
            all: None,
            compatible: None,
        }
    }

    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// Every known font name, sorted case-insensitively.
    pub fn all_fonts(&mut self) -> &[String] {
        let font_dir = &self.font_dir;
        self.all.get_or_insert_with(|| scan_fonts(font_dir)).as_slice()
    }

    /// Fonts that render the clock sample visibly. Never empty.
    pub fn compatible_fonts(&mut self, renderer: &dyn GlyphRenderer) -> &[String] {
        if self.compatible.is_none() {
            let mut fonts: Vec<String> = self
                .all_fonts()
                .iter()
                .filter(|font| is_timer_compatible(renderer, font))
                .cloned()
                .collect();
            if fonts.is_empty() {
                fonts.push(DEFAULT_FONT.to_string());
            }
            self.compatible = Some(fonts);
        }
        self.compatible.as_deref().unwrap_or_default()
    }

    /// Canonical spelling of `input`: exact match first, then case-insensitive.
    pub fn normalize(&mut self, input: &str) -> Option<String> {
        let fonts = self.all_fonts();
        fonts
            .iter()
            .find(|name| name.as_str() == input)
            .or_else(|| fonts.iter().find(|name| name.eq_ignore_ascii_case(input)))
            .cloned()
    }

    /// Canonical name for `input` only when it is known and timer compatible.
    pub fn resolve_compatible(
        &mut self,
        renderer: &dyn GlyphRenderer,
        input: &str,
    ) -> Option<String> {
        self.normalize(input)
            .filter(|font| is_timer_compatible(renderer, font))
    }
}

fn scan_fonts(font_dir: &Path) -> Vec<String> {
    let mut fonts: Vec<String> = builtin_fonts().map(str::to_string).collect();
    if let Ok(entries) = fs::read_dir(font_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(FONT_FILE_EXTENSION));
            if !is_font {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if !fonts.iter().any(|font| font.eq_ignore_ascii_case(stem)) {
                    fonts.push(stem.to_string());
                }
            }
        }
    }
    fonts.sort_by_key(|font| font.to_lowercase());
    fonts
}
