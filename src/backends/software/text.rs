//! Shaping and glyph outlines for the software backend.

use std::cell::RefCell;
use std::rc::Rc;

use cosmic_text::{
    Attrs, Buffer, CacheKeyFlags, Command, Family, FontSystem, Metrics, Shaping, Style,
    SwashCache, Weight,
};
use tiny_skia::PathBuilder;

use crate::config::FontConfig;
use crate::font::FontData;

const LINE_SPACING: f32 = 1.2;
const CAP_HEIGHT_FALLBACK: f32 = 0.7;

/// Font database plus glyph cache, shared by every software context a
/// factory creates.
pub struct TextEngine {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

pub(crate) type SharedTextEngine = Rc<RefCell<TextEngine>>;

/// A [`FontData`] resolved against the font database at a pixel size.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedFont {
    family: ResolvedFamily,
    bold: bool,
    italic: bool,
    pub size_px: f32,
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub cap_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
enum ResolvedFamily {
    Named(String),
    SansSerif,
    Serif,
    Monospace,
}

/// One shaped line: its advance width and its glyph outlines, positioned
/// relative to the left end of the baseline.
pub(crate) struct ShapedLine {
    pub width: f32,
    pub outlines: Vec<GlyphOutline>,
}

pub(crate) struct GlyphOutline {
    pub x: f32,
    pub y: f32,
    pub commands: Vec<Command>,
}

impl TextEngine {
    pub fn new(config: &FontConfig) -> Self {
        Self::with_database(config.to_fontdb())
    }

    pub fn with_database(db: fontdb::Database) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db("en".to_string(), db),
            swash_cache: SwashCache::new(),
        }
    }

    pub(crate) fn shared(self) -> SharedTextEngine {
        Rc::new(RefCell::new(self))
    }

    /// Resolves `data` at `size_px` and measures its vertical metrics.
    pub(crate) fn resolve(&mut self, data: &FontData, size_px: f32) -> ResolvedFont {
        let size_px = if size_px.is_finite() && size_px > 0.0 {
            size_px
        } else {
            1.0
        };
        let mut font = ResolvedFont {
            family: self.family_for(&data.name),
            bold: data.style.bold,
            italic: data.style.italic,
            size_px,
            ascent: size_px * 0.8,
            descent: size_px * 0.2,
            line_height: size_px * LINE_SPACING,
            cap_height: size_px * CAP_HEIGHT_FALLBACK,
        };

        if !self.has_fonts() {
            log::debug!(target: "gc", "no fonts loaded, using estimated metrics for {:?}", data.name);
            return font;
        }
        let buffer = self.buffer(&font, "H");
        let mut cap_height = None;
        for run in buffer.layout_runs() {
            let ascent = run.line_y - run.line_top;
            let descent = run.line_top + run.line_height - run.line_y;
            if ascent > 0.0 || descent > 0.0 {
                font.ascent = ascent;
                font.descent = descent;
                font.line_height = run.line_height;
            }
            if let Some(glyph) = run.glyphs.first() {
                let physical = glyph.physical((0.0, 0.0), 1.0);
                if let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                {
                    cap_height = commands
                        .iter()
                        .flat_map(command_points)
                        .map(|(_, y)| y)
                        .reduce(f32::max);
                }
            }
        }
        if let Some(h) = cap_height.filter(|h| *h > 0.0) {
            font.cap_height = h;
        }
        log::debug!(
            target: "gc",
            "resolved font {:?} at {}px: cap height {}",
            data.name,
            size_px,
            font.cap_height
        );
        font
    }

    /// Advance width of a single line in pixels.
    pub(crate) fn measure(&mut self, font: &ResolvedFont, line: &str) -> f32 {
        if !self.has_fonts() {
            return 0.0;
        }
        self.buffer(font, line)
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max)
    }

    pub(crate) fn shape(&mut self, font: &ResolvedFont, line: &str) -> ShapedLine {
        let mut shaped = ShapedLine {
            width: 0.0,
            outlines: Vec::new(),
        };
        if !self.has_fonts() {
            return shaped;
        }
        let buffer = self.buffer(font, line);
        for run in buffer.layout_runs() {
            shaped.width = shaped.width.max(run.line_w);
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, 0.0), 1.0);
                let x = glyph.x + glyph.font_size * glyph.x_offset;
                let y = run.line_top + glyph.y - glyph.font_size * glyph.y_offset;
                if let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                {
                    shaped.outlines.push(GlyphOutline {
                        x,
                        y,
                        commands: commands.to_vec(),
                    });
                }
            }
        }
        shaped
    }

    /// Shaping needs at least one face to fall back on.
    fn has_fonts(&self) -> bool {
        !self.font_system.db().is_empty()
    }

    fn buffer(&mut self, font: &ResolvedFont, text: &str) -> Buffer {
        let metrics = Metrics::new(font.size_px, font.size_px * LINE_SPACING);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        let family = match &font.family {
            ResolvedFamily::Named(name) => Family::Name(name),
            ResolvedFamily::SansSerif => Family::SansSerif,
            ResolvedFamily::Serif => Family::Serif,
            ResolvedFamily::Monospace => Family::Monospace,
        };
        let attrs = Attrs::new()
            .family(family)
            .weight(if font.bold { Weight::BOLD } else { Weight::NORMAL })
            .style(if font.italic { Style::Italic } else { Style::Normal })
            .cache_key_flags(CacheKeyFlags::DISABLE_HINTING);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn family_for(&self, name: &str) -> ResolvedFamily {
        match name.to_ascii_lowercase().as_str() {
            "sans" | "sans-serif" | "sansserif" => return ResolvedFamily::SansSerif,
            "serif" => return ResolvedFamily::Serif,
            "mono" | "monospace" => return ResolvedFamily::Monospace,
            _ => {}
        }
        let known = self.font_system.db().faces().any(|face| {
            face.families
                .iter()
                .any(|(family, _)| family.eq_ignore_ascii_case(name))
        });
        if known {
            ResolvedFamily::Named(name.to_string())
        } else {
            log::debug!(target: "gc", "font family {:?} not installed, using sans-serif", name);
            ResolvedFamily::SansSerif
        }
    }
}

impl ShapedLine {
    /// Appends the outlines to `builder` with the baseline starting at
    /// `(x, baseline)`. Font outlines are y-up.
    pub fn append_to(&self, builder: &mut PathBuilder, x: f32, baseline: f32) {
        for glyph in &self.outlines {
            let (gx, gy) = (x + glyph.x, baseline + glyph.y);
            for cmd in &glyph.commands {
                match *cmd {
                    Command::MoveTo(p) => builder.move_to(gx + p.x, gy - p.y),
                    Command::LineTo(p) => builder.line_to(gx + p.x, gy - p.y),
                    Command::QuadTo(c, e) => builder.quad_to(gx + c.x, gy - c.y, gx + e.x, gy - e.y),
                    Command::CurveTo(c1, c2, e) => builder.cubic_to(
                        gx + c1.x,
                        gy - c1.y,
                        gx + c2.x,
                        gy - c2.y,
                        gx + e.x,
                        gy - e.y,
                    ),
                    Command::Close => builder.close(),
                }
            }
        }
    }
}

fn command_points(cmd: &Command) -> Vec<(f32, f32)> {
    match *cmd {
        Command::MoveTo(p) | Command::LineTo(p) => vec![(p.x, p.y)],
        Command::QuadTo(c, e) => vec![(c.x, c.y), (e.x, e.y)],
        Command::CurveTo(c1, c2, e) => vec![(c1.x, c1.y), (c2.x, c2.y), (e.x, e.y)],
        Command::Close => Vec::new(),
    }
}
