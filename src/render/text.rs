use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::foundation::core::CellSize;
use crate::foundation::error::{RenderError, RenderResult};
use crate::render::atlas::GlyphRasterizer;

/// Monospace fonts commonly present on Linux, macOS and Android images.
const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/system/fonts/DroidSansMono.ttf",
];

/// Return the first monospace font found at a well-known system path.
pub fn find_system_monospace_font() -> Option<PathBuf> {
    SYSTEM_MONOSPACE_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Glyph strip rasterizer: `parley` shapes each glyph, `vello_cpu` fills it.
///
/// The font is registered once; the render context is kept between rebuilds and only
/// reallocated when the strip size changes. Each glyph is drawn with its baseline on the bottom
/// edge of its cell.
pub struct FontGlyphRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    ctx: Option<vello_cpu::RenderContext>,
}

impl FontGlyphRasterizer {
    /// Register `font_bytes` (TTF/OTF/TTC, first face) for rasterization.
    pub fn from_bytes(font_bytes: Vec<u8>) -> RenderResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| RenderError::glyph("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RenderError::glyph("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            ctx: None,
        })
    }

    /// Read and register a font file.
    pub fn from_path(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            RenderError::glyph(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Family name reported by the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(&mut self, text: &str, size_px: f32) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl GlyphRasterizer for FontGlyphRasterizer {
    fn render_strip(
        &mut self,
        glyphs: &[String],
        cell: CellSize,
        text_size: f32,
    ) -> RenderResult<Vec<u8>> {
        if !text_size.is_finite() || text_size <= 0.0 {
            return Err(RenderError::glyph("text size must be finite and > 0"));
        }
        let w: u16 = (glyphs.len() * cell.width)
            .try_into()
            .map_err(|_| RenderError::glyph("glyph strip width exceeds u16"))?;
        let h: u16 = cell
            .height
            .try_into()
            .map_err(|_| RenderError::glyph("glyph strip height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));

        let baseline = cell.height as f32;
        for (slot, text) in glyphs.iter().enumerate() {
            let layout = self.layout(text, text_size);
            let slot_x = (slot * cell.width) as f32;
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let mut pen_x = slot_x + run.offset();
                    let positioned = run.glyphs().map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: g.id,
                            x: pen_x + g.x,
                            y: baseline - g.y,
                        };
                        pen_x += g.advance;
                        glyph
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(positioned);
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let out = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);
        Ok(out)
    }
}
