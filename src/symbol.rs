//! The finished symbol: the complete codeword matrix together with its
//! layout, and rendering into module bits.

use core::iter;

use crate::error::Warning;
use crate::generators::{Bitfield, MicroPDF417Row, PDF417Row, TruncatedPDF417Row};
use crate::geometry::Geometry;
use crate::tables::Variant;

/// Physical layout of a finished symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A PDF417 symbol; the compact form drops the right row indicators
    /// and shortens the stop pattern to a single bar.
    Full { geometry: Geometry, compact: bool },
    /// One of the 34 MicroPDF417 sizes.
    Micro { variant: Variant },
}

/// A fully assembled symbol. `codewords` holds the complete matrix, row by
/// row: length descriptor (PDF417 only), data, padding and error
/// correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    layout: Layout,
    codewords: Vec<u16>,
    warnings: Vec<Warning>,
}

impl Symbol {
    pub(crate) fn new(layout: Layout, codewords: Vec<u16>, warnings: Vec<Warning>) -> Self {
        debug_assert_eq!(codewords.len(), match layout {
            Layout::Full { geometry, .. } => geometry.capacity(),
            Layout::Micro { variant } => variant.capacity(),
        });
        Symbol { layout, codewords, warnings }
    }

    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    pub const fn rows(&self) -> u8 {
        match self.layout {
            Layout::Full { geometry, .. } => geometry.rows,
            Layout::Micro { variant } => variant.rows(),
        }
    }

    pub const fn cols(&self) -> u8 {
        match self.layout {
            Layout::Full { geometry, .. } => geometry.cols,
            Layout::Micro { variant } => variant.cols(),
        }
    }

    /// Width of the symbol in modules, quiet zones excluded.
    pub const fn width(&self) -> u32 {
        match self.layout {
            Layout::Full { geometry, compact: false } => geometry.width(),
            Layout::Full { geometry, compact: true } => geometry.truncated_width(),
            Layout::Micro { variant } => variant.width(),
        }
    }

    /// The complete codeword matrix, row by row.
    #[inline]
    pub fn codewords(&self) -> &[u16] {
        &self.codewords
    }

    /// Warnings raised while sizing the symbol.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn pattern_rows(&self) -> impl Iterator<Item = RowPatterns<'_>> + '_ {
        let layout = self.layout;
        self.codewords
            .chunks_exact(self.cols() as usize)
            .enumerate()
            .map(move |(row, codewords)| {
                let row = row as u8;
                match layout {
                    Layout::Full { geometry, compact: false } => {
                        RowPatterns::Full(PDF417Row::new(codewords, geometry, row))
                    }
                    Layout::Full { geometry, compact: true } => {
                        RowPatterns::Truncated(TruncatedPDF417Row::new(codewords, geometry, row))
                    }
                    Layout::Micro { variant } => {
                        RowPatterns::Micro(MicroPDF417Row::new(codewords, variant, row))
                    }
                }
            })
    }

    /// Iterates over the symbol's modules in reading order, `true` for a
    /// bar. Each row yields exactly [width](Self::width) modules.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.pattern_rows().flatten().flatten()
    }

    /// A render view of this symbol at the standard module aspect ratio
    /// (rows three modules tall, two for MicroPDF417).
    pub const fn render(&self) -> Render<'_> {
        let scale = match self.layout {
            Layout::Full { .. } => (1, 3),
            Layout::Micro { .. } => (1, 2),
        };
        Render { symbol: self, scale, inverted: false }
    }
}

/// One row's bar patterns, for whichever layout the symbol has.
#[derive(Clone)]
enum RowPatterns<'a> {
    Full(PDF417Row<'a>),
    Truncated(TruncatedPDF417Row<'a>),
    Micro(MicroPDF417Row<'a>),
}

impl iter::Iterator for RowPatterns<'_> {
    type Item = Bitfield;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowPatterns::Full(row) => row.next(),
            RowPatterns::Truncated(row) => row.next(),
            RowPatterns::Micro(row) => row.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            RowPatterns::Full(row) => row.size_hint(),
            RowPatterns::Truncated(row) => row.size_hint(),
            RowPatterns::Micro(row) => row.size_hint(),
        }
    }
}

impl iter::FusedIterator for RowPatterns<'_> {}

/// A scaled, optionally inverted view of a [Symbol] for rasterisation.
#[derive(Debug, Clone)]
pub struct Render<'a> {
    symbol: &'a Symbol,
    scale: (u16, u16),
    inverted: bool,
}

impl<'a> Render<'a> {
    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.symbol.width() * self.scale.0 as u32
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.symbol.rows() as u32 * self.scale.1 as u32
    }

    /// Returns the scale as (x, y) pixels per module.
    pub const fn scale(&self) -> (u16, u16) {
        self.scale
    }

    pub const fn scaled(mut self, scale: (u16, u16)) -> Self {
        self.scale = scale;
        self
    }

    /// Whether pixel values are flipped, bars rendering as `false`.
    pub const fn inverted(&self) -> bool {
        self.inverted
    }

    pub const fn invert(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Iterates over the pixels in reading order, rows repeated and
    /// modules widened according to the scale.
    pub fn bits(&self) -> impl Iterator<Item = bool> + 'a {
        let (sx, sy) = self.scale;
        let invert = self.inverted;
        self.symbol
            .pattern_rows()
            .flat_map(move |row| iter::repeat(row).take(sy as usize))
            .flatten()
            .flatten()
            .flat_map(move |bit| iter::repeat(bit ^ invert).take(sx as usize))
    }

    /// Writes the pixels into `target`, which must hold at least
    /// `width() * height()` elements.
    pub fn fill<P: Clone>(&self, target: &mut [P], on: &P, off: &P) {
        for (slot, bit) in target.iter_mut().zip(self.bits()) {
            *slot = if bit { on.clone() } else { off.clone() };
        }
    }

    pub fn fill_bits(&self, target: &mut [bool]) {
        self.fill(target, &true, &false);
    }

    /// Packs the pixels into `target` eight per byte, most significant bit
    /// first, as one continuous stream.
    pub fn fill_bitmap(&self, target: &mut [u8]) {
        for (i, bit) in self.bits().enumerate() {
            if bit {
                target[i / 8] |= 0x80 >> (i % 8);
            }
        }
    }
}

#[cfg(feature = "embedded-graphics")]
mod graphics {
    use embedded_graphics::draw_target::DrawTarget;
    use embedded_graphics::geometry::{OriginDimensions, Point, Size};
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::{Drawable, Pixel};

    use super::Render;

    impl OriginDimensions for Render<'_> {
        fn size(&self) -> Size {
            Size::new(self.width(), self.height())
        }
    }

    impl Drawable for Render<'_> {
        type Color = BinaryColor;
        type Output = ();

        fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
        where
            D: DrawTarget<Color = BinaryColor>,
        {
            let width = self.width() as i32;
            target.draw_iter(self.bits().enumerate().map(|(i, bit)| {
                let i = i as i32;
                Pixel(Point::new(i % width, i / width), BinaryColor::from(bit))
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Symbol {
        let geometry = Geometry { rows: 3, cols: 1, level: 0 };
        Symbol::new(
            Layout::Full { geometry, compact: false },
            vec![1, 0, 0],
            Vec::new(),
        )
    }

    #[test]
    fn test_symbols_compare_by_contents() {
        assert_eq!(sample(), sample());

        let geometry = Geometry { rows: 3, cols: 1, level: 0 };
        let other = Symbol::new(
            Layout::Full { geometry, compact: false },
            vec![2, 0, 0],
            Vec::new(),
        );
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_bits_cover_the_grid() {
        let symbol = sample();
        assert_eq!(symbol.width(), 86);
        assert_eq!(symbol.bits().count(), 86 * 3);
    }

    #[test]
    fn test_compact_is_narrower() {
        let geometry = Geometry { rows: 3, cols: 1, level: 0 };
        let symbol = Symbol::new(
            Layout::Full { geometry, compact: true },
            vec![1, 0, 0],
            Vec::new(),
        );
        assert_eq!(symbol.width(), 52);
        assert_eq!(symbol.bits().count(), 52 * 3);
    }

    #[test]
    fn test_micro_bits_cover_the_grid() {
        let variant = Variant::new(1);
        let symbol = Symbol::new(
            Layout::Micro { variant },
            vec![0; variant.capacity()],
            Vec::new(),
        );
        assert_eq!(symbol.width(), 38);
        assert_eq!(symbol.bits().count(), 38 * 11);
    }

    #[test]
    fn test_every_row_starts_with_a_bar() {
        let symbol = sample();
        let width = symbol.width() as usize;
        let bits: Vec<bool> = symbol.bits().collect();
        for row in 0..3 {
            assert!(bits[row * width]);
        }
    }

    #[test]
    fn test_render_scaling() {
        let symbol = sample();
        let render = symbol.render();
        assert_eq!((render.width(), render.height()), (86, 9));

        let render = render.scaled((2, 4));
        assert_eq!((render.width(), render.height()), (172, 12));
        assert_eq!(render.bits().count(), 172 * 12);
    }

    #[test]
    fn test_render_rows_are_repeated() {
        let symbol = sample();
        let render = symbol.render().scaled((1, 2));
        let bits: Vec<bool> = render.bits().collect();
        let width = render.width() as usize;
        assert_eq!(&bits[..width], &bits[width..2 * width]);
    }

    #[test]
    fn test_render_inverted() {
        let symbol = sample();
        let plain: Vec<bool> = symbol.render().bits().collect();
        let flipped: Vec<bool> = symbol.render().invert(true).bits().collect();
        assert_eq!(plain.len(), flipped.len());
        assert!(plain.iter().zip(&flipped).all(|(a, b)| *a != *b));
    }

    #[test]
    fn test_fill_bits_matches_bits() {
        let symbol = sample();
        let render = symbol.render();
        let mut target = vec![false; (render.width() * render.height()) as usize];
        render.fill_bits(&mut target);
        assert!(target.iter().copied().eq(render.bits()));
    }

    #[test]
    fn test_fill_bitmap_packs_msb_first() {
        let symbol = sample();
        let render = symbol.render();
        let len = (render.width() * render.height()) as usize;
        let mut packed = vec![0u8; len.div_ceil(8)];
        render.fill_bitmap(&mut packed);

        for (i, bit) in render.bits().enumerate() {
            assert_eq!(packed[i / 8] & (0x80 >> (i % 8)) != 0, bit);
        }
    }
}
