//! RAM framebuffer for monochrome displays, with change tracking.
//!
//! Screens are drawn into this buffer first. [`FrameBuffer::flush`] then
//! copies only the rectangle that contains changed pixels to the real
//! display, which keeps slow I2C panel updates and simulator redraws small.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::ui::Surface;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn area(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Heap-allocated `BinaryColor` pixel buffer implementing `DrawTarget`.
///
/// The size is fixed at construction, normally to the geometry reported by
/// the display driver.
pub struct FrameBuffer {
    pixels: Vec<BinaryColor>,
    size: Size,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a buffer of `size` with every pixel off.
    pub fn new(size: Size) -> Self {
        Self {
            pixels: vec![BinaryColor::Off; size.width as usize * size.height as usize],
            size,
            dirty: None,
        }
    }

    /// Colour at `point`, or `None` when it lies outside the buffer.
    pub fn pixel(&self, point: Point) -> Option<BinaryColor> {
        self.index(point.x, point.y).map(|idx| self.pixels[idx])
    }

    /// Region changed since the last flush, if any.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(|rect| rect.area())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        if x >= 0 && y >= 0 && x < w && y < h {
            Some(y as usize * w as usize + x as usize)
        } else {
            None
        }
    }

    /// Write a single pixel, expanding the dirty rect only if it changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: BinaryColor) {
        let idx = y * self.size.width as usize + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Copy the dirty region to `display` and reset the dirty state.
    ///
    /// Nothing is sent when no pixel changed.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let area = rect.area();
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.size.width as usize;
        let width = area.size.width as usize;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if self.index(coord.x, coord.y).is_some() {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        let Some(bottom_right) = clipped.bottom_right() else {
            return Ok(());
        };

        for y in clipped.top_left.y..=bottom_right.y {
            for x in clipped.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}

/// A RAM buffer is complete as soon as it is drawn; copying it to hardware
/// is the owner's job via [`FrameBuffer::flush`].
impl Surface for FrameBuffer {
    fn present(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn starts_blank_and_clean() {
        let fb = FrameBuffer::new(Size::new(16, 8));
        assert_eq!(fb.pixel(Point::new(3, 3)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(16, 0)), None);
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn tracks_changed_region_and_clips() {
        let mut fb = FrameBuffer::new(Size::new(16, 8));
        Line::new(Point::new(4, -5), Point::new(4, 20))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(4, 0), Size::new(1, 8)))
        );
        assert_eq!(fb.pixel(Point::new(4, 7)), Some(BinaryColor::On));
    }

    #[test]
    fn redrawing_same_pixels_is_not_dirty() {
        let mut fb = FrameBuffer::new(Size::new(4, 4));
        fb.clear(BinaryColor::Off).unwrap();
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn flush_copies_dirty_region_only() {
        let mut fb = FrameBuffer::new(Size::new(8, 8));
        Pixel(Point::new(2, 3), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(5, 4), BinaryColor::On).draw(&mut fb).unwrap();

        let mut target = FrameBuffer::new(Size::new(8, 8));
        fb.flush(&mut target).unwrap();

        assert!(fb.dirty_area().is_none());
        assert_eq!(target.pixel(Point::new(2, 3)), Some(BinaryColor::On));
        assert_eq!(target.pixel(Point::new(5, 4)), Some(BinaryColor::On));
        assert_eq!(
            target.dirty_area(),
            Some(Rectangle::new(Point::new(2, 3), Size::new(4, 2)))
        );
    }
}
