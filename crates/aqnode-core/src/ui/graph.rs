//! Scrolling history graph
//!
//! Draws one [`HistorySeries`] as a trace of vertical segments, one pixel
//! column per sample, with the newest sample in the rightmost column. Each
//! segment joins the previous (newer) sample's row to the current one, so
//! the trace shows both the level and how fast it changed.

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::history::{HistorySeries, SeriesRange};

use super::{MAX_LINE_LENGTH, Surface, TEXT_STYLE};

/// One vertical segment of the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphColumn {
    /// Pixel column
    pub x: i32,
    /// Row of the sample drawn one column to the right
    pub from_row: i32,
    /// Row of this column's sample
    pub to_row: i32,
}

/// Renders a history series full-screen with a `label value` header
#[derive(Debug, Clone, Copy)]
pub struct GraphRenderer {
    stroke: PrimitiveStyle<BinaryColor>,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self {
            stroke: PrimitiveStyle::with_stroke(BinaryColor::On, 1),
        }
    }

    /// Display row for `value` on a graph `height` pixels tall.
    ///
    /// One row represents `ratio = (max - min) / height` value units and the
    /// row is `height - (value - min) / ratio`, floored. Values outside the
    /// range are pinned to it first, so anything at or above `max` lands on
    /// row 0 and anything at or below `min` on row `height` (the baseline
    /// just under the last visible row).
    pub fn row_for(range: &SeriesRange, height: u32, value: i32) -> i32 {
        let offset = range.clamp(value) as i64 - range.min as i64;
        let height = height as i64;
        let span = range.span();
        // Numerator is never negative, so the division floors
        ((height * span - offset * height) / span) as i32
    }

    /// Segments for `series` on a surface of `size`, newest (rightmost) first.
    ///
    /// Yields `min(capacity, width)` columns. When the series holds more
    /// samples than there are columns, the oldest ones are not drawn; when it
    /// holds fewer, the leftmost columns are left untouched.
    pub fn columns(series: &HistorySeries, size: Size) -> impl Iterator<Item = GraphColumn> + '_ {
        let width = size.width as usize;
        let height = size.height;
        let range = *series.range();

        (0..series.capacity().min(width)).scan(None, move |previous: &mut Option<i32>, age| {
            let row = Self::row_for(&range, height, series.sample_at(age));
            let from_row = previous.replace(row).unwrap_or(row);
            Some(GraphColumn {
                x: (width - 1 - age) as i32,
                from_row,
                to_row: row,
            })
        })
    }

    /// Clear `surface`, draw the header and the trace, then present.
    pub fn draw<S: Surface>(&self, series: &HistorySeries, surface: &mut S) -> Result<(), S::Error> {
        surface.clear(BinaryColor::Off)?;

        let mut header: String<MAX_LINE_LENGTH> = String::new();
        let _ = write!(header, "{} {}", series.label(), series.most_recent());
        Text::with_baseline(&header, Point::zero(), TEXT_STYLE, Baseline::Top).draw(surface)?;

        let size = surface.bounding_box().size;
        for column in Self::columns(series, size) {
            Line::new(
                Point::new(column.x, column.from_row),
                Point::new(column.x, column.to_row),
            )
            .into_styled(self.stroke)
            .draw(surface)?;
        }

        surface.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use alloc::vec::Vec;

    const RANGE: SeriesRange = SeriesRange::new(0, 100, 35, 55);

    fn series_with(capacity: usize, values: &[i32]) -> HistorySeries {
        let mut series = HistorySeries::new("PM", capacity, RANGE).unwrap();
        for &value in values {
            series.record(value);
        }
        series
    }

    #[test]
    fn rows_span_the_height() {
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 100), 0);
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 50), 24);
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 0), 48);
        // 48 - 10 / (100 / 48) = 43.2
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 10), 43);
    }

    #[test]
    fn fractional_rows_round_toward_the_top() {
        // 48 - v * 0.48: 43.2, 32.16, 11.04
        for (value, row) in [(10, 43), (33, 32), (77, 11)] {
            assert_eq!(GraphRenderer::row_for(&RANGE, 48, value), row, "value {}", value);
        }
        // Whole-row offsets stay exact
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 25), 36);
        assert_eq!(GraphRenderer::row_for(&RANGE, 48, 75), 12);
    }

    #[test]
    fn out_of_range_values_clamp_to_bounds() {
        let top = GraphRenderer::row_for(&RANGE, 48, 100);
        let bottom = GraphRenderer::row_for(&RANGE, 48, 0);
        for value in [101, 200, i32::MAX] {
            assert_eq!(GraphRenderer::row_for(&RANGE, 48, value), top);
        }
        for value in [-1, -500, i32::MIN] {
            assert_eq!(GraphRenderer::row_for(&RANGE, 48, value), bottom);
        }
    }

    #[test]
    fn offset_range_scales_from_min() {
        let co2 = SeriesRange::new(400, 2000, 1000, 1500);
        assert_eq!(GraphRenderer::row_for(&co2, 48, 400), 48);
        assert_eq!(GraphRenderer::row_for(&co2, 48, 1200), 24);
        assert_eq!(GraphRenderer::row_for(&co2, 48, 2000), 0);
    }

    #[test]
    fn wide_buffer_draws_only_newest_samples() {
        let series = series_with(10, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let columns: Vec<GraphColumn> =
            GraphRenderer::columns(&series, Size::new(6, 48)).collect();

        assert_eq!(columns.len(), 6);
        let xs: Vec<i32> = columns.iter().map(|c| c.x).collect();
        assert_eq!(xs, [5, 4, 3, 2, 1, 0]);

        let expected_rows: Vec<i32> = [10, 9, 8, 7, 6, 5]
            .iter()
            .map(|&v| GraphRenderer::row_for(&RANGE, 48, v))
            .collect();
        let rows: Vec<i32> = columns.iter().map(|c| c.to_row).collect();
        assert_eq!(rows, expected_rows);
    }

    #[test]
    fn narrow_buffer_leaves_left_columns_undrawn() {
        let series = series_with(3, &[20, 40, 60]);
        let xs: Vec<i32> = GraphRenderer::columns(&series, Size::new(8, 48))
            .map(|c| c.x)
            .collect();
        assert_eq!(xs, [7, 6, 5]);
    }

    #[test]
    fn column_count_never_exceeds_capacity_or_width() {
        for capacity in 1..12 {
            let series = series_with(capacity, &[50; 12]);
            for width in 1..12_u32 {
                let count = GraphRenderer::columns(&series, Size::new(width, 32)).count();
                assert_eq!(count, capacity.min(width as usize));
            }
        }
    }

    #[test]
    fn segments_join_neighbouring_samples() {
        let series = series_with(4, &[10, 90, 5, 200]);
        let columns: Vec<GraphColumn> =
            GraphRenderer::columns(&series, Size::new(4, 48)).collect();

        let row = |v| GraphRenderer::row_for(&RANGE, 48, v);

        // Flat start: the newest column has no previous row
        assert_eq!(columns[0].from_row, columns[0].to_row);
        // 200 is drawn where 100 would be
        assert_eq!(columns[0].to_row, row(100));

        assert_eq!((columns[1].from_row, columns[1].to_row), (row(200), row(5)));
        assert_eq!((columns[2].from_row, columns[2].to_row), (row(5), row(90)));
        assert_eq!((columns[3].from_row, columns[3].to_row), (row(90), row(10)));
    }

    #[test]
    fn draw_plots_trace_on_surface() {
        let mut fb = FrameBuffer::new(Size::new(64, 48));
        let series = series_with(10, &[50; 10]);

        GraphRenderer::new().draw(&series, &mut fb).unwrap();

        // Constant 50 sits on row 24 across the ten newest columns
        assert_eq!(fb.pixel(Point::new(63, 24)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(54, 24)), Some(BinaryColor::On));
        assert_eq!(fb.pixel(Point::new(63, 30)), Some(BinaryColor::Off));
        // Columns older than the buffer stay blank
        assert_eq!(fb.pixel(Point::new(53, 24)), Some(BinaryColor::Off));
    }

    #[test]
    fn draw_clears_previous_frame() {
        let mut fb = FrameBuffer::new(Size::new(64, 48));
        let renderer = GraphRenderer::new();

        renderer.draw(&series_with(4, &[50; 4]), &mut fb).unwrap();
        renderer.draw(&series_with(4, &[75; 4]), &mut fb).unwrap();

        assert_eq!(fb.pixel(Point::new(63, 24)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(63, 12)), Some(BinaryColor::On));
    }
}
