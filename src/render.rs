use image::{Rgb, RgbImage};
use log::debug;

use crate::analysis::RenderDirective;
use crate::color;
use crate::config::ColorScheme;
use crate::data::model::SampleGrid;

// ---------------------------------------------------------------------------
// Waterfall image
// ---------------------------------------------------------------------------

/// Render the grid one pixel per sample, oldest row at the top, scaled
/// between the grid's finite min and max.
pub fn waterfall_image(grid: &SampleGrid) -> RgbImage {
    let (min, max) = magnitude_range(grid);
    let range = if max > min { max - min } else { 1.0 };

    let mut img = RgbImage::new(grid.bins() as u32, grid.integrations() as u32);
    for (y, row) in grid.rows().iter().enumerate() {
        for (x, &s) in row.samples().iter().enumerate() {
            let t = if s.is_finite() { (s - min) / range } else { 0.0 };
            img.put_pixel(x as u32, y as u32, Rgb(color::ramp(t)));
        }
    }
    img
}

fn magnitude_range(grid: &SampleGrid) -> (f64, f64) {
    grid.rows()
        .iter()
        .flat_map(|r| r.samples().iter().copied())
        .filter(|s| s.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)))
}

// ---------------------------------------------------------------------------
// Directive markers
// ---------------------------------------------------------------------------

/// Paint one vertical line per directive over every row but the last.
/// Returns the number of lines drawn.
pub fn paint_directives(
    img: &mut RgbImage,
    grid: &SampleGrid,
    directives: &[RenderDirective],
    colors: &ColorScheme,
) -> usize {
    let fallback = color::parse(&colors.inactive).unwrap_or([255, 255, 255]);
    let height = img.height();
    let mut drawn = 0;

    for d in directives {
        let Ok(column) = grid.column_for(d.freq) else {
            continue;
        };
        let x = column as u32;
        if x >= img.width() {
            continue;
        }
        let rgb = Rgb(color::parse_or(&d.color, fallback));
        for y in 0..height.saturating_sub(1) {
            img.put_pixel(x, y, rgb);
        }
        drawn += 1;
    }

    debug!("painted {drawn} of {} directives", directives.len());
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Origin;
    use crate::data::model::{ColorToken, Row};

    fn grid() -> SampleGrid {
        let rows = (0..4)
            .map(|r| Row::new((0..10).map(|c| -(r * 10 + c) as f64).collect()))
            .collect();
        SampleGrid::new(0.0, 10_000.0, rows).unwrap()
    }

    fn directive(freq: i64, color: &str) -> RenderDirective {
        RenderDirective {
            freq,
            color: ColorToken::from(color),
            active: true,
            origin: Origin::Known,
            score: 0.0,
        }
    }

    #[test]
    fn image_matches_grid_shape() {
        let img = waterfall_image(&grid());
        assert_eq!(img.dimensions(), (10, 4));
    }

    #[test]
    fn markers_skip_the_last_row() {
        let g = grid();
        let mut img = waterfall_image(&g);
        let before = *img.get_pixel(3, 3);
        let drawn = paint_directives(&mut img, &g, &[directive(3_500, "#FF00FF")], &ColorScheme::default());

        assert_eq!(drawn, 1);
        for y in 0..3 {
            assert_eq!(img.get_pixel(3, y), &Rgb([255, 0, 255]));
        }
        assert_eq!(img.get_pixel(3, 3), &before);
    }

    #[test]
    fn bad_colors_and_out_of_band_frequencies() {
        let g = grid();
        let mut img = waterfall_image(&g);
        let drawn = paint_directives(
            &mut img,
            &g,
            &[directive(20_000, "#00FF00"), directive(1_000, "nonsense")],
            &ColorScheme::default(),
        );

        assert_eq!(drawn, 1);
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }
}
