use crate::figure::{Figure, Mark, XAxis};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;

/// Default series color (matplotlib's first cycle color).
const DEFAULT_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Color of the density curve drawn over a histogram.
const CURVE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Largest RGB buffer a PNG render may allocate.
const MAX_BUFFER_BYTES: usize = 1 << 28;

/// Render a figure to image bytes in the requested format.
pub fn render_figure(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Image size must be positive (got {}x{})",
            options.width,
            options.height
        );
    }

    match options.format {
        OutputFormat::Png => render_png(figure, options),
        OutputFormat::Svg => render_svg(figure, options),
    }
}

fn render_png(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>> {
    let len = (options.width as usize)
        .checked_mul(options.height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .filter(|&len| len <= MAX_BUFFER_BYTES)
        .with_context(|| {
            format!(
                "Image size {}x{} is too large",
                options.width, options.height
            )
        })?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (options.width, options.height))
            .into_drawing_area();
        draw_figure(&root, figure, options)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                &buffer,
                options.width,
                options.height,
                image::ColorType::Rgb8,
            )
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(figure: &Figure, options: &RenderOptions) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_figure(&root, figure, options)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

/// Draw caption, mesh, axis labels and every mark onto a drawing area.
fn draw_figure<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    options: &RenderOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(figure.x_range.clone(), figure.y_range.clone())
        .context("Failed to build chart")?;

    match &figure.x_axis {
        XAxis::Numeric => {
            chart
                .configure_mesh()
                .x_desc(figure.x_label.as_str())
                .y_desc(figure.y_label.as_str())
                .draw()
                .context("Failed to draw mesh")?;
        }
        XAxis::Categorical(categories) => {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(categories.len() + 1)
                .x_label_formatter(&|x| category_label(categories, *x))
                .x_desc(figure.x_label.as_str())
                .y_desc(figure.y_label.as_str())
                .draw()
                .context("Failed to draw mesh")?;
        }
    }

    let color = parse_color(&options.color);

    for mark in &figure.marks {
        match mark {
            Mark::Line(points) => {
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                    .context("Failed to draw line series")?;
            }
            Mark::Points(points) => {
                chart
                    .draw_series(
                        points
                            .iter()
                            .map(|&(x, y)| Circle::new((x, y), 3, color.mix(0.8).filled())),
                    )
                    .context("Failed to draw point series")?;
            }
            Mark::Bars(bars) => {
                chart
                    .draw_series(bars.iter().map(|bar| {
                        Rectangle::new(
                            [(bar.left, 0.0), (bar.right, bar.height)],
                            color.mix(0.8).filled(),
                        )
                    }))
                    .context("Failed to draw bar")?;
                chart
                    .draw_series(bars.iter().map(|bar| {
                        Rectangle::new([(bar.left, 0.0), (bar.right, bar.height)], WHITE)
                    }))
                    .context("Failed to draw bar outline")?;
            }
            Mark::Curve(points) => {
                chart
                    .draw_series(LineSeries::new(
                        points.iter().copied(),
                        CURVE_COLOR.stroke_width(2),
                    ))
                    .context("Failed to draw density curve")?;
            }
        }
    }

    Ok(())
}

/// Tick label for a categorical axis; only whole positions carry a name.
fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Parse color string to RGBColor
fn parse_color(color_str: &Option<String>) -> RGBColor {
    match color_str.as_deref() {
        Some("red") => RED,
        Some("green") => GREEN,
        Some("blue") => BLUE,
        Some("black") => BLACK,
        Some("yellow") => YELLOW,
        Some("cyan") => CYAN,
        Some("magenta") => MAGENTA,
        _ => DEFAULT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Bar;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn make_figure(x_axis: XAxis, marks: Vec<Mark>) -> Figure {
        Figure {
            title: "Line Plot of y vs x".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            x_axis,
            x_range: -0.5..2.5,
            y_range: 0.0..10.0,
            marks,
        }
    }

    #[test]
    fn test_render_png_line() {
        let figure = make_figure(
            XAxis::Numeric,
            vec![Mark::Line(vec![(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)])],
        );
        let bytes = render_figure(&figure, &RenderOptions::default()).unwrap();
        assert!(is_valid_png(&bytes));
    }

    #[test]
    fn test_render_svg_bars() {
        let figure = make_figure(
            XAxis::Categorical(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            vec![Mark::Bars(vec![
                Bar { left: -0.4, right: 0.4, height: 3.0 },
                Bar { left: 0.6, right: 1.4, height: 7.0 },
                Bar { left: 1.6, right: 2.4, height: 5.0 },
            ])],
        );
        let options = RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        };
        let bytes = render_figure(&figure, &options).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_render_zero_size_rejected() {
        let figure = make_figure(XAxis::Numeric, vec![]);
        let options = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        assert!(render_figure(&figure, &options).is_err());
    }

    #[test]
    fn test_render_oversized_png_rejected() {
        let figure = make_figure(XAxis::Numeric, vec![]);
        let options = RenderOptions {
            width: 65536,
            height: 65536,
            ..RenderOptions::default()
        };
        let err = render_figure(&figure, &options).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_category_label() {
        let categories = vec!["north".to_string(), "south".to_string()];
        assert_eq!(category_label(&categories, 0.0), "north");
        assert_eq!(category_label(&categories, 1.0000000001), "south");
        assert_eq!(category_label(&categories, 0.5), "");
        assert_eq!(category_label(&categories, -1.0), "");
        assert_eq!(category_label(&categories, 2.0), "");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color(&Some("red".to_string())), RED);
        assert_eq!(parse_color(&None), DEFAULT_COLOR);
        assert_eq!(parse_color(&Some("chartreuse".to_string())), DEFAULT_COLOR);
    }
}
