//! CPU rasterizer backed by tiny-skia.

use crate::renderer::{RenderContext, RenderResult, RenderedImage, Renderer, RendererError};
use blueprint_core::{
    AnchorShape, EraserShape, LineCap, LineJoin, SceneItem, SerializableColor, StrokeStyle,
};
use kurbo::{Point, Rect, Size};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

/// Renderer that rasterizes scenes on the CPU.
#[derive(Debug, Default)]
pub struct SkiaRenderer;

impl SkiaRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn paint(color: SerializableColor, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

fn skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Flat => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        // No triangle cap; square keeps the extension past the end point.
        LineCap::Square | LineCap::Triangle => tiny_skia::LineCap::Square,
    }
}

fn skia_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::MiterClipped => tiny_skia::LineJoin::MiterClip,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

/// Map a path style to a tiny-skia stroke. Both ends use the start cap.
fn skia_stroke(style: &StrokeStyle) -> Stroke {
    let pattern: Vec<f32> = style
        .dash_style
        .scaled_pattern(style.width)
        .into_iter()
        .map(|len| len as f32)
        .collect();
    Stroke {
        width: style.width as f32,
        line_cap: skia_cap(style.start_cap),
        line_join: skia_join(style.line_join),
        dash: StrokeDash::new(pattern, 0.0),
        ..Default::default()
    }
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

fn polyline(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for point in rest {
        pb.line_to(point.x as f32, point.y as f32);
    }
    pb.finish()
}

fn shape_path(rect: Rect, ellipse: bool) -> Option<tiny_skia::Path> {
    let rect = skia_rect(rect)?;
    if ellipse {
        PathBuilder::from_oval(rect)
    } else {
        Some(PathBuilder::from_rect(rect))
    }
}

impl Renderer for SkiaRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RenderedImage> {
        let (width, height) = (ctx.width, ctx.height);
        if !ctx.scale_factor.is_finite() || ctx.scale_factor <= 0.0 {
            return Err(RendererError::RenderFailed(format!(
                "invalid scale factor {}",
                ctx.scale_factor
            )));
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;
        pixmap.fill(skia_color(ctx.background()));

        let transform = Transform::from_scale(ctx.scale_factor as f32, ctx.scale_factor as f32);
        let aa = ctx.anti_alias;
        let mut skipped = 0usize;

        for item in &ctx.scene.items {
            match item {
                SceneItem::GridLine {
                    from,
                    to,
                    color,
                    width,
                } => {
                    let Some(path) = polyline(&[*from, *to]) else {
                        skipped += 1;
                        continue;
                    };
                    let stroke = Stroke {
                        width: *width as f32,
                        ..Default::default()
                    };
                    pixmap.stroke_path(&path, &paint(*color, aa), &stroke, transform, None);
                }
                SceneItem::Polyline { points, style, .. } => {
                    let Some(path) = polyline(points) else {
                        skipped += 1;
                        continue;
                    };
                    pixmap.stroke_path(
                        &path,
                        &paint(style.color, aa),
                        &skia_stroke(style),
                        transform,
                        None,
                    );
                }
                SceneItem::EraserOutline {
                    center,
                    radius,
                    shape,
                    color,
                    width,
                } => {
                    let diameter = 2.0 * radius;
                    let bounds = Rect::from_center_size(*center, Size::new(diameter, diameter));
                    let Some(path) = shape_path(bounds, *shape == EraserShape::Circle) else {
                        skipped += 1;
                        continue;
                    };
                    let stroke = Stroke {
                        width: *width as f32,
                        ..Default::default()
                    };
                    pixmap.stroke_path(&path, &paint(*color, aa), &stroke, transform, None);
                }
                SceneItem::Anchor {
                    rect, shape, color, ..
                } => {
                    let Some(path) = shape_path(*rect, *shape == AnchorShape::Ellipse) else {
                        skipped += 1;
                        continue;
                    };
                    pixmap.fill_path(
                        &path,
                        &paint(*color, aa),
                        FillRule::Winding,
                        transform,
                        None,
                    );
                }
                SceneItem::SizeIndicator { rect, fill, .. } => {
                    // Label text is left to interactive front ends.
                    let Some(rect) = skia_rect(*rect) else {
                        skipped += 1;
                        continue;
                    };
                    pixmap.fill_rect(rect, &paint(*fill, aa), transform, None);
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} degenerate scene item(s)");
        }

        let rgba_data = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok(RenderedImage {
            rgba_data,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::scene::BACKGROUND_COLOR;
    use blueprint_core::{DrawingCanvas, PolylineRole, Scene};

    fn line_scene() -> Scene {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        scene.push(SceneItem::Polyline {
            role: PolylineRole::Committed,
            points: vec![Point::new(10.0, 50.0), Point::new(90.0, 50.0)],
            style: StrokeStyle::new(SerializableColor::rgb(255, 0, 0), 10.0),
        });
        scene
    }

    #[test]
    fn test_background_fill() {
        let scene = Scene::new(Size::new(8.0, 8.0));
        let image = SkiaRenderer::new().render(&RenderContext::new(&scene)).unwrap();
        assert_eq!(image.rgba_data.len(), 8 * 8 * 4);
        assert_eq!(image.pixel(3, 3), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_strokes_polyline() {
        let scene = line_scene();
        let image = SkiaRenderer::new().render(&RenderContext::new(&scene)).unwrap();
        assert_eq!(image.pixel(50, 50), Some(SerializableColor::rgb(255, 0, 0)));
        assert_eq!(image.pixel(50, 10), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_fixed_output_size_scales() {
        let scene = line_scene();
        let ctx = RenderContext::with_output_size(&scene, 50, 50).fit_to_output();
        let image = SkiaRenderer::new().render(&ctx).unwrap();
        assert_eq!((image.width, image.height), (50, 50));
        assert_eq!(image.pixel(25, 25), Some(SerializableColor::rgb(255, 0, 0)));
    }

    #[test]
    fn test_zero_size_is_error() {
        let scene = Scene::new(Size::new(0.0, 0.0));
        let result = SkiaRenderer::new().render(&RenderContext::new(&scene));
        assert!(matches!(
            result,
            Err(RendererError::InvalidSize { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_bad_scale_factor_is_error() {
        let scene = Scene::new(Size::new(10.0, 10.0));
        let mut ctx = RenderContext::new(&scene);
        ctx.scale_factor = 0.0;
        let result = SkiaRenderer::new().render(&ctx);
        assert!(matches!(result, Err(RendererError::RenderFailed(_))));
    }

    #[test]
    fn test_single_point_polyline_is_skipped() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        scene.push(SceneItem::Polyline {
            role: PolylineRole::Pending,
            points: vec![Point::new(5.0, 5.0)],
            style: StrokeStyle::default(),
        });
        assert!(SkiaRenderer::new().render(&RenderContext::new(&scene)).is_ok());
    }

    #[test]
    fn test_render_canvas_to_png() {
        let mut canvas = DrawingCanvas::new();
        canvas.set_size(Size::new(64.0, 64.0));
        canvas.set_show_points(true);
        canvas.add_polygon(vec![Point::new(8.0, 8.0), Point::new(56.0, 56.0)]);
        let scene = canvas.scene(Point::ZERO, true);
        let png = SkiaRenderer::new()
            .render_png(&RenderContext::new(&scene))
            .unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_dashed_stroke_mapping() {
        let style = StrokeStyle::default().with_dash_style(blueprint_core::DashStyle::Dash);
        let stroke = skia_stroke(&style);
        assert!(stroke.dash.is_some());
        assert_eq!(stroke.line_cap, tiny_skia::LineCap::Round);
        assert!(skia_stroke(&StrokeStyle::default()).dash.is_none());
    }
}
