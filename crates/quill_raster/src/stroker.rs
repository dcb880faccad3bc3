//! Polyline stroking
//!
//! A [`PathRenderer`] paints one stroke's render path into an RGBA buffer.
//! [`RoundCapStroker`] computes per-pixel coverage as the distance to the
//! nearest segment of the path (a chain of capsules, so joins and caps are
//! round), keeps the maximum coverage over all segments, and blends the
//! brush color once per pixel. Blending once keeps a translucent stroke
//! uniform where its own segments overlap.

use image::{Rgba, RgbaImage};
use quill_ink::{Brush, Stroke};
use quill_paint::{Color, Point, Rect};

/// Draws polylines with a brush
pub trait PathRenderer: Send + Sync {
    /// Paint `points` as one continuous stroke on top of `target`
    fn stroke_polyline(&self, target: &mut RgbaImage, points: &[Point], brush: &Brush);
}

/// Draw every stroke in order using its render path
pub fn draw_strokes<'a>(
    renderer: &dyn PathRenderer,
    target: &mut RgbaImage,
    strokes: impl IntoIterator<Item = &'a Stroke>,
) {
    for stroke in strokes {
        if stroke.is_empty() {
            continue;
        }
        renderer.stroke_polyline(target, &stroke.path(), stroke.brush());
    }
}

/// Anti-aliased round-cap, round-join polyline stroker
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundCapStroker;

impl RoundCapStroker {
    pub fn new() -> Self {
        Self
    }
}

impl PathRenderer for RoundCapStroker {
    fn stroke_polyline(&self, target: &mut RgbaImage, points: &[Point], brush: &Brush) {
        let opacity = brush.color().a * brush.alpha();
        if opacity <= 0.0 {
            return;
        }
        let radius = brush.width() / 2.0;
        let Some(area) = Rect::bounding(points) else {
            return;
        };
        let Some(clip) = PixelSpan::clipped(area.inflate(radius + 1.0), target) else {
            return;
        };

        let mut coverage = vec![0.0f32; clip.len()];
        let mut accumulate = |a: Point, b: Point| {
            let reach = Rect::from_points(a, b).inflate(radius + 1.0);
            let Some(span) = PixelSpan::clipped(reach, target) else {
                return;
            };
            for y in span.y0..span.y1 {
                for x in span.x0..span.x1 {
                    let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    let cov = (radius + 0.5 - center.distance_to_segment(a, b)).clamp(0.0, 1.0);
                    let slot = &mut coverage[clip.index(x, y)];
                    if cov > *slot {
                        *slot = cov;
                    }
                }
            }
        };

        match points {
            [only] => accumulate(*only, *only),
            _ => {
                for pair in points.windows(2) {
                    accumulate(pair[0], pair[1]);
                }
            }
        }

        for y in clip.y0..clip.y1 {
            for x in clip.x0..clip.x1 {
                let cov = coverage[clip.index(x, y)];
                if cov > 0.0 {
                    let pixel = target.get_pixel_mut(x, y);
                    *pixel = blend_over(*pixel, brush.color(), cov * opacity);
                }
            }
        }
    }
}

/// Half-open pixel rectangle clipped to an image
#[derive(Clone, Copy, Debug)]
struct PixelSpan {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelSpan {
    fn clipped(rect: Rect, image: &RgbaImage) -> Option<Self> {
        let x0 = rect.x.floor().max(0.0);
        let y0 = rect.y.floor().max(0.0);
        let x1 = rect.max_x().ceil().min(image.width() as f32);
        let y1 = rect.max_y().ceil().min(image.height() as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }

    fn len(&self) -> usize {
        ((self.x1 - self.x0) * (self.y1 - self.y0)) as usize
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y - self.y0) * (self.x1 - self.x0) + (x - self.x0)) as usize
    }
}

/// Source-over blend of `color` at `alpha` onto a straight-alpha pixel
fn blend_over(dst: Rgba<u8>, color: Color, alpha: f32) -> Rgba<u8> {
    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mix = |src: f32, dst: f32| (src * alpha + dst * da * (1.0 - alpha)) / out_a;
    Rgba(Color::new(mix(color.r, dr), mix(color.g, dg), mix(color.b, db), out_a).to_rgba8())
}
