//! Template matching contract and the default correlation matcher.

use super::frame::Frame;
use super::template::Template;
use crate::core::{Point, Region};
use image::{imageops, GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;

/// Best location of a template inside a frame, before thresholding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Located {
    /// Top-left corner of the best window, in frame coordinates
    pub top_left: Point,
    /// Similarity in `[0.0, 1.0]`
    pub confidence: f64,
}

/// Locates a template inside a frame.
///
/// Implementations must be deterministic: the same frame and template
/// always give the same location and confidence.
pub trait TemplateMatcher {
    /// Best-scoring location of `template` in `frame`, searching only inside
    /// `region` when one is given. `None` when the template cannot fit.
    fn locate(&self, frame: &Frame, template: &Template, region: Option<Region>) -> Option<Located>;
}

/// Outcome of one match attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// `confidence >= threshold`
    pub found: bool,
    /// Centre of the matched window when found. Absent when the template
    /// could not fit the search area, even if a zero threshold makes that
    /// count as found.
    pub position: Option<Point>,
    pub confidence: f64,
    /// `(width, height)` of the template
    pub template_size: (u32, u32),
    pub elapsed: Duration,
    /// Set when the attempt could not run, e.g. a failed capture
    pub error: Option<String>,
}

impl MatchResult {
    /// Apply `threshold` to a raw location.
    ///
    /// # Example
    ///
    /// ```rust
    /// use menupilot::core::Point;
    /// use menupilot::vision::{Located, MatchResult};
    /// use std::time::Duration;
    ///
    /// let hit = Located { top_left: Point::new(10, 20), confidence: 0.92 };
    /// let result = MatchResult::evaluate(Some(hit), (8, 4), 0.8, Duration::ZERO);
    ///
    /// assert!(result.found);
    /// assert_eq!(result.position, Some(Point::new(14, 22)));
    /// ```
    pub fn evaluate(
        located: Option<Located>,
        template_size: (u32, u32),
        threshold: f64,
        elapsed: Duration,
    ) -> Self {
        let confidence = located.map_or(0.0, |l| l.confidence);
        let found = confidence >= threshold;
        let position = located.filter(|_| found).map(|l| {
            l.top_left.offset_by(Point::new(
                (template_size.0 / 2) as i32,
                (template_size.1 / 2) as i32,
            ))
        });
        Self {
            found,
            position,
            confidence,
            template_size,
            elapsed,
            error: None,
        }
    }

    /// An attempt that never reached the matcher.
    pub fn failed(template_size: (u32, u32), elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            found: false,
            position: None,
            confidence: 0.0,
            template_size,
            elapsed,
            error: Some(error.into()),
        }
    }
}

/// Zero-mean normalized cross-correlation over grayscale pixels.
///
/// Scores every window of the search area with the correlation coefficient
/// (the measure OpenCV calls `TM_CCOEFF_NORMED`). Raw cross-correlation
/// comes from `imageproc`; window sums come from integral images.
/// Negative correlation is reported as 0.0. Among equal scores the first
/// window in row-major order wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct NccMatcher;

impl TemplateMatcher for NccMatcher {
    fn locate(
        &self,
        frame: &Frame,
        template: &Template,
        region: Option<Region>,
    ) -> Option<Located> {
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 {
            return None;
        }

        let (x0, y0, x1, y1) = match region {
            Some(region) => region.clip(frame.width(), frame.height())?,
            None => (0, 0, frame.width(), frame.height()),
        };
        if x1 - x0 < tw || y1 - y0 < th {
            return None;
        }

        let search = if (x0, y0, x1, y1) == (0, 0, frame.width(), frame.height()) {
            Cow::Borrowed(frame.image())
        } else {
            Cow::Owned(imageops::crop_imm(frame.image(), x0, y0, x1 - x0, y1 - y0).to_image())
        };

        let scores = correlation_coefficients(&search, template.image());
        let best = find_extremes(&scores);
        let (bx, by) = best.max_value_location;
        Some(Located {
            top_left: Point::new((x0 + bx) as i32, (y0 + by) as i32),
            confidence: f64::from(best.max_value),
        })
    }
}

/// Score map of size `(W - tw + 1, H - th + 1)`, clamped to `[0, 1]`.
///
/// With `n` pixels per window, the coefficient is
/// `(n·ΣIT - ΣI·ΣT) / sqrt((n·ΣT² - (ΣT)²)(n·ΣI² - (ΣI)²))`.
fn correlation_coefficients(search: &GrayImage, template: &GrayImage) -> Image<Luma<f32>> {
    let (tw, th) = template.dimensions();
    let n = u128::from(tw) * u128::from(th);
    let (t_sum, t_sq) = template.pixels().fold((0u128, 0u128), |(sum, sq), p| {
        let v = u128::from(p[0]);
        (sum + v, sq + v * v)
    });
    let t_energy = (n * t_sq).saturating_sub(t_sum * t_sum);

    let cross = match_template(search, template, MatchTemplateMethod::CrossCorrelation);
    let sums = integral_image::<_, u64>(search);
    let squares = integral_squared_image::<_, u64>(search);

    ImageBuffer::from_fn(cross.width(), cross.height(), |x, y| {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let w_sum = u128::from(sum_image_pixels(&sums, x, y, right, bottom)[0]);
        let w_sq = u128::from(sum_image_pixels(&squares, x, y, right, bottom)[0]);
        let w_energy = (n * w_sq).saturating_sub(w_sum * w_sum);

        let score = if t_energy == 0 || w_energy == 0 {
            // Flat template or flat window: only an identical flat patch matches.
            if t_energy == 0 && w_energy == 0 && w_sum == t_sum {
                1.0
            } else {
                0.0
            }
        } else {
            let cross_sum = f64::from(cross.get_pixel(x, y)[0]);
            let numerator = n as f64 * cross_sum - w_sum as f64 * t_sum as f64;
            numerator / ((t_energy as f64) * (w_energy as f64)).sqrt()
        };
        Luma([score.clamp(0.0, 1.0) as f32])
    })
}
