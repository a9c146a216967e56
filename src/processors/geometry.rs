//! Geometric utilities for OCR post-processing.
//!
//! This module provides the axis-aligned pixel rectangle used throughout the
//! crate, conversions from the polygons and rectangles produced by detection
//! engines, and the intersection-over-union primitive shared by line merging
//! and detection scoring.

use imageproc::rect::Rect;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::errors::{OCRError, OcrResult};

/// Guards the IoU denominator when both boxes are degenerate.
pub const IOU_EPSILON: f64 = 1e-6;

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned integer pixel rectangle `(x, y, w, h)` with origin top-left.
///
/// Width and height are unsigned, so a constructed box can never have negative
/// extent. Raw `[x, y, w, h]` arrays with negative dimensions are rejected at
/// conversion time with [`OCRError::InvalidBox`]. The JSON form is the array
/// `[x, y, w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 4]", into = "[i64; 4]")]
pub struct BoundingBox {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a bounding box from raw `(x, y, w, h)` values, rejecting
    /// negative or out-of-range dimensions.
    pub fn try_from_xywh(x: i64, y: i64, w: i64, h: i64) -> OcrResult<Self> {
        let invalid = || OCRError::InvalidBox {
            x,
            y,
            width: w,
            height: h,
        };
        Ok(Self {
            x: i32::try_from(x).map_err(|_| invalid())?,
            y: i32::try_from(y).map_err(|_| invalid())?,
            width: u32::try_from(w).map_err(|_| invalid())?,
            height: u32::try_from(h).map_err(|_| invalid())?,
        })
    }

    /// Creates the tightest box around a polygon, typically the 4-point quad
    /// returned by a detector.
    ///
    /// Coordinates are truncated toward zero, so the result matches an
    /// `int(min)` / `int(max - min)` conversion. Returns `InvalidInput` for an
    /// empty polygon.
    pub fn from_points(points: &[Point]) -> OcrResult<Self> {
        let empty = || OCRError::InvalidInput {
            message: "cannot build a box from an empty polygon".to_string(),
        };
        let (min_x, max_x) = points
            .iter()
            .map(|p| p.x)
            .minmax()
            .into_option()
            .ok_or_else(empty)?;
        let (min_y, max_y) = points
            .iter()
            .map(|p| p.y)
            .minmax()
            .into_option()
            .ok_or_else(empty)?;

        let x = min_x as i64;
        let y = min_y as i64;
        Self::try_from_xywh(x, y, (max_x - x as f32) as i64, (max_y - y as f32) as i64)
    }

    /// Creates the smallest box enclosing every box in `boxes`, or `None` if
    /// the iterator is empty.
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<Self> {
        boxes.into_iter().copied().reduce(|acc, b| acc.union(&b))
    }

    /// Left edge.
    #[inline]
    pub fn x_min(&self) -> i64 {
        self.x as i64
    }

    /// Top edge.
    #[inline]
    pub fn y_min(&self) -> i64 {
        self.y as i64
    }

    /// Right edge (`x + w`).
    #[inline]
    pub fn x_max(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (`y + h`).
    #[inline]
    pub fn y_max(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Vertical center (`y + h / 2`), not rounded.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y as f64 + self.height as f64 / 2.0
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Computes the area of intersection between this bounding box and another.
    ///
    /// Returns 0 when the boxes do not overlap or only touch along an edge.
    pub fn intersection_area(&self, other: &BoundingBox) -> u64 {
        let inter_w = self.x_max().min(other.x_max()) - self.x_min().max(other.x_min());
        let inter_h = self.y_max().min(other.y_max()) - self.y_min().max(other.y_min());
        if inter_w <= 0 || inter_h <= 0 {
            return 0;
        }
        // Both extents are bounded by a u32 width, so the product fits in u64.
        inter_w as u64 * inter_h as u64
    }

    /// Computes the Intersection over Union (IoU) between this bounding box and another.
    ///
    /// The denominator carries [`IOU_EPSILON`], so identical boxes score just
    /// below 1.0 and two zero-area boxes score 0.0 instead of dividing by zero.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let inter = self.intersection_area(other) as f64;
        if inter <= 0.0 {
            return 0.0;
        }
        let union = self.area() as f64 + other.area() as f64 - inter;
        inter / (union + IOU_EPSILON)
    }

    /// Computes the union (minimum bounding box) of this bounding box and another.
    ///
    /// An extent wider than `u32::MAX` saturates, so the right or bottom edge
    /// is clipped rather than wrapped.
    pub fn union(&self, other: &Self) -> Self {
        let x_min = self.x_min().min(other.x_min());
        let y_min = self.y_min().min(other.y_min());
        let x_max = self.x_max().max(other.x_max());
        let y_max = self.y_max().max(other.y_max());
        Self {
            x: x_min as i32,
            y: y_min as i32,
            width: u32::try_from(x_max - x_min).unwrap_or(u32::MAX),
            height: u32::try_from(y_max - y_min).unwrap_or(u32::MAX),
        }
    }
}

/// Intersection over union of two boxes. Symmetric in its arguments.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    a.iou(b)
}

impl TryFrom<[i64; 4]> for BoundingBox {
    type Error = OCRError;

    fn try_from([x, y, w, h]: [i64; 4]) -> Result<Self, Self::Error> {
        Self::try_from_xywh(x, y, w, h)
    }
}

impl From<BoundingBox> for [i64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x as i64, b.y as i64, b.width as i64, b.height as i64]
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.left(),
            y: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }
}
