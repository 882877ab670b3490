//! Rectangle-list regions for damage tracking.
//!
//! A region is an ordered list of axis-aligned rectangles with a cached
//! bounding extent. Rectangles use the half-open convention: a rect owns
//! points `[x, x+w) x [y, y+h)`. The list is not canonicalized — overlapping
//! entries are allowed and membership stays correct.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;
use crate::scan::Scanner;

/// Axis-aligned rectangle with fractional coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle owns no points unless both dimensions are strictly
    /// positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open point membership.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Clip against another rectangle. `None` unless the overlap has
    /// strictly positive width and height.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);
        if x2 - x1 > 0.0 && y2 - y1 > 0.0 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Bounding box of two rectangles.
    fn union_bounds(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = (self.x + self.width).max(other.x + other.width);
        let y2 = (self.y + self.height).max(other.y + other.height);
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// A 2D area as a list of rectangles with cached bounding extents.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    rects: Vec<Rect>,
    extents: Rect,
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Region {
    pub fn new() -> Self {
        Self {
            rects: Vec::with_capacity(4),
            extents: Rect::default(),
        }
    }

    /// Remove all rectangles and reset the extents. Idempotent.
    pub fn clear(&mut self) {
        self.rects.clear();
        self.extents = Rect::default();
    }

    /// True iff the region contains no rectangles.
    pub fn is_nil(&self) -> bool {
        self.rects.is_empty()
    }

    /// Cached bounding box of all rectangles; the empty rect when nil.
    pub fn extents(&self) -> Rect {
        self.extents
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Append a rectangle and fold it into the extents.
    ///
    /// Rectangles without positive area are ignored — the list only ever
    /// holds rects that own at least one point.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        if self.rects.is_empty() {
            self.extents = rect;
        } else {
            self.extents = self.extents.union_bounds(&rect);
        }
        self.rects.push(rect);
    }

    /// Whether any rectangle contains `(x, y)` (half-open).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        if !self.extents.contains(x, y) {
            return false;
        }
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Clip `rect` against every rectangle of the region; the result is
    /// empty when nothing overlaps.
    pub fn intersect_rect(&self, rect: &Rect) -> Region {
        let mut out = Region::new();
        if rect.intersection(&self.extents).is_none() {
            return out;
        }
        for r in &self.rects {
            if let Some(clip) = r.intersection(rect) {
                out.add_rect(clip);
            }
        }
        out
    }

    /// Pairwise intersection of two regions.
    pub fn intersect(a: &Region, b: &Region) -> Region {
        let mut out = Region::new();
        if a.extents.intersection(&b.extents).is_none() {
            return out;
        }
        for ra in &a.rects {
            for rb in &b.rects {
                if let Some(clip) = ra.intersection(rb) {
                    out.add_rect(clip);
                }
            }
        }
        out
    }

    /// Insert every rectangle of `src`. No merging of overlapping
    /// entries is performed.
    pub fn union(&mut self, src: &Region) {
        for r in &src.rects {
            self.add_rect(*r);
        }
    }
}

impl fmt::Display for Region {
    /// Text form:
    ///
    /// ```text
    /// {
    /// [x,y,w,h],
    /// [x,y,w,h]
    /// }
    /// ```
    ///
    /// An empty region prints as `{\n}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (i, r) in self.rects.iter().enumerate() {
            let sep = if i + 1 < self.rects.len() { "," } else { "" };
            writeln!(
                f,
                "[{:.6},{:.6},{:.6},{:.6}]{sep}",
                r.x, r.y, r.width, r.height
            )?;
        }
        write!(f, "}}")
    }
}

impl FromStr for Region {
    type Err = CodecError;

    /// Parse the `Display` form. Single-line input, exponential
    /// notation, trailing whitespace and a missing final newline are
    /// all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scan = Scanner::new(s.as_bytes());
        scan.expect(b'{')?;
        let mut region = Region::new();
        loop {
            if scan.accept(b'}') {
                break;
            }
            scan.expect(b'[')?;
            let x = scan.next_f64()?;
            scan.expect(b',')?;
            let y = scan.next_f64()?;
            scan.expect(b',')?;
            let width = scan.next_f64()?;
            scan.expect(b',')?;
            let height = scan.next_f64()?;
            scan.expect(b']')?;
            region.add_rect(Rect::new(x, y, width, height));
            // separators between rects are optional on input
            scan.accept(b',');
        }
        scan.skip_ws();
        if !scan.eof() {
            return Err(CodecError::Decode(
                "trailing garbage after region".into(),
            ));
        }
        Ok(region)
    }
}
