use crate::state::{CanvasImage, CanvasState, Line, Point, SelectionRect, Shape};

/// Axis-aligned box `[min_x, max_x] x [min_y, max_y]`, always normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x.min(x + width),
            min_y: y.min(y + height),
            max_x: x.max(x + width),
            max_y: y.max(y + height),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter().filter_map(normalize_point);
        let first = points.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in points {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.max_y = bounds.max_y.max(point.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Closed intervals: boxes that only share an edge intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn expand(&self, amount: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }
}

impl From<SelectionRect> for Bounds {
    fn from(rect: SelectionRect) -> Self {
        Bounds::from_rect(rect.x, rect.y, rect.width, rect.height)
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }
    Some(point)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn shape_bounds(shape: &Shape) -> Option<Bounds> {
    let bounds = Bounds::from_rect(shape.x, shape.y, shape.width, shape.height);
    bounds.is_finite().then_some(bounds)
}

/// Point extent grown by half the stroke width.
pub fn line_bounds(line: &Line) -> Option<Bounds> {
    let bounds = Bounds::from_points(line.points())?;
    let half = if line.size.is_finite() {
        line.size.max(0.0) / 2.0
    } else {
        0.0
    };
    Some(bounds.expand(half))
}

pub fn image_bounds(image: &CanvasImage) -> Option<Bounds> {
    let bounds = Bounds::from_rect(image.x, image.y, image.width, image.height);
    bounds.is_finite().then_some(bounds)
}

pub fn object_bounds(canvas: &CanvasState, id: &str) -> Option<Bounds> {
    if let Some(shape) = canvas.shapes.iter().find(|shape| shape.id == id) {
        return shape_bounds(shape);
    }
    if let Some(line) = canvas.lines.iter().find(|line| line.id == id) {
        return line_bounds(line);
    }
    canvas
        .images
        .iter()
        .find(|image| image.id == id)
        .and_then(image_bounds)
}

pub fn union_bounds<S: AsRef<str>>(canvas: &CanvasState, ids: &[S]) -> Option<Bounds> {
    ids.iter()
        .filter_map(|id| object_bounds(canvas, id.as_ref()))
        .reduce(|acc, bounds| acc.union(&bounds))
}

/// Topmost object under the point: lines, then shapes, then images, each
/// in reverse insertion order.
pub fn hit_test(canvas: &CanvasState, point: Point) -> Option<String> {
    let point = normalize_point(point)?;
    let line = canvas
        .lines
        .iter()
        .rev()
        .find(|line| line_bounds(line).is_some_and(|bounds| bounds.contains(point)))
        .map(|line| line.id.clone());
    if line.is_some() {
        return line;
    }
    let shape = canvas
        .shapes
        .iter()
        .rev()
        .find(|shape| shape_bounds(shape).is_some_and(|bounds| bounds.contains(point)))
        .map(|shape| shape.id.clone());
    if shape.is_some() {
        return shape;
    }
    canvas
        .images
        .iter()
        .rev()
        .find(|image| image_bounds(image).is_some_and(|bounds| bounds.contains(point)))
        .map(|image| image.id.clone())
}

/// Down-samples long strokes. Strokes at or below `max_points` come back
/// unchanged; longer ones keep the first point, the last point and every
/// `n / target`-th point in between.
pub fn simplify_points(points: &[f64], max_points: usize, target: usize) -> Vec<f64> {
    let count = points.len() / 2;
    if count <= max_points {
        return points.to_vec();
    }
    let skip = (count / target.max(1)).max(1);
    let mut kept = Vec::with_capacity((count / skip + 2) * 2);
    for (index, pair) in points.chunks_exact(2).enumerate() {
        if index == 0 || index == count - 1 || index % skip == 0 {
            kept.extend_from_slice(pair);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_bounds_normalize_negative_size() {
        let bounds = Bounds::from_rect(10.0, 10.0, -4.0, 6.0);
        assert_eq!(bounds.min_x, 6.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.min_y, 10.0);
        assert_eq!(bounds.max_y, 16.0);
    }

    #[test]
    fn touching_edges_intersect() {
        let a = Bounds::from_rect(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::from_rect(10.0, 0.0, 5.0, 5.0);
        let c = Bounds::from_rect(10.5, 0.0, 5.0, 5.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let bounds =
            Bounds::from_points([Point::new(f64::NAN, 0.0), Point::new(1.0, 2.0)]).unwrap();
        assert_eq!(bounds, Bounds::from_rect(1.0, 2.0, 0.0, 0.0));
        assert!(Bounds::from_points([Point::new(f64::INFINITY, 0.0)]).is_none());
    }

    #[test]
    fn hit_test_prefers_lines_over_shapes() {
        let mut state = crate::state::State::default();
        state.canvas.shapes.push(Shape {
            id: "box".into(),
            kind: crate::state::ShapeKind::Rectangle,
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            color: "#000000".into(),
            is_drawing: false,
        });
        state.canvas.lines.push(Line {
            id: "stroke".into(),
            tool: crate::state::StrokeTool::Brush,
            points: vec![5.0, 5.0, 10.0, 5.0],
            color: "#000000".into(),
            size: 4.0,
        });
        let canvas = &state.canvas;
        assert_eq!(hit_test(canvas, Point::new(7.0, 6.0)).as_deref(), Some("stroke"));
        assert_eq!(hit_test(canvas, Point::new(15.0, 15.0)).as_deref(), Some("box"));
        assert_eq!(hit_test(canvas, Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn simplify_keeps_every_nth_and_endpoints() {
        let points: Vec<f64> = (0..150).flat_map(|i| [i as f64, 0.0]).collect();
        let kept = simplify_points(&points, 100, 50);
        // skip = 150 / 50 = 3
        assert_eq!(kept.len() / 2, 51);
        assert_eq!(&kept[..2], &[0.0, 0.0]);
        assert_eq!(&kept[kept.len() - 2..], &[149.0, 0.0]);
    }
}
