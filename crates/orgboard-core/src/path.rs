//! SVG-style path string utilities.
//!
//! Paths use command letters followed by numeric parameters, e.g. `M10 20 Q15 25 20 30 L40 50`.
//! Only absolute `M`, `L`, `Q` and `C` carry coordinates that are translated; everything
//! else passes through untouched.

use kurbo::{Point, Rect};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap());
static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([MLQCZHVSTAmlqczhvsta])([^MLQCZHVSTAmlqczhvsta]*)").unwrap()
});

/// Simplification tolerance applied before smoothing freehand input.
pub const SMOOTHING_TOLERANCE: f64 = 1.0;

fn numbers(params: &str) -> impl Iterator<Item = f64> + '_ {
    NUMBER_RE
        .find_iter(params)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
}

/// Round to two decimals and format without trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

/// Bounding box of a path, reading every numeric token pairwise as (x, y).
///
/// Returns `None` if the path has fewer than two numbers.
pub fn path_bounds(path: &str) -> Option<Rect> {
    let values: Vec<f64> = numbers(path).collect();
    let mut pairs = values.chunks_exact(2);
    let first = pairs.next()?;
    let start = Rect::new(first[0], first[1], first[0], first[1]);

    Some(pairs.fold(start, |rect, pair| {
        Rect::new(
            rect.x0.min(pair[0]),
            rect.y0.min(pair[1]),
            rect.x1.max(pair[0]),
            rect.y1.max(pair[1]),
        )
    }))
}

/// Translate all absolute coordinates of a path by `(dx, dy)`.
pub fn translate_path(path: &str, dx: f64, dy: f64) -> String {
    COMMAND_RE
        .captures_iter(path)
        .map(|caps| {
            let command = &caps[1];
            let params = &caps[2];
            match command {
                "M" | "L" | "Q" | "C" => {
                    let moved: Vec<String> = numbers(params)
                        .enumerate()
                        .map(|(i, v)| format_number(if i % 2 == 0 { v + dx } else { v + dy }))
                        .collect();
                    format!("{}{}", command, moved.join(" "))
                }
                _ => format!("{}{}", command, params.trim()),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_point(out: &mut String, point: Point) {
    out.push_str(&format_number(point.x));
    out.push(' ');
    out.push_str(&format_number(point.y));
}

/// Build a smoothed path from raw pointer samples.
///
/// Points are simplified first, then joined with quadratic segments through the midpoints
/// of consecutive samples.
pub fn smooth_path(points: &[Point]) -> String {
    let points = simplify(points, SMOOTHING_TOLERANCE);
    let Some(&first) = points.first() else {
        return String::new();
    };

    let mut out = String::from("M");
    push_point(&mut out, first);

    match points.len() {
        1 => {
            out.push_str(" L");
            push_point(&mut out, first);
        }
        2 => {
            out.push_str(" L");
            push_point(&mut out, points[1]);
        }
        n => {
            for i in 1..n - 1 {
                let control = points[i];
                let next = points[i + 1];
                let mid = control.midpoint(next);
                out.push_str(" Q");
                push_point(&mut out, control);
                out.push(' ');
                push_point(&mut out, mid);
            }
            out.push_str(" L");
            push_point(&mut out, points[n - 1]);
        }
    }

    out
}

/// Ramer-Douglas-Peucker line simplification.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify(&points[..=max_index], tolerance);
        let right = simplify(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return point.distance(line_start);
    }

    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}
