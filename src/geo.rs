// Map-presentation math: color buckets, marker sizing, and view fitting.
//
// Nothing here draws anything. These functions turn district totals into the
// numbers a map front-end needs: a YlOrRd bucket color per district, a
// min-max scaled circle radius, and a center/zoom that frames the data.
use crate::types::MapView;

/// Five-step yellow-to-dark-red scale, low to high.
pub const BUCKET_COLORS: [&str; 5] = ["#ffffb2", "#fecc5c", "#fd8d3c", "#f03b20", "#bd0026"];

/// Marker radii in pixels.
const RADIUS_MIN: f64 = 8.0;
const RADIUS_SPAN: f64 = 17.0;
const RADIUS_FLAT: f64 = 15.0;

/// Fallback view framing the whole of Thailand (Bangkok city center).
pub const THAILAND_VIEW: MapView = MapView {
    center_lat: 13.736717,
    center_long: 100.523186,
    zoom: 6,
};

/// Linear-interpolated percentile of a sorted slice, numpy-style.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Assign each value one of the five bucket colors.
///
/// With five or more distinct values the buckets are quantile-based, so each
/// color covers roughly the same number of districts. With fewer distinct
/// values quantile edges collapse, so equal-width bins are used instead.
/// A completely flat series gets the middle color everywhere.
pub fn color_scale(values: &[f64]) -> Vec<&'static str> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if (max - min).abs() < f64::EPSILON {
        return vec![BUCKET_COLORS[2]; values.len()];
    }

    let mut distinct = 1usize;
    for w in sorted.windows(2) {
        if (w[1] - w[0]).abs() > f64::EPSILON {
            distinct += 1;
        }
    }

    // Upper edges of the first four buckets; the fifth is open-ended.
    let edges: Vec<f64> = if distinct >= BUCKET_COLORS.len() {
        (1..BUCKET_COLORS.len())
            .map(|i| percentile(&sorted, i as f64 / BUCKET_COLORS.len() as f64))
            .collect()
    } else {
        let width = (max - min) / BUCKET_COLORS.len() as f64;
        (1..BUCKET_COLORS.len())
            .map(|i| min + width * i as f64)
            .collect()
    };

    values
        .iter()
        .map(|v| {
            let idx = edges.iter().filter(|e| *v > **e).count();
            BUCKET_COLORS[idx]
        })
        .collect()
}

/// Min-max scale a district total into a marker radius of 8 to 25 pixels.
/// A degenerate range (all districts equal) gets a uniform medium radius.
pub fn marker_radius(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return RADIUS_FLAT;
    }
    let norm = (value - min) / (max - min);
    RADIUS_MIN + norm * RADIUS_SPAN
}

/// Fit a center and zoom level to the plotted coordinates.
///
/// The center is the bounds midpoint; the zoom shrinks as the lat/lon span
/// grows. No coordinates at all falls back to a whole-country view.
pub fn map_view(points: &[(f64, f64)]) -> MapView {
    if points.is_empty() {
        return THAILAND_VIEW;
    }
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_long, mut max_long) = (f64::MAX, f64::MIN);
    for (lat, long) in points {
        min_lat = min_lat.min(*lat);
        max_lat = max_lat.max(*lat);
        min_long = min_long.min(*long);
        max_long = max_long.max(*long);
    }
    let max_diff = (max_lat - min_lat).max(max_long - min_long);
    let zoom = if max_diff > 10.0 {
        6
    } else if max_diff > 5.0 {
        7
    } else if max_diff > 2.0 {
        8
    } else if max_diff > 1.0 {
        9
    } else {
        10
    };
    MapView {
        center_lat: (min_lat + max_lat) / 2.0,
        center_long: (min_long + max_long) / 2.0,
        zoom,
    }
}
