use foundation::GeoPoint;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 18.0;
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Degrees of pan per pixel at [`MAX_ZOOM`]; doubles for every level out.
const PAN_DEGREES_PER_PIXEL: f64 = 0.0001;

/// Midtown Manhattan.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 40.7589,
    lng: -73.9851,
};

/// Camera over the static map: a center coordinate and a zoom level.
///
/// Zoom stays within `[MIN_ZOOM, MAX_ZOOM]`. Wheel steps move it by whole
/// levels, pinch steps by half levels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl ViewportState {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center: clamp_point(center),
            zoom: clamp_zoom(zoom),
        }
    }

    /// Same zoom, recentred on `point` (used when the observer location arrives).
    pub fn centered_on(self, point: GeoPoint) -> Self {
        Self {
            center: clamp_point(point),
            ..self
        }
    }

    /// Coordinate degrees covered by one screen pixel at the current zoom.
    pub fn degrees_per_pixel(&self) -> f64 {
        PAN_DEGREES_PER_PIXEL * 2f64.powf(MAX_ZOOM - self.zoom)
    }

    /// Moves the center by a screen-space delta in pixels.
    ///
    /// Screen y grows downwards while latitude grows northwards, so the
    /// vertical delta is applied with the opposite sign.
    pub fn panned(self, dx: f64, dy: f64) -> Self {
        let scale = self.degrees_per_pixel();
        let center = GeoPoint::new(
            self.center.lat + dy * scale,
            self.center.lng - dx * scale,
        );
        Self {
            center: clamp_point(center),
            ..self
        }
    }

    pub fn zoomed_by(self, delta: f64) -> Self {
        Self {
            zoom: clamp_zoom(self.zoom + delta),
            ..self
        }
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Clamps latitude to the poles and wraps longitude into `[-180, 180]`.
fn clamp_point(p: GeoPoint) -> GeoPoint {
    let lat = if p.lat.is_finite() {
        p.lat.clamp(-90.0, 90.0)
    } else {
        DEFAULT_CENTER.lat
    };
    let lng = if p.lng.is_finite() {
        wrap_longitude(p.lng)
    } else {
        DEFAULT_CENTER.lng
    };
    GeoPoint::new(lat, lng)
}

fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 onto -180; both name the same meridian.
    if wrapped == -180.0 && lng > 0.0 { 180.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn pan_scale_halves_per_zoom_level() {
        let v = ViewportState::new(DEFAULT_CENTER, 18.0);
        assert_close(v.degrees_per_pixel(), 0.0001, 1e-12);
        let v = ViewportState::new(DEFAULT_CENTER, 12.0);
        assert_close(v.degrees_per_pixel(), 0.0064, 1e-12);
    }

    #[test]
    fn pan_moves_against_drag_horizontally_and_with_it_vertically() {
        let v = ViewportState::new(GeoPoint::new(40.0, -74.0), 18.0);
        let moved = v.panned(10.0, 20.0);
        assert_close(moved.center.lng, -74.001, 1e-9);
        assert_close(moved.center.lat, 40.002, 1e-9);
        assert_eq!(moved.zoom, 18.0);
    }

    #[test]
    fn pan_keeps_center_in_range() {
        let v = ViewportState::new(GeoPoint::new(89.0, 179.0), 1.0);
        let moved = v.panned(-10.0, 1000.0);
        assert_eq!(moved.center.lat, 90.0);
        assert!(moved.center.is_valid());
        assert!(moved.center.lng < 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let v = ViewportState::default();
        assert_eq!(v.zoomed_by(100.0).zoom, MAX_ZOOM);
        assert_eq!(v.zoomed_by(-100.0).zoom, MIN_ZOOM);
        assert_eq!(ViewportState::new(DEFAULT_CENTER, 0.0).zoom, MIN_ZOOM);
        assert_eq!(clamp_zoom(f64::NAN), DEFAULT_ZOOM);
    }

    #[test]
    fn wraps_longitude() {
        assert_close(wrap_longitude(190.0), -170.0, 1e-9);
        assert_close(wrap_longitude(-190.0), 170.0, 1e-9);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
    }
}
