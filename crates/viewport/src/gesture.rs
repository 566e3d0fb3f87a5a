//! Pointer and touch handling for the map viewport.
//!
//! Interaction is a three-state machine. Drag and pinch are variants of one
//! enum so they can never be active together:
//!
//! - `Idle -> Dragging` on a single pointer press or a one-finger touch.
//! - `Dragging -> Idle` on release, or when the pointer leaves the surface.
//! - `Idle -> Pinching` when exactly two touch points are down.
//! - `Pinching -> Idle` when fewer than two touch points remain.
//!
//! A second finger landing mid-drag ends the drag first and then starts a
//! pinch from the new finger spacing; no pan is carried into the pinch.

use serde::{Deserialize, Serialize};

use crate::state::ViewportState;

/// Zoom change per pinch step.
pub const PINCH_ZOOM_STEP: f64 = 0.5;
/// Zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.0;

/// Screen position in pixels.
pub type PointPx = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        last: PointPx,
    },
    Pinching {
        last_distance: f64,
    },
}

impl Gesture {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self, Gesture::Pinching { .. })
    }
}

/// Input delivered by the map surface.
///
/// Touch events carry every touch point currently on the surface (for
/// `TouchEnd`, the ones that remain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { pos: PointPx },
    PointerMove { pos: PointPx },
    PointerUp,
    PointerLeave,
    /// Positive `delta_y` scrolls down, which zooms out.
    Wheel { delta_y: f64 },
    TouchStart { touches: Vec<PointPx> },
    TouchMove { touches: Vec<PointPx> },
    TouchEnd { touches: Vec<PointPx> },
}

/// Applies one input event.
///
/// Pure transition: the viewport and gesture go in by value and the updated
/// pair comes back out.
pub fn step(
    view: ViewportState,
    gesture: Gesture,
    event: &InputEvent,
) -> (ViewportState, Gesture) {
    match event {
        InputEvent::PointerDown { pos } => match gesture {
            Gesture::Pinching { .. } => (view, gesture),
            _ => (view, Gesture::Dragging { last: *pos }),
        },
        InputEvent::PointerMove { pos } => drag_to(view, gesture, *pos),
        InputEvent::PointerUp | InputEvent::PointerLeave => match gesture {
            Gesture::Dragging { .. } => (view, Gesture::Idle),
            _ => (view, gesture),
        },
        InputEvent::Wheel { delta_y } => (wheel(view, *delta_y), gesture),
        InputEvent::TouchStart { touches } => match touches.as_slice() {
            [a, b] => (view, start_pinch(*a, *b)),
            [p] => match gesture {
                Gesture::Idle | Gesture::Dragging { .. } => (view, Gesture::Dragging { last: *p }),
                Gesture::Pinching { .. } => (view, gesture),
            },
            _ => (view, Gesture::Idle),
        },
        InputEvent::TouchMove { touches } => match touches.as_slice() {
            [a, b] => match gesture {
                Gesture::Pinching { last_distance } => pinch(view, last_distance, *a, *b),
                // A second finger showed up without a start event.
                _ => (view, start_pinch(*a, *b)),
            },
            [p] => drag_to(view, gesture, *p),
            _ => (view, gesture),
        },
        InputEvent::TouchEnd { touches } => match gesture {
            Gesture::Pinching { .. } if touches.len() == 2 => (view, gesture),
            _ => (view, Gesture::Idle),
        },
    }
}

fn drag_to(view: ViewportState, gesture: Gesture, pos: PointPx) -> (ViewportState, Gesture) {
    let Gesture::Dragging { last } = gesture else {
        return (view, gesture);
    };
    let dx = pos[0] - last[0];
    let dy = pos[1] - last[1];
    (view.panned(dx, dy), Gesture::Dragging { last: pos })
}

fn wheel(view: ViewportState, delta_y: f64) -> ViewportState {
    if delta_y > 0.0 {
        view.zoomed_by(-WHEEL_ZOOM_STEP)
    } else if delta_y < 0.0 {
        view.zoomed_by(WHEEL_ZOOM_STEP)
    } else {
        view
    }
}

fn start_pinch(a: PointPx, b: PointPx) -> Gesture {
    Gesture::Pinching {
        last_distance: touch_distance(a, b),
    }
}

fn pinch(
    view: ViewportState,
    last_distance: f64,
    a: PointPx,
    b: PointPx,
) -> (ViewportState, Gesture) {
    let distance = touch_distance(a, b);
    let view = if last_distance <= 0.0 || distance == last_distance {
        view
    } else if distance > last_distance {
        view.zoomed_by(PINCH_ZOOM_STEP)
    } else {
        view.zoomed_by(-PINCH_ZOOM_STEP)
    };
    (
        view,
        Gesture::Pinching {
            last_distance: distance,
        },
    )
}

fn touch_distance(a: PointPx, b: PointPx) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MAX_ZOOM, MIN_ZOOM};
    use foundation::GeoPoint;

    fn view(zoom: f64) -> ViewportState {
        ViewportState::new(GeoPoint::new(40.0, -74.0), zoom)
    }

    fn run(mut v: ViewportState, events: &[InputEvent]) -> (ViewportState, Gesture) {
        let mut g = Gesture::Idle;
        for e in events {
            (v, g) = step(v, g, e);
        }
        (v, g)
    }

    #[test]
    fn press_move_release_pans_continuously() {
        let (v, g) = run(
            view(18.0),
            &[
                InputEvent::PointerDown { pos: [100.0, 100.0] },
                InputEvent::PointerMove { pos: [110.0, 100.0] },
                InputEvent::PointerMove { pos: [120.0, 110.0] },
                InputEvent::PointerUp,
            ],
        );
        assert_eq!(g, Gesture::Idle);
        // 20px right and 10px down in total, not 30px from double counting.
        assert!((v.center.lng - (-74.0 - 20.0 * 0.0001)).abs() < 1e-9);
        assert!((v.center.lat - (40.0 + 10.0 * 0.0001)).abs() < 1e-9);
    }

    #[test]
    fn moves_without_press_do_nothing() {
        let start = view(12.0);
        let (v, g) = step(start, Gesture::Idle, &InputEvent::PointerMove { pos: [5.0, 5.0] });
        assert_eq!(v, start);
        assert_eq!(g, Gesture::Idle);
    }

    #[test]
    fn leaving_the_surface_ends_the_drag() {
        let (_, g) = run(
            view(12.0),
            &[
                InputEvent::PointerDown { pos: [0.0, 0.0] },
                InputEvent::PointerLeave,
            ],
        );
        assert_eq!(g, Gesture::Idle);
    }

    #[test]
    fn wheel_steps_whole_levels_and_clamps() {
        let (v, _) = step(view(18.0), Gesture::Idle, &InputEvent::Wheel { delta_y: 120.0 });
        assert_eq!(v.zoom, 17.0);
        let (v, _) = step(view(18.0), Gesture::Idle, &InputEvent::Wheel { delta_y: -120.0 });
        assert_eq!(v.zoom, MAX_ZOOM);
        let (v, _) = step(view(1.0), Gesture::Idle, &InputEvent::Wheel { delta_y: 3.0 });
        assert_eq!(v.zoom, MIN_ZOOM);
        let (v, _) = step(view(7.0), Gesture::Idle, &InputEvent::Wheel { delta_y: 0.0 });
        assert_eq!(v.zoom, 7.0);
    }

    #[test]
    fn pinch_spread_and_squeeze_step_half_levels() {
        let (v, g) = run(
            view(12.0),
            &[
                InputEvent::TouchStart { touches: vec![[0.0, 0.0], [100.0, 0.0]] },
                InputEvent::TouchMove { touches: vec![[0.0, 0.0], [150.0, 0.0]] },
            ],
        );
        assert_eq!(v.zoom, 12.5);
        assert_eq!(g, Gesture::Pinching { last_distance: 150.0 });

        let (v, g) = step(
            v,
            g,
            &InputEvent::TouchMove { touches: vec![[0.0, 0.0], [90.0, 0.0]] },
        );
        assert_eq!(v.zoom, 12.0);

        let (v, g) = step(v, g, &InputEvent::TouchMove { touches: vec![[0.0, 0.0], [90.0, 0.0]] });
        assert_eq!(v.zoom, 12.0);

        let (_, g) = step(v, g, &InputEvent::TouchEnd { touches: vec![[0.0, 0.0]] });
        assert_eq!(g, Gesture::Idle);
    }

    #[test]
    fn pinch_zoom_is_clamped() {
        let mut v = view(17.5);
        let mut g = start_pinch([0.0, 0.0], [10.0, 0.0]);
        for i in 2..10 {
            let e = InputEvent::TouchMove { touches: vec![[0.0, 0.0], [10.0 * i as f64, 0.0]] };
            (v, g) = step(v, g, &e);
        }
        assert_eq!(v.zoom, MAX_ZOOM);
        assert!(g.is_pinching());
    }

    #[test]
    fn second_finger_mid_drag_switches_to_pinch_without_panning() {
        let start = view(12.0);
        let (v, g) = run(
            start,
            &[
                InputEvent::TouchStart { touches: vec![[10.0, 10.0]] },
                InputEvent::TouchStart { touches: vec![[10.0, 10.0], [60.0, 10.0]] },
            ],
        );
        assert_eq!(v, start);
        assert_eq!(g, Gesture::Pinching { last_distance: 50.0 });
    }

    #[test]
    fn one_finger_touch_drags() {
        let (v, g) = run(
            view(18.0),
            &[
                InputEvent::TouchStart { touches: vec![[0.0, 0.0]] },
                InputEvent::TouchMove { touches: vec![[0.0, -10.0]] },
            ],
        );
        assert!(g.is_dragging());
        assert!((v.center.lat - (40.0 - 10.0 * 0.0001)).abs() < 1e-9);
    }

    #[test]
    fn pointer_press_during_pinch_is_ignored() {
        let g = start_pinch([0.0, 0.0], [3.0, 4.0]);
        let (_, g) = step(view(5.0), g, &InputEvent::PointerDown { pos: [1.0, 1.0] });
        assert_eq!(g, Gesture::Pinching { last_distance: 5.0 });
    }
}
