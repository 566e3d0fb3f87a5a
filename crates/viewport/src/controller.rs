use foundation::GeoPoint;

use crate::gesture::{Gesture, InputEvent, step};
use crate::state::ViewportState;
use crate::static_map::{StaticMapConfig, StaticMapRequest, ViewportError, build_static_map_request};

/// Owns the viewport and the in-flight gesture for one map surface.
///
/// Each event goes through [`step`]; the controller only holds the latest pair.
#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    view: ViewportState,
    gesture: Gesture,
}

impl ViewportController {
    pub fn new(view: ViewportState) -> Self {
        Self {
            view,
            gesture: Gesture::Idle,
        }
    }

    pub fn view(&self) -> ViewportState {
        self.view
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Applies an input event and returns the resulting viewport.
    pub fn handle(&mut self, event: &InputEvent) -> ViewportState {
        let (view, gesture) = step(self.view, self.gesture, event);
        self.view = view;
        self.gesture = gesture;
        view
    }

    /// Recentres on the observer, keeping the zoom. Ignored mid-gesture so a
    /// late location fix does not yank the map out from under the pointer.
    pub fn center_on(&mut self, point: GeoPoint) -> bool {
        if self.gesture != Gesture::Idle {
            return false;
        }
        self.view = self.view.centered_on(point);
        true
    }

    pub fn map_request<I>(
        &self,
        config: &StaticMapConfig,
        places: I,
        observer: Option<GeoPoint>,
    ) -> Result<StaticMapRequest, ViewportError>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        build_static_map_request(config, places, &self.view, observer)
    }
}
