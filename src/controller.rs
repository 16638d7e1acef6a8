// controller.rs — turns drag and scroll input into camera changes
//
// Nothing here fails: out-of-range input is clamped or dropped.

use crate::camera::Camera;
use crate::panorama::ProjectionType;
use glam::Vec2;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Applied vertical FOV must lie strictly inside this range (degrees).
pub const MIN_ZOOM_FOV: f64 = 20.0;
pub const MAX_ZOOM_FOV: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Cumulative translation seen at the previous move event.
        anchor: Vec2,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoomAccumulator {
    level: f64,
    base_fov: Option<f64>,
}

impl Default for ZoomAccumulator {
    fn default() -> Self {
        Self {
            level: MIN_ZOOM,
            base_fov: None,
        }
    }
}

impl ZoomAccumulator {
    pub fn level(&self) -> f64 {
        self.level
    }

    /// One wheel tick: step the level by 0.1 while inside `[1.0, 4.0]`, then re-derive the FOV.
    pub fn scroll(&mut self, delta_y: f64, camera: &mut Camera) -> bool {
        if delta_y > 0.0 && self.level >= MIN_ZOOM && self.level < MAX_ZOOM {
            self.level += ZOOM_STEP;
        }
        if delta_y < 0.0 && self.level > MIN_ZOOM && self.level <= MAX_ZOOM {
            self.level -= ZOOM_STEP;
        }
        self.level = (self.level * 100.0).round() / 100.0;
        self.zoom(self.level, camera)
    }

    /// `fov = base_fov / scale`, applied only inside the open FOV range.
    pub fn zoom(&mut self, scale: f64, camera: &mut Camera) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        let base = *self
            .base_fov
            .get_or_insert_with(|| camera.vertical_fov() as f64);

        let fov = base / scale;
        if fov > MIN_ZOOM_FOV && fov < MAX_ZOOM_FOV {
            camera.set_vertical_fov(fov as f32);
            true
        } else {
            log::trace!("zoom {scale:.2} -> fov {fov:.2} outside usable range, ignored");
            false
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    drag: DragState,
    zoom: ZoomAccumulator,
}

impl InteractionController {
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn zoom_state(&self) -> &ZoomAccumulator {
        &self.zoom
    }

    pub fn begin_drag(&mut self) {
        self.drag = DragState::Dragging { anchor: Vec2::ZERO };
    }

    /// `translation` is cumulative since the drag began, y pointing up.
    /// Returns false when no drag is in progress.
    pub fn drag_changed(
        &mut self,
        translation: Vec2,
        camera: &mut Camera,
        projection: ProjectionType,
        pan_speed: Vec2,
    ) -> bool {
        let DragState::Dragging { anchor } = self.drag else {
            return false;
        };

        let mut speed = pan_speed;
        if projection == ProjectionType::Cylindrical {
            // a tube has nothing above or below it
            speed.y = 0.0;
        }

        let delta = translation - anchor;
        camera.yaw += delta.x * speed.x;
        camera.set_pitch_clamped(camera.pitch + delta.y * speed.y);

        self.drag = DragState::Dragging {
            anchor: translation,
        };
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn scroll(&mut self, delta_y: f64, camera: &mut Camera) -> bool {
        self.zoom.scroll(delta_y, camera)
    }

    pub fn zoom(&mut self, scale: f64, camera: &mut Camera) -> bool {
        self.zoom.zoom(scale, camera)
    }
}
