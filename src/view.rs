// view.rs — the panorama widget: image, scene, camera, input and observers

use crate::camera::{fov_height, Camera, Viewport, INITIAL_VERTICAL_FOV};
use crate::compass::{Compass, MovementHandler, Notifier};
use crate::controller::InteractionController;
use crate::image_source::PanoramaImage;
use crate::panorama::ProjectionType;
use crate::scene::{Scene, RADIUS};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_PAN_SPEED: Vec2 = Vec2::new(0.005, 0.005);

/// Anything drawn on top of the scene.
pub trait Overlay {
    fn show(&mut self, ctx: &egui::Context);
}

pub struct PanoramaView {
    /// Radians of rotation per pixel of drag.
    pub pan_speed: Vec2,
    /// Yaw restored whenever the projection type is (re)applied.
    pub start_angle: f32,

    image: Option<PanoramaImage>,
    projection: ProjectionType,
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    /// Tube height for the initial FOV. Not refreshed on zoom or resize.
    fov_height: f32,
    controller: InteractionController,
    notifier: Notifier,
    overlay: Option<Box<dyn Overlay>>,
}

impl PanoramaView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            pan_speed: DEFAULT_PAN_SPEED,
            start_angle: 0.0,
            image: None,
            projection: ProjectionType::default(),
            scene: Scene::default(),
            fov_height: fov_height(RADIUS, INITIAL_VERTICAL_FOV),
            camera: Camera::default(),
            viewport,
            controller: InteractionController::default(),
            notifier: Notifier::default(),
            overlay: None,
        }
    }

    pub fn image(&self) -> Option<&PanoramaImage> {
        self.image.as_ref()
    }

    pub fn projection(&self) -> ProjectionType {
        self.projection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom_level(&self) -> f64 {
        self.controller.zoom_state().level()
    }

    /// Horizontal field of view in degrees.
    pub fn horizontal_fov(&self) -> f32 {
        self.camera.horizontal_fov(self.viewport)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_compass(&mut self, compass: Option<&Rc<RefCell<dyn Compass>>>) {
        self.notifier.set_compass(compass);
    }

    pub fn set_movement_handler(&mut self, handler: Option<MovementHandler>) {
        self.notifier.set_movement_handler(handler);
    }

    /// Replaces the current overlay; the previous one is dropped.
    pub fn set_overlay(&mut self, overlay: Option<Box<dyn Overlay>>) {
        self.overlay = overlay;
    }

    pub fn overlay_mut(&mut self) -> Option<&mut (dyn Overlay + 'static)> {
        self.overlay.as_deref_mut()
    }

    /// Setting an image always re-applies the projection type, even when it does not change.
    pub fn set_image(&mut self, image: Option<PanoramaImage>) {
        self.image = image;
        let projection = ProjectionType::for_image(self.image.as_ref());
        if let Some(img) = &self.image {
            log::info!(
                "panorama {}x{} shown as {:?}",
                img.width(),
                img.height(),
                projection
            );
        }
        self.set_projection_type(projection);
    }

    pub fn set_projection_type(&mut self, projection: ProjectionType) {
        self.projection = projection;
        self.scene.rebuild_geometry(
            self.projection,
            self.image.as_ref(),
            self.fov_height,
            RADIUS,
        );
        self.reset_angles();
    }

    /// Back to `start_angle`, level horizon. Only the compass hears about it.
    pub fn reset_angles(&mut self) {
        self.camera.yaw = self.start_angle;
        self.camera.pitch = 0.0;
        let fov = self.horizontal_fov().to_radians();
        self.notifier.notify(self.start_angle, fov, false);
    }

    pub fn begin_drag(&mut self) {
        self.controller.begin_drag();
    }

    /// `translation` is cumulative since `begin_drag`, y pointing up.
    pub fn drag_changed(&mut self, translation: Vec2) {
        let applied = self.controller.drag_changed(
            translation,
            &mut self.camera,
            self.projection,
            self.pan_speed,
        );
        if applied {
            let fov = self.horizontal_fov().to_radians();
            self.notifier.notify(-self.camera.yaw, fov, true);
        }
    }

    pub fn end_drag(&mut self) {
        self.controller.end_drag();
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(
            self.controller.drag_state(),
            crate::controller::DragState::Idle
        )
    }

    pub fn scroll(&mut self, delta_y: f64) {
        self.controller.scroll(delta_y, &mut self.camera);
    }

    pub fn zoom(&mut self, scale: f64) {
        self.controller.zoom(scale, &mut self.camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PITCH_LIMIT;
    use image::RgbaImage;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(f32, f32)>,
    }

    impl Compass for Recorder {
        fn update_ui(&mut self, rotation_angle: f32, field_of_view_angle: f32) {
            self.calls.push((rotation_angle, field_of_view_angle));
        }
    }

    fn view() -> PanoramaView {
        PanoramaView::new(Viewport::new(1600.0, 800.0))
    }

    fn image(w: u32, h: u32) -> Option<PanoramaImage> {
        Some(PanoramaImage::from_rgba(RgbaImage::new(w, h)))
    }

    struct Observed {
        compass: Rc<RefCell<Recorder>>,
        handled: Rc<RefCell<Vec<(f32, f32)>>>,
    }

    fn observe(view: &mut PanoramaView) -> Observed {
        let compass = Rc::new(RefCell::new(Recorder::default()));
        let dyn_compass: Rc<RefCell<dyn Compass>> = compass.clone();
        view.set_compass(Some(&dyn_compass));
        // the view only keeps a weak reference; keep the strong one alive via `compass`
        drop(dyn_compass);

        let handled = Rc::new(RefCell::new(Vec::new()));
        let sink = handled.clone();
        view.set_movement_handler(Some(Box::new(move |r: f32, f: f32| {
            sink.borrow_mut().push((r, f))
        })));
        Observed { compass, handled }
    }

    #[test]
    fn test_initial_state() {
        let v = view();
        assert_eq!(v.projection(), ProjectionType::Cylindrical);
        assert!(v.scene().geometry().is_none());
        assert_eq!(v.camera().vertical_fov(), INITIAL_VERTICAL_FOV);
        assert_eq!(v.fov_height, fov_height(10.0, 80.0));
    }

    #[test]
    fn test_image_drives_projection_and_geometry() {
        let mut v = view();
        v.set_image(image(200, 100));
        assert_eq!(v.projection(), ProjectionType::Spherical);
        assert_eq!(
            v.scene().geometry().map(|g| g.projection),
            Some(ProjectionType::Spherical)
        );

        v.set_image(image(300, 100));
        assert_eq!(v.projection(), ProjectionType::Cylindrical);
        assert_eq!(
            v.scene().geometry().map(|g| g.projection),
            Some(ProjectionType::Cylindrical)
        );
        assert_eq!(v.scene().revision(), 2);
    }

    #[test]
    fn test_clearing_image_keeps_old_geometry() {
        let mut v = view();
        v.set_image(image(200, 100));
        v.set_image(None);
        assert_eq!(v.projection(), ProjectionType::Cylindrical);
        // no image: rebuild is a no-op
        assert_eq!(v.scene().revision(), 1);
    }

    #[test]
    fn test_reset_notifies_compass_only() {
        let mut v = view();
        v.start_angle = 0.75;
        let seen = observe(&mut v);

        v.set_image(image(200, 100));

        assert_eq!(v.camera().yaw, 0.75);
        assert_eq!(v.camera().pitch, 0.0);
        let compass = seen.compass.borrow();
        let calls = &compass.calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 0.75);
        assert!((calls[0].1 - 160.0f32.to_radians()).abs() < 1e-5);
        assert!(seen.handled.borrow().is_empty());
    }

    #[test]
    fn test_drag_notifies_both() {
        let mut v = view();
        v.set_image(image(200, 100));
        let seen = observe(&mut v);

        v.begin_drag();
        assert!(v.is_dragging());
        v.drag_changed(Vec2::new(100.0, 0.0));
        v.end_drag();
        assert!(!v.is_dragging());

        let yaw = 100.0 * 0.005;
        let compass = seen.compass.borrow();
        let compass_calls = &compass.calls;
        assert_eq!(compass_calls.len(), 1);
        assert!((compass_calls[0].0 + yaw).abs() < 1e-6);
        assert_eq!(*seen.handled.borrow(), *compass_calls);
    }

    #[test]
    fn test_drag_pitch_by_projection() {
        let mut v = view();
        v.set_image(image(300, 100));
        v.begin_drag();
        v.drag_changed(Vec2::new(0.0, 500.0));
        assert_eq!(v.camera().pitch, 0.0);
        v.end_drag();

        v.set_image(image(200, 100));
        v.begin_drag();
        v.drag_changed(Vec2::new(0.0, 500.0));
        assert_eq!(v.camera().pitch, PITCH_LIMIT);
        v.end_drag();
    }

    #[test]
    fn test_scroll_and_slider_zoom() {
        let mut v = view();
        v.scroll(1.0);
        assert!((v.zoom_level() - 1.1).abs() < 1e-12);
        assert!((v.camera().vertical_fov() - 80.0 / 1.1).abs() < 1e-3);

        v.zoom(2.5);
        assert!((v.camera().vertical_fov() - 32.0).abs() < 1e-4);
        // slider zoom does not move the wheel accumulator
        assert!((v.zoom_level() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_fov_height_is_not_refreshed() {
        let mut v = view();
        let before = v.fov_height;
        v.zoom(2.0);
        v.set_viewport(Viewport::new(400.0, 900.0));
        v.set_image(image(300, 100));
        assert_eq!(v.fov_height, before);
    }

    #[test]
    fn test_overlay_replaced() {
        struct Counting(Rc<RefCell<u32>>);
        impl Overlay for Counting {
            fn show(&mut self, _ctx: &egui::Context) {
                *self.0.borrow_mut() += 1;
            }
        }
        impl Drop for Counting {
            fn drop(&mut self) {
                *self.0.borrow_mut() += 100;
            }
        }

        let first = Rc::new(RefCell::new(0));
        let mut v = view();
        v.set_overlay(Some(Box::new(Counting(first.clone()))));
        v.set_overlay(None);
        assert_eq!(*first.borrow(), 100);
        assert!(v.overlay_mut().is_none());
    }
}
