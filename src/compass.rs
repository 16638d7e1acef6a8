// compass.rs — viewing-direction observers and the pie-slice indicator

use std::cell::RefCell;
use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::{Rc, Weak};

/// Receives the current viewing direction.
///
/// `rotation_angle` is the heading in radians, `field_of_view_angle` the
/// horizontal field of view in radians.
pub trait Compass {
    fn update_ui(&mut self, rotation_angle: f32, field_of_view_angle: f32);
}

pub type MovementHandler = Box<dyn FnMut(f32, f32)>;

/// Fans out orientation changes to at most one compass and one movement handler.
///
/// The compass is held weakly: the embedding application owns it, and a
/// dropped compass is simply skipped.
#[derive(Default)]
pub struct Notifier {
    compass: Option<Weak<RefCell<dyn Compass>>>,
    movement_handler: Option<MovementHandler>,
}

impl Notifier {
    pub fn set_compass(&mut self, compass: Option<&Rc<RefCell<dyn Compass>>>) {
        self.compass = compass.map(Rc::downgrade);
    }

    pub fn set_movement_handler(&mut self, handler: Option<MovementHandler>) {
        self.movement_handler = handler;
    }

    pub fn notify(&mut self, rotation_angle: f32, field_of_view_angle: f32, call_handler: bool) {
        if let Some(compass) = self.compass.as_ref().and_then(Weak::upgrade) {
            match compass.try_borrow_mut() {
                Ok(mut c) => c.update_ui(rotation_angle, field_of_view_angle),
                Err(_) => log::warn!("compass is busy, dropping orientation update"),
            }
        }
        if call_handler {
            if let Some(handler) = self.movement_handler.as_mut() {
                handler(rotation_angle, field_of_view_angle);
            }
        }
    }
}

/// Round indicator showing the visible slice of the horizon.
#[derive(Debug, Clone)]
pub struct PieSliceCompass {
    pub slice_angle: f32,
    pub rotation: f32,
    pub slice_color: egui::Color32,
    pub outer_ring_color: egui::Color32,
    pub background_color: egui::Color32,
}

impl Default for PieSliceCompass {
    fn default() -> Self {
        Self {
            slice_angle: FRAC_PI_2,
            rotation: 0.0,
            slice_color: egui::Color32::RED,
            outer_ring_color: egui::Color32::GREEN,
            background_color: egui::Color32::BLACK,
        }
    }
}

const ARC_STEPS: usize = 48;

impl PieSliceCompass {
    /// Start and end angles of the wedge in screen space (y down), before clamping.
    pub fn wedge_angles(&self) -> (f32, f32) {
        let start = -(FRAC_PI_2 + self.slice_angle / 2.0) + self.rotation;
        (start, start + self.slice_angle)
    }

    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        for shape in self.shapes(rect) {
            painter.add(shape);
        }
    }

    /// Background disc, outer ring, then the wedge when there is room for it.
    pub fn shapes(&self, rect: egui::Rect) -> Vec<egui::Shape> {
        let center = rect.center();
        let outer = rect.width().min(rect.height()) / 2.0;

        let mut shapes = vec![
            egui::Shape::circle_filled(center, outer, self.background_color),
            egui::Shape::circle_stroke(
                center,
                outer - 2.0,
                egui::Stroke::new(2.0, self.outer_ring_color),
            ),
        ];

        let radius = outer - 6.0;
        if radius <= 0.0 {
            return shapes;
        }

        // A wider slice than a full turn would overdraw itself.
        let sweep = self.slice_angle.clamp(0.0, 2.0 * PI);
        let (start, _) = self.wedge_angles();
        let start = start + (self.slice_angle - sweep) / 2.0;

        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(center, self.slice_color);
        for i in 0..=ARC_STEPS {
            let a = start + sweep * (i as f32) / (ARC_STEPS as f32);
            let p = center + radius * egui::vec2(a.cos(), a.sin());
            mesh.colored_vertex(p, self.slice_color);
        }
        for i in 1..=ARC_STEPS as u32 {
            mesh.add_triangle(0, i, i + 1);
        }
        shapes.push(egui::Shape::mesh(mesh));
        shapes
    }
}

impl Compass for PieSliceCompass {
    fn update_ui(&mut self, rotation_angle: f32, field_of_view_angle: f32) {
        self.slice_angle = field_of_view_angle;
        self.rotation = rotation_angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(f32, f32)>,
    }

    impl Compass for Recorder {
        fn update_ui(&mut self, rotation_angle: f32, field_of_view_angle: f32) {
            self.calls.push((rotation_angle, field_of_view_angle));
        }
    }

    #[test]
    fn test_handler_only_called_when_requested() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let as_compass: Rc<RefCell<dyn Compass>> = recorder.clone();
        let handled = Rc::new(RefCell::new(Vec::<(f32, f32)>::new()));

        let mut notifier = Notifier::default();
        notifier.set_compass(Some(&as_compass));
        let sink = handled.clone();
        notifier.set_movement_handler(Some(Box::new(move |r: f32, f: f32| {
            sink.borrow_mut().push((r, f))
        })));

        notifier.notify(0.5, 1.2, false);
        notifier.notify(-0.25, 1.0, true);

        assert_eq!(recorder.borrow().calls, vec![(0.5, 1.2), (-0.25, 1.0)]);
        assert_eq!(*handled.borrow(), vec![(-0.25, 1.0)]);
    }

    #[test]
    fn test_dropped_compass_is_skipped() {
        let mut notifier = Notifier::default();
        {
            let compass: Rc<RefCell<dyn Compass>> = Rc::new(RefCell::new(Recorder::default()));
            notifier.set_compass(Some(&compass));
            assert!(notifier.compass.as_ref().and_then(Weak::upgrade).is_some());
        }
        assert!(notifier.compass.as_ref().and_then(Weak::upgrade).is_none());
        notifier.notify(1.0, 1.0, true);
    }

    #[test]
    fn test_replacing_compass() {
        let first = Rc::new(RefCell::new(Recorder::default()));
        let second = Rc::new(RefCell::new(Recorder::default()));
        let first_dyn: Rc<RefCell<dyn Compass>> = first.clone();
        let second_dyn: Rc<RefCell<dyn Compass>> = second.clone();

        let mut notifier = Notifier::default();
        notifier.set_compass(Some(&first_dyn));
        notifier.set_compass(Some(&second_dyn));
        notifier.notify(0.1, 0.2, false);

        assert!(first.borrow().calls.is_empty());
        assert_eq!(second.borrow().calls.len(), 1);

        notifier.set_compass(None);
        notifier.notify(0.1, 0.2, false);
        assert_eq!(second.borrow().calls.len(), 1);
    }

    #[test]
    fn test_pie_slice_tracks_updates() {
        let mut pie = PieSliceCompass::default();
        assert_eq!(pie.slice_angle, FRAC_PI_2);

        pie.update_ui(0.3, 1.4);
        assert_eq!(pie.rotation, 0.3);
        assert_eq!(pie.slice_angle, 1.4);

        // wedge is centred on "up" (-pi/2) plus the rotation
        let (start, end) = pie.wedge_angles();
        assert!(((start + end) / 2.0 - (-FRAC_PI_2 + 0.3)).abs() < 1e-6);
        assert!((end - start - 1.4).abs() < 1e-6);
    }

    fn square(side: f32) -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(side, side))
    }

    fn wedge(shapes: &[egui::Shape]) -> &egui::Mesh {
        match shapes.last() {
            Some(egui::Shape::Mesh(mesh)) => mesh,
            other => panic!("expected the wedge mesh last, got {other:?}"),
        }
    }

    #[test]
    fn test_shapes_disc_ring_and_wedge() {
        let pie = PieSliceCompass::default();
        let shapes = pie.shapes(square(72.0));
        assert_eq!(shapes.len(), 3);

        match (&shapes[0], &shapes[1]) {
            (egui::Shape::Circle(disc), egui::Shape::Circle(ring)) => {
                assert_eq!(disc.radius, 36.0);
                assert_eq!(disc.fill, egui::Color32::BLACK);
                assert_eq!(ring.radius, 34.0);
                assert_eq!(ring.stroke.color, egui::Color32::GREEN);
            }
            other => panic!("expected disc and ring, got {other:?}"),
        }

        let mesh = wedge(&shapes);
        assert_eq!(mesh.vertices.len(), ARC_STEPS + 2);
        assert_eq!(mesh.indices.len(), ARC_STEPS * 3);
        let center = square(72.0).center();
        for v in &mesh.vertices[1..] {
            assert!(((v.pos - center).length() - 30.0).abs() < 1e-3);
            assert_eq!(v.color, egui::Color32::RED);
        }
    }

    #[test]
    fn test_wedge_wider_than_full_turn_is_clamped() {
        let mut pie = PieSliceCompass::default();
        pie.update_ui(0.0, 10.0);
        let shapes = pie.shapes(square(72.0));
        let mesh = wedge(&shapes);

        // a full turn: the rim closes on itself
        let first = mesh.vertices[1].pos;
        let last = mesh.vertices[ARC_STEPS + 1].pos;
        assert!((first - last).length() < 1e-3);
    }

    #[test]
    fn test_tiny_rect_has_no_wedge() {
        let pie = PieSliceCompass::default();
        let shapes = pie.shapes(square(10.0));
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| matches!(s, egui::Shape::Circle(_))));
    }

    #[test]
    fn test_paint_emits_shapes_in_a_frame() {
        let ctx = egui::Context::default();
        let pie = PieSliceCompass::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            pie.paint(&painter, square(72.0));
        });
        assert!(output.shapes.len() >= 3);
    }
}
