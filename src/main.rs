// main.rs — desktop host for the panorama view: window, input, menus, status bar

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod camera;
mod compass;
mod config;
mod controller;
mod fonts;
mod i18n;
mod image_source;
mod mesh;
mod panorama;
mod renderer;
mod scene;
mod view;

use compass::{Compass, PieSliceCompass};
use config::ViewerConfig;
use glam::Vec2;
use image_source::{LoadError, PanoramaImage};
use renderer::Renderer;
use view::{Overlay, PanoramaView};

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tif"];
const COMPASS_SIZE: f32 = 72.0;

type LoadResult = Result<PanoramaImage, LoadError>;

/// Draws the shared pie-slice compass in the top-right corner.
struct CompassOverlay {
    compass: Rc<RefCell<PieSliceCompass>>,
}

impl Overlay for CompassOverlay {
    fn show(&mut self, ctx: &egui::Context) {
        let compass = self.compass.borrow();
        egui::Area::new(egui::Id::new("compass_overlay"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 40.0))
            .interactable(false)
            .show(ctx, |ui| {
                let (rect, _) = ui.allocate_exact_size(
                    egui::vec2(COMPASS_SIZE, COMPASS_SIZE),
                    egui::Sense::hover(),
                );
                compass.paint(ui.painter(), rect);
            });
    }
}

/// Host-side UI state that is not part of the panorama view itself.
struct UiState {
    lang: String,
    /// Background loads started but not yet reported back.
    pending_loads: usize,
    is_fullscreen: bool,
    show_compass: bool,
    slider_zoom: f64,
    last_error: Option<String>,
}

impl UiState {
    fn start_load(&mut self, path: PathBuf, tx: &Sender<LoadResult>) {
        self.pending_loads += 1;
        image_source::load_in_background(path, tx.clone());
    }

    fn finish_load(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }

    fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }
}

/// Pointer travel since `origin` in logical points, y pointing up.
fn drag_translation(
    origin: PhysicalPosition<f64>,
    position: PhysicalPosition<f64>,
    scale_factor: f64,
) -> Vec2 {
    let origin = origin.to_logical::<f64>(scale_factor);
    let position = position.to_logical::<f64>(scale_factor);
    Vec2::new(
        (position.x - origin.x) as f32,
        (origin.y - position.y) as f32,
    )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ViewerConfig::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    i18n::init(&config.lang);

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(i18n::tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
    {
        Ok(w) => w,
        Err(e) => {
            log::error!("failed to create window: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = match pollster::block_on(Renderer::new(&window)) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let mut view = PanoramaView::new(renderer.viewport());
    view.pan_speed = Vec2::from_array(config.pan_speed);
    view.start_angle = config.start_angle;

    let compass = Rc::new(RefCell::new(PieSliceCompass::default()));
    let compass_dyn: Rc<RefCell<dyn Compass>> = compass.clone();
    view.set_compass(Some(&compass_dyn));
    view.set_movement_handler(Some(Box::new(|rotation: f32, fov: f32| {
        log::debug!(
            "heading {:.1}°, horizontal fov {:.1}°",
            rotation.to_degrees(),
            fov.to_degrees()
        );
    })));
    if config.show_compass {
        view.set_overlay(Some(Box::new(CompassOverlay {
            compass: compass.clone(),
        })));
    }

    let mut ui = UiState {
        lang: config.lang.clone(),
        pending_loads: 0,
        is_fullscreen: false,
        show_compass: config.show_compass,
        slider_zoom: 1.0,
        last_error: None,
    };

    // decoded images come back from worker threads
    let (tx, rx): (Sender<LoadResult>, Receiver<LoadResult>) = channel();
    if let Some(path) = config.image.clone() {
        ui.start_load(path, &tx);
    }

    let mut mouse_pressed = false;
    let mut cursor: PhysicalPosition<f64> = PhysicalPosition::new(0.0, 0.0);
    let mut press_origin: PhysicalPosition<f64> = cursor;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Ok(result) = rx.try_recv() {
            ui.finish_load();
            match result {
                Ok(img) => {
                    ui.last_error = None;
                    view.set_image(Some(img));
                }
                Err(e) => {
                    log::error!("{e}");
                    ui.last_error = Some(i18n::tr_with("status.load_failed", &[("err", e.to_string())]));
                }
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    // a drag may end over a panel
                    if let WindowEvent::MouseInput {
                        state: ElementState::Released,
                        button: MouseButton::Left,
                        ..
                    } = event
                    {
                        mouse_pressed = false;
                        view.end_drag();
                    }
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        view.set_viewport(renderer.viewport());
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        view.set_viewport(renderer.viewport());
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_image() {
                                        ui.start_load(path, &tx);
                                    }
                                }
                                Some(VirtualKeyCode::F11) => {
                                    toggle_fullscreen(&window, &mut ui);
                                }
                                Some(VirtualKeyCode::R) => view.reset_angles(),
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            let pressed = state == ElementState::Pressed;
                            if pressed && !mouse_pressed {
                                press_origin = cursor;
                                view.begin_drag();
                            } else if !pressed && mouse_pressed {
                                view.end_drag();
                            }
                            mouse_pressed = pressed;
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        cursor = position;
                        if mouse_pressed && view.is_dragging() {
                            view.drag_changed(drag_translation(
                                press_origin,
                                position,
                                window.scale_factor(),
                            ));
                        }
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y as f64,
                            MouseScrollDelta::PixelDelta(pos) => pos.y / 20.0,
                        };
                        view.scroll(scroll);
                    }

                    WindowEvent::DroppedFile(path) => {
                        ui.start_load(path, &tx);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                renderer.sync_scene(view.scene());
                renderer.update_camera(view.camera(), view.viewport());

                let mut next_image = None;
                let mut compass_toggled = false;
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    if let Some(overlay) = view.overlay_mut() {
                        overlay.show(ctx);
                    }
                    draw_ui(ctx, &mut view, &mut ui, &window, &mut next_image, &mut compass_toggled);
                });

                if compass_toggled {
                    let overlay: Option<Box<dyn Overlay>> = if ui.show_compass {
                        Some(Box::new(CompassOverlay {
                            compass: compass.clone(),
                        }))
                    } else {
                        None
                    };
                    view.set_overlay(overlay);
                }

                if let Some(path) = next_image {
                    ui.start_load(path, &tx);
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::warn!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.images"), &IMAGE_EXTENSIONS)
        .pick_file()
}

fn toggle_fullscreen(window: &Window, ui: &mut UiState) {
    ui.is_fullscreen = !ui.is_fullscreen;
    if ui.is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn draw_ui(
    ctx: &egui::Context,
    view: &mut PanoramaView,
    ui_state: &mut UiState,
    window: &Window,
    next_image: &mut Option<PathBuf>,
    compass_toggled: &mut bool,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    *next_image = pick_image();
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                if ui.button(i18n::tr("view.reset")).clicked() {
                    view.reset_angles();
                    ui.close_menu();
                }

                let fullscreen_label = if ui_state.is_fullscreen {
                    i18n::tr("view.fullscreen.exit")
                } else {
                    i18n::tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    toggle_fullscreen(window, ui_state);
                    ui.close_menu();
                }

                ui.separator();
                let slider = egui::Slider::new(&mut ui_state.slider_zoom, 1.0..=4.0)
                    .step_by(0.1)
                    .text(i18n::tr("view.zoom"));
                if ui.add(slider).changed() {
                    view.zoom(ui_state.slider_zoom);
                }

                if ui
                    .checkbox(&mut ui_state.show_compass, i18n::tr("view.show_compass"))
                    .changed()
                {
                    *compass_toggled = true;
                }
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui
                        .radio_value(&mut ui_state.lang, code.to_string(), name)
                        .clicked()
                    {
                        i18n::init(&ui_state.lang);
                        window.set_title(&i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui_state.is_loading() {
                ui.label(
                    egui::RichText::new(i18n::tr("status.loading_image"))
                        .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }
            if let Some(err) = &ui_state.last_error {
                ui.label(egui::RichText::new(err).color(egui::Color32::LIGHT_RED));
                ui.label("|");
            }

            if view.image().is_none() {
                ui.label(i18n::tr("status.no_image"));
                return;
            }

            let camera = view.camera();
            ui.label(format!(
                "{} {}",
                i18n::tr("status.mode_prefix"),
                i18n::tr(view.projection().i18n_key())
            ));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("status.vfov"), camera.vertical_fov()));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("status.hfov"), view.horizontal_fov()));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("status.yaw"), camera.yaw.to_degrees()));
            ui.label("|");
            ui.label(format!("{}: {:.1}°", i18n::tr("status.pitch"), camera.pitch.to_degrees()));
            ui.label("|");
            ui.label(format!("{}: {:.1}x", i18n::tr("status.zoom"), view.zoom_level()));
        });
    });
}
