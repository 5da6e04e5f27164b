//! Lighting scene demo
//!
//! Ten spinning textured containers, a skybox, a dim directional light,
//! three colored point lights with pulsing cube markers, and a flashlight
//! that follows the free-fly camera. WASD moves, the mouse looks, scroll
//! zooms, Escape quits. Scene content can be overridden with a `scene.ron`
//! next to the binary.

mod window;

use prism_engine::foundation::logging;
use prism_engine::foundation::math::utils;
use prism_engine::prelude::*;
use thiserror::Error;
use window::{Window, WindowError};

const CONFIG_PATH: &str = "scene.ron";

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Render(#[from] prism_engine::render::RenderError),
}

/// All mutable per-frame state, owned in one place instead of globals
struct AppContext {
    camera: FlyCamera,
    clock: FrameClock,
    lights: SceneLights,
    aspect: f32,
}

impl AppContext {
    fn new(config: &AppConfig) -> Self {
        let mut camera = FlyCamera::new(
            config.camera.position,
            config.camera.world_up,
            config.camera.yaw,
            config.camera.pitch,
        );
        camera.movement_speed = config.camera.movement_speed;
        camera.mouse_sensitivity = config.camera.mouse_sensitivity;

        Self {
            camera,
            clock: FrameClock::new(),
            lights: config.lights.clone(),
            aspect: config.window.aspect_ratio(),
        }
    }

    fn handle_event(&mut self, event: glfw::WindowEvent, window: &mut Window) {
        match event {
            glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => {
                window.set_should_close(true);
            }
            glfw::WindowEvent::CursorPos(x, y) => {
                self.camera.process_cursor(x as f32, y as f32);
            }
            glfw::WindowEvent::Scroll(_, dy) => {
                self.camera.process_scroll(dy as f32);
            }
            glfw::WindowEvent::FramebufferSize(w, h) if h > 0 => {
                self.aspect = w as f32 / h as f32;
            }
            _ => {}
        }
    }

    fn apply_held_keys(&mut self, window: &Window, dt: f32) {
        if window.key_held(glfw::Key::W) {
            self.camera.process_movement(CameraMovement::Forward, dt);
        }
        if window.key_held(glfw::Key::S) {
            self.camera.process_movement(CameraMovement::Backward, dt);
        }
        if window.key_held(glfw::Key::A) {
            self.camera.process_movement(CameraMovement::Left, dt);
        }
        if window.key_held(glfw::Key::D) {
            self.camera.process_movement(CameraMovement::Right, dt);
        }
    }

    /// Keep the flashlight on the camera
    fn update_spotlight(&mut self) {
        if let Some(spot) = self.lights.spot_lights.first_mut() {
            spot.position = self.camera.position;
            spot.direction = self.camera.front;
        }
    }
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = load_config()?;
    let mut window = Window::new(&config.window)?;
    let mut device = HeadlessDevice::new();

    // Container shader and its material
    let mut container_program =
        ShaderProgram::from_files("shaders/cube_vertex.vert", "shaders/container_fragment.frag")?;
    container_program.bind_texture_2d(
        &mut device,
        "material.diffuse",
        &config.scene.diffuse_texture,
        0,
    );
    container_program.bind_texture_2d(
        &mut device,
        "material.specular",
        &config.scene.specular_texture,
        1,
    );
    container_program.bind_cubemap(&mut device, "skybox", &config.scene.skybox_faces, 2);
    container_program.set_uniform("material.shininess", config.scene.shininess);
    container_program.set_uniform("material.alpha", 1.0f32);

    // Point-light marker shader
    let mut light_program =
        ShaderProgram::from_files("shaders/cube_vertex.vert", "shaders/light_fragment.frag")?;

    // Skybox shader
    let mut skybox_program =
        ShaderProgram::from_files("shaders/skybox_vertex.vert", "shaders/skybox_fragment.frag")?;
    skybox_program.bind_cubemap(&mut device, "skybox", &config.scene.skybox_faces, 0);

    // Meshes
    let mut container = Mesh::from_obj(&config.scene.container_model)?;
    let mut light_marker = Mesh::from_obj(&config.scene.container_model)?;
    let mut skybox = Mesh::from_obj(&config.scene.skybox_model)?;
    container.upload(&mut device)?;
    light_marker.upload(&mut device)?;
    skybox.upload(&mut device)?;
    log::info!(
        "scene loaded: {} container instances, {} triangles per container",
        config.scene.cube_positions.len(),
        container.index_count() / 3
    );

    let mut ctx = AppContext::new(&config);

    // Static lights go up once; the spotlight is re-applied each frame
    apply_dir_lights(&mut container_program, &ctx.lights.dir_lights);
    apply_point_lights(&mut container_program, &ctx.lights.point_lights);

    let rotation_axis = Vec3::new(1.0, 0.3, 0.5);

    while !window.should_close() {
        let dt = ctx.clock.tick();

        window.poll_events();
        let events: Vec<_> = window.flush_events().map(|(_, event)| event).collect();
        for event in events {
            ctx.handle_event(event, &mut window);
        }
        ctx.apply_held_keys(&window, dt);

        let t = ctx.clock.total_time();
        let view = ctx.camera.view_matrix();
        let projection = ctx.camera.projection_matrix(ctx.aspect);

        ctx.update_spotlight();
        apply_spot_lights(&mut container_program, &ctx.lights.spot_lights);

        container_program.set_uniform("view", view);
        container_program.set_uniform("projection", projection);
        container_program.set_uniform("viewPos", ctx.camera.position);

        for (i, position) in config.scene.cube_positions.iter().enumerate() {
            let angle = 20.0 * i as f32 + t * 15.0;
            let model = Transform::from_position_axis_angle(
                *position,
                rotation_axis,
                utils::deg_to_rad(angle),
            );
            container_program.set_uniform("model", model.to_matrix());
            container.draw(&mut device)?;
        }

        // Skybox uses the view matrix with its translation stripped so it
        // never moves relative to the camera
        skybox_program.set_uniform("view", strip_translation(&view));
        skybox_program.set_uniform("projection", projection);
        skybox.draw(&mut device)?;

        // Pulsing cube markers at the point lights
        light_program.set_uniform("view", view);
        light_program.set_uniform("projection", projection);
        let pulse = 0.3 + 0.1 * (t * 2.0).sin();
        for light in &ctx.lights.point_lights {
            let model = Transform::from_position_scale(light.position, pulse);
            light_program.set_uniform("model", model.to_matrix());
            light_program.set_uniform("lightColor", light.diffuse);
            light_marker.draw(&mut device)?;
        }

        if ctx.clock.frame_count() % 600 == 0 {
            log::debug!(
                "frame {}: {} draw calls so far, camera at {:?}",
                ctx.clock.frame_count(),
                device.draw_call_count(),
                ctx.camera.position
            );
        }
    }

    container.release(&mut device);
    light_marker.release(&mut device);
    skybox.release(&mut device);
    container_program.destroy();
    light_program.destroy();
    skybox_program.destroy();

    log::info!(
        "exiting after {} frames, {} draw calls",
        ctx.clock.frame_count(),
        device.draw_call_count()
    );
    Ok(())
}

/// Load `scene.ron` if present, else the built-in demo scene
fn load_config() -> Result<AppConfig, ConfigError> {
    match AppConfig::load(CONFIG_PATH) {
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no {CONFIG_PATH}, using the built-in demo scene");
            Ok(AppConfig::demo_scene())
        }
        other => other,
    }
}

/// Zero the translation column of a view matrix
fn strip_translation(view: &Mat4) -> Mat4 {
    let mut out = *view;
    out.m14 = 0.0;
    out.m24 = 0.0;
    out.m34 = 0.0;
    out
}
