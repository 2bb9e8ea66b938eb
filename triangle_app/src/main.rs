//! Rotating triangle demo
//!
//! Drives the renderer's frame lifecycle: poll window events, advance the
//! rotation, draw, and recreate the swapchain when it goes stale.

use glfw::{Action, Key, WindowEvent};
use vk_render::foundation::math::rotation_z;
use vk_render::prelude::*;

/// Quarter turn per second
const ROTATION_RADIANS_PER_SEC: f32 = std::f32::consts::FRAC_PI_2;

struct TriangleApp {
    window: Window,
    renderer: VulkanRenderer,
    timer: Timer,
    resized: bool,
}

impl TriangleApp {
    fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating window...");
        let mut window = Window::new(
            &config.window.title,
            config.window.width,
            config.window.height,
        )?;

        log::info!("Creating Vulkan renderer...");
        let renderer = VulkanRenderer::new(&mut window, &config.renderer)?;

        Ok(Self {
            window,
            renderer,
            timer: Timer::new(),
            resized: false,
        })
    }

    fn handle_events(&mut self) {
        for event in self.window.drain_events() {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
                    self.window.set_should_close(true);
                }
                WindowEvent::FramebufferSize(_, _) => {
                    self.resized = true;
                }
                _ => {}
            }
        }
    }

    fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        while !self.window.should_close() {
            self.window.poll_events();
            self.handle_events();

            // A minimized window has no framebuffer to present into
            let (width, height) = self.window.get_framebuffer_size();
            if width == 0 || height == 0 {
                self.window.wait_events();
                continue;
            }

            self.timer.update();
            let angle = self.timer.total_time() * ROTATION_RADIANS_PER_SEC;
            let push = PushConstants::from_matrix(&rotation_z(angle));

            let swapchain_stale = self.renderer.draw_frame(&push)?;
            if swapchain_stale || self.resized {
                self.resized = false;
                self.renderer.recreate_swapchain(&self.window)?;
            }

            if self.timer.frame_count() % 600 == 0 {
                let fps = self.timer.frame_count() as f32 / self.timer.total_time();
                log::debug!("{} frames, {:.1} fps average", self.timer.frame_count(), fps);
            }
        }

        // Let in-flight frames drain before RAII teardown
        self.renderer.wait_idle()?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default("triangle.toml")?;
    vk_render::foundation::logging::init(config.log_level());

    log::info!("Starting {}", config.renderer.application_name);
    let mut app = TriangleApp::new(&config)?;
    app.run()?;

    log::info!("Shutting down");
    Ok(())
}
