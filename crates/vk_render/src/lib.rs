//! # vk_render
//!
//! A small Vulkan rendering library wrapping the explicit GPU object graph
//! (instance, device, swapchain, pipeline, framebuffers, command buffers,
//! synchronization objects) in RAII types.
//!
//! The interesting part lives in [`render::vulkan::VulkanRenderer`]: the
//! frame lifecycle that acquires a swapchain image, waits on the frame's
//! fence, records a command buffer, submits it with semaphore dependencies,
//! and presents — recreating the swapchain when it goes stale.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_render::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RendererConfig::new("Demo");
//!     let mut window = Window::new("Demo", 800, 600)?;
//!     let mut renderer = VulkanRenderer::new(&mut window, &config)?;
//!     while !window.should_close() {
//!         window.poll_events();
//!         let push = PushConstants::identity();
//!         if renderer.draw_frame(&push)? {
//!             renderer.recreate_swapchain(&window)?;
//!         }
//!     }
//!     renderer.wait_idle()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod foundation;
pub mod render;

pub use config::{AppConfig, Config, ConfigError, RendererConfig, ShaderConfig, WindowConfig};

/// Common imports for library users
pub mod prelude {
    pub use crate::config::{AppConfig, Config, RendererConfig, ShaderConfig, WindowConfig};
    pub use crate::foundation::{
        math::{Mat4, Vec3},
        time::Timer,
    };
    pub use crate::render::mesh::Vertex;
    pub use crate::render::vulkan::{
        PushConstants, VulkanError, VulkanRenderer, VulkanResult, Window, WindowError,
    };
}
