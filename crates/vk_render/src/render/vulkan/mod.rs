//! Vulkan rendering backend
//!
//! Low-level RAII wrappers around the Vulkan object graph plus the
//! renderer that drives the frame lifecycle.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod framebuffer;
pub mod render_pass;
pub mod renderer;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex_layout;
pub mod window;

pub use buffer::{Buffer, VertexBuffer};
pub use commands::{ActiveRenderPass, CommandPool, CommandRecorder};
pub use context::{
    LogicalDevice, PhysicalDeviceInfo, VulkanContext, VulkanError, VulkanInstance, VulkanResult,
};
pub use framebuffer::Framebuffer;
pub use render_pass::RenderPass;
pub use renderer::{PushConstants, VulkanRenderer};
pub use shader::{GraphicsPipeline, ShaderModule};
pub use swapchain::Swapchain;
pub use sync::{Fence, FrameSync, Semaphore};
pub use vertex_layout::VertexLayout;
pub use window::{Window, WindowError, WindowResult};
