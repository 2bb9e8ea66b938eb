//! Vulkan renderer
//!
//! Owns the full object graph (context, render pass, pipeline,
//! framebuffers, vertex buffer, command buffers, sync objects) and drives
//! the frame lifecycle:
//!
//! 1. acquire a swapchain image, signaling the frame's image-available
//!    semaphore;
//! 2. wait on the frame slot's in-flight fence before reusing its command
//!    buffer;
//! 3. record the frame's commands;
//! 4. submit, waiting on image-available at color-attachment output and
//!    signaling the image's render-finished semaphore and the fence;
//! 5. present, waiting on render-finished;
//! 6. advance to the next frame slot.
//!
//! An out-of-date swapchain aborts the frame; suboptimal acquisition still
//! renders. Either way `draw_frame` reports the swapchain stale and the
//! caller recreates it before the next frame.

pub mod sync_manager;

pub use sync_manager::{ImageAcquire, SyncManager};

use ash::vk;
use bytemuck::{Pod, Zeroable};

use crate::config::RendererConfig;
use crate::foundation::math::{self, Mat4};
use crate::render::mesh;
use crate::render::vulkan::{
    CommandRecorder, CommandPool, Framebuffer, GraphicsPipeline, RenderPass, ShaderModule,
    VertexBuffer, VulkanContext, VulkanError, VulkanResult, Window,
};

/// Push-constant block handed to the vertex shader each frame
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PushConstants {
    /// Column-major transform applied to every vertex
    pub transform: [[f32; 4]; 4],
}

impl PushConstants {
    /// Identity transform
    pub fn identity() -> Self {
        Self::from_matrix(&Mat4::identity())
    }

    /// Build the block from a matrix
    pub fn from_matrix(m: &Mat4) -> Self {
        Self {
            transform: math::mat4_to_push(m),
        }
    }
}

/// Advance to the next frame slot, wrapping at the in-flight limit
fn next_frame_slot(current: usize, max_frames_in_flight: usize) -> usize {
    (current + 1) % max_frames_in_flight
}

/// Vulkan renderer driving the frame lifecycle
pub struct VulkanRenderer {
    render_pass: RenderPass,
    pipeline: GraphicsPipeline,
    framebuffers: Vec<Framebuffer>,
    vertex_buffer: VertexBuffer,
    command_buffers: Vec<vk::CommandBuffer>,
    command_pool: CommandPool,
    sync_manager: SyncManager,

    current_frame: usize,
    max_frames_in_flight: usize,

    // Declared last: the context owns the device every wrapper above
    // destroys its handles against, so it must drop after all of them.
    context: VulkanContext,
}

impl VulkanRenderer {
    /// Create the renderer and the whole GPU object graph for the window
    pub fn new(window: &mut Window, config: &RendererConfig) -> VulkanResult<Self> {
        config
            .validate()
            .map_err(|e| VulkanError::InitializationFailed(e.to_string()))?;

        let context = VulkanContext::new(window, config)?;
        let device = context.raw_device();

        let render_pass =
            RenderPass::new_color_pass(device.clone(), context.swapchain().format().format)?;

        let vertex_shader =
            ShaderModule::from_file(device.clone(), &config.shaders.vertex_shader_path)?;
        let fragment_shader =
            ShaderModule::from_file(device.clone(), &config.shaders.fragment_shader_path)?;
        let pipeline = GraphicsPipeline::new(
            device.clone(),
            render_pass.handle(),
            &vertex_shader,
            &fragment_shader,
        )?;

        let framebuffers = create_framebuffers(&context, &render_pass)?;

        let vertex_buffer = VertexBuffer::new(
            device.clone(),
            context.instance(),
            context.physical_device().device,
            &mesh::triangle_vertices(),
        )?;

        let command_pool = CommandPool::new(device, context.graphics_queue_family())?;
        let command_buffers =
            command_pool.allocate_command_buffers(config.max_frames_in_flight as u32)?;

        let sync_manager = SyncManager::new(&context, config.max_frames_in_flight)?;

        log::info!(
            "Renderer ready: {} swapchain images, {} frames in flight",
            context.swapchain().image_count(),
            config.max_frames_in_flight
        );

        Ok(Self {
            render_pass,
            pipeline,
            framebuffers,
            vertex_buffer,
            command_buffers,
            command_pool,
            sync_manager,
            current_frame: 0,
            max_frames_in_flight: config.max_frames_in_flight,
            context,
        })
    }

    /// Render and present one frame.
    ///
    /// Returns `true` when the swapchain went stale (window resized, surface
    /// out of date or suboptimal) and [`recreate_swapchain`] must run before
    /// the next frame.
    ///
    /// [`recreate_swapchain`]: Self::recreate_swapchain
    pub fn draw_frame(&mut self, push: &PushConstants) -> VulkanResult<bool> {
        let (image_index, suboptimal) =
            match self.sync_manager.acquire_next_image(&self.context, self.current_frame)? {
                ImageAcquire::Acquired {
                    image_index,
                    suboptimal,
                } => (image_index, suboptimal),
                // Nothing was acquired; the fence was not reset, so the
                // slot stays consistent for the retry after recreation
                ImageAcquire::OutOfDate => return Ok(true),
            };

        self.sync_manager.wait_for_frame_completion(self.current_frame)?;

        let command_buffer = self.record_frame(image_index, push)?;

        let present_stale = self.sync_manager.submit_and_present(
            &self.context,
            command_buffer,
            self.current_frame,
            image_index,
        )?;

        self.current_frame = next_frame_slot(self.current_frame, self.max_frames_in_flight);

        Ok(present_stale || suboptimal)
    }

    /// Record the current frame slot's command buffer for the acquired image
    fn record_frame(
        &self,
        image_index: u32,
        push: &PushConstants,
    ) -> VulkanResult<vk::CommandBuffer> {
        let extent = self.context.swapchain().extent();
        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [0.0, 0.0, 0.0, 1.0],
            },
        }];

        let mut recorder = CommandRecorder::new(
            self.command_buffers[self.current_frame],
            self.context.raw_device(),
        );
        recorder.begin()?;

        {
            let mut pass = recorder.begin_render_pass(
                self.render_pass.handle(),
                self.framebuffers[image_index as usize].handle(),
                render_area,
                &clear_values,
            )?;

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            pass.set_viewport(&viewport);
            pass.set_scissor(&render_area);

            pass.bind_pipeline(self.pipeline.handle());
            pass.bind_vertex_buffers(&[self.vertex_buffer.handle()], &[0]);
            pass.push_constants(
                self.pipeline.layout(),
                vk::ShaderStageFlags::VERTEX,
                bytemuck::bytes_of(push),
            );
            pass.draw(self.vertex_buffer.vertex_count(), 1);
        }

        recorder.end()
    }

    /// Recreate the swapchain and everything derived from it.
    ///
    /// Waits for the device to go idle first. A zero-area framebuffer
    /// (minimized window) is skipped; the caller keeps waiting for events
    /// until the window has area again.
    pub fn recreate_swapchain(&mut self, window: &Window) -> VulkanResult<()> {
        let (width, height) = window.get_framebuffer_size();
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.context.recreate_swapchain(window)?;
        self.framebuffers = create_framebuffers(&self.context, &self.render_pass)?;
        self.sync_manager.recreate_image_semaphores(&self.context)?;

        Ok(())
    }

    /// Current swapchain extent
    pub fn swapchain_extent(&self) -> (u32, u32) {
        let extent = self.context.swapchain().extent();
        (extent.width, extent.height)
    }

    /// Wait for the device to finish all in-flight work.
    ///
    /// Call before dropping the renderer so RAII teardown never races the
    /// GPU.
    pub fn wait_idle(&self) -> VulkanResult<()> {
        self.sync_manager.wait_idle(&self.context)
    }
}

/// One framebuffer per swapchain image view
fn create_framebuffers(
    context: &VulkanContext,
    render_pass: &RenderPass,
) -> VulkanResult<Vec<Framebuffer>> {
    context
        .swapchain()
        .image_views()
        .iter()
        .map(|&image_view| {
            Framebuffer::new(
                context.raw_device(),
                render_pass.handle(),
                &[image_view],
                context.swapchain().extent(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_constants_match_shader_block_size() {
        assert_eq!(
            std::mem::size_of::<PushConstants>() as u32,
            crate::render::vulkan::shader::PUSH_CONSTANT_SIZE
        );
    }

    #[test]
    fn test_identity_push_constants() {
        let push = PushConstants::identity();
        for (c, column) in push.transform.iter().enumerate() {
            for (r, &value) in column.iter().enumerate() {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_eq!(value, expected);
            }
        }
    }

    #[test]
    fn test_frame_slots_cycle_through_in_flight_limit() {
        let mut frame = 0;
        let observed: Vec<usize> = (0..5)
            .map(|_| {
                let current = frame;
                frame = next_frame_slot(frame, 2);
                current
            })
            .collect();

        assert_eq!(observed, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_single_frame_in_flight_never_advances() {
        assert_eq!(next_frame_slot(0, 1), 0);
    }
}
