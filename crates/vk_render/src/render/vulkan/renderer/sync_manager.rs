//! Synchronization management for the frame lifecycle
//!
//! Owns the per-frame-slot fences and image-available semaphores plus the
//! per-image render-finished semaphores, and runs the acquire / submit /
//! present protocol against them.

use ash::vk;

use crate::render::vulkan::{FrameSync, Semaphore, VulkanContext, VulkanError, VulkanResult};

/// Bounded fence wait so a wedged queue surfaces as an error instead of a
/// hang
const FENCE_TIMEOUT_NS: u64 = 1_000_000_000;

/// Outcome of a swapchain image acquisition
pub enum ImageAcquire {
    /// An image was acquired; `suboptimal` means the swapchain still works
    /// but no longer matches the surface exactly
    Acquired {
        image_index: u32,
        suboptimal: bool,
    },
    /// The swapchain can no longer present; it must be recreated and the
    /// frame abandoned
    OutOfDate,
}

/// Manages synchronization objects and frame coordination
pub struct SyncManager {
    frame_syncs: Vec<FrameSync>,
    render_finished: Vec<Semaphore>,
}

impl SyncManager {
    /// Create sync objects: one `FrameSync` per frame slot, one
    /// render-finished semaphore per swapchain image.
    ///
    /// Presentation waits on the semaphore owned by the *image*; reusing a
    /// frame slot's semaphore could rearm it while a present targeting
    /// another image still waits on it.
    pub fn new(context: &VulkanContext, max_frames_in_flight: usize) -> VulkanResult<Self> {
        let frame_syncs = (0..max_frames_in_flight)
            .map(|_| FrameSync::new(context.raw_device()))
            .collect::<VulkanResult<Vec<_>>>()?;

        let render_finished = (0..context.swapchain().image_count())
            .map(|_| Semaphore::new(context.raw_device()))
            .collect::<VulkanResult<Vec<_>>>()?;

        Ok(Self {
            frame_syncs,
            render_finished,
        })
    }

    /// Wait until the GPU has finished the work last submitted from this
    /// frame slot.
    ///
    /// Fences are created signaled, so a slot that never submitted passes
    /// straight through.
    pub fn wait_for_frame_completion(&self, frame_index: usize) -> VulkanResult<()> {
        self.frame_syncs[frame_index].in_flight.wait(FENCE_TIMEOUT_NS)
    }

    /// Acquire the next swapchain image, signaling this frame slot's
    /// image-available semaphore once the image is ready to be written.
    pub fn acquire_next_image(
        &self,
        context: &VulkanContext,
        frame_index: usize,
    ) -> VulkanResult<ImageAcquire> {
        let acquire_semaphore = &self.frame_syncs[frame_index].image_available;

        let result = unsafe {
            context.swapchain_loader().acquire_next_image(
                context.swapchain().handle(),
                u64::MAX,
                acquire_semaphore.handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(ImageAcquire::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::warn!("Swapchain out of date during image acquisition");
                Ok(ImageAcquire::OutOfDate)
            }
            Err(e) => Err(VulkanError::Api(e)),
        }
    }

    /// Submit the command buffer and present the image.
    ///
    /// The submission waits on the frame's image-available semaphore at the
    /// color-attachment-output stage and signals the image's
    /// render-finished semaphore plus the frame's fence; presentation waits
    /// on render-finished. The fence is reset here, immediately before
    /// submission, so an earlier aborted frame leaves it signaled.
    ///
    /// Returns `true` when presentation reported the swapchain stale
    /// (out of date or suboptimal).
    pub fn submit_and_present(
        &self,
        context: &VulkanContext,
        command_buffer: vk::CommandBuffer,
        frame_index: usize,
        image_index: u32,
    ) -> VulkanResult<bool> {
        let frame_sync = &self.frame_syncs[frame_index];
        let render_finished = &self.render_finished[image_index as usize];

        frame_sync.in_flight.reset()?;

        let wait_semaphores = [frame_sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [render_finished.handle()];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            context
                .device()
                .device
                .queue_submit(
                    context.graphics_queue(),
                    &[submit_info.build()],
                    frame_sync.in_flight.handle(),
                )
                .map_err(VulkanError::Api)?;
        }

        let present_wait = [render_finished.handle()];
        let swapchains = [context.swapchain().handle()];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&present_wait)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let present_result = unsafe {
            context
                .swapchain_loader()
                .queue_present(context.present_queue(), &present_info)
        };

        match present_result {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                log::warn!("Swapchain out of date during presentation");
                Ok(true)
            }
            Err(e) => Err(VulkanError::Api(e)),
        }
    }

    /// Rebuild the per-image semaphores after swapchain recreation; the
    /// image count may have changed.
    pub fn recreate_image_semaphores(&mut self, context: &VulkanContext) -> VulkanResult<()> {
        self.render_finished = (0..context.swapchain().image_count())
            .map(|_| Semaphore::new(context.raw_device()))
            .collect::<VulkanResult<Vec<_>>>()?;
        Ok(())
    }

    /// Wait for the device to go idle
    pub fn wait_idle(&self, context: &VulkanContext) -> VulkanResult<()> {
        unsafe {
            context
                .device()
                .device
                .device_wait_idle()
                .map_err(VulkanError::Api)
        }
    }
}
