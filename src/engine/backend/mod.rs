//! ### English
//! Frame exchange backend: owns the producer subscription, the GPU compositor and the slots
//! holding at most two in-flight frames.
//!
//! ### 中文
//! 帧交换后端：持有生产者订阅、GPU 合成器以及最多容纳两帧在途图像的槽位。
mod platform;

use std::ffi::c_void;
use std::sync::{Arc, Weak};

use dpi::{LogicalSize, PhysicalSize};

use crate::engine::error::BridgeResult;
use crate::engine::frame::{FrameMailbox, FrameProducer, FrameSlots, RepaintRequest, TextureId};
use crate::engine::input::InputSink;
use crate::engine::rendering::FrameCompositor;

pub use platform::{WpeBackendFactory, WpeFrameExchangeBackend, create_wpe_backend};

/// ### English
/// Host window resources needed to build a backend.
///
/// ### 中文
/// 构造后端所需的宿主窗口资源。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostWindow {
    /// ### English
    /// Host `EGLDisplay`.
    ///
    /// ### 中文
    /// 宿主 `EGLDisplay`。
    pub egl_display: *mut c_void,
    /// ### English
    /// Scene graph `EGLContext`; the private context shares objects with it.
    ///
    /// ### 中文
    /// 场景图的 `EGLContext`；私有上下文与其共享对象。
    pub egl_context: *mut c_void,
    pub device_pixel_ratio: f64,
    pub scene_graph_initialized: bool,
}

/// ### English
/// What the scene item needs from a backend. Object-safe so the item does not depend on the
/// platform types.
///
/// ### 中文
/// 场景 item 对后端的需求。保持对象安全，使 item 不依赖平台类型。
pub trait ViewBackend {
    /// ### English
    /// Called once per paint pass on the render thread; see
    /// [`FrameExchangeBackend::acquire_texture`].
    ///
    /// ### 中文
    /// 每次绘制在渲染线程上调用一次；见 [`FrameExchangeBackend::acquire_texture`]。
    fn acquire_texture(&mut self) -> TextureId;

    fn texture_size(&self) -> PhysicalSize<u32>;

    fn resize(&mut self, size: LogicalSize<f64>);

    fn set_scale_factor(&mut self, factor: f32);

    fn input(&mut self) -> &mut dyn InputSink;

    /// ### English
    /// Engine-side view backend handle (`struct wpe_view_backend*`) the host attaches its web
    /// view to; null when there is none.
    ///
    /// ### 中文
    /// 宿主用于挂接 web view 的引擎侧 view backend 句柄（`struct wpe_view_backend*`）；
    /// 没有时为 null。
    fn native_handle(&self) -> *mut c_void {
        std::ptr::null_mut()
    }
}

/// ### English
/// Builds backends once the host window is ready. A seam so the scene item can be driven with
/// a fake in tests.
///
/// ### 中文
/// 在宿主窗口就绪后构造后端。作为接缝，使测试中可以用假实现驱动场景 item。
pub trait BackendFactory {
    fn create(
        &self,
        size: LogicalSize<f64>,
        window: &HostWindow,
        repaint: Weak<dyn RepaintRequest>,
    ) -> BridgeResult<Box<dyn ViewBackend>>;
}

/// ### English
/// Rounded viewport for a logical item size; negative and NaN components become `0`.
///
/// ### 中文
/// 逻辑尺寸对应的取整视口；负数与 NaN 分量变为 `0`。
pub(crate) fn viewport_for(size: LogicalSize<f64>) -> PhysicalSize<u32> {
    PhysicalSize::new(
        size.width.round().max(0.0) as u32,
        size.height.round().max(0.0) as u32,
    )
}

/// ### English
/// Double-buffered frame exchange between a producer `P` and a GPU compositor `C`.
///
/// Field order is teardown order: held images are released in `Drop`, then the producer is
/// destroyed, then the compositor (GL objects, then the private context).
///
/// ### 中文
/// 生产者 `P` 与 GPU 合成器 `C` 之间的双缓冲帧交换。
///
/// 字段顺序即销毁顺序：`Drop` 中先释放持有的图像，然后销毁生产者，最后销毁合成器
/// （先 GL 对象，后私有上下文）。
pub struct FrameExchangeBackend<P, C>
where
    P: FrameProducer + InputSink,
    C: FrameCompositor,
{
    mailbox: Arc<FrameMailbox>,
    slots: FrameSlots,
    producer: P,
    compositor: C,
    viewport: PhysicalSize<u32>,
    scale: f32,
    /// ### English
    /// Persistent texture and the size its storage was allocated with.
    ///
    /// ### 中文
    /// 持久纹理及其存储分配时的尺寸。
    texture: Option<(TextureId, PhysicalSize<u32>)>,
}

impl<P, C> FrameExchangeBackend<P, C>
where
    P: FrameProducer + InputSink,
    C: FrameCompositor,
{
    /// ### English
    /// Assembles a backend from an already subscribed producer and a ready compositor.
    /// `mailbox` must be the one the producer's callback publishes into.
    ///
    /// ### 中文
    /// 由已订阅的生产者与已就绪的合成器组装后端。
    /// `mailbox` 必须是生产者回调所发布的那个。
    pub fn from_parts(
        mailbox: Arc<FrameMailbox>,
        producer: P,
        compositor: C,
        size: LogicalSize<f64>,
    ) -> Self {
        Self {
            mailbox,
            slots: FrameSlots::default(),
            producer,
            compositor,
            viewport: viewport_for(size),
            scale: 1.0,
            texture: None,
        }
    }

    pub fn mailbox(&self) -> &Arc<FrameMailbox> {
        &self.mailbox
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.viewport
    }

    #[cfg(test)]
    pub(crate) fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    fn texture_id(&self) -> TextureId {
        self.texture.map_or(0, |(texture, _)| texture)
    }

    fn ensure_texture(&mut self) -> TextureId {
        match self.texture {
            None => {
                let texture = self.compositor.create_texture(self.viewport);
                self.texture = Some((texture, self.viewport));
                texture
            }
            Some((texture, allocated)) if allocated != self.viewport => {
                self.compositor.resize_texture(texture, self.viewport);
                self.texture = Some((texture, self.viewport));
                log::debug!(
                    "resized persistent texture {texture} to {}x{}",
                    self.viewport.width,
                    self.viewport.height
                );
                texture
            }
            Some((texture, _)) => texture,
        }
    }

    /// ### English
    /// Consume step. With nothing staged, or the compositor not ready or not bindable, returns
    /// the current texture unchanged (`0` if none was ever created) and leaves any staged frame
    /// in place.
    ///
    /// Otherwise promotes the staged frame, copies it into the persistent texture under the
    /// private context, signals frame-complete, releases the superseded frame and restores
    /// the caller's binding.
    ///
    /// ### 中文
    /// 消费步骤。没有暂存帧、合成器未就绪或无法绑定时，原样返回当前纹理（从未创建过则为 `0`），
    /// 且保留已暂存的帧。
    ///
    /// 否则推进暂存帧，在私有上下文下把它复制进持久纹理，通知帧完成，释放被替换的帧，
    /// 并恢复调用方的绑定。
    pub fn acquire_texture(&mut self) -> TextureId {
        if !self.mailbox.is_staged() || !self.compositor.is_ready() {
            return self.texture_id();
        }
        let Some(saved) = self.compositor.bind() else {
            return self.texture_id();
        };
        let Some(image) = self.mailbox.take() else {
            self.compositor.unbind(saved);
            return self.texture_id();
        };
        if let Some(displaced) = self.slots.promote(image) {
            self.producer.release_exported_image(displaced);
        }

        let texture = self.ensure_texture();
        let egl_image = self.producer.egl_image(image);
        self.compositor.draw_image(texture, egl_image, self.viewport);
        self.producer.dispatch_frame_complete();
        if let Some(superseded) = self.slots.retire() {
            self.producer.release_exported_image(superseded);
        }
        self.compositor.unbind(saved);

        log::trace!("presented exported image {:p} in texture {texture}", image.as_raw());
        texture
    }

    /// ### English
    /// Ignored unless both dimensions are positive (NaN counts as invalid).
    ///
    /// ### 中文
    /// 仅当宽高均为正数时生效（NaN 视为无效）。
    pub fn resize(&mut self, size: LogicalSize<f64>) {
        if !(size.width > 0.0 && size.height > 0.0) {
            log::warn!("ignoring invalid resize to {}x{}", size.width, size.height);
            return;
        }
        self.viewport = viewport_for(size);
        self.producer.dispatch_set_size(self.viewport);
        log::debug!(
            "viewport resized to {}x{} (scale {})",
            self.viewport.width,
            self.viewport.height,
            self.scale
        );
    }

    pub fn set_scale_factor(&mut self, factor: f32) {
        self.scale = factor;
        self.producer.dispatch_device_scale_factor(factor);
    }
}

impl<P, C> ViewBackend for FrameExchangeBackend<P, C>
where
    P: FrameProducer + InputSink,
    C: FrameCompositor,
{
    fn acquire_texture(&mut self) -> TextureId {
        FrameExchangeBackend::acquire_texture(self)
    }

    fn texture_size(&self) -> PhysicalSize<u32> {
        self.viewport
    }

    fn resize(&mut self, size: LogicalSize<f64>) {
        FrameExchangeBackend::resize(self, size)
    }

    fn set_scale_factor(&mut self, factor: f32) {
        FrameExchangeBackend::set_scale_factor(self, factor)
    }

    fn input(&mut self) -> &mut dyn InputSink {
        &mut self.producer
    }

    fn native_handle(&self) -> *mut c_void {
        self.producer.native_handle()
    }
}

impl<P, C> Drop for FrameExchangeBackend<P, C>
where
    P: FrameProducer + InputSink,
    C: FrameCompositor,
{
    fn drop(&mut self) {
        if let Some(staged) = self.mailbox.take() {
            self.producer.release_exported_image(staged);
        }
        for image in self.slots.drain() {
            self.producer.release_exported_image(image);
        }
        log::debug!("frame exchange backend released all held images");
    }
}

#[cfg(test)]
mod tests;
