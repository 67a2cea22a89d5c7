//! ### English
//! Frame hand-off between the web engine's compositor (producer) and the host render thread
//! (consumer).
//!
//! The producer publishes exported images into a single-item [`FrameMailbox`]; the consumer
//! promotes them through [`FrameSlots`] so that at most two images are held at any time.
//!
//! ### 中文
//! web 引擎合成器（生产者）与宿主渲染线程（消费者）之间的帧交接。
//!
//! 生产者把导出的图像发布到单元素 [`FrameMailbox`]；消费者通过 [`FrameSlots`] 推进，
//! 保证任意时刻最多持有两张图像。
mod mailbox;
mod slots;

use std::ffi::c_void;
use std::ptr::NonNull;

use dpi::PhysicalSize;

pub use mailbox::FrameMailbox;
pub use slots::FrameSlots;

/// ### English
/// GL texture name. `0` means "no texture yet".
///
/// ### 中文
/// GL 纹理名。`0` 表示“尚无纹理”。
pub type TextureId = u32;

/// ### English
/// Opaque producer-owned handle to one exported frame (`struct wpe_fdo_egl_exported_image*`).
///
/// The backend holds it temporarily and must hand it back to the producer exactly once.
///
/// ### 中文
/// 生产者持有的单帧导出图像不透明句柄（`struct wpe_fdo_egl_exported_image*`）。
///
/// 后端只临时持有，且必须恰好归还给生产者一次。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExportedImage(NonNull<c_void>);

// The handle is only an address; every dereference happens inside the producer library.
unsafe impl Send for ExportedImage {}
unsafe impl Sync for ExportedImage {}

impl ExportedImage {
    pub fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    pub fn as_raw(self) -> *mut c_void {
        self.0.as_ptr()
    }

    #[cfg(test)]
    pub(crate) fn from_addr(addr: usize) -> Self {
        Self(NonNull::new(std::ptr::without_provenance_mut(addr)).expect("non-zero test handle"))
    }
}

/// ### English
/// `EGLImageKHR` backing an exported frame, valid while the frame is held.
///
/// ### 中文
/// 导出帧对应的 `EGLImageKHR`，在该帧被持有期间有效。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EglImage(pub *mut c_void);

/// ### English
/// Producer side of the frame exchange: the web engine's view backend.
///
/// All methods are called on the consumer thread.
///
/// ### 中文
/// 帧交换的生产者侧：web 引擎的 view backend。
///
/// 所有方法都在消费者线程上调用。
pub trait FrameProducer {
    fn egl_image(&self, image: ExportedImage) -> EglImage;

    fn dispatch_frame_complete(&mut self);

    fn release_exported_image(&mut self, image: ExportedImage);

    fn dispatch_set_size(&mut self, size: PhysicalSize<u32>);

    fn dispatch_device_scale_factor(&mut self, factor: f32);

    /// ### English
    /// Engine-side `struct wpe_view_backend*`, null for producers without one.
    ///
    /// ### 中文
    /// 引擎侧的 `struct wpe_view_backend*`；没有时为 null。
    fn native_handle(&self) -> *mut c_void {
        std::ptr::null_mut()
    }
}

/// ### English
/// Hook into the owning item: "a frame is staged, schedule a paint".
///
/// Called from the producer's thread.
///
/// ### 中文
/// 指向所属 item 的回调：“已有帧暂存，请安排一次绘制”。
///
/// 在生产者线程上调用。
pub trait RepaintRequest: Send + Sync {
    fn request_repaint(&self);
}
