//! ### English
//! GPU side of the frame exchange: a private EGL context shared with the host, and the blit
//! that copies an imported `EGLImage` into the persistent texture the host samples.
//!
//! ### 中文
//! 帧交换的 GPU 侧：与宿主共享的私有 EGL 上下文，以及把导入的 `EGLImage` 复制到宿主采样的
//! 持久纹理中的 blit。
mod blit;
mod compositor;
mod private_context;

use dpi::PhysicalSize;

use crate::engine::frame::{EglImage, TextureId};

pub use compositor::EglCompositor;

pub(crate) fn parse_gl_version(version: &str) -> (u32, u32) {
    // `"OpenGL ES 3.2 Mesa ..."` or `"4.6.0 ..."`
    let number_token = version
        .split_whitespace()
        .find(|t| t.chars().next().is_some_and(|c| c.is_ascii_digit()));
    let mut major = 0u32;
    let mut minor = 0u32;
    if let Some(token) = number_token {
        let mut parts = token.split('.');
        if let Some(m) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            major = m;
        }
        if let Some(n) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            minor = n;
        }
    }
    (major, minor)
}

/// ### English
/// GPU operations the frame exchange backend needs on the consumer thread.
///
/// Every call between [`FrameCompositor::bind`] and [`FrameCompositor::unbind`] runs with the
/// compositor's private context current.
///
/// ### 中文
/// 帧交换后端在消费者线程上需要的 GPU 操作。
///
/// [`FrameCompositor::bind`] 与 [`FrameCompositor::unbind`] 之间的调用都在合成器的私有上下文
/// 为 current 时执行。
pub trait FrameCompositor {
    /// ### English
    /// Whatever was bound before `bind`, handed back to `unbind`.
    ///
    /// ### 中文
    /// `bind` 之前的绑定，交还给 `unbind`。
    type Binding;

    /// ### English
    /// Whether the offscreen surface/context pair is usable.
    ///
    /// ### 中文
    /// 离屏 surface/context 是否可用。
    fn is_ready(&self) -> bool;

    /// ### English
    /// Makes the private context current. `None` means it could not be bound and nothing may
    /// be drawn; the caller's binding is untouched.
    ///
    /// ### 中文
    /// 使私有上下文成为 current。返回 `None` 表示无法绑定、不得进行任何绘制；调用方的绑定不受影响。
    fn bind(&mut self) -> Option<Self::Binding>;

    fn unbind(&mut self, saved: Self::Binding);

    fn create_texture(&mut self, size: PhysicalSize<u32>) -> TextureId;

    fn resize_texture(&mut self, texture: TextureId, size: PhysicalSize<u32>);

    /// ### English
    /// Draws `image` as a full-viewport quad into `texture` and waits until the copy is done.
    ///
    /// ### 中文
    /// 以铺满视口的四边形把 `image` 绘制进 `texture`，并等待复制完成。
    fn draw_image(&mut self, texture: TextureId, image: EglImage, viewport: PhysicalSize<u32>);
}

#[cfg(test)]
mod tests {
    use super::parse_gl_version;

    #[test]
    fn parses_gles_and_desktop_version_strings() {
        assert_eq!(parse_gl_version("OpenGL ES 3.2 Mesa 24.0.5"), (3, 2));
        assert_eq!(parse_gl_version("OpenGL ES 2.0 (ANGLE)"), (2, 0));
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 550.54"), (4, 6));
        assert_eq!(parse_gl_version("garbage"), (0, 0));
    }
}
