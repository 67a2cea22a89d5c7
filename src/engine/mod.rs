/// ### English
/// Engine internal modules (frame hand-off, GPU blit, producer bindings, input translation and
/// the scene item driving them).
///
/// ### 中文
/// 引擎内部模块（帧交接、GPU blit、生产者绑定、输入转换，以及驱动它们的场景 item）。
pub mod backend;
pub mod config;
pub mod egl;
pub mod error;
pub mod flags;
pub mod frame;
pub mod input;
pub mod item;
pub(crate) mod loader;
pub mod rendering;
pub mod wpe;
