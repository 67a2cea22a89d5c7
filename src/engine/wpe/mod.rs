//! ### English
//! WPE WebKit producer side: libwpe/WPEBackend-fdo bindings and the exportable that hands out
//! rendered frames as EGL images.
//!
//! ### 中文
//! WPE WebKit 生产者侧：libwpe/WPEBackend-fdo 绑定，以及以 EGL 图像形式交出渲染帧的
//! exportable。
mod api;
mod exportable;

pub use api::WpeApi;
pub use exportable::FdoExportable;

pub const WPE_VIEW_ACTIVITY_STATE_VISIBLE: u32 = 1 << 0;
pub const WPE_VIEW_ACTIVITY_STATE_FOCUSED: u32 = 1 << 1;
pub const WPE_VIEW_ACTIVITY_STATE_IN_WINDOW: u32 = 1 << 2;
