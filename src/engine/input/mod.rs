//! ### English
//! Input translation from the host toolkit's event model into libwpe wire events.
//!
//! ### 中文
//! 将宿主工具包的事件模型转换为 libwpe 线上事件。
mod host;
mod translator;
pub mod wire;

pub use host::{
    AngleDelta, HostKey, HostKeyEvent, HostTouchPoint, KeyboardModifiers, PointerButton,
    TouchPointState,
};
pub use translator::{InputTranslator, KeyTranslation};
pub use wire::{
    TouchBatch, WpeInputAxis2dEvent, WpeInputKeyboardEvent, WpeInputPointerEvent,
};

/// ### English
/// Receiver of translated input: one dispatch per event (or per touch batch).
///
/// ### 中文
/// 已转换输入的接收方：每个事件（或每个触摸批次）派发一次。
pub trait InputSink {
    fn dispatch_pointer_event(&mut self, event: &WpeInputPointerEvent);

    fn dispatch_axis_event(&mut self, event: &WpeInputAxis2dEvent);

    fn dispatch_keyboard_event(&mut self, event: &WpeInputKeyboardEvent);

    fn dispatch_touch_event(&mut self, batch: &TouchBatch);
}
