//! ### English
//! `#[repr(C)]` mirrors of libwpe's input event structs (`wpe/input.h`).
//!
//! ### 中文
//! libwpe 输入事件结构体（`wpe/input.h`）的 `#[repr(C)]` 镜像。

pub const WPE_INPUT_POINTER_EVENT_TYPE_NULL: u32 = 0;
pub const WPE_INPUT_POINTER_EVENT_TYPE_MOTION: u32 = 1;
pub const WPE_INPUT_POINTER_EVENT_TYPE_BUTTON: u32 = 2;

pub const WPE_INPUT_AXIS_EVENT_TYPE_NULL: u32 = 0;
pub const WPE_INPUT_AXIS_EVENT_TYPE_MOTION: u32 = 1;
pub const WPE_INPUT_AXIS_EVENT_TYPE_MOTION_SMOOTH: u32 = 2;
pub const WPE_INPUT_AXIS_EVENT_TYPE_MASK_2D: u32 = 1 << 16;

pub const WPE_INPUT_TOUCH_EVENT_TYPE_NULL: u32 = 0;
pub const WPE_INPUT_TOUCH_EVENT_TYPE_DOWN: u32 = 1;
pub const WPE_INPUT_TOUCH_EVENT_TYPE_MOTION: u32 = 2;
pub const WPE_INPUT_TOUCH_EVENT_TYPE_UP: u32 = 3;

pub const WPE_INPUT_KEYBOARD_MODIFIER_CONTROL: u32 = 1 << 0;
pub const WPE_INPUT_KEYBOARD_MODIFIER_SHIFT: u32 = 1 << 1;
pub const WPE_INPUT_KEYBOARD_MODIFIER_ALT: u32 = 1 << 2;
pub const WPE_INPUT_KEYBOARD_MODIFIER_META: u32 = 1 << 3;

pub const WPE_INPUT_POINTER_MODIFIER_BUTTON1: u32 = 1 << 20;
pub const WPE_INPUT_POINTER_MODIFIER_BUTTON2: u32 = 1 << 21;

pub const WPE_KEY_BACKSPACE: u32 = 0xff08;
pub const WPE_KEY_RETURN: u32 = 0xff0d;

/// ### English
/// `struct wpe_input_pointer_event`.
///
/// ### 中文
/// `struct wpe_input_pointer_event`。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WpeInputPointerEvent {
    pub r#type: u32,
    pub time: u32,
    pub x: i32,
    pub y: i32,
    pub button: u32,
    /// ### English
    /// `1` while a button is held, `0` otherwise.
    ///
    /// ### 中文
    /// 有按键按下时为 `1`，否则为 `0`。
    pub state: u32,
    pub modifiers: u32,
}

/// ### English
/// `struct wpe_input_axis_event`.
///
/// ### 中文
/// `struct wpe_input_axis_event`。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WpeInputAxisEvent {
    pub r#type: u32,
    pub time: u32,
    pub x: i32,
    pub y: i32,
    pub axis: u32,
    pub value: i32,
    pub modifiers: u32,
}

/// ### English
/// `struct wpe_input_axis_2d_event`; dispatched through a pointer to `base`, with
/// `WPE_INPUT_AXIS_EVENT_TYPE_MASK_2D` set in `base.type`.
///
/// ### 中文
/// `struct wpe_input_axis_2d_event`；通过指向 `base` 的指针派发，`base.type` 中需置位
/// `WPE_INPUT_AXIS_EVENT_TYPE_MASK_2D`。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WpeInputAxis2dEvent {
    pub base: WpeInputAxisEvent,
    pub x_axis: f64,
    pub y_axis: f64,
}

/// ### English
/// `struct wpe_input_keyboard_event`.
///
/// ### 中文
/// `struct wpe_input_keyboard_event`。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WpeInputKeyboardEvent {
    pub time: u32,
    /// ### English
    /// XKB keysym.
    ///
    /// ### 中文
    /// XKB keysym。
    pub key_code: u32,
    pub hardware_key_code: u32,
    pub pressed: bool,
    pub modifiers: u32,
}

/// ### English
/// `struct wpe_input_touch_event_raw`.
///
/// ### 中文
/// `struct wpe_input_touch_event_raw`。
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WpeInputTouchEventRaw {
    pub r#type: u32,
    pub time: u32,
    pub id: i32,
    pub x: i32,
    pub y: i32,
}

/// ### English
/// `struct wpe_input_touch_event`. Borrows its touch points; build it with
/// [`TouchBatch::as_wire`] right before dispatch.
///
/// ### 中文
/// `struct wpe_input_touch_event`。借用触摸点数组；应在派发前通过 [`TouchBatch::as_wire`] 构造。
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct WpeInputTouchEvent {
    pub touchpoints: *const WpeInputTouchEventRaw,
    pub touchpoints_length: u64,
    pub r#type: u32,
    pub id: i32,
    pub time: u32,
    pub modifiers: u32,
}

/// ### English
/// Owned touch batch: one raw record per host touch point, sharing a timestamp and modifiers.
///
/// ### 中文
/// 拥有所有权的触摸批次：每个宿主触摸点对应一条 raw 记录，共享时间戳与修饰键。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchBatch {
    pub points: Vec<WpeInputTouchEventRaw>,
    pub time: u32,
    pub modifiers: u32,
}

impl TouchBatch {
    /// ### English
    /// Wire event pointing into `self.points`; valid while `self` is alive and unmodified.
    ///
    /// ### 中文
    /// 指向 `self.points` 的线上事件；在 `self` 存活且未被修改期间有效。
    pub fn as_wire(&self) -> WpeInputTouchEvent {
        WpeInputTouchEvent {
            touchpoints: self.points.as_ptr(),
            touchpoints_length: self.points.len() as u64,
            r#type: WPE_INPUT_TOUCH_EVENT_TYPE_NULL,
            id: 0,
            time: self.time,
            modifiers: self.modifiers,
        }
    }
}
