//! ### English
//! Host toolkit input model, using Qt's numeric values so the C++ shim can forward event
//! fields without remapping.
//!
//! ### 中文
//! 宿主工具包的输入模型，使用 Qt 的数值定义，C++ 垫片可直接转发事件字段而无需重映射。

use dpi::LogicalPosition;

/// ### English
/// Mouse button (`Qt::MouseButton`).
///
/// ### 中文
/// 鼠标按键（`Qt::MouseButton`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u32),
}

impl PointerButton {
    pub fn from_qt(button: u32) -> Self {
        match button {
            0x01 => Self::Left,
            0x02 => Self::Right,
            0x04 => Self::Middle,
            0x08 => Self::Back,
            0x10 => Self::Forward,
            other => Self::Other(other),
        }
    }
}

bitflags::bitflags! {
    /// Keyboard modifier state (`Qt::KeyboardModifiers`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyboardModifiers: u32 {
        const SHIFT = 0x0200_0000;
        const CONTROL = 0x0400_0000;
        const ALT = 0x0800_0000;
        const META = 0x1000_0000;
        const KEYPAD = 0x2000_0000;
        const GROUP_SWITCH = 0x4000_0000;
    }
}

/// ### English
/// The few `Qt::Key` values with a keysym fallback.
///
/// ### 中文
/// 少数具有 keysym 回退映射的 `Qt::Key` 值。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKey {
    Backspace,
    Return,
    Enter,
    Other(i32),
}

impl HostKey {
    pub fn from_qt_code(key: i32) -> Self {
        match key {
            0x0100_0003 => Self::Backspace,
            0x0100_0004 => Self::Return,
            0x0100_0005 => Self::Enter,
            other => Self::Other(other),
        }
    }
}

/// ### English
/// One key press or release as reported by the host.
///
/// ### 中文
/// 宿主报告的一次按键按下或抬起。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostKeyEvent {
    pub timestamp: u64,
    pub key: HostKey,
    /// ### English
    /// Platform keysym (`QKeyEvent::nativeVirtualKey`), `0` when unknown.
    ///
    /// ### 中文
    /// 平台 keysym（`QKeyEvent::nativeVirtualKey`），未知时为 `0`。
    pub native_virtual_key: u32,
    pub native_scan_code: u32,
    pub modifiers: KeyboardModifiers,
    pub text: String,
}

/// ### English
/// Touch point phase (`Qt::TouchPointState`).
///
/// ### 中文
/// 触摸点阶段（`Qt::TouchPointState`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPointState {
    Pressed,
    Moved,
    Stationary,
    Released,
    Unknown,
}

impl TouchPointState {
    pub fn from_qt(state: u32) -> Self {
        match state {
            0x01 => Self::Pressed,
            0x02 => Self::Moved,
            0x04 => Self::Stationary,
            0x08 => Self::Released,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostTouchPoint {
    pub id: i32,
    pub position: LogicalPosition<f64>,
    pub state: TouchPointState,
}

/// ### English
/// Wheel rotation in eighths of a degree (`QWheelEvent::angleDelta`).
///
/// ### 中文
/// 滚轮转角，单位为 1/8 度（`QWheelEvent::angleDelta`）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AngleDelta {
    pub x: i32,
    pub y: i32,
}
