//! ### English
//! Host input events → libwpe wire events.
//!
//! ### 中文
//! 宿主输入事件 → libwpe 线上事件。

use dpi::LogicalPosition;

use super::host::{
    AngleDelta, HostKey, HostKeyEvent, HostTouchPoint, KeyboardModifiers, PointerButton,
    TouchPointState,
};
use super::wire::{
    TouchBatch, WPE_INPUT_AXIS_EVENT_TYPE_MASK_2D, WPE_INPUT_AXIS_EVENT_TYPE_MOTION_SMOOTH,
    WPE_INPUT_KEYBOARD_MODIFIER_ALT, WPE_INPUT_KEYBOARD_MODIFIER_CONTROL,
    WPE_INPUT_KEYBOARD_MODIFIER_META, WPE_INPUT_KEYBOARD_MODIFIER_SHIFT,
    WPE_INPUT_POINTER_EVENT_TYPE_BUTTON, WPE_INPUT_POINTER_EVENT_TYPE_MOTION,
    WPE_INPUT_POINTER_MODIFIER_BUTTON1, WPE_INPUT_POINTER_MODIFIER_BUTTON2,
    WPE_INPUT_TOUCH_EVENT_TYPE_DOWN, WPE_INPUT_TOUCH_EVENT_TYPE_MOTION,
    WPE_INPUT_TOUCH_EVENT_TYPE_NULL, WPE_INPUT_TOUCH_EVENT_TYPE_UP, WPE_KEY_BACKSPACE,
    WPE_KEY_RETURN, WpeInputAxis2dEvent, WpeInputAxisEvent, WpeInputKeyboardEvent,
    WpeInputPointerEvent, WpeInputTouchEventRaw,
};

/// ### English
/// Angle delta units per reported wheel step.
///
/// ### 中文
/// 每个滚轮步进对应的 angle delta 单位数。
const WHEEL_DELTA_PER_STEP: f64 = 8.0;

/// ### English
/// Outcome of translating one key event.
///
/// ### 中文
/// 单个按键事件的转换结果。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyTranslation {
    /// ### English
    /// Dispatch as a keyboard event.
    ///
    /// ### 中文
    /// 作为键盘事件派发。
    Key(WpeInputKeyboardEvent),
    /// ### English
    /// Input-method composed text; hand it to the engine as committed text.
    ///
    /// ### 中文
    /// 输入法合成的文本；作为已提交文本交给引擎。
    Commit(String),
    /// ### English
    /// Release half of an IME commit; nothing to dispatch.
    ///
    /// ### 中文
    /// IME 提交对应的抬起事件；无需派发。
    Swallowed,
}

/// ### English
/// Per-view input translation state.
///
/// `hovering`, `pressed_button` and the modifier masks are only changed by hover-enter,
/// hover-leave, press, release and key handlers; motion events only read them.
///
/// ### 中文
/// 每个 view 的输入转换状态。
///
/// `hovering`、`pressed_button` 与修饰键掩码只由 hover-enter、hover-leave、按下、抬起与按键
/// 处理修改；移动事件只读取它们。
#[derive(Debug)]
pub struct InputTranslator {
    scale: f64,
    hovering: bool,
    pressed_button: u32,
    pointer_modifiers: u32,
    keyboard_modifiers: u32,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn button_code(button: PointerButton) -> (u32, u32) {
    match button {
        PointerButton::Left => (1, WPE_INPUT_POINTER_MODIFIER_BUTTON1),
        PointerButton::Right => (2, WPE_INPUT_POINTER_MODIFIER_BUTTON2),
        _ => (0, 0),
    }
}

fn keysym_fallback(key: HostKey) -> u32 {
    match key {
        HostKey::Backspace => WPE_KEY_BACKSPACE,
        HostKey::Return | HostKey::Enter => WPE_KEY_RETURN,
        HostKey::Other(_) => 0,
    }
}

fn keyboard_modifier_mask(modifiers: KeyboardModifiers) -> u32 {
    let mut mask = 0;
    if modifiers.contains(KeyboardModifiers::SHIFT) {
        mask |= WPE_INPUT_KEYBOARD_MODIFIER_SHIFT;
    }
    if modifiers.contains(KeyboardModifiers::CONTROL) {
        mask |= WPE_INPUT_KEYBOARD_MODIFIER_CONTROL;
    }
    if modifiers.contains(KeyboardModifiers::META) {
        mask |= WPE_INPUT_KEYBOARD_MODIFIER_META;
    }
    if modifiers.contains(KeyboardModifiers::ALT) {
        mask |= WPE_INPUT_KEYBOARD_MODIFIER_ALT;
    }
    mask
}

fn touch_type(state: TouchPointState) -> u32 {
    match state {
        TouchPointState::Pressed => WPE_INPUT_TOUCH_EVENT_TYPE_DOWN,
        TouchPointState::Moved => WPE_INPUT_TOUCH_EVENT_TYPE_MOTION,
        TouchPointState::Released => WPE_INPUT_TOUCH_EVENT_TYPE_UP,
        TouchPointState::Stationary | TouchPointState::Unknown => WPE_INPUT_TOUCH_EVENT_TYPE_NULL,
    }
}

impl InputTranslator {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            hovering: false,
            pressed_button: 0,
            pointer_modifiers: 0,
            keyboard_modifiers: 0,
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    #[cfg(test)]
    pub(crate) fn pressed_button(&self) -> u32 {
        self.pressed_button
    }

    /// ### English
    /// Modifier mask reported on pointer and touch events: last keyboard modifiers plus the
    /// held-button bits.
    ///
    /// ### 中文
    /// 指针与触摸事件上报的修饰键掩码：最近一次键盘修饰键加上按住按键的位。
    pub fn modifiers(&self) -> u32 {
        self.keyboard_modifiers | self.pointer_modifiers
    }

    #[inline]
    fn scaled(&self, position: LogicalPosition<f64>) -> (i32, i32) {
        (
            (position.x * self.scale) as i32,
            (position.y * self.scale) as i32,
        )
    }

    fn motion(&self, timestamp: u64, position: LogicalPosition<f64>) -> WpeInputPointerEvent {
        let (x, y) = self.scaled(position);
        WpeInputPointerEvent {
            r#type: WPE_INPUT_POINTER_EVENT_TYPE_MOTION,
            time: timestamp as u32,
            x,
            y,
            button: self.pressed_button,
            state: u32::from(self.pressed_button != 0),
            modifiers: self.modifiers(),
        }
    }

    pub fn hover_enter(&mut self) {
        self.hovering = true;
        self.pointer_modifiers = 0;
    }

    pub fn hover_leave(&mut self) {
        self.hovering = false;
    }

    /// ### English
    /// `None` outside a hover session (before any hover-enter, or after hover-leave).
    ///
    /// ### 中文
    /// 不在悬停会话中时（尚未 hover-enter 或已 hover-leave）返回 `None`。
    pub fn hover_move(
        &self,
        timestamp: u64,
        position: LogicalPosition<f64>,
    ) -> Option<WpeInputPointerEvent> {
        self.hovering.then(|| self.motion(timestamp, position))
    }

    pub fn mouse_move(&self, timestamp: u64, position: LogicalPosition<f64>) -> WpeInputPointerEvent {
        self.motion(timestamp, position)
    }

    /// ### English
    /// Left maps to button 1 (`button1` modifier), right to button 2 (`button2`); any other
    /// button is dispatched as button 0 without a modifier bit.
    ///
    /// ### 中文
    /// 左键映射为 1（`button1` 修饰位），右键为 2（`button2`）；其它按键以 0 派发且不带修饰位。
    pub fn mouse_press(
        &mut self,
        timestamp: u64,
        position: LogicalPosition<f64>,
        button: PointerButton,
    ) -> WpeInputPointerEvent {
        let (code, modifier) = button_code(button);
        self.pressed_button = code;
        self.pointer_modifiers |= modifier;

        let (x, y) = self.scaled(position);
        WpeInputPointerEvent {
            r#type: WPE_INPUT_POINTER_EVENT_TYPE_BUTTON,
            time: timestamp as u32,
            x,
            y,
            button: code,
            state: 1,
            modifiers: self.modifiers(),
        }
    }

    pub fn mouse_release(
        &mut self,
        timestamp: u64,
        position: LogicalPosition<f64>,
        button: PointerButton,
    ) -> WpeInputPointerEvent {
        let (code, modifier) = button_code(button);
        self.pressed_button = 0;
        self.pointer_modifiers &= !modifier;

        let (x, y) = self.scaled(position);
        WpeInputPointerEvent {
            r#type: WPE_INPUT_POINTER_EVENT_TYPE_BUTTON,
            time: timestamp as u32,
            x,
            y,
            button: code,
            state: 0,
            modifiers: self.modifiers(),
        }
    }

    /// ### English
    /// Reports only the axis with the larger magnitude delta; ties go to the vertical axis.
    ///
    /// ### 中文
    /// 只上报 delta 绝对值更大的轴；相等时取垂直轴。
    pub fn wheel(
        &self,
        timestamp: u64,
        position: LogicalPosition<f64>,
        delta: AngleDelta,
    ) -> WpeInputAxis2dEvent {
        let (x, y) = self.scaled(position);
        let (x_axis, y_axis) = if delta.x.unsigned_abs() > delta.y.unsigned_abs() {
            (f64::from(delta.x) / WHEEL_DELTA_PER_STEP, 0.0)
        } else {
            (0.0, f64::from(delta.y) / WHEEL_DELTA_PER_STEP)
        };

        WpeInputAxis2dEvent {
            base: WpeInputAxisEvent {
                r#type: WPE_INPUT_AXIS_EVENT_TYPE_MASK_2D | WPE_INPUT_AXIS_EVENT_TYPE_MOTION_SMOOTH,
                time: timestamp as u32,
                x,
                y,
                axis: 0,
                value: 0,
                modifiers: self.modifiers(),
            },
            x_axis,
            y_axis,
        }
    }

    /// ### English
    /// Translates a key event.
    ///
    /// An event with neither native key nor scan code but with text is input-method output:
    /// the press commits the text and the release is swallowed. Otherwise the keysym is the
    /// native key, else the Backspace/Return fallback. Modifiers come from the event, or from
    /// `global_modifiers` when the event reports none.
    ///
    /// ### 中文
    /// 转换按键事件。
    ///
    /// 既无原生键码也无扫描码但带文本的事件视为输入法输出：按下时提交文本，抬起时吞掉。
    /// 否则 keysym 取原生键码，缺失时使用 Backspace/Return 回退表。修饰键取自事件本身，
    /// 事件未报告时回退到 `global_modifiers`。
    pub fn key(
        &mut self,
        event: &HostKeyEvent,
        pressed: bool,
        global_modifiers: KeyboardModifiers,
    ) -> KeyTranslation {
        if event.native_virtual_key == 0 && event.native_scan_code == 0 && !event.text.is_empty() {
            return if pressed {
                KeyTranslation::Commit(event.text.clone())
            } else {
                KeyTranslation::Swallowed
            };
        }

        let key_code = match event.native_virtual_key {
            0 => keysym_fallback(event.key),
            native => native,
        };
        let modifiers = if event.modifiers.is_empty() {
            global_modifiers
        } else {
            event.modifiers
        };
        self.keyboard_modifiers = keyboard_modifier_mask(modifiers);

        KeyTranslation::Key(WpeInputKeyboardEvent {
            time: event.timestamp as u32,
            key_code,
            hardware_key_code: event.native_scan_code,
            pressed,
            modifiers: self.keyboard_modifiers,
        })
    }

    pub fn touch(&self, timestamp: u64, points: &[HostTouchPoint]) -> TouchBatch {
        let time = timestamp as u32;
        TouchBatch {
            points: points
                .iter()
                .map(|point| {
                    let (x, y) = self.scaled(point.position);
                    WpeInputTouchEventRaw {
                        r#type: touch_type(point.state),
                        time,
                        id: point.id,
                        x,
                        y,
                    }
                })
                .collect(),
            time,
            modifiers: self.modifiers(),
        }
    }
}
