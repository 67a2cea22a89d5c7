//! ### English
//! Notifications surfaced to the item's owner, and the load-status bookkeeping behind them.
//!
//! ### 中文
//! 向 item 所有者上报的通知，以及其背后的加载状态记录。

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Started,
    Succeeded,
    Stopped,
    Failed,
}

/// ### English
/// One load status change.
///
/// ### 中文
/// 一次加载状态变化。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: String,
    pub status: LoadStatus,
    /// ### English
    /// Engine error message for `Stopped`/`Failed`.
    ///
    /// ### 中文
    /// `Stopped`/`Failed` 时的引擎错误信息。
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    LoadingChanged(LoadRequest),
    WebProcessCrashed,
    /// ### English
    /// Input-method text to hand to the engine's input method context.
    ///
    /// ### 中文
    /// 需交给引擎输入法上下文的输入法文本。
    TextCommitted(String),
    FileSelectionRequested {
        multiple: bool,
        mime_types: Vec<String>,
    },
}

/// ### English
/// Turns raw engine load notifications into [`LoadRequest`]s.
///
/// A load that failed is not additionally reported as succeeded when the engine's "finished"
/// notification follows the failure.
///
/// ### 中文
/// 将引擎原始加载通知转换为 [`LoadRequest`]。
///
/// 加载失败后紧随的 “finished” 通知不会再额外报告为成功。
#[derive(Debug, Default)]
pub struct LoadTracker {
    error_occurred: bool,
}

impl LoadTracker {
    pub fn started(&mut self, url: &str) -> LoadRequest {
        LoadRequest {
            url: url.to_string(),
            status: LoadStatus::Started,
            error: None,
        }
    }

    pub fn finished(&mut self, url: &str) -> Option<LoadRequest> {
        let failed = std::mem::take(&mut self.error_occurred);
        (!failed).then(|| LoadRequest {
            url: url.to_string(),
            status: LoadStatus::Succeeded,
            error: None,
        })
    }

    pub fn failed(&mut self, failing_url: &str, cancelled: bool, message: &str) -> LoadRequest {
        self.error_occurred = true;
        LoadRequest {
            url: failing_url.to_string(),
            status: if cancelled {
                LoadStatus::Stopped
            } else {
                LoadStatus::Failed
            },
            error: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_load_reports_started_then_succeeded() {
        let mut tracker = LoadTracker::default();
        assert_eq!(tracker.started("https://wpewebkit.org/").status, LoadStatus::Started);
        let finished = tracker.finished("https://wpewebkit.org/").expect("succeeded");
        assert_eq!(finished.status, LoadStatus::Succeeded);
        assert_eq!(finished.error, None);
    }

    #[test]
    fn failure_suppresses_the_following_finish_once() {
        let mut tracker = LoadTracker::default();
        tracker.started("https://example.invalid/");
        let failed = tracker.failed("https://example.invalid/", false, "Cannot resolve host");
        assert_eq!(failed.status, LoadStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("Cannot resolve host"));

        assert_eq!(tracker.finished("https://example.invalid/"), None);
        assert_eq!(
            tracker.finished("https://example.org/").map(|r| r.status),
            Some(LoadStatus::Succeeded)
        );
    }

    #[test]
    fn cancelled_load_is_reported_as_stopped() {
        let mut tracker = LoadTracker::default();
        let stopped = tracker.failed("https://example.org/slow", true, "Load request cancelled");
        assert_eq!(stopped.status, LoadStatus::Stopped);
        assert_eq!(stopped.url, "https://example.org/slow");
    }
}
