//! ### English
//! Relay for the engine's "choose files" requests.
//!
//! ### 中文
//! 引擎 “选择文件” 请求的中转。

use std::path::PathBuf;

use url::Url;

use super::events::ViewEvent;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// ### English
/// One pending engine request (`WebKitFileChooserRequest`). Consumed by exactly one answer.
///
/// ### 中文
/// 一个待处理的引擎请求（`WebKitFileChooserRequest`）。只会被应答一次。
pub trait FileChooserRequest {
    fn select_files(self: Box<Self>, files: &[PathBuf]);

    fn cancel(self: Box<Self>);
}

/// ### English
/// Holds at most one outstanding request.
///
/// ### 中文
/// 最多持有一个未完成的请求。
#[derive(Default)]
pub struct FileChooser {
    pending: Option<(Box<dyn FileChooserRequest>, bool)>,
}

/// ### English
/// `file://` URLs become local paths, anything that does not parse as a URL is taken as a
/// path, other URL schemes are dropped.
///
/// ### 中文
/// `file://` URL 转为本地路径，无法解析为 URL 的内容视为路径，其它 URL scheme 被丢弃。
fn resolve_local_path(entry: &str) -> Option<PathBuf> {
    if entry.is_empty() {
        return None;
    }
    match Url::parse(entry) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(url) => {
            log::warn!("ignoring non-local file selection {url}");
            None
        }
        Err(_) => Some(PathBuf::from(entry)),
    }
}

impl FileChooser {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// ### English
    /// Registers `request`, cancelling any request still outstanding, and returns the event
    /// to surface to the owner. An empty MIME list means "any file".
    ///
    /// ### 中文
    /// 登记 `request`（会先取消仍未完成的请求），并返回需上报给所有者的事件。
    /// MIME 列表为空表示 “任意文件”。
    pub fn begin(
        &mut self,
        request: Box<dyn FileChooserRequest>,
        multiple: bool,
        mut mime_types: Vec<String>,
    ) -> ViewEvent {
        if let Some((previous, _)) = self.pending.take() {
            log::debug!("new file chooser request supersedes the pending one");
            previous.cancel();
        }
        if mime_types.is_empty() {
            mime_types.push(FALLBACK_MIME_TYPE.to_string());
        }
        self.pending = Some((request, multiple));
        ViewEvent::FileSelectionRequested {
            multiple,
            mime_types,
        }
    }

    /// ### English
    /// Answers the pending request with `entries`. Returns `false` when there was none.
    ///
    /// ### 中文
    /// 用 `entries` 应答待处理请求。没有待处理请求时返回 `false`。
    pub fn confirm<S: AsRef<str>>(&mut self, entries: &[S]) -> bool {
        let Some((request, multiple)) = self.pending.take() else {
            return false;
        };
        let mut files: Vec<PathBuf> = entries
            .iter()
            .filter_map(|entry| resolve_local_path(entry.as_ref()))
            .collect();
        if !multiple {
            files.truncate(1);
        }
        request.select_files(&files);
        true
    }

    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((request, _)) => {
                request.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Answer {
        Selected(Vec<PathBuf>),
        Cancelled,
    }

    struct Recorder(Rc<RefCell<Vec<(u32, Answer)>>>, u32);

    impl FileChooserRequest for Recorder {
        fn select_files(self: Box<Self>, files: &[PathBuf]) {
            self.0.borrow_mut().push((self.1, Answer::Selected(files.to_vec())));
        }

        fn cancel(self: Box<Self>) {
            self.0.borrow_mut().push((self.1, Answer::Cancelled));
        }
    }

    fn request(log: &Rc<RefCell<Vec<(u32, Answer)>>>, id: u32) -> Box<dyn FileChooserRequest> {
        Box::new(Recorder(log.clone(), id))
    }

    #[test]
    fn confirm_resolves_urls_and_plain_paths() {
        let log = Rc::default();
        let mut chooser = FileChooser::default();
        let event = chooser.begin(request(&log, 1), true, vec!["image/png".to_string()]);
        assert_eq!(
            event,
            ViewEvent::FileSelectionRequested {
                multiple: true,
                mime_types: vec!["image/png".to_string()],
            }
        );

        assert!(chooser.confirm(&[
            "file:///home/user/a%20b.png",
            "/tmp/plain.txt",
            "https://example.org/remote.png",
            "",
        ]));
        assert_eq!(
            *log.borrow(),
            vec![(
                1,
                Answer::Selected(vec![
                    PathBuf::from("/home/user/a b.png"),
                    PathBuf::from("/tmp/plain.txt"),
                ])
            )]
        );
        assert!(!chooser.is_pending());
    }

    #[test]
    fn single_selection_keeps_only_the_first_file() {
        let log = Rc::default();
        let mut chooser = FileChooser::default();
        chooser.begin(request(&log, 1), false, Vec::new());
        chooser.confirm(&["/a", "/b"]);
        assert_eq!(
            *log.borrow(),
            vec![(1, Answer::Selected(vec![PathBuf::from("/a")]))]
        );
    }

    #[test]
    fn empty_mime_list_falls_back_to_octet_stream() {
        let log = Rc::default();
        let mut chooser = FileChooser::default();
        let event = chooser.begin(request(&log, 1), false, Vec::new());
        assert_eq!(
            event,
            ViewEvent::FileSelectionRequested {
                multiple: false,
                mime_types: vec![FALLBACK_MIME_TYPE.to_string()],
            }
        );
    }

    #[test]
    fn new_request_cancels_the_outstanding_one() {
        let log = Rc::default();
        let mut chooser = FileChooser::default();
        chooser.begin(request(&log, 1), false, Vec::new());
        chooser.begin(request(&log, 2), false, Vec::new());
        assert!(chooser.cancel());
        assert_eq!(*log.borrow(), vec![(1, Answer::Cancelled), (2, Answer::Cancelled)]);
    }

    #[test]
    fn answers_without_a_request_are_no_ops() {
        let mut chooser = FileChooser::default();
        assert!(!chooser.confirm(&["/tmp/x"]));
        assert!(!chooser.cancel());
    }
}
