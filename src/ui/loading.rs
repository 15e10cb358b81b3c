use std::future::Future;
use std::time::Duration;

pub const LOADING_MESSAGES: [&str; 7] = [
    "正在开启命盘之门...",
    "解析紫微星位中...",
    "推演流年运势...",
    "查阅四化吉凶...",
    "大师正在凝神推演...",
    "天机不可泄露，稍等片刻...",
    "正在整理命理建议...",
];

pub const MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

/// 分析期間輪播的狀態提示，純裝飾用
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    messages: &'static [&'static str],
    interval: Duration,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new(&LOADING_MESSAGES, MESSAGE_INTERVAL)
    }
}

impl LoadingIndicator {
    pub fn new(messages: &'static [&'static str], interval: Duration) -> Self {
        Self { messages, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 第 `frame` 次切換後顯示的訊息，超過最後一則回到第一則
    pub fn message(&self, frame: usize) -> &'static str {
        if self.messages.is_empty() {
            return "";
        }
        self.messages[frame % self.messages.len()]
    }

    /// 最長提示語的顯示寬度（全形字算兩格）
    pub fn widest_message(&self) -> usize {
        self.messages
            .iter()
            .map(|message| textwrap::core::display_width(message))
            .max()
            .unwrap_or(0)
    }

    pub fn frame_at(&self, elapsed: Duration) -> usize {
        if self.interval.is_zero() {
            return 0;
        }
        (elapsed.as_millis() / self.interval.as_millis()) as usize
    }

    pub fn message_at(&self, elapsed: Duration) -> &'static str {
        self.message(self.frame_at(elapsed))
    }

    /// 等待 `task` 完成，期間每個間隔呼叫一次 `on_frame`（立即呼叫第 0 格）
    pub async fn animate_while<F, T>(&self, task: F, mut on_frame: impl FnMut(usize)) -> T
    where
        F: Future<Output = T>,
    {
        tokio::pin!(task);
        let mut ticker = tokio::time::interval(self.interval);
        let mut frame = 0;

        loop {
            tokio::select! {
                output = &mut task => return output,
                _ = ticker.tick() => {
                    on_frame(frame);
                    frame += 1;
                }
            }
        }
    }
}
