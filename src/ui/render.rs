//! 把 `AppState` 畫成純文字畫面。沒有任何狀態，同樣的輸入永遠得到同樣的輸出。

use crate::core::session::{AppState, AppStatus};
use crate::domain::model::{ChartAnalysis, DecadeCycle, ImagePayload, PalaceData, YearlyCycle};
use crate::ui::loading::LoadingIndicator;
use std::fmt::Write;
use textwrap::core::display_width;

pub const BADGE_PLACEHOLDER: &str = "--";
pub const TITLE: &str = "紫微斗数命盘解读";
pub const TAGLINE: &str = "\"天垂象，见吉凶\" —— AI 视觉深度解析";
pub const UPLOAD_LABEL: &str = "上传命盘截图";
pub const DOWNLOAD_ACTION: &str = "[D] 下载解读报告";
pub const RESET_ACTION: &str = "[R] 重新开始";

#[derive(Debug, Clone)]
pub struct Renderer {
    width: usize,
    loading: LoadingIndicator,
}

impl Renderer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            loading: LoadingIndicator::default(),
        }
    }

    /// `loading_frame` 只在 Analyzing 狀態下用來挑選提示語
    pub fn render(&self, state: &AppState, loading_frame: usize) -> String {
        let mut out = self.header();

        match state.status {
            AppStatus::Idle => out.push_str(&self.upload_panel(None)),
            AppStatus::Error => out.push_str(&self.upload_panel(state.error.as_deref())),
            AppStatus::Analyzing => out.push_str(&self.loading_panel(loading_frame)),
            AppStatus::Result => match &state.analysis {
                Some(analysis) => out.push_str(&self.result_view(analysis, state.preview.as_ref())),
                None => out.push_str(&self.upload_panel(None)),
            },
        }
        out
    }

    pub fn header(&self) -> String {
        let rule = "═".repeat(self.width);
        format!(
            "{}\n{}\n{}\n{}\n\n",
            rule,
            self.center(TITLE),
            self.center(TAGLINE),
            rule
        )
    }

    /// 補空白到最長提示語的寬度，用 `\r` 覆寫時才不會殘留上一句的尾巴
    pub fn loading_line(&self, frame: usize) -> String {
        let message = self.loading.message(frame);
        let padding = self
            .loading
            .widest_message()
            .saturating_sub(display_width(message));
        format!("☯ {}{}", message, " ".repeat(padding))
    }

    fn loading_panel(&self, frame: usize) -> String {
        format!("{}\n", self.center(&self.loading_line(frame)))
    }

    fn upload_panel(&self, error: Option<&str>) -> String {
        let mut out = String::new();
        out.push_str(&self.center(&format!("[ {} ]", UPLOAD_LABEL)));
        out.push('\n');
        out.push_str(&self.center("输入命盘截图的文件路径（PNG / JPG / WEBP）"));
        out.push('\n');
        if let Some(message) = error {
            out.push('\n');
            out.push_str(&self.center(&format!("✗ {}", message)));
            out.push('\n');
        }
        out
    }

    fn result_view(&self, analysis: &ChartAnalysis, preview: Option<&ImagePayload>) -> String {
        let mut out = String::new();
        let info = &analysis.personal_info;

        if let Some(image) = preview {
            let _ = writeln!(
                out,
                "命盘图片：{} · {:.1} KB",
                image.mime_type,
                image.byte_len as f64 / 1024.0
            );
        }
        let badges = [
            badge("生日", &info.birth_date),
            badge("性别", &info.gender),
            badge("命主", &info.ming_zhu),
            badge("身主", &info.shen_zhu),
        ];
        let _ = writeln!(out, "{}\n", badges.join("  "));

        out.push_str(&section_header("命盘总述"));
        out.push_str(&self.paragraph(&analysis.summary, "  "));
        if !analysis.fortune_cycle.trim().is_empty() {
            out.push_str(&self.paragraph(&format!("运势走向：{}", analysis.fortune_cycle), "  "));
        }
        out.push('\n');

        out.push_str(&section_header("十年大运解读"));
        for decade in &analysis.decade_cycles {
            out.push_str(&self.decade_card(decade));
        }
        out.push('\n');

        out.push_str(&section_header("流年运势展望"));
        for year in &analysis.yearly_cycles {
            out.push_str(&self.yearly_card(year));
        }
        out.push('\n');

        for (title, content) in [
            ("事业", &analysis.career_advice),
            ("财富", &analysis.wealth_advice),
            ("感情", &analysis.relationship_advice),
        ] {
            out.push_str(&self.card(&format!("【{}】", title), &[self.wrap(content)]));
        }
        out.push('\n');

        out.push_str(&section_header("十二宫详解"));
        for palace in &analysis.palaces {
            out.push_str(&self.palace_card(palace));
        }
        out.push('\n');

        let _ = writeln!(out, "{}", self.center(&format!("{}    {}", DOWNLOAD_ACTION, RESET_ACTION)));
        out
    }

    fn decade_card(&self, decade: &DecadeCycle) -> String {
        let title = format!("{} · {}", decade.period, decade.palace_name);
        self.card(&title, &[self.wrap(&decade.summary)])
    }

    fn yearly_card(&self, year: &YearlyCycle) -> String {
        let mut body = vec![self.wrap(&year.summary)];
        if !year.key_points.is_empty() {
            body.push(tags(&year.key_points));
        }
        self.card(&year.year, &body)
    }

    fn palace_card(&self, palace: &PalaceData) -> String {
        let stars: Vec<String> = palace.main_stars.iter().map(|s| format!("[{}]", s)).collect();
        let title = if stars.is_empty() {
            palace.name.clone()
        } else {
            format!("{}  {}", palace.name, stars.join(" "))
        };

        let mut body = vec![self.wrap(&palace.interpretation)];
        if !palace.minor_stars.is_empty() {
            let minor: Vec<String> = palace.minor_stars.iter().map(|s| format!("• {}", s)).collect();
            body.push(vec![minor.join("  ")]);
        }
        self.card(&title, &body)
    }

    fn card(&self, title: &str, body: &[Vec<String>]) -> String {
        let mut out = format!("  ┌ {}\n", title);
        for line in body.iter().flatten() {
            let _ = writeln!(out, "  │ {}", line);
        }
        out.push_str("  └\n");
        out
    }

    fn wrap(&self, text: &str) -> Vec<String> {
        let width = self.width.saturating_sub(4).max(10);
        textwrap::wrap(text, width)
            .into_iter()
            .map(|line| line.into_owned())
            .collect()
    }

    fn paragraph(&self, text: &str, indent: &str) -> String {
        self.wrap(text)
            .into_iter()
            .map(|line| format!("{}{}\n", indent, line))
            .collect()
    }

    fn center(&self, text: &str) -> String {
        let pad = self.width.saturating_sub(display_width(text)) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }
}

fn section_header(title: &str) -> String {
    format!("◆ {}\n", title)
}

fn badge(label: &str, value: &str) -> String {
    let value = if value.trim().is_empty() {
        BADGE_PLACEHOLDER
    } else {
        value
    };
    format!("[{} {}]", label, value)
}

/// 每個要點各自成為一個標籤
fn tags(points: &[String]) -> Vec<String> {
    vec![points
        .iter()
        .map(|point| format!("# {}", point))
        .collect::<Vec<_>>()
        .join("  ")]
}
