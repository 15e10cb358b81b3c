use crate::domain::model::ChartAnalysis;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt::Write;

pub const REPORT_PLACEHOLDER: &str = "未知";
pub const LIST_DELIMITER: &str = "、";
pub const TIMESTAMP_PREFIX: &str = "报告生成时间：";

pub const SECTION_PERSONAL: &str = "【个人基本信息】";
pub const SECTION_SUMMARY: &str = "【命盘总述】";
pub const SECTION_DECADES: &str = "【十年大运解读】";
pub const SECTION_YEARS: &str = "【流年运势解读】";
pub const SECTION_ADVICE: &str = "【专业建议】";
pub const SECTION_PALACES: &str = "【十二宫详解】";

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        REPORT_PLACEHOLDER
    } else {
        value
    }
}

pub fn format_report(analysis: &ChartAnalysis) -> String {
    format_report_at(analysis, Local::now())
}

/// 固定段落順序輸出純文字報告；除了最後一行時間戳外完全由輸入決定
pub fn format_report_at(analysis: &ChartAnalysis, generated_at: DateTime<Local>) -> String {
    let mut report = String::new();
    // 寫入 String 不會失敗
    let _ = write_report(&mut report, analysis, generated_at);
    report
}

fn write_report(
    out: &mut String,
    analysis: &ChartAnalysis,
    generated_at: DateTime<Local>,
) -> std::fmt::Result {
    let info = &analysis.personal_info;

    writeln!(out, "紫微斗数命盘解读报告")?;
    writeln!(out, "================================")?;
    writeln!(out)?;

    writeln!(out, "{}", SECTION_PERSONAL)?;
    writeln!(out, "生日：{}", or_unknown(&info.birth_date))?;
    writeln!(out, "性别：{}", or_unknown(&info.gender))?;
    writeln!(out, "命主：{}", or_unknown(&info.ming_zhu))?;
    writeln!(out, "身主：{}", or_unknown(&info.shen_zhu))?;
    writeln!(out)?;

    writeln!(out, "{}", SECTION_SUMMARY)?;
    writeln!(out, "{}", analysis.summary)?;
    writeln!(out)?;

    writeln!(out, "{}", SECTION_DECADES)?;
    for decade in &analysis.decade_cycles {
        writeln!(out, "周期：{}（{}）", decade.period, decade.palace_name)?;
        writeln!(out, "概论：{}", decade.summary)?;
        writeln!(out)?;
    }

    writeln!(out, "{}", SECTION_YEARS)?;
    for year in &analysis.yearly_cycles {
        writeln!(out, "年份：{}", year.year)?;
        writeln!(out, "解析：{}", year.summary)?;
        writeln!(out, "要点：{}", year.key_points.join(LIST_DELIMITER))?;
        writeln!(out)?;
    }

    writeln!(out, "{}", SECTION_ADVICE)?;
    writeln!(out, "1. 事业格局：{}", analysis.career_advice)?;
    writeln!(out, "2. 财帛分析：{}", analysis.wealth_advice)?;
    writeln!(out, "3. 婚姻感情：{}", analysis.relationship_advice)?;
    writeln!(out)?;

    writeln!(out, "{}", SECTION_PALACES)?;
    for palace in &analysis.palaces {
        writeln!(out, "--- {} ---", palace.name)?;
        writeln!(out, "主要星曜：{}", palace.main_stars.join(LIST_DELIMITER))?;
        writeln!(out, "解析：{}", palace.interpretation)?;
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{}{}",
        TIMESTAMP_PREFIX,
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn report_filename(date: NaiveDate) -> String {
    format!("紫微解读报告_{}.txt", date.format("%Y-%m-%d"))
}
