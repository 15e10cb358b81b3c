use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str = "\
你是一位精通紫微斗数的资深命理大师。你擅长从复杂的命盘图像中提取信息。

请根据提供的紫微斗数命盘截图，识别并生成结构化的分析：
1. 个人基本信息（出生日期、性别、命主、身主）。
2. 命宫、财帛宫、官禄宫、夫妻宫等主要宫位的星曜组合解析。
3. **重点分析：大运（大限）与流年**。
   - 识别当前所在的大运周期（如：32-41岁）及其核心运势走向。
   - 识别当前及未来两年的流年（如：2024甲辰年、2025乙巳年）的具体运势特征。
4. 提供关于事业、财富、感情的专业建议。

输出必须为严格的 JSON 格式，且包含 decadeCycles 和 yearlyCycles 数组。";

pub const USER_PROMPT: &str = "请详细解读这张紫微斗数命盘，特别要列出大运（大限）和流年的具体解读。";

pub const REQUIRED_FIELDS: [&str; 9] = [
    "personalInfo",
    "summary",
    "fortuneCycle",
    "decadeCycles",
    "yearlyCycles",
    "palaces",
    "careerAdvice",
    "wealthAdvice",
    "relationshipAdvice",
];

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn described(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

/// 與 `ChartAnalysis` 形狀一致的結構化輸出 schema
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "personalInfo": {
                "type": "OBJECT",
                "properties": {
                    "birthDate": string(),
                    "gender": string(),
                    "mingZhu": string(),
                    "shenZhu": string()
                },
                "required": ["birthDate", "gender", "mingZhu", "shenZhu"]
            },
            "summary": string(),
            "fortuneCycle": string(),
            "decadeCycles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "period": described("如：32-41岁"),
                        "palaceName": described("当前大限所在的宫位"),
                        "summary": described("该十年的总体运势概括")
                    },
                    "required": ["period", "palaceName", "summary"]
                }
            },
            "yearlyCycles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "year": described("如：2024 甲辰年"),
                        "summary": described("该年份的运势详解"),
                        "keyPoints": {
                            "type": "ARRAY",
                            "items": string(),
                            "description": "当年的关键注意点"
                        }
                    },
                    "required": ["year", "summary", "keyPoints"]
                }
            },
            "palaces": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": string(),
                        "mainStars": string_array(),
                        "minorStars": string_array(),
                        "interpretation": string()
                    }
                }
            },
            "careerAdvice": string(),
            "wealthAdvice": string(),
            "relationshipAdvice": string()
        },
        "required": REQUIRED_FIELDS
    })
}
