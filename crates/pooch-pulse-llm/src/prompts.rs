//! Analysis prompts for canine stool photos.
//!
//! Both providers share the same veterinary instruction. The structured provider
//! pairs it with [`analysis_schema`]; the free-text provider appends
//! [`JSON_SHAPE_TEMPLATE`] so the model knows which object to emit.

use serde_json::{json, Value};

/// Fixed instruction sent with every image.
pub const INSTRUCTION_PROMPT: &str = r#"你是一位专业的兽医助手，擅长犬类胃肠道健康分析。
请分析这张狗狗粪便的照片，并提供详细的健康报告。
请使用标准的普瑞纳粪便评分系统 (1-7) 进行评估。
请以客观、专业的口吻用中文进行回复。必须包含医疗免责声明。"#;

/// Response shape appended to the instruction for providers without schema support.
pub const JSON_SHAPE_TEMPLATE: &str = r#"请返回以下 JSON 格式的结果：
{
  "score": 数字,
  "consistency": "质地描述",
  "color": "颜色",
  "findings": ["观察结果1", "观察结果2"],
  "analysis": "详细分析",
  "recommendation": "建议"
}"#;

/// Field names every analysis result must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "score",
    "consistency",
    "color",
    "findings",
    "analysis",
    "recommendation",
];

/// Instruction for schema-constrained providers.
pub fn build_structured_prompt() -> String {
    INSTRUCTION_PROMPT.to_string()
}

/// Instruction for free-text providers, with the JSON shape spelled out.
pub fn build_text_prompt() -> String {
    format!("{}\n{}", INSTRUCTION_PROMPT, JSON_SHAPE_TEMPLATE)
}

/// Response schema for schema-constrained generation.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "description": "普瑞纳粪便评分 (1-7)。1表示干硬，7表示水样腹泻。2是理想状态。"
            },
            "consistency": {
                "type": "STRING",
                "description": "质地描述（例如：坚实、软成型、松散等）。"
            },
            "color": {
                "type": "STRING",
                "description": "粪便的颜色。"
            },
            "findings": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "具体观察结果列表，如粘液、血液、寄生虫或异物。"
            },
            "analysis": {
                "type": "STRING",
                "description": "对图像显示的详细专业分析。"
            },
            "recommendation": {
                "type": "STRING",
                "description": "给主人的建议（如：继续观察、咨询兽医、调整饮食等）。"
            }
        },
        "required": REQUIRED_FIELDS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_mentions_scale_and_disclaimer() {
        assert!(INSTRUCTION_PROMPT.contains("兽医助手"));
        assert!(INSTRUCTION_PROMPT.contains("普瑞纳粪便评分"));
        assert!(INSTRUCTION_PROMPT.contains("(1-7)"));
        assert!(INSTRUCTION_PROMPT.contains("免责声明"));
    }

    #[test]
    fn test_text_prompt_lists_every_field() {
        let prompt = build_text_prompt();
        assert!(prompt.starts_with(INSTRUCTION_PROMPT));
        for field in REQUIRED_FIELDS {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }

    #[test]
    fn test_structured_prompt_has_no_template() {
        let prompt = build_structured_prompt();
        assert!(!prompt.contains("JSON 格式"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = analysis_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
        assert_eq!(schema["properties"]["findings"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["score"]["type"], "NUMBER");
    }
}
