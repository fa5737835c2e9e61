//! Static knowledge-base tips.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeItem {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const KNOWLEDGE_ITEMS: [KnowledgeItem; 4] = [
    KnowledgeItem {
        title: "理想的便便 (2分)",
        description: "呈现巧克力棕色，坚实但有弹性，像木头一样成型，捡起时不留痕迹。",
        icon: "✨",
    },
    KnowledgeItem {
        title: "颜色背后的秘密",
        description: "黑色可能预示上消化道出血；绿色可能与摄入过多草或胆汁有关；红色血丝需警惕结肠问题。",
        icon: "🎨",
    },
    KnowledgeItem {
        title: "什么是普瑞纳评分？",
        description: "全球通用的 1-7 分制。1分干硬，2-3分理想，4-5分软便，6-7分腹泻。",
        icon: "📊",
    },
    KnowledgeItem {
        title: "何时需要看兽医？",
        description: "如果便便中出现大量粘液、寄生虫、异物，或者狗狗伴有呕吐、食欲不振等症状。",
        icon: "🏥",
    },
];

/// Closing tip under the list.
pub const KNOWLEDGE_TIP: &str = "记录比记忆更可靠。每天坚持打卡，能帮助兽医更快锁定病因。";

pub fn knowledge_items() -> &'static [KnowledgeItem] {
    &KNOWLEDGE_ITEMS
}
