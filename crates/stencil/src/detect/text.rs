//! Text classification.
//!
//! Rules run in a fixed order and do not exclude each other. Order matters
//! twice: it breaks confidence ties and it is the order of `allTags` among
//! equal confidences.

use std::sync::OnceLock;

use regex::Regex;

use stencil_core::semantic::{Tag, TypeKey};

const TITLE_KEYWORDS: &[&str] = &[
    "CEO", "CTO", "CFO", "COO", "VP", "总裁", "总监", "教授", "经理", "董事长", "主任", "创始人",
    "院长", "博士", "工程师", "主管", "总经理",
];

const ADDRESS_KEYWORDS: &[&str] = &[
    "省", "市", "区", "路", "号", "街", "大厦", "大道", "县", "镇", "楼",
];

const NAME_EXCLUSIONS: &[&str] = &[
    "团队", "流程", "嘉宾", "主持", "介绍", "时间", "地点", "地址", "电话", "邮箱", "联系", "活动",
    "会议", "议程", "签到", "欢迎", "感谢", "公司", "集团", "中心", "年会", "峰会", "论坛", "晚宴",
    "颁奖", "典礼",
];

/// Place-name suffixes that rule out a personal name.
const NAME_EXCLUDED_ENDINGS: &[char] = &['省', '市', '区', '县', '路', '街', '号'];

const EVENT_KEYWORDS: &[&str] = &[
    "年会", "峰会", "发布会", "论坛", "大会", "晚会", "典礼", "研讨会", "颁奖", "庆典", "盛典",
    "答谢会", "展会",
];

const SLOGAN_KEYWORDS: &[&str] = &[
    "欢迎", "祝", "庆", "喜", "感恩", "携手", "共创", "共赢", "辉煌", "未来", "梦想", "启航", "腾飞",
    "致敬", "热烈",
];

/// Texts up to this many characters fall back to the higher text confidence.
const SHORT_TEXT_CHARS: usize = 50;

/// One entry of the ordered rule table.
struct TextRule {
    key: TypeKey,
    confidence: f32,
    matches: fn(&str) -> bool,
}

const RULES: [TextRule; 12] = [
    TextRule {
        key: TypeKey::Date,
        confidence: 0.95,
        matches: is_date,
    },
    TextRule {
        key: TypeKey::Time,
        confidence: 0.90,
        matches: is_time,
    },
    TextRule {
        key: TypeKey::Phone,
        confidence: 0.95,
        matches: is_phone,
    },
    TextRule {
        key: TypeKey::Email,
        confidence: 0.95,
        matches: is_email,
    },
    TextRule {
        key: TypeKey::Price,
        confidence: 0.90,
        matches: is_price,
    },
    TextRule {
        key: TypeKey::Percent,
        confidence: 0.90,
        matches: is_percent,
    },
    TextRule {
        key: TypeKey::Title,
        confidence: 0.85,
        matches: is_title,
    },
    TextRule {
        key: TypeKey::Wechat,
        confidence: 0.90,
        matches: is_wechat,
    },
    TextRule {
        key: TypeKey::Address,
        confidence: 0.75,
        matches: is_address,
    },
    TextRule {
        key: TypeKey::Name,
        confidence: 0.85,
        matches: is_name,
    },
    TextRule {
        key: TypeKey::EventTitle,
        confidence: 0.85,
        matches: is_event_title,
    },
    TextRule {
        key: TypeKey::Slogan,
        confidence: 0.75,
        matches: is_slogan,
    },
];

/// Classifies text content.
///
/// Returns every rule hit in rule order. Content that matches nothing gets a
/// single generic text hit; blank content gets none.
pub(crate) fn classify(content: &str) -> Vec<Tag> {
    let text = content.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<Tag> = RULES
        .iter()
        .filter(|rule| (rule.matches)(text))
        .map(|rule| Tag::new(rule.key, rule.confidence))
        .collect();

    if hits.is_empty() {
        let confidence = if text.chars().count() <= SHORT_TEXT_CHARS {
            0.5
        } else {
            0.4
        };
        hits.push(Tag::new(TypeKey::Text, confidence));
    }
    hits
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("text rule patterns are valid"))
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn is_date(text: &str) -> bool {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &DATE_RE,
        r"\d{4}\s*[-./]\s*\d{1,2}\s*[-./]\s*\d{1,2}|\d{4}\s*年\s*\d{1,2}\s*月(\s*\d{1,2}\s*[日号])?",
    )
    .is_match(text)
}

/// `H:MM`, `H:MM:SS` and ranges such as `9:00-17:30`; full-width colons too.
fn is_time(text: &str) -> bool {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &TIME_RE,
        r"(^|[^\d])([01]?\d|2[0-3])[:：][0-5]\d([:：][0-5]\d)?($|[^\d])",
    )
    .is_match(text)
}

/// Mainland mobile numbers, tolerating space and hyphen separators.
fn is_phone(text: &str) -> bool {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    let compact: String = text.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    regex(&PHONE_RE, r"(^|\D)1[3-9]\d{9}($|\D)").is_match(&compact)
}

fn is_email(text: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    regex(&EMAIL_RE, r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").is_match(text)
}

fn is_price(text: &str) -> bool {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    regex(&PRICE_RE, r"[¥￥$€£]\s*\d+([.,]\d+)?|\d+(\.\d+)?\s*元").is_match(text)
}

fn is_percent(text: &str) -> bool {
    static PERCENT_RE: OnceLock<Regex> = OnceLock::new();
    regex(&PERCENT_RE, r"\d+(\.\d+)?\s*[%％]").is_match(text)
}

fn is_title(text: &str) -> bool {
    contains_any(text, TITLE_KEYWORDS)
}

fn is_wechat(text: &str) -> bool {
    static WECHAT_RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &WECHAT_RE,
        r"(?i)(微信|wechat|wx)\s*(号)?\s*[:：]?\s*[a-z][-_a-z0-9]{5,19}",
    )
    .is_match(text)
}

fn is_address(text: &str) -> bool {
    text.chars().count() >= 3 && contains_any(text, ADDRESS_KEYWORDS)
}

/// Two to four CJK ideographs that read as a personal name.
fn is_name(text: &str) -> bool {
    let count = text.chars().count();
    (2..=4).contains(&count)
        && text.chars().all(is_cjk)
        && !contains_any(text, NAME_EXCLUSIONS)
        && !text.ends_with(NAME_EXCLUDED_ENDINGS)
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_event_title(text: &str) -> bool {
    contains_any(text, EVENT_KEYWORDS)
}

fn is_slogan(text: &str) -> bool {
    static EDITION_RE: OnceLock<Regex> = OnceLock::new();
    let count = text.chars().count();
    ((4..=30).contains(&count) && contains_any(text, SLOGAN_KEYWORDS))
        || regex(&EDITION_RE, r"第.+届").is_match(text)
}
