//! Intent classification
//!
//! Pure text → label classification over fixed regex tables. Tables are
//! checked in declared order; the first matching label wins, and anything
//! unmatched is "general". Bilingual patterns (Chinese + English) mirror the
//! query mix this gateway serves.

use lazy_static::lazy_static;
use regex::Regex;

/// Label returned when no pattern matches
pub const DEFAULT_INTENT: &str = "general";

lazy_static! {
    static ref INTENT_PATTERNS: Vec<(&'static str, Vec<Regex>)> = {
        let table: &[(&str, &[&str])] = &[
            (
                "medical",
                &[
                    "诊断|治疗|症状|医院|医生|手术|药品|疾病|疫情|头疼|发热|痛|难受",
                    "medical|diagnosis|treatment|symptom|hospital|doctor",
                ],
            ),
            (
                "code",
                &[
                    "代码|编程|程序|python|java|c\\+\\+|函数|算法|bug|调试|报错",
                    "code|programming|function|algorithm|debug|api",
                    "```[\\s\\S]*?```|def\\s+\\w+\\(|class\\s+\\w+",
                ],
            ),
            (
                "chinese",
                &["翻译|你好|中文|帮助", "[\\u{4e00}-\\u{9fff}]{5,}"],
            ),
            ("emergency", &["紧急|救命|危险|火灾|地震|急救|报警|火"]),
        ];
        table
            .iter()
            .map(|(label, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("hard-coded intent pattern"))
                    .collect();
                (*label, compiled)
            })
            .collect()
    };
}

/// Classifies query text into a coarse intent label
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    /// Create a classifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify a query. Never fails; unmatched text is "general".
    #[must_use]
    pub fn classify(&self, text: &str) -> &'static str {
        let lowered = text.to_lowercase();
        for (label, patterns) in INTENT_PATTERNS.iter() {
            if patterns.iter().any(|p| p.is_match(&lowered)) {
                return label;
            }
        }
        DEFAULT_INTENT
    }
}
