//! 状态分类服务 - 业务能力层
//!
//! 把状态栏的自由文本粗分为成功 / 错误 / 未知，只用于统计展示，
//! 不影响流程；原文总是原样保留。

use regex::{Regex, RegexBuilder};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::correction::{Outcome, StepOutcome};

pub const DEFAULT_SUCCESS_TERMS: [&str; 2] = ["sucesso", "êxito"];
pub const DEFAULT_ERROR_TERMS: [&str; 2] = ["erro", "falha"];

/// 状态分类器
///
/// 不区分大小写的子串匹配，成功词优先于错误词。
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    success: Option<Regex>,
    error: Option<Regex>,
}

impl StatusClassifier {
    pub fn new<S: AsRef<str>>(success_terms: &[S], error_terms: &[S]) -> Result<Self, regex::Error> {
        Ok(Self {
            success: build_matcher(success_terms)?,
            error: build_matcher(error_terms)?,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(&config.success_terms, &config.error_terms)?)
    }

    pub fn classify(&self, text: &str) -> Outcome {
        let hit = |re: &Option<Regex>| re.as_ref().is_some_and(|re| re.is_match(text));
        if hit(&self.success) {
            Outcome::Success
        } else if hit(&self.error) {
            Outcome::Error
        } else {
            Outcome::Unknown
        }
    }

    pub fn step_outcome(&self, raw_text: String) -> StepOutcome {
        let outcome = self.classify(&raw_text);
        StepOutcome { raw_text, outcome }
    }
}

/// 把关键词编译成一个不区分大小写的交替模式，空词表不匹配任何文本
fn build_matcher<S: AsRef<str>>(terms: &[S]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
        .map(Some)
}
