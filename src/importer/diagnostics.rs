// ==========================================
// 经销数据看板 - 载入诊断日志
// ==========================================
// 职责: 记录载入过程中的回退/替代/剔除/失败，供展示层查看
// 说明: 每条记录同时写入 tracing
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagLevel {
    Info,    // 过程信息
    Warning, // 静默回退（列位置回退、占位门店、剔除行）
    Error,   // 视图不可用（文件无法解析、表结构不符）
}

impl fmt::Display for DiagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagLevel::Info => write!(f, "INFO"),
            DiagLevel::Warning => write!(f, "WARNING"),
            DiagLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub level: DiagLevel,
    pub sheet: Option<String>,
    pub message: String,
}

impl fmt::Display for DiagnosticEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "[{}] {}: {}", self.level, sheet, self.message),
            None => write!(f, "[{}] {}", self.level, self.message),
        }
    }
}

/// 诊断日志（按发生顺序）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticLog {
    entries: Vec<DiagnosticEntry>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info<S: Into<String>>(&mut self, sheet: Option<&str>, message: S) {
        let message = message.into();
        tracing::info!(sheet = sheet.unwrap_or("-"), "{}", message);
        self.push(DiagLevel::Info, sheet, message);
    }

    pub fn warn<S: Into<String>>(&mut self, sheet: Option<&str>, message: S) {
        let message = message.into();
        tracing::warn!(sheet = sheet.unwrap_or("-"), "{}", message);
        self.push(DiagLevel::Warning, sheet, message);
    }

    pub fn error<S: Into<String>>(&mut self, sheet: Option<&str>, message: S) {
        let message = message.into();
        tracing::error!(sheet = sheet.unwrap_or("-"), "{}", message);
        self.push(DiagLevel::Error, sheet, message);
    }

    fn push(&mut self, level: DiagLevel, sheet: Option<&str>, message: String) {
        self.entries.push(DiagnosticEntry {
            level,
            sheet: sheet.map(str::to_string),
            message,
        });
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    /// 不低于给定级别的条目
    pub fn at_least(&self, level: DiagLevel) -> impl Iterator<Item = &DiagnosticEntry> + '_ {
        self.entries.iter().filter(move |e| e.level >= level)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == DiagLevel::Error)
    }

    /// 是否有包含给定片段的条目
    pub fn contains(&self, fragment: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(fragment))
    }

    pub fn extend(&mut self, other: DiagnosticLog) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
