// ==========================================
// 经销数据看板 - 时间窗口
// ==========================================
// 职责: 日/月/年/月区间 窗口判定 + 去年同期窗口
// 红线: 去年同期 = 日历上减一年，不是减固定天数；2 月 29 日 → 去年 2 月 28 日
// ==========================================

use crate::domain::fact::Dated;
use crate::domain::period::YearMonth;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    Day { date: NaiveDate },
    Month { month: YearMonth },
    Year { year: i32 },
    /// 闭区间
    MonthRange { from: YearMonth, to: YearMonth },
}

impl TimeWindow {
    pub fn day(date: NaiveDate) -> Self {
        TimeWindow::Day { date }
    }

    pub fn month(year: i32, month: u32) -> EngineResult<Self> {
        YearMonth::new(year, month)
            .map(|month| TimeWindow::Month { month })
            .ok_or_else(|| EngineError::InvalidWindow(format!("月份 {} 不在 1..=12", month)))
    }

    pub fn year(year: i32) -> Self {
        TimeWindow::Year { year }
    }

    pub fn month_range(from: YearMonth, to: YearMonth) -> EngineResult<Self> {
        if from > to {
            return Err(EngineError::InvalidWindow(format!("起始 {} 晚于结束 {}", from, to)));
        }
        Ok(TimeWindow::MonthRange { from, to })
    }

    /// 以给定月份结尾的连续 n 个月
    pub fn trailing_months(end: YearMonth, n: u32) -> EngineResult<Self> {
        if n == 0 {
            return Err(EngineError::InvalidWindow("月数必须大于 0".to_string()));
        }
        Self::month_range(end.shift(-(n as i32 - 1)), end)
    }

    /// 事实记录是否落在窗口内（日窗口要求记录带日）
    pub fn contains<T: Dated + ?Sized>(&self, fact: &T) -> bool {
        match self {
            TimeWindow::Day { date } => {
                fact.year() == date.year()
                    && fact.month() == date.month()
                    && fact.day() == Some(date.day())
            }
            TimeWindow::Month { month } => fact.year_month() == *month,
            TimeWindow::Year { year } => fact.year() == *year,
            TimeWindow::MonthRange { from, to } => {
                let ym = fact.year_month();
                *from <= ym && ym <= *to
            }
        }
    }

    /// 年月是否落在窗口内（日窗口按所在月判断）
    pub fn contains_month(&self, ym: YearMonth) -> bool {
        match self {
            TimeWindow::Day { date } => ym.year == date.year() && ym.month == date.month(),
            TimeWindow::Month { month } => ym == *month,
            TimeWindow::Year { year } => ym.year == *year,
            TimeWindow::MonthRange { from, to } => *from <= ym && ym <= *to,
        }
    }

    /// 去年同期
    pub fn same_period_last_year(&self) -> Self {
        match self {
            TimeWindow::Day { date } => TimeWindow::Day {
                date: one_year_earlier(*date),
            },
            TimeWindow::Month { month } => TimeWindow::Month {
                month: month.same_month_last_year(),
            },
            TimeWindow::Year { year } => TimeWindow::Year { year: year - 1 },
            TimeWindow::MonthRange { from, to } => TimeWindow::MonthRange {
                from: from.same_month_last_year(),
                to: to.same_month_last_year(),
            },
        }
    }

    /// 窗口覆盖的月份（日窗口为所在月）
    pub fn months(&self) -> Vec<YearMonth> {
        match self {
            TimeWindow::Day { date } => vec![YearMonth {
                year: date.year(),
                month: date.month(),
            }],
            TimeWindow::Month { month } => vec![*month],
            TimeWindow::Year { year } => (1..=12).map(|m| YearMonth { year: *year, month: m }).collect(),
            TimeWindow::MonthRange { from, to } => {
                let mut months = Vec::new();
                let mut cur = *from;
                while cur <= *to {
                    months.push(cur);
                    cur = cur.shift(1);
                }
                months
            }
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Day { date } => write!(f, "{}", date.format("%Y-%m-%d")),
            TimeWindow::Month { month } => write!(f, "{}", month),
            TimeWindow::Year { year } => write!(f, "{}年", year),
            TimeWindow::MonthRange { from, to } => write!(f, "{} ~ {}", from, to),
        }
    }
}

/// 日历减一年（闰日回落到 2 月 28 日）
fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    let year = date.year() - 1;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}
