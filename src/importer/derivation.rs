// ==========================================
// 经销数据看板 - 具体分类派生
// ==========================================
// 职责: 库存行的"具体分类"（产品线标签）
// 规则: 按优先级依次尝试 (谓词, 标签) 规则，首个命中即返回；全部落空 → 默认分类
// 红线: 全函数，不存在"未分类"状态
// ==========================================

use crate::config::DashboardConfig;

/// 分类所需的产品信息
#[derive(Debug, Clone, Copy)]
pub struct ProductFacts<'a> {
    pub product_name: &'a str,

    /// 已做别名归一的大类
    pub category: Option<&'a str>,
}

/// 分类规则
#[derive(Debug, Clone, PartialEq)]
pub enum ClassRule {
    /// 产品名含子品牌关键字 → 该关键字（按列表顺序）
    SubBrand(Vec<String>),

    /// 属于指定大类且产品名含段位 → 该段位
    Segment { category: String, tokens: Vec<String> },
}

impl ClassRule {
    fn apply<'r>(&'r self, facts: &ProductFacts<'_>) -> Option<&'r str> {
        match self {
            ClassRule::SubBrand(keywords) => keywords
                .iter()
                .find(|k| facts.product_name.contains(k.as_str()))
                .map(String::as_str),
            ClassRule::Segment { category, tokens } => {
                if facts.category != Some(category.as_str()) {
                    return None;
                }
                tokens
                    .iter()
                    .find(|t| facts.product_name.contains(t.as_str()))
                    .map(String::as_str)
            }
        }
    }
}

pub struct SpecificClassifier {
    rules: Vec<ClassRule>,
    default_label: String,
}

impl SpecificClassifier {
    pub fn new(rules: Vec<ClassRule>, default_label: &str) -> Self {
        Self {
            rules,
            default_label: default_label.to_string(),
        }
    }

    /// 子品牌 → 段位 → 默认
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            vec![
                ClassRule::SubBrand(config.sub_brand_keywords.clone()),
                ClassRule::Segment {
                    category: config.segment_category.clone(),
                    tokens: config.segment_tokens.clone(),
                },
            ],
            &config.default_class,
        )
    }

    pub fn classify(&self, facts: &ProductFacts<'_>) -> String {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(facts))
            .unwrap_or(&self.default_label)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SpecificClassifier {
        SpecificClassifier::from_config(&DashboardConfig::default())
    }

    fn facts<'a>(name: &'a str, category: Option<&'a str>) -> ProductFacts<'a> {
        ProductFacts {
            product_name: name,
            category,
        }
    }

    #[test]
    fn test_sub_brand_has_priority_over_segment() {
        let c = classifier();
        assert_eq!(c.classify(&facts("金装婴儿配方奶粉3段800g", Some("婴幼儿奶粉"))), "金装");
    }

    #[test]
    fn test_segment_gated_by_category() {
        let c = classifier();
        assert_eq!(c.classify(&facts("婴儿配方奶粉2段", Some("婴幼儿奶粉"))), "2段");
        assert_eq!(c.classify(&facts("成人奶粉2段", Some("成人奶粉"))), "其他");
        assert_eq!(c.classify(&facts("婴儿配方奶粉2段", None)), "其他");
    }

    #[test]
    fn test_default_when_no_rule_matches() {
        let c = classifier();
        assert_eq!(c.classify(&facts("", None)), "其他");
    }

    #[test]
    fn test_rule_order_is_respected() {
        let c = SpecificClassifier::new(
            vec![
                ClassRule::SubBrand(vec!["有机".into()]),
                ClassRule::SubBrand(vec!["羊奶".into()]),
            ],
            "其他",
        );
        assert_eq!(c.classify(&facts("羊奶有机粉", None)), "有机");
    }
}
