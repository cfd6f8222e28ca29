//! 元数据匹配器
//!
//! 数值按数值比较，字符串按字典序比较；缺失字段一律不匹配。
//!
use crate::transport::MetadataMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// 元数据比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEquals,
    LowerThan,
    LowerThanEquals,
    In,
    NotIn,
}

/// 单个匹配条件：字段 / 运算符 / 值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataMatch {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// 元数据匹配器：所有条件同时成立才匹配
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataMatcher {
    data: Vec<MetadataMatch>,
}

impl MetadataMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata_match(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.data.push(MetadataMatch {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn data(&self) -> &[MetadataMatch] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 对一条记录的元数据求值；缺失字段一律不匹配
    pub fn matches(&self, metadata: &MetadataMap) -> bool {
        self.data.iter().all(|m| {
            metadata
                .get(&m.field)
                .is_some_and(|actual| evaluate(m.operator, actual, &m.value))
        })
    }
}

fn evaluate(operator: Operator, actual: &Value, expected: &Value) -> bool {
    match operator {
        Operator::Equals => compare(actual, expected) == Some(Ordering::Equal),
        Operator::NotEquals => compare(actual, expected) != Some(Ordering::Equal),
        Operator::GreaterThan => compare(actual, expected) == Some(Ordering::Greater),
        Operator::GreaterThanEquals => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::LowerThan => compare(actual, expected) == Some(Ordering::Less),
        Operator::LowerThanEquals => matches!(
            compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::In => contains(expected, actual),
        Operator::NotIn => !contains(expected, actual),
    }
}

/// 数字按数值比较，字符串按字典序比较，其他类型仅支持相等
fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    haystack.as_array().is_some_and(|values| {
        values
            .iter()
            .any(|v| compare(needle, v) == Some(Ordering::Equal))
    })
}
