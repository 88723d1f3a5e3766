use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, TableStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::backend::{Backend, Item};
use crate::{CreateTableOptions, ForumError};

/// Partition key of the forum table.
pub(crate) const PK: &str = "Name";

/// A forum record. Numbers keep the exact decimal text they were read with
/// and compare by value, so `12.50` equals the `12.5` the service hands back.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Forum {
    pub name: String,
    pub category: String,
    pub messages: Number,
    pub threads: Number,
    pub views: Number,
}

impl Forum {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        messages: impl Into<Number>,
        threads: impl Into<Number>,
        views: impl Into<Number>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            messages: messages.into(),
            threads: threads.into(),
            views: views.into(),
        }
    }
}

impl PartialEq for Forum {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.category == other.category
            && same_number(&self.messages, &other.messages)
            && same_number(&self.threads, &other.threads)
            && same_number(&self.views, &other.views)
    }
}

fn same_number(a: &Number, b: &Number) -> bool {
    let (a, b) = (a.to_string(), b.to_string());
    match (normalize_number(&a), normalize_number(&b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Canonical positional text of a decimal number: no exponent, no leading
/// zeros, no trailing fractional zeros, and `0` for every zero. `None` when
/// `num` is not a decimal or its exponent is beyond what the service stores.
pub(crate) fn normalize_number(num: &str) -> Option<String> {
    let (negative, rest) = match num.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, num.strip_prefix('+').unwrap_or(num)),
    };
    let (mantissa, exponent) = match rest.find(|c| c == 'e' || c == 'E') {
        Some(i) => (&rest[..i], rest[i + 1..].parse::<i64>().ok()?),
        None => (rest, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (int.is_empty() && frac.is_empty())
        || !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let digits = format!("{int}{frac}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }
    let significant = digits.trim_end_matches('0');
    let scale = exponent - frac.len() as i64 + (digits.len() - significant.len()) as i64;
    if !(-400..=400).contains(&scale) {
        return None;
    }

    let body = if scale >= 0 {
        format!("{significant}{}", "0".repeat(scale as usize))
    } else {
        let point = significant.len() as i64 + scale;
        if point > 0 {
            let (whole, fraction) = significant.split_at(point as usize);
            format!("{whole}.{fraction}")
        } else {
            format!("0.{}{significant}", "0".repeat((-point) as usize))
        }
    };

    Some(if negative { format!("-{body}") } else { body })
}

/// The table a [`Forums`] instance currently works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub name: String,
    pub status: TableStatus,
}

/// Forum table over a storage backend. Holds the backend and the handle of
/// the table selected by `exists` or `create_table`.
pub struct Forums<B> {
    pub(crate) backend: B,
    pub(crate) table: Option<TableHandle>,
    pub(crate) options: CreateTableOptions,
}

impl<B: Backend> Forums<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            table: None,
            options: CreateTableOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CreateTableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Handle cached by the last successful `exists` or `create_table`.
    pub fn table(&self) -> Option<&TableHandle> {
        self.table.as_ref()
    }

    pub(crate) fn table_name(&self) -> Result<&str, ForumError> {
        self.table
            .as_ref()
            .map(|table| table.name.as_str())
            .ok_or(ForumError::NoTable)
    }

    pub(crate) fn key(name: &str) -> Item {
        HashMap::from([(PK.to_string(), AttributeValue::S(name.to_string()))])
    }

    pub(crate) fn forum_as_item(forum: &Forum) -> Result<Item, ForumError> {
        let object = serde_json::to_value(forum)?;
        let object = object.as_object().ok_or_else(|| {
            ForumError::AttributeParseError("forum did not serialize to object".to_string())
        })?;

        let mut item = HashMap::new();
        for (k, v) in object {
            item.insert(k.clone(), Self::value2attr(v)?);
        }
        Ok(item)
    }

    pub(crate) fn item_as_forum(item: &Item) -> Result<Forum, ForumError> {
        let mut object = Map::new();
        for (k, v) in item {
            object.insert(k.clone(), Self::attr2value(v)?);
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    pub(crate) fn value2attr(v: &Value) -> Result<AttributeValue, ForumError> {
        match v {
            Value::String(str) => Ok(AttributeValue::S(str.clone())),
            Value::Number(num) => {
                let text = num.to_string();
                Ok(AttributeValue::N(normalize_number(&text).unwrap_or(text)))
            }
            Value::Bool(bool) => Ok(AttributeValue::Bool(*bool)),
            Value::Null => Ok(AttributeValue::Null(true)),
            Value::Array(arr) => {
                let mut result = vec![];
                for e in arr.iter() {
                    result.push(Self::value2attr(e)?);
                }
                Ok(AttributeValue::L(result))
            }
            Value::Object(obj) => {
                let mut hashmap = HashMap::new();
                for (k, v) in obj.iter() {
                    hashmap.insert(k.clone(), Self::value2attr(v)?);
                }
                Ok(AttributeValue::M(hashmap))
            }
        }
    }

    pub(crate) fn attr2value(attr: &AttributeValue) -> Result<Value, ForumError> {
        match attr {
            AttributeValue::S(str) => Ok(Value::from(str.to_string())),
            AttributeValue::N(num) => num.parse().map(Value::Number).map_err(|_| {
                ForumError::AttributeParseError(format!("number attribute {num:?} is not a decimal"))
            }),
            AttributeValue::Null(..) => Ok(Value::Null),
            AttributeValue::Bool(bool) => Ok(Value::from(*bool)),
            AttributeValue::L(arr) => {
                let mut result = vec![];
                for e in arr.iter() {
                    result.push(Self::attr2value(e)?)
                }
                Ok(Value::Array(result))
            }
            AttributeValue::M(hashmap) => {
                let mut map = Map::new();
                for (k, v) in hashmap.iter() {
                    map.insert(k.clone(), Self::attr2value(v)?);
                }
                Ok(Value::Object(map))
            }
            other => Err(ForumError::AttributeParseError(format!(
                "forum attributes cannot hold {other:?}"
            ))),
        }
    }
}
