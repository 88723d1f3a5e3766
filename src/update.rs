use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Value};

use crate::backend::Backend;
use crate::client::{normalize_number, PK};
use crate::{Forum, ForumError, Forums};

impl<B: Backend> Forums<B> {
    /// Rewrites category, messages, threads and views of the forum with the
    /// same name, returning the fields whose value changed with their new values.
    ///
    /// Whether a forum that is not in the table gets created is up to the
    /// service; DynamoDB creates it, in which case every field counts as changed.
    pub async fn update_forum(&self, forum: &Forum) -> Result<Map<String, Value>, ForumError> {
        let table = self.table_name()?;
        let mut changes = Self::forum_as_item(forum)?;
        changes.remove(PK);

        let old = self
            .backend
            .update_item(table, Self::key(&forum.name), changes.clone())
            .await
            .map_err(|fault| {
                fault.logged("update forum", format!("{} in table {table}", forum.name))
            })?
            .unwrap_or_default();

        let mut updated = Map::new();
        for (k, v) in changes {
            if !old.get(&k).is_some_and(|previous| same_value(previous, &v)) {
                updated.insert(k, Self::attr2value(&v)?);
            }
        }

        tracing::debug!(table, forum = %forum.name, changed = updated.len(), "updated forum");
        Ok(updated)
    }
}

/// Numbers compare by value; the service may hand back `12.5` for `12.50`.
fn same_value(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::N(a), AttributeValue::N(b)) => {
            match (normalize_number(a), normalize_number(b)) {
                (Some(a), Some(b)) => a == b,
                _ => a == b,
            }
        }
        _ => a == b,
    }
}
