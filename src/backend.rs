use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, TableStatus};

use crate::ServiceFault;

/// A raw item as the service stores it: attribute name to attribute value.
pub type Item = HashMap<String, AttributeValue>;

/// Key schema and capacity for a table with a single string partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: String,
    pub read_capacity: i64,
    pub write_capacity: i64,
}

/// One page of a scan. `last_evaluated_key` is set when more pages remain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// The requests the forum table needs from the storage service.
///
/// [`crate::DynamoBackend`] talks to DynamoDB, [`crate::MemoryBackend`] keeps
/// everything in process.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Current status of a table. Fails with `ResourceNotFoundException` when absent.
    async fn describe_table(&self, name: &str) -> Result<TableStatus, ServiceFault>;

    async fn create_table(&self, spec: &TableSpec) -> Result<(), ServiceFault>;

    async fn delete_table(&self, name: &str) -> Result<(), ServiceFault>;

    async fn list_tables(&self) -> Result<Vec<String>, ServiceFault>;

    async fn put_item(&self, table: &str, item: Item) -> Result<(), ServiceFault>;

    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, ServiceFault>;

    /// Sets every attribute of `changes` on the item at `key` and returns the
    /// item as it was before the update, if there was one.
    async fn update_item(
        &self,
        table: &str,
        key: Item,
        changes: Item,
    ) -> Result<Option<Item>, ServiceFault>;

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), ServiceFault>;

    /// Puts at most 25 items in one request, returning the ones the service
    /// did not process.
    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<Vec<Item>, ServiceFault>;

    async fn scan(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage, ServiceFault>;
}
