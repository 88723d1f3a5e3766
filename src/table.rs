use std::time::Duration;

use aws_sdk_dynamodb::types::TableStatus;

use crate::backend::{Backend, TableSpec};
use crate::client::{TableHandle, PK};
use crate::{ForumError, Forums};

#[derive(Debug, Clone)]
pub struct CreateTableOptions {
    pub read_capacity: i64,
    pub write_capacity: i64,
    /// Delay between two status checks while waiting for a new table.
    pub poll_interval: Duration,
    /// Status checks before giving up on a table that never turns active.
    pub max_polls: u32,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self {
            read_capacity: 10,
            write_capacity: 5,
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
        }
    }
}

impl<B: Backend> Forums<B> {
    /// Whether the table exists. On success it becomes the table every other
    /// operation works on.
    pub async fn exists(&mut self, name: &str) -> Result<bool, ForumError> {
        match self.backend.describe_table(name).await {
            Ok(status) => {
                self.table = Some(TableHandle {
                    name: name.to_string(),
                    status,
                });
                Ok(true)
            }
            Err(fault) if fault.is_resource_not_found() => Ok(false),
            Err(fault) => Err(fault.logged("check for existence of", name)),
        }
    }

    /// Creates the forum table, keyed by `Name`, and waits until it is active.
    pub async fn create_table(&mut self, name: &str) -> Result<TableHandle, ForumError> {
        let spec = TableSpec {
            name: name.to_string(),
            partition_key: PK.to_string(),
            read_capacity: self.options.read_capacity,
            write_capacity: self.options.write_capacity,
        };

        self.backend
            .create_table(&spec)
            .await
            .map_err(|fault| fault.logged("create table", name))?;

        let handle = self.wait_until_active(name).await?;
        tracing::info!(table = name, "created table");
        self.table = Some(handle.clone());
        Ok(handle)
    }

    async fn wait_until_active(&self, name: &str) -> Result<TableHandle, ForumError> {
        for _ in 0..self.options.max_polls {
            match self.backend.describe_table(name).await {
                Ok(TableStatus::Active) => {
                    return Ok(TableHandle {
                        name: name.to_string(),
                        status: TableStatus::Active,
                    })
                }
                Ok(status) => tracing::debug!(table = name, ?status, "waiting for table"),
                // A freshly created table may not be visible yet.
                Err(fault) if fault.is_resource_not_found() => {}
                Err(fault) => return Err(fault.logged("create table", name)),
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }

        Err(ForumError::TableActivationTimeout(name.to_string()))
    }

    /// Drops the current table and forgets it.
    pub async fn delete_table(&mut self) -> Result<(), ForumError> {
        let name = self.table_name()?.to_string();
        self.backend
            .delete_table(&name)
            .await
            .map_err(|fault| fault.logged("delete table", name.as_str()))?;
        tracing::info!(table = %name, "deleted table");
        self.table = None;
        Ok(())
    }

    /// Names of every table visible to the backend.
    pub async fn list_tables(&self) -> Result<Vec<String>, ForumError> {
        self.backend
            .list_tables()
            .await
            .map_err(|fault| fault.logged("list tables", "in account"))
    }
}
