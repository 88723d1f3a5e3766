use async_trait::async_trait;
use aws_config::{BehaviorVersion, ConfigLoader, Region};
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, PutRequest, ReturnValue,
    ScalarAttributeType, TableStatus, WriteRequest,
};

use crate::backend::{Backend, Item, ScanPage, TableSpec};
use crate::{Config, ServiceFault};

const LOCAL_ENDPOINT: &str = "http://localhost:8000";

/// Backend that holds the connection to DynamoDB.
#[derive(Clone, Debug)]
pub struct DynamoBackend {
    pub(crate) client: aws_sdk_dynamodb::Client,
}

impl DynamoBackend {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }

    /// Talks to DynamoDB in the region given by `AWS_REGION` (or the
    /// default), with credentials from the default provider chain.
    pub async fn aws() -> Self {
        Self::from_config(&Config {
            endpoint_url: None,
            ..Config::from_env()
        })
        .await
    }

    /// Talks to dynamodb-local on port 8000, as started by
    /// `docker run -p 8000:8000 amazon/dynamodb-local`. dynamodb-local accepts
    /// any credentials, so fixed placeholder ones are used.
    pub async fn local() -> Self {
        let cfg = loader(&Config {
            endpoint_url: Some(LOCAL_ENDPOINT.to_string()),
            ..Config::default()
        })
        .credentials_provider(Credentials::new("local", "local", None, None, "dynamodb-local"))
        .load()
        .await;
        Self::new(aws_sdk_dynamodb::Client::new(&cfg))
    }

    /// Build a backend for the region and optional endpoint in `config`,
    /// taking credentials from the default provider chain.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(aws_sdk_dynamodb::Client::new(&loader(config).load().await))
    }
}

fn loader(config: &Config) -> ConfigLoader {
    let loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
    match &config.endpoint_url {
        Some(endpoint) => loader.endpoint_url(endpoint),
        None => loader,
    }
}

#[async_trait]
impl Backend for DynamoBackend {
    async fn describe_table(&self, name: &str) -> Result<TableStatus, ServiceFault> {
        let output = self.client.describe_table().table_name(name).send().await?;

        output
            .table
            .and_then(|table| table.table_status)
            .ok_or_else(|| ServiceFault::new("Unknown", format!("no status reported for {name}")))
    }

    async fn create_table(&self, spec: &TableSpec) -> Result<(), ServiceFault> {
        let pk = AttributeDefinition::builder()
            .attribute_name(&spec.partition_key)
            .attribute_type(ScalarAttributeType::S)
            .build()?;

        let ks_pk = KeySchemaElement::builder()
            .attribute_name(&spec.partition_key)
            .key_type(KeyType::Hash)
            .build()?;

        let pt = ProvisionedThroughput::builder()
            .read_capacity_units(spec.read_capacity)
            .write_capacity_units(spec.write_capacity)
            .build()?;

        self.client
            .create_table()
            .table_name(&spec.name)
            .attribute_definitions(pk)
            .key_schema(ks_pk)
            .provisioned_throughput(pt)
            .send()
            .await?;

        Ok(())
    }

    async fn delete_table(&self, name: &str) -> Result<(), ServiceFault> {
        self.client.delete_table().table_name(name).send().await?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>, ServiceFault> {
        let mut names = vec![];
        let mut start = None;

        loop {
            let output = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(start)
                .send()
                .await?;

            names.extend(output.table_names.unwrap_or_default());

            start = output.last_evaluated_table_name;
            if start.is_none() {
                break;
            }
        }

        Ok(names)
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), ServiceFault> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await?;
        Ok(())
    }

    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, ServiceFault> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await?;
        Ok(output.item)
    }

    async fn update_item(
        &self,
        table: &str,
        key: Item,
        changes: Item,
    ) -> Result<Option<Item>, ServiceFault> {
        if changes.is_empty() {
            return self.get_item(table, key).await;
        }

        let mut builder = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .return_values(ReturnValue::AllOld);

        let mut update_expression = "set ".to_string();
        let changes_len = changes.len();
        for (i, (k, v)) in changes.into_iter().enumerate() {
            let name = format!("#updateAttr{}", i);
            let value = format!(":updateAttr{}", i);
            update_expression += &format!("{} = {}", name, value);
            if i < changes_len - 1 {
                update_expression += ", "
            }
            builder = builder.expression_attribute_names(name, k);
            builder = builder.expression_attribute_values(value, v);
        }

        let output = builder.update_expression(update_expression).send().await?;
        Ok(output.attributes)
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), ServiceFault> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await?;
        Ok(())
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<Vec<Item>, ServiceFault> {
        let mut requests = Vec::with_capacity(items.len());
        for item in items {
            let put = PutRequest::builder().set_item(Some(item)).build()?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }

        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await?;

        let unprocessed = output
            .unprocessed_items
            .and_then(|mut by_table| by_table.remove(table))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|request| request.put_request)
            .map(|put| put.item)
            .collect();

        Ok(unprocessed)
    }

    async fn scan(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage, ServiceFault> {
        let output = self
            .client
            .scan()
            .table_name(table)
            .set_exclusive_start_key(start_key)
            .send()
            .await?;

        Ok(ScanPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }
}
