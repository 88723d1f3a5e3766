use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, TableStatus};

use crate::backend::{Backend, Item, ScanPage, TableSpec};
use crate::errors::RESOURCE_NOT_FOUND;
use crate::ServiceFault;

const BATCH_WRITE_LIMIT: usize = 25;

struct MemoryTable {
    partition_key: String,
    items: BTreeMap<String, Item>,
    /// Describes still answered with not found, then with `Creating`.
    unseen_describes: usize,
    creating_describes: usize,
}

impl MemoryTable {
    fn key_of(&self, item: &Item) -> Result<String, ServiceFault> {
        match item.get(&self.partition_key) {
            Some(AttributeValue::S(key)) => Ok(key.clone()),
            _ => Err(ServiceFault::new(
                "ValidationException",
                "The provided key element does not match the schema",
            )),
        }
    }
}

/// In-process stand-in for the storage service.
///
/// Tables are ordered maps, so scans come back sorted by key. Page size and the
/// number of items a batch request accepts can be lowered to exercise
/// pagination and unprocessed items. New tables are active right away unless
/// a visibility or activation delay is set.
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, MemoryTable>>,
    page_size: usize,
    batch_accept: usize,
    visibility_delay: usize,
    activation_delay: usize,
    pending_fault: Mutex<Option<ServiceFault>>,
    scan_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    describe_calls: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            page_size: 100,
            batch_accept: BATCH_WRITE_LIMIT,
            visibility_delay: 0,
            activation_delay: 0,
            pending_fault: Mutex::new(None),
            scan_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of items returned by one scan request.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Maximum number of items one batch request stores; the rest come back unprocessed.
    pub fn with_batch_accept(mut self, batch_accept: usize) -> Self {
        self.batch_accept = batch_accept;
        self
    }

    /// Number of describes a new table stays invisible for, as if it had not
    /// been created yet.
    pub fn with_visibility_delay(mut self, describes: usize) -> Self {
        self.visibility_delay = describes;
        self
    }

    /// Number of describes a new table reports `Creating` for once visible.
    pub fn with_activation_delay(mut self, describes: usize) -> Self {
        self.activation_delay = describes;
        self
    }

    /// Makes the next request fail with `fault`.
    pub fn fail_next(&self, fault: ServiceFault) {
        *lock(&self.pending_fault) = Some(fault);
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    fn check_fault(&self) -> Result<(), ServiceFault> {
        match lock(&self.pending_fault).take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn with_table<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut MemoryTable) -> Result<T, ServiceFault>,
    ) -> Result<T, ServiceFault> {
        self.check_fault()?;
        let mut tables = lock(&self.tables);
        let table = tables.get_mut(name).ok_or_else(not_found)?;
        f(table)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found() -> ServiceFault {
    ServiceFault::new(RESOURCE_NOT_FOUND, "Requested resource not found")
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn describe_table(&self, name: &str) -> Result<TableStatus, ServiceFault> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.with_table(name, |table| {
            if table.unseen_describes > 0 {
                table.unseen_describes -= 1;
                return Err(not_found());
            }
            if table.creating_describes > 0 {
                table.creating_describes -= 1;
                return Ok(TableStatus::Creating);
            }
            Ok(TableStatus::Active)
        })
    }

    async fn create_table(&self, spec: &TableSpec) -> Result<(), ServiceFault> {
        self.check_fault()?;
        let mut tables = lock(&self.tables);
        if tables.contains_key(&spec.name) {
            return Err(ServiceFault::new(
                "ResourceInUseException",
                format!("Table already exists: {}", spec.name),
            ));
        }
        tables.insert(
            spec.name.clone(),
            MemoryTable {
                partition_key: spec.partition_key.clone(),
                items: BTreeMap::new(),
                unseen_describes: self.visibility_delay,
                creating_describes: self.activation_delay,
            },
        );
        Ok(())
    }

    async fn delete_table(&self, name: &str) -> Result<(), ServiceFault> {
        self.check_fault()?;
        lock(&self.tables)
            .remove(name)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn list_tables(&self) -> Result<Vec<String>, ServiceFault> {
        self.check_fault()?;
        let mut names: Vec<String> = lock(&self.tables).keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), ServiceFault> {
        self.with_table(table, |table| {
            let key = table.key_of(&item)?;
            table.items.insert(key, item);
            Ok(())
        })
    }

    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, ServiceFault> {
        self.with_table(table, |table| {
            let key = table.key_of(&key)?;
            Ok(table.items.get(&key).cloned())
        })
    }

    async fn update_item(
        &self,
        table: &str,
        key: Item,
        changes: Item,
    ) -> Result<Option<Item>, ServiceFault> {
        self.with_table(table, |table| {
            let pk = table.key_of(&key)?;
            if changes.contains_key(&table.partition_key) {
                return Err(ServiceFault::new(
                    "ValidationException",
                    "Cannot update attribute that is part of the key",
                ));
            }
            let old = table.items.get(&pk).cloned();
            let entry = table.items.entry(pk).or_insert(key);
            entry.extend(changes);
            Ok(old)
        })
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), ServiceFault> {
        self.with_table(table, |table| {
            let key = table.key_of(&key)?;
            table.items.remove(&key);
            Ok(())
        })
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<Vec<Item>, ServiceFault> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let accept = self.batch_accept;
        self.with_table(table, |table| {
            if items.len() > BATCH_WRITE_LIMIT {
                return Err(ServiceFault::new(
                    "ValidationException",
                    "Too many items requested for the BatchWriteItem call",
                ));
            }
            let mut unprocessed = vec![];
            for (i, item) in items.into_iter().enumerate() {
                if i < accept {
                    let key = table.key_of(&item)?;
                    table.items.insert(key, item);
                } else {
                    unprocessed.push(item);
                }
            }
            Ok(unprocessed)
        })
    }

    async fn scan(&self, table: &str, start_key: Option<Item>) -> Result<ScanPage, ServiceFault> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let page_size = self.page_size;
        self.with_table(table, |table| {
            let lower = match &start_key {
                Some(start) => Bound::Excluded(table.key_of(start)?),
                None => Bound::Unbounded,
            };
            let mut remaining = table.items.range((lower, Bound::Unbounded));
            let items: Vec<Item> = remaining
                .by_ref()
                .take(page_size)
                .map(|(_, item)| item.clone())
                .collect();

            let last_evaluated_key = match (remaining.next(), items.last()) {
                (Some(_), Some(last)) => {
                    let key = table.key_of(last)?;
                    Some(HashMap::from([(
                        table.partition_key.clone(),
                        AttributeValue::S(key),
                    )]))
                }
                _ => None,
            };

            Ok(ScanPage {
                items,
                last_evaluated_key,
            })
        })
    }
}
