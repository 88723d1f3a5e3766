use crate::backend::Backend;
use crate::{Forum, ForumError, Forums};

impl<B: Backend> Forums<B> {
    /// Reads every forum in the table, following continuation keys until the
    /// service stops returning one. Order is whatever the service returns.
    pub async fn scan_forums(&self) -> Result<Vec<Forum>, ForumError> {
        let table = self.table_name()?;
        let mut results = vec![];
        let mut start_key = None;

        loop {
            let page = self
                .backend
                .scan(table, start_key)
                .await
                .map_err(|fault| fault.logged("scan for forums in", table))?;

            for item in page.items.iter() {
                results.push(Self::item_as_forum(item)?);
            }

            start_key = page.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::client::tests::{forum, forums_with_table};
    use crate::{MemoryBackend, ServiceFault};

    #[tokio::test]
    async fn scans_every_page() {
        for page_size in [1, 2, 3, 7, 100] {
            let forums = forums_with_table(MemoryBackend::new().with_page_size(page_size)).await;
            let records: Vec<_> = (0..7).map(|i| forum(&format!("forum {i}"), i, i, i)).collect();
            forums.write_batch(&records).await.unwrap();

            let scanned: BTreeSet<String> = forums
                .scan_forums()
                .await
                .unwrap()
                .into_iter()
                .map(|forum| forum.name)
                .collect();
            let expected: BTreeSet<String> = records.into_iter().map(|forum| forum.name).collect();

            assert_eq!(scanned, expected, "page size {page_size}");
        }
    }

    #[tokio::test]
    async fn stops_after_the_last_page() {
        let forums = forums_with_table(MemoryBackend::new().with_page_size(2)).await;
        let records: Vec<_> = (0..4).map(|i| forum(&format!("forum {i}"), i, i, i)).collect();
        forums.write_batch(&records).await.unwrap();

        forums.scan_forums().await.unwrap();
        assert_eq!(forums.backend().scan_calls(), 2);
    }

    #[tokio::test]
    async fn scanning_an_empty_table_returns_nothing() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        assert!(forums.scan_forums().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_fails_on_service_fault() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        forums
            .backend()
            .fail_next(ServiceFault::new("InternalServerError", "try later"));

        let err = forums.scan_forums().await.unwrap_err();
        assert_eq!(err.fault().map(|f| f.code.as_str()), Some("InternalServerError"));
    }
}
