use crate::backend::Backend;
use crate::{Forum, ForumError, Forums};

impl<B: Backend> Forums<B> {
    /// Puts the forum in the table, replacing any forum with the same name.
    pub async fn add_forum(&self, forum: &Forum) -> Result<(), ForumError> {
        let table = self.table_name()?;
        let item = Self::forum_as_item(forum)?;

        self.backend.put_item(table, item).await.map_err(|fault| {
            fault.logged("add forum", format!("{} to table {table}", forum.name))
        })?;

        tracing::debug!(table, forum = %forum.name, "added forum");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{forum, forums_with_table, remote_parts};
    use crate::{MemoryBackend, ServiceFault};

    #[tokio::test]
    async fn overwrites_existing_forum() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        forums.add_forum(&forum("SQL server", 1, 1, 10)).await.unwrap();

        let replacement = forum("SQL server", 4, 2, 1000);
        forums.add_forum(&replacement).await.unwrap();

        assert_eq!(
            forums.get_forum("SQL server").await.unwrap(),
            Some(replacement)
        );
        assert_eq!(forums.scan_forums().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_surfaces_service_faults() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        forums
            .backend()
            .fail_next(ServiceFault::new("ValidationException", "item too large"));

        let err = forums.add_forum(&forum("SQL server", 4, 2, 1000)).await.unwrap_err();

        assert_eq!(
            remote_parts(&err),
            ("add forum", "SQL server to table Forum", "ValidationException")
        );
        assert_eq!(forums.get_forum("SQL server").await.unwrap(), None);
    }
}
