use crate::backend::Backend;
use crate::{Forum, ForumError, Forums};

impl<B: Backend> Forums<B> {
    /// Retrieves a forum by name. If the forum does not exist returns Option::None.
    pub async fn get_forum(&self, name: &str) -> Result<Option<Forum>, ForumError> {
        let table = self.table_name()?;
        let item = self
            .backend
            .get_item(table, Self::key(name))
            .await
            .map_err(|fault| fault.logged("get forum", format!("{name} from table {table}")))?;

        match item {
            Some(item) => Ok(Some(Self::item_as_forum(&item)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{forum, forums_with_table};
    use crate::{ForumError, Forums, MemoryBackend, ServiceFault};

    #[tokio::test]
    async fn creates_and_gets_forum() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        let resource = forum("creates_and_gets_forum", 4, 2, 1000);

        forums.add_forum(&resource).await.unwrap();
        let retrieved = forums.get_forum(&resource.name).await.unwrap();
        assert_eq!(retrieved, Some(resource))
    }

    #[tokio::test]
    async fn missing_forum_is_none() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        assert_eq!(forums.get_forum("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_surfaces_service_faults() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        forums
            .backend()
            .fail_next(ServiceFault::new("ProvisionedThroughputExceededException", "slow down"));

        let err = forums.get_forum("any").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Couldn't get forum any from table Forum: ProvisionedThroughputExceededException: slow down"
        );
    }

    #[tokio::test]
    async fn get_without_table_fails() {
        let forums = Forums::new(MemoryBackend::new());
        assert!(matches!(
            forums.get_forum("any").await.unwrap_err(),
            ForumError::NoTable
        ));
    }
}
