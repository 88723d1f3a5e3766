use crate::backend::Backend;
use crate::{ForumError, Forums};

impl<B: Backend> Forums<B> {
    /// Deletes a forum by name. Deleting a forum that is not there is not an error.
    pub async fn delete_forum(&self, name: &str) -> Result<(), ForumError> {
        let table = self.table_name()?;
        self.backend
            .delete_item(table, Self::key(name))
            .await
            .map_err(|fault| {
                fault.logged("delete forum", format!("{name} from table {table}"))
            })?;

        tracing::debug!(table, forum = name, "deleted forum");
        Ok(())
    }
}
