use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::backend::Backend;
use crate::{Forum, ForumError, Forums, ServiceFault};

/// Most items a single batch write request may carry.
const BATCH_SIZE: usize = 25;

/// Requests per chunk before items the service keeps handing back are an error.
const MAX_BATCH_REQUESTS: u32 = 10;

impl<B: Backend> Forums<B> {
    /// Puts every forum in the current table with batch write requests,
    /// resubmitting whatever the service leaves unprocessed.
    pub async fn write_batch(&self, forums: &[Forum]) -> Result<(), ForumError> {
        let table = self.table_name()?;
        let items = forums
            .iter()
            .map(Self::forum_as_item)
            .collect::<Result<Vec<_>, _>>()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut pending = chunk.to_vec();
            let mut requests = 0;
            while !pending.is_empty() {
                if requests == MAX_BATCH_REQUESTS {
                    let fault = ServiceFault::new(
                        "UnprocessedItems",
                        format!("{} items still unprocessed", pending.len()),
                    );
                    return Err(fault.logged("load data into table", table));
                }
                pending = self
                    .backend
                    .batch_put(table, pending)
                    .await
                    .map_err(|fault| fault.logged("load data into table", table))?;
                requests += 1;
            }
        }

        tracing::info!(table, count = forums.len(), "wrote forums");
        Ok(())
    }
}

/// Reads a JSON array of forums, keeping numbers as exact decimals.
pub fn load_sample_data(path: impl AsRef<Path>) -> Result<Vec<Forum>, ForumError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::error!(
                path = %path.display(),
                "file not found, download the sample data first to run this demo"
            );
            return Err(ForumError::NotFound(path.to_path_buf()));
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "couldn't open sample data");
            return Err(err.into());
        }
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "couldn't read sample data");
        // A failing read surfaces through serde_json; keep it an IO error.
        if err.is_io() {
            ForumError::Io(err.into())
        } else {
            err.into()
        }
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rand::distributions::Alphanumeric;
    use rand::Rng;

    use super::load_sample_data;
    use crate::client::tests::{forum, forums_with_table};
    use crate::{ForumError, Forums, MemoryBackend};

    fn temp_json(contents: &str) -> PathBuf {
        let name: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(7)
            .map(char::from)
            .collect();
        let path = std::env::temp_dir().join(format!("forums-{name}.json"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_sample_data_with_exact_numbers() {
        let path = temp_json(
            r#"[
                {"Name": "Amazon DynamoDB", "Category": "Amazon Web Services", "Messages": 4, "Threads": 2, "Views": 1000000000000},
                {"Name": "Amazon S3", "Category": "Amazon Web Services", "Messages": 0.1, "Threads": 0, "Views": 12345678901234567890.5}
            ]"#,
        );

        let forums = load_sample_data(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(forums.len(), 2);
        assert_eq!(forums[0].views.to_string(), "1000000000000");
        assert_eq!(forums[1].messages.to_string(), "0.1");
        assert_eq!(forums[1].views.to_string(), "12345678901234567890.5");
    }

    #[test]
    fn loads_bundled_sample_file() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sampledata/Forum.json");
        let names: Vec<String> = load_sample_data(path)
            .unwrap()
            .into_iter()
            .map(|forum| forum.name)
            .collect();

        assert_eq!(names, vec!["Amazon DynamoDB", "SQL server"]);
    }

    #[test]
    fn missing_sample_file_is_not_found() {
        let err = load_sample_data("./definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ForumError::NotFound(path) if path.ends_with("here.json")));
    }

    #[test]
    fn malformed_sample_file_fails_to_deserialize() {
        let path = temp_json(r#"[{"Name": "no numbers"}]"#);
        let err = load_sample_data(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ForumError::ResourceDeserializeError(_)));
    }

    #[test]
    fn unreadable_sample_file_is_an_io_error() {
        let err = load_sample_data(std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, ForumError::Io(_)));
    }

    #[tokio::test]
    async fn writes_more_than_one_chunk() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        let records: Vec<_> = (0..30).map(|i| forum(&format!("f{i:02}"), i, i, i)).collect();

        forums.write_batch(&records).await.unwrap();

        assert_eq!(forums.backend().batch_calls(), 2);
        assert_eq!(forums.scan_forums().await.unwrap(), records);
    }

    #[tokio::test]
    async fn resubmits_unprocessed_items() {
        let forums = forums_with_table(MemoryBackend::new().with_batch_accept(4)).await;
        let records: Vec<_> = (0..10).map(|i| forum(&format!("f{i:02}"), i, i, i)).collect();

        forums.write_batch(&records).await.unwrap();

        assert_eq!(forums.backend().batch_calls(), 3);
        assert_eq!(forums.scan_forums().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn gives_up_when_nothing_is_processed() {
        let forums = forums_with_table(MemoryBackend::new().with_batch_accept(0)).await;

        let err = forums.write_batch(&[forum("f", 1, 1, 1)]).await.unwrap_err();

        assert_eq!(
            err.fault().map(|f| f.code.as_str()),
            Some("UnprocessedItems")
        );
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let forums = forums_with_table(MemoryBackend::new()).await;
        forums.write_batch(&[]).await.unwrap();
        assert_eq!(forums.backend().batch_calls(), 0);
    }

    #[tokio::test]
    async fn writing_without_a_table_fails() {
        let forums = Forums::new(MemoryBackend::new());
        let err = forums.write_batch(&[forum("f", 1, 1, 1)]).await.unwrap_err();
        assert!(matches!(err, ForumError::NoTable));
    }
}
