use std::path::PathBuf;

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::list_tables::ListTablesError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use thiserror::Error;

pub(crate) const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Code and message pair reported by the remote service for a failed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ServiceFault {
    pub code: String,
    pub message: String,
}

impl ServiceFault {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_resource_not_found(&self) -> bool {
        self.code == RESOURCE_NOT_FOUND
    }

    /// Emits the diagnostic event for a failed operation and wraps the fault.
    pub(crate) fn logged(self, operation: &'static str, target: impl Into<String>) -> ForumError {
        let target = target.into();
        tracing::error!(
            operation,
            resource = %target,
            code = %self.code,
            reason = %self.message,
            "couldn't {operation} {target}"
        );
        ForumError::RemoteService {
            operation,
            target,
            fault: self,
        }
    }
}

#[derive(Error, Debug)]
pub enum ForumError {
    #[error("Couldn't {operation} {target}: {fault}")]
    RemoteService {
        operation: &'static str,
        target: String,
        #[source]
        fault: ServiceFault,
    },

    #[error("File {0} not found")]
    NotFound(PathBuf),

    #[error("No table selected, check for its existence or create it first")]
    NoTable,

    #[error("Timeout waiting for table {0} to become active")]
    TableActivationTimeout(String),

    #[error("Attribute parse error: {0}")]
    AttributeParseError(String),

    #[error("Error while deserializing resource: {0}")]
    ResourceDeserializeError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForumError {
    /// The service fault behind this error, if it came from the remote service.
    pub fn fault(&self) -> Option<&ServiceFault> {
        match self {
            ForumError::RemoteService { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

impl From<BuildError> for ServiceFault {
    fn from(value: BuildError) -> Self {
        ServiceFault::new("BuildError", value.to_string())
    }
}

macro_rules! impl_service_fault {
    ($t: ty) => {
        impl From<SdkError<$t>> for ServiceFault {
            fn from(value: SdkError<$t>) -> Self {
                match value.as_service_error() {
                    Some(service_error) => ServiceFault::new(
                        service_error.code().unwrap_or("Unknown"),
                        service_error
                            .message()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| service_error.to_string()),
                    ),
                    None => ServiceFault::new("Unknown", DisplayErrorContext(&value).to_string()),
                }
            }
        }
    };
}

impl_service_fault!(BatchWriteItemError);
impl_service_fault!(CreateTableError);
impl_service_fault!(DeleteItemError);
impl_service_fault!(DeleteTableError);
impl_service_fault!(DescribeTableError);
impl_service_fault!(GetItemError);
impl_service_fault!(ListTablesError);
impl_service_fault!(PutItemError);
impl_service_fault!(ScanError);
impl_service_fault!(UpdateItemError);
