//! Hand-off from a resolved task to the execution engine.

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::schema::{ValidatedConfig, EXTRACTOR, SINKER, URL};
use crate::config::validation::ValidationError;
use crate::task::resolver::TaskType;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} cancelled before completion")]
    Cancelled(TaskType),

    #[error("{task_type} failed: {reason}")]
    Failed { task_type: TaskType, reason: String },
}

/// An engine able to run a resolved task.
///
/// Implementations should stop early once `cancel` fires and report
/// [`DispatchError::Cancelled`].
pub trait TaskExecutor: Send + Sync {
    fn execute(
        &self,
        task_type: TaskType,
        config: &ValidatedConfig,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Both connection descriptors must be non-empty.
pub fn check_connections(config: &ValidatedConfig) -> Result<(), ValidationError> {
    for (section, url) in [(EXTRACTOR, &config.extractor.url), (SINKER, &config.sinker.url)] {
        if url.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                section,
                field: URL,
            });
        }
    }
    Ok(())
}

/// Checks preconditions then forwards to a [`TaskExecutor`].
pub struct Dispatcher<E> {
    executor: E,
}

impl<E: TaskExecutor> Dispatcher<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn dispatch(
        &self,
        task_type: TaskType,
        config: &ValidatedConfig,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        check_connections(config)?;

        if cancel.is_cancelled() {
            tracing::warn!(task_type = %task_type, "Shutdown already requested, not starting task");
            return Err(DispatchError::Cancelled(task_type));
        }

        tracing::info!(task_type = %task_type, "Dispatching task");
        self.executor.execute(task_type, config, cancel).await?;
        tracing::info!(task_type = %task_type, "Task finished");
        Ok(())
    }
}

/// Executor that logs the execution plan without moving any data.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingExecutor;

impl TaskExecutor for LoggingExecutor {
    async fn execute(
        &self,
        task_type: TaskType,
        config: &ValidatedConfig,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled(task_type));
        }

        tracing::info!(
            task_type = %task_type,
            source = %config.extractor.db_type,
            target = %config.sinker.db_type,
            parallel_type = %config.parallelizer.parallel_type,
            parallel_size = config.parallelizer.parallel_size,
            batch_size = config.sinker.batch_size,
            pipeline_type = %config.pipeline.pipeline_type,
            "Execution plan"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::config::ini::ConfigTree;
    use crate::config::validation::validate_config;

    #[derive(Clone, Default)]
    struct CountingExecutor {
        calls: Arc<AtomicUsize>,
    }

    impl TaskExecutor for CountingExecutor {
        async fn execute(
            &self,
            _task_type: TaskType,
            _config: &ValidatedConfig,
            _cancel: CancellationToken,
        ) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(source_url: &str, target_url: &str) -> ValidatedConfig {
        let text = format!(
            "[extractor]\ndb_type=mysql\nextract_type=cdc\nurl={source_url}\n\
             [sinker]\ndb_type=mysql\nsink_type=write\nurl={target_url}\n\
             [runtime]\n[parallelizer]\n[pipeline]\n[filter]\n[router]\n[resumer]\n"
        );
        validate_config(&ConfigTree::parse(&text).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_reaches_executor() {
        let executor = CountingExecutor::default();
        let dispatcher = Dispatcher::new(executor.clone());
        dispatcher
            .dispatch(TaskType::CdcReplication, &config("mysql://a", "mysql://b"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_url_fails_before_execution() {
        let executor = CountingExecutor::default();
        let dispatcher = Dispatcher::new(executor.clone());
        let err = dispatcher
            .dispatch(TaskType::CdcReplication, &config("mysql://a", ""), CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DispatchError::Validation(e) => {
                assert_eq!(e.section(), "sinker");
                assert_eq!(e.field(), "url");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_refuses_to_start() {
        let executor = CountingExecutor::default();
        let dispatcher = Dispatcher::new(executor.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = dispatcher
            .dispatch(TaskType::CdcReplication, &config("mysql://a", "mysql://b"), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Cancelled(TaskType::CdcReplication)));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_logging_executor_succeeds() {
        let dispatcher = Dispatcher::new(LoggingExecutor);
        assert!(dispatcher
            .dispatch(TaskType::CdcReplication, &config("mysql://a", "mysql://b"), CancellationToken::new())
            .await
            .is_ok());
    }
}
