//! Resilient executor with retry, timeout, validation and failover.
//!
//! The executor owns a primary slot and an optional fallback slot. Every
//! operation is attempted on the primary up to `max_retries` times, with
//! exponential backoff between attempts and a timeout around each attempt.
//! Each successful result is validated before it is accepted. Once the
//! primary's attempts are exhausted the same procedure runs on the fallback.

use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use tandem_core::{
    BackendKind, BackendStatus, CountTokensRequest, CountTokensResponse, EmbedContentRequest,
    EmbedContentResponse, ExecutorConfig, ExecutorStatus, GenerateContentRequest,
    GenerateContentResponse,
};

use crate::error::GenerateError;
use crate::generator::{ContentGenerator, ContentStream, GeneratorFactory};
use crate::retry::RetryStrategy;
use crate::validation::Validate;

// ============================================================================
// Slot
// ============================================================================

/// A backend identity and the generator built for it, if construction succeeded.
struct Slot {
    kind: BackendKind,
    generator: Option<Arc<dyn ContentGenerator>>,
}

impl Slot {
    fn status(&self) -> BackendStatus {
        BackendStatus::new(self.kind, self.generator.is_some())
    }
}

// ============================================================================
// Resilient Executor
// ============================================================================

/// Runs content operations against a primary generator with failover.
pub struct ResilientExecutor {
    primary: Slot,
    fallback: Option<Slot>,
    config: ExecutorConfig,
    retry: RetryStrategy,
}

impl ResilientExecutor {
    /// Creates an executor from already-built generators.
    ///
    /// A `None` generator marks its slot unavailable. The fallback slot
    /// exists only when the configuration enables one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a generator's
    /// kind does not match the slot it is placed in.
    pub fn new(
        primary_kind: BackendKind,
        primary: Option<Arc<dyn ContentGenerator>>,
        fallback: Option<Arc<dyn ContentGenerator>>,
        config: ExecutorConfig,
    ) -> Result<Self, GenerateError> {
        config.validate(primary_kind)?;

        if let Some(generator) = &primary {
            if generator.kind() != primary_kind {
                return Err(GenerateError::Config(format!(
                    "primary generator is {}, expected {primary_kind}",
                    generator.kind()
                )));
            }
        }

        let fallback = match (config.active_fallback(), fallback) {
            (Some(kind), generator) => {
                if let Some(g) = &generator {
                    if g.kind() != kind {
                        return Err(GenerateError::Config(format!(
                            "fallback generator is {}, expected {kind}",
                            g.kind()
                        )));
                    }
                }
                Some(Slot { kind, generator })
            }
            (None, Some(g)) => {
                return Err(GenerateError::Config(format!(
                    "fallback generator {} supplied but fallback is not enabled",
                    g.kind()
                )));
            }
            (None, None) => None,
        };

        let retry = RetryStrategy::from_config(&config);

        Ok(Self {
            primary: Slot {
                kind: primary_kind,
                generator: primary,
            },
            fallback,
            config,
            retry,
        })
    }

    /// Builds the primary and fallback generators through a factory.
    ///
    /// The fallback is constructed eagerly. If only the fallback fails to
    /// build, the executor starts with that slot unavailable. If the primary
    /// fails and a fallback is enabled, the executor starts on the fallback
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or the primary
    /// fails to build and no fallback could take its place. In that case the
    /// primary's construction error is returned.
    #[instrument(skip(config, factory), fields(primary = %primary_kind))]
    pub async fn initialize(
        primary_kind: BackendKind,
        config: ExecutorConfig,
        factory: &dyn GeneratorFactory,
    ) -> Result<Self, GenerateError> {
        config.validate(primary_kind)?;
        let fallback_kind = config.active_fallback();

        let primary = match factory.create(primary_kind).await {
            Ok(generator) => Some(generator),
            Err(e) => {
                let Some(fallback_kind) = fallback_kind else {
                    return Err(e);
                };
                warn!(
                    backend = %primary_kind,
                    error = %e,
                    "Primary generator unavailable, trying fallback"
                );
                match factory.create(fallback_kind).await {
                    Ok(generator) => {
                        info!(backend = %fallback_kind, "Running on fallback generator only");
                        return Self::new(primary_kind, None, Some(generator), config);
                    }
                    Err(fallback_error) => {
                        warn!(
                            backend = %fallback_kind,
                            error = %fallback_error,
                            "Fallback generator unavailable"
                        );
                        return Err(e);
                    }
                }
            }
        };

        let fallback = match fallback_kind {
            Some(kind) => match factory.create(kind).await {
                Ok(generator) => Some(generator),
                Err(e) => {
                    warn!(backend = %kind, error = %e, "Fallback generator unavailable");
                    None
                }
            },
            None => None,
        };

        Self::new(primary_kind, primary, fallback, config)
    }

    /// Reports which backends are configured and usable.
    pub fn status(&self) -> ExecutorStatus {
        ExecutorStatus {
            primary: self.primary.status(),
            fallback: self.fallback.as_ref().map(Slot::status),
        }
    }

    /// Returns the executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Generates a complete response.
    ///
    /// # Errors
    ///
    /// Returns the final error of the only usable backend, or
    /// [`GenerateError::AllBackendsFailed`] when both backends were tried.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateError> {
        self.run("generate_content", |generator| async move {
            generator.generate_content(request).await
        })
        .await
    }

    /// Opens a stream of partial responses.
    ///
    /// Retry and failover apply to opening the stream. Errors after the
    /// first fragment are delivered through the stream itself.
    ///
    /// # Errors
    ///
    /// Same as [`ResilientExecutor::generate_content`].
    pub async fn generate_content_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ContentStream, GenerateError> {
        self.run("generate_content_stream", |generator| async move {
            generator.generate_content_stream(request).await
        })
        .await
    }

    /// Counts tokens.
    ///
    /// # Errors
    ///
    /// Same as [`ResilientExecutor::generate_content`].
    pub async fn count_tokens(
        &self,
        request: &CountTokensRequest,
    ) -> Result<CountTokensResponse, GenerateError> {
        self.run("count_tokens", |generator| async move {
            generator.count_tokens(request).await
        })
        .await
    }

    /// Produces an embedding.
    ///
    /// # Errors
    ///
    /// Same as [`ResilientExecutor::generate_content`].
    pub async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, GenerateError> {
        self.run("embed_content", |generator| async move {
            generator.embed_content(request).await
        })
        .await
    }

    // ========================================================================
    // Failover & retry
    // ========================================================================

    async fn run<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, GenerateError>
    where
        T: Validate,
        F: Fn(Arc<dyn ContentGenerator>) -> Fut,
        Fut: Future<Output = Result<T, GenerateError>>,
    {
        let primary = self.primary.generator.as_ref();
        let fallback = self.fallback.as_ref().and_then(|s| s.generator.as_ref());

        match (primary, fallback) {
            (None, None) => Err(GenerateError::NoGeneratorAvailable),
            (Some(generator), None) | (None, Some(generator)) => {
                self.execute_with_retry(generator, operation, &op).await
            }
            (Some(primary), Some(fallback)) => {
                let primary_error = match self.execute_with_retry(primary, operation, &op).await {
                    Ok(value) => return Ok(value),
                    Err(e) => e,
                };

                warn!(
                    operation,
                    primary = %primary.kind(),
                    fallback = %fallback.kind(),
                    error = %primary_error,
                    "Primary exhausted, switching to fallback"
                );

                match self.execute_with_retry(fallback, operation, &op).await {
                    Ok(value) => Ok(value),
                    Err(fallback_error) => Err(GenerateError::AllBackendsFailed {
                        primary: Box::new(primary_error),
                        fallback: Box::new(fallback_error),
                    }),
                }
            }
        }
    }

    /// Runs one operation on one generator until it succeeds or the attempt
    /// budget is spent, returning the last attempt's error on exhaustion.
    async fn execute_with_retry<T, F, Fut>(
        &self,
        generator: &Arc<dyn ContentGenerator>,
        operation: &'static str,
        op: &F,
    ) -> Result<T, GenerateError>
    where
        T: Validate,
        F: Fn(Arc<dyn ContentGenerator>) -> Fut,
        Fut: Future<Output = Result<T, GenerateError>>,
    {
        let backend = generator.kind();
        let max_attempts = self.retry.max_attempts;
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            debug!(%backend, operation, attempt, max_attempts, "Executing attempt");

            let result = match self.config.timeout() {
                Some(limit) => tokio::time::timeout(limit, op(Arc::clone(generator)))
                    .await
                    .unwrap_or(Err(GenerateError::Timeout(limit))),
                None => op(Arc::clone(generator)).await,
            };

            let result = result.and_then(|value| {
                value.validate()?;
                Ok(value)
            });

            match result {
                Ok(value) => {
                    debug!(
                        %backend,
                        operation,
                        attempt,
                        elapsed = ?started.elapsed(),
                        "Attempt succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => {
                    warn!(
                        %backend,
                        operation,
                        attempt,
                        max_attempts,
                        error = %error,
                        elapsed = ?started.elapsed(),
                        "Attempt failed"
                    );

                    if attempt >= max_attempts {
                        return Err(error);
                    }

                    let delay = self.retry.delay_for_attempt(attempt);
                    debug!(%backend, delay = ?delay, "Backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
