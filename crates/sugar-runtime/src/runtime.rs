//! The event loop that feeds interactions to the dispatcher.
//!
//! A platform integration pushes every incoming interaction into a bounded
//! channel. [`SugarRuntime::run`] drains that channel and spawns one tokio
//! task per interaction, so a slow handler never holds up the next event and
//! dispatches complete in whatever order they finish.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sugar_runtime::SugarRuntime;
//!
//! let runtime = SugarRuntime::builder().build(registry)?;
//! let (sender, receiver) = runtime.channel();
//!
//! // Hand `sender` to the platform integration
//! tokio::spawn(gateway.forward_into(sender));
//!
//! // Runs until the channel closes, Ctrl+C, or `shutdown_token().cancel()`
//! runtime.run(receiver).await?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, SugarConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use sugar_core::BoxedInteraction;
use sugar_framework::{DispatchOutcome, Dispatcher, Registry};

/// Sending half of the interaction channel.
pub type InteractionSender = mpsc::Sender<BoxedInteraction>;

/// Receiving half of the interaction channel.
pub type InteractionReceiver = mpsc::Receiver<BoxedInteraction>;

/// Runs a [`Dispatcher`] over a stream of interactions.
pub struct SugarRuntime {
    config: SugarConfig,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
    counters: Arc<Counters>,
    running: AtomicBool,
}

impl SugarRuntime {
    /// Creates a runtime from configuration and a finished registry.
    ///
    /// Initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn new(config: SugarConfig, registry: Registry) -> Self {
        logging::init_from_config(&config.logging);

        let dispatcher = Dispatcher::builder(registry)
            .options(config.dispatch.to_options())
            .build();

        info!(
            log_level = %config.logging.level,
            handlers = dispatcher.registry().len(),
            channel_capacity = config.runtime.channel_capacity,
            "Runtime initialized from configuration"
        );

        Self {
            config,
            dispatcher,
            shutdown: CancellationToken::new(),
            counters: Arc::new(Counters::default()),
            running: AtomicBool::new(false),
        }
    }

    /// Creates a runtime builder that loads configuration from files and
    /// the environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SugarConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns a token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Returns whether the event loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns a snapshot of the outcome counters.
    pub fn stats(&self) -> RuntimeStats {
        self.counters.snapshot()
    }

    /// Creates a channel sized by `runtime.channel_capacity`.
    pub fn channel(&self) -> (InteractionSender, InteractionReceiver) {
        mpsc::channel(self.config.runtime.channel_capacity.max(1))
    }

    /// Dispatches a single interaction on the current task.
    pub async fn dispatch(&self, interaction: BoxedInteraction) -> DispatchOutcome {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let outcome = self.dispatcher.dispatch(interaction).await;
        self.counters.record(&outcome);
        outcome
    }

    /// Runs the event loop.
    ///
    /// Returns once the channel is closed and drained, the shutdown token is
    /// cancelled, or Ctrl+C is received. In-flight dispatches are awaited
    /// before returning.
    pub async fn run(&self, mut receiver: InteractionReceiver) -> RuntimeResult<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }

        info!("Sugar runtime is now running");

        let ctrl_c = wait_for_ctrl_c(self.config.runtime.handle_ctrl_c);
        tokio::pin!(ctrl_c);

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, shutting down");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(interaction) => self.spawn_dispatch(&mut tasks, interaction),
                    None => {
                        debug!("Interaction channel closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch task failed");
                    }
                }
            }
        }

        receiver.close();
        if !tasks.is_empty() {
            debug!(in_flight = tasks.len(), "Waiting for in-flight dispatches");
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Dispatch task failed");
            }
        }

        self.running.store(false, Ordering::Release);
        info!(stats = %self.stats(), "Runtime stopped");
        Ok(())
    }

    fn spawn_dispatch(&self, tasks: &mut JoinSet<()>, interaction: BoxedInteraction) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let dispatcher = self.dispatcher.clone();
        let counters = Arc::clone(&self.counters);
        tasks.spawn(async move {
            let outcome = dispatcher.dispatch(interaction).await;
            counters.record(&outcome);
        });
    }
}

impl fmt::Debug for SugarRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SugarRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn wait_for_ctrl_c(enabled: bool) {
    if enabled {
        match signal::ctrl_c().await {
            Ok(()) => return,
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
    }
    std::future::pending::<()>().await
}

// =============================================================================
// Stats
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    completed: AtomicU64,
    stopped: AtomicU64,
    not_found: AtomicU64,
    failed: AtomicU64,
    ignored: AtomicU64,
    autocomplete: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Completed => &self.completed,
            DispatchOutcome::Stopped { .. } => &self.stopped,
            DispatchOutcome::NotFound { .. } => &self.not_found,
            DispatchOutcome::Failed(_) => &self.failed,
            DispatchOutcome::Ignored => &self.ignored,
            DispatchOutcome::AutocompleteHandled | DispatchOutcome::AutocompleteUnsupported => {
                &self.autocomplete
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            received: self.received.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            stopped: self.stopped.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            autocomplete: self.autocomplete.load(Ordering::Relaxed),
        }
    }
}

/// Outcome counts since the runtime was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Interactions accepted for dispatch.
    pub received: u64,
    /// Dispatches whose handler succeeded.
    pub completed: u64,
    /// Dispatches stopped by a middleware.
    pub stopped: u64,
    /// Lookup misses.
    pub not_found: u64,
    /// Middleware, handler or autocomplete failures.
    pub failed: u64,
    /// Interactions of an unrouted kind.
    pub ignored: u64,
    /// Autocomplete requests, answered or not.
    pub autocomplete: u64,
}

impl RuntimeStats {
    /// Returns the number of dispatches that have finished.
    pub fn finished(&self) -> u64 {
        self.completed + self.stopped + self.not_found + self.failed + self.ignored + self.autocomplete
    }
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interactions: {} received ({} completed, {} stopped, {} not found, {} failed, {} ignored, {} autocomplete)",
            self.received,
            self.completed,
            self.stopped,
            self.not_found,
            self.failed,
            self.ignored,
            self.autocomplete
        )
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `SugarRuntime` with loaded configuration.
///
/// ```rust,ignore
/// let runtime = SugarRuntime::builder()
///     .config_file("config/sugar.toml")
///     .profile("production")
///     .build(registry)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory, then
    /// `<user config dir>/sugar`.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new()
                .with_current_dir()
                .with_user_config_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Replaces the built-in defaults; files and environment variables still
    /// take precedence.
    pub fn merge(mut self, config: SugarConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Overrides one value at a dotted key path, above every other source.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self, registry: Registry) -> RuntimeResult<SugarRuntime> {
        let config = self.config_loader.load()?;
        Ok(SugarRuntime::new(config, registry))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
