use std::sync::Arc;

use lens_diff::diff_sets;
use lens_graph::{render_mermaid, GraphBuilder, GraphContext};
use lens_ledger::LedgerProvider;
use lens_measure::{register_token_defaults, MeasurementRegistry};
use lens_metadata::{CachedResolver, FileMetadataCache, InMemoryMetadataCache, MetadataResolver};
use lens_sequence::{ActionInvoker, ActionRunner, ContractAction, RegistryState};
use tracing::info;

use crate::config::RunConfig;
use crate::error::SdkResult;
use crate::report::{ActionOutcome, RunReport};

/// One end-to-end inspection: discover, measure, act, diff.
pub struct Inspection {
    provider: Arc<dyn LedgerProvider>,
    resolver: Arc<dyn MetadataResolver>,
    config: RunConfig,
}

impl Inspection {
    /// Build an inspection. Metadata lookups are memoized for the lifetime
    /// of the inspection and persisted under `cache_dir` when configured.
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        backend: Arc<dyn MetadataResolver>,
        config: RunConfig,
    ) -> SdkResult<Self> {
        config.validate()?;
        let resolver: Arc<dyn MetadataResolver> = match &config.cache_dir {
            Some(dir) => Arc::new(CachedResolver::new(backend, FileMetadataCache::open(dir)?)),
            None => Arc::new(CachedResolver::new(backend, InMemoryMetadataCache::new())),
        };
        Ok(Self {
            provider,
            resolver,
            config,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Registry with the token measurements every run takes.
    pub fn default_registry(&self) -> SdkResult<MeasurementRegistry> {
        let mut registry = MeasurementRegistry::new(self.provider.clone());
        register_token_defaults(&mut registry)?;
        Ok(registry)
    }

    /// Discover the graph from the configured seeds.
    pub async fn discover(&self) -> SdkResult<GraphContext> {
        let mut ctx = GraphContext::new();
        GraphBuilder::new(self.provider.clone(), self.resolver.clone())
            .discover(&mut ctx, &self.config.seed_keys(), &self.config.stop_keys())
            .await?;
        Ok(ctx)
    }

    /// Run the whole pipeline with measurements from `registry`.
    ///
    /// Actions are resolved against the discovered graph before any of them
    /// runs, so a misconfigured action aborts the run without touching the
    /// ledger.
    pub async fn run(&self, registry: &MeasurementRegistry) -> SdkResult<RunReport> {
        let ctx = self.discover().await?;
        let before = registry.evaluate_all(&ctx).await;

        let actions = self
            .config
            .actions
            .iter()
            .map(|spec| {
                ContractAction::resolve(&ctx, spec).map(|a| Box::new(a) as Box<dyn ActionInvoker>)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let state = RegistryState {
            registry,
            ctx: &ctx,
        };
        let reports = ActionRunner::new(self.provider.clone())
            .run_sequence(&state, &actions)
            .await?;

        let mut outcomes = Vec::with_capacity(reports.len());
        for report in reports {
            let delta = diff_sets(&before, &report.after)?;
            info!(label = report.label(), changed_nodes = delta.len(), "computed delta");
            outcomes.push(ActionOutcome { report, delta });
        }

        Ok(RunReport {
            nodes: ctx.sorted_by_label().into_iter().cloned().collect(),
            before,
            actions: outcomes,
            diagram: render_mermaid(&ctx),
        })
    }
}
