//! Import pipeline.
//!
//! Resources are processed strictly one after another:
//! 1. **Translate** each statement into a claim, creating referenced
//!    properties and items on first use ([`translate`], [`resolve`])
//! 2. **Assemble** the item document with claims grouped by property ([`builder`])
//! 3. **Persist** the item: create it, or edit the item already cached for
//!    the resource URI when an earlier statement referenced it
//!
//! Any fatal error aborts the run; nothing after the failing resource is
//! imported. [`ImportOrchestrator::import_file`] reads its input as a stream,
//! so a parse error also ends the run at the resource where it occurs.

pub mod builder;
pub mod resolve;
pub mod translate;

use std::path::Path;

use tracing::info;

use crate::cache::IdentifierCache;
use crate::client::WikibaseApi;
use crate::entity::EntityKind;
use crate::errors::Result;
use crate::source::{gdm, SourceResource};
use crate::types::DEFAULT_LANGUAGE;

pub use builder::{BuiltItem, EntityBuilder};
pub use resolve::EntityResolver;
pub use translate::StatementTranslator;

const PROGRESS_EVERY: usize = 100;

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub resources: usize,
    pub claims: usize,
    pub skipped_statements: usize,
}

/// Drives resources through translation and persistence.
///
/// Owns the [`IdentifierCache`] for the lifetime of the orchestrator; runs on
/// the same orchestrator share it.
pub struct ImportOrchestrator<A> {
    api: A,
    cache: IdentifierCache,
    language: String,
}

impl<A: WikibaseApi> ImportOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: IdentifierCache::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language code for labels and descriptions.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn cache(&self) -> &IdentifierCache {
        &self.cache
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Import every resource in order, stopping at the first fatal error.
    pub async fn run(&self, resources: impl IntoIterator<Item = SourceResource>) -> Result<ImportSummary> {
        let builder = self.builder();
        let mut summary = ImportSummary::default();

        for resource in resources {
            self.import_one(&builder, &resource, &mut summary).await?;
        }

        Ok(self.finish(summary))
    }

    /// Stream a GDM JSON file and import its resources as they are parsed.
    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading input file");

        let builder = self.builder();
        let mut summary = ImportSummary::default();
        let mut stream = gdm::stream_file(path);

        while let Some(resource) = stream.next().await {
            self.import_one(&builder, &resource?, &mut summary).await?;
        }

        Ok(self.finish(summary))
    }

    fn builder(&self) -> EntityBuilder<'_, A> {
        EntityBuilder::new(StatementTranslator::new(EntityResolver::new(
            &self.api,
            &self.cache,
            &self.language,
        )))
    }

    async fn import_one(
        &self,
        builder: &EntityBuilder<'_, A>,
        resource: &SourceResource,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let built = builder.build_item(resource).await?;

        summary.resources += 1;
        summary.claims += built.claims;
        summary.skipped_statements += built.skipped;

        if summary.resources % PROGRESS_EVERY == 0 {
            info!(
                resources = summary.resources,
                claims = summary.claims,
                "import progress"
            );
        }
        Ok(())
    }

    fn finish(&self, summary: ImportSummary) -> ImportSummary {
        info!(
            resources = summary.resources,
            claims = summary.claims,
            skipped = summary.skipped_statements,
            items = self.cache.len(EntityKind::Item),
            properties = self.cache.len(EntityKind::Property),
            "import finished"
        );
        summary
    }
}
