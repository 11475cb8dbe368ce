//! Matcher -> classifier -> validator in one call, and multi-hop chains

use crate::archive::SnapshotArchive;
use crate::classifier::ChangeClassifier;
use crate::matcher::TaxonMatcher;
use crate::migration::MigrationMap;
use crate::report::{ChangeCounts, DiffReport};
use crate::snapshot::Snapshot;
use crate::validation::{quality_score, Validator};
use taxonomer_core::{Config, TaxonomerError, TaxonomerResult};

pub struct TransitionAnalyzer {
    matcher: TaxonMatcher,
    classifier: ChangeClassifier,
    validator: Validator,
}

impl TransitionAnalyzer {
    pub fn new(config: Config) -> Self {
        Self {
            classifier: ChangeClassifier::new(config.matching.parallel_threshold),
            matcher: TaxonMatcher::new(config.matching),
            validator: Validator::new(config.validation),
        }
    }

    /// Full comparison of two snapshots
    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> DiffReport {
        let matching = self.matcher.match_snapshots(old, new);
        let mut classification = self.classifier.classify(old, new, &matching);
        self.validator.validate(&mut classification.records);

        let counts = ChangeCounts::tally(&classification.records);
        let quality_score = quality_score(&classification.records);

        tracing::info!(
            old = old.version(),
            new = new.version(),
            changes = counts.total,
            unchanged = classification.unchanged.len(),
            quality = quality_score,
            "Diffed snapshots"
        );

        DiffReport {
            old: old.info().clone(),
            new: new.info().clone(),
            records: classification.records,
            unchanged: classification.unchanged,
            counts,
            quality_score,
        }
    }
}

/// Walks consecutive archive versions between two endpoints
pub struct VersionChain<'a, A: SnapshotArchive + ?Sized> {
    archive: &'a A,
    analyzer: TransitionAnalyzer,
}

impl<'a, A: SnapshotArchive + ?Sized> VersionChain<'a, A> {
    pub fn new(archive: &'a A, config: Config) -> Self {
        Self {
            archive,
            analyzer: TransitionAnalyzer::new(config),
        }
    }

    /// One report per consecutive hop from `from` to `to`
    pub fn reports(&self, from: &str, to: &str) -> TaxonomerResult<Vec<DiffReport>> {
        let versions = self.archive.range(from, to)?;
        if versions.len() < 2 {
            return Err(TaxonomerError::InvalidInput(format!(
                "a chain needs two distinct versions, got {} -> {}",
                from, to
            )));
        }

        let mut reports = Vec::with_capacity(versions.len() - 1);
        let mut previous = self.archive.load(&versions[0].version)?;
        for info in &versions[1..] {
            let current = self.archive.load(&info.version)?;
            reports.push(self.analyzer.diff(&previous, &current));
            previous = current;
        }

        tracing::info!(from, to, hops = reports.len(), "Walked version chain");
        Ok(reports)
    }

    /// Composed migration map from `from` to `to`
    pub fn migration_map(&self, from: &str, to: &str) -> TaxonomerResult<MigrationMap> {
        let mut hops = self.reports(from, to)?.into_iter().map(|r| MigrationMap::build(&r));
        let first = hops
            .next()
            .ok_or_else(|| TaxonomerError::InvalidInput(format!("no hops between {} and {}", from, to)))?;
        hops.try_fold(first, |composed, next| composed.compose(&next))
    }
}
