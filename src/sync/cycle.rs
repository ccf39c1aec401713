//! Update Cycle and Catch-Up Loop
//!
//! One cycle brings the wiki in sync with a target commit:
//!
//! 1. detect the filtered change set since the baseline
//! 2. stop if it is empty (no engine call, baseline untouched)
//! 3. choose full or incremental generation and run the engine
//! 4. commit the wiki under the sentinel when `auto_commit` is on
//! 5. record the target as the new baseline
//!
//! Commits landing while the engine runs fire hooks that the gate defers to
//! the lock holder. After the first cycle the catch-up loop re-reads HEAD and
//! runs further cycles, at most
//! [`MAX_CATCH_UP_ITERATIONS`](crate::constants::cycle::MAX_CATCH_UP_ITERATIONS)
//! times. Anything left after that waits for the next commit's hook.

use tracing::{debug, info, warn};

use super::{
    ChangeDetector, ProcessLock, SectionIndex, StateStore, Strategy, StrategyKind,
    affected_sections, select_strategy,
};
use crate::config::Config;
use crate::constants::cycle::MAX_CATCH_UP_ITERATIONS;
use crate::engine::{EngineRequest, GenerationEngine, PromptTemplates};
use crate::git::Vcs;
use crate::types::Result;
use crate::wiki::{WikiCommitter, WikiOutput};

/// Collaborators shared by every cycle of one worker
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub vcs: &'a dyn Vcs,
    pub engine: &'a dyn GenerationEngine,
    pub config: &'a Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing outside the excluded paths changed
    NoChanges { target: String },
    Generated {
        target: String,
        strategy: StrategyKind,
        /// Relevant changed files (0 for a forced regeneration)
        files: usize,
        committed: bool,
    },
}

impl CycleOutcome {
    pub fn target(&self) -> &str {
        match self {
            Self::NoChanges { target } | Self::Generated { target, .. } => target,
        }
    }

    pub fn generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

/// Every cycle run by one worker, first cycle first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub cycles: Vec<CycleOutcome>,
    /// Catch-up stopped at its bound with HEAD still ahead
    pub catch_up_exhausted: bool,
}

impl SyncReport {
    pub fn generated_count(&self) -> usize {
        self.cycles.iter().filter(|c| c.generated()).count()
    }
}

pub struct UpdateCycle<'a> {
    ctx: SyncContext<'a>,
    state: StateStore,
    wiki: WikiOutput,
}

impl<'a> UpdateCycle<'a> {
    pub fn new(ctx: SyncContext<'a>) -> Self {
        let root = ctx.vcs.root();
        Self {
            state: StateStore::for_repo(root),
            wiki: WikiOutput::new(root, &ctx.config.wiki),
            ctx,
        }
    }

    fn detector(&self) -> ChangeDetector<'_> {
        ChangeDetector::new(self.ctx.vcs, &self.ctx.config.excluded_paths)
    }

    /// One attempt at syncing the wiki with `target`
    pub async fn run(&self, target: &str) -> Result<CycleOutcome> {
        let state = self.state.load()?;
        let changes = self.detector().detect(state.baseline(), target)?;

        if changes.is_empty() {
            info!(commit = %target, "No relevant changes");
            return Ok(CycleOutcome::NoChanges {
                target: target.to_string(),
            });
        }

        let files = changes.len();
        let strategy = self.plan(changes.files);
        self.generate(target, strategy, files).await
    }

    /// Full regeneration regardless of what changed
    pub async fn regenerate(&self, target: &str) -> Result<CycleOutcome> {
        self.generate(target, Strategy::FullRegeneration, 0).await
    }

    /// Run one cycle for `target`, then catch up with HEAD
    pub async fn run_with_catch_up(&self, target: &str) -> Result<SyncReport> {
        let mut report = SyncReport {
            cycles: vec![self.run(target).await?],
            catch_up_exhausted: false,
        };
        let mut last_target = target.to_string();

        for iteration in 1..=MAX_CATCH_UP_ITERATIONS {
            let head = self.ctx.vcs.head_commit()?;
            let state = self.state.load()?;
            let reference = state.baseline().unwrap_or(&last_target).to_string();

            if head == reference {
                return Ok(report);
            }

            let pending = self.detector().detect(Some(&reference), &head)?;
            if pending.is_empty() {
                debug!(commit = %head, "HEAD moved without relevant changes");
                return Ok(report);
            }

            info!(
                iteration,
                commit = %head,
                files = pending.len(),
                "Catching up with new commits"
            );
            report.cycles.push(self.run(&head).await?);
            last_target = head;
        }

        let head = self.ctx.vcs.head_commit()?;
        let state = self.state.load()?;
        let reference = state.baseline().unwrap_or(&last_target);
        if head != reference && !self.detector().detect(Some(reference), &head)?.is_empty() {
            warn!(
                bound = MAX_CATCH_UP_ITERATIONS,
                "Catch-up bound reached, remaining commits wait for the next hook"
            );
            report.catch_up_exhausted = true;
        }
        Ok(report)
    }

    fn plan(&self, changed_files: Vec<String>) -> Strategy {
        let kind = select_strategy(
            self.wiki.exists(),
            changed_files.len(),
            self.ctx.config.full_generate_threshold,
        );
        match kind {
            StrategyKind::FullRegeneration => Strategy::FullRegeneration,
            StrategyKind::Incremental => {
                let index = SectionIndex::build(&self.wiki);
                let affected = affected_sections(&index, &changed_files);
                Strategy::Incremental {
                    changed_files,
                    affected_sections: affected,
                }
            }
        }
    }

    async fn generate(&self, target: &str, strategy: Strategy, files: usize) -> Result<CycleOutcome> {
        let config = self.ctx.config;
        let prompt = match &strategy {
            Strategy::FullRegeneration => PromptTemplates::full_generate(config),
            Strategy::Incremental {
                changed_files,
                affected_sections,
            } => PromptTemplates::incremental(config, changed_files, affected_sections),
        };

        info!(
            commit = %target,
            strategy = %strategy.kind(),
            files,
            engine = self.ctx.engine.name(),
            "Generating wiki"
        );

        let request = EngineRequest::new(prompt, self.ctx.vcs.root().to_path_buf(), &config.engine);
        let output = self.ctx.engine.run(&request).await?;
        debug!(elapsed_ms = output.elapsed.as_millis() as u64, "Engine call complete");

        let committed = if config.auto_commit {
            WikiCommitter::new(self.ctx.vcs, config).commit_changes(&strategy.describe())?
        } else {
            false
        };

        self.state.record_run(target)?;

        Ok(CycleOutcome::Generated {
            target: target.to_string(),
            strategy: strategy.kind(),
            files,
            committed,
        })
    }
}

/// Worker entry point: take the lock, sync `target` (default HEAD), catch up.
///
/// The lock is released on every exit path.
pub async fn run_update(ctx: SyncContext<'_>, target: Option<&str>) -> Result<SyncReport> {
    let _lock = ProcessLock::for_repo(ctx.vcs.root()).acquire()?;

    let target = match target {
        Some(t) => t.to_string(),
        None => ctx.vcs.head_commit()?,
    };

    UpdateCycle::new(ctx).run_with_catch_up(&target).await
}

/// Direct full regeneration of HEAD under the lock
pub async fn run_generate(ctx: SyncContext<'_>) -> Result<CycleOutcome> {
    let _lock = ProcessLock::for_repo(ctx.vcs.root()).acquire()?;
    let head = ctx.vcs.head_commit()?;
    UpdateCycle::new(ctx).regenerate(&head).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::test_support::{FakeEngine, FakeVcs};
    use crate::sync::Sentinel;
    use crate::types::RepoWikiError;
    use std::fs;
    use std::sync::Arc;

    fn enabled_config() -> Config {
        Config {
            enabled: true,
            ..Config::default()
        }
    }

    fn write_page(vcs: &FakeVcs, config: &Config, name: &str, content: &str) {
        let dir = config.wiki.content_dir(vcs.root());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    fn baseline(vcs: &FakeVcs) -> Option<String> {
        StateStore::for_repo(vcs.root())
            .load()
            .unwrap()
            .last_commit_hash
    }

    #[tokio::test]
    async fn test_only_excluded_changes_is_trivial_success() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "docs", &[".qoder/repowiki/en/content/A.md", ".repowiki/config.toml"]);
        let engine = FakeEngine::succeeding();
        let config = enabled_config();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };

        let report = run_update(ctx, Some("c1")).await.unwrap();

        assert_eq!(report.cycles, vec![CycleOutcome::NoChanges { target: "c1".into() }]);
        assert_eq!(engine.calls(), 0);
        assert_eq!(baseline(&vcs), None);
        assert!(!ProcessLock::for_repo(vcs.root()).is_locked());
    }

    #[tokio::test]
    async fn test_fresh_repository_full_regeneration() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "feat: init", &["src/main.rs"]);
        let engine = FakeEngine::succeeding();
        let config = enabled_config();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };

        let report = run_update(ctx, Some("c1")).await.unwrap();

        assert_eq!(engine.calls(), 1);
        assert!(engine.prompts()[0].contains("Generate a comprehensive repository wiki"));
        assert_eq!(
            report.cycles,
            vec![CycleOutcome::Generated {
                target: "c1".into(),
                strategy: StrategyKind::FullRegeneration,
                files: 1,
                committed: false,
            }]
        );
        assert_eq!(baseline(&vcs).as_deref(), Some("c1"));
        assert!(!report.catch_up_exhausted);
    }

    #[tokio::test]
    async fn test_engine_failure_releases_lock_and_keeps_baseline() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "feat", &["src/main.rs"]);
        let engine = FakeEngine::failing();
        let config = enabled_config();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };

        let err = run_update(ctx, Some("c1")).await.unwrap_err();

        assert!(matches!(err, RepoWikiError::Engine(_)));
        assert!(!ProcessLock::for_repo(vcs.root()).is_locked());
        assert_eq!(baseline(&vcs), None);
    }

    #[tokio::test]
    async fn test_busy_lock_is_contention() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "feat", &["src/main.rs"]);
        let engine = FakeEngine::succeeding();
        let config = enabled_config();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };

        let _held = ProcessLock::for_repo(vcs.root()).acquire().unwrap();
        let err = run_update(ctx, Some("c1")).await.unwrap_err();

        assert!(err.is_contention());
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_incremental_update_with_hints() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "init", &["src/main.rs"]);
        vcs.add_commit("c2", "auth", &["src/auth/login.rs", ".qoder/repowiki/en/content/x.md"]);
        let config = enabled_config();
        write_page(&vcs, &config, "System Overview.md", "# Overview");
        StateStore::for_repo(vcs.root()).record_run("c1").unwrap();

        let engine = FakeEngine::succeeding();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };
        let outcome = UpdateCycle::new(ctx).run("c2").await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Generated {
                target: "c2".into(),
                strategy: StrategyKind::Incremental,
                files: 1,
                committed: false,
            }
        );
        let prompt = &engine.prompts()[0];
        assert!(prompt.contains("  - src/auth/login.rs"));
        assert!(prompt.contains("  - Authentication and Security"));
        assert!(!prompt.contains("x.md"));
        assert_eq!(baseline(&vcs).as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_threshold_forces_full_regeneration() {
        let vcs = FakeVcs::new();
        let files: Vec<String> = (0..3).map(|i| format!("src/f{}.rs", i)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        vcs.add_commit("c1", "many", &refs);

        let config = Config {
            full_generate_threshold: 2,
            ..enabled_config()
        };
        write_page(&vcs, &config, "System Overview.md", "# Overview");

        let engine = FakeEngine::succeeding();
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };
        let outcome = UpdateCycle::new(ctx).run("c1").await.unwrap();

        assert!(matches!(
            outcome,
            CycleOutcome::Generated { strategy: StrategyKind::FullRegeneration, .. }
        ));
    }

    #[tokio::test]
    async fn test_self_commit_under_sentinel_does_not_trigger_catch_up() {
        let vcs = Arc::new(FakeVcs::new());
        vcs.add_commit("c1", "feat", &["src/main.rs"]);
        let config = enabled_config();

        let dirty = Arc::clone(&vcs);
        let engine = FakeEngine::with(move |_| {
            dirty.set_dirty(true);
            Ok(())
        });
        let ctx = SyncContext { vcs: vcs.as_ref(), engine: &engine, config: &config };

        let report = run_update(ctx, None).await.unwrap();

        assert_eq!(engine.calls(), 1);
        assert_eq!(report.cycles.len(), 1);
        assert!(matches!(report.cycles[0], CycleOutcome::Generated { committed: true, .. }));
        assert_eq!(vcs.commit_count(), 2);
        assert_eq!(vcs.sentinel_seen(), vec![true]);
        assert!(!Sentinel::for_repo(vcs.root()).is_present());

        let head = vcs.head_commit().unwrap();
        assert_eq!(
            vcs.commit_message(&head).unwrap(),
            "[repowiki] full wiki generation"
        );
        // Baseline is the user's commit, not the wiki commit
        assert_eq!(baseline(&vcs).as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_catch_up_absorbs_commit_made_during_generation() {
        let vcs = Arc::new(FakeVcs::new());
        vcs.add_commit("c1", "feat", &["src/a.rs"]);
        let config = enabled_config();

        let during = Arc::clone(&vcs);
        let engine = FakeEngine::with(move |call| {
            if call == 0 {
                during.add_commit("c2", "fix", &["src/b.rs"]);
            }
            Ok(())
        });
        let ctx = SyncContext { vcs: vcs.as_ref(), engine: &engine, config: &config };

        let report = run_update(ctx, Some("c1")).await.unwrap();

        assert_eq!(engine.calls(), 2);
        let targets: Vec<&str> = report.cycles.iter().map(CycleOutcome::target).collect();
        assert_eq!(targets, vec!["c1", "c2"]);
        assert_eq!(baseline(&vcs).as_deref(), Some("c2"));
        assert!(!report.catch_up_exhausted);
    }

    #[tokio::test]
    async fn test_catch_up_terminates_under_commit_storm() {
        let vcs = Arc::new(FakeVcs::new());
        vcs.add_commit("c0", "feat", &["src/a.rs"]);
        let config = enabled_config();

        // Every generation produces exactly one new qualifying commit
        let storm = Arc::clone(&vcs);
        let engine = FakeEngine::with(move |call| {
            let file = format!("src/s{}.rs", call);
            storm.add_commit(&format!("s{}", call), "storm", &[file.as_str()]);
            Ok(())
        });
        let ctx = SyncContext { vcs: vcs.as_ref(), engine: &engine, config: &config };

        let report = run_update(ctx, Some("c0")).await.unwrap();

        assert_eq!(engine.calls(), 1 + MAX_CATCH_UP_ITERATIONS);
        assert_eq!(report.cycles.len(), 1 + MAX_CATCH_UP_ITERATIONS);
        assert!(report.catch_up_exhausted);
        assert!(!ProcessLock::for_repo(vcs.root()).is_locked());
    }

    #[tokio::test]
    async fn test_catch_up_bound_not_exhausted_when_only_wiki_commits_remain() {
        let vcs = Arc::new(FakeVcs::new());
        vcs.add_commit("c0", "feat", &["src/a.rs"]);
        let config = enabled_config();

        // Qualifying commits until the last pass, which only leaves a wiki commit behind
        let storm = Arc::clone(&vcs);
        let engine = FakeEngine::with(move |call| {
            if call < MAX_CATCH_UP_ITERATIONS {
                let file = format!("src/s{}.rs", call);
                storm.add_commit(&format!("s{}", call), "storm", &[file.as_str()]);
            } else {
                storm.add_commit("w", "[repowiki] update", &[".qoder/repowiki/en/content/A.md"]);
            }
            Ok(())
        });
        let ctx = SyncContext { vcs: vcs.as_ref(), engine: &engine, config: &config };

        let report = run_update(ctx, Some("c0")).await.unwrap();

        assert_eq!(engine.calls(), 1 + MAX_CATCH_UP_ITERATIONS);
        assert_eq!(vcs.head_commit().unwrap(), "w");
        assert!(!report.catch_up_exhausted);
    }

    #[tokio::test]
    async fn test_catch_up_ignores_head_moves_into_excluded_paths() {
        let vcs = Arc::new(FakeVcs::new());
        vcs.add_commit("c1", "feat", &["src/a.rs"]);
        let config = enabled_config();

        let during = Arc::clone(&vcs);
        let engine = FakeEngine::with(move |_| {
            during.add_commit("c2", "chore", &[".repowiki/config.toml"]);
            Ok(())
        });
        let ctx = SyncContext { vcs: vcs.as_ref(), engine: &engine, config: &config };

        let report = run_update(ctx, Some("c1")).await.unwrap();
        assert_eq!(engine.calls(), 1);
        assert_eq!(report.generated_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_ignores_change_set() {
        let vcs = FakeVcs::new();
        vcs.add_commit("c1", "docs only", &[".repowiki/config.toml"]);
        let engine = FakeEngine::succeeding();
        let config = Config {
            auto_commit: false,
            ..enabled_config()
        };
        let ctx = SyncContext { vcs: &vcs, engine: &engine, config: &config };

        let outcome = run_generate(ctx).await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Generated { strategy: StrategyKind::FullRegeneration, committed: false, .. }
        ));
        assert_eq!(baseline(&vcs).as_deref(), Some("c1"));
    }
}
