//! Process Lock
//!
//! File-based mutual exclusion scoped to one repository. The existence of
//! `<repo>/.repowiki/.repowiki.lock` is the lock state; its content (owner pid
//! and UTC creation time) is only read to judge staleness.
//!
//! # Invariants
//!
//! - At most one non-stale lock file exists per repository
//! - Creation is exclusive: the record is written to a private temp file and
//!   hard-linked into place, which fails if the lock already exists, so no
//!   reader ever observes a half-written record
//! - [`LockGuard`] removes the file on drop, on success and error paths alike
//!
//! # Staleness
//!
//! A lock is stale when its content cannot be parsed, when its owner does not
//! answer a liveness probe, or when it is older than
//! [`STALE_AFTER_SECS`](crate::constants::lock::STALE_AFTER_SECS) whatever the
//! owner's state. Liveness catches crashed owners quickly; the age ceiling
//! reaps owners that are alive but stuck.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::constants::{layout, lock as lock_constants};
use crate::types::{RepoWikiError, Result};

/// Parsed content of a lock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    /// Owning process identifier
    pub pid: u32,
    /// Creation time (UTC, second precision)
    pub created_at: DateTime<Utc>,
}

impl LockRecord {
    /// Record for the current process, stamped now
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            created_at: truncate_to_seconds(Utc::now()),
        }
    }

    /// Serialize as `pid\ntimestamp\n`
    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n",
            self.pid,
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Parse lock file content; `None` when either line is missing or malformed
    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.lines();
        let pid = lines.next()?.trim().parse::<u32>().ok()?;
        let created_at = DateTime::parse_from_rfc3339(lines.next()?.trim())
            .ok()?
            .with_timezone(&Utc);
        Some(Self { pid, created_at })
    }

    /// Age of the record at `now` (negative under clock skew)
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Staleness judgement with an injectable liveness probe
    pub fn is_stale_at(&self, now: DateTime<Utc>, is_alive: impl Fn(u32) -> bool) -> bool {
        if !is_alive(self.pid) {
            return true;
        }
        self.age(now) > Duration::seconds(lock_constants::STALE_AFTER_SECS)
    }
}

/// Judge raw lock content; unparseable content is always stale
pub fn is_stale_content(content: &str, now: DateTime<Utc>, is_alive: impl Fn(u32) -> bool) -> bool {
    match LockRecord::parse(content) {
        Some(record) => record.is_stale_at(now, is_alive),
        None => true,
    }
}

/// Repository-scoped process lock
#[derive(Debug, Clone)]
pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    /// Lock for the repository rooted at `repo_root`
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            path: repo_root.join(layout::TOOL_DIR).join(layout::LOCK_FILE),
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existence check only, no staleness evaluation
    pub fn is_locked(&self) -> bool {
        self.path.exists()
    }

    /// Current record, if the file exists and parses
    pub fn inspect(&self) -> Option<LockRecord> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| LockRecord::parse(&content))
    }

    /// Acquire the lock, reclaiming it once if the existing one is stale.
    ///
    /// Fails with [`RepoWikiError::LockBusy`] when a live, young lock exists.
    pub fn acquire(&self) -> Result<LockGuard> {
        self.acquire_with(is_pid_alive)
    }

    /// [`acquire`](Self::acquire) with an injectable liveness probe
    pub fn acquire_with(&self, is_alive: impl Fn(u32) -> bool) -> Result<LockGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = LockRecord::current();
        if self.try_create(&record)? {
            return Ok(self.guard(record));
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => Some(content),
            // Released between our attempt and the read
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(existing) = existing {
            if !is_stale_content(&existing, Utc::now(), &is_alive) {
                return Err(RepoWikiError::LockBusy {
                    path: self.path.clone(),
                });
            }
            warn!(path = %self.path.display(), "Reclaiming stale lock");
            self.remove_if_unchanged(&existing)?;
        }

        if self.try_create(&record)? {
            Ok(self.guard(record))
        } else {
            Err(RepoWikiError::LockBusy {
                path: self.path.clone(),
            })
        }
    }

    /// Remove the lock file; idempotent and never fails
    pub fn release(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Lock released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove lock: {}", e),
        }
    }

    fn guard(&self, record: LockRecord) -> LockGuard {
        info!(pid = record.pid, path = %self.path.display(), "Lock acquired");
        LockGuard {
            lock: self.clone(),
            record,
        }
    }

    /// Exclusive create; `Ok(false)` when the lock file already exists
    fn try_create(&self, record: &LockRecord) -> Result<bool> {
        static ATTEMPT: AtomicU64 = AtomicU64::new(0);
        let attempt = ATTEMPT.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("lock.{}.{}.tmp", record.pid, attempt));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(record.render().as_bytes())?;
            file.sync_all()?;
        }

        let linked = fs::hard_link(&tmp, &self.path);
        let _ = fs::remove_file(&tmp);

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the lock only if it still holds the content judged stale
    fn remove_if_unchanged(&self, judged: &str) -> Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(current) if current == judged => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Held lock; released when dropped
#[derive(Debug)]
pub struct LockGuard {
    lock: ProcessLock,
    record: LockRecord,
}

impl LockGuard {
    pub fn record(&self) -> &LockRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        self.lock.path()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// Check whether a process is alive with `kill(pid, 0)`
pub fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };

    #[cfg(unix)]
    {
        // SAFETY: signal 0 performs the existence and permission checks only.
        let result = unsafe { libc::kill(pid, 0) };
        if result == 0 {
            return true;
        }
        // EPERM: the process exists but belongs to someone else
        io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.timestamp(), 0).unwrap_or(ts)
}
