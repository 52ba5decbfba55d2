use std::fmt;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::errors::{Result, SilhouetteError};
use crate::member::{member_directories, MemberDirectory};
use crate::silhouette::write_silhouette;
use crate::traits::BackgroundRemover;

/// What happened to a single member directory.
#[derive(Debug)]
pub enum MemberOutcome {
    Written { source: PathBuf, output: PathBuf },
    /// No `profile*.png` in the directory.
    Skipped,
    Failed { error: SilhouetteError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMember {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: Vec<FailedMember>,
}

impl BatchSummary {
    fn record(&mut self, member: &MemberDirectory, outcome: &MemberOutcome) {
        match outcome {
            MemberOutcome::Written { .. } => self.written += 1,
            MemberOutcome::Skipped => self.skipped += 1,
            MemberOutcome::Failed { error } => self.failed.push(FailedMember {
                name: member.name(),
                message: error.to_string(),
            }),
        }
    }

    pub fn processed(&self) -> usize {
        self.written + self.skipped + self.failed.len()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 件のメンバーを処理: 成功 {} / スキップ {} / エラー {}",
            self.processed(),
            self.written,
            self.skipped,
            self.failed.len()
        )
    }
}

/// Fails when `root` is missing or is not a directory.
pub fn ensure_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(SilhouetteError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(SilhouetteError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Walks the member directories under a root one at a time and writes a
/// `silhouette.png` next to each member's first profile image.
pub struct SilhouetteBatchProcessor<R: BackgroundRemover> {
    remover: R,
    progress: ProgressBar,
}

impl<R: BackgroundRemover> SilhouetteBatchProcessor<R> {
    pub fn new(remover: R) -> Self {
        Self {
            remover,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Processes every member under `root`.
    ///
    /// Only a missing, non-directory or unlistable root is an error;
    /// per-member failures are logged and counted in the returned summary.
    pub fn run(&self, root: &Path) -> Result<BatchSummary> {
        ensure_root(root)?;

        let mut summary = BatchSummary::default();
        for member in member_directories(root) {
            let member = match member {
                Ok(member) => member,
                Err(error) if error.is_fatal() => {
                    self.progress.finish_and_clear();
                    return Err(error);
                }
                Err(error) => {
                    self.log(format!("  -> 読み込めない項目をスキップします: {error}"));
                    continue;
                }
            };
            let outcome = self.process_member(&member);
            summary.record(&member, &outcome);
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        Ok(summary)
    }

    pub fn process_member(&self, member: &MemberDirectory) -> MemberOutcome {
        let name = member.name();
        self.progress.set_message(name.clone());
        self.log(format!("メンバー処理中: {name}"));

        let source = match member.select_profile_image() {
            Ok(Some(source)) => source,
            Ok(None) => {
                self.log("  -> profile画像が見つかりません。スキップします".to_string());
                return MemberOutcome::Skipped;
            }
            Err(error) => return self.failed(&name, error),
        };
        let output = member.silhouette_path();

        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.log(format!("  -> {source_name} からシルエットを作成中"));

        match write_silhouette(&source, &output, &self.remover) {
            Ok(()) => {
                self.log(format!("  -> 成功: {}", output.display()));
                MemberOutcome::Written { source, output }
            }
            Err(error) => self.failed(&name, error),
        }
    }

    fn failed(&self, name: &str, error: SilhouetteError) -> MemberOutcome {
        self.log(format!("  -> エラー ({name}): {error}"));
        MemberOutcome::Failed { error }
    }

    fn log(&self, line: String) {
        self.progress.suspend(|| println!("{line}"));
    }
}
