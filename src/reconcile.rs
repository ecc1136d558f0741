//! Dependency reconciliation.
//!
//! Compares the declared package lists against the local package database and
//! installs only what is missing. The first failure aborts the run.

use log::{debug, info, warn};

use crate::backend::PackageBackend;
use crate::error::SetupError;
use crate::runtime::Runtime;

/// What a reconciliation run actually did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub installed_required: Vec<String>,
    pub installed_optional: Vec<String>,
    pub optionals_requested: bool,
}

impl ReconcileReport {
    /// Number of install actions performed.
    pub fn actions(&self) -> usize {
        self.installed_required.len() + self.installed_optional.len()
    }

    pub fn is_noop(&self) -> bool {
        self.actions() == 0
    }
}

/// Converge the machine on the declared package sets.
///
/// `required` is always processed; `optional` only when `install_optionals`
/// is set. Both are walked in declaration order and both stop at the first
/// failed install.
#[tracing::instrument(skip_all, fields(backend = %backend.kind()))]
pub fn reconcile<B: PackageBackend + ?Sized>(
    backend: &B,
    required: &[String],
    optional: &[String],
    install_optionals: bool,
) -> Result<ReconcileReport, SetupError> {
    let mut report = ReconcileReport {
        optionals_requested: install_optionals,
        ..Default::default()
    };

    info!("Checking {} required package(s)", required.len());
    converge(backend, required, &mut report.installed_required)?;

    if install_optionals {
        info!("Checking {} optional package(s)", optional.len());
        converge(backend, optional, &mut report.installed_optional)?;
    } else {
        debug!("Skipping optional packages");
    }

    Ok(report)
}

fn converge<B: PackageBackend + ?Sized>(
    backend: &B,
    packages: &[String],
    installed: &mut Vec<String>,
) -> Result<(), SetupError> {
    for package in packages {
        if backend.is_installed(package)? {
            debug!("{} is already installed", package);
            continue;
        }
        println!("Installing {} with {}...", package, backend.kind());
        backend.install(package)?;
        installed.push(package.clone());
    }
    Ok(())
}

/// Decide once, before any optional package is touched, whether to install them.
///
/// `accept` skips the question. The prompt defaults to no, and so does a
/// prompt that cannot be read.
pub fn decide_optionals<R: Runtime>(runtime: &R, optional: &[String], accept: bool) -> bool {
    if optional.is_empty() {
        return false;
    }
    if accept {
        return true;
    }
    println!("Optional packages: {}", optional.join(" "));
    match runtime.confirm("Install optional packages?") {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Could not read answer, skipping optional packages: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, MockPackageBackend};
    use crate::error::CommandError;
    use crate::runtime::MockRuntime;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Backend over an in-memory package database.
    struct FakeBackend {
        kind: BackendKind,
        installed: RefCell<HashSet<String>>,
        attempts: RefCell<Vec<String>>,
        failing: Option<String>,
    }

    impl FakeBackend {
        fn new(present: &[&str]) -> Self {
            Self {
                kind: BackendKind::Paru,
                installed: RefCell::new(present.iter().map(|p| p.to_string()).collect()),
                attempts: RefCell::new(Vec::new()),
                failing: None,
            }
        }

        fn failing_on(mut self, package: &str) -> Self {
            self.failing = Some(package.to_string());
            self
        }

        fn has(&self, package: &str) -> bool {
            self.installed.borrow().contains(package)
        }
    }

    impl PackageBackend for FakeBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn is_present(&self) -> bool {
            true
        }

        fn is_installed(&self, package: &str) -> Result<bool, SetupError> {
            Ok(self.has(package))
        }

        fn install(&self, package: &str) -> Result<(), SetupError> {
            self.attempts.borrow_mut().push(package.to_string());
            if self.failing.as_deref() == Some(package) {
                return Err(SetupError::Install {
                    package: package.to_string(),
                    source: CommandError::Exit {
                        command: format!("paru -S --needed --noconfirm {}", package),
                        code: Some(1),
                    },
                });
            }
            self.installed.borrow_mut().insert(package.to_string());
            Ok(())
        }

        fn bootstrap(&self) -> Result<(), SetupError> {
            Ok(())
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_installs_only_missing_required() {
        let backend = FakeBackend::new(&["A"]);
        let report = reconcile(&backend, &names(&["A", "B"]), &names(&["C"]), false).unwrap();

        assert_eq!(report.installed_required, names(&["B"]));
        assert!(report.installed_optional.is_empty());
        assert_eq!(report.actions(), 1);
        assert!(backend.has("A"));
        assert!(backend.has("B"));
        assert!(!backend.has("C"));
        assert_eq!(*backend.attempts.borrow(), names(&["B"]));
    }

    #[test]
    fn test_second_run_is_noop() {
        let backend = FakeBackend::new(&[]);
        let required = names(&["python", "fzf", "mpv"]);
        let optional = names(&["chafa", "ffmpeg"]);

        let first = reconcile(&backend, &required, &optional, true).unwrap();
        assert_eq!(first.actions(), 5);

        let second = reconcile(&backend, &required, &optional, true).unwrap();
        assert!(second.is_noop());
        assert_eq!(backend.attempts.borrow().len(), 5);
    }

    #[test]
    fn test_every_required_package_present_after_run() {
        let backend = FakeBackend::new(&["fzf"]);
        let required = names(&["python", "fzf", "mpv", "yt-dlp"]);

        reconcile(&backend, &required, &[], false).unwrap();

        for package in &required {
            assert!(backend.is_installed(package).unwrap(), "{} missing", package);
        }
    }

    #[test]
    fn test_optionals_installed_when_accepted() {
        let backend = FakeBackend::new(&["A"]);
        let report = reconcile(&backend, &names(&["A"]), &names(&["C", "D"]), true).unwrap();

        assert!(report.optionals_requested);
        assert_eq!(report.installed_optional, names(&["C", "D"]));
    }

    #[test]
    fn test_required_failure_aborts_remaining_work() {
        let backend = FakeBackend::new(&[]).failing_on("B");
        let result = reconcile(&backend, &names(&["A", "B", "C"]), &names(&["D"]), true);

        assert!(matches!(result, Err(SetupError::Install { ref package, .. }) if package == "B"));
        assert_eq!(*backend.attempts.borrow(), names(&["A", "B"]));
        assert!(!backend.has("C"));
        assert!(!backend.has("D"));
    }

    #[test]
    fn test_optional_failure_aborts_remaining_optionals() {
        let backend = FakeBackend::new(&[]).failing_on("D");
        let result = reconcile(&backend, &names(&["A"]), &names(&["D", "E"]), true);

        assert!(result.is_err());
        assert_eq!(*backend.attempts.borrow(), names(&["A", "D"]));
    }

    #[test]
    fn test_query_failure_propagates() {
        let mut backend = MockPackageBackend::new();
        backend.expect_kind().return_const(BackendKind::Yay);
        backend.expect_is_installed().returning(|package| {
            Err(SetupError::Query {
                package: package.to_string(),
                source: CommandError::Spawn {
                    command: format!("yay -Q {}", package),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                },
            })
        });
        backend.expect_install().never();

        let result = reconcile(&backend, &names(&["mpv"]), &[], false);
        assert!(matches!(result, Err(SetupError::Query { .. })));
    }

    #[test]
    fn test_decide_optionals_prompts_once() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_confirm()
            .times(1)
            .returning(|_| Ok(true));

        assert!(decide_optionals(&runtime, &names(&["chafa", "ffmpeg"]), false));
    }

    #[test]
    fn test_decide_optionals_accept_skips_prompt() {
        let mut runtime = MockRuntime::new();
        runtime.expect_confirm().never();

        assert!(decide_optionals(&runtime, &names(&["chafa"]), true));
        assert!(!decide_optionals(&runtime, &[], true));
    }

    #[test]
    fn test_decide_optionals_defaults_to_no_on_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_confirm()
            .returning(|_| Err(anyhow::anyhow!("stdin closed")));

        assert!(!decide_optionals(&runtime, &names(&["chafa"]), false));
    }
}
