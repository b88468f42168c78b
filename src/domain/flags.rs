//! Global command-line options shared by every subcommand

use std::cell::{Ref, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

/// Options registered on the root command and visible to every descendant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    /// Only print fatal errors
    pub silent: bool,
    /// Print the full error chain when a command fails
    pub debug: bool,
    /// Namespace to use instead of the configured default
    pub namespace: Option<String>,
    /// Kube context to use instead of the current one
    pub kube_context: Option<String>,
    /// Make the given namespace/kube context the current one
    pub switch_context: bool,
    /// Explicit config file, bypasses the home-directory lookup
    pub config: Option<PathBuf>,
}

/// Handle to the single per-process `GlobalFlags` record.
///
/// Cloning the handle shares the record; it never copies it. The fields are
/// written once while the command line is parsed and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct SharedFlags(Rc<RefCell<GlobalFlags>>);

impl SharedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current values.
    pub fn get(&self) -> Ref<'_, GlobalFlags> {
        self.0.borrow()
    }

    /// Owned copy of the current values.
    pub fn snapshot(&self) -> GlobalFlags {
        self.0.borrow().clone()
    }

    /// Store the parsed values in place. The record itself is kept.
    pub fn store(&self, parsed: GlobalFlags) {
        let mut flags = self.0.borrow_mut();
        flags.silent = parsed.silent;
        flags.debug = parsed.debug;
        flags.namespace = parsed.namespace;
        flags.kube_context = parsed.kube_context;
        flags.switch_context = parsed.switch_context;
        flags.config = parsed.config;
    }

    /// True if both handles point at the same record.
    pub fn same_record(&self, other: &SharedFlags) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
