//! The external-module set.
//!
//! Modules in this set are never inlined into a bundle. They remain external
//! references resolved by the consumer's runtime or loader, and each maps to
//! itself as the global-variable binding name for non-module output formats.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::manifest::Manifest;

/// Host platform built-in module names (Node's `module.builtinModules`).
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Union of built-in module names and manifest-declared runtime dependencies.
#[derive(Debug, Clone, Default)]
pub struct ExternalModules {
    names: BTreeSet<String>,
}

impl ExternalModules {
    /// Build the set from the host builtins and a package manifest.
    pub fn from_manifest(manifest: &Manifest) -> ExternalModules {
        let mut names: BTreeSet<String> =
            BUILTIN_MODULES.iter().map(|m| m.to_string()).collect();
        names.extend(manifest.dependency_names().map(|d| d.to_string()));
        ExternalModules { names }
    }

    /// Build the set from explicit names (test helper).
    pub fn from_names(names: impl IntoIterator<Item = impl Into<String>>) -> ExternalModules {
        ExternalModules {
            names: names.into_iter().map(|n| n.into()).collect(),
        }
    }

    /// Whether a module specifier is external.
    pub fn contains(&self, specifier: &str) -> bool {
        self.names.contains(specifier)
    }

    /// All external module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    /// Number of external modules.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Identity global-binding table for non-module output formats: each
    /// external resolves to a global variable of the same name.
    pub fn globals(&self) -> BTreeMap<String, String> {
        self.names
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect()
    }
}
