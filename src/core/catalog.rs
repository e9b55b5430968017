//! Capability catalog and shim symbol set.
//!
//! The catalog maps native-capability invocations (`Object.keys`, `new Set`)
//! to the names of shim functions that reimplement them for runtimes lacking
//! the native feature. The shim symbol set is derived once per build from the
//! shim unit's `export` statements and feeds the synthesized import line.

use regex::Regex;
use thiserror::Error;

/// Catalog construction errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A later native pattern is a substring of an earlier entry's shim
    /// symbol. Rewriting in catalog order would then substitute inside
    /// already-substituted text.
    #[error(
        "catalog entry `{later}` (index {later_index}) is a substring of the \
         replacement `{earlier_shim}` (index {earlier_index}); reorder the \
         catalog to avoid double substitution"
    )]
    DoubleSubstitution {
        later: String,
        later_index: usize,
        earlier_shim: String,
        earlier_index: usize,
    },

    /// Empty patterns would match everywhere.
    #[error("catalog entry {index} has an empty native pattern")]
    EmptyPattern { index: usize },
}

/// One catalog entry: native invocation text and its shim symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Exact text of the native invocation, matched as a substring.
    pub native: String,

    /// Shim symbol that replaces it.
    pub shim: String,
}

/// Ordered, immutable mapping of native patterns to shim symbols.
///
/// Entries are applied in listed order. Matching is exact whole-text
/// substring replacement, so a pattern can also hit unrelated identifiers,
/// string literals, or comments containing the same characters. That
/// imprecision is a deliberate property of the rewrite, not a bug; see
/// `stage::rewrite`.
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    entries: Vec<CatalogEntry>,
}

impl CapabilityCatalog {
    /// Build a catalog, validating the ordering invariant.
    pub fn new<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, S)>,
    ) -> Result<CapabilityCatalog, CatalogError> {
        let entries: Vec<CatalogEntry> = pairs
            .into_iter()
            .map(|(native, shim)| CatalogEntry {
                native: native.into(),
                shim: shim.into(),
            })
            .collect();

        for (index, entry) in entries.iter().enumerate() {
            if entry.native.is_empty() {
                return Err(CatalogError::EmptyPattern { index });
            }
        }

        // A later pattern must not appear inside an earlier replacement,
        // otherwise the later pass rewrites text the earlier pass emitted.
        for (later_index, later) in entries.iter().enumerate() {
            for (earlier_index, earlier) in entries.iter().enumerate().take(later_index) {
                if earlier.shim.contains(&later.native) {
                    return Err(CatalogError::DoubleSubstitution {
                        later: later.native.clone(),
                        later_index,
                        earlier_shim: earlier.shim.clone(),
                        earlier_index,
                    });
                }
            }
        }

        Ok(CapabilityCatalog { entries })
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The set of symbols exported by the shim-definition unit.
///
/// Derived once per build run from the unit's source text; used to build the
/// import line prepended to every rewritten unit.
#[derive(Debug, Clone)]
pub struct ShimSymbols {
    symbols: Vec<String>,
}

impl ShimSymbols {
    /// Scan shim source text for exported symbol names.
    ///
    /// Recognizes `export function`, `export class`, `export var/let/const`,
    /// and `export { a, b as c }` forms, in source order, deduplicated.
    pub fn from_source(source: &str) -> ShimSymbols {
        let re_decl =
            Regex::new(r"(?m)^\s*export\s+(?:async\s+)?(?:function|class|var|let|const)\s+(\w+)")
                .unwrap();
        let re_list = Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").unwrap();
        let re_alias = Regex::new(r"(?:\w+\s+as\s+)?(\w+)\s*$").unwrap();

        let mut symbols: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !name.is_empty() && !symbols.iter().any(|s| s == name) {
                symbols.push(name.to_string());
            }
        };

        for cap in re_decl.captures_iter(source) {
            push(&cap[1]);
        }
        for cap in re_list.captures_iter(source) {
            for item in cap[1].split(',') {
                // `a as b` exports the alias `b`.
                if let Some(alias) = re_alias.captures(item.trim()) {
                    push(&alias[1]);
                }
            }
        }

        ShimSymbols { symbols }
    }

    /// Exported symbol names, in source order.
    pub fn names(&self) -> &[String] {
        &self.symbols
    }

    /// Whether the shim unit exported anything.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Build the import statement pulling every symbol from `import_path`.
    pub fn import_line(&self, import_path: &str) -> String {
        format!(
            "import {{{}}} from '{}'\n",
            self.symbols.join(", "),
            import_path
        )
    }
}
