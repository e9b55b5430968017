//! The bundler seam and the in-tree reference bundler.
//!
//! The assembly driver consumes a bundler as an external collaborator
//! through the `Bundler` trait: hand it an entry unit and a stage pipeline,
//! get back a flat module body. `LinkerBundler` is the built-in reference
//! implementation: it walks relative static imports, runs the pipeline's
//! resolve/load/transform hooks at the points a real bundler would, orders
//! modules dependency-first, and links bindings by flat-scope convention.
//! It is deliberately simple - no live-binding semantics, no namespace
//! imports, no tree shaking - and any production bundler can replace it at
//! the trait seam.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;

use crate::core::project::Project;
use crate::core::target::{BuildTarget, OutputFormat, OutputSpec};
use crate::util::fs;

/// A module bundler consumed as a black box, call-and-return.
pub trait Bundler: Send + Sync {
    /// Resolve the module graph from the target's entry and produce a flat
    /// bundle, invoking the target's resolve/load/transform hooks along the
    /// way.
    fn bundle(&self, project: &Project, target: &BuildTarget) -> Result<Bundle>;
}

/// One module's processed code inside a bundle.
#[derive(Debug, Clone)]
pub struct BundledModule {
    /// Module identifier (absolute path or synthetic id).
    pub id: String,

    /// Code with module syntax stripped and bindings linked.
    pub code: String,
}

/// A name exported by the entry unit: (exported name, local identifier).
pub type ExportBinding = (String, String);

/// The bundler's output: modules in dependency-first order plus the entry's
/// public surface and the externals referenced anywhere in the graph.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Modules in emission order.
    pub modules: Vec<BundledModule>,

    /// External module names, in first-use order, deduplicated.
    pub externals: Vec<String>,

    /// Named exports of the entry unit.
    pub entry_exports: Vec<ExportBinding>,

    /// Local identifier holding the entry's default export, if any.
    pub entry_default: Option<String>,
}

impl Bundle {
    /// Flat module body, dependency-first, without any wrapper.
    pub fn body(&self) -> String {
        let mut body = String::new();
        for module in &self.modules {
            let code = module.code.trim_end();
            if code.is_empty() {
                continue;
            }
            body.push_str(code);
            body.push('\n');
        }
        body
    }

    /// Wrap `body` (the bundle body, possibly transpiled since `body()` was
    /// taken) in the output format described by `spec`.
    pub fn emit(&self, body: &str, spec: &OutputSpec) -> String {
        match spec.format {
            OutputFormat::Umd => self.emit_umd(body, spec),
            OutputFormat::Esm => self.emit_esm(body),
        }
    }

    fn emit_umd(&self, body: &str, spec: &OutputSpec) -> String {
        let global_name = spec.global_name.as_deref().unwrap_or("bundle");
        let amd_id = spec.amd_id.as_deref().unwrap_or(global_name);

        let requires: Vec<String> = self
            .externals
            .iter()
            .map(|name| format!(", require('{}')", name))
            .collect();
        let amd_deps: Vec<String> = self
            .externals
            .iter()
            .map(|name| format!(", '{}'", name))
            .collect();
        // Identity global bindings: external `fs` arrives as `global.fs`.
        let global_args: Vec<String> = self
            .externals
            .iter()
            .map(|name| format!(", {}", global_member(name)))
            .collect();
        let params: Vec<String> = self
            .externals
            .iter()
            .map(|name| format!(", {}", sanitize_ident(name)))
            .collect();

        let mut exports_tail = String::new();
        if let Some(ref local) = self.entry_default {
            exports_tail.push_str(&format!("exports.default = {};\n", local));
        }
        for (exported, local) in &self.entry_exports {
            exports_tail.push_str(&format!("exports.{} = {};\n", exported, local));
        }

        format!(
            "(function (global, factory) {{\n\
             \ttypeof exports === 'object' && typeof module !== 'undefined' ? factory(exports{requires}) :\n\
             \ttypeof define === 'function' && define.amd ? define('{amd_id}', ['exports'{amd_deps}], factory) :\n\
             \t(global = global || self, factory({global_target} = {{}}{global_args}));\n\
             }}(this, (function (exports{params}) {{ 'use strict';\n\n\
             {body}\n\
             {exports_tail}\n\
             }})));\n",
            requires = requires.concat(),
            amd_id = amd_id,
            amd_deps = amd_deps.concat(),
            global_target = global_member(global_name),
            global_args = global_args.concat(),
            params = params.concat(),
            body = body.trim_end(),
            exports_tail = exports_tail,
        )
    }

    fn emit_esm(&self, body: &str) -> String {
        let mut out = String::new();
        for name in &self.externals {
            out.push_str(&format!("import * as {} from '{}';\n", sanitize_ident(name), name));
        }
        if !self.externals.is_empty() {
            out.push('\n');
        }
        out.push_str(body.trim_end());
        out.push('\n');
        if let Some(ref local) = self.entry_default {
            out.push_str(&format!("export default {};\n", local));
        }
        if !self.entry_exports.is_empty() {
            let list: Vec<String> = self
                .entry_exports
                .iter()
                .map(|(exported, local)| {
                    if exported == local {
                        exported.clone()
                    } else {
                        format!("{} as {}", local, exported)
                    }
                })
                .collect();
            out.push_str(&format!("export {{ {} }};\n", list.join(", ")));
        }
        out
    }
}

/// `global.fs` for identifier-safe names, `global['zlib-js']` otherwise.
fn global_member(name: &str) -> String {
    if is_ident(name) {
        format!("global.{}", name)
    } else {
        format!("global['{}']", name)
    }
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Turn a module name into a safe flat-scope identifier.
fn sanitize_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// How an import specifier resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Resolution {
    /// Another module in the graph, by id.
    Internal(String),

    /// Left external; resolved by the consuming environment.
    External(String),
}

/// One parsed static import site.
#[derive(Debug, Clone)]
struct ImportSite {
    /// Import clause text (`D`, `{a, b as c}`, `* as ns`), if any.
    clause: Option<String>,

    /// What the specifier resolved to.
    resolution: Resolution,
}

/// A module during graph construction.
#[derive(Debug)]
struct ModuleRecord {
    id: String,
    path: Option<PathBuf>,
    content: String,
    imports: Vec<ImportSite>,
    /// Re-export specifiers resolved from this module (`export .. from`).
    reexport_lists: Vec<String>,
}

/// The in-tree reference bundler.
#[derive(Debug, Clone, Default)]
pub struct LinkerBundler;

impl LinkerBundler {
    /// Create the bundler.
    pub fn new() -> LinkerBundler {
        LinkerBundler
    }
}

struct GraphBuilder<'a> {
    project: &'a Project,
    target: &'a BuildTarget,
    import_re: Regex,
    export_from_re: Regex,
    modules: Vec<ModuleRecord>,
    index_of: HashMap<String, usize>,
}

impl<'a> GraphBuilder<'a> {
    fn new(project: &'a Project, target: &'a BuildTarget) -> GraphBuilder<'a> {
        GraphBuilder {
            project,
            target,
            import_re: Regex::new(
                r#"(?m)^[ \t]*import\s+(?:([\w$]+(?:\s*,\s*\{[^}]*\})?|\*\s+as\s+[\w$]+|\{[^}]*\})\s+from\s+)?['"]([^'"]+)['"][ \t]*;?"#,
            )
            .unwrap(),
            export_from_re: Regex::new(
                r#"(?m)^[ \t]*export\s+(\*|\{[^}]*\})\s+from\s+['"]([^'"]+)['"][ \t]*;?"#,
            )
            .unwrap(),
            modules: Vec::new(),
            index_of: HashMap::new(),
        }
    }

    /// Run the resolve hooks, then fall back to normal resolution.
    fn resolve(&self, specifier: &str, importer: Option<&Path>) -> Result<Resolution> {
        for stage in self.target.stages.resolvers() {
            if let Some(id) = stage.resolve(specifier, importer) {
                return Ok(Resolution::Internal(id));
            }
        }

        if self.target.externals.contains(specifier) {
            return Ok(Resolution::External(specifier.to_string()));
        }

        if specifier.starts_with('.') {
            let base = importer
                .and_then(|p| p.parent())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| self.project.root().to_path_buf());
            let mut resolved = base.join(specifier);
            if !resolved.exists() && resolved.extension().is_none() {
                resolved.set_extension("js");
            }
            let resolved = fs::normalize_path(&resolved);
            return Ok(Resolution::Internal(resolved.to_string_lossy().into_owned()));
        }

        if Path::new(specifier).is_absolute() {
            return Ok(Resolution::Internal(specifier.to_string()));
        }

        bail!(
            "cannot resolve `{}`{}\n\
             hint: declare it in package.json dependencies to keep it external",
            specifier,
            importer
                .map(|p| format!(" imported by {}", p.display()))
                .unwrap_or_default()
        )
    }

    /// Run the load hooks, then fall back to the filesystem.
    fn load(&self, id: &str) -> Result<String> {
        for stage in self.target.stages.loaders() {
            if let Some(content) = stage.load(id) {
                return Ok(content);
            }
        }
        let path = Path::new(id);
        if path.is_file() {
            return fs::read_to_string(path);
        }
        bail!("module not found: {}", id)
    }

    /// Run the transform hooks in pipeline order.
    fn transform(&self, mut content: String, id: &str) -> Result<String> {
        let path = Path::new(id);
        for stage in self.target.stages.transformers() {
            if let Some(rewritten) = stage
                .transform(&content, path)
                .with_context(|| format!("stage `{}` failed on {}", stage.name(), id))?
            {
                content = rewritten;
            }
        }
        Ok(content)
    }

    /// Load, transform, and scan a module, recursing into internal deps.
    fn add_module(&mut self, id: String) -> Result<usize> {
        if let Some(&index) = self.index_of.get(&id) {
            return Ok(index);
        }

        let raw = self.load(&id)?;
        let content = self.transform(raw, &id)?;

        let path = if id.starts_with('\0') {
            None
        } else {
            Some(PathBuf::from(&id))
        };

        let index = self.modules.len();
        self.index_of.insert(id.clone(), index);
        self.modules.push(ModuleRecord {
            id,
            path,
            content,
            imports: Vec::new(),
            reexport_lists: Vec::new(),
        });

        // Scan after insertion so cycles terminate; captures are collected
        // first because resolution borrows self.
        let content = self.modules[index].content.clone();
        let importer = self.modules[index].path.clone();

        let mut imports = Vec::new();
        for caps in self.import_re.captures_iter(&content) {
            let clause = caps.get(1).map(|m| m.as_str().to_string());
            let spec = caps[2].to_string();
            let resolution = self.resolve(&spec, importer.as_deref())?;
            imports.push(ImportSite { clause, resolution });
        }

        let mut reexports = Vec::new();
        for caps in self.export_from_re.captures_iter(&content) {
            let list = caps[1].to_string();
            if list == "*" {
                bail!(
                    "`export * from` in {} is not supported by the reference bundler\n\
                     hint: re-export the names explicitly",
                    self.modules[index].id
                );
            }
            let spec = caps[2].to_string();
            let resolution = self.resolve(&spec, importer.as_deref())?;
            imports.push(ImportSite {
                clause: None,
                resolution: resolution.clone(),
            });
            reexports.push(list);
        }

        for site in &imports {
            if let Resolution::Internal(dep) = &site.resolution {
                self.add_module(dep.clone())?;
            }
        }

        self.modules[index].imports = imports;
        self.modules[index].reexport_lists = reexports;
        Ok(index)
    }
}

impl Bundler for LinkerBundler {
    fn bundle(&self, project: &Project, target: &BuildTarget) -> Result<Bundle> {
        let entry_path = fs::normalize_path(&project.resolve(&target.entry));
        if !entry_path.is_file() {
            bail!("entry not found: {}", entry_path.display());
        }
        let entry_id = entry_path.to_string_lossy().into_owned();

        let mut builder = GraphBuilder::new(project, target);
        let entry_index = builder.add_module(entry_id)?;
        let records = builder.modules;
        let index_of = builder.index_of;

        // Dependency-first emission order via toposort of importer -> dep
        // edges, reversed.
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..records.len()).map(|i| graph.add_node(i)).collect();
        for (importer, record) in records.iter().enumerate() {
            for site in &record.imports {
                if let Resolution::Internal(dep) = &site.resolution {
                    let dep_index = index_of[dep];
                    if dep_index != importer {
                        graph.add_edge(nodes[importer], nodes[dep_index], ());
                    }
                }
            }
        }
        let mut order: Vec<usize> = toposort(&graph, None)
            .map_err(|cycle| {
                anyhow::anyhow!(
                    "import cycle involving {}",
                    records[graph[cycle.node_id()]].id
                )
            })?
            .into_iter()
            .map(|node| graph[node])
            .collect();
        order.reverse();

        link_modules(&records, &index_of, entry_index, &order)
    }
}

/// Strip module syntax and link bindings by flat-scope convention.
fn link_modules(
    records: &[ModuleRecord],
    index_of: &HashMap<String, usize>,
    entry_index: usize,
    order: &[usize],
) -> Result<Bundle> {
    let export_decl_re =
        Regex::new(r"(?m)^([ \t]*)export\s+((?:async\s+)?(?:function|class|var|let|const)\s+([\w$]+))")
            .unwrap();
    let export_default_re = Regex::new(r"(?m)^([ \t]*)export\s+default\s+").unwrap();
    let export_list_re = Regex::new(r"(?m)^[ \t]*export\s*\{([^}]*)\}[ \t]*;?[ \t]*\r?\n?").unwrap();
    let import_re = Regex::new(
        r#"(?m)^[ \t]*(?:import|export)\s+(?:(?:[\w$]+(?:\s*,\s*\{[^}]*\})?|\*\s+as\s+[\w$]+|\{[^}]*\}|\*)\s+from\s+)?['"][^'"]+['"][ \t]*;?[ \t]*\r?\n?"#,
    )
    .unwrap();

    let mut externals: Vec<String> = Vec::new();
    let mut modules = Vec::new();
    let mut entry_exports: Vec<ExportBinding> = Vec::new();
    let mut entry_default = None;

    for &index in order {
        let record = &records[index];
        let is_entry = index == entry_index;
        let default_var = default_var_for(index);

        // Binding prelude: one line per import binding the flat scope does
        // not already satisfy.
        let mut prelude = String::new();
        for site in &record.imports {
            let Some(clause) = &site.clause else { continue };
            match &site.resolution {
                Resolution::Internal(dep) => {
                    let dep_default = default_var_for(index_of[dep]);
                    for binding in parse_clause(clause)? {
                        match binding {
                            Binding::Default(local) => {
                                prelude.push_str(&format!("var {} = {};\n", local, dep_default));
                            }
                            Binding::Named { imported, local } => {
                                if imported != local {
                                    prelude
                                        .push_str(&format!("var {} = {};\n", local, imported));
                                }
                            }
                            Binding::Namespace(_) => bail!(
                                "namespace import of internal module {} in {} is not supported \
                                 by the reference bundler",
                                dep,
                                record.id
                            ),
                        }
                    }
                }
                Resolution::External(name) => {
                    if !externals.contains(name) {
                        externals.push(name.clone());
                    }
                    let param = sanitize_ident(name);
                    for binding in parse_clause(clause)? {
                        match binding {
                            Binding::Default(local) | Binding::Namespace(local) => {
                                if local != param {
                                    prelude.push_str(&format!("var {} = {};\n", local, param));
                                }
                            }
                            Binding::Named { imported, local } => {
                                prelude.push_str(&format!(
                                    "var {} = {}.{};\n",
                                    local, param, imported
                                ));
                            }
                        }
                    }
                }
            }
        }
        // Side-effect externals (`import 'x'`) still count as externals.
        for site in &record.imports {
            if site.clause.is_none() {
                if let Resolution::External(name) = &site.resolution {
                    if !externals.contains(name) {
                        externals.push(name.clone());
                    }
                }
            }
        }

        let mut code = import_re.replace_all(&record.content, "").into_owned();

        if is_entry {
            for list in &record.reexport_lists {
                let inner = list.trim_start_matches('{').trim_end_matches('}');
                entry_exports.extend(parse_export_list(inner));
            }
        }

        for caps in export_list_re.captures_iter(&code.clone()) {
            if is_entry {
                entry_exports.extend(parse_export_list(&caps[1]));
            }
        }
        code = export_list_re.replace_all(&code, "").into_owned();

        if is_entry {
            for caps in export_decl_re.captures_iter(&code) {
                entry_exports.push((caps[3].to_string(), caps[3].to_string()));
            }
        }
        code = export_decl_re.replace_all(&code, "${1}${2}").into_owned();

        if export_default_re.is_match(&code) {
            code = export_default_re
                .replace(&code, format!("${{1}}var {} = ", default_var).as_str())
                .into_owned();
            if is_entry {
                entry_default = Some(default_var.clone());
            }
        }

        modules.push(BundledModule {
            id: record.id.clone(),
            code: format!("{}{}", prelude, code),
        });
    }

    Ok(Bundle {
        modules,
        externals,
        entry_exports,
        entry_default,
    })
}

fn default_var_for(index: usize) -> String {
    format!("__m{}_default", index)
}

/// One binding introduced by an import clause.
#[derive(Debug, PartialEq, Eq)]
enum Binding {
    Default(String),
    Namespace(String),
    Named { imported: String, local: String },
}

/// Parse an import clause into its bindings.
fn parse_clause(clause: &str) -> Result<Vec<Binding>> {
    let clause = clause.trim();
    let mut bindings = Vec::new();

    if let Some(ns) = clause.strip_prefix('*') {
        let local = ns.trim().strip_prefix("as").map(str::trim);
        match local {
            Some(local) if is_ident(local) => bindings.push(Binding::Namespace(local.to_string())),
            _ => bail!("malformed namespace import clause: `{}`", clause),
        }
        return Ok(bindings);
    }

    let (default_part, named_part) = match clause.find('{') {
        Some(pos) => (
            clause[..pos].trim().trim_end_matches(',').trim(),
            Some(clause[pos..].trim_start_matches('{').trim_end_matches('}')),
        ),
        None => (clause, None),
    };

    if !default_part.is_empty() {
        if !is_ident(default_part) {
            bail!("malformed import clause: `{}`", clause);
        }
        bindings.push(Binding::Default(default_part.to_string()));
    }

    if let Some(named) = named_part {
        for item in named.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (imported, local) = match item.split_once(" as ") {
                Some((imported, local)) => (imported.trim(), local.trim()),
                None => (item, item),
            };
            bindings.push(Binding::Named {
                imported: imported.to_string(),
                local: local.to_string(),
            });
        }
    }

    Ok(bindings)
}

/// Parse an `export { a, b as c }` list into (exported, local) pairs.
fn parse_export_list(inner: &str) -> Vec<ExportBinding> {
    inner
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            Some(match item.split_once(" as ") {
                Some((local, exported)) => (exported.trim().to_string(), local.trim().to_string()),
                None => (item.to_string(), item.to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::externals::ExternalModules;
    use crate::core::manifest::Manifest;
    use crate::stage::{FileSubstitution, Stage, StagePipeline};
    use std::fs as stdfs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project_in(tmp: &TempDir) -> Project {
        let manifest = Manifest::parse(r#"{"name": "mylib"}"#).unwrap();
        Project::new(tmp.path(), manifest)
    }

    fn write(tmp: &TempDir, rel: &str, content: &str) {
        let path = tmp.path().join(rel);
        stdfs::create_dir_all(path.parent().unwrap()).unwrap();
        stdfs::write(path, content).unwrap();
    }

    #[test]
    fn test_bundles_dependency_first() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "src/entry.js", "import {helper} from './util.js'\nexport default helper()\n");
        write(&tmp, "src/util.js", "export function helper() { return 1 }\n");

        let target = BuildTarget::new("t", "src/entry.js");
        let bundle = LinkerBundler::new().bundle(&project_in(&tmp), &target).unwrap();

        assert_eq!(bundle.modules.len(), 2);
        assert!(bundle.modules[0].id.ends_with("util.js"));
        assert!(bundle.modules[1].id.ends_with("entry.js"));

        let body = bundle.body();
        assert!(body.contains("function helper()"));
        assert!(!body.contains("import"));
        assert!(!body.contains("export"));
        assert_eq!(bundle.entry_default.as_deref(), Some("__m0_default"));
    }

    #[test]
    fn test_externals_stay_external() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "src/entry.js", "import fs from 'fs'\nexport var read = fs.readFileSync\n");

        let target = BuildTarget::new("t", "src/entry.js")
            .with_externals(ExternalModules::from_names(["fs"]));
        let bundle = LinkerBundler::new().bundle(&project_in(&tmp), &target).unwrap();

        assert_eq!(bundle.externals, vec!["fs"]);
        assert_eq!(bundle.modules.len(), 1);
        assert_eq!(bundle.entry_exports, vec![("read".to_string(), "read".to_string())]);
    }

    #[test]
    fn test_unresolvable_bare_specifier_fails() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "src/entry.js", "import x from 'left-pad'\n");

        let target = BuildTarget::new("t", "src/entry.js");
        let err = LinkerBundler::new()
            .bundle(&project_in(&tmp), &target)
            .unwrap_err();
        assert!(err.to_string().contains("left-pad"));
        assert!(err.to_string().contains("dependencies"));
    }

    #[test]
    fn test_substitution_prunes_subtree() {
        let tmp = TempDir::new().unwrap();
        write(
            &tmp,
            "src/entry.js",
            "import reader from './file/FsReader.js'\nexport default reader\n",
        );
        // The real file imports a module that does not exist; it must never
        // be read.
        write(&tmp, "src/file/FsReader.js", "import missing from './nope.js'\n");

        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(FileSubstitution::new("FsReader.js"))];
        let target =
            BuildTarget::new("t", "src/entry.js").with_stages(StagePipeline::new(stages));
        let bundle = LinkerBundler::new().bundle(&project_in(&tmp), &target).unwrap();

        assert_eq!(bundle.modules.len(), 2);
        assert!(bundle.modules[0].id.starts_with('\0'));
    }

    #[test]
    fn test_import_cycle_reported() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "src/a.js", "import {b} from './b.js'\nexport var a = 1\n");
        write(&tmp, "src/b.js", "import {a} from './a.js'\nexport var b = 2\n");

        let target = BuildTarget::new("t", "src/a.js");
        let err = LinkerBundler::new()
            .bundle(&project_in(&tmp), &target)
            .unwrap_err();
        assert!(err.to_string().contains("import cycle"));
    }

    #[test]
    fn test_extensionless_import_probes_js() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "src/entry.js", "import {v} from './util'\nexport var out = v\n");
        write(&tmp, "src/util.js", "export var v = 7\n");

        let target = BuildTarget::new("t", "src/entry.js");
        let bundle = LinkerBundler::new().bundle(&project_in(&tmp), &target).unwrap();
        assert_eq!(bundle.modules.len(), 2);
    }

    #[test]
    fn test_emit_umd_wrapper() {
        let bundle = Bundle {
            modules: vec![],
            externals: vec!["fs".to_string(), "zlib-js".to_string()],
            entry_exports: vec![("parse".to_string(), "parse".to_string())],
            entry_default: Some("__m0_default".to_string()),
        };
        let spec = OutputSpec::umd("dist/mini.legacy.umd.js", "exifr");
        let out = bundle.emit("var parse = 1\nvar __m0_default = parse\n", &spec);

        assert!(out.contains("require('fs'), require('zlib-js')"));
        assert!(out.contains("define('exifr', ['exports', 'fs', 'zlib-js'], factory)"));
        assert!(out.contains("global.exifr = {}"));
        assert!(out.contains("global.fs, global['zlib-js']"));
        assert!(out.contains("function (exports, fs, zlib_js)"));
        assert!(out.contains("exports.default = __m0_default;"));
        assert!(out.contains("exports.parse = parse;"));
    }

    #[test]
    fn test_emit_esm() {
        let bundle = Bundle {
            modules: vec![],
            externals: vec!["fs".to_string()],
            entry_exports: vec![("parse".to_string(), "__parse".to_string())],
            entry_default: Some("__m0_default".to_string()),
        };
        let out = bundle.emit("var __parse = 1\nvar __m0_default = 2\n", &OutputSpec::esm("dist/mini.esm.js"));

        assert!(out.starts_with("import * as fs from 'fs';\n"));
        assert!(out.contains("export default __m0_default;"));
        assert!(out.contains("export { __parse as parse };"));
    }

    #[test]
    fn test_parse_clause_forms() {
        assert_eq!(
            parse_clause("D").unwrap(),
            vec![Binding::Default("D".to_string())]
        );
        assert_eq!(
            parse_clause("{a, b as c}").unwrap(),
            vec![
                Binding::Named { imported: "a".to_string(), local: "a".to_string() },
                Binding::Named { imported: "b".to_string(), local: "c".to_string() },
            ]
        );
        assert_eq!(
            parse_clause("D, {a}").unwrap(),
            vec![
                Binding::Default("D".to_string()),
                Binding::Named { imported: "a".to_string(), local: "a".to_string() },
            ]
        );
        assert_eq!(
            parse_clause("* as ns").unwrap(),
            vec![Binding::Namespace("ns".to_string())]
        );
    }
}
