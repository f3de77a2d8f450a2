//! Rewrite rule table.
//!
//! Static rename data plus the closed set of async-construct rules. Lookups
//! never fail: a miss means "leave the name alone".

use std::collections::{HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::builtin::{ENTRY_POINT, FACTORY_RENAMES, MODULE_RENAMES, TYPE_RENAMES};
use crate::error::RuleError;

/// `AsyncIterator` annotations become `Iterator`.
pub const ASYNC_ITERATOR: (&str, &str) = ("AsyncIterator", "Iterator");

/// Scope hooks of `async def` methods.
pub const LIFECYCLE_HOOKS: &[(&str, &str)] = &[("__aenter__", "__enter__"), ("__aexit__", "__exit__")];

/// Attribute names on transport objects.
pub const TRANSPORT_ATTRIBUTES: &[(&str, &str)] = &[("AsyncClient", "Client"), ("aclose", "close")];

/// Cooperative scheduler module and its blocking replacement.
pub const SCHEDULER_MODULE: &str = "asyncio";
/// Blocking module providing `sleep`.
pub const BLOCKING_MODULE: &str = "time";
/// The only scheduler entry point with a blocking equivalent.
pub const SLEEP: &str = "sleep";

/// Async-flavored names with no blocking rule. Meeting one is an error.
pub const UNSUPPORTED_NAMES: &[&str] = &[
    "__aiter__",
    "__anext__",
    "aiter",
    "anext",
    "asynccontextmanager",
    "AsyncGenerator",
    "AsyncIterable",
    "AsyncContextManager",
    "StopAsyncIteration",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// One async construct and its blocking replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AsyncConstructRule {
    /// `async def` → `def`, with `__aenter__`/`__aexit__` renamed.
    FunctionDefinition,
    /// `await expr` → `expr`.
    Await,
    /// `async with` → `with`.
    AsyncWith,
    /// `async for` → `for`.
    AsyncFor,
    /// `async for` clauses inside comprehensions.
    AsyncComprehension,
    /// `AsyncIterator` → `Iterator`.
    AsyncIteratorAnnotation,
    /// `.AsyncClient` → `.Client`, `.aclose` → `.close`.
    TransportAttribute,
    /// `asyncio` imports and `asyncio.sleep` → `time`.
    AsyncioSleep,
    /// Renamed type names inside string annotations.
    ForwardReference,
}

impl AsyncConstructRule {
    /// Every rule, in rule-number order.
    pub const ALL: [Self; 9] = [
        Self::FunctionDefinition,
        Self::Await,
        Self::AsyncWith,
        Self::AsyncFor,
        Self::AsyncComprehension,
        Self::AsyncIteratorAnnotation,
        Self::TransportAttribute,
        Self::AsyncioSleep,
        Self::ForwardReference,
    ];

    /// 1-based rule number.
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Self::FunctionDefinition => 1,
            Self::Await => 2,
            Self::AsyncWith => 3,
            Self::AsyncFor => 4,
            Self::AsyncComprehension => 5,
            Self::AsyncIteratorAnnotation => 6,
            Self::TransportAttribute => 7,
            Self::AsyncioSleep => 8,
            Self::ForwardReference => 9,
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::FunctionDefinition => "async def -> def",
            Self::Await => "await expr -> expr",
            Self::AsyncWith => "async with -> with",
            Self::AsyncFor => "async for -> for",
            Self::AsyncComprehension => "async comprehension clause -> for",
            Self::AsyncIteratorAnnotation => "AsyncIterator -> Iterator",
            Self::TransportAttribute => "transport attribute rename",
            Self::AsyncioSleep => "asyncio.sleep -> time.sleep",
            Self::ForwardReference => "forward reference rename",
        }
    }
}

impl fmt::Display for AsyncConstructRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} ({})", self.number(), self.description())
    }
}

/// Blocking name for an `async def` scope hook.
#[must_use]
pub fn lifecycle_hook(name: &str) -> Option<&'static str> {
    lookup_pairs(LIFECYCLE_HOOKS, name)
}

/// Blocking attribute name for a transport attribute.
#[must_use]
pub fn transport_attribute(name: &str) -> Option<&'static str> {
    lookup_pairs(TRANSPORT_ATTRIBUTES, name)
}

/// Whether a dotted import path names the scheduler module or one of its
/// submodules.
#[must_use]
pub fn is_scheduler_path(path: &str) -> bool {
    path.strip_prefix(SCHEDULER_MODULE)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Whether `name` is async-flavored with no blocking rule.
#[must_use]
pub fn is_unsupported_name(name: &str) -> bool {
    UNSUPPORTED_NAMES.contains(&name)
}

fn lookup_pairs(pairs: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    pairs.iter().find(|(from, _)| *from == name).map(|(_, to)| *to)
}

/// Type, factory and module rename tables.
#[derive(Debug, Clone)]
pub struct RenameTable {
    types: HashMap<String, String>,
    factories: Vec<(String, String)>,
    merged: HashMap<String, String>,
    modules: HashMap<String, String>,
    entry_point: String,
    forward_refs: Option<Regex>,
}

static BUILTIN: Lazy<Result<RenameTable, RuleError>> =
    Lazy::new(|| RenameTable::new(TYPE_RENAMES, FACTORY_RENAMES, MODULE_RENAMES, ENTRY_POINT));

impl RenameTable {
    /// The tables embedded in this crate.
    ///
    /// # Errors
    /// Only if the embedded tables break a table invariant.
    pub fn builtin() -> Result<&'static Self, RuleError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Build and validate a table.
    ///
    /// # Errors
    /// `RuleError` when keys collide across or within tables, when a name is
    /// a keyword or not an identifier, or when `entry_point` is not a type key.
    pub fn new(
        types: &[(&str, &str)],
        factories: &[(&str, &str)],
        modules: &[(&str, &str)],
        entry_point: &str,
    ) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for (from, to) in types.iter().chain(factories) {
            check_identifier(from)?;
            check_identifier(to)?;
            if !seen.insert(*from) {
                return Err(if types.iter().any(|(k, _)| k == from)
                    && factories.iter().any(|(k, _)| k == from)
                {
                    RuleError::Overlap((*from).to_string())
                } else {
                    RuleError::Duplicate((*from).to_string())
                });
            }
        }

        let mut module_map = HashMap::new();
        for (from, to) in modules {
            check_module_path(from)?;
            check_module_path(to)?;
            if module_map.insert((*from).to_string(), (*to).to_string()).is_some() {
                return Err(RuleError::Duplicate((*from).to_string()));
            }
        }

        let types: HashMap<String, String> = to_owned_pairs(types).collect();
        if !types.contains_key(entry_point) {
            return Err(RuleError::UnknownEntryPoint(entry_point.to_string()));
        }
        let factories: Vec<(String, String)> = to_owned_pairs(factories).collect();
        let merged = types
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(factories.iter().cloned())
            .collect();
        let forward_refs = forward_reference_pattern(&types)?;

        Ok(Self {
            types,
            factories,
            merged,
            modules: module_map,
            entry_point: entry_point.to_string(),
            forward_refs,
        })
    }

    /// Merged type and factory lookup.
    #[must_use]
    pub fn lookup_rename(&self, name: &str) -> Option<&str> {
        self.merged.get(name).map(String::as_str)
    }

    /// Rename for an identifier in expression or annotation position.
    ///
    /// Returns the new name and, when the rename comes from an async rule
    /// rather than the tables, which rule produced it.
    #[must_use]
    pub fn rename_identifier(&self, name: &str) -> Option<(&str, Option<AsyncConstructRule>)> {
        if let Some(target) = self.lookup_rename(name) {
            return Some((target, None));
        }
        (name == ASYNC_ITERATOR.0)
            .then_some((ASYNC_ITERATOR.1, Some(AsyncConstructRule::AsyncIteratorAnnotation)))
    }

    /// Mirror path for an import path: exact match first, then the longest
    /// listed prefix ending on a dot boundary.
    #[must_use]
    pub fn lookup_module(&self, path: &str) -> Option<String> {
        if let Some(target) = self.modules.get(path) {
            return Some(target.clone());
        }
        self.modules
            .iter()
            .filter(|(from, _)| {
                path.len() > from.len()
                    && path.starts_with(from.as_str())
                    && path.as_bytes()[from.len()] == b'.'
            })
            .max_by_key(|(from, _)| from.len())
            .map(|(from, to)| format!("{to}{}", &path[from.len()..]))
    }

    /// Replace renamed type names inside a string annotation.
    ///
    /// Only whole identifiers are replaced, so `AsyncTidelineConfig` is left
    /// alone when only `AsyncTideline` is renamed. Returns `None` when
    /// nothing changed.
    #[must_use]
    pub fn replace_forward_references(&self, text: &str) -> Option<String> {
        let pattern = self.forward_refs.as_ref()?;
        if !pattern.is_match(text) {
            return None;
        }
        let replaced = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            let found = &caps[0];
            self.types
                .get(found)
                .map_or_else(|| ASYNC_ITERATOR.1.to_string(), Clone::clone)
        });
        Some(replaced.into_owned())
    }

    /// Type renames.
    #[must_use]
    pub fn type_renames(&self) -> &HashMap<String, String> {
        &self.types
    }

    /// Factory renames in declaration order.
    #[must_use]
    pub fn factory_renames(&self) -> &[(String, String)] {
        &self.factories
    }

    /// Module path renames.
    #[must_use]
    pub fn module_renames(&self) -> &HashMap<String, String> {
        &self.modules
    }

    /// Async entry-point type name.
    #[must_use]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Blocking entry-point type name.
    #[must_use]
    pub fn sync_entry_point(&self) -> &str {
        self.types
            .get(&self.entry_point)
            .map_or(self.entry_point.as_str(), String::as_str)
    }

    /// Names the mirror manifest re-exports: the blocking entry point, then
    /// every factory target in table order.
    #[must_use]
    pub fn manifest_exports(&self) -> Vec<&str> {
        std::iter::once(self.sync_entry_point())
            .chain(self.factories.iter().map(|(_, to)| to.as_str()))
            .collect()
    }
}

fn to_owned_pairs<'a>(
    pairs: &'a [(&'a str, &'a str)],
) -> impl Iterator<Item = (String, String)> + 'a {
    pairs
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
}

fn forward_reference_pattern(types: &HashMap<String, String>) -> Result<Option<Regex>, RuleError> {
    let mut names: Vec<&str> = types.keys().map(String::as_str).collect();
    names.push(ASYNC_ITERATOR.0);
    // Longest first so alternation prefers the full identifier
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b"))
        .map(Some)
        .map_err(|e| RuleError::Pattern(e.to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn check_identifier(name: &str) -> Result<(), RuleError> {
    if PYTHON_KEYWORDS.contains(&name) {
        return Err(RuleError::Keyword(name.to_string()));
    }
    if !is_identifier(name) {
        return Err(RuleError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

fn check_module_path(path: &str) -> Result<(), RuleError> {
    let rest = path.trim_start_matches('.');
    if rest.is_empty() && !path.is_empty() {
        return Ok(());
    }
    let valid = !rest.is_empty()
        && rest
            .split('.')
            .all(|segment| is_identifier(segment) && !PYTHON_KEYWORDS.contains(&segment));
    if valid {
        Ok(())
    } else {
        Err(RuleError::InvalidModulePath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let table = RenameTable::builtin().unwrap();
        assert_eq!(table.type_renames().len(), TYPE_RENAMES.len());
        assert_eq!(table.factory_renames().len(), FACTORY_RENAMES.len());
        assert_eq!(table.sync_entry_point(), "Tideline");
    }

    #[test]
    fn test_rule_numbers_are_sequential() {
        let numbers: Vec<_> = AsyncConstructRule::ALL.iter().map(|r| r.number()).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_module_prefix_lookup() {
        let table = RenameTable::builtin().unwrap();
        assert_eq!(
            table.lookup_module("tideline.resources.companies").as_deref(),
            Some("tideline._sync.resources.companies")
        );
        assert_eq!(
            table.lookup_module("tideline.client").as_deref(),
            Some("tideline._sync.client")
        );
        assert_eq!(table.lookup_module("tideline.clientele"), None);
        assert_eq!(table.lookup_module("tideline.models"), None);
    }

    #[test]
    fn test_forward_reference_whole_words() {
        let table = RenameTable::builtin().unwrap();
        assert_eq!(
            table.replace_forward_references("AsyncTideline").as_deref(),
            Some("Tideline")
        );
        assert_eq!(
            table
                .replace_forward_references("Optional[AsyncCompaniesService]")
                .as_deref(),
            Some("Optional[CompaniesService]")
        );
        assert_eq!(table.replace_forward_references("AsyncTidelineConfig"), None);
        assert_eq!(table.replace_forward_references("MyAsyncTideline"), None);
    }

    #[test]
    fn test_module_path_validation() {
        assert!(check_module_path("tideline._sync").is_ok());
        assert!(check_module_path("..models").is_ok());
        assert!(check_module_path(".").is_ok());
        assert!(check_module_path("tideline..x").is_err());
        assert!(check_module_path("").is_err());
    }

    #[test]
    fn test_scheduler_paths() {
        assert!(is_scheduler_path("asyncio"));
        assert!(is_scheduler_path("asyncio.subprocess"));
        assert!(!is_scheduler_path("asyncio_extras"));
        assert!(!is_scheduler_path("tideline.asyncio"));
    }
}
