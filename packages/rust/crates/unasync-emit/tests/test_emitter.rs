//! Tests for emitter module - mirror generation over a fixture package.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use unasync_ast::SyntaxTree;
use unasync_emit::{EmitConfig, EmitError, Emitter, MANIFEST_FILE, declared_exports};
use unasync_rewrite::RenameTable;
use unasync_rewrite::builtin::FACTORY_RENAMES;

const CLIENT: &str = r#"import asyncio

import httpx

from tideline._pagination import AsyncPaginator
from tideline.resources.companies import AsyncCompaniesService
from tideline.resources.contacts import AsyncContactsService


class AsyncTideline:
    def __init__(self, base_url: str) -> None:
        self._http = httpx.AsyncClient(base_url=base_url)
        self.companies = AsyncCompaniesService(self)
        self.contacts = AsyncContactsService(self)

    async def __aenter__(self) -> "AsyncTideline":
        return self

    async def __aexit__(self, *exc) -> None:
        await self._http.aclose()

    async def request(self, method: str, path: str) -> dict:
        response = await self._http.request(method, path)
        await asyncio.sleep(0)
        return response.json()

    def paginate(self, path: str) -> AsyncPaginator:
        return AsyncPaginator(self, path)
"#;

const REGISTRY_HEAD: &str = r#"from typing import Optional

from tideline.client import AsyncTideline

_default: Optional[AsyncTideline] = None


def configure_async(base_url: str) -> AsyncTideline:
    global _default
    _default = AsyncTideline(base_url)
    return _default


def get_async_client() -> AsyncTideline:
    if _default is None:
        raise RuntimeError("no default client")
    return _default


def clear_async_client(client: AsyncTideline) -> None:
    global _default
    if _default is client:
        _default = None


def async_session(base_url: str) -> AsyncTideline:
    return AsyncTideline(base_url)
"#;

const PAGINATION: &str = r#"from typing import AsyncIterator


class AsyncPaginator:
    def __init__(self, client: "AsyncTideline", path: str) -> None:
        self._client = client
        self._path = path

    async def pages(self) -> AsyncIterator[dict]:
        page = 1
        while True:
            data = await self._client.request("GET", f"{self._path}?page={page}")
            if not data:
                return
            yield data
            page += 1
"#;

const COMPANIES: &str = r#"from tideline.registry import async_companies


class AsyncCompaniesService:
    def __init__(self, client: "AsyncTideline") -> None:
        self._client = client

    async def get(self, company_id: str) -> dict:
        return await self._client.request("GET", f"/companies/{company_id}")

    async def iter_all(self):
        async for page in self._client.paginate("/companies").pages():
            for item in page:
                yield item


def default_service() -> AsyncCompaniesService:
    return async_companies()
"#;

const CONTACTS: &str = r#"class AsyncContactsService:
    def __init__(self, client: "AsyncTideline") -> None:
        self._client = client

    async def list(self) -> list:
        return [c async for c in self._client.paginate("/contacts").pages()]
"#;

/// Registry with one factory per table entry after the four fixed ones.
fn registry() -> String {
    let mut out = REGISTRY_HEAD.to_string();
    for (from, to) in &FACTORY_RENAMES[4..] {
        out.push_str(&format!(
            "\n\ndef {from}():\n    return get_async_client().{to}\n"
        ));
    }
    out
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("Create dirs");
    fs::write(path, contents).expect("Write fixture");
}

fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Create temp dir");
    let root = dir.path().join("src").join("tideline");
    write(&root, "client.py", CLIENT);
    write(&root, "registry.py", &registry());
    write(&root, "_pagination.py", PAGINATION);
    write(&root, "resources/__init__.py", "\"\"\"Resource services.\"\"\"\n");
    write(&root, "resources/companies.py", COMPANIES);
    write(&root, "resources/contacts.py", CONTACTS);
    write(&root, "resources/notes.txt", "not python\n");
    (dir, root)
}

fn emitter(root: &Path) -> Emitter<'static> {
    let table = RenameTable::builtin().expect("builtin table");
    Emitter::new(EmitConfig::load(root), table)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Read output")
}

fn snapshot(mirror: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    for relative in [
        "__init__.py",
        "client.py",
        "registry.py",
        "_pagination.py",
        "resources/__init__.py",
        "resources/companies.py",
        "resources/contacts.py",
    ] {
        files.push((relative.to_string(), read(&mirror.join(relative))));
    }
    files
}

#[test]
fn test_inputs_are_fixed_modules_then_sorted_resources() {
    let (_dir, root) = fixture();
    let inputs = emitter(&root).inputs().expect("List inputs");
    let inputs: Vec<String> = inputs
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        inputs,
        [
            "client.py",
            "registry.py",
            "_pagination.py",
            "resources/__init__.py",
            "resources/companies.py",
            "resources/contacts.py",
        ]
    );
}

#[test]
fn test_emit_writes_mirror() {
    let (_dir, root) = fixture();
    let report = emitter(&root).emit().expect("Emit mirror");

    assert_eq!(report.converted, 6);
    assert_eq!(report.written, 7);
    assert_eq!(report.mirror, root.join("_sync"));
    assert!(!root.join("._sync.staging").exists());

    let client = read(&root.join("_sync/client.py"));
    assert!(client.starts_with(
        "# AUTO-GENERATED — do not edit. Run 'make sync' to regenerate.\nimport time\n"
    ));
    assert!(client.contains("from tideline._sync._pagination import Paginator\n"));
    assert!(client.contains("class Tideline:\n"));
    assert!(client.contains("self._http = httpx.Client(base_url=base_url)\n"));
    assert!(client.contains("    def __enter__(self) -> \"Tideline\":\n"));
    assert!(client.contains("    def __exit__(self, *exc) -> None:\n        self._http.close()\n"));
    assert!(client.contains("        response = self._http.request(method, path)\n"));
    assert!(client.contains("        time.sleep(0)\n"));

    let contacts = read(&root.join("_sync/resources/contacts.py"));
    assert!(contacts.contains("return [c for c in self._client.paginate(\"/contacts\").pages()]"));

    for (relative, contents) in snapshot(&root.join("_sync")) {
        let tree = SyntaxTree::parse(&contents).expect("Output should parse");
        assert_eq!(
            unasync_rewrite::find_residual_suspension(&tree),
            None,
            "{relative}"
        );
    }
}

#[test]
fn test_emit_is_deterministic() {
    let (_dir, root) = fixture();
    emitter(&root).emit().expect("First emit");
    let first = snapshot(&root.join("_sync"));
    emitter(&root).emit().expect("Second emit");
    let second = snapshot(&root.join("_sync"));
    assert_eq!(first, second);
}

#[test]
fn test_manifest_exports_match_table() {
    let (_dir, root) = fixture();
    emitter(&root).emit().expect("Emit mirror");

    let manifest = read(&root.join("_sync").join(MANIFEST_FILE));
    assert!(manifest.contains("from tideline._sync.client import Tideline\n"));
    assert!(manifest.contains("from tideline._sync.registry import (\n    configure,\n    get_client,\n"));

    let tree = SyntaxTree::parse(&manifest).expect("Manifest should parse");
    let exported: HashSet<String> = declared_exports(&tree).into_iter().collect();
    let expected: HashSet<String> = std::iter::once("Tideline")
        .chain(FACTORY_RENAMES.iter().map(|(_, to)| *to))
        .map(ToString::to_string)
        .collect();
    assert_eq!(exported, expected);
}

#[test]
fn test_factory_rename_across_files() {
    let (_dir, root) = fixture();
    emitter(&root).emit().expect("Emit mirror");

    let registry = read(&root.join("_sync/registry.py"));
    assert!(registry.contains("\ndef companies():\n    return get_client().companies\n"));
    assert!(registry.contains("\ndef configure(base_url: str) -> Tideline:\n"));
    assert!(registry.contains("_default: Optional[Tideline] = None\n"));
    assert!(!registry.contains("async"));

    let companies = read(&root.join("_sync/resources/companies.py"));
    assert!(companies.contains("from tideline._sync.registry import companies\n"));
    assert!(companies.contains("def default_service() -> CompaniesService:\n    return companies()\n"));
}

#[test]
fn test_parse_failure_keeps_previous_mirror() {
    let (_dir, root) = fixture();
    emitter(&root).emit().expect("Emit mirror");
    let before = snapshot(&root.join("_sync"));

    write(&root, "resources/contacts.py", "class AsyncContactsService(:\n    pass\n");
    let err = emitter(&root).emit().unwrap_err();
    match err {
        EmitError::Parse { path, .. } => assert!(path.contains("contacts.py")),
        other => panic!("unexpected: {other:?}"),
    }

    assert_eq!(snapshot(&root.join("_sync")), before);
    assert!(!root.join("._sync.staging").exists());
}

#[test]
fn test_unrecognized_construct_fails_the_run() {
    let (_dir, root) = fixture();
    write(
        &root,
        "resources/deals.py",
        "import asyncio\n\n\nasync def fan_out(a, b):\n    return await asyncio.gather(a, b)\n",
    );
    let err = emitter(&root).emit().unwrap_err();
    assert!(matches!(err, EmitError::Rewrite { ref path, .. } if path.contains("deals.py")));
    assert!(!root.join("_sync").exists());
}

#[test]
fn test_new_async_class_is_drift() {
    let (_dir, root) = fixture();
    write(
        &root,
        "resources/widgets.py",
        "class AsyncWidgetsService:\n    async def list(self):\n        return []\n",
    );
    let err = emitter(&root).emit().unwrap_err();
    match err {
        EmitError::RenameDrift { missing } => {
            assert_eq!(missing.len(), 1);
            assert!(missing[0].contains("AsyncWidgetsService"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(!root.join("_sync").exists());
}

#[test]
fn test_new_registry_function_is_drift() {
    let (_dir, root) = fixture();
    let mut source = registry();
    source.push_str("\n\ndef async_widgets():\n    return get_async_client().widgets\n");
    write(&root, "registry.py", &source);

    let err = emitter(&root).emit().unwrap_err();
    assert!(matches!(
        err,
        EmitError::RenameDrift { ref missing } if missing.iter().any(|m| m.contains("async_widgets"))
    ));
}

#[test]
fn test_missing_factory_definition_is_drift() {
    let (_dir, root) = fixture();
    write(&root, "registry.py", REGISTRY_HEAD);
    let err = emitter(&root).emit().unwrap_err();
    match err {
        EmitError::RenameDrift { missing } => {
            assert_eq!(missing.len(), FACTORY_RENAMES.len() - 4);
            assert!(missing.iter().any(|m| m.contains("`companies`")));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_missing_fixed_module() {
    let (_dir, root) = fixture();
    fs::remove_file(root.join("_pagination.py")).expect("Remove module");
    let err = emitter(&root).emit().unwrap_err();
    assert!(matches!(err, EmitError::MissingInput(ref m) if m == "_pagination.py"));
}

#[test]
fn test_check_mode() {
    let (_dir, root) = fixture();

    let report = emitter(&root).check().expect("Check before emit");
    assert_eq!(report.missing.len(), 7);
    assert!(!report.is_current());
    assert!(!root.join("_sync").exists());

    emitter(&root).emit().expect("Emit mirror");
    let report = emitter(&root).check().expect("Check after emit");
    assert!(report.is_current());
    assert!(report.diffs.is_empty());

    let client = root.join("_sync/client.py");
    let edited = read(&client).replace("time.sleep(0)", "time.sleep(1)");
    fs::write(&client, edited).expect("Edit mirror");
    write(&root, "_sync/resources/stale.py", "x = 1\n");
    fs::create_dir_all(root.join("_sync/__pycache__")).expect("Create cache dir");
    write(&root, "_sync/__pycache__/client.py", "cached\n");

    let report = emitter(&root).check().expect("Check after edit");
    assert_eq!(report.stale, [PathBuf::from("client.py")]);
    assert_eq!(report.extra, [PathBuf::from("resources").join("stale.py")]);
    assert!(report.missing.is_empty());
    assert_eq!(report.diffs.len(), 1);
    assert!(report.diffs[0].contains("-        time.sleep(1)"));
    assert!(report.diffs[0].contains("+        time.sleep(0)"));
}

#[test]
fn test_emit_replaces_hand_placed_mirror_files() {
    let (_dir, root) = fixture();
    emitter(&root).emit().expect("Emit mirror");
    write(&root, "_sync/py.typed", "");

    let report = emitter(&root).check().expect("Check with marker");
    assert_eq!(report.extra, [PathBuf::from("py.typed")]);

    emitter(&root).emit().expect("Emit again");
    assert!(!root.join("_sync/py.typed").exists());
    assert!(emitter(&root).check().expect("Check after emit").is_current());
}

#[test]
fn test_settings_override_layout() {
    let (_dir, root) = fixture();
    write(
        &root,
        "unasync.yaml",
        "mirror: blocking\nregenerate_command: just sync\n",
    );
    let report = emitter(&root).emit().expect("Emit mirror");
    assert_eq!(report.mirror, root.join("blocking"));

    let manifest = read(&root.join("blocking").join(MANIFEST_FILE));
    assert!(manifest.starts_with("# AUTO-GENERATED — do not edit. Run 'just sync' to regenerate.\n"));
    assert!(manifest.contains("from tideline.blocking.client import Tideline\n"));
    assert!(!root.join("_sync").exists());
}

#[test]
fn test_invalid_settings_are_ignored() {
    let (_dir, root) = fixture();
    write(&root, "unasync.yaml", "mirror: [unclosed\n");
    let config = EmitConfig::load(&root);
    assert_eq!(config.mirror, "_sync");
    assert_eq!(config, EmitConfig::for_root(&root));
}
