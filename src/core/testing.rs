// Test doubles shared by the in-module test suites.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::downloader::Fetcher;
use crate::core::error::{CoreError, CoreResult};
use crate::core::eula::EulaPrompt;
use crate::core::loaders::exec::{ExecRequest, ExecRuntime, LineSink};

/// Fresh, empty scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mcserver-core-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ── Fetcher ─────────────────────────────────────────────

enum Canned {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory fetcher. Unknown urls answer 404.
#[derive(Default)]
pub struct MapFetcher {
    responses: Mutex<HashMap<String, Canned>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.set(url, body);
        self
    }

    pub fn failing(self, url: &str, status: u16) -> Self {
        self.fail(url, status);
        self
    }

    pub fn set(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Body(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Status(status));
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for MapFetcher {
    async fn get(&self, url: &str) -> CoreResult<Vec<u8>> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.responses.lock().unwrap().get(url) {
            Some(Canned::Body(bytes)) => Ok(bytes.clone()),
            Some(Canned::Status(status)) => Err(CoreError::DownloadFailed {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(CoreError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

// ── Exec ────────────────────────────────────────────────

type Script = Box<dyn Fn(&ExecRequest) -> CoreResult<()> + Send + Sync>;

/// Records every request and runs `script` in place of java.
pub struct ScriptedExec {
    script: Script,
    pub requests: Mutex<Vec<ExecRequest>>,
}

impl ScriptedExec {
    pub fn new(script: impl Fn(&ExecRequest) -> CoreResult<()> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// An exec that must never be called.
    pub fn unused() -> Self {
        Self::new(|req| panic!("unexpected java execution: {:?}", req.args))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ExecRuntime for ScriptedExec {
    async fn exec(
        &self,
        request: ExecRequest,
        on_line: &LineSink,
    ) -> CoreResult<()> {
        on_line("scripted build");
        let result = (self.script)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

// ── EULA prompt ─────────────────────────────────────────

pub struct CountingPrompt {
    answer: bool,
    asked: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl CountingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EulaPrompt for CountingPrompt {
    async fn ask(&self, url: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.answer
    }
}

// ── Mojang fixtures ─────────────────────────────────────

/// (id, type, releaseTime), newest first.
const MANIFEST_ENTRIES: &[(&str, &str, &str)] = &[
    ("1.21", "release", "2024-06-13T08:24:03+00:00"),
    ("24w14a", "snapshot", "2024-04-03T12:00:00+00:00"),
    ("1.20.1", "release", "2023-06-12T13:25:51+00:00"),
    ("1.20", "release", "2023-06-02T08:36:17+00:00"),
    ("1.18.1", "release", "2021-12-10T08:23:00+00:00"),
    ("1.18", "release", "2021-11-30T09:16:29+00:00"),
    ("1.17", "release", "2021-06-08T11:00:40+00:00"),
    ("1.16.5", "release", "2021-01-14T16:05:32+00:00"),
    ("1.16", "release", "2020-06-23T16:20:52+00:00"),
    ("1.13.2", "release", "2018-10-22T11:41:07+00:00"),
    ("1.12", "release", "2017-06-02T13:50:27+00:00"),
    ("1.11.2", "release", "2016-12-21T09:29:12+00:00"),
    ("1.9", "release", "2016-02-29T13:49:54+00:00"),
    ("1.7.2", "release", "2013-10-25T13:00:00+00:00"),
    ("1.5", "release", "2013-03-07T00:00:00+00:00"),
    ("1.4.7", "release", "2012-12-28T00:00:00+00:00"),
    ("1.3", "release", "2012-07-26T00:00:00+00:00"),
    ("1.2.5", "release", "2012-03-30T00:00:00+00:00"),
    ("1.1", "release", "2012-01-12T00:00:00+00:00"),
];

pub fn version_meta_url(id: &str) -> String {
    format!("https://piston-meta.mojang.com/v1/packages/test/{}.json", id)
}

pub fn server_jar_url(id: &str) -> String {
    format!("https://piston-data.mojang.com/v1/objects/test/{}/server.jar", id)
}

pub fn server_jar_bytes(id: &str) -> Vec<u8> {
    format!("vanilla-server-{}", id).into_bytes()
}

/// A trimmed `version_manifest_v2.json`.
pub fn manifest_json() -> Vec<u8> {
    let versions: Vec<serde_json::Value> = MANIFEST_ENTRIES
        .iter()
        .map(|(id, kind, time)| {
            serde_json::json!({
                "id": id,
                "type": kind,
                "url": version_meta_url(id),
                "time": time,
                "releaseTime": time,
                "sha1": crate::core::downloader::HashAlgorithm::Sha1.digest_hex(&version_meta_json(id)),
                "complianceLevel": 1
            })
        })
        .collect();
    serde_json::to_vec(&serde_json::json!({
        "latest": {"release": "1.21", "snapshot": "24w14a"},
        "versions": versions
    }))
    .unwrap()
}

/// Per-version JSON for `id`; versions before 1.17 carry no `javaVersion`.
pub fn version_meta_json(id: &str) -> Vec<u8> {
    let jar = server_jar_bytes(id);
    let mut meta = serde_json::json!({
        "id": id,
        "downloads": {
            "server": {
                "sha1": crate::core::downloader::HashAlgorithm::Sha1.digest_hex(&jar),
                "size": jar.len(),
                "url": server_jar_url(id)
            }
        }
    });
    if let Some(java) = match id {
        "1.21" => Some(("java-runtime-delta", 21)),
        "1.20.1" | "1.20" | "1.18.1" | "1.18" => Some(("java-runtime-gamma", 17)),
        "1.17" => Some(("java-runtime-alpha", 16)),
        _ => None,
    } {
        meta["javaVersion"] = serde_json::json!({"component": java.0, "majorVersion": java.1});
    }
    serde_json::to_vec(&meta).unwrap()
}

/// A fetcher serving the manifest and every vanilla meta and server jar.
pub fn mojang_fetcher() -> MapFetcher {
    let fetcher = MapFetcher::new().with(
        crate::core::version::manifest::VERSION_MANIFEST_URL,
        manifest_json(),
    );
    for (id, _, _) in MANIFEST_ENTRIES {
        fetcher.set(&version_meta_url(id), version_meta_json(id));
        fetcher.set(&server_jar_url(id), server_jar_bytes(id));
    }
    fetcher
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
