// ─── EULA Gate ───
// Reads and updates `<workdir>/eula.txt`, asking the caller for consent when
// the license has not been accepted yet.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::core::downloader::store::write_bytes;
use crate::core::error::{CoreError, CoreResult};

pub const EULA_FILE: &str = "eula.txt";
pub const DEFAULT_EULA_URL: &str = "https://aka.ms/MinecraftEULA";

static ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?i:eula)\s*[=:]\s*(\S*)\s*$").expect("eula entry pattern"));
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^)\s]+").expect("eula link pattern"));

/// Asks the user whether they accept the Minecraft EULA at `url`.
#[async_trait]
pub trait EulaPrompt: Send + Sync {
    async fn ask(&self, url: &str) -> bool;
}

/// Parsed `eula.txt`. Every line except the `eula=` entry is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EulaState {
    lines: Vec<String>,
    eula_line: Option<usize>,
    agreed: bool,
    url: String,
    dirty: bool,
}

impl EulaState {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let mut eula_line = None;
        let mut agreed = false;
        let mut url = DEFAULT_EULA_URL.to_string();

        for (i, line) in lines.iter().enumerate() {
            if line.starts_with('#') || line.starts_with('!') {
                if let Some(found) = LINK.find(line) {
                    url = found.as_str().to_string();
                }
                continue;
            }
            if let Some(caps) = ENTRY.captures(line) {
                agreed = caps[1].eq_ignore_ascii_case("true");
                eula_line = Some(i);
            }
        }

        Self {
            lines,
            eula_line,
            agreed,
            url,
            dirty: false,
        }
    }

    /// The file Minecraft writes on first start: two header comments, the
    /// second a timestamp.
    pub fn fresh() -> Self {
        let stamp = chrono::Utc::now().format("%a %b %d %H:%M:%S UTC %Y");
        Self::parse(&format!(
            "#By changing the setting below to TRUE you are indicating your agreement to our EULA ({}).\n#{}\neula=false\n",
            DEFAULT_EULA_URL, stamp
        ))
    }

    pub fn agreed(&self) -> bool {
        self.agreed
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_agreed(&mut self, agreed: bool) {
        if self.agreed != agreed || self.eula_line.is_none() {
            self.agreed = agreed;
            self.dirty = true;
        }
    }

    pub fn render(&self) -> String {
        let mut lines = self.lines.clone();
        if self.dirty {
            let entry = format!("eula={}", self.agreed);
            match self.eula_line {
                // CRLF files keep their line ending
                Some(i) if lines[i].ends_with('\r') => lines[i] = format!("{}\r", entry),
                Some(i) => lines[i] = entry,
                None => {
                    // Keep a trailing newline trailing
                    let at = if lines.last().is_some_and(|l| l.is_empty()) {
                        lines.len() - 1
                    } else {
                        lines.len()
                    };
                    lines.insert(at, entry);
                }
            }
        }
        lines.join("\n")
    }

    /// `None` when the file does not exist yet.
    pub async fn read(workdir: &Path) -> CoreResult<Option<Self>> {
        let path = workdir.join(EULA_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    pub async fn write(&self, workdir: &Path) -> CoreResult<()> {
        write_bytes(&workdir.join(EULA_FILE), self.render().as_bytes()).await
    }
}

/// Make sure the server in `workdir` has an accepted EULA, asking `prompt`
/// at most once. A refusal is persisted and reported as `EulaDeclined`.
pub async fn ensure_agreement(workdir: &Path, prompt: &dyn EulaPrompt) -> CoreResult<()> {
    let mut state = match EulaState::read(workdir).await? {
        Some(state) => state,
        None => EulaState::fresh(),
    };
    if state.agreed() {
        return Ok(());
    }

    let accepted = prompt.ask(state.url()).await;
    state.set_agreed(accepted);
    state.write(workdir).await?;

    if accepted {
        info!("EULA accepted for {:?}", workdir);
        Ok(())
    } else {
        warn!("EULA declined for {:?}", workdir);
        Err(CoreError::EulaDeclined {
            url: state.url().to_string(),
        })
    }
}
