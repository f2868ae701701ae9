// ─── Version File ───
// The server-relevant part of a per-version Mojang JSON.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub major_version: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_versions_have_no_java_block() {
        let json = r#"{
            "id": "1.7.10",
            "downloads": {
                "client": {"sha1": "c", "size": 1, "url": "https://example.com/client.jar"},
                "server": {"sha1": "s", "size": 2, "url": "https://example.com/server.jar"}
            }
        }"#;
        let parsed: VersionJson = serde_json::from_str(json).unwrap();
        assert!(parsed.java_version.is_none());
        let server = parsed.downloads.unwrap().server.unwrap();
        assert_eq!(server.url, "https://example.com/server.jar");
    }
}
