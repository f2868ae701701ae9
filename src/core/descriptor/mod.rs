// ─── Version Descriptor ───
// `<cache>/<distribution>/<serverID>/version.json`: where the server jar
// comes from, which Java runs it and its launch argument template.

pub mod builder;
pub mod forge_args;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::downloader::store::write_bytes;
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, Runtime};

pub use builder::{derive_from, generate_version_json, DescriptorOverrides};

pub const DESCRIPTOR_FILE: &str = "version.json";
pub const SERVER_JAR: &str = "version.jar";
pub const FILE_ENCODING_ARG: &str = "-Dfile.encoding=UTF-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub download: DownloadSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<JavaRequirement>,
    pub arguments: Vec<JarArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSpec {
    pub url: String,
    /// Hex digest; the algorithm is fixed per distribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u32>,
}

/// Placeholders substituted when the launch command is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmbedKind {
    JvmArgument,
    JarPath,
    Log4jArg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JarArg {
    Literal(String),
    Embed { embed: EmbedKind },
}

impl JarArg {
    pub fn literal(s: impl Into<String>) -> Self {
        JarArg::Literal(s.into())
    }

    pub fn embed(kind: EmbedKind) -> Self {
        JarArg::Embed { embed: kind }
    }
}

/// Launch template: `[JVM_ARGUMENT, -Dfile.encoding=UTF-8, LOG4J_ARG, <custom>.., -jar JAR_PATH?, --nogui]`.
pub fn launch_arguments(custom: Vec<String>, with_jar: bool) -> Vec<JarArg> {
    let mut args = vec![
        JarArg::embed(EmbedKind::JvmArgument),
        JarArg::literal(FILE_ENCODING_ARG),
        JarArg::embed(EmbedKind::Log4jArg),
    ];
    args.extend(custom.into_iter().map(JarArg::Literal));
    if with_jar {
        args.push(JarArg::literal("-jar"));
        args.push(JarArg::embed(EmbedKind::JarPath));
    }
    args.push(JarArg::literal("--nogui"));
    args
}

/// Values substituted for each placeholder.
pub struct EmbedValues<'a> {
    pub jvm: &'a [String],
    pub jar_path: &'a str,
    pub log4j: Option<&'a str>,
}

/// Expand every placeholder of `args`.
pub fn render(args: &[JarArg], values: &EmbedValues<'_>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + values.jvm.len());
    for arg in args {
        match arg {
            JarArg::Literal(s) => out.push(s.clone()),
            JarArg::Embed { embed: EmbedKind::JvmArgument } => out.extend(values.jvm.iter().cloned()),
            JarArg::Embed { embed: EmbedKind::JarPath } => out.push(values.jar_path.to_string()),
            JarArg::Embed { embed: EmbedKind::Log4jArg } => out.extend(values.log4j.map(str::to_string)),
        }
    }
    out
}

impl VersionDescriptor {
    /// Java runtime for this server: a named component wins, a bare major
    /// version selects any matching runtime, and neither means `jre-legacy`.
    pub fn runtime(&self) -> Runtime {
        match &self.java_version {
            Some(JavaRequirement {
                component: Some(component),
                ..
            }) => Runtime::Minecraft {
                version: component.clone(),
            },
            Some(JavaRequirement {
                major_version: Some(major),
                ..
            }) => Runtime::Universal {
                major_version: *major,
            },
            _ => Runtime::legacy(),
        }
    }

    pub fn path(cache_dir: &Path, distribution: Distribution, server_id: &str) -> PathBuf {
        server_dir(cache_dir, distribution, server_id).join(DESCRIPTOR_FILE)
    }

    /// Read a descriptor; unreadable or malformed files are `None`.
    pub async fn read(path: &Path) -> Option<Self> {
        let bytes = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                debug!("Discarding malformed descriptor {:?}: {}", path, e);
                None
            }
        }
    }

    pub async fn write(&self, path: &Path) -> CoreResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        write_bytes(path, &bytes).await
    }
}

/// `<cache>/<distribution>/<serverID>`.
pub fn server_dir(cache_dir: &Path, distribution: Distribution, server_id: &str) -> PathBuf {
    cache_dir.join(distribution.as_str()).join(server_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::scratch_dir;

    #[test]
    fn descriptor_json_shape() {
        let descriptor = VersionDescriptor {
            download: DownloadSpec {
                url: "https://example.com/server.jar".into(),
                hash: None,
            },
            java_version: Some(JavaRequirement {
                component: None,
                major_version: Some(21),
            }),
            arguments: launch_arguments(vec![], true),
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "download": {"url": "https://example.com/server.jar"},
                "javaVersion": {"majorVersion": 21},
                "arguments": [
                    {"embed": "JVM_ARGUMENT"},
                    "-Dfile.encoding=UTF-8",
                    {"embed": "LOG4J_ARG"},
                    "-jar",
                    {"embed": "JAR_PATH"},
                    "--nogui"
                ]
            })
        );
    }

    #[test]
    fn render_expands_placeholders() {
        let jvm = vec!["-Xmx2G".to_string(), "-Xms1G".to_string()];
        let args = launch_arguments(vec!["@user_jvm_args.txt".into()], false);

        let with_log4j = render(
            &args,
            &EmbedValues {
                jvm: &jvm,
                jar_path: "/srv/version.jar",
                log4j: Some("-Dlog4j2.formatMsgNoLookups=true"),
            },
        );
        assert_eq!(
            with_log4j,
            vec![
                "-Xmx2G",
                "-Xms1G",
                "-Dfile.encoding=UTF-8",
                "-Dlog4j2.formatMsgNoLookups=true",
                "@user_jvm_args.txt",
                "--nogui"
            ]
        );

        let without = render(
            &launch_arguments(vec![], true),
            &EmbedValues {
                jvm: &[],
                jar_path: "/srv/version.jar",
                log4j: None,
            },
        );
        assert_eq!(without, vec!["-Dfile.encoding=UTF-8", "-jar", "/srv/version.jar", "--nogui"]);
    }

    #[test]
    fn runtime_prefers_component_then_major() {
        let mut descriptor = VersionDescriptor {
            download: DownloadSpec {
                url: String::new(),
                hash: None,
            },
            java_version: Some(JavaRequirement {
                component: Some("java-runtime-delta".into()),
                major_version: Some(21),
            }),
            arguments: vec![],
        };
        assert_eq!(
            descriptor.runtime(),
            Runtime::Minecraft {
                version: "java-runtime-delta".into()
            }
        );

        descriptor.java_version = Some(JavaRequirement {
            component: None,
            major_version: Some(17),
        });
        assert_eq!(descriptor.runtime(), Runtime::Universal { major_version: 17 });

        descriptor.java_version = None;
        assert_eq!(descriptor.runtime(), Runtime::legacy());
    }

    #[tokio::test]
    async fn malformed_descriptor_reads_as_missing() {
        let dir = scratch_dir("descriptor-malformed");
        let path = VersionDescriptor::path(&dir, Distribution::Vanilla, "1.21");
        crate::core::testing::write_file(&path, br#"{"download": 3}"#);
        assert_eq!(VersionDescriptor::read(&path).await, None);
    }
}
