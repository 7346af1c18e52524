//! Promtail configuration rendering.
//!
//! Produces a complete promtail config file; promtail is started with
//! `-config.file` pointing at the artifact and runtime reload enabled.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::PromtailConfig;
use crate::logsources::LogSource;
use crate::managed::error::RenderError;
use crate::managed::render::Renderer;

const HEADER: &str = "# Dynamic log sources - auto-generated, do not edit\n# Managed by forge-confd\n";

#[derive(Serialize)]
struct Document<'a> {
    server: Server,
    positions: Positions<'a>,
    clients: Vec<Client<'a>>,
    scrape_configs: Vec<ScrapeConfig<'a>>,
}

#[derive(Serialize)]
struct Server {
    http_listen_port: u16,
    grpc_listen_port: u16,
}

#[derive(Serialize)]
struct Positions<'a> {
    filename: &'a str,
}

#[derive(Serialize)]
struct Client<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct ScrapeConfig<'a> {
    job_name: &'a str,
    static_configs: Vec<StaticConfig<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pipeline_stages: Vec<Stage<'a>>,
}

#[derive(Serialize)]
struct StaticConfig<'a> {
    targets: Vec<&'a str>,
    labels: BTreeMap<&'a str, &'a str>,
}

#[derive(Serialize)]
struct Stage<'a> {
    multiline: MultilineStage<'a>,
}

#[derive(Serialize)]
struct MultilineStage<'a> {
    firstline: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_lines: Option<u32>,
}

/// Renders log sources as promtail `scrape_configs`.
#[derive(Debug, Clone)]
pub struct PromtailRenderer {
    config: PromtailConfig,
}

impl PromtailRenderer {
    pub fn new(config: PromtailConfig) -> Self {
        Self { config }
    }

    fn scrape_config(source: &LogSource) -> ScrapeConfig<'_> {
        let mut labels: BTreeMap<&str, &str> = source
            .labels
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        labels.insert("job", source.job_name());
        labels.insert("__path__", &source.path);

        let pipeline_stages = source
            .multiline
            .iter()
            .map(|m| Stage {
                multiline: MultilineStage {
                    firstline: &m.first_line,
                    max_lines: m.max_lines,
                },
            })
            .collect();

        ScrapeConfig {
            job_name: &source.name,
            static_configs: vec![StaticConfig {
                targets: vec!["localhost"],
                labels,
            }],
            pipeline_stages,
        }
    }
}

impl Renderer<LogSource> for PromtailRenderer {
    fn render(&self, sources: &[LogSource]) -> Result<String, RenderError> {
        let doc = Document {
            server: Server {
                http_listen_port: self.config.http_listen_port,
                grpc_listen_port: self.config.grpc_listen_port,
            },
            positions: Positions {
                filename: &self.config.positions_file,
            },
            clients: vec![Client {
                url: &self.config.client_url,
            }],
            scrape_configs: sources.iter().map(Self::scrape_config).collect(),
        };

        let body = serde_yaml::to_string(&doc).map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(format!("{}{}", HEADER, body))
    }
}
