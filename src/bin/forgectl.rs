use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "forgectl")]
#[command(about = "Management CLI for forge-confd", long_about = None)]
struct Cli {
    #[arg(short, long, env = "FORGE_CONFD_URL", default_value = "http://localhost:8080")]
    url: String,

    /// API key, if the server requires one.
    #[arg(short, long, env = "FORGE_CONFD_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Manage nginx routes
    #[command(subcommand)]
    Routes(RouteCommands),
    /// Manage promtail log sources
    #[command(subcommand)]
    Sources(SourceCommands),
}

#[derive(Subcommand)]
enum RouteCommands {
    /// List all routes
    List,
    /// Show one route
    Get { name: String },
    /// Add or replace a route
    Add(RouteArgs),
    /// Delete a route
    Remove { name: String },
    /// Reload nginx without changing routes
    Reload,
}

#[derive(Args)]
struct RouteArgs {
    #[arg(long)]
    name: String,
    /// Path prefix, e.g. /blog/
    #[arg(long)]
    path: String,
    /// Upstream, e.g. http://blog:8000
    #[arg(long)]
    target: String,
    #[arg(long)]
    strip_prefix: bool,
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List all log sources
    List,
    /// Show one log source
    Get { name: String },
    /// Add or replace a log source
    Add(SourceArgs),
    /// Delete a log source
    Remove { name: String },
    /// Reload promtail without changing sources
    Reload,
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long)]
    name: String,
    /// File glob, e.g. /var/log/app/*.log
    #[arg(long)]
    path: String,
    #[arg(long)]
    job: Option<String>,
    /// Extra label, repeatable: --label env=prod
    #[arg(long = "label", value_parser = parse_label)]
    labels: Vec<(String, String)>,
    /// Regex matching the first line of a multiline entry
    #[arg(long)]
    first_line: Option<String>,
    #[arg(long, requires = "first_line")]
    max_lines: Option<u32>,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {}", s))
}

impl RouteArgs {
    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "path": self.path,
            "target": self.target,
            "strip_prefix": self.strip_prefix,
        })
    }
}

impl SourceArgs {
    fn body(&self) -> Value {
        let labels: Map<String, Value> = self
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut body = json!({
            "name": self.name,
            "path": self.path,
            "labels": labels,
        });
        if let Some(job) = &self.job {
            body["job"] = json!(job);
        }
        if let Some(first_line) = &self.first_line {
            body["multiline"] = json!({ "first_line": first_line, "max_lines": self.max_lines });
        }
        body
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }
    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let base = cli.url.trim_end_matches('/');

    let request = match &cli.command {
        Commands::Health => client.get(format!("{}/api/v1/health", base)),
        Commands::Routes(cmd) => {
            let root = format!("{}/api/v1/routes", base);
            match cmd {
                RouteCommands::List => client.get(root),
                RouteCommands::Get { name } => client.get(entry_url(&root, name)?),
                RouteCommands::Add(args) => client.post(root).json(&args.body()),
                RouteCommands::Remove { name } => client.delete(entry_url(&root, name)?),
                RouteCommands::Reload => client.post(format!("{}/reload", root)),
            }
        }
        Commands::Sources(cmd) => {
            let root = format!("{}/api/v1/logs/sources", base);
            match cmd {
                SourceCommands::List => client.get(root),
                SourceCommands::Get { name } => client.get(entry_url(&root, name)?),
                SourceCommands::Add(args) => client.post(root).json(&args.body()),
                SourceCommands::Remove { name } => client.delete(entry_url(&root, name)?),
                SourceCommands::Reload => client.post(format!("{}/reload", root)),
            }
        }
    };

    let res = request.send().await?;
    print_response(res).await
}

/// `<root>/<name>` with the name percent-encoded as a single path segment.
fn entry_url(root: &str, name: &str) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(root)?;
    url.path_segments_mut()
        .map_err(|_| format!("cannot append a path to {}", root))?
        .push(name);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: forge-confd returned status {}", status);
        eprintln!("Response: {}", text);
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            if let Some(warning) = json.get("warning").and_then(Value::as_str) {
                eprintln!("Warning: {}", warning);
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_url_escapes_name() {
        let url = entry_url("http://localhost:8080/api/v1/routes", "a?x").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/routes/a%3Fx");

        let url = entry_url("http://localhost:8080/api/v1/logs/sources", "app").unwrap();
        assert_eq!(url.path(), "/api/v1/logs/sources/app");
    }
}
