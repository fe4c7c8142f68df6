//! api-catalog CLI entrypoint.
//! Parses command-line arguments and dispatches to the catalog engine.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use catalog_core::{CatalogConfig, CatalogEngine};
use clap::Parser;
use serde_json::Value;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "api-catalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Rebuild or reload the catalog and print it
    Refresh,
    /// Search for operations (and optionally schemas) matching a query
    Search {
        query: String,
        #[arg(long)]
        spec_id: Option<String>,
        #[arg(long)]
        schemas: bool,
    },
    /// Look up a single operation's contract by endpointId
    Get {
        endpoint_id: String,
        #[arg(long)]
        full: bool,
    },
    /// Synthesize a request skeleton for an operation
    Generate {
        endpoint_id: String,
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
    /// Validate a request against an operation's schema
    Validate {
        endpoint_id: String,
        #[arg(long)]
        request_file: PathBuf,
    },
    /// Render snippets for a request object
    Snippets {
        #[arg(long)]
        request_file: PathBuf,
        #[arg(long = "lang")]
        langs: Vec<String>,
    },
    /// Execute a request against the upstream API
    Execute {
        endpoint_id: String,
        #[arg(long)]
        request_file: PathBuf,
        #[arg(long)]
        auth_token: Option<String>,
    },
    /// Host the tool surface as a newline-delimited JSON loop over stdio
    Serve,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

async fn refresh_or_log(engine: &CatalogEngine, use_cache: bool) -> anyhow::Result<()> {
    engine.refresh(use_cache).await.map_err(|e| {
        error!("Refresh failed: {}", e);
        anyhow::anyhow!("refresh failed: {e}")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    info!("Starting api-catalog CLI");
    let cli = Cli::parse();
    let engine = Arc::new(CatalogEngine::new(CatalogConfig::from_env()).context("failed to open catalog index")?);

    match cli.command {
        Commands::Refresh => {
            refresh_or_log(&engine, true).await?;
            print_json(&engine.get_catalog().await);
        }
        Commands::Search { query, spec_id, schemas } => {
            refresh_or_log(&engine, true).await?;
            if schemas {
                let matches = engine.search_schemas(&query, spec_id.as_deref()).await;
                print_json(&serde_json::json!({"query": query, "matches": matches}));
            } else {
                let result = engine.catalog_search(&query, None).await;
                print_json(&result);
            }
        }
        Commands::Get { endpoint_id, full } => {
            refresh_or_log(&engine, true).await?;
            print_json(&engine.endpoint_get(&endpoint_id, full).await);
        }
        Commands::Generate { endpoint_id, fields, body_file } => {
            refresh_or_log(&engine, true).await?;
            let provided = provided_fields_from_cli(&fields, body_file.as_deref())?;
            print_json(&engine.payload_generate(&endpoint_id, Some(&provided)).await);
        }
        Commands::Validate { endpoint_id, request_file } => {
            refresh_or_log(&engine, true).await?;
            let request = read_json_file(&request_file)?;
            let result = engine.payload_validate(&endpoint_id, &request).await;
            print_json(&serde_json::to_value(result)?);
        }
        Commands::Snippets { request_file, langs } => {
            refresh_or_log(&engine, true).await?;
            let request = read_json_file(&request_file)?;
            let langs: Vec<&str> = langs.iter().map(String::as_str).collect();
            let languages = if langs.is_empty() { None } else { Some(langs.as_slice()) };
            print_json(&engine.snippet_generate(&request, languages));
        }
        Commands::Execute { endpoint_id, request_file, auth_token } => {
            refresh_or_log(&engine, true).await?;
            let request = read_json_file(&request_file)?;
            let response = engine.execute_request(&endpoint_id, &request, auth_token.as_deref()).await;
            print_json(&serde_json::to_value(response)?);
        }
        Commands::Serve => serve(engine).await?,
    }

    Ok(())
}

/// Merges `--field key=value` pairs (dotted path into `path`/`query`/`header`
/// not supported here; flat fields land in the body bucket the same way a
/// bare JSON object would) with an optional `--body-file`, matching the
/// `{path, query, header, body}` shape `payload::build_payload` accepts.
fn provided_fields_from_cli(fields: &[(String, String)], body_file: Option<&std::path::Path>) -> anyhow::Result<Value> {
    let mut body = match body_file {
        Some(path) => read_json_file(path)?,
        None => Value::Object(Default::default()),
    };
    let Some(obj) = body.as_object_mut() else {
        anyhow::bail!("--body-file must contain a JSON object");
    };
    for (key, value) in fields {
        let parsed = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.clone()));
        obj.insert(key.clone(), parsed);
    }
    Ok(serde_json::json!({"body": body}))
}

fn read_json_file(path: &std::path::Path) -> anyhow::Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {} as JSON", path.display()))
}

fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
}

/// One line in, one line out: `{"tool": "api_search", "args": {...}}` maps to
/// one of the six stable tool-surface operations and returns its JSON result.
async fn serve(engine: Arc<CatalogEngine>) -> anyhow::Result<()> {
    refresh_or_log(&engine, true).await?;
    let watch_handle = catalog_core::watcher::spawn(engine.clone());
    print_banner(&engine).await;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => dispatch_tool(&engine, &request).await,
            Err(err) => serde_json::json!({"error": format!("invalid JSON request: {err}")}),
        };
        writeln!(stdout, "{response}").context("failed to write stdout")?;
        stdout.flush().context("failed to flush stdout")?;
    }

    if let Some(handle) = watch_handle {
        handle.abort();
    }
    Ok(())
}

async fn dispatch_tool(engine: &CatalogEngine, request: &Value) -> Value {
    let Some(tool) = request.get("tool").and_then(Value::as_str) else {
        return serde_json::json!({"error": "missing 'tool' field"});
    };
    let empty = serde_json::json!({});
    let args = request.get("args").unwrap_or(&empty);

    match tool {
        "api_search" => {
            let Some(query) = args.get("query").and_then(Value::as_str) else {
                return serde_json::json!({"error": "api_search requires 'query'"});
            };
            let audience = args.get("audience").and_then(Value::as_str);
            engine.catalog_search(query, audience).await
        }
        "api_get_operation" => {
            let Some(endpoint_id) = args.get("endpoint_id").and_then(Value::as_str) else {
                return serde_json::json!({"error": "api_get_operation requires 'endpoint_id'"});
            };
            let full = args.get("full").and_then(Value::as_bool).unwrap_or(true);
            engine.endpoint_get(endpoint_id, full).await
        }
        "api_generate_request" => {
            let Some(endpoint_id) = args.get("endpoint_id").and_then(Value::as_str) else {
                return serde_json::json!({"error": "api_generate_request requires 'endpoint_id'"});
            };
            let provided = args.get("provided_fields");
            engine.payload_generate(endpoint_id, provided).await
        }
        "api_validate_request" => {
            let Some(endpoint_id) = args.get("endpoint_id").and_then(Value::as_str) else {
                return serde_json::json!({"error": "api_validate_request requires 'endpoint_id'"});
            };
            let Some(request) = args.get("request") else {
                return serde_json::json!({"error": "api_validate_request requires 'request'"});
            };
            let result = engine.payload_validate(endpoint_id, request).await;
            serde_json::to_value(result).unwrap_or(Value::Null)
        }
        "api_generate_snippets" => {
            let Some(request) = args.get("request") else {
                return serde_json::json!({"error": "api_generate_snippets requires 'request'"});
            };
            let langs: Option<Vec<&str>> = args
                .get("lang")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_str).collect());
            engine.snippet_generate(request, langs.as_deref())
        }
        "api_execute_request" => {
            let Some(endpoint_id) = args.get("endpoint_id").and_then(Value::as_str) else {
                return serde_json::json!({"error": "api_execute_request requires 'endpoint_id'"});
            };
            let Some(request) = args.get("request") else {
                return serde_json::json!({"error": "api_execute_request requires 'request'"});
            };
            let auth_token = args.get("auth_token").and_then(Value::as_str);
            let response = engine.execute_request(endpoint_id, request, auth_token).await;
            serde_json::to_value(response).unwrap_or(Value::Null)
        }
        other => serde_json::json!({"error": format!("unknown tool '{other}'")}),
    }
}

async fn print_banner(engine: &CatalogEngine) {
    let config = engine.config();
    info!("api-catalog ready. Hosting six tools over stdio (one JSON request per line).");
    if !config.execution_enabled {
        info!("Execution is disabled. Set OPENAPI_EXECUTION=1 to enable api_execute_request.");
    }
    if config.semantic_enabled && !engine.semantic_enabled().await {
        info!("Semantic search requested but unavailable (missing embedding backend).");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_value_splits_on_first_equals() {
        assert_eq!(parse_key_value("name=value=with=equals").unwrap(), ("name".to_string(), "value=with=equals".to_string()));
    }

    #[test]
    fn parse_key_value_rejects_missing_equals() {
        assert!(parse_key_value("no-equals-here").is_err());
    }

    #[test]
    fn provided_fields_merges_cli_overrides_over_body_file() {
        let fields = vec![("tag".to_string(), "\"beagle\"".to_string()), ("age".to_string(), "3".to_string())];
        let provided = provided_fields_from_cli(&fields, None).unwrap();
        assert_eq!(provided["body"]["tag"], serde_json::json!("beagle"));
        assert_eq!(provided["body"]["age"], serde_json::json!(3));
    }
}
