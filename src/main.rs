//! Purpose: `backbone` CLI entry point for populating runtime-declared models from JSON.
//! Role: Binary crate root; parses args, runs `parse`/`fetch`, emits JSON on stdout.
//! Invariants: Successful commands print one JSON document on stdout.
//! Invariants: Errors are emitted as JSON on stderr; exit code comes from `api::to_exit_code`.
//! Invariants: Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueHint};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use backbone_model::api::{
    DynamicModel, Error, ErrorKind, FetchConfig, FetchOptions, Fetcher, JsonObject, Model,
    decode_object, levels, to_exit_code,
};

#[derive(Parser)]
#[command(
    name = "backbone",
    version,
    about = "Populate JSON models from local payloads or remote endpoints",
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '{"dd":"hola","n":42}' | backbone parse --field dd --field n
  {"dd":"hola","n":"42"}
  $ backbone fetch 'http://localhost:8080/api/videos.json' --query size=1 \
      --pointer /page/items/0 --field uri --field language

Numbers are stored as text; lists of objects are kept as-is with --list-field."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Populate a model from a JSON payload read from a file or stdin.
    Parse {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, help = "Read the payload from FILE instead of stdin", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    /// Fetch a JSON payload over HTTP GET and populate a model from it.
    Fetch {
        #[arg(help = "Absolute http(s) URL of the resource", value_hint = ValueHint::Url)]
        url: String,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_query_pair, help = "Query parameter merged into the URL (repeatable)")]
        query: Vec<(String, String)>,
        #[arg(long, value_name = "JSON", help = "JSON object sent form-encoded with the GET")]
        body_json: Option<String>,
        #[arg(long, help = "Connect and read timeout in milliseconds")]
        timeout_ms: Option<u64>,
        #[arg(long, help = "Override the User-Agent header")]
        user_agent: Option<String>,
    },
}

#[derive(Args)]
struct ModelArgs {
    #[arg(long = "field", value_name = "NAME", help = "Declare a text attribute (repeatable)")]
    fields: Vec<String>,
    #[arg(long = "list-field", value_name = "NAME", help = "Declare a list-of-objects attribute (repeatable)")]
    list_fields: Vec<String>,
    #[arg(long, value_name = "POINTER", help = "JSON pointer to the object to parse, e.g. /page/items/0")]
    pointer: Option<String>,
    #[arg(long, help = "Also print the declared fields with their levels")]
    levels: bool,
    #[arg(long, help = "Pretty-print JSON output")]
    pretty: bool,
}

impl ModelArgs {
    fn build(&self, name: &str) -> DynamicModel {
        let mut model = DynamicModel::new(name);
        for field in &self.fields {
            model = model.with_text(field.as_str());
        }
        for field in &self.list_fields {
            model = model.with_list(field.as_str());
        }
        if let Some(pointer) = &self.pointer {
            model = model.with_envelope(pointer.as_str());
        }
        model
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Parse { model, input } => {
            let payload = read_payload(input.as_ref())?;
            let mut target = model.build("parse");
            target.parse(&payload);
            emit_model(&target, &model);
            Ok(())
        }
        Command::Fetch {
            url,
            model,
            query,
            body_json,
            timeout_ms,
            user_agent,
        } => {
            let mut config = FetchConfig::new();
            if let Some(timeout_ms) = timeout_ms {
                let timeout = Duration::from_millis(timeout_ms);
                config = config.with_connect_timeout(timeout).with_timeout(timeout);
            }
            if let Some(user_agent) = user_agent {
                config = config.with_user_agent(user_agent);
            }

            let mut options = FetchOptions::new();
            for (key, value) in query {
                options = options.with_query(key, value);
            }
            if let Some(raw) = body_json {
                options = options.with_body(decode_object(&raw, "--body-json")?);
            }

            let mut target = model.build("fetch").with_url(url);
            Fetcher::with_config(&config)
                .fetch(&mut target, Some(&options))
                .await?;
            emit_model(&target, &model);
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

fn read_payload(input: Option<&PathBuf>) -> Result<JsonObject, Error> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Parsing)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        })?,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).map_err(|err| {
                Error::new(ErrorKind::Parsing)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            raw
        }
    };
    decode_object(&raw, "payload")
}

fn emit_model(model: &DynamicModel, args: &ModelArgs) {
    let mut attributes = model.attributes();
    if args.fields.iter().chain(&args.list_fields).all(|name| name != "url") {
        attributes.remove("url");
    }
    let value = if args.levels {
        json!({
            "attributes": attributes,
            "levels": levels(model),
        })
    } else {
        Value::Object(attributes)
    };
    let text = if args.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    println!(
        "{}",
        text.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    );
}

fn error_json(err: &Error) -> Value {
    let mut inner = serde_json::Map::new();
    inner.insert("kind".to_string(), json!(err.kind().as_str()));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    json!({ "error": Value::Object(inner) })
}

fn emit_error(err: &Error) {
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Parsing\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}
