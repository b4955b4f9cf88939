//! pathwright CLI, a driving adapter for the pathwright route engine.
//!
//! Subcommands:
//! - `check <routes>` — validate that a route table builds
//! - `info <routes>` — list namespaces, resources, setters and levels
//! - `render <routes> <namespace> <resource> [steps...]` — chain setters and render
//!
//! Logging goes to stderr; set `RUST_LOG=pathwright=debug` to see build details.

use std::fmt::Write as _;
use std::process;

use pathwright::{Method, ResourceSpec, RouteIndex, RouteTableConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "info" => cmd_info(&args[2..]),
        "render" => cmd_render(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(String::new())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    match result {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<String, String> {
    let path = args
        .first()
        .ok_or_else(|| String::from("check requires a route table path"))?;
    let index = load_index(path)?;
    Ok(format!(
        "Route table valid: {} namespace(s), {} resource(s)",
        index.namespaces().len(),
        index.len()
    ))
}

fn cmd_info(args: &[String]) -> Result<String, String> {
    let path = args
        .first()
        .ok_or_else(|| String::from("info requires a route table path"))?;
    let index = load_index(path)?;
    describe(&index)
}

fn cmd_render(args: &[String]) -> Result<String, String> {
    let [path, namespace, resource, rest @ ..] = args else {
        return Err("render requires <routes> <namespace> <resource>".into());
    };
    let request = parse_steps(rest)?;
    let index = load_index(path)?;
    render(&index, namespace, resource, &request)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════════

fn describe(index: &RouteIndex) -> Result<String, String> {
    let mut out = String::new();
    for namespace in index.namespaces() {
        let _ = writeln!(out, "{namespace}");
        for spec in index.resources(namespace).map_err(|e| e.to_string())? {
            describe_resource(&mut out, spec);
        }
    }
    Ok(out.trim_end().to_owned())
}

fn describe_resource(out: &mut String, spec: &ResourceSpec) {
    let title = spec.title().map(|t| format!(" ({t})")).unwrap_or_default();
    let _ = writeln!(out, "  {}{title}", spec.name());

    let setters = spec.setter_names();
    if !setters.is_empty() {
        let _ = writeln!(out, "    setters: {}", setters.join(", "));
    }
    for level in 0..spec.levels().depth() {
        let candidates: Vec<String> = spec
            .levels()
            .descriptors(level)
            .iter()
            .map(|d| match d.methods() {
                Some(methods) => {
                    let methods: Vec<&str> = methods.iter().map(|m| m.as_str()).collect();
                    format!("{} ({})", d.component(), methods.join(", "))
                }
                None => d.component().to_owned(),
            })
            .collect();
        let _ = writeln!(out, "    level {level}: {}", candidates.join(" | "));
    }
}

fn render(
    index: &RouteIndex,
    namespace: &str,
    resource: &str,
    request: &RenderRequest,
) -> Result<String, String> {
    let handler = index.handler(namespace, resource).map_err(|e| e.to_string())?;
    let mut handler = match &request.endpoint {
        Some(endpoint) => handler.with_endpoint(endpoint.as_str()),
        None => handler,
    };

    for step in &request.steps {
        debug!(?step, "apply");
        let applied = match step {
            Step::Set(name, value) => handler.set(name, value).map(|_| ()),
            Step::Select(name) => handler.select(name).map(|_| ()),
            Step::Param(key, value) => {
                handler.param(key.as_str(), value);
                Ok(())
            }
        };
        applied.map_err(|e| e.to_string())?;
    }

    if request.trace {
        return Ok(handler.trace().to_string());
    }

    match request.method {
        Some(method) => handler
            .prepare(method)
            .map(|prepared| prepared.to_string())
            .map_err(|e| e.to_string()),
        None => handler.render_uri().map_err(|e| e.to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Route table loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_index(path: &str) -> Result<RouteIndex, String> {
    let config = RouteTableConfig::load(path).map_err(|e| e.to_string())?;
    RouteIndex::from_config(&config).map_err(|e| format!("route table invalid: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Set(String, String),
    Select(String),
    Param(String, String),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RenderRequest {
    steps: Vec<Step>,
    endpoint: Option<String>,
    method: Option<Method>,
    trace: bool,
}

fn parse_steps(args: &[String]) -> Result<RenderRequest, String> {
    let mut request = RenderRequest::default();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        if !flag.starts_with("--") {
            return Err(format!("unexpected argument \"{flag}\""));
        }
        if flag == "--trace" {
            request.trace = true;
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .ok_or_else(|| format!("{flag} requires a value"))?;
        match flag {
            "--set" => {
                let (name, v) = split_pair(value, "name=value")?;
                request.steps.push(Step::Set(name, v));
            }
            "--select" => request.steps.push(Step::Select(value.clone())),
            "--param" => {
                let (key, v) = split_pair(value, "key=value")?;
                request.steps.push(Step::Param(key, v));
            }
            "--endpoint" => request.endpoint = Some(value.clone()),
            "--method" => request.method = Some(value.parse::<Method>().map_err(|e| e.to_string())?),
            _ => return Err(format!("unexpected argument \"{flag}\"")),
        }
        i += 2;
    }

    Ok(request)
}

fn split_pair(pair: &str, shape: &str) -> Result<(String, String), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("invalid pair \"{pair}\", expected {shape}"))?;
    Ok((key.to_owned(), value.to_owned()))
}

fn print_usage() {
    eprintln!(
        "Usage: pathwright <command> [options]

Commands:
  check <routes>                               Validate a route table (JSON or YAML)
  info <routes>                                List resources, setters and levels
  render <routes> <namespace> <resource>       Chain setters and print the URI
      [--set name=value] [--select name]       Setter calls, applied in order
      [--param key=value]                      Query-string parameter
      [--endpoint url]                         API root to prefix
      [--method verb]                          Check the verb and print the request line
      [--trace]                                Print a per-level report instead
  help                                         Show this help"
    );
}
