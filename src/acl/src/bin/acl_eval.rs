//! # ACL evaluation command
//!
//! Reads one JSON request from stdin and writes the decisions to stdout.
//!
//! ```text
//! $ echo '{"grants":["confd.users.*"],"subject_id":"u1","permissions":["confd.users.read"]}' | acl-eval
//! {"results":{"confd.users.read":true},"superuser":false}
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG` - Log level (default: info)
//! - `ACL_PATTERN_CACHE_SIZE` - Compiled pattern cache capacity (default: 10000)
//! - `ACL_SUBSTITUTION_CACHE_SIZE` - Substitution cache capacity (default: 10000)
//! - `ACL_CHECKER_CACHE_SIZE` - Access checker cache capacity (default: 1000)
//! - `ACL_CACHE_SHARDS` - Shards per cache (default: 16)

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use cretoai_acl::{AclConfig, AclEngine, AclError, EvaluationContext};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Evaluation request body
#[derive(Debug, Deserialize)]
struct EvalRequest {
    grants: Vec<String>,
    subject_id: String,
    #[serde(default)]
    session_id: Option<String>,
    permissions: Vec<String>,
}

/// Evaluation response body
#[derive(Debug, Serialize)]
struct EvalResponse {
    results: BTreeMap<String, bool>,
    superuser: bool,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Exit code for a malformed requested permission
const EXIT_BAD_REQUEST: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting acl-eval v{}", cretoai_acl::VERSION);

    let config = AclConfig::from_env().context("loading ACL configuration")?;
    let engine = AclEngine::new(config)?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading request from stdin")?;
    let request: EvalRequest =
        serde_json::from_str(&input).context("parsing evaluation request")?;

    let mut stdout = io::stdout().lock();
    match evaluate(&engine, request) {
        Ok(response) => {
            serde_json::to_writer(&mut stdout, &response)?;
            writeln!(stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_client_error() => {
            error!("Rejected request: {}", e);
            let body = ErrorResponse {
                error: "malformed_permission".to_string(),
                message: e.to_string(),
            };
            serde_json::to_writer(&mut stdout, &body)?;
            writeln!(stdout)?;
            Ok(ExitCode::from(EXIT_BAD_REQUEST))
        }
        Err(e) => Err(e.into()),
    }
}

fn evaluate(engine: &AclEngine, request: EvalRequest) -> Result<EvalResponse, AclError> {
    let mut ctx = EvaluationContext::new(request.subject_id);
    ctx.session_id = request.session_id;

    let acl = engine.acl(&request.grants, ctx);

    let mut results = BTreeMap::new();
    for permission in request.permissions {
        let allowed = acl.has_permission(&permission)?;
        results.insert(permission, allowed);
    }

    Ok(EvalResponse {
        results,
        superuser: acl.is_superuser(),
    })
}
