//! Tally CLI
//!
//! Reads one JSON request per line on stdin and writes one JSON response per
//! line on stdout. Logs go to stderr.
//!
//! Request:  {"calculator": "loan", "inputs": {...}}
//! Response: {"ok": true, "result": {...}} or {"ok": false, "error": {...}}
//!
//! `{"calculator": "list"}` returns the metadata of every calculator.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::{self, BufRead, Write};
use tally::calculators;
use tally::EvalContext;
use tally_core::TallyError;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct Request {
    calculator: String,
    #[serde(default)]
    inputs: JsonValue,
}

#[derive(Debug, Serialize)]
struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<TallyError>,
}

impl Response {
    fn from_result(result: Result<JsonValue, TallyError>) -> Self {
        match result {
            Ok(value) => Self { ok: true, result: Some(value), error: None },
            Err(err) => Self { ok: false, result: None, error: Some(err) },
        }
    }
}

fn handle_line(line: &str, ctx: &EvalContext) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable request");
            return Response::from_result(Err(TallyError::parse_error(e.to_string())));
        }
    };

    tracing::info!(calculator = %request.calculator, "processing");

    let result = if request.calculator.eq_ignore_ascii_case("list") {
        serde_json::to_value(calculators::catalog()).map_err(|e| TallyError::internal(e.to_string()))
    } else {
        calculators::evaluate(&request.calculator, request.inputs, ctx)
    };

    if let Err(ref err) = result {
        tracing::info!(code = %err.code, message = %err.message, "request failed");
    }

    Response::from_result(result)
}

fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"ok":false,"error":{{"code":"INTERNAL","message":"could not encode response: {}","severity":"fatal"}}}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let ctx = EvalContext::from_env();
    tracing::info!(
        version = VERSION,
        max_schedule_periods = ctx.max_schedule_periods,
        discount_rate = ctx.refinance_discount_rate,
        "tally ready"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                tracing::debug!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let response = handle_line(line, &ctx);

                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", encode(&response)).and_then(|_| stdout.flush()) {
                    tracing::error!(error = %e, "error writing response");
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "error reading input");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        EvalContext::default()
    }

    #[test]
    fn test_list() {
        let response = handle_line(r#"{"calculator": "list"}"#, &ctx());
        assert!(response.ok);
        let list = response.result.unwrap();
        assert_eq!(list.as_array().map(|a| a.len()), Some(8));
        assert_eq!(list[0]["name"], "beta");
    }

    #[test]
    fn test_loan_request() {
        let line = r#"{"calculator": "loan", "inputs": {"principal": 24000, "annualRate": 0, "numberOfPayments": 48, "includeSchedule": false}}"#;
        let response = handle_line(line, &ctx());
        assert!(response.ok);
        assert_eq!(response.result.unwrap()["payment"], 500.0);
    }

    #[test]
    fn test_malformed_line() {
        let response = handle_line("{not json", &ctx());
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().code, "PARSE_ERROR");
    }

    #[test]
    fn test_validation_error_is_encoded() {
        let line = r#"{"calculator": "calmar", "inputs": {"portfolioValues": [100, 90]}}"#;
        let encoded = encode(&handle_line(line, &ctx()));
        let json: JsonValue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "VALIDATION");
        assert_eq!(json["error"]["field"], "portfolioValues");
        assert!(json.get("result").is_none());
    }
}
