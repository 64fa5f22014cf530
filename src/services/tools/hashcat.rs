//! `hash_crack`: hashcat dictionary attack.
//!
//! Hash types may be given as numeric modes or as one of a handful of
//! well-known names. Cracked plaintexts are not extracted from the output;
//! `results.cracked_hashes` is always empty and a note says so.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::checked;
use crate::domain::errors::ToolResult;
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{echo_params, ExecutionSettings, ToolProfile};

const HASH_MODES: &[(&str, &str)] = &[
    ("md5", "0"),
    ("sha1", "100"),
    ("sha256", "1400"),
    ("sha512", "1700"),
    ("ntlm", "1000"),
    ("bcrypt", "3200"),
];

const UNPARSED_NOTE: &str =
    "Cracked hashes are not extracted from hashcat output; inspect results.output.";

/// Map a hash type alias to its hashcat mode. Unknown values pass through.
pub fn hash_mode(hash_type: &str) -> String {
    let trimmed = hash_type.trim();
    HASH_MODES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), |(_, mode)| (*mode).to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashcatParams {
    pub hash_file: String,
    pub wordlist: String,
    pub hash_type: String,
}

pub struct HashcatProfile;

impl ToolProfile for HashcatProfile {
    type Params = HashcatParams;

    const BINARY: &'static str = "hashcat";
    const INSTALL_HINT: &'static str =
        "Please install hashcat from https://hashcat.net/hashcat/ or your package manager.";

    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(
            "hash_crack",
            Self::BINARY,
            "Run Hashcat to crack hashes with a wordlist.",
        )
        .param(ParamSpec::required(
            "hash_file",
            ParamKind::String,
            "Path to file containing hashes",
        ))
        .param(ParamSpec::required(
            "wordlist",
            ParamKind::String,
            "Path to wordlist file",
        ))
        .param(ParamSpec::required(
            "hash_type",
            ParamKind::String,
            "Hash type as a hashcat mode (e.g. \"0\", \"1000\") or a name: md5, sha1, sha256, sha512, ntlm, bcrypt",
        ))
    }

    fn build(&self, params: &HashcatParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mode = hash_mode(checked("hash_type", &params.hash_type)?);
        let mut spec = settings.spec(Self::BINARY);
        spec.arg("-m")
            .arg(mode)
            .args(["--potfile-disable", "--outfile-format=2"])
            .arg(checked("hash_file", &params.hash_file)?)
            .arg(checked("wordlist", &params.wordlist)?);
        Ok(spec)
    }

    fn parse(&self, _params: &HashcatParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::Results(json!({
            "output": outcome.stdout,
            "cracked_hashes": [],
            "note": UNPARSED_NOTE,
        })))
    }

    fn targets(&self, params: &HashcatParams) -> Vec<String> {
        vec![params.hash_file.clone()]
    }

    fn echo(&self, params: &HashcatParams) -> Map<String, Value> {
        let mut echo = echo_params(params);
        echo.insert("mode".into(), Value::String(hash_mode(&params.hash_type)));
        echo
    }

    // exit 1 means the wordlist was exhausted without a crack
    fn accepts_exit(&self, exit_code: Option<i32>) -> bool {
        matches!(exit_code, Some(0 | 1))
    }
}
