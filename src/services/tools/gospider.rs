//! `web_crawl` and `web_crawl_filtered`: gospider.

use serde::{Deserialize, Serialize};

use super::{alphanumeric_list, apply_targets, checked, OutputFormat, Targets};
use crate::domain::errors::{ToolError, ToolResult};
use crate::domain::models::{
    ExecutionOutcome, ExecutionSpec, OperationDescriptor, ParamKind, ParamSpec, Payload,
};
use crate::services::invocation::{ExecutionSettings, ToolProfile};
use crate::services::output_parsers;

const BINARY: &str = "gospider";
const INSTALL_HINT: &str =
    "Please install gospider: go install -v github.com/jaeles-project/gospider@latest";

fn crawl_params(descriptor: OperationDescriptor) -> OperationDescriptor {
    descriptor
        .param(ParamSpec::optional("depth", ParamKind::Integer, "Maximum crawling depth").with_default(3))
        .param(
            ParamSpec::optional("concurrency", ParamKind::Integer, "Number of concurrent requests")
                .with_default(10),
        )
        .param(
            ParamSpec::optional("timeout", ParamKind::Integer, "Request timeout in seconds")
                .with_default(10),
        )
}

fn crawl_limits(spec: &mut ExecutionSpec, depth: i64, concurrency: i64, timeout: i64) {
    spec.arg("-d")
        .arg(depth.to_string())
        .arg("-c")
        .arg(concurrency.to_string())
        .arg("-t")
        .arg(timeout.to_string());
}

/// `\.(js|json)$` style regex for gospider's white/black lists.
fn extension_regex(name: &str, extensions: &[String]) -> ToolResult<String> {
    let tokens = alphanumeric_list(name, extensions)?;
    Ok(format!(r"\.({})$", tokens.join("|")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlParams {
    pub target: Targets,
    pub depth: i64,
    pub concurrency: i64,
    pub timeout: i64,
    pub user_agent: Option<String>,
    pub headers: Option<Vec<String>>,
    pub include_subdomains: bool,
    pub include_other_sources: bool,
    pub output_format: OutputFormat,
}

pub struct GospiderProfile;

impl ToolProfile for GospiderProfile {
    type Params = CrawlParams;

    const BINARY: &'static str = BINARY;
    const INSTALL_HINT: &'static str = INSTALL_HINT;

    fn descriptor(&self) -> OperationDescriptor {
        let descriptor = OperationDescriptor::new(
            "web_crawl",
            BINARY,
            "Run Gospider to crawl websites and discover URLs, forms and secrets.",
        )
        .param(ParamSpec::required(
            "target",
            ParamKind::StringOrList,
            "Target URL to crawl, or a list of URLs",
        ));

        crawl_params(descriptor)
            .param(ParamSpec::optional(
                "user_agent",
                ParamKind::String,
                "Custom User-Agent string",
            ))
            .param(ParamSpec::optional(
                "headers",
                ParamKind::StringList,
                "Custom headers (e.g. [\"Authorization: Bearer token\"])",
            ))
            .param(
                ParamSpec::optional(
                    "include_subdomains",
                    ParamKind::Boolean,
                    "Include subdomains in crawling",
                )
                .with_default(false),
            )
            .param(
                ParamSpec::optional(
                    "include_other_sources",
                    ParamKind::Boolean,
                    "Also collect URLs from third-party sources (archive.org, commoncrawl, virustotal)",
                )
                .with_default(false),
            )
            .param(
                ParamSpec::optional("output_format", ParamKind::String, "Output format: json or text")
                    .with_default("json"),
            )
    }

    fn build(&self, params: &CrawlParams, settings: &ExecutionSettings) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(BINARY);
        apply_targets(&mut spec, "target", &params.target.to_vec(), "-s", "-S")?;
        crawl_limits(&mut spec, params.depth, params.concurrency, params.timeout);

        if let Some(ref user_agent) = params.user_agent {
            spec.arg("-u").arg(checked("user_agent", user_agent)?);
        }
        for header in params.headers.iter().flatten() {
            let header = checked("headers", header)?;
            if !header.contains(':') {
                return Err(ToolError::invalid(format!(
                    "Header must be in 'Name: value' form, got '{header}'"
                )));
            }
            spec.arg("-H").arg(header);
        }

        spec.flag("--subs", params.include_subdomains)
            .flag("-a", params.include_other_sources)
            .flag("--json", params.output_format == OutputFormat::Json);
        Ok(spec)
    }

    fn parse(&self, params: &CrawlParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(match params.output_format {
            OutputFormat::Json => {
                Payload::records("results", output_parsers::json_lines(&outcome.stdout))
            }
            OutputFormat::Text => Payload::raw_output(outcome.stdout.clone()),
        })
    }

    fn targets(&self, params: &CrawlParams) -> Vec<String> {
        params.target.to_vec()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilteredCrawlParams {
    pub target: String,
    pub extensions: Option<Vec<String>>,
    pub exclude_extensions: Option<Vec<String>>,
    pub filter_length: Option<i64>,
    pub depth: i64,
    pub concurrency: i64,
    pub timeout: i64,
    pub include_subdomains: bool,
}

pub struct GospiderFilteredProfile;

impl ToolProfile for GospiderFilteredProfile {
    type Params = FilteredCrawlParams;

    const BINARY: &'static str = BINARY;
    const INSTALL_HINT: &'static str = INSTALL_HINT;

    fn descriptor(&self) -> OperationDescriptor {
        let descriptor = OperationDescriptor::new(
            "web_crawl_filtered",
            BINARY,
            "Run Gospider with URL filtering by extension and response length.",
        )
        .param(ParamSpec::required("target", ParamKind::String, "Target URL to crawl"))
        .param(ParamSpec::optional(
            "extensions",
            ParamKind::StringList,
            "Only keep URLs with these extensions (e.g. [\"js\", \"json\"])",
        ))
        .param(ParamSpec::optional(
            "exclude_extensions",
            ParamKind::StringList,
            "Drop URLs with these extensions (e.g. [\"png\", \"jpg\"])",
        ))
        .param(ParamSpec::optional(
            "filter_length",
            ParamKind::Integer,
            "Drop responses with this body length",
        ));

        crawl_params(descriptor).param(
            ParamSpec::optional(
                "include_subdomains",
                ParamKind::Boolean,
                "Include subdomains in crawling",
            )
            .with_default(false),
        )
    }

    fn build(
        &self,
        params: &FilteredCrawlParams,
        settings: &ExecutionSettings,
    ) -> ToolResult<ExecutionSpec> {
        let mut spec = settings.spec(BINARY);
        spec.arg("-s").arg(checked("target", &params.target)?);
        crawl_limits(&mut spec, params.depth, params.concurrency, params.timeout);

        if let Some(extensions) = params.extensions.as_ref().filter(|e| !e.is_empty()) {
            spec.arg("--whitelist")
                .arg(extension_regex("extensions", extensions)?);
        }
        if let Some(excluded) = params.exclude_extensions.as_ref().filter(|e| !e.is_empty()) {
            spec.arg("--blacklist")
                .arg(extension_regex("exclude_extensions", excluded)?);
        }

        spec.opt_arg("--filter-length", params.filter_length)
            .flag("--subs", params.include_subdomains)
            .arg("--json");
        Ok(spec)
    }

    fn parse(&self, _params: &FilteredCrawlParams, outcome: &ExecutionOutcome) -> ToolResult<Payload> {
        Ok(Payload::records(
            "results",
            output_parsers::json_lines(&outcome.stdout),
        ))
    }

    fn targets(&self, params: &FilteredCrawlParams) -> Vec<String> {
        vec![params.target.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::invocation::decode_arguments;
    use serde_json::json;

    #[test]
    fn test_list_target_goes_to_stdin() {
        let params: CrawlParams = decode_arguments(
            &GospiderProfile.descriptor(),
            json!({ "target": ["https://a.test", "https://b.test"], "include_subdomains": true }),
        )
        .unwrap();
        let spec = GospiderProfile.build(&params, &ExecutionSettings::default()).unwrap();
        assert_eq!(
            spec.args,
            vec!["-S", "-", "-d", "3", "-c", "10", "-t", "10", "--subs", "--json"]
        );
        assert_eq!(spec.stdin.as_deref(), Some("https://a.test\nhttps://b.test"));
    }

    #[test]
    fn test_single_target_with_headers() {
        let params: CrawlParams = decode_arguments(
            &GospiderProfile.descriptor(),
            json!({
                "target": "https://a.test",
                "headers": ["Cookie: session=1"],
                "user_agent": "scanner",
                "output_format": "text"
            }),
        )
        .unwrap();
        let spec = GospiderProfile.build(&params, &ExecutionSettings::default()).unwrap();
        assert_eq!(
            spec.args,
            vec![
                "-s",
                "https://a.test",
                "-d",
                "3",
                "-c",
                "10",
                "-t",
                "10",
                "-u",
                "scanner",
                "-H",
                "Cookie: session=1"
            ]
        );
    }

    #[test]
    fn test_malformed_header_rejected() {
        let params: CrawlParams = decode_arguments(
            &GospiderProfile.descriptor(),
            json!({ "target": "https://a.test", "headers": ["nocolon"] }),
        )
        .unwrap();
        assert!(GospiderProfile.build(&params, &ExecutionSettings::default()).is_err());
    }

    #[test]
    fn test_filtered_regexes() {
        let params: FilteredCrawlParams = decode_arguments(
            &GospiderFilteredProfile.descriptor(),
            json!({
                "target": "https://a.test",
                "extensions": ["js", "json"],
                "exclude_extensions": ["png"],
                "filter_length": 1234
            }),
        )
        .unwrap();
        let spec = GospiderFilteredProfile
            .build(&params, &ExecutionSettings::default())
            .unwrap();
        assert_eq!(
            spec.args,
            vec![
                "-s",
                "https://a.test",
                "-d",
                "3",
                "-c",
                "10",
                "-t",
                "10",
                "--whitelist",
                r"\.(js|json)$",
                "--blacklist",
                r"\.(png)$",
                "--filter-length",
                "1234",
                "--json"
            ]
        );
    }

    #[test]
    fn test_filtered_rejects_regex_extensions() {
        let params: FilteredCrawlParams = decode_arguments(
            &GospiderFilteredProfile.descriptor(),
            json!({ "target": "https://a.test", "extensions": [".*"] }),
        )
        .unwrap();
        assert!(GospiderFilteredProfile
            .build(&params, &ExecutionSettings::default())
            .is_err());
    }
}
