use crate::cache::PageCache;
use crate::config::{FetchMode, LoadedSource, resolve_path};
use crate::model::Month;
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source_url: String,
    pub body: Vec<u8>,
}

pub fn fetch_source_documents(
    source: &LoadedSource,
    cache: Option<&PageCache>,
) -> Result<Vec<FetchedDocument>> {
    match source.config.fetch.mode {
        FetchMode::Http => fetch_http_documents(source, cache),
        FetchMode::File => fetch_file_document(source),
        FetchMode::Inline => fetch_inline_document(source),
    }
}

fn fetch_http_documents(
    source: &LoadedSource,
    cache: Option<&PageCache>,
) -> Result<Vec<FetchedDocument>> {
    let mut headers = HeaderMap::new();
    for (k, v) in &source.config.fetch.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    if let Some(user_agent) = &source.config.fetch.user_agent {
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(source.config.fetch.timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build reqwest client")?;

    let base_url = source
        .config
        .fetch
        .base_url
        .as_ref()
        .context("fetch.base_url missing")?;

    // One listing page per allowed month when the URL is month-templated;
    // a single page otherwise.
    let urls = if base_url.contains("{{month}}") {
        source
            .config
            .engine
            .months
            .iter()
            .map(|month| render_url(source, base_url, Some(*month)))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![render_url(source, base_url, None)?]
    };

    let ttl_secs = source.config.fetch.cache_ttl_secs;
    let mut docs = Vec::new();

    for url in urls {
        if let Some(body) = cache.and_then(|cache| cache.lookup(&url, ttl_secs)) {
            info!(source = %source.config.source.key, %url, bytes = body.len(), "serving page from cache");
            docs.push(FetchedDocument {
                source_url: url,
                body,
            });
            continue;
        }

        let body = fetch_with_retries(
            &client,
            &source.config.fetch.method,
            &url,
            source.config.fetch.retry_attempts,
            source.config.fetch.retry_backoff_ms,
        )?;

        info!(
            source = %source.config.source.key,
            %url,
            bytes = body.len(),
            "fetched page"
        );

        if let Some(cache) = cache {
            cache.store(&url, &body)?;
        }

        docs.push(FetchedDocument {
            source_url: url,
            body,
        });
    }

    Ok(docs)
}

fn render_url(source: &LoadedSource, template: &str, month: Option<Month>) -> Result<String> {
    let mut rendered = template.to_string();
    if let Some(month) = month {
        rendered = rendered.replace("{{month}}", month.url_token());
    }
    for (key, value) in &source.config.fetch.template_vars {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }

    Url::parse(&rendered).with_context(|| format!("invalid listing url {rendered}"))?;
    Ok(rendered)
}

fn fetch_with_retries(
    client: &Client,
    method: &str,
    url: &str,
    retry_attempts: u8,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let attempts = retry_attempts.max(1);

    for attempt in 1..=attempts {
        let request = match method.to_ascii_uppercase().as_str() {
            "GET" => client.get(url),
            "POST" => client.post(url),
            other => bail!("unsupported fetch method {other}"),
        };

        match request.send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    if attempt == attempts {
                        bail!("request to {url} failed with status {status}");
                    }
                    warn!(%url, %status, attempt, "request failed; retrying");
                } else {
                    return Ok(resp.bytes()?.to_vec());
                }
            }
            Err(err) => {
                if attempt == attempts {
                    return Err(err).with_context(|| format!("request to {url} failed"));
                }
                warn!(%url, attempt, error = %err, "request errored; retrying");
            }
        }

        std::thread::sleep(Duration::from_millis(retry_backoff_ms));
    }

    bail!("request to {url} failed after retries")
}

fn fetch_file_document(source: &LoadedSource) -> Result<Vec<FetchedDocument>> {
    let file_path = source
        .config
        .fetch
        .file_path
        .as_ref()
        .context("fetch.file_path missing for file mode")?;
    let resolved = resolve_path(&source.path, file_path)?;
    let body = std::fs::read(&resolved)
        .with_context(|| format!("failed to read file source {}", resolved.display()))?;

    info!(
        source = %source.config.source.key,
        file = %resolved.display(),
        bytes = body.len(),
        "loaded file source"
    );

    Ok(vec![FetchedDocument {
        source_url: format!("file://{}", resolved.display()),
        body,
    }])
}

fn fetch_inline_document(source: &LoadedSource) -> Result<Vec<FetchedDocument>> {
    let inline = source
        .config
        .fetch
        .inline_data
        .as_ref()
        .context("fetch.inline_data missing for inline mode")?;

    debug!(
        source = %source.config.source.key,
        bytes = inline.len(),
        "loaded inline source"
    );

    Ok(vec![FetchedDocument {
        source_url: format!("inline://{}", source.config.source.key),
        body: inline.as_bytes().to_vec(),
    }])
}
