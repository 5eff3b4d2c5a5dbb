use std::error::Error as _;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use jobscout_core::error::AppError;
use jobscout_core::traits::Fetcher;
use reqwest::Client;
use reqwest::redirect::Policy;
use url::Url;

/// Client timeout used by [`ReqwestFetcher::new`].
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirect hops followed before giving up (reqwest's default limit).
const MAX_REDIRECTS: usize = 10;

/// HTTP fetcher using reqwest.
///
/// One GET per call, no retries, up to 10 redirects. Any transport error or
/// non-2xx status is an error for that URL only. The body is decoded using
/// the charset of the `Content-Type` header and returned as UTF-8.
///
/// SSRF protection is on by default: requests to private/reserved IP ranges
/// are refused before anything is sent, and redirects to private IP literals
/// or `localhost` are not followed. Use
/// [`allow_private_urls`](Self::allow_private_urls) to turn it off.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(timeout, true)?,
            timeout,
            ssrf_protection: true,
        })
    }

    /// Disable SSRF protection, allowing requests and redirects to
    /// private/reserved IPs.
    ///
    /// Meant for the CLI and local testing, where the user controls the machine.
    pub fn allow_private_urls(self) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(self.timeout, false)?,
            timeout: self.timeout,
            ssrf_protection: false,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

fn build_client(timeout: Duration, ssrf_protection: bool) -> Result<Client, AppError> {
    let redirects = if ssrf_protection {
        guarded_redirects()
    } else {
        Policy::limited(MAX_REDIRECTS)
    };

    Client::builder()
        .user_agent(concat!("Jobscout/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .redirect(redirects)
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if self.ssrf_protection {
            validate_url(url).await?;
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs())
            } else if e.is_redirect() {
                let reason = e.source().map(ToString::to_string).unwrap_or_default();
                AppError::HttpError(format!("Redirect refused for {url}: {reason}"))
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        // `response` owns the connection; every return below drops it.
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs())
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })?;
        tracing::debug!(%url, bytes = body.len(), "Fetched document");

        Ok(body.into_bytes())
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Refuse URLs that are not http(s) or that point at private/reserved hosts.
///
/// Literal IPs are checked directly; host names are resolved and refused if
/// any resolved address is private.
async fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL {url}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::HttpError(format!(
            "URL scheme '{}' is not allowed (only http/https)",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::HttpError(format!("URL has no host: {url}")))?;

    // Url keeps brackets around IPv6 literals.
    if let Ok(ip) = host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return ensure_public(host, ip);
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| AppError::NetworkError(format!("DNS resolution failed for {host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(AppError::NetworkError(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }

    addrs
        .iter()
        .try_for_each(|addr| ensure_public(host, addr.ip()))
}

/// Follow redirects unless they point at a host the guard would refuse.
///
/// The policy runs synchronously, so only IP literals and `localhost` names
/// are checked here; names are not resolved.
fn guarded_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if let Some(reason) = blocked_redirect(attempt.url()) {
            attempt.error(reason)
        } else {
            attempt.follow()
        }
    })
}

fn blocked_redirect(target: &Url) -> Option<String> {
    if !matches!(target.scheme(), "http" | "https") {
        return Some(format!(
            "redirect to scheme '{}' is not allowed",
            target.scheme()
        ));
    }
    let Some(host) = target.host_str() else {
        return Some(format!("redirect target {target} has no host"));
    };

    if let Ok(ip) = host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return is_private_ip(ip)
            .then(|| format!("SSRF blocked: redirect to private/reserved IP {ip}"));
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    (host == "localhost" || host.ends_with(".localhost"))
        .then(|| format!("SSRF blocked: redirect to {host}"))
}

fn ensure_public(host: &str, ip: IpAddr) -> Result<(), AppError> {
    if is_private_ip(ip) {
        return Err(AppError::HttpError(format!(
            "SSRF blocked: {host} resolves to private/reserved IP {ip}"
        )));
    }
    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(v4: Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local() // includes 169.254.169.254 cloud metadata
        || v4.is_unspecified()
        || v4.is_broadcast()
        || v4.is_documentation()
        || (a == 100 && (b & 0xC0) == 64) // 100.64.0.0/10 carrier-grade NAT
}

fn is_private_v6(v6: Ipv6Addr) -> bool {
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        || (first & 0xFFC0) == 0xFE80 // fe80::/10 link-local
        || (first & 0xFE00) == 0xFC00 // fc00::/7 unique local
        || v6.to_ipv4_mapped().is_some_and(is_private_v4)
}
