use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a non-loopback host.
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The URL cannot have path segments appended (e.g. `mailto:`).
    #[error("URL cannot be used as an API base: {0}")]
    NotABase(String),
    /// The URL points to localhost or a private network address.
    #[error("Refusing to open local or private address: {0}")]
    PrivateAddress(String),
}

/// Validates the catalog service base URL.
///
/// HTTPS is required. Plain HTTP is accepted only for loopback hosts, which is
/// what local mock servers bind to.
///
/// ```
/// use pokedex::util::validate_base_url;
///
/// assert!(validate_base_url("https://pokeapi.co/api/v2/").is_ok());
/// assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
/// assert!(validate_base_url("http://pokeapi.co/api/v2/").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    if url.cannot_be_a_base() {
        return Err(UrlValidationError::NotABase(url_str.to_owned()));
    }

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS base URL (localhost only)");
            Ok(url)
        }
        "http" => {
            tracing::error!(base_url = %url, "Rejecting non-HTTPS base URL");
            Err(UrlValidationError::InsecureBaseUrl)
        }
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Validates an image URL before handing it to the system opener.
///
/// Only public http(s) URLs pass; anything else could launch an arbitrary
/// handler or reach into the local network.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if is_loopback_host(&url) {
        return Err(UrlValidationError::PrivateAddress(
            url.host_str().unwrap_or_default().to_owned(),
        ));
    }
    if let Some(ip) = host_ip(&url) {
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateAddress(ip.to_string()));
        }
    }

    Ok(url)
}

fn host_ip(url: &Url) -> Option<IpAddr> {
    let host = url.host_str()?;
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
        .parse()
        .ok()
}

fn is_loopback_host(url: &Url) -> bool {
    if url.host_str() == Some("localhost") {
        return true;
    }
    host_ip(url).is_some_and(|ip| ip.is_loopback())
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_base_accepted() {
        let url = validate_base_url("https://pokeapi.co/api/v2/").unwrap();
        assert_eq!(url.host_str(), Some("pokeapi.co"));
    }

    #[test]
    fn test_http_localhost_base_accepted() {
        assert!(validate_base_url("http://localhost:3000/").is_ok());
        assert!(validate_base_url("http://127.0.0.1:3000").is_ok());
        assert!(validate_base_url("http://[::1]:3000").is_ok());
    }

    #[test]
    fn test_http_remote_base_rejected() {
        assert!(matches!(
            validate_base_url("http://pokeapi.co/api/v2/"),
            Err(UrlValidationError::InsecureBaseUrl)
        ));
    }

    #[test]
    fn test_base_scheme_and_shape_rejected() {
        assert!(matches!(
            validate_base_url("ftp://pokeapi.co/"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_base_url("mailto:ash@example.com").is_err());
        assert!(matches!(
            validate_base_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_open_accepts_public_image() {
        assert!(validate_url_for_open(
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png"
        )
        .is_ok());
    }

    #[test]
    fn test_open_rejects_non_http() {
        assert!(validate_url_for_open("file:///etc/passwd").is_err());
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_open_rejects_local_and_private() {
        assert!(validate_url_for_open("http://localhost/a.png").is_err());
        assert!(validate_url_for_open("http://127.0.0.1/a.png").is_err());
        assert!(validate_url_for_open("http://192.168.1.10/a.png").is_err());
        assert!(validate_url_for_open("http://10.0.0.1:8080/a.png").is_err());
        assert!(validate_url_for_open("http://169.254.1.1/a.png").is_err());
        assert!(validate_url_for_open("http://[fe80::1]/a.png").is_err());
        assert!(validate_url_for_open("http://0.0.0.0/a.png").is_err());
    }
}
