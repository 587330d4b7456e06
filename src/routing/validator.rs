//! Structural validation of routing requests.
//!
//! Everything accepted here ends up inside a file name and a Traefik rule, so
//! the checks are strict: plain DNS hostnames, plain DNS labels, real ports.

use thiserror::Error;

use crate::routing::request::{AddDomainRequest, RoutingRequest};

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Rejected caller input. Each variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("domain must not be empty")]
    EmptyDomain,

    #[error("domain is longer than 253 characters")]
    DomainTooLong,

    #[error("domain is not a valid hostname: {0}")]
    InvalidDomain(&'static str),

    #[error("port must be between 1 and 65535, got {0}")]
    PortOutOfRange(i64),

    #[error("serviceName must not be empty")]
    EmptyServiceName,

    #[error("serviceName is not a valid DNS label: {0}")]
    InvalidServiceName(&'static str),
}

impl ValidationError {
    /// The request field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyDomain
            | ValidationError::DomainTooLong
            | ValidationError::InvalidDomain(_) => "domain",
            ValidationError::PortOutOfRange(_) => "port",
            ValidationError::EmptyServiceName | ValidationError::InvalidServiceName(_) => {
                "serviceName"
            }
        }
    }
}

/// Validate a raw request, returning the checked form.
///
/// Fields are checked in order (domain, port, serviceName) and the first
/// failure is returned.
pub fn validate(request: &AddDomainRequest) -> Result<RoutingRequest, ValidationError> {
    let domain = validate_domain(&request.domain)?;
    let port = validate_port(request.port)?;
    let service_name = validate_service_name(&request.service_name)?;

    Ok(RoutingRequest::new_unchecked(domain, port, service_name))
}

fn validate_domain(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyDomain);
    }
    if raw.len() > MAX_HOSTNAME_LEN {
        return Err(ValidationError::DomainTooLong);
    }
    if raw.starts_with('.') || raw.ends_with('.') {
        return Err(ValidationError::InvalidDomain("leading or trailing dot"));
    }

    for label in raw.split('.') {
        check_label(label).map_err(ValidationError::InvalidDomain)?;
    }

    Ok(raw.to_ascii_lowercase())
}

fn validate_port(raw: i64) -> Result<u16, ValidationError> {
    match u16::try_from(raw) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ValidationError::PortOutOfRange(raw)),
    }
}

fn validate_service_name(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyServiceName);
    }
    check_label(raw).map_err(ValidationError::InvalidServiceName)?;
    Ok(raw.to_string())
}

/// RFC 1123 label: 1-63 ASCII letters, digits or hyphens, no hyphen at either end.
fn check_label(label: &str) -> Result<(), &'static str> {
    if label.is_empty() {
        return Err("empty label");
    }
    if label.len() > MAX_LABEL_LEN {
        return Err("label longer than 63 characters");
    }
    if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err("only letters, digits and hyphens are allowed");
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err("label must not start or end with a hyphen");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(domain: &str, port: i64, service: &str) -> AddDomainRequest {
        AddDomainRequest::new(domain, port, service)
    }

    #[test]
    fn test_accepts_valid_request() {
        let checked = validate(&request("App.Example.com", 4000, "myapp")).unwrap();
        assert_eq!(checked.domain(), "app.example.com");
        assert_eq!(checked.port(), 4000);
        assert_eq!(checked.service_name(), "myapp");
    }

    #[test]
    fn test_port_bounds() {
        assert!(validate(&request("a.example.com", 1, "a")).is_ok());
        assert!(validate(&request("a.example.com", 65535, "a")).is_ok());
        assert_eq!(
            validate(&request("a.example.com", 0, "a")),
            Err(ValidationError::PortOutOfRange(0))
        );
        assert_eq!(
            validate(&request("a.example.com", 65536, "a")),
            Err(ValidationError::PortOutOfRange(65536))
        );
        assert!(validate(&request("a.example.com", -1, "a")).is_err());
    }

    #[test]
    fn test_rejects_bad_domains() {
        let cases = [
            "",
            "exa mple.com",
            "example.com/../../etc",
            "*.example.com",
            "example..com",
            ".example.com",
            "example.com.",
            "-bad.example.com",
            "host`)||Host(`evil.com",
        ];
        for domain in cases {
            let err = validate(&request(domain, 80, "svc")).unwrap_err();
            assert_eq!(err.field(), "domain", "accepted {:?}", domain);
        }

        let long = format!("{}.com", "a".repeat(MAX_HOSTNAME_LEN));
        assert_eq!(
            validate(&request(&long, 80, "svc")),
            Err(ValidationError::DomainTooLong)
        );
    }

    #[test]
    fn test_rejects_bad_service_names() {
        let too_long = "x".repeat(64);
        for service in ["", "my_app", "my.app", "-app", "app-", "my app", too_long.as_str()] {
            let err = validate(&request("a.example.com", 80, service)).unwrap_err();
            assert_eq!(err.field(), "serviceName", "accepted {:?}", service);
        }
    }

    #[test]
    fn test_error_names_field() {
        let err = validate(&request("a.example.com", 80, "")).unwrap_err();
        assert_eq!(err.to_string(), "serviceName must not be empty");
    }
}
