//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check uniqueness of servlet and filter names
//! - Validate URL patterns, dispatcher names and error page declarations
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - A filter mapping naming an undeclared filter is accepted; the chain
//!   builder logs and skips it per request

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ApplicationConfig, ServerConfig};
use crate::filter::config::DispatcherTypes;
use crate::routing::matcher::is_valid_pattern;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("duplicate servlet name: {0}")]
    DuplicateServlet(String),

    #[error("duplicate filter name: {0}")]
    DuplicateFilter(String),

    #[error("{owner}: malformed url pattern {pattern:?}")]
    InvalidUrlPattern { owner: String, pattern: String },

    #[error("filter mapping for {0} declares neither url patterns nor servlet names")]
    EmptyFilterMapping(String),

    #[error("filter mapping for {filter}: unknown dispatcher {name}")]
    UnknownDispatcher { filter: String, name: String },

    #[error("error page {0} must declare exactly one of error_code or exception_type")]
    AmbiguousErrorPage(String),

    #[error("error page location must start with '/': {0}")]
    InvalidErrorPageLocation(String),
}

/// Validate a complete server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if let Err(app_errors) = validate_application(&config.application) {
        errors.extend(app_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the application section on its own.
pub fn validate_application(app: &ApplicationConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if app.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let mut servlet_names = HashSet::new();
    for servlet in &app.servlets {
        if !servlet_names.insert(servlet.name.as_str()) {
            errors.push(ValidationError::DuplicateServlet(servlet.name.clone()));
        }
        for pattern in &servlet.url_patterns {
            if !is_valid_pattern(pattern) {
                errors.push(ValidationError::InvalidUrlPattern {
                    owner: format!("servlet {}", servlet.name),
                    pattern: pattern.clone(),
                });
            }
        }
    }

    let mut filter_names = HashSet::new();
    for filter in &app.filters {
        if !filter_names.insert(filter.name.as_str()) {
            errors.push(ValidationError::DuplicateFilter(filter.name.clone()));
        }
    }

    for mapping in &app.filter_mappings {
        if mapping.url_patterns.is_empty() && mapping.servlet_names.is_empty() {
            errors.push(ValidationError::EmptyFilterMapping(mapping.filter_name.clone()));
        }
        for pattern in &mapping.url_patterns {
            if !is_valid_pattern(pattern) {
                errors.push(ValidationError::InvalidUrlPattern {
                    owner: format!("filter mapping {}", mapping.filter_name),
                    pattern: pattern.clone(),
                });
            }
        }
        if let Err(name) = DispatcherTypes::parse(&mapping.dispatchers) {
            errors.push(ValidationError::UnknownDispatcher {
                filter: mapping.filter_name.clone(),
                name,
            });
        }
    }

    for page in &app.error_pages {
        if page.error_code.is_some() == page.exception_type.is_some() {
            errors.push(ValidationError::AmbiguousErrorPage(page.location.clone()));
        }
        if !page.location.starts_with('/') {
            errors.push(ValidationError::InvalidErrorPageLocation(page.location.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ErrorPageDef, FilterDef, FilterMappingDef, ServletDef};

    fn servlet(name: &str, patterns: &[&str]) -> ServletDef {
        ServletDef {
            name: name.into(),
            class: "file".into(),
            url_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            init_params: Default::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.application.servlets = vec![servlet("a", &["/ok/*", "bad"]), servlet("a", &["/"])];
        config.application.filters = vec![
            FilterDef { name: "f".into(), class: "logging".into(), init_params: Default::default() },
            FilterDef { name: "f".into(), class: "logging".into(), init_params: Default::default() },
        ];
        config.application.filter_mappings = vec![
            FilterMappingDef {
                filter_name: "f".into(),
                url_patterns: vec![],
                servlet_names: vec![],
                dispatchers: vec!["ASYNC".into()],
            },
            // Undeclared filter: accepted.
            FilterMappingDef {
                filter_name: "ghost".into(),
                url_patterns: vec!["/*".into()],
                servlet_names: vec![],
                dispatchers: vec![],
            },
        ];
        config.application.error_pages = vec![ErrorPageDef {
            error_code: Some(404),
            exception_type: Some("Io".into()),
            location: "missing-slash.html".into(),
        }];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::DuplicateServlet("a".into())));
        assert!(errors.contains(&ValidationError::DuplicateFilter("f".into())));
        assert!(errors.contains(&ValidationError::InvalidUrlPattern {
            owner: "servlet a".into(),
            pattern: "bad".into()
        }));
        assert!(errors.contains(&ValidationError::EmptyFilterMapping("f".into())));
        assert!(errors.contains(&ValidationError::UnknownDispatcher {
            filter: "f".into(),
            name: "ASYNC".into()
        }));
        assert!(errors.contains(&ValidationError::AmbiguousErrorPage("missing-slash.html".into())));
        assert!(errors.contains(&ValidationError::InvalidErrorPageLocation(
            "missing-slash.html".into()
        )));
        assert_eq!(errors.len(), 9);
    }
}
