//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, QoS in 0..=2)
//! - Check that the selected notification sink is fully configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ExpressConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ExpressConfig, SinkKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    BadAddress { field: &'static str, value: String },

    #[error("{field} is not a valid URL: {value}")]
    BadUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("notify.qos only 0, 1, 2 (got {0})")]
    QoS(u8),

    #[error("notify.webhook_url is required when notify.sink = \"webhook\"")]
    MissingWebhookUrl,

    #[error("notify.mqtt_url is required when notify.sink = \"mqtt\"")]
    MissingMqttUrl,
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<url::Url>().is_err() {
        errors.push(ValidationError::BadUrl {
            field,
            value: value.to_string(),
        });
    }
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ExpressConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "listener.max_body_bytes",
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "listener.request_timeout_secs",
        });
    }

    if config.blockchain.rpc_url.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "blockchain.rpc_url",
        });
    } else {
        check_url("blockchain.rpc_url", &config.blockchain.rpc_url, &mut errors);
    }
    for url in &config.blockchain.failover_urls {
        check_url("blockchain.failover_urls", url, &mut errors);
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "blockchain.rpc_timeout_secs",
        });
    }

    if config.relay.queue_capacity == 0 {
        errors.push(ValidationError::Zero {
            field: "relay.queue_capacity",
        });
    }
    if config.relay.block_period_secs == Some(0) {
        errors.push(ValidationError::Zero {
            field: "relay.block_period_secs",
        });
    }
    if config.relay.wait_mined_poll_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "relay.wait_mined_poll_ms",
        });
    }
    if config.relay.rpc_namespace.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "relay.rpc_namespace",
        });
    }

    if config.notify.qos > 2 {
        errors.push(ValidationError::QoS(config.notify.qos));
    }
    if config.notify.ws_buffer == 0 {
        errors.push(ValidationError::Zero {
            field: "notify.ws_buffer",
        });
    }
    match config.notify.sink {
        SinkKind::Webhook => {
            match &config.notify.webhook_url {
                Some(url) => check_url("notify.webhook_url", url, &mut errors),
                None => errors.push(ValidationError::MissingWebhookUrl),
            }
            if config.notify.webhook_timeout_secs == 0 {
                errors.push(ValidationError::Zero {
                    field: "notify.webhook_timeout_secs",
                });
            }
        }
        SinkKind::Mqtt => match &config.notify.mqtt_url {
            Some(url) => check_url("notify.mqtt_url", url, &mut errors),
            None => errors.push(ValidationError::MissingMqttUrl),
        },
        SinkKind::Websocket => {}
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
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

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ExpressConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ExpressConfig::default();
        config.blockchain.rpc_url = String::new();
        config.notify.qos = 3;
        config.relay.queue_capacity = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::QoS(3)));
        assert!(errors.contains(&ValidationError::Empty {
            field: "blockchain.rpc_url"
        }));
    }

    #[test]
    fn test_webhook_requires_url() {
        let mut config = ExpressConfig::default();
        config.notify.sink = SinkKind::Webhook;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingWebhookUrl])
        );

        config.notify.webhook_url = Some("http://127.0.0.1:9000".to_string());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_mqtt_requires_broker_url() {
        let mut config = ExpressConfig::default();
        config.notify.sink = SinkKind::Mqtt;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingMqttUrl])
        );

        config.notify.mqtt_url = Some("tcp://127.0.0.1:1883".to_string());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_zero_webhook_timeout_rejected() {
        let mut config = ExpressConfig::default();
        config.notify.sink = SinkKind::Webhook;
        config.notify.webhook_url = Some("http://127.0.0.1:9000".to_string());
        config.notify.webhook_timeout_secs = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Zero {
                field: "notify.webhook_timeout_secs"
            }])
        );
    }

    #[test]
    fn test_zero_block_period_rejected() {
        let mut config = ExpressConfig::default();
        config.relay.block_period_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
