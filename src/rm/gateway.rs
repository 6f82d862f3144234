use crate::core::session::VaultSession;
use crate::crypto::{decrypt_aes_v2, encrypt_aes_v2};
use crate::domain::model::{RouterResponse, VaultRecord};
use crate::domain::ports::{GatewayRouter, VaultApi};
use crate::utils::encoding::{base64_decode, base64_encode};
use crate::utils::error::{OpsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A gateway plus the PAM configuration record bound to it.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub gateway_uid: String,
    pub gateway_name: String,
    pub configuration: VaultRecord,
    record_key: Vec<u8>,
}

fn controller_uid(record: &VaultRecord) -> Option<&str> {
    record
        .field_value("pamResources")
        .and_then(|v| v.get("controllerUid"))
        .and_then(Value::as_str)
}

impl GatewayContext {
    /// Resolves `gateway` (a UID or a name) and its configuration record.
    /// The session must already be synced.
    pub async fn from_gateway<V: VaultApi, R: GatewayRouter>(
        router: &R,
        session: &VaultSession<V>,
        gateway: &str,
    ) -> Result<Self> {
        let not_found = || OpsError::NotFound {
            message: format!("Could not find the gateway configuration for {}.", gateway),
        };

        let wanted = gateway.to_lowercase();
        let found = router
            .list_gateways()
            .await?
            .into_iter()
            .find(|g| g.gateway_uid == gateway || g.gateway_name.to_lowercase() == wanted)
            .ok_or_else(not_found)?;

        let cache = session.cache().await;
        let configuration = cache
            .records
            .iter()
            .find(|r| controller_uid(r) == Some(found.gateway_uid.as_str()))
            .cloned()
            .ok_or_else(not_found)?;

        let record_key = configuration.record_key.clone().ok_or_else(|| {
            OpsError::crypto(format!(
                "The configuration record {} has no record key",
                configuration.record_uid
            ))
        })?;
        tracing::debug!(
            "Gateway {} ({}) uses configuration {}",
            found.gateway_name,
            found.gateway_uid,
            configuration.record_uid
        );

        Ok(Self {
            gateway_uid: found.gateway_uid,
            gateway_name: found.gateway_name,
            configuration,
            record_key,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_test(gateway_uid: &str, configuration: VaultRecord, key: &[u8]) -> Self {
        Self {
            gateway_uid: gateway_uid.to_string(),
            gateway_name: gateway_uid.to_string(),
            configuration,
            record_key: key.to_vec(),
        }
    }

    pub fn configuration_uid(&self) -> &str {
        &self.configuration.record_uid
    }

    pub fn record_key(&self) -> &[u8] {
        &self.record_key
    }

    pub fn encrypt_str(&self, text: &str) -> Result<String> {
        let encrypted = encrypt_aes_v2(text.as_bytes(), &self.record_key)?;
        Ok(base64_encode(&encrypted))
    }

    pub fn encrypt<T: Serialize>(&self, value: &T) -> Result<String> {
        self.encrypt_str(&serde_json::to_string(value)?)
    }

    pub fn decrypt(&self, data: &str) -> Result<Value> {
        let plain = decrypt_aes_v2(&base64_decode(data)?, &self.record_key)?;
        Ok(serde_json::from_slice(&plain)?)
    }

    pub fn decrypt_as<T: for<'de> Deserialize<'de>>(&self, data: &str) -> Result<T> {
        Ok(serde_json::from_value(self.decrypt(data)?)?)
    }
}

/// The `data` object of a gateway reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatewayResult {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    /// Encrypted result document, when the action returns one.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    #[serde(default)]
    data: Option<GatewayResult>,
}

/// Unpacks a router reply. A missing reply is a router failure and
/// `success == false` is reported as `Could not <verb>: <error>`.
pub fn get_response_data(response: Option<RouterResponse>, verb: &str) -> Result<GatewayResult> {
    let router_failure = || OpsError::GatewayError {
        message: "The router returned a failure.".to_string(),
    };

    let payload = response
        .and_then(|r| r.response)
        .and_then(|body| body.payload)
        .ok_or_else(router_failure)?;
    let result = serde_json::from_str::<GatewayPayload>(&payload)?
        .data
        .ok_or_else(router_failure)?;

    if result.success == Some(false) {
        return Err(OpsError::ActionFailed {
            verb: verb.to_string(),
            error: result
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    Ok(result)
}
