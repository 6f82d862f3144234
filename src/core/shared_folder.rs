use crate::core::permission::PermissionUpdate;
use crate::core::session::VaultSession;
use crate::crypto;
use crate::domain::model::{
    EncryptedKey, EncryptedKeyType, SharedFolderTeamUpdate, SharedFolderUpdateRequest, TeamKeys,
};
use crate::domain::ports::VaultApi;
use crate::utils::error::{OpsError, Result};

/// Wraps a shared folder key for a team: AES first, then EC, then RSA.
pub fn wrap_shared_folder_key(
    shared_folder_key: &[u8],
    team_keys: &TeamKeys,
    forbid_rsa: bool,
) -> Result<EncryptedKey> {
    if let Some(aes) = team_keys.aes.as_deref() {
        return Ok(EncryptedKey {
            encrypted_key: crypto::encrypt_aes_v2(shared_folder_key, aes)?,
            encrypted_key_type: EncryptedKeyType::EncryptedByDataKeyGcm,
        });
    }
    if let Some(ec) = team_keys.ec.as_deref() {
        return Ok(EncryptedKey {
            encrypted_key: crypto::encrypt_ec(shared_folder_key, ec)?,
            encrypted_key_type: EncryptedKeyType::EncryptedByPublicKeyEcc,
        });
    }
    if let Some(rsa) = team_keys.rsa.as_deref().filter(|_| !forbid_rsa) {
        return Ok(EncryptedKey {
            encrypted_key: crypto::encrypt_rsa(shared_folder_key, rsa)?,
            encrypted_key_type: EncryptedKeyType::EncryptedByPublicKey,
        });
    }
    Err(OpsError::vault(
        "team_public_key_missing",
        "Team public key is not available",
    ))
}

pub async fn add_team_to_shared_folder<V: VaultApi>(
    session: &VaultSession<V>,
    shared_folder_uid: &str,
    team_uid: &str,
    permissions: PermissionUpdate,
    forbid_rsa: bool,
) -> Result<()> {
    let team_keys = session
        .api()
        .load_team_keys(team_uid)
        .await?
        .ok_or_else(|| OpsError::vault("team_key_not_found", format!("Team key not found: {}", team_uid)))?;

    let shared_folder_key = {
        let cache = session.cache().await;
        let shared_folder = cache.shared_folder(shared_folder_uid).ok_or_else(|| {
            OpsError::vault(
                "sf_not_found",
                format!("Shared folder not found: {}", shared_folder_uid),
            )
        })?;
        shared_folder.shared_folder_key.clone().ok_or_else(|| {
            OpsError::vault(
                "sf_key_not_found",
                format!("Shared folder key not found: {}", shared_folder_uid),
            )
        })?
    };

    let request = SharedFolderUpdateRequest {
        shared_folder_uid: shared_folder_uid.to_string(),
        force_update: true,
        shared_folder_add_team: vec![SharedFolderTeamUpdate {
            team_uid: team_uid.to_string(),
            manage_records: permissions.manage_records,
            manage_users: permissions.manage_users,
            can_edit: permissions.can_edit,
            can_share: permissions.can_share,
            typed_shared_folder_key: wrap_shared_folder_key(
                &shared_folder_key,
                &team_keys,
                forbid_rsa,
            )?,
        }],
    };

    session.api().update_shared_folder(&request).await?;
    tracing::debug!("Team {} added to shared folder {}", team_uid, shared_folder_uid);
    Ok(())
}
