// Storage-backed AdminDirectory implementation
//
// The video-platform secret is sealed with the EncryptionService before it
// reaches the backend and opened again on read. Without a service the secret
// is stored as raw UTF-8; rows sealed earlier then fail to open rather than
// leaking ciphertext as a credential.

use async_trait::async_trait;
use stagehand_core::{
    traits::AdminDirectory, Admin, AdminPatch, NewAdmin, Result, StagehandError,
};

use crate::backend::StorageBackend;
use crate::encryption::{is_sealed, EncryptionService};
use crate::models::{AdminRow, CreateAdminRow, UpdateAdminRow};

fn store_err(e: anyhow::Error) -> StagehandError {
    StagehandError::store(format!("{:#}", e))
}

#[derive(Clone)]
pub struct DbAdminDirectory {
    backend: StorageBackend,
    encryption: Option<EncryptionService>,
}

impl DbAdminDirectory {
    pub fn new(backend: StorageBackend, encryption: Option<EncryptionService>) -> Self {
        Self {
            backend,
            encryption,
        }
    }

    fn seal(&self, secret: &str) -> Result<Vec<u8>> {
        match &self.encryption {
            Some(service) => service.seal(secret).map_err(store_err),
            None => Ok(secret.as_bytes().to_vec()),
        }
    }

    fn open(&self, stored: &[u8]) -> Result<String> {
        match &self.encryption {
            Some(service) if is_sealed(stored) => service.open(stored).map_err(store_err),
            // Rows written before a key was configured are still plaintext
            Some(_) => plaintext(stored),
            None if is_sealed(stored) => Err(StagehandError::store(
                "admin secret is encrypted but no SECRETS_ENCRYPTION_KEY is configured",
            )),
            None => plaintext(stored),
        }
    }

    fn to_admin(&self, row: AdminRow) -> Result<Admin> {
        Ok(Admin {
            ot_secret: self.open(&row.ot_secret)?,
            id: row.id,
            display_name: row.display_name,
            email: row.email,
            ot_api_key: row.ot_api_key,
            http_support: row.http_support,
            super_admin: row.super_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn plaintext(stored: &[u8]) -> Result<String> {
    String::from_utf8(stored.to_vec())
        .map_err(|_| StagehandError::store("admin secret is not valid UTF-8"))
}

#[async_trait]
impl AdminDirectory for DbAdminDirectory {
    async fn get_admin(&self, id: &str) -> Result<Option<Admin>> {
        let row = self.backend.get_admin(id).await.map_err(store_err)?;
        row.map(|r| self.to_admin(r)).transpose()
    }

    async fn create_admin(&self, input: NewAdmin) -> Result<Admin> {
        let row = CreateAdminRow {
            ot_secret: self.seal(&input.ot_secret)?,
            id: input.id,
            display_name: input.display_name,
            email: input.email,
            ot_api_key: input.ot_api_key,
            http_support: input.http_support,
            super_admin: input.super_admin,
        };
        let row = self.backend.create_admin(row).await.map_err(store_err)?;
        self.to_admin(row)
    }

    async fn update_admin(&self, id: &str, patch: AdminPatch) -> Result<Option<Admin>> {
        let ot_secret = patch.ot_secret.as_deref().map(|s| self.seal(s)).transpose()?;
        let row = UpdateAdminRow {
            display_name: patch.display_name,
            email: patch.email,
            ot_api_key: patch.ot_api_key,
            ot_secret,
            http_support: patch.http_support,
        };
        let row = self.backend.update_admin(id, row).await.map_err(store_err)?;
        row.map(|r| self.to_admin(r)).transpose()
    }

    async fn delete_admin(&self, id: &str) -> Result<bool> {
        self.backend.delete_admin(id).await.map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::generate_encryption_key;

    fn new_admin(id: &str) -> NewAdmin {
        NewAdmin {
            id: id.to_string(),
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ot_api_key: "123456".to_string(),
            ot_secret: "project-secret".to_string(),
            http_support: true,
            super_admin: false,
        }
    }

    fn encryption() -> EncryptionService {
        EncryptionService::new(&generate_encryption_key("kek-v1"), &[]).unwrap()
    }

    #[tokio::test]
    async fn test_secret_is_sealed_at_rest() {
        let backend = StorageBackend::in_memory();
        let directory = DbAdminDirectory::new(backend.clone(), Some(encryption()));

        let admin = directory.create_admin(new_admin("a1")).await.unwrap();
        assert_eq!(admin.ot_secret, "project-secret");

        let row = backend.get_admin("a1").await.unwrap().unwrap();
        assert!(is_sealed(&row.ot_secret));

        let loaded = directory.get_admin("a1").await.unwrap().unwrap();
        assert_eq!(loaded.credentials().secret, "project-secret");
    }

    #[tokio::test]
    async fn test_plaintext_rows_stay_readable_after_enabling_encryption() {
        let backend = StorageBackend::in_memory();
        DbAdminDirectory::new(backend.clone(), None)
            .create_admin(new_admin("a1"))
            .await
            .unwrap();

        let directory = DbAdminDirectory::new(backend, Some(encryption()));
        let admin = directory.get_admin("a1").await.unwrap().unwrap();
        assert_eq!(admin.ot_secret, "project-secret");
    }

    #[tokio::test]
    async fn test_sealed_rows_without_key_fail() {
        let backend = StorageBackend::in_memory();
        DbAdminDirectory::new(backend.clone(), Some(encryption()))
            .create_admin(new_admin("a1"))
            .await
            .unwrap();

        let directory = DbAdminDirectory::new(backend, None);
        let err = directory.get_admin("a1").await.unwrap_err();
        assert!(matches!(err, StagehandError::Store(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let directory = DbAdminDirectory::new(StorageBackend::in_memory(), Some(encryption()));
        directory.create_admin(new_admin("a1")).await.unwrap();

        let updated = directory
            .update_admin(
                "a1",
                AdminPatch {
                    ot_secret: Some("rotated".to_string()),
                    http_support: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.ot_secret, "rotated");
        assert!(!updated.http_support);
        assert_eq!(updated.display_name, "Ada");

        assert!(directory
            .update_admin("missing", AdminPatch::default())
            .await
            .unwrap()
            .is_none());

        assert!(directory.delete_admin("a1").await.unwrap());
        assert!(!directory.delete_admin("a1").await.unwrap());
        assert!(directory.get_admin("a1").await.unwrap().is_none());
    }
}
