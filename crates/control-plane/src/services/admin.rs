// Admin service: validated account management
// Decision: All field errors are reported together rather than first-failure
// Decision: Deleting an admin removes its events first

use stagehand_core::{
    Admin, AdminDirectory, AdminPatch, EventStore, FieldError, NewAdmin, Result, StagehandError,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminService {
    admins: Arc<dyn AdminDirectory>,
    events: Arc<dyn EventStore>,
}

impl AdminService {
    pub fn new(admins: Arc<dyn AdminDirectory>, events: Arc<dyn EventStore>) -> Self {
        Self { admins, events }
    }

    pub async fn create(&self, input: NewAdmin) -> Result<Admin> {
        let mut errors = Vec::new();
        if input.id.trim().is_empty() {
            errors.push(FieldError::new("id", "is required"));
        }
        check_display_name(&input.display_name, &mut errors);
        check_email(&input.email, &mut errors);
        check_api_key(&input.ot_api_key, &mut errors);
        check_secret(&input.ot_secret, &mut errors);
        if !errors.is_empty() {
            return Err(StagehandError::Validation(errors));
        }

        let admin = self.admins.create_admin(input).await?;
        tracing::info!(admin_id = %admin.id, "Admin created");
        Ok(admin)
    }

    pub async fn get(&self, id: &str) -> Result<Admin> {
        self.admins
            .get_admin(id)
            .await?
            .ok_or_else(|| StagehandError::admin_not_found(id))
    }

    pub async fn update(&self, id: &str, patch: AdminPatch) -> Result<Admin> {
        let mut errors = Vec::new();
        if let Some(display_name) = &patch.display_name {
            check_display_name(display_name, &mut errors);
        }
        if let Some(email) = &patch.email {
            check_email(email, &mut errors);
        }
        if let Some(api_key) = &patch.ot_api_key {
            check_api_key(api_key, &mut errors);
        }
        if let Some(secret) = &patch.ot_secret {
            check_secret(secret, &mut errors);
        }
        if !errors.is_empty() {
            return Err(StagehandError::Validation(errors));
        }

        let admin = self
            .admins
            .update_admin(id, patch)
            .await?
            .ok_or_else(|| StagehandError::admin_not_found(id))?;
        tracing::info!(admin_id = %id, "Admin updated");
        Ok(admin)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;
        self.events.remove_all_by_admin(id).await?;
        self.admins.delete_admin(id).await?;
        tracing::info!(admin_id = %id, "Admin deleted");
        Ok(())
    }
}

fn check_display_name(value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new("displayName", "is required"));
    }
}

fn check_email(value: &str, errors: &mut Vec<FieldError>) {
    if !value.contains('@') {
        errors.push(FieldError::new("email", "must be an email address"));
    }
}

fn check_api_key(value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new("otApiKey", "is required"));
    } else if !value.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("otApiKey", "must be numeric"));
    }
}

fn check_secret(value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new("otSecret", "is required"));
    }
}
