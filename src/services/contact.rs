//! Contact service

use std::sync::Arc;

use super::ServiceError;
use crate::db::repositories::ContactMessageRepository;
use crate::models::{ContactMessage, NewContactMessage};

pub struct ContactService {
    repo: Arc<dyn ContactMessageRepository>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactMessageRepository>) -> Self {
        Self { repo }
    }

    /// Store a message from the contact form. A blank phone is stored as null.
    pub async fn create_contact_message(
        &self,
        mut message: NewContactMessage,
    ) -> Result<ContactMessage, ServiceError> {
        message.phone = message.phone.filter(|p| !p.trim().is_empty());

        let saved = self
            .repo
            .create(&message)
            .await?
            .ok_or_else(|| ServiceError::Missing("Falha ao enviar mensagem".to_string()))?;

        tracing::info!(message_id = %saved.id, "Contact message received");
        Ok(saved)
    }
}
