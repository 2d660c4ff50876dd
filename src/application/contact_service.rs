use crate::domain::contact::{ContactForm, ContactMessage};
use crate::domain::repository::ContactRepository;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ContactService<R: ContactRepository> {
    contact_repository: Arc<R>,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(contact_repository: Arc<R>) -> Self {
        Self { contact_repository }
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn submit(&self, form: ContactForm) -> Result<ContactMessage> {
        let message = form.validate()?;
        let saved = self.contact_repository.insert_message(message).await?;
        info!(message_id = saved.id, "Contact message stored");
        Ok(saved)
    }
}
