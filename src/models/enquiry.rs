use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::{CreateEnquiryDto, UpdateEnquiryDto};

/// A message submitted through the enquiry form
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::enquiries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Enquiry {
    id: String,
    name: String,
    email: String,
    phone: String,
    message: String,
    /// Kind of event the visitor is asking about, e.g. "Wedding"
    event_type: String,
    created_at: NaiveDateTime,
}

impl Enquiry {
    pub fn new(dto: CreateEnquiryDto) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            message: dto.message,
            event_type: dto.event_type,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn new_with_fields(id: String, dto: CreateEnquiryDto, created_at: DateTime<Utc>) -> Self {
        let mut enquiry = Self::new(dto);
        enquiry.id = id;
        enquiry.created_at = created_at.naive_utc();
        enquiry
    }

    /// Applies every `Some` field of the update to this enquiry
    pub fn apply_update(&mut self, update: UpdateEnquiryDto) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(event_type) = update.event_type {
            self.event_type = event_type;
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_phone(&self) -> String {
        self.phone.clone()
    }

    pub fn get_message(&self) -> String {
        self.message.clone()
    }

    pub fn get_event_type(&self) -> String {
        self.event_type.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
