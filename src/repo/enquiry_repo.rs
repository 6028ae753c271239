use anyhow::{anyhow, Result};
use async_trait::async_trait;
use diesel::prelude::*;
use tracing::{info, instrument};

use super::{EnquiryRepository, SqliteRepo};
use crate::db::DbPool;
use crate::dto::{CreateEnquiryDto, UpdateEnquiryDto};
use crate::models::Enquiry;
use crate::schema::enquiries;

/// Stores an enquiry submitted through the contact form
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database insert operation fails
#[instrument(skip(pool, dto), fields(event_type = %dto.event_type))]
pub fn submit_enquiry(pool: &DbPool, dto: CreateEnquiryDto) -> Result<Enquiry> {
    let conn = &mut pool.get()?;

    let new_enquiry = Enquiry::new(dto);

    diesel::insert_into(enquiries::table)
        .values(&new_enquiry)
        .execute(conn)?;

    info!("Stored enquiry {}", new_enquiry.get_id());
    Ok(new_enquiry)
}

#[instrument(skip(pool))]
pub fn get_enquiry(pool: &DbPool, enquiry_id: &str) -> Result<Option<Enquiry>> {
    let conn = &mut pool.get()?;

    let result = enquiries::table
        .find(enquiry_id)
        .first::<Enquiry>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all enquiries, newest first
#[instrument(skip(pool))]
pub fn list_enquiries(pool: &DbPool) -> Result<Vec<Enquiry>> {
    let conn = &mut pool.get()?;

    let result = enquiries::table
        .order(enquiries::created_at.desc())
        .load::<Enquiry>(conn)?;

    Ok(result)
}

/// Applies a partial update to an enquiry
///
/// ### Returns
///
/// The updated enquiry, or `None` if no enquiry has this id
#[instrument(skip(pool, dto))]
pub fn update_enquiry(pool: &DbPool, enquiry_id: &str, dto: UpdateEnquiryDto) -> Result<Option<Enquiry>> {
    if dto.is_empty() {
        return Err(anyhow!("No fields to update"));
    }

    let conn = &mut pool.get()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let Some(mut enquiry) = enquiries::table.find(enquiry_id).first::<Enquiry>(conn).optional()? else {
            return Ok(None);
        };
        enquiry.apply_update(dto);

        diesel::update(enquiries::table.find(enquiry_id))
            .set(&enquiry)
            .execute(conn)?;

        Ok(Some(enquiry))
    })
}

#[instrument(skip(pool))]
pub fn delete_enquiry(pool: &DbPool, enquiry_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let removed = diesel::delete(enquiries::table.find(enquiry_id)).execute(conn)?;
    Ok(removed > 0)
}

#[async_trait]
impl EnquiryRepository for SqliteRepo {
    async fn list(&self) -> Result<Vec<Enquiry>> {
        list_enquiries(&self.pool)
    }

    async fn submit(&self, dto: CreateEnquiryDto) -> Result<Enquiry> {
        submit_enquiry(&self.pool, dto)
    }

    async fn get(&self, id: &str) -> Result<Option<Enquiry>> {
        get_enquiry(&self.pool, id)
    }

    async fn update(&self, id: &str, dto: UpdateEnquiryDto) -> Result<Option<Enquiry>> {
        update_enquiry(&self.pool, id, dto)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        delete_enquiry(&self.pool, id)
    }
}
