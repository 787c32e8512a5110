/// Vendor profile and vendor service models
///
/// A vendor profile extends a `VENDOR` user (one profile per user). Each
/// profile lists the services it offers.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE service_type AS ENUM ('CATERING', 'DECOR', 'PHOTOGRAPHY', 'MUSIC', 'VENUE', 'OTHER');
///
/// CREATE TABLE "VendorProfile" (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES "User"(id) ON DELETE CASCADE,
///     display_name VARCHAR(255) NOT NULL,
///     city VARCHAR(255) NOT NULL
/// );
///
/// CREATE TABLE "VendorService" (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     type service_type NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     price_from BIGINT NOT NULL DEFAULT 0,
///     vendor_id UUID NOT NULL REFERENCES "VendorProfile"(id) ON DELETE CASCADE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Category of a vendor service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Catering,
    Decor,
    Photography,
    Music,
    Venue,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVendorProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorService {
    pub id: Uuid,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: ServiceType,

    pub title: String,
    pub price_from: i64,
    pub vendor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVendorService {
    pub service_type: ServiceType,
    pub title: String,
    pub price_from: i64,
    pub vendor_id: Uuid,
}

impl VendorProfile {
    /// Inserts a vendor profile
    ///
    /// # Errors
    ///
    /// Fails if the user already has a profile or does not exist.
    pub async fn create<'e, E>(executor: E, data: CreateVendorProfile) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, VendorProfile>(
            r#"
            INSERT INTO "VendorProfile" (user_id, display_name, city)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, display_name, city
            "#,
        )
        .bind(data.user_id)
        .bind(data.display_name)
        .bind(data.city)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_user<'e, E>(executor: E, user_id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, VendorProfile>(
            r#"
            SELECT id, user_id, display_name, city
            FROM "VendorProfile"
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}

impl VendorService {
    pub async fn create<'e, E>(executor: E, data: CreateVendorService) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, VendorService>(
            r#"
            INSERT INTO "VendorService" (type, title, price_from, vendor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, type, title, price_from, vendor_id
            "#,
        )
        .bind(data.service_type)
        .bind(data.title)
        .bind(data.price_from)
        .bind(data.vendor_id)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_service_serializes_type_field() {
        let service = VendorService {
            id: Uuid::new_v4(),
            service_type: ServiceType::Catering,
            title: "Full Catering Service".to_string(),
            price_from: 15_000_000,
            vendor_id: Uuid::new_v4(),
        };

        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["type"], "CATERING");
        assert_eq!(json["priceFrom"], 15_000_000);
    }
}
