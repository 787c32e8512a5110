/// Demo dataset
///
/// Pure data describing what the seeder creates. Rows refer to each other by
/// logical key (user email), never by id; ids only exist once the seeder has
/// inserted the rows and recorded them in the
/// [`IdentityMap`](crate::identity::IdentityMap).
///
/// [`Fixtures::validate`] checks the cross-references up front so a broken
/// dataset fails before anything touches the database.

use chrono::{DateTime, Duration, Utc};
use plannex_shared::models::event::EventStatus;
use plannex_shared::models::user::UserRole;
use plannex_shared::models::vendor::ServiceType;
use std::collections::HashSet;

/// Plaintext password shared by every demo user
pub const DEMO_PASSWORD: &str = "123456";

/// Error type for fixture validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    #[error("Invalid timestamp {value}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Duplicate user email: {0}")]
    DuplicateEmail(String),

    #[error("{field} references unknown user {email}")]
    UnknownUser { field: &'static str, email: String },

    #[error("User {email} has role {role}, which cannot own an organization")]
    OwnerRoleNotAllowed { email: String, role: UserRole },

    #[error("Event must start before it ends")]
    InvalidSchedule,

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFixture {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationFixture {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueFixture {
    pub name: String,
    pub city: String,
    pub address: String,
    pub capacity: i32,
    pub price_from: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFixture {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: EventStatus,
    pub capacity: i32,
    pub created_by_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTypeFixture {
    pub name: String,
    pub price: i64,
    pub quantity_total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorServiceFixture {
    pub service_type: ServiceType,
    pub title: String,
    pub price_from: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorFixture {
    pub user_email: String,
    pub display_name: String,
    pub city: String,
    pub services: Vec<VendorServiceFixture>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolunteerFixture {
    pub user_email: String,
    pub city: String,
    pub skills: Vec<String>,
}

/// A task due `due_in` after the run starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFixture {
    pub title: String,
    pub due_in: Duration,
}

/// The complete dataset for one seeding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    pub password: String,
    pub users: Vec<UserFixture>,
    pub organization: OrganizationFixture,
    pub venue: VenueFixture,
    pub event: EventFixture,
    pub ticket_types: Vec<TicketTypeFixture>,
    pub vendor: VendorFixture,
    pub volunteer: VolunteerFixture,
    pub tasks: Vec<TaskFixture>,
}

fn timestamp(value: &str) -> Result<DateTime<Utc>, FixtureError> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| FixtureError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn user(email: &str, full_name: &str, role: UserRole) -> UserFixture {
    UserFixture {
        email: email.to_string(),
        full_name: full_name.to_string(),
        role,
    }
}

impl Fixtures {
    /// The Plannex demo dataset
    pub fn demo() -> Result<Self, FixtureError> {
        Ok(Self {
            password: DEMO_PASSWORD.to_string(),
            users: vec![
                user("admin@planner.ai", "System Admin", UserRole::Admin),
                user("organizer@planner.ai", "Event Organizer", UserRole::OrgOwner),
                user("vendor@planner.ai", "Catering Vendor", UserRole::Vendor),
                user("volunteer@planner.ai", "Volunteer User", UserRole::Volunteer),
            ],
            organization: OrganizationFixture {
                name: "Plannex Agency".to_string(),
                slug: "planner-ai-agency".to_string(),
                description: Some("Professional event management agency".to_string()),
                owner_email: "organizer@planner.ai".to_string(),
            },
            venue: VenueFixture {
                name: "Tashkent City Hall".to_string(),
                city: "Tashkent".to_string(),
                address: "Amir Temur Avenue 1".to_string(),
                capacity: 500,
                price_from: 10_000_000,
            },
            event: EventFixture {
                title: "Marketing Forum 2026".to_string(),
                description: Some("Annual marketing conference in Tashkent".to_string()),
                starts_at: timestamp("2026-05-20T10:00:00Z")?,
                ends_at: timestamp("2026-05-20T18:00:00Z")?,
                status: EventStatus::Published,
                capacity: 300,
                created_by_email: "organizer@planner.ai".to_string(),
            },
            ticket_types: vec![
                TicketTypeFixture {
                    name: "Standard".to_string(),
                    price: 200_000,
                    quantity_total: 200,
                },
                TicketTypeFixture {
                    name: "VIP".to_string(),
                    price: 500_000,
                    quantity_total: 50,
                },
            ],
            vendor: VendorFixture {
                user_email: "vendor@planner.ai".to_string(),
                display_name: "Premium Catering".to_string(),
                city: "Tashkent".to_string(),
                services: vec![VendorServiceFixture {
                    service_type: ServiceType::Catering,
                    title: "Full Catering Service".to_string(),
                    price_from: 15_000_000,
                }],
            },
            volunteer: VolunteerFixture {
                user_email: "volunteer@planner.ai".to_string(),
                city: "Tashkent".to_string(),
                skills: vec!["registration".to_string(), "guest support".to_string()],
            },
            tasks: vec![
                TaskFixture {
                    title: "Sign catering contract".to_string(),
                    due_in: Duration::days(7),
                },
                TaskFixture {
                    title: "Book sound equipment".to_string(),
                    due_in: Duration::days(7),
                },
            ],
        })
    }

    pub fn find_user(&self, email: &str) -> Option<&UserFixture> {
        self.users.iter().find(|u| u.email == email)
    }

    fn require_user(&self, field: &'static str, email: &str) -> Result<&UserFixture, FixtureError> {
        self.find_user(email).ok_or_else(|| FixtureError::UnknownUser {
            field,
            email: email.to_string(),
        })
    }

    /// Checks that the dataset is internally consistent
    ///
    /// # Errors
    ///
    /// Returns the first problem found; see [`FixtureError`].
    pub fn validate(&self) -> Result<(), FixtureError> {
        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.email.to_lowercase()) {
                return Err(FixtureError::DuplicateEmail(user.email.clone()));
            }
        }

        let owner = self.require_user("organization.owner", &self.organization.owner_email)?;
        if !owner.role.can_own_organization() {
            return Err(FixtureError::OwnerRoleNotAllowed {
                email: owner.email.clone(),
                role: owner.role,
            });
        }
        self.require_user("event.created_by", &self.event.created_by_email)?;
        self.require_user("vendor.user", &self.vendor.user_email)?;
        self.require_user("volunteer.user", &self.volunteer.user_email)?;

        if self.venue.capacity <= 0 {
            return Err(FixtureError::NotPositive("venue.capacity"));
        }
        if self.venue.price_from < 0 {
            return Err(FixtureError::Negative("venue.price_from"));
        }

        if self.event.starts_at >= self.event.ends_at {
            return Err(FixtureError::InvalidSchedule);
        }
        if self.event.capacity <= 0 {
            return Err(FixtureError::NotPositive("event.capacity"));
        }

        for ticket in &self.ticket_types {
            if ticket.price < 0 {
                return Err(FixtureError::Negative("ticket_type.price"));
            }
            if ticket.quantity_total < 0 {
                return Err(FixtureError::Negative("ticket_type.quantity_total"));
            }
        }

        if self.vendor.services.iter().any(|s| s.price_from < 0) {
            return Err(FixtureError::Negative("vendor_service.price_from"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> Fixtures {
        Fixtures::demo().unwrap()
    }

    #[test]
    fn test_demo_is_valid() {
        let fixtures = demo();
        assert_eq!(fixtures.validate(), Ok(()));
        assert_eq!(fixtures.users.len(), 4);
        assert_eq!(fixtures.ticket_types.len(), 2);
        assert_eq!(fixtures.tasks.len(), 2);
        assert_eq!(fixtures.password, DEMO_PASSWORD);
    }

    #[test]
    fn test_demo_event_schedule() {
        let event = demo().event;
        assert_eq!(event.starts_at.to_rfc3339(), "2026-05-20T10:00:00+00:00");
        assert_eq!(event.ends_at - event.starts_at, Duration::hours(8));
    }

    #[test]
    fn test_duplicate_email_is_case_insensitive() {
        let mut fixtures = demo();
        fixtures.users.push(user("Admin@Planner.ai", "Copy", UserRole::Admin));

        assert_eq!(
            fixtures.validate(),
            Err(FixtureError::DuplicateEmail("Admin@Planner.ai".to_string()))
        );
    }

    #[test]
    fn test_unknown_references() {
        let mut fixtures = demo();
        fixtures.vendor.user_email = "ghost@planner.ai".to_string();

        assert_eq!(
            fixtures.validate(),
            Err(FixtureError::UnknownUser {
                field: "vendor.user",
                email: "ghost@planner.ai".to_string(),
            })
        );
    }

    #[test]
    fn test_owner_must_be_able_to_own() {
        let mut fixtures = demo();
        fixtures.organization.owner_email = "volunteer@planner.ai".to_string();

        assert!(matches!(
            fixtures.validate(),
            Err(FixtureError::OwnerRoleNotAllowed {
                role: UserRole::Volunteer,
                ..
            })
        ));
    }

    #[test]
    fn test_numeric_and_schedule_checks() {
        let mut fixtures = demo();
        fixtures.event.ends_at = fixtures.event.starts_at;
        assert_eq!(fixtures.validate(), Err(FixtureError::InvalidSchedule));

        let mut fixtures = demo();
        fixtures.venue.capacity = 0;
        assert_eq!(
            fixtures.validate(),
            Err(FixtureError::NotPositive("venue.capacity"))
        );

        let mut fixtures = demo();
        fixtures.ticket_types[1].price = -1;
        assert_eq!(
            fixtures.validate(),
            Err(FixtureError::Negative("ticket_type.price"))
        );

        let mut fixtures = demo();
        fixtures.ticket_types[0].quantity_total = 0;
        assert_eq!(fixtures.validate(), Ok(()));
    }
}
