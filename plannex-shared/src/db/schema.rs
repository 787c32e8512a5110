/// Table registry and foreign-key graph
///
/// Every table in the Plannex schema is listed here together with the tables
/// it references. The destructive wipe used by the seeding tool does not keep
/// its own hand-written table list: it asks this module for the truncation
/// order, which is derived from the foreign-key graph by topological sort.
/// Adding a new dependent table therefore only requires declaring it (and its
/// parents) in [`Table`].
///
/// # Ordering
///
/// Tables are declared parent-first. The truncation order puts every child
/// before all of its parents; among tables that are free at the same time,
/// the most recently declared goes first. For the current schema this yields:
///
/// ```text
/// Review, Task, VendorService, VendorProfile, VolunteerProfile, Ticket,
/// TicketType, OrderItem, Order, Event, Venue, OrganizationMember,
/// Organization, User
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A table in the Plannex schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Table {
    User,
    Organization,
    OrganizationMember,
    Venue,
    Event,
    Order,
    OrderItem,
    TicketType,
    Ticket,
    VolunteerProfile,
    VendorProfile,
    VendorService,
    Task,
    Review,
}

impl Table {
    /// All tables in declaration (parent-first) order
    pub const ALL: [Table; 14] = [
        Table::User,
        Table::Organization,
        Table::OrganizationMember,
        Table::Venue,
        Table::Event,
        Table::Order,
        Table::OrderItem,
        Table::TicketType,
        Table::Ticket,
        Table::VolunteerProfile,
        Table::VendorProfile,
        Table::VendorService,
        Table::Task,
        Table::Review,
    ];

    /// Unquoted table name as it appears in the database
    pub fn name(&self) -> &'static str {
        match self {
            Table::User => "User",
            Table::Organization => "Organization",
            Table::OrganizationMember => "OrganizationMember",
            Table::Venue => "Venue",
            Table::Event => "Event",
            Table::Order => "Order",
            Table::OrderItem => "OrderItem",
            Table::TicketType => "TicketType",
            Table::Ticket => "Ticket",
            Table::VolunteerProfile => "VolunteerProfile",
            Table::VendorProfile => "VendorProfile",
            Table::VendorService => "VendorService",
            Table::Task => "Task",
            Table::Review => "Review",
        }
    }

    /// Table name quoted for use in SQL (`"User"`, `"Order"`, ...)
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.name())
    }

    /// Tables this table holds foreign keys to
    pub fn parents(&self) -> &'static [Table] {
        match self {
            Table::User => &[],
            Table::Organization => &[Table::User],
            Table::OrganizationMember => &[Table::Organization, Table::User],
            Table::Venue => &[],
            Table::Event => &[Table::Organization, Table::Venue, Table::User],
            Table::Order => &[Table::Event, Table::User],
            Table::OrderItem => &[Table::Order],
            Table::TicketType => &[Table::Event],
            Table::Ticket => &[Table::TicketType, Table::OrderItem],
            Table::VolunteerProfile => &[Table::User],
            Table::VendorProfile => &[Table::User],
            Table::VendorService => &[Table::VendorProfile],
            Table::Task => &[Table::Event],
            Table::Review => &[Table::Event, Table::User],
        }
    }

    fn position(&self) -> usize {
        Table::ALL
            .iter()
            .position(|t| t == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when the foreign-key graph cannot be ordered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The graph contains a cycle through the listed tables
    #[error("Foreign-key cycle between tables: {0:?}")]
    Cycle(Vec<Table>),
}

/// Orders `tables` so that every child precedes each of its parents
///
/// Only edges between tables in `tables` are considered. Ties are broken by
/// reverse declaration order, which makes the result deterministic.
///
/// # Errors
///
/// Returns [`SchemaError::Cycle`] if the selected tables reference each other
/// in a cycle.
pub fn truncation_order_for(tables: &[Table]) -> Result<Vec<Table>, SchemaError> {
    let mut remaining: Vec<Table> = tables.to_vec();
    remaining.sort_by_key(|t| std::cmp::Reverse(t.position()));
    remaining.dedup();

    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        // A table may go once no remaining table still references it
        let next = remaining.iter().position(|candidate| {
            !remaining
                .iter()
                .any(|other| other != candidate && other.parents().contains(candidate))
        });

        match next {
            Some(index) => ordered.push(remaining.remove(index)),
            None => return Err(SchemaError::Cycle(remaining)),
        }
    }

    Ok(ordered)
}

/// Truncation order for the whole schema
///
/// # Errors
///
/// Returns [`SchemaError::Cycle`] if the declared graph is cyclic.
pub fn truncation_order() -> Result<Vec<Table>, SchemaError> {
    truncation_order_for(&Table::ALL)
}

/// Builds the single `TRUNCATE` statement that wipes `tables`
///
/// Identity sequences are restarted and the truncation cascades along
/// foreign keys.
pub fn truncate_statement(tables: &[Table]) -> String {
    let list = tables
        .iter()
        .map(Table::quoted)
        .collect::<Vec<_>>()
        .join(", ");

    format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_order_matches_schema() {
        let order = truncation_order().unwrap();

        assert_eq!(
            order,
            vec![
                Table::Review,
                Table::Task,
                Table::VendorService,
                Table::VendorProfile,
                Table::VolunteerProfile,
                Table::Ticket,
                Table::TicketType,
                Table::OrderItem,
                Table::Order,
                Table::Event,
                Table::Venue,
                Table::OrganizationMember,
                Table::Organization,
                Table::User,
            ]
        );
    }

    #[test]
    fn test_children_precede_parents() {
        let order = truncation_order().unwrap();

        for (index, table) in order.iter().enumerate() {
            for parent in table.parents() {
                let parent_index = order.iter().position(|t| t == parent).unwrap();
                assert!(
                    parent_index > index,
                    "{} must be truncated before its parent {}",
                    table,
                    parent
                );
            }
        }
    }

    #[test]
    fn test_declaration_order_is_topological() {
        for (index, table) in Table::ALL.iter().enumerate() {
            for parent in table.parents() {
                assert!(parent.position() < index, "{} declared before {}", table, parent);
            }
        }
    }

    #[test]
    fn test_subset_ignores_missing_parents() {
        let order = truncation_order_for(&[Table::User, Table::Task, Table::Event]).unwrap();
        assert_eq!(order, vec![Table::Task, Table::Event, Table::User]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let order = truncation_order_for(&[Table::Venue, Table::Venue]).unwrap();
        assert_eq!(order, vec![Table::Venue]);
    }

    #[test]
    fn test_truncate_statement() {
        let sql = truncate_statement(&[Table::Order, Table::User]);
        assert_eq!(
            sql,
            r#"TRUNCATE TABLE "Order", "User" RESTART IDENTITY CASCADE"#
        );
    }
}
