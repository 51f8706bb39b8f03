//! Ticket detail model.
//!
//! Free-form labeled value slots attached to a ticket, capped at 16 per
//! ticket. The cap matches the sibling detail table the UI renders.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum number of labeled detail slots per ticket.
pub const MAX_DETAIL_SLOTS: usize = 16;

/// One labeled key/value slot of a ticket's detail payload.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TicketDetail {
    /// The ticket this slot belongs to.
    pub ticket_id: Uuid,

    /// Slot index, 1..=16.
    pub slot: i16,

    /// Field label as rendered by the form.
    pub label: String,

    /// Submitted value.
    pub value: String,
}

/// Input for one detail slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketDetail {
    pub label: String,
    pub value: String,
}

impl TicketDetail {
    /// Find all detail slots for a ticket, in slot order.
    pub async fn find_by_ticket(
        executor: impl sqlx::PgExecutor<'_>,
        ticket_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM ticket_details
            WHERE ticket_id = $1
            ORDER BY slot ASC
            ",
        )
        .bind(ticket_id)
        .fetch_all(executor)
        .await
    }

    /// Insert detail slots for a ticket, assigning slot indices in input
    /// order. Callers enforce the [`MAX_DETAIL_SLOTS`] cap before calling.
    pub async fn create_batch(
        conn: &mut sqlx::PgConnection,
        ticket_id: Uuid,
        details: &[CreateTicketDetail],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut created = Vec::with_capacity(details.len());
        for (index, detail) in details.iter().enumerate() {
            let slot = i16::try_from(index + 1).unwrap_or(i16::MAX);
            let row: Self = sqlx::query_as(
                r"
                INSERT INTO ticket_details (ticket_id, slot, label, value)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                ",
            )
            .bind(ticket_id)
            .bind(slot)
            .bind(&detail.label)
            .bind(&detail.value)
            .fetch_one(&mut *conn)
            .await?;
            created.push(row);
        }
        Ok(created)
    }
}
