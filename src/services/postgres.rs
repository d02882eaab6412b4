use crate::models::{
    Address, Availability, Event, EventStatus, EventType, Frequency, Invitation, InvitationStatus,
    Preference, TimeSlot, Volunteer,
};
use crate::services::store::{InvitationTransition, MatchStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

const VOLUNTEER_SELECT: &str = r#"
    SELECT
        v.id, v.name, v.email, v.street, v.city, v.state, v.zip,
        v.profile_visible, v.skills,
        a.volunteer_id AS availability_id, a.available_days, a.time_slots,
        a.blackout_dates, a.minimum_notice_days,
        p.volunteer_id AS preference_id, p.causes, p.max_travel_miles,
        p.frequency, p.remote_opportunities
    FROM volunteers v
    LEFT JOIN volunteer_availability a ON a.volunteer_id = v.id
    LEFT JOIN volunteer_preferences p ON p.volunteer_id = v.id
"#;

const EVENT_SELECT: &str = r#"
    SELECT
        id, name, street, city, state, zip, is_virtual,
        start_date, end_date, start_time, end_time,
        required_skills, causes, max_volunteers, current_volunteers,
        event_type, status
    FROM events
"#;

const INVITATION_SELECT: &str = r#"
    SELECT id, event_id, volunteer_id, message, status, created_at, responded_at
    FROM event_invitations
"#;

/// PostgreSQL-backed match store
///
/// Volunteers are read with their availability and preference rows joined;
/// invitation acceptance runs in one transaction with a guarded capacity
/// update.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect, run migrations and return the store
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::from_pool(pool))
    }

    /// Create a store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool; migrations are the caller's concern
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl MatchStore for PostgresStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        let query = format!("{} WHERE id = $1", EVENT_SELECT);
        let row = sqlx::query(&query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn get_volunteer(&self, volunteer_id: &str) -> Result<Option<Volunteer>, StoreError> {
        let query = format!("{} WHERE v.id = $1", VOLUNTEER_SELECT);
        let row = sqlx::query(&query)
            .bind(volunteer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(volunteer_from_row).transpose()
    }

    async fn list_volunteers(&self) -> Result<Vec<Volunteer>, StoreError> {
        let query = format!("{} ORDER BY v.id", VOLUNTEER_SELECT);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(volunteer_from_row).collect()
    }

    async fn list_open_events(&self) -> Result<Vec<Event>, StoreError> {
        let query = format!(
            "{} WHERE status = 'Active' \
             AND (max_volunteers IS NULL OR current_volunteers < max_volunteers) \
             ORDER BY start_date, id",
            EVENT_SELECT
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(event_from_row).collect()
    }

    async fn excluded_volunteer_ids(&self, event_id: &str) -> Result<HashSet<String>, StoreError> {
        let query = r#"
            SELECT volunteer_id FROM event_registrations WHERE event_id = $1
            UNION
            SELECT volunteer_id FROM event_invitations WHERE event_id = $1
        "#;

        let rows = sqlx::query(query).bind(event_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("volunteer_id")).collect())
    }

    async fn excluded_event_ids(&self, volunteer_id: &str) -> Result<HashSet<String>, StoreError> {
        let query = r#"
            SELECT event_id FROM event_registrations WHERE volunteer_id = $1
            UNION
            SELECT event_id FROM event_invitations WHERE volunteer_id = $1
        "#;

        let rows = sqlx::query(query).bind(volunteer_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("event_id")).collect())
    }

    async fn get_invitation(&self, invitation_id: &str) -> Result<Option<Invitation>, StoreError> {
        let query = format!("{} WHERE id = $1", INVITATION_SELECT);
        let row = sqlx::query(&query)
            .bind(invitation_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(invitation_from_row).transpose()
    }

    async fn find_invitation(
        &self,
        event_id: &str,
        volunteer_id: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        let query = format!("{} WHERE event_id = $1 AND volunteer_id = $2", INVITATION_SELECT);
        let row = sqlx::query(&query)
            .bind(event_id)
            .bind(volunteer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(invitation_from_row).transpose()
    }

    /// Uses ON CONFLICT DO NOTHING so a racing duplicate reports `false`
    async fn insert_invitation(&self, invitation: &Invitation) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO event_invitations
                (id, event_id, volunteer_id, message, status, created_at, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&invitation.id)
            .bind(&invitation.event_id)
            .bind(&invitation.volunteer_id)
            .bind(&invitation.message)
            .bind(invitation.status.as_str())
            .bind(invitation.created_at)
            .bind(invitation.responded_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn respond_invitation(
        &self,
        invitation_id: &str,
        accept: bool,
        responded_at: DateTime<Utc>,
    ) -> Result<InvitationTransition, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = format!("{} WHERE id = $1 FOR UPDATE", INVITATION_SELECT);
        let row = sqlx::query(&query)
            .bind(invitation_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(InvitationTransition::NotFound);
        };
        let mut invitation = invitation_from_row(&row)?;

        if invitation.status != InvitationStatus::Pending {
            return Ok(InvitationTransition::AlreadyResponded(invitation.status));
        }

        let status = if accept {
            let registered = sqlx::query(
                r#"
                INSERT INTO event_registrations (event_id, volunteer_id, registered_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (event_id, volunteer_id) DO NOTHING
                "#,
            )
            .bind(&invitation.event_id)
            .bind(&invitation.volunteer_id)
            .bind(responded_at)
            .execute(&mut *tx)
            .await?;

            // Only a new registration takes a seat
            if registered.rows_affected() == 1 {
                let claimed = sqlx::query(
                    r#"
                    UPDATE events
                    SET current_volunteers = current_volunteers + 1
                    WHERE id = $1
                      AND (max_volunteers IS NULL OR current_volunteers < max_volunteers)
                    "#,
                )
                .bind(&invitation.event_id)
                .execute(&mut *tx)
                .await?;

                if claimed.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Ok(InvitationTransition::EventFull);
                }
            }

            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };

        sqlx::query("UPDATE event_invitations SET status = $2, responded_at = $3 WHERE id = $1")
            .bind(invitation_id)
            .bind(status.as_str())
            .bind(responded_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Invitation {} for event {} marked {}",
            invitation_id,
            invitation.event_id,
            status
        );

        invitation.status = status;
        invitation.responded_at = Some(responded_at);
        Ok(InvitationTransition::Updated(invitation))
    }
}

fn parse_column<T>(value: &str, column: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", column, e)))
}

fn non_negative(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{}: negative value {}", column, value)))
}

fn address_from_row(row: &PgRow) -> Result<Address, StoreError> {
    Ok(Address {
        street: row.try_get("street")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip: row.try_get("zip")?,
    })
}

/// Unknown day or slot names are skipped rather than failing the whole
/// candidate set
fn parse_lenient<T: FromStr>(values: Vec<String>, column: &str, owner: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!("Ignoring unknown {} value {:?} for volunteer {}", column, value, owner);
                None
            }
        })
        .collect()
}

fn volunteer_from_row(row: &PgRow) -> Result<Volunteer, StoreError> {
    let id: String = row.try_get("id")?;

    let availability_id: Option<String> = row.try_get("availability_id")?;
    let availability = match availability_id {
        Some(_) => {
            let days: Vec<String> = row.try_get("available_days")?;
            let slots: Vec<String> = row.try_get("time_slots")?;
            let blackout_dates: Vec<NaiveDate> = row.try_get("blackout_dates")?;
            let notice: i32 = row.try_get("minimum_notice_days")?;

            Some(Availability {
                available_days: parse_lenient::<Weekday>(days, "available_days", &id),
                time_slots: parse_lenient::<TimeSlot>(slots, "time_slots", &id),
                blackout_dates,
                minimum_notice_days: non_negative(notice, "minimum_notice_days")?,
            })
        }
        None => None,
    };

    let preference_id: Option<String> = row.try_get("preference_id")?;
    let preference = match preference_id {
        Some(_) => {
            let frequency: Option<String> = row.try_get("frequency")?;
            Some(Preference {
                causes: row.try_get("causes")?,
                max_travel_miles: row.try_get("max_travel_miles")?,
                frequency: frequency
                    .as_deref()
                    .map(|f| parse_column::<Frequency>(f, "frequency"))
                    .transpose()?,
                remote_opportunities: row.try_get("remote_opportunities")?,
            })
        }
        None => None,
    };

    Ok(Volunteer {
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        skills: row.try_get("skills")?,
        address: address_from_row(row)?,
        availability,
        preference,
        profile_visible: row.try_get("profile_visible")?,
        id,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let max_volunteers: Option<i32> = row.try_get("max_volunteers")?;
    let current_volunteers: i32 = row.try_get("current_volunteers")?;
    let event_type: String = row.try_get("event_type")?;
    let status: String = row.try_get("status")?;

    Ok(Event {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        required_skills: row.try_get("required_skills")?,
        address: address_from_row(row)?,
        is_virtual: row.try_get("is_virtual")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        causes: row.try_get("causes")?,
        max_volunteers: max_volunteers
            .map(|max| non_negative(max, "max_volunteers"))
            .transpose()?,
        current_volunteers: non_negative(current_volunteers, "current_volunteers")?,
        event_type: parse_column::<EventType>(&event_type, "event_type")?,
        status: parse_column::<EventStatus>(&status, "status")?,
    })
}

fn invitation_from_row(row: &PgRow) -> Result<Invitation, StoreError> {
    let status: String = row.try_get("status")?;

    Ok(Invitation {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        volunteer_id: row.try_get("volunteer_id")?,
        message: row.try_get("message")?,
        status: parse_column::<InvitationStatus>(&status, "status")?,
        created_at: row.try_get("created_at")?,
        responded_at: row.try_get("responded_at")?,
    })
}
