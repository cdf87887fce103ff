use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::merge;
use crate::models::{AlumniRecord, Event, EventStatus, MentorRequest, RequestKind, RequestStatus};
use crate::notify::Notification;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn timestamp(y: i32, m: u32, d: u32, h: u32) -> anyhow::Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .context("invalid seed timestamp")
}

fn seed_alumnus(
    digital_id: &str,
    full_name: &str,
    email: &str,
    graduation_year: i32,
    department: &str,
    company: &str,
    role: &str,
    location: &str,
) -> AlumniRecord {
    AlumniRecord {
        id: digital_id.to_lowercase(),
        digital_id: digital_id.to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        graduation_year,
        department: department.to_string(),
        current_company: company.to_string(),
        current_role: role.to_string(),
        location: location.to_string(),
        phone: String::new(),
        linkedin: String::new(),
        status: "Active".to_string(),
    }
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let alumni = vec![
        seed_alumnus(
            "ALU2019CS001",
            "Priya Sharma",
            "priya.sharma@plenilune.edu",
            2019,
            "Computer Science",
            "Infosys",
            "Senior Engineer",
            "Bengaluru, Karnataka",
        ),
        seed_alumnus(
            "ALU2018EE004",
            "Rahul Verma",
            "rahul.verma@plenilune.edu",
            2018,
            "Electrical",
            "Siemens",
            "Project Lead",
            "Pune, Maharashtra",
        ),
        seed_alumnus(
            "ALU2020ME011",
            "Arjun Reddy",
            "arjun.reddy@plenilune.edu",
            2020,
            "Mechanical",
            "Tata Motors",
            "Design Engineer",
            "Chennai, Tamil Nadu",
        ),
    ];

    let existing = fetch_alumni(pool).await?;
    let (merged, stats) = merge::merge(existing, alumni);
    replace_alumni(pool, &merged).await?;
    info!(updated = stats.updated, appended = stats.appended, "seeded alumni");

    let events = vec![
        (
            Uuid::parse_str("6f1c2a9e-4b7d-4c55-9a3e-1d2f6b8c0a11")?,
            "Annual Tech Symposium",
            "Technology showcase and networking event",
            timestamp(2026, 3, 15, 9)?,
            timestamp(2026, 3, 15, 18)?,
            100_000_i64,
            45_000_i64,
            25,
        ),
        (
            Uuid::parse_str("0b7e5d3c-9a21-4f6e-8c4d-2e3f7a9b1c22")?,
            "Alumni Meet",
            "Annual alumni gathering and reunion",
            timestamp(2026, 4, 20, 10)?,
            timestamp(2026, 4, 20, 20)?,
            150_000,
            80_000,
            42,
        ),
        (
            Uuid::parse_str("a3d9f1b2-7c6e-4e8a-b5d4-3f2e1c0b9a33")?,
            "Tech Conference",
            "Completed technology conference",
            timestamp(2025, 10, 15, 9)?,
            timestamp(2025, 10, 15, 17)?,
            80_000,
            85_000,
            38,
        ),
    ];

    let now = chrono::Local::now().naive_local();
    for (id, title, description, start, end, goal, raised, donors) in events {
        let event = Event {
            id,
            title: title.to_string(),
            description: description.to_string(),
            start_time: start,
            end_time: Some(end),
            status: EventStatus::at(start, Some(end), now),
            funding_goal: goal,
            current_funding: raised,
            donors_count: donors,
        };
        insert_event(pool, &event).await?;
    }

    sqlx::query(
        r#"
        INSERT INTO plenilune.requests
        (id, requested_by, requested_to, kind, message, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(Uuid::parse_str("c4e8b2d6-1f3a-4b9c-8d7e-5a6b4c3d2e44")?)
    .bind("STU2025EE014")
    .bind("ALU2019CS001")
    .bind(RequestKind::Mentorship.as_str())
    .bind("Looking for guidance on embedded systems internships")
    .bind(RequestStatus::Pending.as_str())
    .bind(timestamp(2026, 1, 12, 11)?)
    .execute(pool)
    .await?;

    Ok(())
}

fn alumnus_from_row(row: &PgRow) -> AlumniRecord {
    AlumniRecord {
        id: row.get("id"),
        digital_id: row.get("digital_id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        graduation_year: row.get("graduation_year"),
        department: row.get("department"),
        current_company: row.get("current_company"),
        current_role: row.get("current_role"),
        location: row.get("location"),
        phone: row.get("phone"),
        linkedin: row.get("linkedin"),
        status: row.get("status"),
    }
}

pub async fn fetch_alumni(pool: &PgPool) -> anyhow::Result<Vec<AlumniRecord>> {
    let rows = sqlx::query("SELECT * FROM plenilune.alumni ORDER BY position")
        .fetch_all(pool)
        .await
        .context("failed to load alumni")?;

    Ok(rows.iter().map(alumnus_from_row).collect())
}

/// Swaps the stored collection for `alumni` in one transaction.
pub async fn replace_alumni(pool: &PgPool, alumni: &[AlumniRecord]) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM plenilune.alumni")
        .execute(&mut *tx)
        .await?;

    for (position, record) in alumni.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO plenilune.alumni
            (id, position, digital_id, full_name, email, graduation_year, department,
             current_company, current_role, location, phone, linkedin, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&record.id)
        .bind(i32::try_from(position).context("alumni collection too large")?)
        .bind(&record.digital_id)
        .bind(&record.full_name)
        .bind(&record.email)
        .bind(record.graduation_year)
        .bind(&record.department)
        .bind(&record.current_company)
        .bind(&record.current_role)
        .bind(&record.location)
        .bind(&record.phone)
        .bind(&record.linkedin)
        .bind(&record.status)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to store alumnus {}", record.digital_id))?;
    }

    tx.commit().await?;
    info!(count = alumni.len(), "alumni collection replaced");
    Ok(())
}

fn event_from_row(row: &PgRow) -> anyhow::Result<Event> {
    let status: String = row.get("status");
    Ok(Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        status: status.parse()?,
        funding_goal: row.get("funding_goal"),
        current_funding: row.get("current_funding"),
        donors_count: row.get("donors_count"),
    })
}

pub async fn fetch_events(pool: &PgPool) -> anyhow::Result<Vec<Event>> {
    let rows = sqlx::query("SELECT * FROM plenilune.events ORDER BY start_time")
        .fetch_all(pool)
        .await
        .context("failed to load events")?;

    rows.iter().map(event_from_row).collect()
}

pub async fn fetch_event(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
    let row = sqlx::query("SELECT * FROM plenilune.events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(event_from_row).transpose()
}

pub async fn insert_event(pool: &PgPool, event: &Event) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plenilune.events
        (id, title, description, start_time, end_time, status, funding_goal,
         current_funding, donors_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_time)
    .bind(event.end_time)
    .bind(event.status.as_str())
    .bind(event.funding_goal)
    .bind(event.current_funding)
    .bind(event.donors_count)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_event_funding(pool: &PgPool, event: &Event) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE plenilune.events
        SET current_funding = $2, donors_count = $3, status = $4
        WHERE id = $1
        "#,
    )
    .bind(event.id)
    .bind(event.current_funding)
    .bind(event.donors_count)
    .bind(event.status.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

fn request_from_row(row: &PgRow) -> anyhow::Result<MentorRequest> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    Ok(MentorRequest {
        id: row.get("id"),
        requested_by: row.get("requested_by"),
        requested_to: row.get("requested_to"),
        kind: kind.parse()?,
        message: row.get("message"),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub async fn fetch_requests(pool: &PgPool) -> anyhow::Result<Vec<MentorRequest>> {
    let rows = sqlx::query("SELECT * FROM plenilune.requests ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to load requests")?;

    rows.iter().map(request_from_row).collect()
}

pub async fn fetch_request(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<MentorRequest>> {
    let row = sqlx::query("SELECT * FROM plenilune.requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(request_from_row).transpose()
}

pub async fn insert_request(pool: &PgPool, request: &MentorRequest) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plenilune.requests
        (id, requested_by, requested_to, kind, message, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(request.id)
    .bind(&request.requested_by)
    .bind(&request.requested_to)
    .bind(request.kind.as_str())
    .bind(&request.message)
    .bind(request.status.as_str())
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_request_status(pool: &PgPool, request: &MentorRequest) -> anyhow::Result<()> {
    sqlx::query("UPDATE plenilune.requests SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(request.id)
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn enqueue_notification(pool: &PgPool, message: &Notification) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO plenilune.notification_outbox (id, subject, body, recipients)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(&message.subject)
    .bind(&message.body)
    .bind(message.recipients.as_slice())
    .execute(pool)
    .await
    .context("failed to queue notification")?;

    info!(%id, recipients = message.recipients.len(), "notification queued");
    Ok(id)
}
