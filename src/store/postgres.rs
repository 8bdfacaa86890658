use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{HoldOutcome, LayoutStore, ReservationStore, SeatStore};
use crate::database::Database;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    LayoutDescriptor, NewHold, PricingPolicy, ReservationRecord, ReservationStatus, SeatFilter,
    SeatRecord, SeatSpec, StoredLayout, TenantId,
};

const SEAT_COLUMNS: &str =
    "id, event_id, tenant_id, section, row_label, seat_label, tier, base_price, x, y, is_available";

const RESERVATION_COLUMNS: &str =
    "id, seat_id, event_id, holder_ref, status, expires_at, created_at, updated_at";

#[derive(FromRow)]
struct ReservationRow {
    id: Uuid,
    seat_id: i64,
    event_id: i64,
    holder_ref: String,
    status: String,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for ReservationRecord {
    type Error = EngineError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(ReservationRecord {
            id: row.id,
            seat_id: row.seat_id,
            event_id: row.event_id,
            holder_ref: row.holder_ref,
            status: row.status.parse().map_err(EngineError::StorageFailure)?,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<ReservationRow>) -> EngineResult<Vec<ReservationRecord>> {
    rows.into_iter().map(ReservationRecord::try_from).collect()
}

fn status_list(statuses: &[ReservationStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeatStore for PgStore {
    async fn delete_event_seats(&self, event_id: i64) -> EngineResult<u64> {
        let result = sqlx::query("DELETE FROM seats WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_seats(
        &self,
        event_id: i64,
        tenant: &TenantId,
        batch: &[SeatSpec],
    ) -> EngineResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO seats (event_id, tenant_id, section, row_label, seat_label, tier, base_price, x, y, is_available) ",
        );
        qb.push_values(batch, |mut row, spec| {
            row.push_bind(event_id)
                .push_bind(tenant.as_str())
                .push_bind(spec.section.as_str())
                .push_bind(spec.row_label.as_str())
                .push_bind(spec.seat_label.as_str())
                .push_bind(spec.tier.as_str())
                .push_bind(spec.base_price)
                .push_bind(spec.x)
                .push_bind(spec.y)
                .push_bind(spec.is_available);
        });

        let result = qb.build().execute(&self.db.pool).await?;
        Ok(result.rows_affected())
    }

    async fn has_seats(&self, event_id: i64) -> EngineResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM seats WHERE event_id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(exists)
    }

    async fn list_seats(
        &self,
        event_id: i64,
        filter: &SeatFilter,
    ) -> EngineResult<Vec<SeatRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM seats WHERE event_id = ", SEAT_COLUMNS));
        qb.push_bind(event_id);
        if let Some(section) = &filter.section {
            qb.push(" AND section = ").push_bind(section.clone());
        }
        if let Some(row) = &filter.row {
            qb.push(" AND row_label = ").push_bind(row.clone());
        }
        if let Some(tier) = &filter.tier {
            qb.push(" AND tier = ").push_bind(tier.clone());
        }
        if filter.only_open {
            qb.push(" AND is_available");
        }
        qb.push(" ORDER BY id");

        let seats = qb
            .build_query_as::<SeatRecord>()
            .fetch_all(&self.db.pool)
            .await?;
        Ok(seats)
    }

    async fn find_seat(&self, seat_id: i64) -> EngineResult<Option<SeatRecord>> {
        let seat = sqlx::query_as::<_, SeatRecord>(&format!(
            "SELECT {} FROM seats WHERE id = $1",
            SEAT_COLUMNS
        ))
        .bind(seat_id)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(seat)
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn insert_hold_if_free(
        &self,
        hold: &NewHold,
        now: DateTime<Utc>,
    ) -> EngineResult<HoldOutcome> {
        let mut tx = self.db.pool.begin().await?;

        // Сериализуем конкурентные холды на одно место: снапшот INSERT'а
        // берётся уже после захвата блокировки и видит чужой закоммиченный холд
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(hold.seat_id)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            INSERT INTO seat_reservations
                (id, seat_id, event_id, holder_ref, status, expires_at, created_at, updated_at)
            SELECT $1, s.id, s.event_id, $3, 'held', $4, $5, $5
            FROM seats s
            WHERE s.id = $2
              AND s.is_available
              AND NOT EXISTS (
                SELECT 1 FROM seat_reservations r
                WHERE r.seat_id = s.id
                  AND r.status IN ('held', 'locked', 'confirmed')
                  AND (r.expires_at IS NULL OR r.expires_at > $5)
              )
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(hold.id)
        .bind(hold.seat_id)
        .bind(&hold.holder_ref)
        .bind(hold.expires_at)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match inserted {
            Some(row) => HoldOutcome::Held(row.try_into()?),
            None => {
                let seat_exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM seats WHERE id = $1)",
                )
                .bind(hold.seat_id)
                .fetch_one(&mut *tx)
                .await?;
                if seat_exists {
                    HoldOutcome::Taken
                } else {
                    HoldOutcome::UnknownSeat
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn find_reservation(&self, id: Uuid) -> EngineResult<Option<ReservationRecord>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM seat_reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;
        row.map(ReservationRecord::try_from).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<ReservationRecord>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            UPDATE seat_reservations
            SET status = $3, expires_at = $4, updated_at = $5
            WHERE id = $1
              AND status = $2
              AND (expires_at IS NULL OR expires_at > $5)
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(expires_at)
        .bind(now)
        .fetch_optional(&self.db.pool)
        .await?;
        row.map(ReservationRecord::try_from).transpose()
    }

    async fn expire_due(&self, event_id: i64, now: DateTime<Utc>) -> EngineResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE seat_reservations
            SET status = 'expired', updated_at = $2
            WHERE event_id = $1
              AND status = ANY($3)
              AND expires_at IS NOT NULL
              AND expires_at <= $2
            "#,
        )
        .bind(event_id)
        .bind(now)
        .bind(status_list(&ReservationStatus::EXPIRABLE))
        .execute(&self.db.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn active_reservations(
        &self,
        event_id: i64,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<ReservationRecord>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            SELECT {} FROM seat_reservations
            WHERE event_id = $1
              AND status = ANY($2)
              AND (expires_at IS NULL OR expires_at > $3)
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(event_id)
        .bind(status_list(&ReservationStatus::ACTIVE))
        .bind(now)
        .fetch_all(&self.db.pool)
        .await?;
        into_records(rows)
    }

    async fn reservations_for_holder(
        &self,
        event_id: i64,
        holder_ref: &str,
    ) -> EngineResult<Vec<ReservationRecord>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM seat_reservations WHERE event_id = $1 AND holder_ref = $2 ORDER BY created_at",
            RESERVATION_COLUMNS
        ))
        .bind(event_id)
        .bind(holder_ref)
        .fetch_all(&self.db.pool)
        .await?;
        into_records(rows)
    }
}

#[async_trait]
impl LayoutStore for PgStore {
    async fn save_layout(&self, layout: &StoredLayout) -> EngineResult<()> {
        sqlx::query(
            r#"
            INSERT INTO event_layouts (event_id, tenant_id, descriptor, pricing, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (event_id) DO UPDATE
            SET tenant_id = EXCLUDED.tenant_id,
                descriptor = EXCLUDED.descriptor,
                pricing = EXCLUDED.pricing,
                updated_at = NOW()
            "#,
        )
        .bind(layout.event_id)
        .bind(layout.tenant_id.as_str())
        .bind(Json(&layout.descriptor))
        .bind(Json(&layout.pricing))
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }

    async fn load_layout(&self, event_id: i64) -> EngineResult<Option<StoredLayout>> {
        let row = sqlx::query_as::<_, (String, Json<LayoutDescriptor>, Json<PricingPolicy>)>(
            "SELECT tenant_id, descriptor, pricing FROM event_layouts WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row.map(|(tenant_id, descriptor, pricing)| StoredLayout {
            event_id,
            tenant_id: TenantId::new(tenant_id),
            descriptor: descriptor.0,
            pricing: pricing.0,
        }))
    }
}
