use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::info;

use airlink_core::repository::{SeatRepository, StoreError};
use airlink_core::seat::{SeatPick, SeatRecord};
use airlink_core::seatmap::{PlannedCabin, PlannedSeat};

use crate::database::db_err;

pub struct MySqlSeatRepository {
    pool: MySqlPool,
}

impl MySqlSeatRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Premium and economy cabin-class ids, seeding the two defaults
    /// when the table is still empty.
    async fn cabin_class_ids(&self) -> Result<(i64, i64), StoreError> {
        #[derive(sqlx::FromRow)]
        struct CabinRow {
            cabin_id: i64,
        }

        let select =
            "SELECT idCabinaClase AS cabin_id FROM cabina_clase ORDER BY prioridad LIMIT 2";

        let mut rows = sqlx::query_as::<_, CabinRow>(select)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        if rows.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO cabina_clase (nombreCabinaClase, prioridad, descripcion)
                VALUES
                    ('Premium', 1, 'Clase Premium con espacio extra'),
                    ('Economy', 2, 'Clase económica estándar')
                "#,
            )
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            rows = sqlx::query_as::<_, CabinRow>(select)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        }

        let premium = rows
            .first()
            .map(|r| r.cabin_id)
            .ok_or_else(|| StoreError::Unavailable("no cabin classes".to_string()))?;
        let economy = rows.get(1).map_or(premium, |r| r.cabin_id);
        Ok((premium, economy))
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    seat_id: i64,
    numero: String,
    disponible: bool,
    clase: String,
    cabin_id: i64,
}

#[async_trait]
impl SeatRepository for MySqlSeatRepository {
    async fn seats_for_trip(&self, trip_id: i64) -> Result<Vec<SeatRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT
                a.idAsiento          AS seat_id,
                a.numero             AS numero,
                a.disponible         AS disponible,
                cc.nombreCabinaClase AS clase,
                cc.idCabinaClase     AS cabin_id
            FROM asiento a
            JOIN cabina_clase cc ON a.idCabinaClase = cc.idCabinaClase
            WHERE a.idViaje = ?
            ORDER BY a.numero
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| SeatRecord {
                id: r.seat_id,
                number: r.numero,
                available: r.disponible,
                cabin_name: r.clase,
                cabin_id: r.cabin_id,
            })
            .collect())
    }

    async fn trip_capacity(&self, trip_id: i64) -> Result<Option<i64>, StoreError> {
        #[derive(sqlx::FromRow)]
        struct CapacityRow {
            capacidad: i64,
        }

        let row = sqlx::query_as::<_, CapacityRow>(
            r#"
            SELECT eq.capacidad AS capacidad
            FROM viaje v
            JOIN empresa_equipo eq ON v.idEquipo = eq.idEquipo
            WHERE v.idViaje = ?
            "#,
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| r.capacidad))
    }

    async fn insert_layout(&self, trip_id: i64, seats: &[PlannedSeat]) -> Result<u64, StoreError> {
        if seats.is_empty() {
            return Ok(0);
        }
        let (premium, economy) = self.cabin_class_ids().await?;

        // INSERT IGNORE + the (idViaje, numero) unique key make concurrent
        // first-time generation converge on one layout.
        let mut builder = sqlx::QueryBuilder::<sqlx::MySql>::new(
            "INSERT IGNORE INTO asiento (idViaje, numero, idCabinaClase, disponible) ",
        );
        builder.push_values(seats, |mut b, seat| {
            let cabin_id = match seat.cabin {
                PlannedCabin::Premium => premium,
                PlannedCabin::Economy => economy,
            };
            b.push_bind(trip_id)
                .push_bind(&seat.number)
                .push_bind(cabin_id)
                .push_bind(true);
        });

        let result = builder.build().execute(&self.pool).await.map_err(db_err)?;
        let inserted = result.rows_affected();
        info!(trip_id, inserted, "seat layout generated");
        Ok(inserted)
    }

    async fn reserve(&self, passenger_id: i64, picks: &[SeatPick]) -> Result<(), StoreError> {
        let failed = |e: sqlx::Error| StoreError::ReservationFailed(e.to_string());

        // Single transaction: all seats in the batch flip and link, or
        // none do. Dropping the transaction on any early return rolls it
        // back and returns the connection to the pool.
        let mut tx = self.pool.begin().await.map_err(failed)?;

        for pick in picks {
            let updated = sqlx::query(
                "UPDATE asiento SET disponible = 0 WHERE idAsiento = ? AND disponible = 1",
            )
            .bind(pick.seat_id)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

            // Zero rows means the seat was already taken; a concurrent
            // transaction holding it keeps this guard from passing.
            if updated.rows_affected() == 0 {
                return Err(StoreError::ReservationFailed(format!(
                    "asiento {} no disponible",
                    pick.seat_id
                )));
            }

            sqlx::query(
                "INSERT INTO pasajero_asiento (idPasajero, idAsiento, cargo_extra) VALUES (?, ?, ?)",
            )
            .bind(passenger_id)
            .bind(pick.seat_id)
            .bind(pick.extra_charge)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        }

        tx.commit().await.map_err(failed)?;
        info!(passenger_id, seats = picks.len(), "seats reserved");
        Ok(())
    }
}
