use async_trait::async_trait;
use sqlx::MySqlPool;

use airlink_core::fare::FareOffer;
use airlink_core::repository::{FareRepository, StoreError};

use crate::database::db_err;

pub struct MySqlFareRepository {
    pool: MySqlPool,
}

impl MySqlFareRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FareRow {
    trip_fare_id: i64,
    fare_id: i64,
    codigo_tarifa: String,
    nombre_tarifa: String,
    precio: i64,
    moneda: String,
    cupos: i64,
    equipaje_incl_kg: Option<i64>,
    cambios: Option<String>,
    reembolsable: bool,
    condiciones: Option<String>,
    nombre_cabina: String,
    descripcion_cabina: Option<String>,
}

#[async_trait]
impl FareRepository for MySqlFareRepository {
    async fn fares_for_trip(&self, trip_id: i64) -> Result<Vec<FareOffer>, StoreError> {
        let rows = sqlx::query_as::<_, FareRow>(
            r#"
            SELECT
                vt.idViajeTarifa    AS trip_fare_id,
                vt.idTarifa         AS fare_id,
                t.codigoTarifa      AS codigo_tarifa,
                t.nombreTarifa      AS nombre_tarifa,
                vt.precio           AS precio,
                vt.moneda           AS moneda,
                vt.cupos            AS cupos,
                t.equipaje_incl_kg  AS equipaje_incl_kg,
                t.cambios           AS cambios,
                t.reembolsable      AS reembolsable,
                t.condiciones       AS condiciones,
                cc.nombreCabinaClase AS nombre_cabina,
                cc.descripcion      AS descripcion_cabina
            FROM viaje_tarifa vt
            JOIN tarifa       t  ON t.idTarifa       = vt.idTarifa
            JOIN cabina_clase cc ON cc.idCabinaClase = t.idCabinaClase
            WHERE vt.idViaje = ? AND t.activo = 1
            ORDER BY vt.precio ASC
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| FareOffer {
                trip_fare_id: r.trip_fare_id,
                fare_id: r.fare_id,
                code: r.codigo_tarifa,
                name: r.nombre_tarifa,
                price: r.precio,
                currency: r.moneda,
                quota: r.cupos,
                baggage_kg: r.equipaje_incl_kg,
                changes: r.cambios,
                refundable: r.reembolsable as u8,
                conditions: r.condiciones,
                cabin_name: r.nombre_cabina,
                cabin_description: r.descripcion_cabina,
            })
            .collect())
    }
}
