use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use airlink_core::booking::{
    AppliedCoupon, BreakdownLine, CheckinCode, LineCategory, ReservationDetail, ReservationRecord,
    SeatCharge,
};
use airlink_core::repository::{ReservationRepository, StoreError};

use crate::database::db_err;

pub struct MySqlReservationRepository {
    pool: MySqlPool,
}

impl MySqlReservationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn seats_for_reservation(&self, reservation_id: i64) -> Result<Vec<SeatCharge>, StoreError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            numero: String,
            precio: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT a.numero AS numero, pa.cargo_extra AS precio
            FROM pasajero_asiento pa
            JOIN asiento  a ON pa.idAsiento  = a.idAsiento
            JOIN pasajero p ON pa.idPasajero = p.idPasajero
            WHERE p.idReserva = ?
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| SeatCharge { number: r.numero, extra: r.precio })
            .collect())
    }
}

const RECORD_SELECT: &str = r#"
    SELECT
        r.idReserva         AS reservation_id,
        r.codigo_reserva    AS codigo,
        r.estado            AS estado,
        r.monto_total       AS monto_total,
        r.moneda            AS moneda,
        r.idUsuario         AS owner_id,
        v.idViaje           AS trip_id,
        v.salida            AS salida,
        v.llegada           AS llegada,
        t1.codigo           AS origen,
        t1.nombreTerminal   AS origen_nombre,
        t1.ciudad           AS origen_ciudad,
        t2.codigo           AS destino,
        t2.nombreTerminal   AS destino_nombre,
        t2.ciudad           AS destino_ciudad,
        e.nombreEmpresa     AS empresa,
        p.idPasajero        AS passenger_id,
        p.nombrePasajero    AS nombre_pasajero,
        p.apellidoPasajero  AS apellido_pasajero,
        p.documento         AS documento
    FROM reserva r
    LEFT JOIN viaje          v   ON r.idViaje           = v.idViaje
    LEFT JOIN ruta           ru  ON v.idRuta            = ru.idRuta
    LEFT JOIN terminal       t1  ON ru.idTerminalOrigen = t1.idTerminal
    LEFT JOIN terminal       t2  ON ru.idTerminalDestino = t2.idTerminal
    LEFT JOIN empresa_equipo eq  ON v.idEquipo          = eq.idEquipo
    LEFT JOIN empresa        e   ON eq.idEmpresa        = e.idEmpresa
    LEFT JOIN pasajero       p   ON r.idReserva         = p.idReserva
"#;

#[derive(sqlx::FromRow)]
struct RecordRow {
    reservation_id: i64,
    codigo: String,
    estado: String,
    monto_total: i64,
    moneda: Option<String>,
    owner_id: i64,
    trip_id: Option<i64>,
    salida: Option<NaiveDateTime>,
    llegada: Option<NaiveDateTime>,
    origen: Option<String>,
    origen_nombre: Option<String>,
    origen_ciudad: Option<String>,
    destino: Option<String>,
    destino_nombre: Option<String>,
    destino_ciudad: Option<String>,
    empresa: Option<String>,
    passenger_id: Option<i64>,
    nombre_pasajero: Option<String>,
    apellido_pasajero: Option<String>,
    documento: Option<String>,
}

impl From<RecordRow> for ReservationRecord {
    fn from(row: RecordRow) -> Self {
        ReservationRecord {
            id: row.reservation_id,
            code: row.codigo,
            status: row.estado,
            total_amount: row.monto_total,
            currency: row.moneda,
            owner_id: row.owner_id,
            trip_id: row.trip_id,
            departure: row.salida,
            arrival: row.llegada,
            origin_code: row.origen,
            origin_name: row.origen_nombre,
            origin_city: row.origen_ciudad,
            dest_code: row.destino,
            dest_name: row.destino_nombre,
            dest_city: row.destino_ciudad,
            operator: row.empresa,
            passenger_id: row.passenger_id,
            passenger_first: row.nombre_pasajero,
            passenger_last: row.apellido_pasajero,
            document: row.documento,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    tipo: String,
    descripcion: String,
    monto: i64,
    metadata: Option<String>,
}

impl From<LineRow> for BreakdownLine {
    fn from(row: LineRow) -> Self {
        BreakdownLine {
            category: serde_json::from_value(serde_json::Value::String(row.tipo))
                .unwrap_or(LineCategory::Otro),
            description: row.descripcion,
            amount: row.monto,
            metadata: row.metadata.and_then(|m| serde_json::from_str(&m).ok()),
        }
    }
}

#[async_trait]
impl ReservationRepository for MySqlReservationRepository {
    async fn detail(&self, reservation_id: i64) -> Result<Option<ReservationDetail>, StoreError> {
        let sql = format!("{RECORD_SELECT} WHERE r.idReserva = ? LIMIT 1");
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT tipo, descripcion, monto, metadata
            FROM reserva_detalle
            WHERE idReserva = ?
            ORDER BY idReservaDetalle
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let seats = self.seats_for_reservation(reservation_id).await?;

        #[derive(sqlx::FromRow)]
        struct CouponRow {
            codigo: String,
            descuento: i64,
        }

        let coupon = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT cd.codigo AS codigo, rc.montoAplicado AS descuento
            FROM reserva_cupon rc
            JOIN cupon_descuento cd ON rc.idCuponDescuento = cd.idCuponDescuento
            WHERE rc.idReserva = ?
            LIMIT 1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Some(ReservationDetail {
            record: row.into(),
            lines: lines.into_iter().map(BreakdownLine::from).collect(),
            seats,
            coupon: coupon.map(|c| AppliedCoupon { code: c.codigo, discount: c.descuento }),
        }))
    }

    async fn for_user(&self, user_id: i64) -> Result<Vec<ReservationRecord>, StoreError> {
        let sql = format!("{RECORD_SELECT} WHERE r.idUsuario = ? ORDER BY r.fecha_reserva DESC LIMIT 100");
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(ReservationRecord::from).collect())
    }

    async fn find_for_checkin(
        &self,
        code: &CheckinCode,
        last_name: &str,
    ) -> Result<Option<(ReservationRecord, Vec<SeatCharge>)>, StoreError> {
        let sql = format!(
            r#"{RECORD_SELECT}
            WHERE (UPPER(r.codigo_reserva) = ? OR (? IS NOT NULL AND r.idReserva = ?))
              AND LOWER(p.apellidoPasajero) = LOWER(?)
            LIMIT 1"#
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(&code.raw)
            .bind(code.reservation_id)
            .bind(code.reservation_id)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let seats = self.seats_for_reservation(row.reservation_id).await?;
        Ok(Some((row.into(), seats)))
    }
}
