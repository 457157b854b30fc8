use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use airlink_core::flight::{
    self, AvailabilityQuery, AvailabilityRow, DayAvailability, Destination, FlightSearch,
    FlightSummary, TerminalRef, TripFareRow, TripInfo,
};
use airlink_core::repository::{FlightRepository, StoreError};

use crate::database::db_err;

pub struct MySqlFlightRepository {
    pool: MySqlPool,
}

impl MySqlFlightRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn like(term: &str) -> String {
    format!("%{}%", term)
}

#[derive(sqlx::FromRow)]
struct SearchRow {
    trip_id: i64,
    salida: NaiveDateTime,
    llegada: NaiveDateTime,
    estado: String,
    origen_codigo: String,
    origen_ciudad: String,
    origen_nombre: String,
    destino_codigo: String,
    destino_ciudad: String,
    destino_nombre: String,
    empresa: String,
    empresa_logo: Option<String>,
    modelo: Option<String>,
    matricula: Option<String>,
    id_tarifa: Option<i64>,
    precio: Option<i64>,
    cupos: Option<i64>,
}

impl From<SearchRow> for TripFareRow {
    fn from(row: SearchRow) -> Self {
        TripFareRow {
            trip_id: row.trip_id,
            departure: row.salida,
            arrival: row.llegada,
            status: row.estado,
            origin_code: row.origen_codigo,
            origin_city: row.origen_ciudad,
            origin_name: row.origen_nombre,
            dest_code: row.destino_codigo,
            dest_city: row.destino_ciudad,
            dest_name: row.destino_nombre,
            operator: row.empresa,
            operator_logo: row.empresa_logo,
            aircraft_model: row.modelo,
            registration: row.matricula,
            fare_id: row.id_tarifa,
            price: row.precio,
            quota: row.cupos,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TripDetailRow {
    trip_id: i64,
    salida: NaiveDateTime,
    llegada: NaiveDateTime,
    estado: String,
    origen_codigo: String,
    origen_ciudad: String,
    origen_nombre: String,
    destino_codigo: String,
    destino_ciudad: String,
    destino_nombre: String,
    empresa: String,
    empresa_logo: Option<String>,
    modelo: Option<String>,
    capacidad: Option<i64>,
    distancia_km: Option<f64>,
    duracion_estimada_min: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct DestinationRow {
    terminal_id: i64,
    codigo: String,
    ciudad: String,
    nombre_terminal: String,
    imagen: Option<String>,
    tipo: String,
}

#[derive(sqlx::FromRow)]
struct TerminalRow {
    codigo: String,
    ciudad: String,
    nombre_terminal: String,
}

#[async_trait]
impl FlightRepository for MySqlFlightRepository {
    async fn search(&self, search: &FlightSearch) -> Result<Vec<FlightSummary>, StoreError> {
        let (start, end) = search.utc_window();

        let mut sql = String::from(
            r#"
            SELECT
                v.idViaje          AS trip_id,
                v.salida,
                v.llegada,
                v.estado,
                t1.codigo          AS origen_codigo,
                t1.ciudad          AS origen_ciudad,
                t1.nombreTerminal  AS origen_nombre,
                t2.codigo          AS destino_codigo,
                t2.ciudad          AS destino_ciudad,
                t2.nombreTerminal  AS destino_nombre,
                e.nombreEmpresa    AS empresa,
                e.logo             AS empresa_logo,
                eq.modelo          AS modelo,
                eq.matricula       AS matricula,
                vt.idTarifa        AS id_tarifa,
                vt.precio          AS precio,
                vt.cupos           AS cupos
            FROM viaje v
            JOIN ruta            r   ON v.idRuta            = r.idRuta
            JOIN terminal        t1  ON r.idTerminalOrigen  = t1.idTerminal
            JOIN terminal        t2  ON r.idTerminalDestino = t2.idTerminal
            JOIN empresa_equipo  eq  ON v.idEquipo          = eq.idEquipo
            JOIN empresa         e   ON eq.idEmpresa        = e.idEmpresa
            LEFT JOIN viaje_tarifa vt ON vt.idViaje         = v.idViaje
            WHERE t1.codigo = ?
              AND t2.codigo = ?
              AND v.salida >= ? AND v.salida < ?
              AND v.estado = 'programado'
              AND (vt.cupos IS NULL OR vt.cupos > 0)
            "#,
        );
        if search.cabin.is_some() {
            sql.push_str(
                r#"
              AND (vt.idTarifa IS NULL OR EXISTS (
                    SELECT 1
                    FROM tarifa ta
                    JOIN cabina_clase cc ON cc.idCabinaClase = ta.idCabinaClase
                    WHERE ta.idTarifa = vt.idTarifa
                      AND cc.nombreCabinaClase LIKE ?
              ))
            "#,
            );
        }
        sql.push_str(" ORDER BY v.idViaje, vt.idTarifa");

        let mut query = sqlx::query_as::<_, SearchRow>(&sql)
            .bind(&search.origin)
            .bind(&search.destination)
            .bind(start)
            .bind(end);
        if let Some(cabin) = &search.cabin {
            query = query.bind(like(cabin));
        }

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(flight::summarize_search(
            rows.into_iter().map(TripFareRow::from).collect(),
            search.offset,
        ))
    }

    async fn daily_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<DayAvailability>, StoreError> {
        let (start, end) = query.utc_window();

        #[derive(sqlx::FromRow)]
        struct Row {
            trip_id: i64,
            salida: NaiveDateTime,
            precio: Option<i64>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT
                v.idViaje AS trip_id,
                v.salida,
                vt.precio AS precio
            FROM viaje v
            JOIN ruta            r   ON v.idRuta            = r.idRuta
            JOIN terminal        t1  ON r.idTerminalOrigen  = t1.idTerminal
            JOIN terminal        t2  ON r.idTerminalDestino = t2.idTerminal
            LEFT JOIN viaje_tarifa vt ON vt.idViaje         = v.idViaje
            WHERE t1.codigo = ?
              AND t2.codigo = ?
              AND v.salida >= ? AND v.salida < ?
              AND v.estado = 'programado'
              AND (vt.cupos IS NULL OR vt.cupos > 0)
            "#,
        )
        .bind(&query.origin)
        .bind(&query.destination)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(flight::summarize_availability(
            rows.into_iter()
                .map(|r| AvailabilityRow {
                    trip_id: r.trip_id,
                    departure: r.salida,
                    price: r.precio,
                })
                .collect(),
            query.offset,
        ))
    }

    async fn trip_detail(&self, trip_id: i64) -> Result<Option<TripInfo>, StoreError> {
        let row = sqlx::query_as::<_, TripDetailRow>(
            r#"
            SELECT
                v.idViaje             AS trip_id,
                v.salida,
                v.llegada,
                v.estado,
                t1.codigo             AS origen_codigo,
                t1.ciudad             AS origen_ciudad,
                t1.nombreTerminal     AS origen_nombre,
                t2.codigo             AS destino_codigo,
                t2.ciudad             AS destino_ciudad,
                t2.nombreTerminal     AS destino_nombre,
                e.nombreEmpresa       AS empresa,
                e.logo                AS empresa_logo,
                eq.modelo             AS modelo,
                eq.capacidad          AS capacidad,
                r.distanciaKm         AS distancia_km,
                r.duracionEstimadaMin AS duracion_estimada_min
            FROM viaje v
            JOIN ruta            r   ON v.idRuta            = r.idRuta
            JOIN terminal        t1  ON r.idTerminalOrigen  = t1.idTerminal
            JOIN terminal        t2  ON r.idTerminalDestino = t2.idTerminal
            JOIN empresa_equipo  eq  ON v.idEquipo          = eq.idEquipo
            JOIN empresa         e   ON eq.idEmpresa        = e.idEmpresa
            WHERE v.idViaje = ?
            LIMIT 1
            "#,
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| TripInfo {
            trip_id: r.trip_id,
            departure: r.salida,
            arrival: r.llegada,
            status: r.estado,
            origin_code: r.origen_codigo,
            origin_city: r.origen_ciudad,
            origin_name: r.origen_nombre,
            dest_code: r.destino_codigo,
            dest_city: r.destino_ciudad,
            dest_name: r.destino_nombre,
            operator: r.empresa,
            operator_logo: r.empresa_logo,
            aircraft_model: r.modelo,
            capacity: r.capacidad,
            distance_km: r.distancia_km,
            est_duration_min: r.duracion_estimada_min,
        }))
    }

    async fn list_destinations(&self) -> Result<Vec<Destination>, StoreError> {
        let rows = sqlx::query_as::<_, DestinationRow>(
            r#"
            SELECT DISTINCT
                t.idTerminal          AS terminal_id,
                t.codigo              AS codigo,
                t.ciudad              AS ciudad,
                t.nombreTerminal      AS nombre_terminal,
                t.imagen              AS imagen,
                tt.nombreTipoTerminal AS tipo
            FROM terminal t
            JOIN tipo_terminal tt ON t.idTipoTerminal = tt.idTipoTerminal
            WHERE t.activo = 1
            ORDER BY t.ciudad
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| Destination {
                terminal_id: r.terminal_id,
                code: r.codigo,
                city: r.ciudad,
                name: r.nombre_terminal,
                image: r.imagen,
                kind: r.tipo,
            })
            .collect())
    }

    async fn terminal_by_city(&self, city: &str) -> Result<Option<TerminalRef>, StoreError> {
        let row = sqlx::query_as::<_, TerminalRow>(
            "SELECT codigo, ciudad, nombreTerminal AS nombre_terminal FROM terminal WHERE ciudad LIKE ? LIMIT 1",
        )
        .bind(like(city))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| TerminalRef {
            code: r.codigo,
            city: r.ciudad,
            name: r.nombre_terminal,
        }))
    }
}
