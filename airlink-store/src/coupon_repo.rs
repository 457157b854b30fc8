use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use airlink_core::coupon::{Coupon, CouponKind};
use airlink_core::repository::{CouponRepository, StoreError};

use crate::database::db_err;

pub struct MySqlCouponRepository {
    pool: MySqlPool,
}

impl MySqlCouponRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    coupon_id: i64,
    codigo: String,
    id_tipo_cupon: i64,
    valor: i64,
    uso_maximo: Option<i64>,
    uso_actual: i64,
    fecha_inicio: Option<NaiveDateTime>,
    fecha_fin: Option<NaiveDateTime>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            id: row.coupon_id,
            code: row.codigo,
            // Type 2 is a fixed amount; everything else prices as percent.
            kind: if row.id_tipo_cupon == 2 {
                CouponKind::MontoFijo
            } else {
                CouponKind::Porcentaje
            },
            value: row.valor,
            max_uses: row.uso_maximo,
            uses: row.uso_actual,
            valid_from: row.fecha_inicio,
            valid_until: row.fecha_fin,
        }
    }
}

const COUPON_SELECT: &str = r#"
    SELECT
        idCuponDescuento AS coupon_id,
        codigo           AS codigo,
        idTipoCupon      AS id_tipo_cupon,
        valor            AS valor,
        uso_maximo       AS uso_maximo,
        uso_actual       AS uso_actual,
        fecha_inicio     AS fecha_inicio,
        fecha_fin        AS fecha_fin
    FROM cupon_descuento
"#;

#[async_trait]
impl CouponRepository for MySqlCouponRepository {
    async fn by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let sql = format!("{COUPON_SELECT} WHERE codigo = ? AND activo = 1");
        let row = sqlx::query_as::<_, CouponRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Coupon::from))
    }

    async fn list_active(&self) -> Result<Vec<Coupon>, StoreError> {
        let sql = format!(
            "{COUPON_SELECT} WHERE activo = 1 AND (fecha_fin IS NULL OR fecha_fin >= NOW()) ORDER BY fecha_inicio DESC"
        );
        let rows = sqlx::query_as::<_, CouponRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Coupon::from).collect())
    }
}
