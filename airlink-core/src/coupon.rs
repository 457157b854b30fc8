use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Porcentaje,
    MontoFijo,
}

/// A discount coupon definition as persisted.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub max_uses: Option<i64>,
    pub uses: i64,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_until: Option<NaiveDateTime>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("Este cupón aún no está disponible")]
    NotYetValid,
    #[error("Este cupón ha expirado")]
    Expired,
    #[error("Este cupón ya no está disponible")]
    Exhausted,
    #[error("Este cupón requiere un monto mínimo de compra de ${required}")]
    BelowMinimum { required: i64 },
}

/// Result of validating a coupon against a purchase amount.
#[derive(Debug, Clone)]
pub struct CouponQuote {
    pub discount: i64,
    pub description: String,
}

/// Validate and price a coupon: inside its validity window, under its
/// usage quota, and leaving at least `min_total_after` of the purchase
/// amount after the discount.
pub fn evaluate(
    coupon: &Coupon,
    amount: i64,
    now: NaiveDateTime,
    min_total_after: i64,
) -> Result<CouponQuote, CouponError> {
    if coupon.valid_from.is_some_and(|from| from > now) {
        return Err(CouponError::NotYetValid);
    }
    if coupon.valid_until.is_some_and(|until| until < now) {
        return Err(CouponError::Expired);
    }
    if coupon.max_uses.is_some_and(|max| coupon.uses >= max) {
        return Err(CouponError::Exhausted);
    }

    let mut discount = match coupon.kind {
        CouponKind::Porcentaje => ((amount * coupon.value) as f64 / 100.0).round() as i64,
        CouponKind::MontoFijo => coupon.value,
    };

    if discount > amount - min_total_after {
        return Err(CouponError::BelowMinimum {
            required: discount + min_total_after,
        });
    }
    if discount > amount {
        discount = amount;
    }

    Ok(CouponQuote {
        discount,
        description: match coupon.kind {
            CouponKind::Porcentaje => format!("{}% de descuento", coupon.value),
            CouponKind::MontoFijo => format!("${} de descuento", coupon.value),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        Coupon {
            id: 1,
            code: "VERANO10".to_string(),
            kind,
            value,
            max_uses: Some(100),
            uses: 0,
            valid_from: Some(at(2025, 1, 1)),
            valid_until: Some(at(2025, 12, 31)),
        }
    }

    #[test]
    fn percent_coupon_rounds_to_the_nearest_unit() {
        let quote = evaluate(&coupon(CouponKind::Porcentaje, 10), 59900, at(2025, 6, 1), 10000).unwrap();
        assert_eq!(quote.discount, 5990);
        assert_eq!(quote.description, "10% de descuento");
    }

    #[test]
    fn fixed_coupon_uses_its_face_value() {
        let quote = evaluate(&coupon(CouponKind::MontoFijo, 8000), 59900, at(2025, 6, 1), 10000).unwrap();
        assert_eq!(quote.discount, 8000);
    }

    #[test]
    fn window_and_quota_are_enforced() {
        assert_eq!(
            evaluate(&coupon(CouponKind::Porcentaje, 10), 59900, at(2024, 6, 1), 10000).unwrap_err(),
            CouponError::NotYetValid
        );
        assert_eq!(
            evaluate(&coupon(CouponKind::Porcentaje, 10), 59900, at(2026, 6, 1), 10000).unwrap_err(),
            CouponError::Expired
        );
        let mut spent = coupon(CouponKind::Porcentaje, 10);
        spent.uses = 100;
        assert_eq!(
            evaluate(&spent, 59900, at(2025, 6, 1), 10000).unwrap_err(),
            CouponError::Exhausted
        );
    }

    #[test]
    fn discount_may_not_drop_the_total_below_the_floor() {
        let result = evaluate(&coupon(CouponKind::MontoFijo, 15000), 20000, at(2025, 6, 1), 10000);
        assert_eq!(result.unwrap_err(), CouponError::BelowMinimum { required: 25000 });
    }
}
