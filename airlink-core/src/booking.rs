use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category of a price-breakdown line. Signed amounts: discounts are
/// stored negative so that lines always sum to the reservation total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    VueloIda,
    VueloVuelta,
    Asientos,
    Bus,
    Descuento,
    #[serde(other)]
    Otro,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownLine {
    #[serde(rename = "tipo")]
    pub category: LineCategory,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "monto")]
    pub amount: i64,
    #[serde(rename = "metadata")]
    pub metadata: Option<serde_json::Value>,
}

/// Invariant of every persisted reservation: line amounts sum exactly
/// to the stored total (amounts are integer currency units, so the
/// tolerance is zero).
pub fn breakdown_balances(lines: &[BreakdownLine], total: i64) -> bool {
    lines.iter().map(|l| l.amount).sum::<i64>() == total
}

/// A reserved seat with its extra charge, as read back with a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatCharge {
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "precio")]
    pub extra: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descuento")]
    pub discount: i64,
}

/// Reservation header joined to its trip, terminals and lead passenger.
/// Trip columns are optional: a reservation survives its trip being
/// removed by back-office processes.
#[derive(Debug, Clone)]
pub struct ReservationRecord {
    pub id: i64,
    pub code: String,
    pub status: String,
    pub total_amount: i64,
    pub currency: Option<String>,
    pub owner_id: i64,
    pub trip_id: Option<i64>,
    pub departure: Option<NaiveDateTime>,
    pub arrival: Option<NaiveDateTime>,
    pub origin_code: Option<String>,
    pub origin_name: Option<String>,
    pub origin_city: Option<String>,
    pub dest_code: Option<String>,
    pub dest_name: Option<String>,
    pub dest_city: Option<String>,
    pub operator: Option<String>,
    pub passenger_id: Option<i64>,
    pub passenger_first: Option<String>,
    pub passenger_last: Option<String>,
    pub document: Option<String>,
}

impl ReservationRecord {
    /// Display flight number, `AL <trip>`.
    pub fn flight_label(&self) -> String {
        match self.trip_id {
            Some(id) => format!("AL {id}"),
            None => "AL N/A".to_string(),
        }
    }

    pub fn passenger_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.passenger_first.as_deref().unwrap_or(""),
            self.passenger_last.as_deref().unwrap_or("")
        );
        let name = name.trim().to_string();
        if name.is_empty() { "Pasajero".to_string() } else { name }
    }
}

/// Full reservation read-back: header plus breakdown, seats and coupon.
#[derive(Debug, Clone)]
pub struct ReservationDetail {
    pub record: ReservationRecord,
    pub lines: Vec<BreakdownLine>,
    pub seats: Vec<SeatCharge>,
    pub coupon: Option<AppliedCoupon>,
}

/// Check-in lookup input: the full reservation code plus, when the code
/// ends in digits (`RES-6`, `RES6`, `#6`, bare `6`), the numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinCode {
    pub raw: String,
    pub reservation_id: Option<i64>,
}

pub fn parse_checkin_code(input: &str) -> CheckinCode {
    let raw = input.trim().to_uppercase();
    let digits: String = raw
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    CheckinCode {
        reservation_id: digits.parse().ok(),
        raw,
    }
}

/// Check-in opens 24 hours before departure and closes at departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinEligibility {
    Open { hours_left: i64 },
    Departed,
    NotYetOpen { hours_left: i64 },
}

pub fn checkin_window(departure: NaiveDateTime, now: NaiveDateTime) -> CheckinEligibility {
    if departure < now {
        return CheckinEligibility::Departed;
    }
    let hours_left = (departure - now).num_hours();
    if hours_left > 24 {
        CheckinEligibility::NotYetOpen { hours_left }
    } else {
        CheckinEligibility::Open { hours_left }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn line(category: LineCategory, amount: i64) -> BreakdownLine {
        BreakdownLine {
            category,
            description: String::new(),
            amount,
            metadata: None,
        }
    }

    #[test]
    fn breakdown_with_discount_balances_against_total() {
        let lines = vec![
            line(LineCategory::VueloIda, 59900),
            line(LineCategory::Asientos, 5000),
            line(LineCategory::Bus, 3500),
            line(LineCategory::Descuento, -6000),
        ];
        assert!(breakdown_balances(&lines, 62400));
        assert!(!breakdown_balances(&lines, 62401));
    }

    #[test]
    fn empty_breakdown_balances_only_against_zero() {
        assert!(breakdown_balances(&[], 0));
        assert!(!breakdown_balances(&[], 100));
    }

    #[test]
    fn line_category_round_trips_snake_case() {
        let json = serde_json::to_value(LineCategory::VueloIda).unwrap();
        assert_eq!(json, serde_json::json!("vuelo_ida"));
        let parsed: LineCategory = serde_json::from_value(serde_json::json!("descuento")).unwrap();
        assert_eq!(parsed, LineCategory::Descuento);
        let unknown: LineCategory = serde_json::from_value(serde_json::json!("tasa")).unwrap();
        assert_eq!(unknown, LineCategory::Otro);
    }

    #[test]
    fn checkin_codes_accept_all_documented_shapes() {
        assert_eq!(parse_checkin_code("RES-6").reservation_id, Some(6));
        assert_eq!(parse_checkin_code("res6").reservation_id, Some(6));
        assert_eq!(parse_checkin_code("#6").reservation_id, Some(6));
        assert_eq!(parse_checkin_code("6").reservation_id, Some(6));
        assert_eq!(parse_checkin_code(" res-42 ").raw, "RES-42");
    }

    #[test]
    fn alphanumeric_codes_keep_only_the_full_form() {
        let code = parse_checkin_code("RES241129MPZR");
        assert_eq!(code.reservation_id, None);
        assert_eq!(code.raw, "RES241129MPZR");
    }

    #[test]
    fn checkin_window_boundaries() {
        let dep = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let before_26h = dep - chrono::Duration::hours(26);
        let before_2h = dep - chrono::Duration::hours(2);
        let after = dep + chrono::Duration::hours(1);
        assert_eq!(checkin_window(dep, before_26h), CheckinEligibility::NotYetOpen { hours_left: 26 });
        assert_eq!(checkin_window(dep, before_2h), CheckinEligibility::Open { hours_left: 2 });
        assert_eq!(checkin_window(dep, after), CheckinEligibility::Departed);
    }
}
