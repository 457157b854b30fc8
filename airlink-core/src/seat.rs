use serde::{Deserialize, Serialize};

pub const MOCK_TRIP_PREFIX: &str = "mock-";

/// Seat identifier on the wire: numeric for persisted seats, a
/// `mock-`-prefixed string for generated demo seats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeatId {
    Db(i64),
    Mock(String),
}

/// A seat row as persisted, before surcharge decoration.
#[derive(Debug, Clone)]
pub struct SeatRecord {
    pub id: i64,
    pub number: String,
    pub available: bool,
    pub cabin_name: String,
    pub cabin_id: i64,
}

/// A seat chosen for reservation, with its extra charge.
#[derive(Debug, Clone)]
pub struct SeatPick {
    pub seat_id: i64,
    pub extra_charge: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeatKind {
    Premium,
    Confort,
    SalidaEmergencia,
    PrimeraFila,
    Estandar,
}

impl SeatKind {
    pub fn surcharge(self) -> i64 {
        match self {
            SeatKind::Premium => 25000,
            SeatKind::Confort => 15000,
            SeatKind::SalidaEmergencia => 12000,
            SeatKind::PrimeraFila => 10000,
            SeatKind::Estandar => 8000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeatAttributes {
    pub row: u32,
    pub letter: char,
    pub kind: SeatKind,
    pub features: Vec<String>,
}

/// Derive seat type, surcharge tier and display features from a seat
/// number of the shape `<row><letter>` (e.g. `12C`). Rows 1-3 premium,
/// 4-7 comfort, 10/20 emergency exit, 8 front row, otherwise standard;
/// letters A/F window, C/D aisle, anything else middle.
pub fn seat_attributes(number: &str) -> Option<SeatAttributes> {
    let digits: String = number.chars().take_while(|c| c.is_ascii_digit()).collect();
    let row: u32 = digits.parse().ok()?;
    let letter = number.chars().find(|c| ('A'..='F').contains(c))?;

    let (kind, mut features) = match row {
        1..=3 => (
            SeatKind::Premium,
            vec!["Primera Clase", "Espacio Extra", "Servicio Premium"],
        ),
        4..=7 => (SeatKind::Confort, vec!["Confort+", "Más Espacio"]),
        10 | 20 => (
            SeatKind::SalidaEmergencia,
            vec!["Salida de Emergencia", "Espacio Extra para Piernas"],
        ),
        8 => (SeatKind::PrimeraFila, vec!["Primera Fila", "Sin asiento adelante"]),
        _ => (SeatKind::Estandar, vec![]),
    };

    features.push(match letter {
        'A' | 'F' => "Ventana",
        'C' | 'D' => "Pasillo",
        _ => "Centro",
    });

    Some(SeatAttributes {
        row,
        letter,
        kind,
        features: features.into_iter().map(String::from).collect(),
    })
}

/// One element of the seat-map response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapEntry {
    #[serde(rename = "idAsiento")]
    pub id: SeatId,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "disponible")]
    pub available: u8,
    #[serde(rename = "tipo")]
    pub kind: SeatKind,
    #[serde(rename = "precio")]
    pub surcharge: i64,
    #[serde(rename = "caracteristicas")]
    pub features: Vec<String>,
    #[serde(rename = "fila")]
    pub row: u32,
    #[serde(rename = "letra")]
    pub letter: String,
    #[serde(rename = "clase")]
    pub cabin_name: String,
    #[serde(rename = "idCabinaClase")]
    pub cabin_id: i64,
}

/// Decorate persisted seat rows with derived attributes and order them
/// by row then letter. Seat numbers outside the `<row><letter>` shape
/// keep standard pricing and sort first.
pub fn decorate(records: Vec<SeatRecord>) -> Vec<SeatMapEntry> {
    let mut entries: Vec<SeatMapEntry> = records
        .into_iter()
        .map(|rec| {
            let attrs = seat_attributes(&rec.number);
            let (row, letter, kind, features) = match attrs {
                Some(a) => (a.row, a.letter.to_string(), a.kind, a.features),
                None => (0, String::new(), SeatKind::Estandar, vec![]),
            };
            SeatMapEntry {
                id: SeatId::Db(rec.id),
                number: rec.number,
                available: rec.available as u8,
                kind,
                surcharge: kind.surcharge(),
                features,
                row,
                letter,
                cabin_name: rec.cabin_name,
                cabin_id: rec.cabin_id,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.row.cmp(&b.row).then(a.letter.cmp(&b.letter)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_rows_carry_the_premium_surcharge() {
        let attrs = seat_attributes("2A").unwrap();
        assert_eq!(attrs.kind, SeatKind::Premium);
        assert_eq!(attrs.kind.surcharge(), 25000);
        assert!(attrs.features.iter().any(|f| f == "Ventana"));
    }

    #[test]
    fn emergency_exit_rows_are_flagged() {
        for number in ["10C", "20D"] {
            let attrs = seat_attributes(number).unwrap();
            assert_eq!(attrs.kind, SeatKind::SalidaEmergencia);
            assert!(attrs.features.iter().any(|f| f == "Pasillo"));
        }
    }

    #[test]
    fn standard_middle_seat() {
        let attrs = seat_attributes("14B").unwrap();
        assert_eq!(attrs.kind, SeatKind::Estandar);
        assert_eq!(attrs.kind.surcharge(), 8000);
        assert_eq!(attrs.features, vec!["Centro".to_string()]);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(seat_attributes("XX").is_none());
        assert!(seat_attributes("12").is_none());
    }

    #[test]
    fn decorate_orders_by_row_then_letter() {
        let records = vec![
            SeatRecord { id: 3, number: "10A".into(), available: true, cabin_name: "Economy".into(), cabin_id: 2 },
            SeatRecord { id: 1, number: "2B".into(), available: false, cabin_name: "Premium".into(), cabin_id: 1 },
            SeatRecord { id: 2, number: "2A".into(), available: true, cabin_name: "Premium".into(), cabin_id: 1 },
        ];
        let entries = decorate(records);
        let numbers: Vec<&str> = entries.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, vec!["2A", "2B", "10A"]);
        assert_eq!(entries[1].available, 0);
        assert_eq!(entries[0].id, SeatId::Db(2));
    }

    #[test]
    fn seat_id_serializes_untagged() {
        let db = serde_json::to_value(SeatId::Db(42)).unwrap();
        assert_eq!(db, serde_json::json!(42));
        let mock = serde_json::to_value(SeatId::Mock("mock-1A".into())).unwrap();
        assert_eq!(mock, serde_json::json!("mock-1A"));
    }
}
