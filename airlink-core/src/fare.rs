use serde::{Deserialize, Serialize};

/// A priced fare offered on a specific trip, joined to its fare
/// definition and cabin class. `refundable` stays numeric (0/1) on the
/// wire, matching what the fare-selector client expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareOffer {
    #[serde(rename = "idViajeTarifa")]
    pub trip_fare_id: i64,
    #[serde(rename = "idTarifa")]
    pub fare_id: i64,
    #[serde(rename = "codigoTarifa")]
    pub code: String,
    #[serde(rename = "nombreTarifa")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: i64,
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "cupos")]
    pub quota: i64,
    #[serde(rename = "equipaje_incl_kg")]
    pub baggage_kg: Option<i64>,
    #[serde(rename = "cambios")]
    pub changes: Option<String>,
    #[serde(rename = "reembolsable")]
    pub refundable: u8,
    #[serde(rename = "condiciones")]
    pub conditions: Option<String>,
    #[serde(rename = "nombreCabinaClase")]
    pub cabin_name: String,
    #[serde(rename = "descripcionCabina")]
    pub cabin_description: Option<String>,
}
