use rand::Rng;

use crate::seat::{seat_attributes, SeatId, SeatKind, SeatMapEntry};

pub const SEAT_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];
pub const DEFAULT_ROWS: u32 = 30;
pub const PREMIUM_ROWS: u32 = 3;

/// A seat slot produced by the plan, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSeat {
    pub number: String,
    pub cabin: PlannedCabin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedCabin {
    Premium,
    Economy,
}

/// Produces the seat layout for a trip whose inventory is empty.
/// Pluggable so the back-office layout source can replace the default.
pub trait SeatPlanner: Send + Sync {
    fn plan(&self, capacity: Option<u32>) -> Vec<PlannedSeat>;
}

/// Default layout: six-abreast rows derived from equipment capacity
/// (30 rows when unknown), the first three rows premium cabin.
pub struct RowBlockPlanner;

impl SeatPlanner for RowBlockPlanner {
    fn plan(&self, capacity: Option<u32>) -> Vec<PlannedSeat> {
        let rows = capacity
            .map(|c| c.div_ceil(SEAT_LETTERS.len() as u32))
            .filter(|r| *r > 0)
            .unwrap_or(DEFAULT_ROWS)
            .min(60);

        let mut seats = Vec::with_capacity((rows as usize) * SEAT_LETTERS.len());
        for row in 1..=rows {
            for letter in SEAT_LETTERS {
                seats.push(PlannedSeat {
                    number: format!("{row}{letter}"),
                    cabin: if row <= PREMIUM_ROWS {
                        PlannedCabin::Premium
                    } else {
                        PlannedCabin::Economy
                    },
                });
            }
        }
        seats
    }
}

/// Seat map for a `mock-` demo trip: full default layout, roughly 70%
/// of seats available, never persisted.
pub fn mock_seat_map() -> Vec<SeatMapEntry> {
    let mut rng = rand::thread_rng();
    let mut entries = Vec::with_capacity((DEFAULT_ROWS as usize) * SEAT_LETTERS.len());
    for row in 1..=DEFAULT_ROWS {
        for letter in SEAT_LETTERS {
            let number = format!("{row}{letter}");
            let (kind, features) = match seat_attributes(&number) {
                Some(a) => (a.kind, a.features),
                None => (SeatKind::Estandar, vec![]),
            };
            let premium = row <= PREMIUM_ROWS;
            entries.push(SeatMapEntry {
                id: SeatId::Mock(format!("mock-{number}")),
                available: rng.gen_bool(0.7) as u8,
                number,
                kind,
                surcharge: kind.surcharge(),
                features,
                row,
                letter: letter.to_string(),
                cabin_name: if premium { "Premium" } else { "Economy" }.to_string(),
                cabin_id: if premium { 1 } else { 2 },
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_covers_capacity_with_six_abreast_rows() {
        let seats = RowBlockPlanner.plan(Some(180));
        assert_eq!(seats.len(), 180);
        assert_eq!(seats[0].number, "1A");
        assert_eq!(seats.last().unwrap().number, "30F");
        assert_eq!(seats.iter().filter(|s| s.cabin == PlannedCabin::Premium).count(), 18);
    }

    #[test]
    fn partial_last_row_rounds_up() {
        let seats = RowBlockPlanner.plan(Some(20));
        assert_eq!(seats.len(), 24);
    }

    #[test]
    fn unknown_capacity_falls_back_to_default_layout() {
        let seats = RowBlockPlanner.plan(None);
        assert_eq!(seats.len(), 180);
    }

    #[test]
    fn plan_is_deterministic() {
        assert_eq!(RowBlockPlanner.plan(Some(90)), RowBlockPlanner.plan(Some(90)));
    }

    #[test]
    fn mock_map_never_references_storage_ids() {
        let entries = mock_seat_map();
        assert_eq!(entries.len(), 180);
        for entry in &entries {
            match &entry.id {
                SeatId::Mock(id) => assert!(id.starts_with("mock-")),
                SeatId::Db(_) => panic!("mock seat map must not carry storage ids"),
            }
        }
        assert!(entries.iter().take(18).all(|e| e.cabin_name == "Premium"));
    }
}
