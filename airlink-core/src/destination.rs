/// A search destination as typed by the client: either an IATA-like
/// terminal code or a free-form city name that still needs resolution
/// against the terminal directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationQuery {
    Code(String),
    City(String),
}

/// Canonicalize the raw `destino` parameter before any query runs.
/// Up to three characters is a terminal code; anything longer is a city
/// name resolved by substring match, first hit wins.
pub fn canonical_destination(input: &str) -> DestinationQuery {
    let trimmed = input.trim();
    if trimmed.chars().count() > 3 {
        DestinationQuery::City(trimmed.to_string())
    } else {
        DestinationQuery::Code(trimmed.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_letter_input_is_a_code() {
        assert_eq!(
            canonical_destination("LIM"),
            DestinationQuery::Code("LIM".to_string())
        );
        assert_eq!(
            canonical_destination("pmc"),
            DestinationQuery::Code("PMC".to_string())
        );
    }

    #[test]
    fn longer_input_is_a_city_query() {
        assert_eq!(
            canonical_destination("Puerto Montt"),
            DestinationQuery::City("Puerto Montt".to_string())
        );
        assert_eq!(
            canonical_destination("  Lima  "),
            DestinationQuery::City("Lima".to_string())
        );
    }
}
