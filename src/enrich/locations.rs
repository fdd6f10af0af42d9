use crate::models::{Location, PersonRecord};

const FACT_TYPE_PREFIX: &str = "http://gedcomx.org/";
const PLACE_DELIMITER: &str = ", ";
const UNITED_STATES: &str = "United States";
const UNKNOWN: &str = "Unknown";

const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// One location per fact that carries an original place string, in fact order.
pub fn classify_locations(person: &PersonRecord) -> Vec<Location> {
    person
        .facts
        .iter()
        .filter_map(|fact| {
            let place = fact
                .place
                .as_ref()?
                .original
                .as_deref()
                .filter(|p| !p.is_empty())?;
            let parts: Vec<&str> = place.split(PLACE_DELIMITER).collect();
            Some(Location {
                location_type: fact
                    .fact_type
                    .strip_prefix(FACT_TYPE_PREFIX)
                    .unwrap_or(&fact.fact_type)
                    .to_string(),
                place: place.to_string(),
                country: classify_country(&parts),
                date: fact
                    .date
                    .as_ref()
                    .and_then(|d| d.original.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            })
        })
        .collect()
}

/// Country for a place already split on `", "`.
///
/// Anything ending in the US (by name, `USA`, or a state in either of the last two
/// parts) is "United States"; otherwise the last part is taken verbatim.
pub fn classify_country(parts: &[&str]) -> String {
    let [.., second_last, last] = parts else {
        return UNKNOWN.to_string();
    };

    let is_us = *last == UNITED_STATES
        || *last == "USA"
        || US_STATES.contains(last)
        || US_STATES.contains(second_last)
        || last.contains(UNITED_STATES);

    if is_us {
        UNITED_STATES.to_string()
    } else {
        last.to_string()
    }
}

// ── Tests ──
