//! Mapping of upstream column labels to SQL identifiers.

use crate::error::NameTooLong;

/// Longest column name accepted by the database.
pub const MAX_SQL_NAME_LENGTH: usize = 64;

/// Rewrites applied to every name, in order.
const ALWAYS: [(&str, &str); 2] = [("-", "_"), ("+", "plus")];

/// Abbreviations tried in order, each at most once, only while the name is too long.
const ABBREVIATIONS: [(&str, &str); 5] = [
    ("_and_", "_"),
    ("hospitalized", "hosp"),
    ("vaccinated", "vaccd"),
    ("7_day", "7d"),
    ("coverage", "cov"),
];

fn length(name: &str) -> usize {
    name.chars().count()
}

/// Applies the unconditional rewrites (`-` to `_`, `+` to `plus`).
pub fn sanitize(raw_name: &str) -> String {
    ALWAYS
        .iter()
        .fold(raw_name.to_string(), |name, (from, to)| name.replace(from, to))
}

/// Shortens `name` with the known abbreviations until it fits.
pub fn shorten(name: &str) -> Result<String, NameTooLong> {
    let mut shortened = name.to_string();
    for (from, to) in ABBREVIATIONS {
        if length(&shortened) <= MAX_SQL_NAME_LENGTH {
            break;
        }
        shortened = shortened.replace(from, to);
    }
    let shortened_length = length(&shortened);
    if shortened_length > MAX_SQL_NAME_LENGTH {
        return Err(NameTooLong {
            name: shortened,
            length: shortened_length,
            maximum: MAX_SQL_NAME_LENGTH,
        });
    }
    Ok(shortened)
}

/// Maps an upstream column label to a valid SQL column name of at most
/// [`MAX_SQL_NAME_LENGTH`] characters.
pub fn normalize(raw_name: &str) -> Result<String, NameTooLong> {
    let name = sanitize(raw_name);
    if length(&name) > MAX_SQL_NAME_LENGTH {
        shorten(&name)
    } else {
        Ok(name)
    }
}

#[cfg(test)]
mod test {
    use super::{normalize, sanitize, MAX_SQL_NAME_LENGTH};
    use proptest::prelude::*;

    #[test]
    fn always_applied_rewrites() {
        assert_eq!(
            normalize("previous_day_admission_adult_covid_confirmed_18-19").unwrap(),
            "previous_day_admission_adult_covid_confirmed_18_19"
        );
        assert_eq!(
            normalize("previous_day_admission_adult_covid_confirmed_80+").unwrap(),
            "previous_day_admission_adult_covid_confirmed_80plus"
        );
        // Short names keep their abbreviable words.
        assert_eq!(
            normalize("total_patients_hospitalized_and_vaccinated").unwrap(),
            "total_patients_hospitalized_and_vaccinated"
        );
    }

    #[test]
    fn stops_after_first_sufficient_abbreviation() {
        let raw = "previous_day_admission_adult_covid_confirmed_and_suspected_7_day_sum";
        assert_eq!(raw.len(), 68);
        assert_eq!(
            normalize(raw).unwrap(),
            "previous_day_admission_adult_covid_confirmed_suspected_7_day_sum"
        );
    }

    #[test]
    fn abbreviations_apply_in_order() {
        let raw = "total_adult_patients_hospitalized_confirmed_and_suspected_covid_7_day_coverage";
        // `_and_`, then `hospitalized`, then `vaccinated` (no match) then `7_day`.
        assert_eq!(
            normalize(raw).unwrap(),
            "total_adult_patients_hosp_confirmed_suspected_covid_7d_coverage"
        );
    }

    #[test]
    fn needs_every_abbreviation() {
        let raw = "vaccination_status_and_hospitalized_coverage_7_day_rolling_average_extended_field";
        assert_eq!(raw.len(), 81);
        assert_eq!(
            normalize(raw).unwrap(),
            "vaccination_status_hosp_cov_7d_rolling_average_extended_field"
        );
    }

    #[test]
    fn exhausted_abbreviations() {
        let raw = "number_of_inpatient_beds_occupied_by_adult_patients_hospitalized_with_influenza";
        let err = normalize(raw).unwrap_err();
        assert_eq!(
            err.name,
            "number_of_inpatient_beds_occupied_by_adult_patients_hosp_with_influenza"
        );
        assert_eq!(err.length, 71);
        assert_eq!(err.maximum, MAX_SQL_NAME_LENGTH);
    }

    proptest! {
        #[test]
        fn output_is_bounded(raw in "[a-z0-9_+-]{0,100}") {
            if let Ok(name) = normalize(&raw) {
                prop_assert!(name.chars().count() <= MAX_SQL_NAME_LENGTH);
                prop_assert!(!name.contains('-') && !name.contains('+'));
            }
        }

        #[test]
        fn idempotent_on_short_names(raw in "[a-z0-9_+-]{0,64}") {
            prop_assume!(sanitize(&raw).len() <= MAX_SQL_NAME_LENGTH);
            let once = normalize(&raw).unwrap();
            prop_assert_eq!(normalize(&once).unwrap(), once);
        }
    }
}
