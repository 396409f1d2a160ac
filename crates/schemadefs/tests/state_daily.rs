use pretty_assertions::assert_eq;
use schemadefs::{
    generate_aggregate_statement, generate_table_statement, DriftReport, SchemaCatalog,
    UpstreamMetadata,
};
use serde_json::json;
use std::collections::BTreeSet;

const SCHEMADEFS: &str = r#"
state_daily:
  TABLE_NAME: covid_hosp_state_daily
  AGGREGATE_TABLE_NAME: covid_hosp_state_daily_latest
  METADATA_ID: 6xf2-c3ie
  KEY_COLS: [state, date]
  AGGREGATE_KEY_COLS: [state, date]
  UNIQUE_INDEXES:
    state_and_date: [state, date]
  INDEXES:
    state: [state]
    beds: [inpatient_beds]
  ORDERED_CSV_COLUMNS:
    - [state, null, str]
    - [reporting_cutoff_start, date, intdate]
    - [inpatient_beds, null, int]
    - [inpatient_beds_utilization, null, float]
"#;

#[test]
fn generate_both_statements() {
    let catalog = SchemaCatalog::from_yaml_str(SCHEMADEFS).unwrap();
    let schema = catalog.table("state_daily").unwrap();

    let table = generate_table_statement(schema).unwrap();
    assert_eq!(
        table,
        "CREATE TABLE `covid_hosp_state_daily` (
  `id` INT NOT NULL AUTO_INCREMENT,
  `issue` INT NOT NULL,
  `state` VARCHAR(255) NOT NULL,
  `date` INT(11) NOT NULL,
  `inpatient_beds` INT(11),
  `inpatient_beds_utilization` DOUBLE,
  PRIMARY KEY (`id`),
  UNIQUE KEY `state_and_date` (`state`, `date`),
  KEY `state` (`state`),
  KEY `beds` (`inpatient_beds`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8;"
    );

    let aggregate = generate_aggregate_statement(schema).unwrap();
    assert_eq!(
        aggregate,
        "CREATE TABLE `covid_hosp_state_daily_latest` (
  `id` INT NOT NULL AUTO_INCREMENT,
  `state` VARCHAR(255) NOT NULL,
  `date` INT(11) NOT NULL,
  PRIMARY KEY (`id`),
  UNIQUE KEY `state_and_date` (`state`, `date`),
  KEY `state` (`state`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8;"
    );

    // Identical inputs give identical statements.
    assert_eq!(generate_table_statement(schema).unwrap(), table);
    assert_eq!(generate_aggregate_statement(schema).unwrap(), aggregate);
}

#[test]
fn detect_new_upstream_columns() {
    let catalog = SchemaCatalog::from_yaml_str(SCHEMADEFS).unwrap();
    let schema = catalog.table("state_daily").unwrap();
    let metadata: UpstreamMetadata = serde_json::from_value(json!({
        "columns": [
            { "name": "state", "dataTypeName": "text",
              "cachedContents": { "cardinality": "56", "smallest": "AK", "largest": "WY" } },
            { "name": "date", "dataTypeName": "calendar_date" },
            { "name": "inpatient_beds", "dataTypeName": "number" },
            { "name": "inpatient_beds_utilization", "dataTypeName": "number" },
            { "name": "geocoded_state", "dataTypeName": "point" },
            { "name": "critical_staffing_shortage_today_yes", "dataTypeName": "number",
              "cachedContents": { "smallest": "0", "largest": "153" } },
            { "name": "inpatient_beds_utilization_numerator", "dataTypeName": "number",
              "cachedContents": { "smallest": "0.0", "largest": "1532.5" } },
            { "name": "previous_day_admission_adult_covid_confirmed_80+", "dataTypeName": "number",
              "cachedContents": { "smallest": "0", "largest": "91" } },
            { "name": ":@computed_region_bxsw_vy29", "dataTypeName": "number",
              "computationStrategy": { "type": "georegion_match_on_point" } }
        ]
    }))
    .unwrap();

    let report = DriftReport::detect(schema, &metadata.columns);
    let proposed: BTreeSet<_> = report
        .columns()
        .iter()
        .map(|c| (c.upstream_name.as_str(), c.sql_name.as_str(), c.column_type()))
        .collect();
    assert_eq!(
        proposed,
        BTreeSet::from([
            ("geocoded_state", "geocoded_state", Some("VARCHAR(32)".to_string())),
            (
                "critical_staffing_shortage_today_yes",
                "critical_staffing_shortage_today_yes",
                Some("INT".to_string())
            ),
            (
                "inpatient_beds_utilization_numerator",
                "inpatient_beds_utilization_numerator",
                Some("DOUBLE".to_string())
            ),
            (
                "previous_day_admission_adult_covid_confirmed_80+",
                "previous_day_admission_adult_covid_confirmed_80plus",
                Some("INT".to_string())
            ),
        ])
    );
    assert_eq!(report.uninferred_count(), 0);
    assert_eq!(DriftReport::detect(schema, &metadata.columns), report);
}
