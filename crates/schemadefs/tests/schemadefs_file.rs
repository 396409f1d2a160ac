use schemadefs::{DdlGenerator, SchemaCatalog};
use std::path::Path;

#[test]
fn every_table_generates() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../covid_hosp_schemadefs.yaml");
    let catalog = SchemaCatalog::from_path(&path).unwrap();
    assert_eq!(
        catalog.table_ids().collect::<Vec<_>>(),
        vec!["state_timeseries", "state_daily", "covid_hosp_facility"]
    );

    let generator = DdlGenerator::default();
    for (id, schema) in catalog.tables() {
        let table = generator.table_statement(schema).unwrap();
        assert_eq!(table.column_names().len(), schema.ordered_columns.len() + 2, "{id}");

        let aggregate = generator.aggregate_statement(schema).unwrap();
        assert_eq!(
            aggregate.column_names().len(),
            schema.aggregate_key_columns.len() + 1,
            "{id}"
        );
    }

    let facility = generator
        .aggregate_statement(catalog.table("covid_hosp_facility").unwrap())
        .unwrap();
    assert_eq!(facility.table_name, "covid_hosp_facility_key");
    assert_eq!(facility.index("hospital_pk").unwrap().columns, vec!["hospital_pk"]);
    assert!(facility.index("ccn").is_some());
}
