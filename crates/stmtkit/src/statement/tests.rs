use super::*;
use crate::condition::{QueryField, QueryGroup};
use crate::db_field::{DbField, DbFieldCollection};
use crate::error::{ErrorKind, StatementError};
use crate::field::{FieldSet, OrderField};

fn person() -> DbFieldCollection {
    DbFieldCollection::new(vec![
        DbField::new("Id").primary().identity(),
        DbField::new("Name"),
        DbField::new("Address"),
        DbField::new("FullName").generated(),
    ])
}

fn fields(names: &[&str]) -> FieldSet {
    FieldSet::parse(names.iter().copied()).unwrap()
}

#[test]
fn blank_table_is_rejected() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id"]);
    let err = builder
        .create_query(&QueryRequest::new("  ", &fields))
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::InvalidArgument {
            argument: "table",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn empty_fields_are_rejected() {
    let builder = StatementBuilder::postgres();
    let empty = FieldSet::new();
    let err = builder
        .create_query(&QueryRequest::new("Person", &empty))
        .unwrap_err();
    assert!(matches!(err, StatementError::MissingFields(_)));
    assert_eq!(err.kind(), ErrorKind::MissingInput);
}

#[test]
fn zero_top_is_out_of_range() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id"]);
    let err = builder
        .create_query(&QueryRequest::new("Person", &fields).with_top(0))
        .unwrap_err();
    assert!(err.is_out_of_range());
}

#[test]
fn paging_arguments_are_checked() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];

    let err = builder
        .create_batch_query(&BatchQueryRequest::new("Person", &fields, -1, 10, &order))
        .unwrap_err();
    assert!(matches!(err, StatementError::OutOfRange { argument: "page", .. }));

    let err = builder
        .create_skip_query(&SkipQueryRequest::new("Person", &fields, 0, 0, &order))
        .unwrap_err();
    assert!(matches!(err, StatementError::OutOfRange { argument: "take", .. }));

    let err = builder
        .create_skip_query(&SkipQueryRequest::new("Person", &fields, -5, 10, &order))
        .unwrap_err();
    assert!(matches!(err, StatementError::OutOfRange { argument: "skip", .. }));

    let err = builder
        .create_skip_query(&SkipQueryRequest::new("Person", &fields, 0, 10, &[]))
        .unwrap_err();
    assert!(err.is_empty());
}

#[test]
fn page_overflow_is_out_of_range() {
    let builder = StatementBuilder::postgres();
    let fields = fields(&["Id"]);
    let order = [OrderField::asc("Id").unwrap()];
    let err = builder
        .create_batch_query(&BatchQueryRequest::new(
            "Person",
            &fields,
            i64::MAX,
            2,
            &order,
        ))
        .unwrap_err();
    assert!(err.is_out_of_range());
}

#[test]
fn zero_batch_size_is_out_of_range() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Name"]);
    let err = builder
        .create_insert_all(&InsertRequest::new("Person", &fields, &db).with_batch_size(0))
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::OutOfRange {
            argument: "batch_size",
            ..
        }
    ));
}

#[test]
fn merge_without_primary_key_needs_qualifiers() {
    let builder = StatementBuilder::sql_server();
    let db = DbFieldCollection::new(vec![DbField::new("Name"), DbField::new("Address")]);
    let fields = fields(&["Name", "Address"]);

    let err = builder
        .create_merge(&MergeRequest::new("Person", &fields, &db))
        .unwrap_err();
    assert!(matches!(err, StatementError::PrimaryFieldNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

    let qualifiers = FieldSet::parse(["Name"]).unwrap();
    assert!(
        builder
            .create_merge(&MergeRequest::new("Person", &fields, &db).with_qualifiers(&qualifiers))
            .is_ok()
    );
}

#[test]
fn qualifiers_must_be_among_fields() {
    let builder = StatementBuilder::postgres();
    let db = person();
    let fields = fields(&["Id", "Name"]);
    let qualifiers = FieldSet::parse(["Email"]).unwrap();
    let err = builder
        .create_merge(&MergeRequest::new("Person", &fields, &db).with_qualifiers(&qualifiers))
        .unwrap_err();
    assert!(matches!(err, StatementError::InvalidQualifiers(_)));
}

#[test]
fn defaulted_qualifiers_must_be_among_fields() {
    let builder = StatementBuilder::mysql();
    let db = person();
    let fields = fields(&["Name", "Address"]);
    let err = builder
        .create_update_all(&UpdateRequest::new("Person", &fields, &db))
        .unwrap_err();
    assert!(matches!(err, StatementError::PrimaryFieldNotFound(_)));
}

#[test]
fn update_without_updatable_fields() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Id", "FullName"]);
    let err = builder
        .create_update(&UpdateRequest::new("Person", &fields, &db))
        .unwrap_err();
    assert!(matches!(err, StatementError::MissingFields(_)));
}

#[test]
fn insert_requires_non_identity_primary() {
    let builder = StatementBuilder::postgres();
    let db = DbFieldCollection::new(vec![DbField::new("Code").primary(), DbField::new("Name")]);
    let fields = fields(&["Name"]);
    let err = builder
        .create_insert(&InsertRequest::new("Product", &fields, &db))
        .unwrap_err();
    assert!(matches!(err, StatementError::PrimaryFieldNotFound(_)));

    let db = DbFieldCollection::new(vec![
        DbField::new("Code").primary().with_default(),
        DbField::new("Name"),
    ]);
    assert_eq!(
        builder
            .create_insert(&InsertRequest::new("Product", &fields, &db))
            .unwrap(),
        r#"INSERT INTO "Product" ("Name") VALUES (@Name) RETURNING "Code";"#
    );
}

#[test]
fn parameter_limit_is_enforced() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Name", "Address"]);
    let err = builder
        .create_insert_all(&InsertRequest::new("Person", &fields, &db).with_batch_size(1100))
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::ParameterLimitExceeded {
            count: 2200,
            max: 2100
        }
    ));
}

#[test]
fn generated_columns_are_never_written() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Name", "FullName"]);
    let sql = builder
        .create_insert(&InsertRequest::new("Person", &fields, &db))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name]) OUTPUT INSERTED.[Id] VALUES (@Name);"
    );

    let filter = QueryGroup::from(QueryField::eq("Id", 1).unwrap());
    let sql = builder
        .create_update(&UpdateRequest::new("Person", &fields, &db).with_filter(&filter))
        .unwrap();
    assert_eq!(sql, "UPDATE [Person] SET [Name] = @Name WHERE ([Id] = @_Id);");
}

#[test]
fn no_update_fields_are_excluded() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Id", "Name", "Address"]);
    let keep = FieldSet::parse(["Address"]).unwrap();
    let sql = builder
        .create_update_all(&UpdateRequest::new("Person", &fields, &db).with_no_update_fields(&keep))
        .unwrap();
    assert_eq!(sql, "UPDATE [Person] SET [Name] = @Name WHERE ([Id] = @Id);");
}

#[test]
fn output_is_deterministic() {
    let builder = StatementBuilder::sql_server();
    let db = person();
    let fields = fields(&["Id", "Name", "Address"]);
    let request = MergeRequest::new("Person", &fields, &db).with_batch_size(4);
    let first = builder.create_merge_all(&request).unwrap();
    let second = builder.create_merge_all(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn statement_kind_display() {
    assert_eq!(StatementKind::MergeAll.to_string(), "MergeAll");
    assert_eq!(StatementKind::Truncate.as_str(), "Truncate");
}
