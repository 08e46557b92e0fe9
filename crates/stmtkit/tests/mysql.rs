use stmtkit::prelude::*;
use stmtkit::{ErrorKind, OrderField};

fn fields(names: &[&str]) -> FieldSet {
    FieldSet::parse(names.iter().copied()).unwrap()
}

fn identity_table() -> DbFieldCollection {
    DbFieldCollection::new(vec![
        DbField::new("Id").primary().identity(),
        DbField::new("Name"),
        DbField::new("Address"),
    ])
}

#[test]
fn batch_query_first_page() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let sql = builder
        .create_batch_query(&BatchQueryRequest::new("Table", &fields, 0, 10, &order))
        .unwrap();
    assert_eq!(sql, "SELECT `Id`, `Name` FROM `Table` ORDER BY `Id` ASC LIMIT 10;");
}

#[test]
fn batch_query_later_page_skips_rows() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let sql = builder
        .create_batch_query(&BatchQueryRequest::new("Table", &fields, 3, 10, &order))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT `Id`, `Name` FROM `Table` ORDER BY `Id` ASC LIMIT 30, 10;"
    );
}

#[test]
fn count_without_filter() {
    let builder = StatementBuilder::mysql();
    let sql = builder.create_count(&FilterRequest::new("Table")).unwrap();
    assert_eq!(sql, "SELECT COUNT(*) AS `CountValue` FROM `Table`;");
}

#[test]
fn insert_reads_back_identity() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name", "Address"]);
    let db_fields = identity_table();
    let sql = builder
        .create_insert(&InsertRequest::new("Table", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Table` (`Name`, `Address`) VALUES (@Name, @Address); \
         SELECT LAST_INSERT_ID() AS `Id`;"
    );
}

#[test]
fn batch_query_errors() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];

    let err = builder
        .create_batch_query(&BatchQueryRequest::new("Table", &fields, 0, 10, &[]))
        .unwrap_err();
    assert!(matches!(err, StatementError::Empty(_)));
    assert_eq!(err.kind(), ErrorKind::MissingInput);

    let err = builder
        .create_batch_query(&BatchQueryRequest::new("Table", &fields, 0, -1, &order))
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::OutOfRange {
            argument: "rows_per_batch",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = builder
        .create_batch_query(
            &BatchQueryRequest::new("Table", &fields, 0, 10, &order).with_hints("WITH (NOLOCK)"),
        )
        .unwrap_err();
    assert!(err.is_not_supported());
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn insert_all_tags_each_row() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name", "Address"]);
    let db_fields = identity_table();
    let sql = builder
        .create_insert_all(&InsertRequest::new("Table", &fields, &db_fields).with_batch_size(2))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Table` (`Name`, `Address`) VALUES (@Name, @Address); \
         SELECT LAST_INSERT_ID() AS `Id`, 0 AS `__RepoDb_OrderColumn`; \
         INSERT INTO `Table` (`Name`, `Address`) VALUES (@Name_1, @Address_1); \
         SELECT LAST_INSERT_ID() AS `Id`, 1 AS `__RepoDb_OrderColumn`;"
    );
}

#[test]
fn insert_with_supplied_key_selects_parameter() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Code", "Name"]);
    let db_fields = DbFieldCollection::new(vec![DbField::new("Code").primary()]);
    let sql = builder
        .create_insert(&InsertRequest::new("Country", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Country` (`Code`, `Name`) VALUES (@Code, @Name); SELECT @Code AS `Code`;"
    );
}

#[test]
fn insert_without_writable_columns() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id"]);
    let db_fields = identity_table();
    let sql = builder
        .create_insert(&InsertRequest::new("Table", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Table` VALUES (); SELECT LAST_INSERT_ID() AS `Id`;"
    );
}

#[test]
fn merge_on_identity_qualifier() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name", "Address"]);
    let db_fields = identity_table();
    let sql = builder
        .create_merge(&MergeRequest::new("Table", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Table` (`Id`, `Name`, `Address`) VALUES (@Id, @Name, @Address) \
         ON DUPLICATE KEY UPDATE `Id` = LAST_INSERT_ID(`Id`), `Name` = @Name, `Address` = @Address; \
         SELECT COALESCE(@Id, LAST_INSERT_ID()) AS `Id`;"
    );
}

#[test]
fn merge_all_on_identity_tags_each_row() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let db_fields = identity_table();
    let sql = builder
        .create_merge_all(&MergeRequest::new("Table", &fields, &db_fields).with_batch_size(3))
        .unwrap();

    let rows: Vec<String> = (0..3)
        .map(|n| {
            let suffix = if n == 0 { String::new() } else { format!("_{n}") };
            format!(
                "INSERT INTO `Table` (`Id`, `Name`) VALUES (@Id{suffix}, @Name{suffix}) \
                 ON DUPLICATE KEY UPDATE `Id` = LAST_INSERT_ID(`Id`), `Name` = @Name{suffix}; \
                 SELECT COALESCE(@Id{suffix}, LAST_INSERT_ID()) AS `Id`, {n} AS `__RepoDb_OrderColumn`;"
            )
        })
        .collect();
    assert_eq!(sql, rows.join(" "));
}

#[test]
fn merge_without_updatable_columns_assigns_qualifier() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Code"]);
    let db_fields = DbFieldCollection::new(vec![DbField::new("Code").primary()]);
    let sql = builder
        .create_merge(&MergeRequest::new("Country", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `Country` (`Code`) VALUES (@Code) ON DUPLICATE KEY UPDATE `Code` = `Code`; \
         SELECT @Code AS `Code`;"
    );
}

#[test]
fn skip_query_limits() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id"]);
    let order = [OrderField::desc("Id").unwrap()];

    let sql = builder
        .create_skip_query(&SkipQueryRequest::new("Table", &fields, 0, 5, &order))
        .unwrap();
    assert_eq!(sql, "SELECT `Id` FROM `Table` ORDER BY `Id` DESC LIMIT 5;");

    let sql = builder
        .create_skip_query(&SkipQueryRequest::new("Table", &fields, 15, 5, &order))
        .unwrap();
    assert_eq!(sql, "SELECT `Id` FROM `Table` ORDER BY `Id` DESC LIMIT 15, 5;");
}

#[test]
fn query_with_filter_and_top() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let filter = QueryGroup::from(QueryField::eq("Name", "Ada").unwrap());
    let sql = builder
        .create_query(
            &QueryRequest::new("Table", &fields)
                .with_filter(&filter)
                .with_order_by(&order)
                .with_top(5),
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT `Id`, `Name` FROM `Table` WHERE (`Name` = @Name) ORDER BY `Id` ASC LIMIT 5;"
    );
}

#[test]
fn exists_and_aggregates() {
    let builder = StatementBuilder::mysql();
    let filter = QueryGroup::from(QueryField::eq("Id", 1).unwrap());
    let sql = builder
        .create_exists(&FilterRequest::new("Table").with_filter(&filter))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT 1 AS `ExistsValue` FROM `Table` WHERE (`Id` = @Id) LIMIT 1;"
    );

    let value = Field::new("Value").unwrap();
    let sql = builder.create_average_all("Table", &value, None).unwrap();
    assert_eq!(sql, "SELECT AVG(`Value`) AS `AverageValue` FROM `Table`;");

    let sql = builder.create_sum_all("Table", &value, None).unwrap();
    assert_eq!(sql, "SELECT SUM(`Value`) AS `SumValue` FROM `Table`;");
}

#[test]
fn update_all_matches_on_primary_key() {
    let builder = StatementBuilder::mysql();
    let fields = fields(&["Id", "Name"]);
    let db_fields = identity_table();
    let sql = builder
        .create_update_all(&UpdateRequest::new("Table", &fields, &db_fields).with_batch_size(2))
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE `Table` SET `Name` = @Name WHERE (`Id` = @Id); \
         UPDATE `Table` SET `Name` = @Name_1 WHERE (`Id` = @Id_1);"
    );
}

#[test]
fn truncate_and_delete_all() {
    let builder = StatementBuilder::mysql();
    assert_eq!(
        builder.create_truncate("Table").unwrap(),
        "TRUNCATE TABLE `Table`;"
    );
    assert_eq!(
        builder.create_delete_all("Table", None).unwrap(),
        "DELETE FROM `Table`;"
    );
}
