use stmtkit::prelude::*;
use stmtkit::{DbSetting, Dialect, ORDER_COLUMN, OrderField};

fn fields(names: &[&str]) -> FieldSet {
    FieldSet::parse(names.iter().copied()).unwrap()
}

fn person() -> DbFieldCollection {
    DbFieldCollection::new(vec![
        DbField::new("Id").primary().identity(),
        DbField::new("Name"),
        DbField::new("Address"),
    ])
}

#[test]
fn query_with_top_and_hints() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let sql = builder
        .create_query(
            &QueryRequest::new("Person", &fields)
                .with_order_by(&order)
                .with_top(10)
                .with_hints("WITH (NOLOCK)"),
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT TOP (10) [Id], [Name] FROM [Person] WITH (NOLOCK) ORDER BY [Id] ASC;"
    );
}

#[test]
fn batch_query_uses_offset_fetch() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let sql = builder
        .create_batch_query(&BatchQueryRequest::new("Person", &fields, 2, 10, &order))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT [Id], [Name] FROM [Person] ORDER BY [Id] ASC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY;"
    );
}

#[test]
fn skip_query_falls_back_to_row_number() {
    let dialect = Dialect::sql_server().with_setting(DbSetting::sql_server().with_offset_fetch(false));
    let builder = StatementBuilder::new(dialect);
    let fields = fields(&["Id", "Name"]);
    let order = [OrderField::asc("Id").unwrap()];
    let sql = builder
        .create_skip_query(&SkipQueryRequest::new("Person", &fields, 20, 10, &order))
        .unwrap();
    assert_eq!(
        sql,
        "WITH CTE AS (SELECT ROW_NUMBER() OVER (ORDER BY [Id] ASC) AS [RowNumber], [Id], [Name] \
         FROM [Person]) SELECT [Id], [Name] FROM CTE WHERE ([RowNumber] BETWEEN 21 AND 30) \
         ORDER BY [Id] ASC;"
    );
}

#[test]
fn count_exists_and_aggregates() {
    let builder = StatementBuilder::sql_server();
    assert_eq!(
        builder.create_count_all("Person", Some("WITH (NOLOCK)")).unwrap(),
        "SELECT COUNT_BIG(1) AS [CountValue] FROM [Person] WITH (NOLOCK);"
    );

    let filter = QueryGroup::from(QueryField::eq("Id", 1).unwrap());
    assert_eq!(
        builder
            .create_exists(&FilterRequest::new("Person").with_filter(&filter))
            .unwrap(),
        "SELECT TOP (1) 1 AS [ExistsValue] FROM [Person] WHERE ([Id] = @Id);"
    );

    let age = Field::new("Age").unwrap();
    assert_eq!(
        builder.create_average_all("Person", &age, None).unwrap(),
        "SELECT AVG(CAST([Age] AS FLOAT)) AS [AverageValue] FROM [Person];"
    );

    let young = QueryGroup::from(QueryField::lt("Age", 30).unwrap());
    assert_eq!(
        builder
            .create_max(&AggregateRequest::new("Person", &age).with_filter(&young))
            .unwrap(),
        "SELECT MAX([Age]) AS [MaxValue] FROM [Person] WHERE ([Age] < @Age);"
    );
    assert_eq!(
        builder.create_min_all("Person", &age, None).unwrap(),
        "SELECT MIN([Age]) AS [MinValue] FROM [Person];"
    );
}

#[test]
fn insert_outputs_identity() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name", "Address"]);
    let db_fields = person();
    let sql = builder
        .create_insert(&InsertRequest::new("Person", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name], [Address]) OUTPUT INSERTED.[Id] VALUES (@Name, @Address);"
    );
}

#[test]
fn small_insert_all_uses_multi_row_values() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_insert_all(&InsertRequest::new("Person", &fields, &db_fields).with_batch_size(3))
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO [Person] ([Name]) OUTPUT INSERTED.[Id] VALUES (@Name), (@Name_1), (@Name_2);"
    );
}

#[test]
fn large_insert_all_switches_to_merge() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_insert_all(&InsertRequest::new("Person", &fields, &db_fields).with_batch_size(4))
        .unwrap();
    assert_eq!(
        sql,
        "MERGE [Person] AS T USING (VALUES (@Name, 0), (@Name_1, 1), (@Name_2, 2), (@Name_3, 3)) \
         AS S ([Name], [__RepoDb_OrderColumn]) ON 1=0 WHEN NOT MATCHED THEN INSERT ([Name]) \
         VALUES (S.[Name]) OUTPUT INSERTED.[Id], S.[__RepoDb_OrderColumn];"
    );
}

#[test]
fn merge_threshold_is_configurable() {
    let builder = StatementBuilder::sql_server()
        .with_options(StatementOptions::new().with_merge_insert_threshold(10));
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_insert_all(&InsertRequest::new("Person", &fields, &db_fields).with_batch_size(4))
        .unwrap();
    assert!(sql.starts_with("INSERT INTO [Person] ([Name]) OUTPUT INSERTED.[Id] VALUES"));
    assert!(!sql.contains(ORDER_COLUMN));
}

#[test]
fn identity_insert_is_wrapped() {
    let builder = StatementBuilder::sql_server()
        .with_options(StatementOptions::new().with_identity_insert(true));
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_insert(&InsertRequest::new("Person", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "BEGIN TRY SET IDENTITY_INSERT [Person] ON; END TRY BEGIN CATCH END CATCH; \
         INSERT INTO [Person] ([Id], [Name]) OUTPUT INSERTED.[Id] VALUES (@Id, @Name); \
         BEGIN TRY SET IDENTITY_INSERT [Person] OFF; END TRY BEGIN CATCH END CATCH;"
    );
}

#[test]
fn merge_single_row() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_merge(&MergeRequest::new("Person", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "MERGE [Person] AS T USING (VALUES (@Id, @Name)) AS S ([Id], [Name]) \
         ON (T.[Id] = S.[Id] OR (T.[Id] IS NULL AND S.[Id] IS NULL)) \
         WHEN NOT MATCHED THEN INSERT ([Name]) VALUES (S.[Name]) \
         WHEN MATCHED THEN UPDATE SET T.[Name] = S.[Name] OUTPUT INSERTED.[Id];"
    );
}

#[test]
fn merge_with_identity_insert() {
    let builder = StatementBuilder::sql_server()
        .with_options(StatementOptions::new().with_identity_insert(true));
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_merge(&MergeRequest::new("Person", &fields, &db_fields))
        .unwrap();
    assert_eq!(
        sql,
        "BEGIN TRY SET IDENTITY_INSERT [Person] ON; END TRY BEGIN CATCH END CATCH; \
         MERGE [Person] AS T USING (VALUES (@Id, @Name)) AS S ([Id], [Name]) \
         ON (T.[Id] = S.[Id] OR (T.[Id] IS NULL AND S.[Id] IS NULL)) \
         WHEN NOT MATCHED THEN INSERT ([Id], [Name]) VALUES (S.[Id], S.[Name]) \
         WHEN MATCHED THEN UPDATE SET T.[Name] = S.[Name] OUTPUT INSERTED.[Id]; \
         BEGIN TRY SET IDENTITY_INSERT [Person] OFF; END TRY BEGIN CATCH END CATCH;"
    );
}

#[test]
fn long_in_list_exceeds_parameter_limit() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let filter = QueryGroup::from(QueryField::in_list("Id", 0..3000_i64).unwrap());

    let err = builder
        .create_query(&QueryRequest::new("Person", &fields).with_filter(&filter))
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::ParameterLimitExceeded { count: 3000, max: 2100 }
    ));
    assert!(builder
        .create_count(&FilterRequest::new("Person").with_filter(&filter))
        .is_err());
    assert!(builder
        .create_delete(&FilterRequest::new("Person").with_filter(&filter))
        .is_err());

    let order = [OrderField::asc("Id").unwrap()];
    let err = builder
        .create_batch_query(
            &BatchQueryRequest::new("Person", &fields, 0, 10, &order).with_filter(&filter),
        )
        .unwrap_err();
    assert!(matches!(err, StatementError::ParameterLimitExceeded { .. }));

    let db_fields = person();
    let update_filter = QueryGroup::from(QueryField::in_list("Id", 0..2100_i64).unwrap());
    let err = builder
        .create_update(
            &UpdateRequest::new("Person", &fields, &db_fields).with_filter(&update_filter),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        StatementError::ParameterLimitExceeded { count: 2101, max: 2100 }
    ));
}

#[test]
fn merge_all_carries_order_column() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name", "Address"]);
    let qualifiers = FieldSet::parse(["Name"]).unwrap();
    let db_fields = person();
    let sql = builder
        .create_merge_all(
            &MergeRequest::new("Person", &fields, &db_fields)
                .with_qualifiers(&qualifiers)
                .with_batch_size(5),
        )
        .unwrap();

    assert!(sql.starts_with(
        "MERGE [Person] AS T USING (VALUES (@Id, @Name, @Address, 0), (@Id_1, @Name_1, @Address_1, 1), "
    ));
    assert!(sql.contains("(@Id_4, @Name_4, @Address_4, 4)) AS S ([Id], [Name], [Address], [__RepoDb_OrderColumn])"));
    assert!(sql.contains("ON (T.[Name] = S.[Name] OR (T.[Name] IS NULL AND S.[Name] IS NULL))"));
    assert!(sql.contains("WHEN NOT MATCHED THEN INSERT ([Name], [Address]) VALUES (S.[Name], S.[Address])"));
    assert!(sql.contains("WHEN MATCHED THEN UPDATE SET T.[Address] = S.[Address]"));
    assert!(sql.ends_with("OUTPUT INSERTED.[Id], S.[__RepoDb_OrderColumn];"));
}

#[test]
fn merge_all_with_hints() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name"]);
    let db_fields = person();
    let sql = builder
        .create_merge_all(
            &MergeRequest::new("Person", &fields, &db_fields)
                .with_batch_size(2)
                .with_hints("WITH (HOLDLOCK)"),
        )
        .unwrap();
    assert!(sql.starts_with("MERGE [Person] WITH (HOLDLOCK) AS T USING"));
}

#[test]
fn update_all_batches() {
    let builder = StatementBuilder::sql_server();
    let fields = fields(&["Id", "Name", "Address"]);
    let db_fields = person();
    let sql = builder
        .create_update_all(&UpdateRequest::new("Person", &fields, &db_fields).with_batch_size(2))
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE [Person] SET [Name] = @Name, [Address] = @Address WHERE ([Id] = @Id); \
         UPDATE [Person] SET [Name] = @Name_1, [Address] = @Address_1 WHERE ([Id] = @Id_1);"
    );
}

#[test]
fn delete_with_null_not_equal() {
    let builder = StatementBuilder::sql_server()
        .with_options(StatementOptions::new().with_null_semantics(NullSemantics::NullNotEqual));
    let filter = QueryGroup::from(QueryField::ne("Name", "Ada").unwrap());
    let sql = builder
        .create_delete(&FilterRequest::new("Person").with_filter(&filter))
        .unwrap();
    assert_eq!(
        sql,
        "DELETE FROM [Person] WHERE (([Name] <> @Name OR [Name] IS NULL));"
    );
}

#[test]
fn truncate_schema_table() {
    let builder = StatementBuilder::sql_server();
    assert_eq!(
        builder.create_truncate("dbo.Person").unwrap(),
        "TRUNCATE TABLE [dbo].[Person];"
    );
}
