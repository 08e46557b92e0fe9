//! Query, paging, count, exists and aggregate statements.

use super::request::{
    AggregateRequest, BatchQueryRequest, FilterRequest, QueryRequest, SkipQueryRequest,
};
use super::resolve::{check_fields, check_filter, check_hints, table_name};
use super::{StatementBuilder, StatementKind};
use crate::condition::QueryGroup;
use crate::dialect::RowLimit;
use crate::error::{StatementError, StatementResult};
use crate::field::{Field, FieldSet, OrderField};
use crate::ident::Ident;
use crate::query_builder::QueryBuilder;

/// A validated page of rows, handed to the dialect's paging hook.
#[derive(Debug, Clone)]
pub(crate) struct PageRequest<'a> {
    pub table: Ident,
    pub fields: &'a FieldSet,
    pub filter: Option<&'a QueryGroup>,
    pub order_by: &'a [OrderField],
    pub hints: Option<&'a str>,
    pub skip: i64,
    pub take: i64,
}

#[derive(Debug, Clone, Copy)]
enum Aggregate {
    Max,
    Min,
    Sum,
    Average,
}

impl Aggregate {
    fn function(self) -> &'static str {
        match self {
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Sum => "SUM",
            Aggregate::Average => "AVG",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Aggregate::Max => "MaxValue",
            Aggregate::Min => "MinValue",
            Aggregate::Sum => "SumValue",
            Aggregate::Average => "AverageValue",
        }
    }
}

impl StatementBuilder {
    /// `SELECT` with optional filter, ordering and row limit.
    pub fn create_query(&self, request: &QueryRequest<'_>) -> StatementResult<String> {
        let table = table_name(request.table)?;
        check_fields(request.fields)?;
        check_hints(&self.dialect, request.hints)?;
        if request.top == Some(0) {
            return Err(StatementError::out_of_range("top", "top must be at least 1"));
        }
        let setting = self.dialect.setting();
        check_filter(setting, request.filter, "", 0)?;

        let row_limit = self.dialect.row_limit();
        let mut qb = QueryBuilder::new();
        qb.select();
        if let (Some(top), RowLimit::Top) = (request.top, row_limit) {
            qb.write_text(&format!("TOP ({top})"));
        }
        qb.fields_from(request.fields, setting)
            .from()
            .table_name_from(&table, setting)
            .hints_from(request.hints)
            .where_from(request.filter, setting, self.options.null_semantics, "")
            .order_by_from(request.order_by, setting);
        if let (Some(top), RowLimit::Limit) = (request.top, row_limit) {
            qb.write_text(&format!("LIMIT {top}"));
        }
        qb.end();

        self.finish(StatementKind::Query, qb.build())
    }

    /// Page `page` of `rows_per_batch` rows.
    pub fn create_batch_query(&self, request: &BatchQueryRequest<'_>) -> StatementResult<String> {
        if request.page < 0 {
            return Err(StatementError::out_of_range(
                "page",
                format!("page must be 0 or greater, got {}", request.page),
            ));
        }
        if request.rows_per_batch < 1 {
            return Err(StatementError::out_of_range(
                "rows_per_batch",
                format!(
                    "rows per batch must be at least 1, got {}",
                    request.rows_per_batch
                ),
            ));
        }
        let skip = request
            .page
            .checked_mul(request.rows_per_batch)
            .ok_or_else(|| {
                StatementError::out_of_range("page", "page × rows per batch overflows")
            })?;

        let page = self.page_request(
            request.table,
            request.fields,
            request.filter,
            request.order_by,
            request.hints,
            skip,
            request.rows_per_batch,
        )?;
        let sql = (self.dialect.hooks().paging)(&self.dialect, &page, &self.options);
        self.finish(StatementKind::BatchQuery, sql)
    }

    /// Skip `skip` rows and return at most `take`.
    pub fn create_skip_query(&self, request: &SkipQueryRequest<'_>) -> StatementResult<String> {
        if request.skip < 0 {
            return Err(StatementError::out_of_range(
                "skip",
                format!("skip must be 0 or greater, got {}", request.skip),
            ));
        }
        if request.take < 1 {
            return Err(StatementError::out_of_range(
                "take",
                format!("take must be at least 1, got {}", request.take),
            ));
        }

        let page = self.page_request(
            request.table,
            request.fields,
            request.filter,
            request.order_by,
            request.hints,
            request.skip,
            request.take,
        )?;
        let sql = (self.dialect.hooks().paging)(&self.dialect, &page, &self.options);
        self.finish(StatementKind::SkipQuery, sql)
    }

    #[allow(clippy::too_many_arguments)]
    fn page_request<'a>(
        &self,
        table: &str,
        fields: &'a FieldSet,
        filter: Option<&'a QueryGroup>,
        order_by: &'a [OrderField],
        hints: Option<&'a str>,
        skip: i64,
        take: i64,
    ) -> StatementResult<PageRequest<'a>> {
        let table = table_name(table)?;
        check_fields(fields)?;
        check_hints(&self.dialect, hints)?;
        if order_by.is_empty() {
            return Err(StatementError::empty(
                "the order fields are required for paged queries",
            ));
        }
        if skip.checked_add(take).is_none() {
            return Err(StatementError::out_of_range("take", "skip + take overflows"));
        }
        check_filter(self.dialect.setting(), filter, "", 0)?;
        Ok(PageRequest {
            table,
            fields,
            filter,
            order_by,
            hints,
            skip,
            take,
        })
    }

    /// `SELECT COUNT(..) AS CountValue` over the filtered rows.
    pub fn create_count(&self, request: &FilterRequest<'_>) -> StatementResult<String> {
        let sql = self.scalar(
            self.dialect.count_expression(),
            "CountValue",
            None,
            request,
        )?;
        self.finish(StatementKind::Count, sql)
    }

    /// `SELECT COUNT(..) AS CountValue` over every row.
    pub fn create_count_all(&self, table: &str, hints: Option<&str>) -> StatementResult<String> {
        let request = FilterRequest {
            table,
            filter: None,
            hints,
        };
        let sql = self.scalar(
            self.dialect.count_expression(),
            "CountValue",
            None,
            &request,
        )?;
        self.finish(StatementKind::CountAll, sql)
    }

    /// `SELECT 1 AS ExistsValue` limited to one row.
    pub fn create_exists(&self, request: &FilterRequest<'_>) -> StatementResult<String> {
        let sql = self.scalar("1", "ExistsValue", Some(1), request)?;
        self.finish(StatementKind::Exists, sql)
    }

    pub fn create_max(&self, request: &AggregateRequest<'_>) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Max, request)?;
        self.finish(StatementKind::Max, sql)
    }

    pub fn create_max_all(
        &self,
        table: &str,
        field: &Field,
        hints: Option<&str>,
    ) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Max, &all_rows(table, field, hints))?;
        self.finish(StatementKind::MaxAll, sql)
    }

    pub fn create_min(&self, request: &AggregateRequest<'_>) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Min, request)?;
        self.finish(StatementKind::Min, sql)
    }

    pub fn create_min_all(
        &self,
        table: &str,
        field: &Field,
        hints: Option<&str>,
    ) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Min, &all_rows(table, field, hints))?;
        self.finish(StatementKind::MinAll, sql)
    }

    pub fn create_sum(&self, request: &AggregateRequest<'_>) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Sum, request)?;
        self.finish(StatementKind::Sum, sql)
    }

    pub fn create_sum_all(
        &self,
        table: &str,
        field: &Field,
        hints: Option<&str>,
    ) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Sum, &all_rows(table, field, hints))?;
        self.finish(StatementKind::SumAll, sql)
    }

    /// `AVG`, cast to the dialect's floating type when it has one.
    pub fn create_average(&self, request: &AggregateRequest<'_>) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Average, request)?;
        self.finish(StatementKind::Average, sql)
    }

    pub fn create_average_all(
        &self,
        table: &str,
        field: &Field,
        hints: Option<&str>,
    ) -> StatementResult<String> {
        let sql = self.aggregate(Aggregate::Average, &all_rows(table, field, hints))?;
        self.finish(StatementKind::AverageAll, sql)
    }

    fn aggregate(
        &self,
        aggregate: Aggregate,
        request: &AggregateRequest<'_>,
    ) -> StatementResult<String> {
        let setting = self.dialect.setting();
        let column = request.field.to_quoted(setting);
        let expression = match (aggregate, setting.average_conversion_type.as_deref()) {
            (Aggregate::Average, Some(ty)) => format!("AVG(CAST({column} AS {ty}))"),
            _ => format!("{}({column})", aggregate.function()),
        };
        let filter = FilterRequest {
            table: request.table,
            filter: request.filter,
            hints: request.hints,
        };
        self.scalar(&expression, aggregate.alias(), None, &filter)
    }

    /// `SELECT <expression> AS <alias> FROM tbl [hints] [WHERE ..]` with an
    /// optional row limit.
    fn scalar(
        &self,
        expression: &str,
        alias: &str,
        limit: Option<u64>,
        request: &FilterRequest<'_>,
    ) -> StatementResult<String> {
        let table = table_name(request.table)?;
        check_hints(&self.dialect, request.hints)?;
        let setting = self.dialect.setting();
        check_filter(setting, request.filter, "", 0)?;

        let row_limit = self.dialect.row_limit();
        let mut qb = QueryBuilder::new();
        qb.select();
        if let (Some(n), RowLimit::Top) = (limit, row_limit) {
            qb.write_text(&format!("TOP ({n})"));
        }
        qb.write_text(expression)
            .as_(alias, setting)
            .from()
            .table_name_from(&table, setting)
            .hints_from(request.hints)
            .where_from(request.filter, setting, self.options.null_semantics, "");
        if let (Some(n), RowLimit::Limit) = (limit, row_limit) {
            qb.write_text(&format!("LIMIT {n}"));
        }
        qb.end();
        Ok(qb.build())
    }
}

fn all_rows<'a>(table: &'a str, field: &'a Field, hints: Option<&'a str>) -> AggregateRequest<'a> {
    AggregateRequest {
        table,
        field,
        filter: None,
        hints,
    }
}
