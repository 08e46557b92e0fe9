//! Microsoft SQL Server: `TOP`, `OFFSET .. FETCH`, `OUTPUT INSERTED` and `MERGE`.

use super::{
    DialectHooks, ORDER_COLUMN, RowLimit, assignments, insert_into, source_row,
};
use crate::dialect::Dialect;
use crate::field::FieldSet;
use crate::ident::Ident;
use crate::query_builder::QueryBuilder;
use crate::setting::{DbSetting, StatementOptions};
use crate::statement::resolve::{InsertPlan, KeyColumn, MergePlan};
use crate::statement::select::PageRequest;

pub(super) fn dialect() -> Dialect {
    Dialect {
        name: "SqlServer",
        setting: DbSetting::sql_server(),
        row_limit: RowLimit::Top,
        count_expression: "COUNT_BIG(1)",
        truncate_suffix: None,
        hooks: DialectHooks {
            paging,
            insert,
            merge,
        },
    }
}

fn paging(dialect: &Dialect, page: &PageRequest<'_>, options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let mut qb = QueryBuilder::new();

    if setting.use_offset_fetch {
        qb.select()
            .fields_from(page.fields, setting)
            .from()
            .table_name_from(&page.table, setting)
            .hints_from(page.hints)
            .where_from(page.filter, setting, options.null_semantics, "")
            .order_by_from(page.order_by, setting)
            .write_text(&format!(
                "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                page.skip, page.take
            ))
            .end();
        return qb.build();
    }

    // ROW_NUMBER() window for servers without OFFSET .. FETCH.
    let row_number = {
        let mut quoted = QueryBuilder::new();
        quoted.write_quoted("RowNumber", setting);
        quoted.build()
    };
    qb.write_text("WITH CTE AS")
        .open_paren()
        .select()
        .write_text("ROW_NUMBER() OVER")
        .open_paren()
        .order_by_from(page.order_by, setting)
        .close_paren()
        .as_("RowNumber", setting)
        .comma()
        .fields_from(page.fields, setting)
        .from()
        .table_name_from(&page.table, setting)
        .hints_from(page.hints)
        .where_from(page.filter, setting, options.null_semantics, "")
        .close_paren()
        .select()
        .fields_from(page.fields, setting)
        .from()
        .write_text("CTE")
        .write_text(&format!(
            "WHERE ({row_number} BETWEEN {} AND {})",
            page.skip.saturating_add(1),
            page.skip.saturating_add(page.take)
        ))
        .order_by_from(page.order_by, setting)
        .end();
    qb.build()
}

/// `SET IDENTITY_INSERT tbl ON|OFF` in an empty TRY/CATCH so a failed toggle
/// does not abort the batch.
fn identity_insert_toggle(qb: &mut QueryBuilder, table: &Ident, on: bool, setting: &DbSetting) {
    qb.write_text("BEGIN TRY SET IDENTITY_INSERT")
        .table_name_from(table, setting)
        .write_text(if on { "ON" } else { "OFF" })
        .end()
        .write_text("END TRY BEGIN CATCH END CATCH")
        .end();
}

/// `OUTPUT INSERTED.[k], .. [, S.[__RepoDb_OrderColumn]]`
fn output(qb: &mut QueryBuilder, keys: &[KeyColumn], with_order: bool, setting: &DbSetting) {
    if keys.is_empty() {
        return;
    }
    let mut columns: Vec<String> = keys
        .iter()
        .map(|k| format!("INSERTED.{}", k.field.to_quoted(setting)))
        .collect();
    if with_order {
        let mut order = QueryBuilder::new();
        order.write_quoted(ORDER_COLUMN, setting);
        columns.push(format!("S.{}", order.as_str()));
    }
    qb.write_text("OUTPUT").write_text(&columns.join(", "));
}

/// `MERGE tbl [hints] AS T USING (VALUES (..), ..) AS S (cols[, order])`
fn merge_source(
    qb: &mut QueryBuilder,
    table: &Ident,
    hints: Option<&str>,
    columns: &FieldSet,
    batch_size: usize,
    with_order: bool,
    setting: &DbSetting,
) {
    qb.write_text("MERGE")
        .table_name_from(table, setting)
        .hints_from(hints)
        .write_text("AS T USING")
        .open_paren()
        .values();
    for index in 0..batch_size {
        if index > 0 {
            qb.comma();
        }
        source_row(qb, columns, index, with_order, setting);
    }
    qb.close_paren()
        .write_text("AS S")
        .open_paren()
        .fields_from(columns, setting);
    if with_order {
        qb.comma().write_quoted(ORDER_COLUMN, setting);
    }
    qb.close_paren();
}

/// `WHEN NOT MATCHED THEN INSERT (cols) VALUES (S.cols)`
fn merge_insert_branch(qb: &mut QueryBuilder, columns: &FieldSet, setting: &DbSetting) {
    qb.write_text("WHEN NOT MATCHED THEN INSERT");
    if columns.is_empty() {
        qb.write_text("DEFAULT VALUES");
        return;
    }
    qb.open_paren()
        .fields_from(columns, setting)
        .close_paren()
        .values()
        .open_paren()
        .aliased_fields_from(columns, "S", setting)
        .close_paren();
}

fn insert(dialect: &Dialect, plan: &InsertPlan<'_>, options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let mut qb = QueryBuilder::new();

    if plan.identity_insert {
        identity_insert_toggle(&mut qb, &plan.table, true, setting);
    }

    if plan.columns.is_empty() {
        for _ in 0..plan.batch_size {
            insert_into(&mut qb, &plan.table, plan.hints, &plan.columns, setting);
            output(&mut qb, &plan.keys, false, setting);
            qb.write_text("DEFAULT VALUES").end();
        }
    } else if plan.batch_size > options.merge_insert_threshold {
        tracing::trace!(
            target: "stmtkit.sql",
            table = plan.table.name(),
            batch_size = plan.batch_size,
            threshold = options.merge_insert_threshold,
            "insert-all rendered as MERGE to keep output rows in input order"
        );
        merge_source(
            &mut qb,
            &plan.table,
            plan.hints,
            &plan.columns,
            plan.batch_size,
            true,
            setting,
        );
        qb.write_text("ON 1=0");
        merge_insert_branch(&mut qb, &plan.columns, setting);
        output(&mut qb, &plan.keys, true, setting);
        qb.end();
    } else {
        insert_into(&mut qb, &plan.table, plan.hints, &plan.columns, setting);
        output(&mut qb, &plan.keys, false, setting);
        qb.values();
        for index in 0..plan.batch_size {
            if index > 0 {
                qb.comma();
            }
            qb.open_paren()
                .parameters_from(&plan.columns, index, setting)
                .close_paren();
        }
        qb.end();
    }

    if plan.identity_insert {
        identity_insert_toggle(&mut qb, &plan.table, false, setting);
    }
    qb.build()
}

fn merge(dialect: &Dialect, plan: &MergePlan<'_>, _options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let with_order = plan.batch_size > 1 && !plan.keys.is_empty();
    let mut qb = QueryBuilder::new();

    if plan.identity_insert {
        identity_insert_toggle(&mut qb, &plan.table, true, setting);
    }

    merge_source(
        &mut qb,
        &plan.table,
        plan.hints,
        &plan.source,
        plan.batch_size,
        with_order,
        setting,
    );

    let on = plan
        .qualifiers
        .iter()
        .map(|q| {
            let q = q.to_quoted(setting);
            format!("(T.{q} = S.{q} OR (T.{q} IS NULL AND S.{q} IS NULL))")
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    qb.write_text("ON").write_text(&on);

    merge_insert_branch(&mut qb, &plan.columns, setting);

    if !plan.updates.is_empty() {
        let set = assignments(&plan.updates, |f| {
            let u = f.to_quoted(setting);
            format!("T.{u} = S.{u}")
        });
        qb.write_text("WHEN MATCHED THEN UPDATE SET").write_text(&set);
    }

    output(&mut qb, &plan.keys, with_order, setting);
    qb.end();

    if plan.identity_insert {
        identity_insert_toggle(&mut qb, &plan.table, false, setting);
    }
    qb.build()
}
