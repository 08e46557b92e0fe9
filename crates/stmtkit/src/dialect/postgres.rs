//! PostgreSQL: `LIMIT .. OFFSET`, `RETURNING` and `ON CONFLICT`.

use super::{DialectHooks, ORDER_COLUMN, RowLimit, assignments, insert_into, values_row};
use crate::dialect::Dialect;
use crate::query_builder::QueryBuilder;
use crate::setting::{DbSetting, StatementOptions};
use crate::statement::resolve::{InsertPlan, KeyColumn, MergePlan};
use crate::statement::select::PageRequest;

pub(super) fn dialect() -> Dialect {
    Dialect {
        name: "PostgreSql",
        setting: DbSetting::postgres(),
        row_limit: RowLimit::Limit,
        count_expression: "COUNT(*)",
        truncate_suffix: Some("RESTART IDENTITY"),
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
    qb.select()
        .fields_from(page.fields, setting)
        .from()
        .table_name_from(&page.table, setting)
        .where_from(page.filter, setting, options.null_semantics, "")
        .order_by_from(page.order_by, setting)
        .write_text(&format!("LIMIT {} OFFSET {}", page.take, page.skip))
        .end();
    qb.build()
}

/// `RETURNING "k", ..[, n AS "__RepoDb_OrderColumn"]`
fn returning(qb: &mut QueryBuilder, keys: &[KeyColumn], order: Option<usize>, setting: &DbSetting) {
    if keys.is_empty() {
        return;
    }
    qb.write_text("RETURNING")
        .fields_from(keys.iter().map(|k| &k.field), setting);
    if let Some(index) = order {
        qb.comma().write_text(&index.to_string()).as_(ORDER_COLUMN, setting);
    }
}

fn insert(dialect: &Dialect, plan: &InsertPlan<'_>, _options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let mut qb = QueryBuilder::new();

    // Multi-row RETURNING gives no ordering guarantee, so each row is its
    // own statement tagged with its batch index.
    for index in 0..plan.batch_size {
        insert_into(&mut qb, &plan.table, None, &plan.columns, setting);
        if plan.columns.is_empty() {
            qb.write_text("DEFAULT VALUES");
        } else {
            if plan.identity_insert {
                qb.write_text("OVERRIDING SYSTEM VALUE");
            }
            values_row(&mut qb, &plan.columns, index, setting);
        }
        let order = (plan.batch_size > 1).then_some(index);
        returning(&mut qb, &plan.keys, order, setting);
        qb.end();
    }
    qb.build()
}

fn merge(dialect: &Dialect, plan: &MergePlan<'_>, _options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let columns = plan.columns_with_qualified_identity();
    let overriding = plan
        .identity
        .as_ref()
        .is_some_and(|id| columns.contains(id.name()));
    let mut qb = QueryBuilder::new();

    for index in 0..plan.batch_size {
        insert_into(&mut qb, &plan.table, None, &columns, setting);
        if overriding {
            qb.write_text("OVERRIDING SYSTEM VALUE");
        }
        values_row(&mut qb, &columns, index, setting);

        qb.write_text("ON CONFLICT")
            .open_paren()
            .fields_from(&plan.qualifiers, setting)
            .close_paren();
        if plan.updates.is_empty() {
            qb.write_text("DO NOTHING");
        } else {
            let set = assignments(&plan.updates, |f| {
                let u = f.to_quoted(setting);
                format!("{u} = EXCLUDED.{u}")
            });
            qb.write_text("DO UPDATE SET").write_text(&set);
        }

        let order = (plan.batch_size > 1).then_some(index);
        returning(&mut qb, &plan.keys, order, setting);
        qb.end();
    }
    qb.build()
}
