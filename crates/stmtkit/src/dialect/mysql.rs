//! MySQL and MariaDB: `LIMIT s, r`, `ON DUPLICATE KEY UPDATE` and
//! `LAST_INSERT_ID()`.

use super::{
    DialectHooks, ORDER_COLUMN, RowLimit, insert_into, key_parameter, values_row,
};
use crate::dialect::Dialect;
use crate::query_builder::{QueryBuilder, parameter_name};
use crate::setting::{DbSetting, StatementOptions};
use crate::statement::resolve::{InsertPlan, KeyColumn, KeySource, MergePlan};
use crate::statement::select::PageRequest;

pub(super) fn dialect() -> Dialect {
    Dialect {
        name: "MySql",
        setting: DbSetting::mysql(),
        row_limit: RowLimit::Limit,
        count_expression: "COUNT(*)",
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
    let limit = if page.skip == 0 {
        format!("LIMIT {}", page.take)
    } else {
        format!("LIMIT {}, {}", page.skip, page.take)
    };
    let mut qb = QueryBuilder::new();
    qb.select()
        .fields_from(page.fields, setting)
        .from()
        .table_name_from(&page.table, setting)
        .where_from(page.filter, setting, options.null_semantics, "")
        .order_by_from(page.order_by, setting)
        .write_text(&limit)
        .end();
    qb.build()
}

/// Trailing `SELECT` reporting the keys of batch row `index`.
///
/// Identity keys read `LAST_INSERT_ID()`, supplied keys echo their own
/// parameter. An identity that is matched on may be supplied or generated,
/// so it reads `COALESCE(@Id, LAST_INSERT_ID())`. Keys filled by a server default cannot be read back and are
/// left out; nothing is emitted when no key remains.
fn select_keys(
    qb: &mut QueryBuilder,
    keys: &[KeyColumn],
    index: usize,
    with_order: bool,
    setting: &DbSetting,
) {
    let mut items: Vec<String> = Vec::with_capacity(keys.len() + 1);
    for key in keys {
        let value = match key.source {
            KeySource::Identity => "LAST_INSERT_ID()".to_string(),
            KeySource::Supplied => key_parameter(key, index, setting),
            KeySource::SuppliedOrIdentity => {
                format!("COALESCE({}, LAST_INSERT_ID())", key_parameter(key, index, setting))
            }
            KeySource::Server => continue,
        };
        items.push(format!("{value} AS {}", key.field.to_quoted(setting)));
    }
    if items.is_empty() {
        return;
    }
    if with_order {
        let mut alias = QueryBuilder::new();
        alias.write_quoted(ORDER_COLUMN, setting);
        items.push(format!("{index} AS {}", alias.as_str()));
    }
    qb.select().write_text(&items.join(", ")).end();
}

fn insert(dialect: &Dialect, plan: &InsertPlan<'_>, _options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let with_order = plan.batch_size > 1;
    let mut qb = QueryBuilder::new();

    for index in 0..plan.batch_size {
        insert_into(&mut qb, &plan.table, None, &plan.columns, setting);
        values_row(&mut qb, &plan.columns, index, setting);
        qb.end();
        select_keys(&mut qb, &plan.keys, index, with_order, setting);
    }
    qb.build()
}

fn merge(dialect: &Dialect, plan: &MergePlan<'_>, _options: &StatementOptions) -> String {
    let setting = dialect.setting();
    let with_order = plan.batch_size > 1;
    let columns = plan.columns_with_qualified_identity();
    let mut qb = QueryBuilder::new();

    for index in 0..plan.batch_size {
        insert_into(&mut qb, &plan.table, None, &columns, setting);
        values_row(&mut qb, &columns, index, setting);

        let mut set: Vec<String> = Vec::with_capacity(plan.updates.len() + 1);
        if let Some(identity) = plan.identity.as_ref().filter(|_| plan.identity_is_qualifier()) {
            let id = identity.to_quoted(setting);
            set.push(format!("{id} = LAST_INSERT_ID({id})"));
        }
        for field in &plan.updates {
            set.push(format!(
                "{} = {}",
                field.to_quoted(setting),
                parameter_name(field.name(), index, setting)
            ));
        }
        if set.is_empty() {
            // ON DUPLICATE KEY UPDATE needs at least one assignment.
            if let Some(first) = plan.qualifiers.iter().next() {
                let q = first.to_quoted(setting);
                set.push(format!("{q} = {q}"));
            }
        }
        qb.write_text("ON DUPLICATE KEY UPDATE")
            .write_text(&set.join(", "))
            .end();

        select_keys(&mut qb, &plan.keys, index, with_order, setting);
    }
    qb.build()
}
