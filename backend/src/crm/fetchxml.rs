//! Renders a [`QueryExpression`] as FetchXML for the Web API `fetchXml=` parameter.

use chrono::SecondsFormat;
use std::fmt::Write;

use super::entity::AttributeValue;
use super::query::{ColumnSet, Condition, ConditionOperator, JoinOperator, Order, QueryExpression};

/// Largest page the Web API serves for a FetchXML query.
pub const MAX_PAGE_SIZE: u32 = 5000;

pub fn render(query: &QueryExpression) -> String {
    render_page(query, query.paging.page, query.paging.count)
}

/// Same query with explicit paging; used to walk every page of an unpaged query.
pub fn render_page(query: &QueryExpression, page: u32, count: Option<u32>) -> String {
    let mut xml = String::from(r#"<fetch version="1.0" mapping="logical""#);
    if let Some(count) = count {
        let _ = write!(xml, r#" page="{}" count="{}""#, page.max(1), count);
    }
    if query.paging.return_total {
        xml.push_str(r#" returntotalrecordcount="true""#);
    }
    xml.push('>');

    let _ = write!(xml, r#"<entity name="{}">"#, escape(&query.entity));
    push_columns(&mut xml, &query.columns);
    push_orders(&mut xml, &query.orders);

    if !query.conditions.is_empty() {
        xml.push_str(r#"<filter type="and">"#);
        for condition in &query.conditions {
            push_condition(&mut xml, condition);
        }
        xml.push_str("</filter>");
    }

    for link in &query.links {
        let link_type = match link.join {
            JoinOperator::Inner => "inner",
            JoinOperator::LeftOuter => "outer",
        };
        let _ = write!(
            xml,
            r#"<link-entity name="{}" from="{}" to="{}" link-type="{}" alias="{}">"#,
            escape(&link.entity),
            escape(&link.link_attribute),
            escape(&link.parent_attribute),
            link_type,
            escape(&link.alias),
        );
        push_columns(&mut xml, &link.columns);
        push_orders(&mut xml, &link.orders);
        xml.push_str("</link-entity>");
    }

    xml.push_str("</entity></fetch>");
    xml
}

fn push_columns(xml: &mut String, columns: &ColumnSet) {
    match columns {
        ColumnSet::All => xml.push_str("<all-attributes />"),
        ColumnSet::Columns(cols) => {
            for col in cols {
                let _ = write!(xml, r#"<attribute name="{}" />"#, escape(col));
            }
        }
    }
}

fn push_orders(xml: &mut String, orders: &[Order]) {
    for order in orders {
        let _ = write!(
            xml,
            r#"<order attribute="{}" descending="{}" />"#,
            escape(&order.attribute),
            order.descending
        );
    }
}

fn push_condition(xml: &mut String, condition: &Condition) {
    let attribute = escape(&condition.attribute);
    match condition.operator {
        ConditionOperator::Equal | ConditionOperator::OnOrAfter => {
            let operator = if condition.operator == ConditionOperator::Equal {
                "eq"
            } else {
                "ge"
            };
            let value = condition.values.first().map(format_value).unwrap_or_default();
            let _ = write!(
                xml,
                r#"<condition attribute="{}" operator="{}" value="{}" />"#,
                attribute,
                operator,
                escape(&value)
            );
        }
        ConditionOperator::Between | ConditionOperator::In => {
            let operator = if condition.operator == ConditionOperator::In {
                "in"
            } else {
                "between"
            };
            let _ = write!(xml, r#"<condition attribute="{}" operator="{}">"#, attribute, operator);
            for value in &condition.values {
                let _ = write!(xml, "<value>{}</value>", escape(&format_value(value)));
            }
            xml.push_str("</condition>");
        }
        ConditionOperator::NotNull => {
            let _ = write!(xml, r#"<condition attribute="{}" operator="not-null" />"#, attribute);
        }
        ConditionOperator::Null => {
            let _ = write!(xml, r#"<condition attribute="{}" operator="null" />"#, attribute);
        }
    }
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::Integer(n) => n.to_string(),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        AttributeValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        AttributeValue::Guid(id) => id.to_string(),
        AttributeValue::OptionSet(n) => n.to_string(),
        AttributeValue::OptionSetCollection(values) => values
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(","),
        AttributeValue::Reference(r) => r.id.to_string(),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
