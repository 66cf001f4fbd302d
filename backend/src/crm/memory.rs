//! In-memory [`CrmStore`] for tests. Evaluates conditions, outer joins, ordering
//! and paging over seeded records, and can be told to fail or stall per entity.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::entity::{AttributeValue, Entity};
use super::query::{
    ColumnSet, Condition, ConditionOperator, EntityCollection, JoinOperator, LinkEntity, Order,
    QueryExpression,
};
use super::{CrmCredentials, CrmStore, StoreError, StoreProvider, StoreResult};

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Entity>>,
    failing: HashMap<String, String>,
    stalled: HashMap<String, Duration>,
    created: Vec<Entity>,
    queries: Vec<QueryExpression>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: Entity) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tables
            .entry(record.logical_name.clone())
            .or_default()
            .push(record);
    }

    pub fn with_records(self, records: impl IntoIterator<Item = Entity>) -> Self {
        for record in records {
            self.insert(record);
        }
        self
    }

    /// Every read of `entity` fails with an API error.
    pub fn fail_entity(&self, entity: &str, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing.insert(entity.to_string(), message.to_string());
    }

    /// Every read of `entity` sleeps before answering.
    pub fn stall_entity(&self, entity: &str, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.stalled.insert(entity.to_string(), delay);
    }

    pub fn created(&self, entity: &str) -> Vec<Entity> {
        let inner = self.inner.lock().unwrap();
        inner
            .created
            .iter()
            .filter(|e| e.logical_name == entity)
            .cloned()
            .collect()
    }

    pub fn queries_for(&self, entity: &str) -> Vec<QueryExpression> {
        let inner = self.inner.lock().unwrap();
        inner
            .queries
            .iter()
            .filter(|q| q.entity == entity)
            .cloned()
            .collect()
    }

    async fn gate(&self, entity: &str) -> StoreResult<()> {
        let (failure, delay) = {
            let inner = self.inner.lock().unwrap();
            (
                inner.failing.get(entity).cloned(),
                inner.stalled.get(entity).copied(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(StoreError::Api {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }

    fn rows(&self, entity: &str) -> Vec<Entity> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(entity).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    async fn retrieve_multiple(&self, query: &QueryExpression) -> StoreResult<EntityCollection> {
        self.inner.lock().unwrap().queries.push(query.clone());
        self.gate(&query.entity).await?;
        for link in &query.links {
            self.gate(&link.entity).await?;
        }

        let mut rows: Vec<Entity> = self
            .rows(&query.entity)
            .into_iter()
            .filter(|row| query.conditions.iter().all(|c| matches(row, c)))
            .collect();
        sort_rows(&mut rows, &query.orders);

        for link in &query.links {
            let linked = self.rows(&link.entity);
            rows = rows
                .into_iter()
                .flat_map(|row| join(row, link, &linked))
                .collect();
        }

        let total = rows.len() as i64;
        let (entities, more_records) = match query.paging.count {
            Some(count) => {
                let skip = (query.paging.page.max(1) as usize - 1) * count as usize;
                let page: Vec<Entity> = rows.into_iter().skip(skip).take(count as usize).collect();
                (page, (skip + count as usize) < total as usize)
            }
            None => (rows, false),
        };

        Ok(EntityCollection {
            entities,
            total_record_count: query.paging.return_total.then_some(total),
            more_records,
        })
    }

    async fn retrieve(&self, entity: &str, id: Uuid, _columns: &ColumnSet) -> StoreResult<Entity> {
        self.gate(entity).await?;
        self.rows(entity)
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity, id)))
    }

    async fn create(&self, record: &Entity) -> StoreResult<Uuid> {
        self.gate(&record.logical_name).await?;
        let mut stored = record.clone();
        stored.id = Uuid::new_v4();
        let mut inner = self.inner.lock().unwrap();
        inner.created.push(stored.clone());
        inner
            .tables
            .entry(stored.logical_name.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored.id)
    }
}

/// Both report and service stores resolve to the same seeded data.
pub struct MemoryProvider {
    pub store: MemoryStore,
}

impl StoreProvider for MemoryProvider {
    fn for_credentials(&self, _credentials: &CrmCredentials) -> Arc<dyn CrmStore> {
        Arc::new(self.store.clone())
    }

    fn service(&self) -> Arc<dyn CrmStore> {
        Arc::new(self.store.clone())
    }
}

fn attribute_of(row: &Entity, attribute: &str) -> Option<AttributeValue> {
    if attribute == format!("{}id", row.logical_name) {
        return Some(AttributeValue::Guid(row.id));
    }
    row.get(attribute).cloned()
}

fn key_of(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s) => s.clone(),
        AttributeValue::Integer(n) => n.to_string(),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        AttributeValue::DateTime(dt) => dt.to_rfc3339(),
        AttributeValue::Guid(id) => id.to_string(),
        AttributeValue::OptionSet(n) => n.to_string(),
        AttributeValue::OptionSetCollection(values) => format!("{values:?}"),
        AttributeValue::Reference(r) => r.id.to_string(),
    }
}

fn compare(a: &AttributeValue, b: &AttributeValue) -> Ordering {
    match (a, b) {
        (AttributeValue::DateTime(x), AttributeValue::DateTime(y)) => x.cmp(y),
        (AttributeValue::Integer(x), AttributeValue::Integer(y)) => x.cmp(y),
        (AttributeValue::OptionSet(x), AttributeValue::OptionSet(y)) => x.cmp(y),
        _ => key_of(a).cmp(&key_of(b)),
    }
}

fn matches(row: &Entity, condition: &Condition) -> bool {
    let value = attribute_of(row, &condition.attribute);
    match condition.operator {
        ConditionOperator::NotNull => value.is_some(),
        ConditionOperator::Null => value.is_none(),
        ConditionOperator::Equal => match (value, condition.values.first()) {
            (Some(v), Some(expected)) => key_of(&v) == key_of(expected),
            _ => false,
        },
        ConditionOperator::In => value
            .map(|v| condition.values.iter().any(|c| key_of(c) == key_of(&v)))
            .unwrap_or(false),
        ConditionOperator::OnOrAfter => match (value, condition.values.first()) {
            (Some(v), Some(bound)) => compare(&v, bound) != Ordering::Less,
            _ => false,
        },
        ConditionOperator::Between => match (value, condition.values.as_slice()) {
            (Some(v), [from, to]) => {
                compare(&v, from) != Ordering::Less && compare(&v, to) != Ordering::Greater
            }
            _ => false,
        },
    }
}

fn sort_rows(rows: &mut [Entity], orders: &[Order]) {
    rows.sort_by(|a, b| {
        for order in orders {
            let ord = match (attribute_of(a, &order.attribute), attribute_of(b, &order.attribute)) {
                (Some(x), Some(y)) => compare(&x, &y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            let ord = if order.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn join(row: Entity, link: &LinkEntity, linked: &[Entity]) -> Vec<Entity> {
    let Some(parent_key) = attribute_of(&row, &link.parent_attribute).map(|v| key_of(&v)) else {
        return match link.join {
            JoinOperator::LeftOuter => vec![row],
            JoinOperator::Inner => Vec::new(),
        };
    };

    let mut matched: Vec<Entity> = linked
        .iter()
        .filter(|l| attribute_of(l, &link.link_attribute).map(|v| key_of(&v)) == Some(parent_key.clone()))
        .cloned()
        .collect();
    sort_rows(&mut matched, &link.orders);

    if matched.is_empty() {
        return match link.join {
            JoinOperator::LeftOuter => vec![row],
            JoinOperator::Inner => Vec::new(),
        };
    }

    matched
        .into_iter()
        .map(|other| {
            let mut out = row.clone();
            for (key, value) in &other.attributes {
                if link.columns.includes(key) {
                    out.attributes
                        .insert(format!("{}.{}", link.alias, key), value.clone());
                }
            }
            for (key, text) in &other.formatted_values {
                if link.columns.includes(key) {
                    out.formatted_values
                        .insert(format!("{}.{}", link.alias, key), text.clone());
                }
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::entity::EntityReference;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_paging_total_and_order() {
        let store = MemoryStore::new();
        for day in 1..=5 {
            store.insert(
                Entity::new("incident", Uuid::new_v4())
                    .with("ticketnumber", format!("{day}"))
                    .with("modifiedon", Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            );
        }

        let query = QueryExpression::new("incident")
            .order(Order::desc("modifiedon"))
            .page(2, Some(2))
            .with_total();
        let page = store.retrieve_multiple(&query).await.unwrap();

        assert_eq!(page.total_record_count, Some(5));
        assert!(page.more_records);
        let numbers: Vec<_> = page
            .entities
            .iter()
            .map(|e| e.get_string("ticketnumber").unwrap())
            .collect();
        assert_eq!(numbers, vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_outer_join_projects_aliased_columns() {
        let account_id = Uuid::new_v4();
        let store = MemoryStore::new().with_records([
            Entity::new("account", account_id).with("new_crnumber", "CR1"),
            Entity::new("incident", Uuid::new_v4())
                .with("customerid", EntityReference::new("account", account_id)),
            Entity::new("incident", Uuid::new_v4()),
        ]);

        let query = QueryExpression::new("incident").link(
            LinkEntity::outer("account", "customerid", "accountid", "acc")
                .columns(ColumnSet::new(["new_crnumber"])),
        );
        let rows = store.retrieve_multiple(&query).await.unwrap().entities;

        assert_eq!(rows.len(), 2);
        let joined = rows.iter().filter(|r| r.contains("acc.new_crnumber")).count();
        assert_eq!(joined, 1);
    }
}
