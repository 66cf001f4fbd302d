use super::entity::{AttributeValue, Entity};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSet {
    All,
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn all() -> Self {
        Self::All
    }

    pub fn includes(&self, column: &str) -> bool {
        match self {
            Self::All => true,
            Self::Columns(cols) => cols.iter().any(|c| c == column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equal,
    /// Instant comparison (`>=`), not the calendar-day variant.
    OnOrAfter,
    Between,
    In,
    NotNull,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub values: Vec<AttributeValue>,
}

impl Condition {
    fn new(attribute: &str, operator: ConditionOperator, values: Vec<AttributeValue>) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator,
            values,
        }
    }

    pub fn equal(attribute: &str, value: impl Into<AttributeValue>) -> Self {
        Self::new(attribute, ConditionOperator::Equal, vec![value.into()])
    }

    pub fn on_or_after(attribute: &str, value: impl Into<AttributeValue>) -> Self {
        Self::new(attribute, ConditionOperator::OnOrAfter, vec![value.into()])
    }

    pub fn between(
        attribute: &str,
        from: impl Into<AttributeValue>,
        to: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(
            attribute,
            ConditionOperator::Between,
            vec![from.into(), to.into()],
        )
    }

    pub fn is_in<I, V>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        Self::new(
            attribute,
            ConditionOperator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn not_null(attribute: &str) -> Self {
        Self::new(attribute, ConditionOperator::NotNull, Vec::new())
    }

    pub fn null(attribute: &str) -> Self {
        Self::new(attribute, ConditionOperator::Null, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub attribute: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            descending: false,
        }
    }

    pub fn desc(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    Inner,
    LeftOuter,
}

/// Join from the query's primary entity to a related entity. Projected columns
/// come back on the primary record keyed `alias.column`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEntity {
    pub entity: String,
    /// Attribute on the primary entity.
    pub parent_attribute: String,
    /// Attribute on the linked entity.
    pub link_attribute: String,
    pub join: JoinOperator,
    pub alias: String,
    pub columns: ColumnSet,
    pub orders: Vec<Order>,
}

impl LinkEntity {
    pub fn outer(entity: &str, parent_attribute: &str, link_attribute: &str, alias: &str) -> Self {
        Self {
            entity: entity.to_string(),
            parent_attribute: parent_attribute.to_string(),
            link_attribute: link_attribute.to_string(),
            join: JoinOperator::LeftOuter,
            alias: alias.to_string(),
            columns: ColumnSet::Columns(Vec::new()),
            orders: Vec::new(),
        }
    }

    /// Restricts the primary rows to those with a match; projects nothing.
    pub fn inner(entity: &str, parent_attribute: &str, link_attribute: &str, alias: &str) -> Self {
        Self {
            join: JoinOperator::Inner,
            ..Self::outer(entity, parent_attribute, link_attribute, alias)
        }
    }

    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// 1-based
    pub page: u32,
    /// `None` retrieves every matching record.
    pub count: Option<u32>,
    pub return_total: bool,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            page: 1,
            count: None,
            return_total: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub entity: String,
    pub columns: ColumnSet,
    pub conditions: Vec<Condition>,
    pub orders: Vec<Order>,
    pub links: Vec<LinkEntity>,
    pub paging: PageInfo,
}

impl QueryExpression {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            columns: ColumnSet::All,
            conditions: Vec::new(),
            orders: Vec::new(),
            links: Vec::new(),
            paging: PageInfo::default(),
        }
    }

    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn link(mut self, link: LinkEntity) -> Self {
        self.links.push(link);
        self
    }

    pub fn page(mut self, page: u32, count: Option<u32>) -> Self {
        self.paging.page = page.max(1);
        self.paging.count = count;
        self
    }

    pub fn top(self, count: u32) -> Self {
        self.page(1, Some(count))
    }

    pub fn with_total(mut self) -> Self {
        self.paging.return_total = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollection {
    pub entities: Vec<Entity>,
    /// Present only when the query asked for it.
    pub total_record_count: Option<i64>,
    pub more_records: bool,
}

impl EntityCollection {
    pub fn first(&self) -> Option<&Entity> {
        self.entities.first()
    }

    pub fn into_first(self) -> Option<Entity> {
        self.entities.into_iter().next()
    }

    pub fn total_or_len(&self) -> i64 {
        self.total_record_count
            .unwrap_or(self.entities.len() as i64)
    }
}
