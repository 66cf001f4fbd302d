//! Report assembly: one primary paged query, per-row enrichment fanned out
//! with bounded concurrency, pagination metadata and optional grouping.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::decode::{decode_visitor, CaseRow, ACCOUNT_ALIAS, CONTACT_ALIAS};
use super::enrichment::{bounded, Enrichment};
use super::filter::DateFilter;
use super::identity::{customer_details, resolve_cr_number, CustomerKind, CustomerRef};
use super::localtime::format_local;
use super::related;
use crate::crm::schema::{account, contact, incident, visitor, CR_NUMBER};
use crate::crm::{
    ColumnSet, Condition, CrmStore, LinkEntity, Order, QueryExpression, StoreResult,
};
use crate::pagination::{
    effective_page_size, total_pages, PageParams, ReportParams, DEFAULT_PAGE_SIZE,
    MAX_LIGHT_PAGE_SIZE,
};
use casedesk_shared::{
    CaseReportRecord, CaseReportResponse, CompanyReportResponse, CompanyTicketRecord,
    CustomerGroup, CustomerSummary, LightCaseReportRecord, VisitorReportResponse,
};

#[derive(Debug, Clone, Copy)]
pub struct EnrichmentSettings {
    pub lookup_timeout: Duration,
    pub concurrency: usize,
}

pub struct ReportAssembler {
    store: Arc<dyn CrmStore>,
    settings: EnrichmentSettings,
    now: DateTime<Utc>,
}

impl ReportAssembler {
    pub fn new(store: Arc<dyn CrmStore>, settings: EnrichmentSettings) -> Self {
        Self {
            store,
            settings,
            now: Utc::now(),
        }
    }

    /// Pins "now" for the date filters.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn case_query(&self, filter: DateFilter) -> QueryExpression {
        QueryExpression::new(incident::ENTITY)
            .columns(ColumnSet::new(incident::report_columns()))
            .filters(filter.condition(incident::MODIFIED_ON, self.now))
            .order(Order::desc(incident::MODIFIED_ON))
            .with_total()
    }

    /// Unfiltered number of cases in the system.
    async fn overall_count(&self) -> StoreResult<i64> {
        let query = QueryExpression::new(incident::ENTITY)
            .columns(ColumnSet::new([incident::ID]))
            .top(1)
            .with_total();
        Ok(self.store.retrieve_multiple(&query).await?.total_or_len())
    }

    /// Full case report. Omitting the page size returns every matching case
    /// on a single page.
    pub async fn case_report(
        &self,
        params: &ReportParams,
    ) -> StoreResult<CaseReportResponse<CaseReportRecord>> {
        let filter = DateFilter::parse(&params.filter);
        let page = params.page();
        let requested = params.requested_page_size();
        let query = self
            .case_query(filter)
            .page(page as u32, requested.map(|size| size as u32));

        let (result, overall) = tokio::try_join!(
            self.store.retrieve_multiple(&query),
            self.overall_count()
        )?;

        let filtered_total = result.total_or_len();
        let count = result.entities.len();
        let rows: Vec<CaseRow> = result.entities.iter().map(CaseRow::decode).collect();

        let records: Vec<CaseReportRecord> = stream::iter(rows)
            .map(|row| self.enrich_case(row))
            .buffered(self.settings.concurrency)
            .collect()
            .await;

        let page_size = effective_page_size(requested, count);
        tracing::info!(
            filter = %params.filter,
            page,
            rows = count,
            filtered_total,
            "Case report assembled"
        );

        Ok(CaseReportResponse {
            filter: params.filter.clone(),
            page,
            page_size,
            count: count as i64,
            total_tickets: overall,
            filtered_total_tickets: filtered_total,
            total_pages: total_pages(filtered_total, page_size),
            records,
        })
    }

    async fn enrich_case(&self, row: CaseRow) -> CaseReportRecord {
        let store = self.store.as_ref();
        let limit = self.settings.lookup_timeout;
        let subject = row
            .ticket_number
            .clone()
            .unwrap_or_else(|| row.id.to_string());

        let cr_lookup = async {
            match row.customer {
                Some(customer) => resolve_cr_number(store, customer).await,
                None => Enrichment::Missing,
            }
        };
        let (cr_number, kpis, satisfaction) = tokio::join!(
            bounded(limit, cr_lookup),
            bounded(limit, related::sla_kpis(store, row.id)),
            bounded(limit, related::case_satisfaction(store, row.id)),
        );

        CaseReportRecord {
            ticket: row.summary(cr_number.settle(&subject, "cr_number")),
            total_ticket_duration: row.total_duration(),
            resolution_date_time: format_local(row.resolution_time()),
            is_reopened: row.is_reopened_label(),
            satisfaction: satisfaction
                .settle(&subject, "satisfaction")
                .unwrap_or_default(),
            sla: row.sla_status(),
            sla_kpis: kpis.settle(&subject, "sla_kpis").unwrap_or_default(),
        }
    }

    /// Lightweight case report: CR numbers come from joins, no per-row lookups.
    pub async fn light_case_report(
        &self,
        params: &ReportParams,
    ) -> StoreResult<CaseReportResponse<LightCaseReportRecord>> {
        let filter = DateFilter::parse(&params.filter);
        let page = params.page();
        let page_size = params.clamped_page_size(DEFAULT_PAGE_SIZE, MAX_LIGHT_PAGE_SIZE);
        let query = self
            .case_query(filter)
            .link(
                LinkEntity::outer(account::ENTITY, incident::CUSTOMER, account::ID, ACCOUNT_ALIAS)
                    .columns(ColumnSet::new([CR_NUMBER])),
            )
            .link(
                LinkEntity::outer(contact::ENTITY, incident::CUSTOMER, contact::ID, CONTACT_ALIAS)
                    .columns(ColumnSet::new([CR_NUMBER])),
            )
            .page(page as u32, Some(page_size as u32));

        let result = self.store.retrieve_multiple(&query).await?;
        let filtered_total = result.total_or_len();
        let total_tickets = if filter.is_all() {
            filtered_total
        } else {
            self.overall_count().await?
        };

        let records: Vec<LightCaseReportRecord> = result
            .entities
            .iter()
            .map(CaseRow::decode)
            .map(|row| LightCaseReportRecord {
                ticket: row.summary(row.joined_cr_number.clone()),
                resolution_date_time: None,
            })
            .collect();

        Ok(CaseReportResponse {
            filter: params.filter.clone(),
            page,
            page_size,
            count: records.len() as i64,
            total_tickets,
            filtered_total_tickets: filtered_total,
            total_pages: total_pages(filtered_total, page_size),
            records,
        })
    }

    /// Cases of one customer type grouped by customer identity.
    pub async fn company_report(
        &self,
        kind: CustomerKind,
        params: &PageParams,
    ) -> StoreResult<CompanyReportResponse> {
        let page = params.page();
        let page_size = params.page_size();
        let query = QueryExpression::new(incident::ENTITY)
            .columns(ColumnSet::all())
            .filter(Condition::not_null(incident::CUSTOMER))
            .order(Order::desc(incident::MODIFIED_ON))
            .link(LinkEntity::inner(
                kind.logical_name(),
                incident::CUSTOMER,
                kind.primary_id(),
                "customer",
            ))
            .page(page as u32, Some(page_size as u32));

        let result = self.store.retrieve_multiple(&query).await?;
        let rows: Vec<(CaseRow, CustomerRef)> = result
            .entities
            .iter()
            .map(CaseRow::decode)
            .filter_map(|row| {
                let customer = row.customer.filter(|c| c.kind() == kind)?;
                Some((row, customer))
            })
            .collect();

        let limit = self.settings.lookup_timeout;
        let store = self.store.as_ref();
        let resolved: Vec<(CaseRow, CustomerRef, Option<String>)> = stream::iter(rows)
            .map(|(row, customer)| async move {
                let subject = row.id.to_string();
                let cr = bounded(limit, resolve_cr_number(store, customer))
                    .await
                    .settle(&subject, "cr_number");
                (row, customer, cr)
            })
            .buffered(self.settings.concurrency)
            .collect()
            .await;

        let mut customer_ids = Vec::new();
        let mut seen = HashSet::new();
        for (_, customer, _) in &resolved {
            if seen.insert(customer.id()) {
                customer_ids.push(customer.id());
            }
        }
        let details = bounded(limit, customer_details(store, kind, &customer_ids))
            .await
            .settle(kind.logical_name(), "customer_details")
            .unwrap_or_default();

        Ok(CompanyReportResponse {
            page,
            page_size,
            records: group_by_customer(kind, resolved, &details),
        })
    }

    /// Visitor report. Pages and totals count visitors; each visitor carries
    /// its most recent survey, fetched for the whole page in one query.
    pub async fn visitor_report(&self, params: &ReportParams) -> StoreResult<VisitorReportResponse> {
        let filter = DateFilter::parse(&params.filter);
        let page = params.page();
        let page_size = params.page_size_or(DEFAULT_PAGE_SIZE);

        let query = QueryExpression::new(visitor::ENTITY)
            .columns(ColumnSet::new([
                visitor::ID,
                visitor::NUMBER,
                visitor::CONTACT,
                visitor::ACCOUNT,
                visitor::PURPOSE,
                visitor::ACTION,
                visitor::CATEGORY,
                visitor::BRANCH,
                visitor::CREATED_ON,
                visitor::MODIFIED_ON,
            ]))
            .filters(filter.condition(visitor::MODIFIED_ON, self.now))
            .order(Order::desc(visitor::MODIFIED_ON))
            .link(
                LinkEntity::outer(account::ENTITY, visitor::ACCOUNT, account::ID, ACCOUNT_ALIAS)
                    .columns(ColumnSet::new([
                        account::NAME,
                        account::EMAIL,
                        CR_NUMBER,
                        account::REPRESENTATIVE_PHONE,
                    ])),
            )
            .link(
                LinkEntity::outer(contact::ENTITY, visitor::CONTACT, contact::ID, CONTACT_ALIAS)
                    .columns(ColumnSet::new([
                        contact::FULL_NAME,
                        contact::EMAIL,
                        contact::MOBILE,
                    ])),
            )
            .page(page as u32, Some(page_size as u32))
            .with_total();

        let result = self.store.retrieve_multiple(&query).await?;
        let total = result.total_or_len();

        let visitor_ids: Vec<Uuid> = result.entities.iter().map(|record| record.id).collect();
        let surveys = bounded(
            self.settings.lookup_timeout,
            related::latest_visitor_surveys(self.store.as_ref(), &visitor_ids),
        )
        .await
        .settle(visitor::ENTITY, "visitor_surveys")
        .unwrap_or_default();

        let records = result
            .entities
            .iter()
            .map(|record| decode_visitor(record, surveys.get(&record.id)))
            .collect();

        Ok(VisitorReportResponse {
            filter: params.filter.clone(),
            page,
            page_size,
            total_records: total,
            total_pages: total_pages(total, page_size),
            records,
        })
    }
}

/// Groups rows by (customer id, name, CR number) in order of first
/// appearance and attaches the display identity of each group.
fn group_by_customer(
    kind: CustomerKind,
    rows: Vec<(CaseRow, CustomerRef, Option<String>)>,
    details: &HashMap<Uuid, super::identity::CustomerDetails>,
) -> Vec<CustomerGroup> {
    let mut groups: Vec<CustomerGroup> = Vec::new();
    let mut index: HashMap<(Uuid, Option<String>, Option<String>), usize> = HashMap::new();

    for (row, customer, cr_number) in rows {
        let key = (customer.id(), row.customer_name.clone(), cr_number.clone());
        let ticket = CompanyTicketRecord {
            ticket: row.summary(cr_number.clone()),
            sla: row.sla_status(),
        };

        if let Some(&at) = index.get(&key) {
            groups[at].tickets.push(ticket);
            continue;
        }

        let found = details.get(&customer.id());
        let display_cr = match customer {
            CustomerRef::Account(_) => found
                .and_then(|d| d.cr_number.clone())
                .or_else(|| cr_number.clone()),
            CustomerRef::Contact(_) => cr_number.clone(),
        };
        index.insert(key, groups.len());
        groups.push(CustomerGroup {
            customer: CustomerSummary {
                id: customer.id(),
                customer_type: kind.label().to_string(),
                name: row.customer_name.clone(),
                cr_number: display_cr,
                email: found.and_then(|d| d.email.clone()),
                phone: found.and_then(|d| d.phone.clone()),
            },
            tickets: vec![ticket],
        });
    }
    groups
}
