//! Child records of a report row: SLA KPI instances, the case satisfaction
//! survey and the latest visitor survey.

use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::enrichment::Enrichment;
use super::localtime::format_local;
use crate::crm::schema::{case_survey, sla_kpi, visitor_survey};
use crate::crm::{ColumnSet, Condition, CrmStore, Entity, Order, QueryExpression};
use casedesk_shared::{SatisfactionSummary, SlaKpiTimestamps};

/// Grouping key of a KPI name: spaces, hyphens and en-dashes removed and the
/// one known casing slip corrected.
pub fn normalize_kpi_name(raw: &str) -> String {
    raw.replace([' ', '\u{2013}', '-'], "")
        .replace("byKPI", "ByKPI")
}

/// KPI timestamps keyed by normalised name. Later instances overwrite
/// earlier ones sharing a key.
pub fn kpi_map(instances: &[Entity]) -> BTreeMap<String, SlaKpiTimestamps> {
    let mut map = BTreeMap::new();
    for kpi in instances {
        let Some(name) = kpi.get_text(sla_kpi::NAME) else {
            continue;
        };
        map.insert(
            normalize_kpi_name(&name),
            SlaKpiTimestamps {
                failure_time: format_local(kpi.get_datetime(sla_kpi::FAILURE_TIME)),
                succeeded_on: format_local(kpi.get_datetime(sla_kpi::SUCCEEDED_ON)),
            },
        );
    }
    map
}

pub async fn sla_kpis(
    store: &dyn CrmStore,
    case_id: Uuid,
) -> Enrichment<BTreeMap<String, SlaKpiTimestamps>> {
    let query = QueryExpression::new(sla_kpi::ENTITY)
        .columns(ColumnSet::new([
            sla_kpi::NAME,
            sla_kpi::FAILURE_TIME,
            sla_kpi::SUCCEEDED_ON,
        ]))
        .filter(Condition::equal(sla_kpi::REGARDING, case_id));

    match store.retrieve_multiple(&query).await {
        Ok(result) => Enrichment::Found(kpi_map(&result.entities)),
        Err(err) => Enrichment::from_error(err),
    }
}

pub fn satisfaction_from(record: &Entity) -> SatisfactionSummary {
    SatisfactionSummary {
        survey_created_on: format_local(record.get_datetime(case_survey::CREATED_ON)),
        satisfaction_score: record.get_option(case_survey::RATING),
        satisfaction_comment: record.get_string(case_survey::SCORE_TEXT),
        time_taken_appropriate: record.formatted_or_raw(case_survey::TIME_APPROPRIATE),
        improvement_comment: record.get_string(case_survey::COMMENT),
    }
}

/// The case's satisfaction survey, if one was submitted.
pub async fn case_satisfaction(
    store: &dyn CrmStore,
    case_id: Uuid,
) -> Enrichment<SatisfactionSummary> {
    let query = QueryExpression::new(case_survey::ENTITY)
        .columns(ColumnSet::new([
            case_survey::RATING,
            case_survey::SCORE_TEXT,
            case_survey::TIME_APPROPRIATE,
            case_survey::COMMENT,
            case_survey::CREATED_ON,
        ]))
        .filter(Condition::equal(case_survey::CASE, case_id));

    Enrichment::from_result(
        store
            .retrieve_multiple(&query)
            .await
            .map(|result| result.first().map(satisfaction_from)),
    )
}

/// Most recent survey of each visitor, fetched with one `IN` query.
/// Visitors without a survey have no entry.
pub async fn latest_visitor_surveys(
    store: &dyn CrmStore,
    visitor_ids: &[Uuid],
) -> Enrichment<HashMap<Uuid, Entity>> {
    if visitor_ids.is_empty() {
        return Enrichment::Found(HashMap::new());
    }

    let query = QueryExpression::new(visitor_survey::ENTITY)
        .columns(ColumnSet::new([
            visitor_survey::VISITOR,
            visitor_survey::SERVICE,
            visitor_survey::EFFICIENCY,
            visitor_survey::REASONS,
            visitor_survey::OPINION,
            visitor_survey::CREATED_ON,
        ]))
        .filter(Condition::is_in(
            visitor_survey::VISITOR,
            visitor_ids.iter().copied(),
        ))
        .order(Order::desc(visitor_survey::CREATED_ON));

    let surveys = match store.retrieve_multiple(&query).await {
        Ok(result) => result.entities,
        Err(err) => return Enrichment::from_error(err),
    };

    let mut latest = HashMap::new();
    for survey in surveys {
        if let Some(visitor_id) = survey.get_guid(visitor_survey::VISITOR) {
            latest.entry(visitor_id).or_insert(survey);
        }
    }
    Enrichment::Found(latest)
}
