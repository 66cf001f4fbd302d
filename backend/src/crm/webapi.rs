//! Dataverse Web API implementation of [`CrmStore`].

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::entity::{AttributeValue, Entity, EntityReference};
use super::fetchxml::{self, MAX_PAGE_SIZE};
use super::query::{ColumnSet, Condition, EntityCollection, QueryExpression};
use super::{CrmCredentials, CrmStore, StoreError, StoreProvider, StoreResult};
use crate::config::CrmConfig;

const FORMATTED_VALUE: &str = "OData.Community.Display.V1.FormattedValue";
const LOOKUP_LOGICAL_NAME: &str = "Microsoft.Dynamics.CRM.lookuplogicalname";
const TOTAL_RECORD_COUNT: &str = "@Microsoft.Dynamics.CRM.totalrecordcount";
const MORE_RECORDS: &str = "@Microsoft.Dynamics.CRM.morerecords";

/// Tokens are refreshed this long before they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub enum Grant {
    /// Resource-owner password grant for the calling CRM user.
    Password(CrmCredentials),
    /// Client-credentials grant for the service identity.
    ClientCredentials,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct WebApiStore {
    client: Client,
    config: Arc<CrmConfig>,
    grant: Grant,
    token: Mutex<Option<AccessToken>>,
}

impl WebApiStore {
    pub fn new(client: Client, config: Arc<CrmConfig>, grant: Grant) -> Self {
        Self {
            client,
            config,
            grant,
            token: Mutex::new(None),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/data/{}/{}", self.config.url, self.config.api_version, path)
    }

    async fn access_token(&self) -> StoreResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn request_token(&self) -> StoreResult<AccessToken> {
        let mut params = vec![
            ("client_id", self.config.client_id.as_str()),
            ("scope", self.config.scope.as_str()),
        ];
        if !self.config.client_secret.is_empty() {
            params.push(("client_secret", self.config.client_secret.as_str()));
        }
        match &self.grant {
            Grant::Password(creds) => {
                params.push(("grant_type", "password"));
                params.push(("username", creds.username.as_str()));
                params.push(("password", creds.password.as_str()));
            }
            Grant::ClientCredentials => params.push(("grant_type", "client_credentials")),
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let reason = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(StoreError::Auth(reason));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .header("OData-MaxVersion", "4.0")
            .header("OData-Version", "4.0")
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        Err(StoreError::Api { status, message })
    }

    async fn fetch_page(
        &self,
        query: &QueryExpression,
        page: u32,
        count: Option<u32>,
    ) -> StoreResult<EntityCollection> {
        let fetch = fetchxml::render_page(query, page, count);
        let url = format!(
            "{}?fetchXml={}",
            self.api_url(&entity_set_name(&query.entity)),
            urlencoding::encode(&fetch)
        );
        tracing::debug!(entity = %query.entity, page, "CRM fetch");

        let request = self
            .client
            .get(url)
            .header("Prefer", r#"odata.include-annotations="*""#);
        let body: Value = self.send(request).await?.json().await?;
        decode_collection(&query.entity, &body)
    }
}

#[async_trait]
impl CrmStore for WebApiStore {
    async fn retrieve_multiple(&self, query: &QueryExpression) -> StoreResult<EntityCollection> {
        if query.paging.count.is_some() {
            return self
                .fetch_page(query, query.paging.page, query.paging.count)
                .await;
        }

        let mut all = EntityCollection::default();
        let mut page = 1;
        loop {
            let batch = self.fetch_page(query, page, Some(MAX_PAGE_SIZE)).await?;
            if all.total_record_count.is_none() {
                all.total_record_count = batch.total_record_count;
            }
            all.entities.extend(batch.entities);
            if !batch.more_records {
                break;
            }
            page += 1;
        }
        if query.paging.return_total && all.total_record_count.is_none() {
            all.total_record_count = Some(all.entities.len() as i64);
        }
        Ok(all)
    }

    async fn retrieve(&self, entity: &str, id: Uuid, columns: &ColumnSet) -> StoreResult<Entity> {
        let query = QueryExpression::new(entity)
            .columns(columns.clone())
            .filter(Condition::equal(&primary_id_attribute(entity), id))
            .top(1);

        self.retrieve_multiple(&query)
            .await?
            .into_first()
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity, id)))
    }

    async fn create(&self, record: &Entity) -> StoreResult<Uuid> {
        let body = encode_record(record);
        let request = self
            .client
            .post(self.api_url(&entity_set_name(&record.logical_name)))
            .json(&body);
        let response = self.send(request).await?;

        response
            .headers()
            .get("OData-EntityId")
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_entity_url)
            .ok_or_else(|| StoreError::Decode("missing OData-EntityId header".to_string()))
    }
}

/// Hands out Web API stores sharing one HTTP client.
pub struct WebApiProvider {
    client: Client,
    config: Arc<CrmConfig>,
    service: Arc<WebApiStore>,
}

impl WebApiProvider {
    pub fn new(config: CrmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let config = Arc::new(config);
        let service = Arc::new(WebApiStore::new(
            client.clone(),
            config.clone(),
            Grant::ClientCredentials,
        ));
        Ok(Self {
            client,
            config,
            service,
        })
    }
}

impl StoreProvider for WebApiProvider {
    fn for_credentials(&self, credentials: &CrmCredentials) -> Arc<dyn CrmStore> {
        Arc::new(WebApiStore::new(
            self.client.clone(),
            self.config.clone(),
            Grant::Password(credentials.clone()),
        ))
    }

    fn service(&self) -> Arc<dyn CrmStore> {
        self.service.clone()
    }
}

/// Collection name of an entity: `incident` -> `incidents`,
/// `new_satisfactionsurveysms` -> `new_satisfactionsurveysmses`.
pub fn entity_set_name(logical_name: &str) -> String {
    let bytes = logical_name.as_bytes();
    match bytes.last() {
        Some(b's') | Some(b'x') => format!("{}es", logical_name),
        Some(b'y') if bytes.len() > 1 && !b"aeiou".contains(&bytes[bytes.len() - 2]) => {
            format!("{}ies", &logical_name[..logical_name.len() - 1])
        }
        _ => format!("{}s", logical_name),
    }
}

fn primary_id_attribute(logical_name: &str) -> String {
    format!("{}id", logical_name)
}

fn id_from_entity_url(url: &str) -> Option<Uuid> {
    let start = url.rfind('(')?;
    let end = url.rfind(')')?;
    Uuid::parse_str(url.get(start + 1..end)?).ok()
}

fn decode_collection(logical_name: &str, body: &Value) -> StoreResult<EntityCollection> {
    let rows = body
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Decode("response has no value array".to_string()))?;

    let entities = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| decode_entity(logical_name, row))
        .collect();

    Ok(EntityCollection {
        entities,
        total_record_count: body
            .get(TOTAL_RECORD_COUNT)
            .and_then(Value::as_i64)
            .filter(|n| *n >= 0),
        more_records: body
            .get(MORE_RECORDS)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// `_customerid_value` -> `customerid`, `acc_x002e_name` -> `acc.name`.
fn attribute_key(raw: &str) -> String {
    let key = raw.replace("_x002e_", ".");
    match key.strip_prefix('_').and_then(|k| k.strip_suffix("_value")) {
        Some(lookup) => lookup.to_string(),
        None => key,
    }
}

fn decode_entity(logical_name: &str, row: &Map<String, Value>) -> Entity {
    let mut formatted = HashMap::new();
    let mut lookup_targets = HashMap::new();

    for (key, value) in row {
        let Some((base, annotation)) = key.split_once('@') else {
            continue;
        };
        let Some(text) = value.as_str() else {
            continue;
        };
        match annotation {
            FORMATTED_VALUE => {
                formatted.insert(attribute_key(base), text.to_string());
            }
            LOOKUP_LOGICAL_NAME => {
                lookup_targets.insert(attribute_key(base), text.to_string());
            }
            _ => {}
        }
    }

    let primary_id = primary_id_attribute(logical_name);
    let mut entity = Entity::new(
        logical_name,
        row.get(&primary_id)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_default(),
    );

    for (key, value) in row {
        if key.contains('@') {
            continue;
        }
        let name = attribute_key(key);
        let decoded = match value {
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
            Value::Bool(b) => AttributeValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => match (lookup_targets.get(&name), Uuid::parse_str(s)) {
                (Some(target), Ok(id)) => {
                    let mut reference = EntityReference::new(target.clone(), id);
                    reference.name = formatted.get(&name).cloned();
                    AttributeValue::Reference(reference)
                }
                _ => AttributeValue::String(s.clone()),
            },
        };
        entity.attributes.insert(name, decoded);
    }

    entity.formatted_values.extend(formatted);
    entity
}

fn encode_record(record: &Entity) -> Map<String, Value> {
    let mut body = Map::new();
    for (key, value) in &record.attributes {
        let encoded = match value {
            AttributeValue::Reference(r) => {
                body.insert(
                    format!("{}@odata.bind", key),
                    Value::String(format!("/{}({})", entity_set_name(&r.logical_name), r.id)),
                );
                continue;
            }
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Integer(n) => Value::from(*n),
            AttributeValue::Float(f) => Value::from(*f),
            AttributeValue::Boolean(b) => Value::Bool(*b),
            AttributeValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            AttributeValue::Guid(id) => Value::String(id.to_string()),
            AttributeValue::OptionSet(n) => Value::from(*n),
            AttributeValue::OptionSetCollection(values) => Value::String(
                values
                    .iter()
                    .map(i32::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };
        body.insert(key.clone(), encoded);
    }
    body
}
