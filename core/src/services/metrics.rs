use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::ApiRequest;

use super::{Page, PageRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    HeartRate,
    Weight,
    BodyFat,
    Steps,
    Calories,
}

impl MetricType {
    pub fn unit(self) -> &'static str {
        match self {
            MetricType::HeartRate => "bpm",
            MetricType::Weight => "kg",
            MetricType::BodyFat => "%",
            MetricType::Steps => "steps",
            MetricType::Calories => "kcal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricFilter {
    pub types: Vec<MetricType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMetric {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

fn path(user_id: Uuid) -> String {
    format!("/users/{user_id}/metrics")
}

pub fn list_for_user(client: &ApiClient, user_id: Uuid, filter: &MetricFilter) -> Result<Page<Metric>, ApiError> {
    client.request(&ApiRequest::get(path(user_id)).query(filter)?)
}

pub fn record(client: &ApiClient, user_id: Uuid, input: &NewMetric) -> Result<Metric, ApiError> {
    client.request(&ApiRequest::post(path(user_id)).json(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpBody;
    use crate::testing::{client_with, signed_in, CannedTransport};
    use chrono::TimeZone;

    #[test]
    fn filter_encodes_types_and_range() {
        let transport = CannedTransport::new(200, r#"{"content":[]}"#);
        let client = client_with(transport.clone(), signed_in());
        let filter = MetricFilter {
            types: vec![MetricType::HeartRate, MetricType::Weight],
            from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            to: None,
            page: PageRequest::default(),
        };
        list_for_user(&client, Uuid::nil(), &filter).unwrap();
        assert_eq!(
            transport.last().url,
            "http://localhost:8080/users/00000000-0000-0000-0000-000000000000/metrics?types=HEART_RATE&types=WEIGHT&from=2024-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn record_uses_type_key() {
        let transport = CannedTransport::new(
            201,
            r#"{"id":"00000000-0000-0000-0000-00000000000a","userId":"00000000-0000-0000-0000-000000000000","type":"STEPS","value":10432,"unit":"steps","recordedAt":"2024-05-01T08:00:00Z"}"#,
        );
        let client = client_with(transport.clone(), signed_in());
        let metric = record(
            &client,
            Uuid::nil(),
            &NewMetric {
                metric_type: MetricType::Steps,
                value: 10432.0,
                recorded_at: None,
            },
        )
        .unwrap();
        assert_eq!(metric.metric_type, MetricType::Steps);
        assert_eq!(metric.unit, MetricType::Steps.unit());
        assert_eq!(
            transport.last().body,
            Some(HttpBody::Json(r#"{"type":"STEPS","value":10432.0}"#.to_string()))
        );
    }
}
