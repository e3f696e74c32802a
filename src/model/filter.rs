use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::Event;

/// 活动列表过滤条件。每个字段只有给出时才参与过滤，
/// 分类集合内部取或，与其余条件取与；日期只比较日期部分。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    #[serde(default, deserialize_with = "id_list")]
    pub category_ids: Option<Vec<i64>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// 查询串里逗号分隔："category_ids=1,2,3"
fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => {
            let ids = s
                .split(',')
                .filter(|p| !p.trim().is_empty())
                .map(|p| p.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(serde::de::Error::custom)?;
            Ok(Some(ids))
        }
    }
}

impl EventFilter {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.city.is_none()
            && self.street.is_none()
            && self.category_ids.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// 内存谓词，与 SQL 构造共享同一套语义
    pub fn matches(&self, event: &Event, city: &str, street: &str, category_ids: &[i64]) -> bool {
        if let Some(id) = self.id {
            if event.id != id {
                return false;
            }
        }
        if let Some(ref name) = self.name {
            if !event.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(ref want) = self.city {
            if city != want {
                return false;
            }
        }
        if let Some(ref want) = self.street {
            if street != want {
                return false;
            }
        }
        if let Some(ref wanted) = self.category_ids {
            if !wanted.iter().any(|id| category_ids.contains(id)) {
                return false;
            }
        }
        if let Some(date) = self.start_date {
            if event.start_time.date_naive() != date {
                return false;
            }
        }
        if let Some(date) = self.end_date {
            if event.end_time.date_naive() != date {
                return false;
            }
        }
        true
    }
}
