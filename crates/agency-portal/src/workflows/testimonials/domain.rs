use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::records::{Formula, Record};

pub const RECENT_WINDOW_DAYS: i64 = 90;

const STARS_FIELD: &str = "ESTRELLAS";
const NAME_FIELD: &str = "NOMBRE";
const COMMENT_FIELD: &str = "COMENTARIO";
const CREATED_FIELD: &str = "FECHA DE CREACION";
const USE_PHOTO_FIELD: &str = "USAR FOTO";
const PHOTO_FIELD: &str = "FOTO PERFIL";
const ANONYMOUS: &str = "Anónimo";

/// Rows that may be shown publicly: visible, consented, and carrying a comment.
pub fn publishable() -> Formula {
    Formula::and([
        Formula::is_true("VISIBLE"),
        Formula::is_true("AUTORIZA_PUBLICAR"),
        Formula::not_empty(COMMENT_FIELD),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    Recent,
    Old,
}

/// Public projection of one rating row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialItem {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub stars: u8,
    pub comment: String,
    pub relative_age: String,
    pub photo_url: Option<String>,
    #[serde(skip)]
    pub bucket: AgeBucket,
}

impl TestimonialItem {
    pub fn from_record(record: &Record, now: DateTime<Utc>) -> Self {
        let name = match record.field(NAME_FIELD).and_then(Value::as_str) {
            Some(name) => name.trim().to_string(),
            None => ANONYMOUS.to_string(),
        };
        let stars = record
            .number(STARS_FIELD)
            .map(|stars| stars.round().clamp(0.0, 5.0) as u8)
            .unwrap_or(0);

        let created = record
            .text(CREATED_FIELD)
            .or_else(|| record.created_time.clone())
            .and_then(|raw| parse_timestamp(&raw));
        let (bucket, relative_age) = match created {
            Some(created) => (age_bucket(created, now), relative_age_label(created, now)),
            None => (AgeBucket::Old, "Reciente".to_string()),
        };

        Self {
            id: record.id.clone(),
            initials: initials(&name),
            name,
            stars,
            comment: record.text(COMMENT_FIELD).unwrap_or_default(),
            relative_age,
            photo_url: photo_url(record),
            bucket,
        }
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

pub fn age_bucket(created: DateTime<Utc>, now: DateTime<Utc>) -> AgeBucket {
    if created >= now - Duration::days(RECENT_WINDOW_DAYS) {
        AgeBucket::Recent
    } else {
        AgeBucket::Old
    }
}

/// Spanish "time ago" label; future timestamps read as today.
pub fn relative_age_label(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created).num_days().max(0);
    match days {
        0 => "Hoy".to_string(),
        1 => "Ayer".to_string(),
        2..=6 => format!("Hace {days} días"),
        7..=29 => format!("Hace {} semanas", days / 7),
        _ => format!("Hace {} meses", days / 30),
    }
}

/// First letter of the first and last name parts, upper-cased.
pub fn initials(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return "?".to_string();
    };

    let mut initials: String = first.chars().take(1).collect();
    if parts.len() > 1 {
        initials.extend(last.chars().take(1));
    }
    initials.to_uppercase()
}

fn photo_url(record: &Record) -> Option<String> {
    if !record.flag(USE_PHOTO_FIELD) {
        return None;
    }
    record
        .field(PHOTO_FIELD)?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .map(str::to_string)
}
