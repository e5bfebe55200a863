use serde::{Deserialize, Serialize};

pub const STARS_FIELD: &str = "ESTRELLAS";
pub const EXPERIENCE_FIELD: &str = "CUAL FUE TU EXPERIENCIA CON NOSOTROS";
pub const YES: &str = "Sí";
pub const NO: &str = "No";

/// Rating posted from the portal's review form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatingSubmission {
    #[serde(rename = "estrellas")]
    pub stars: i64,
    #[serde(rename = "comentario", default)]
    pub comment: String,
    #[serde(rename = "nombre", default = "default_name")]
    pub name: String,
    #[serde(rename = "servicio", default = "default_service")]
    pub service: String,
    #[serde(rename = "es_cliente", default = "default_is_client")]
    pub is_client: String,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(rename = "autoriza_publicar", default)]
    pub publish_consent: bool,
    #[serde(rename = "usar_foto", default)]
    pub use_photo: bool,
}

fn default_name() -> String {
    "Anónimo".to_string()
}

fn default_service() -> String {
    "Atención General".to_string()
}

fn default_is_client() -> String {
    NO.to_string()
}

impl RatingSubmission {
    pub fn claims_to_be_client(&self) -> bool {
        self.is_client == YES && self.dni.as_deref().is_some_and(|dni| !dni.trim().is_empty())
    }
}

/// Mean of the visible ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub rating: f64,
    pub total: usize,
}

impl RatingSummary {
    pub fn from_stars(stars: &[f64]) -> Self {
        if stars.is_empty() {
            return Self {
                rating: 0.0,
                total: 0,
            };
        }
        let mean = stars.iter().sum::<f64>() / stars.len() as f64;
        Self {
            rating: (mean * 10.0).round() / 10.0,
            total: stars.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingReceipt {
    pub status: &'static str,
    pub message: String,
    #[serde(rename = "recordId")]
    pub record_id: String,
    #[serde(rename = "clienteVinculado")]
    pub client_linked: bool,
}
