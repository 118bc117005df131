use crate::model::Surgery;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Collaborateur notifié après un commit réussi. Son échec ne doit jamais
/// annuler la réservation.
pub trait BookingNotifier {
    fn surgery_booked(&self, surgery: &Surgery) -> Result<()>;
}

/// Avis de réservation généré pour l'équipe du bloc.
#[derive(Debug, Clone)]
pub struct Notice {
    pub surgery_id: String,
    pub hospital: String,
    pub prepared_at: DateTime<Utc>,
    pub content: String,
}

/// Permet de customiser le rendu du message (texte, SMS, etc.).
pub trait NoticeRenderer {
    fn render(&self, surgery: &Surgery, prepared_at: DateTime<Utc>) -> String;
}

/// Gabarit texte simple destiné à un futur mail/SMS.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNotice;

impl NoticeRenderer for TextNotice {
    fn render(&self, surgery: &Surgery, prepared_at: DateTime<Utc>) -> String {
        let physiologists = surgery
            .physiologists
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Bonjour,\n\nUne chirurgie ({kind}) est programmée à l'hôpital {hospital} du {start} au {end}.\nChirurgien : {surgeon}. Neurophysiologie : {physiologists}.\nCe message est généré le {prepared}.\n\nMerci de vérifier le matériel requis.\n",
            kind = surgery.surgery_type.as_str(),
            hospital = surgery.hospital.as_str(),
            start = surgery.start.to_rfc3339(),
            end = surgery.end().to_rfc3339(),
            surgeon = surgery.surgeon.as_str(),
            physiologists = physiologists,
            prepared = prepared_at.to_rfc3339()
        )
    }
}

/// Prépare l'avis de réservation d'une chirurgie commitée.
pub fn prepare_booking_notice(
    surgery: &Surgery,
    now: DateTime<Utc>,
    renderer: &dyn NoticeRenderer,
) -> Notice {
    Notice {
        surgery_id: surgery.id.as_str().to_string(),
        hospital: surgery.hospital.as_str().to_string(),
        prepared_at: now,
        content: renderer.render(surgery, now),
    }
}
