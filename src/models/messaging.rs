// src/models/messaging.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "message_channel", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageChannel {
    Email,
    Sms,
    Whatsapp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    #[schema(example = "BOOKING_CONFIRMED")]
    pub code: String,
    pub channel: MessageChannel,
    #[schema(example = "Reserva confirmada, {{guestName}}")]
    pub subject: Option<String>,
    #[schema(example = "Olá {{guestName}}, seu check-in é em {{checkIn}}.")]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mensagem pronta para envio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub channel: MessageChannel,
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
}

/// Substituição literal de `{{chave}}`. Sem escape; chaves desconhecidas ficam como estão.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_known_keys() {
        let out = render(
            "Olá {{guestName}}, quarto {{room}}.",
            &vars(&[("guestName", "Meera"), ("room", "204")]),
        );
        assert_eq!(out, "Olá Meera, quarto 204.");
    }

    #[test]
    fn unknown_placeholders_are_left_untouched() {
        let out = render("Total: {{amount}} {{currency}}", &vars(&[("amount", "600")]));
        assert_eq!(out, "Total: 600 {{currency}}");
    }

    #[test]
    fn keys_match_literally_including_spaces() {
        let out = render("Olá {{ guestName }}!", &vars(&[("guestName", "Meera")]));
        assert_eq!(out, "Olá {{ guestName }}!");
    }

    #[test]
    fn values_are_not_escaped_or_re_expanded() {
        let out = render("{{a}}", &vars(&[("a", "<b>{{b}}</b>"), ("b", "x")]));
        assert_eq!(out, "<b>{{b}}</b>");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        assert_eq!(render("oi {{nome", &vars(&[("nome", "x")])), "oi {{nome");
    }
}
