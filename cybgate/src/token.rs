//! Jeton d'identification composite reliant les opérations dépendantes

use std::fmt;

/// Référence composite `order_id;request_id;request_token` retournée comme
/// autorisation d'une opération réussie, et fournie en entrée des opérations
/// qui en dépendent (capture après autorisation, void/refund après capture,
/// mise à jour ou facturation d'un abonnement).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentificationToken {
    pub order_id: Option<String>,
    pub request_id: Option<String>,
    pub request_token: Option<String>,
}

impl IdentificationToken {
    pub fn new(
        order_id: Option<String>,
        request_id: Option<String>,
        request_token: Option<String>,
    ) -> Self {
        Self {
            order_id: non_blank(order_id),
            request_id: non_blank(request_id),
            request_token: non_blank(request_token),
        }
    }

    /// Découpe un jeton en ses trois segments. Total : un jeton incomplet
    /// donne des segments absents, jamais une erreur.
    pub fn parse(token: &str) -> Self {
        let mut parts = token.splitn(3, ';');
        Self::new(
            parts.next().map(str::to_string),
            parts.next().map(str::to_string),
            parts.next().map(str::to_string),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.request_id.is_none() && self.request_token.is_none()
    }
}

impl fmt::Display for IdentificationToken {
    /// Rejoint les segments présents avec `;` ; sans perte pour un jeton de
    /// trois segments non vides.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segments: Vec<&str> = [
            self.order_id.as_deref(),
            self.request_id.as_deref(),
            self.request_token.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        write!(f, "{}", segments.join(";"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
