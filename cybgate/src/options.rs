//! Options par appel et structures d'abonnement

use crate::card::{Address, CreditCard};
use crate::errors::GatewayError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Devise par défaut du processeur
pub const DEFAULT_CURRENCY: &str = "USD";

/// Formate un montant en cents vers la forme décimale à deux chiffres
pub fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Options d'une transaction ; `present vs absent` est explicite, chaque
/// constructeur de bloc XML ne reçoit que la sous-structure qui le concerne
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    pub order_id: Option<String>,
    pub email: Option<String>,

    /// Adresse de facturation explicite
    pub billing_address: Option<Address>,

    /// Champ `address` historique, utilisé comme adresse de facturation si
    /// aucune n'est fournie explicitement
    pub address: Option<Address>,

    pub shipping_address: Option<Address>,
    pub currency: Option<String>,
    pub line_items: Vec<LineItem>,

    pub subscription: Option<Subscription>,

    /// Frais d'installation d'un abonnement, en cents
    pub setup_fee: Option<i64>,

    /// Carte de remplacement pour la mise à jour d'un abonnement
    pub credit_card: Option<CreditCard>,
}

impl TransactionOptions {
    /// Adresse de facturation effective : explicite, sinon `address`, sinon
    /// une adresse vide (jamais d'absence qui ferait échouer la construction)
    pub(crate) fn billing(&self) -> Address {
        self.billing_address
            .clone()
            .or_else(|| self.address.clone())
            .unwrap_or_default()
    }

    pub(crate) fn shipping(&self) -> Address {
        self.shipping_address.clone().unwrap_or_default()
    }

    pub(crate) fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Ligne d'article pour le calcul de taxe
#[derive(Debug, Clone)]
pub struct LineItem {
    /// Valeur unitaire déclarée, en cents
    pub declared_value: i64,
    pub quantity: u32,
    /// Type de produit CyberSource ; `shipping_only` si absent
    pub code: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
}

/// Fréquences de facturation acceptées par le processeur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    OnDemand,
    Weekly,
    BiWeekly,
    SemiMonthly,
    Quarterly,
    QuadWeekly,
    SemiAnnually,
    Annually,
}

impl Frequency {
    /// Forme attendue sur le fil
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::OnDemand => "on-demand",
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::SemiMonthly => "semi-monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::QuadWeekly => "quad-weekly",
            Frequency::SemiAnnually => "semi-annually",
            Frequency::Annually => "annually",
        }
    }
}

impl FromStr for Frequency {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on-demand" => Ok(Frequency::OnDemand),
            "weekly" => Ok(Frequency::Weekly),
            "bi-weekly" => Ok(Frequency::BiWeekly),
            "semi-monthly" => Ok(Frequency::SemiMonthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "quad-weekly" => Ok(Frequency::QuadWeekly),
            "semi-annually" => Ok(Frequency::SemiAnnually),
            "annually" => Ok(Frequency::Annually),
            other => Err(GatewayError::InvalidFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profil de facturation récurrente
#[derive(Debug, Clone, Default)]
pub struct Subscription {
    pub subscription_id: Option<String>,
    pub status: Option<String>,
    /// Montant récurrent, en cents
    pub amount: Option<i64>,
    /// Nombre de paiements
    pub occurrences: Option<u32>,
    pub auto_renew: Option<bool>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub approval_required: bool,
    pub event: Option<String>,
    pub bill_payment: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100), "1.00");
        assert_eq!(format_amount(1550), "15.50");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(0), "0.00");
    }

    #[test]
    fn test_frequency_round_trip() {
        for raw in [
            "on-demand",
            "weekly",
            "bi-weekly",
            "semi-monthly",
            "quarterly",
            "quad-weekly",
            "semi-annually",
            "annually",
        ] {
            let parsed: Frequency = raw.parse().unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
    }

    #[test]
    fn test_invalid_frequency() {
        let err = "monthly".parse::<Frequency>().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidFrequency(f) if f == "monthly"));
    }

    #[test]
    fn test_billing_falls_back_to_legacy_address() {
        let mut options = TransactionOptions::default();
        assert!(options.billing().city.is_none());

        options.address = Some(Address {
            city: Some("Lyon".to_string()),
            ..Address::default()
        });
        assert_eq!(options.billing().city.as_deref(), Some("Lyon"));

        options.billing_address = Some(Address {
            city: Some("Paris".to_string()),
            ..Address::default()
        });
        assert_eq!(options.billing().city.as_deref(), Some("Paris"));
    }
}
