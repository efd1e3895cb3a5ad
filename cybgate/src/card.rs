//! Cartes et adresses telles qu'attendues par CyberSource

use crate::errors::GatewayError;
use std::fmt;
use std::str::FromStr;

/// Marques de cartes acceptées, avec leur code CyberSource à trois chiffres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Master,
    AmericanExpress,
    Discover,
}

impl CardBrand {
    /// Code carte attendu par le processeur
    pub fn code(self) -> &'static str {
        match self {
            CardBrand::Visa => "001",
            CardBrand::Master => "002",
            CardBrand::AmericanExpress => "003",
            CardBrand::Discover => "004",
        }
    }
}

impl FromStr for CardBrand {
    type Err = GatewayError;

    /// Une marque inconnue est une erreur de programmation locale : on échoue
    /// avant toute activité réseau.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visa" => Ok(CardBrand::Visa),
            "master" => Ok(CardBrand::Master),
            "american_express" => Ok(CardBrand::AmericanExpress),
            "discover" => Ok(CardBrand::Discover),
            other => Err(GatewayError::UnsupportedCardBrand(other.to_string())),
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardBrand::Visa => "visa",
            CardBrand::Master => "master",
            CardBrand::AmericanExpress => "american_express",
            CardBrand::Discover => "discover",
        };
        write!(f, "{name}")
    }
}

/// Carte de crédit, vue au travers du contrat minimal du client
#[derive(Debug, Clone)]
pub struct CreditCard {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    pub month: u8,
    pub year: u16,
    pub verification_value: Option<String>,
    pub brand: CardBrand,
}

impl CreditCard {
    /// Mois d'expiration sur deux chiffres
    pub fn month_two_digits(&self) -> String {
        format!("{:02}", self.month)
    }

    /// Année d'expiration sur quatre chiffres
    pub fn year_four_digits(&self) -> String {
        format!("{:04}", self.year)
    }
}

/// Adresse postale ; tous les champs sont optionnels, les champs absents sont
/// émis vides dans la requête
#[derive(Debug, Clone, Default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}
