//! # cybgate - client SOAP du processeur de paiement CyberSource
//!
//! Traduit des opérations de paiement de haut niveau (autorisation, capture,
//! achat, annulation, remboursement, calcul de taxe, abonnements récurrents)
//! en enveloppes SOAP CyberSource, les transmet en HTTPS et normalise la
//! réponse en un résultat exploitable (succès, message, jeton d'autorisation,
//! codes AVS/CVV).
//!
//! La couche protocolaire (enveloppes, aplatissement des réponses) vit dans
//! le crate `cybsoap` ; ce crate porte la logique métier du client.
//!
//! ## Example
//!
//! ```no_run
//! use cybgate::{CardBrand, CreditCard, Gateway, GatewayConfig, TransactionOptions};
//!
//! let config = GatewayConfig::new("merchant", "transaction-key")?;
//! let gateway = Gateway::new(config);
//!
//! let card = CreditCard {
//!     first_name: "Jeanne".to_string(),
//!     last_name: "Dupont".to_string(),
//!     number: "4111111111111111".to_string(),
//!     month: 9,
//!     year: 2027,
//!     verification_value: Some("123".to_string()),
//!     brand: CardBrand::Visa,
//! };
//! let options = TransactionOptions {
//!     order_id: Some("order-1".to_string()),
//!     email: Some("jeanne@example.com".to_string()),
//!     ..TransactionOptions::default()
//! };
//!
//! let response = gateway.authorize(1000, &card, &options)?;
//! if response.success {
//!     // le jeton permet une capture ultérieure
//!     let authorization = response.authorization.unwrap();
//!     gateway.capture(1000, &authorization, &options)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod card;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod options;
pub mod response;
pub mod token;
pub mod transport;

mod request;

pub use card::{Address, CardBrand, CreditCard};
pub use config::{GatewayConfig, GatewayMode, gateway_mode, set_gateway_mode};
pub use errors::GatewayError;
pub use gateway::{Gateway, LIVE_URL, TEST_URL};
pub use options::{DEFAULT_CURRENCY, Frequency, LineItem, Subscription, TransactionOptions};
pub use response::{RESPONSE_CODES, Response};
pub use token::IdentificationToken;
pub use transport::{HttpTransport, TransportError, XmlTransport};
