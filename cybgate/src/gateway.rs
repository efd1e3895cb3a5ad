//! Orchestration d'un aller-retour complet avec le processeur

use crate::card::CreditCard;
use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::options::TransactionOptions;
use crate::request;
use crate::response::Response;
use crate::token::IdentificationToken;
use crate::transport::{HttpTransport, XmlTransport};
use tracing::debug;
use xmltree::Element;

/// Serveur de test CyberSource
pub const TEST_URL: &str = "https://ics2wstest.ic3.com/commerce/1.x/transactionProcessor";

/// Serveur de production CyberSource
pub const LIVE_URL: &str = "https://ics2ws.ic3.com/commerce/1.x/transactionProcessor";

/// Client du processeur de paiement CyberSource.
///
/// Chaque opération est un aller-retour unique : construction du corps,
/// enveloppe SOAP, POST, aplatissement de la réponse, décision. Le client ne
/// garde aucun état entre les appels en dehors de sa configuration ; il est
/// utilisable depuis plusieurs threads si le transport l'est.
pub struct Gateway {
    config: GatewayConfig,
    transport: Box<dyn XmlTransport>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_transport(config, Box::new(HttpTransport::new()))
    }

    /// Injecte un transport spécifique (tests, instrumentation)
    pub fn with_transport(config: GatewayConfig, transport: Box<dyn XmlTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Viser le serveur de test ? (flag du client ou mode global du processus)
    pub fn is_test(&self) -> bool {
        self.config.is_test()
    }

    /// Demande une autorisation d'un montant (en cents) sur une carte.
    ///
    /// `order_id` et `email` sont requis.
    pub fn authorize(
        &self,
        money: i64,
        card: &CreditCard,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let order_id = require(options.order_id.as_deref(), "order_id")?;
        require(options.email.as_deref(), "email")?;
        debug!(order_id, money, "authorize");

        let body = request::authorization_body(&self.config, money, card, options);
        self.commit(body, Some(order_id))
    }

    /// Capture une autorisation précédemment accordée
    pub fn capture(
        &self,
        money: i64,
        authorization: &str,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let token = IdentificationToken::parse(authorization);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), money, "capture");

        let body = request::capture_body(&self.config, money, &token, options);
        self.commit(body, token.order_id.as_deref())
    }

    /// Autorisation immédiatement suivie d'une capture.
    ///
    /// `order_id` et `email` sont requis.
    pub fn purchase(
        &self,
        money: i64,
        card: &CreditCard,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let order_id = require(options.order_id.as_deref(), "order_id")?;
        require(options.email.as_deref(), "email")?;
        debug!(order_id, money, "purchase");

        let body = request::purchase_body(&self.config, money, card, options);
        self.commit(body, Some(order_id))
    }

    /// Annule une transaction non encore réglée
    pub fn void(
        &self,
        authorization: &str,
        _options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let token = IdentificationToken::parse(authorization);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), "void");

        let body = request::void_body(&token);
        self.commit(body, token.order_id.as_deref())
    }

    /// Reverse une autorisation non capturée
    pub fn auth_reversal(
        &self,
        money: i64,
        authorization: &str,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let token = IdentificationToken::parse(authorization);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), money, "auth_reversal");

        let body = request::auth_reversal_body(money, &token, options);
        self.commit(body, token.order_id.as_deref())
    }

    /// Crédite une capture précédente
    pub fn refund(
        &self,
        money: i64,
        authorization: &str,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let token = IdentificationToken::parse(authorization);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), money, "refund");

        let body = request::credit_body(money, &token, options);
        self.commit(body, token.order_id.as_deref())
    }

    #[deprecated(note = "use `refund`")]
    pub fn credit(
        &self,
        money: i64,
        authorization: &str,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        self.refund(money, authorization, options)
    }

    /// Calcule la taxe sur des lignes d'articles.
    ///
    /// CyberSource exige les lignes d'articles ; sans prix par article,
    /// envoyer une ligne unique au sous-total de la commande.
    pub fn calculate_tax(
        &self,
        card: &CreditCard,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        require(options.email.as_deref(), "email")?;
        if options.line_items.is_empty() {
            return Err(GatewayError::MissingOption("line_items"));
        }
        debug!(items = options.line_items.len(), "calculate_tax");

        let body = request::tax_calculation_body(&self.config, card, options);
        self.commit(body, options.order_id.as_deref())
    }

    /// Crée un profil de facturation récurrente.
    ///
    /// Requis : `order_id`, `email`, une adresse de facturation portant
    /// prénom et nom, et la fréquence de l'abonnement.
    pub fn recurring(
        &self,
        card: &CreditCard,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        let order_id = require(options.order_id.as_deref(), "order_id")?;
        require(options.email.as_deref(), "email")?;

        let billing = options
            .billing_address
            .as_ref()
            .ok_or(GatewayError::MissingOption("billing_address"))?;
        require(billing.first_name.as_deref(), "billing_address.first_name")?;
        require(billing.last_name.as_deref(), "billing_address.last_name")?;

        options
            .subscription
            .as_ref()
            .and_then(|s| s.frequency)
            .ok_or(GatewayError::MissingOption("subscription.frequency"))?;
        debug!(order_id, "recurring (subscription create)");

        let body = request::subscription_create_body(&self.config, card, options);
        self.commit(body, Some(order_id))
    }

    /// Met à jour un profil récurrent existant, identifié par le jeton
    /// retourné lors de sa création
    pub fn update_recurring(
        &self,
        profile_id: &str,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        if profile_id.is_empty() {
            return Err(GatewayError::MissingOption("profile_id"));
        }
        let token = IdentificationToken::parse(profile_id);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), "update_recurring");

        let body =
            request::subscription_update_body(&self.config, options, token.request_id.as_deref());
        self.commit(body, token.order_id.as_deref())
    }

    /// Facture le montant dû sur un profil récurrent
    pub fn bill_outstanding_amount(
        &self,
        profile_id: &str,
        money: i64,
        options: &TransactionOptions,
    ) -> Result<Response, GatewayError> {
        if profile_id.is_empty() {
            return Err(GatewayError::MissingOption("profile_id"));
        }
        let token = IdentificationToken::parse(profile_id);
        debug!(order_id = token.order_id.as_deref().unwrap_or(""), money, "bill_outstanding_amount");

        let body = request::subscription_purchase_body(
            &self.config,
            money,
            options,
            token.request_id.as_deref(),
        );
        self.commit(body, token.order_id.as_deref())
    }

    /// construire → transmettre → aplatir → décider
    fn commit(
        &self,
        body: Vec<Element>,
        merchant_reference: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let url = if self.is_test() { TEST_URL } else { LIVE_URL };
        let request = cybsoap::build_request(
            &self.config.login,
            &self.config.password,
            merchant_reference.unwrap_or(""),
            body,
        )?;

        let reply = self.transport.post_xml(url, &request)?;
        let fields = cybsoap::parse_reply(&reply)?;

        Ok(Response::from_reply(fields, merchant_reference, self.is_test()))
    }
}

fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, GatewayError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::MissingOption(name))
}
