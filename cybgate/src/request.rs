//! Construction des corps de requête par opération.
//!
//! Le schéma distant est sensible à l'ordre des éléments : un ordre invalide
//! passe le parseur XML mais est rejeté par le validateur CyberSource. Chaque
//! fonction émet donc ses blocs exactement dans l'ordre attendu.

use crate::card::{Address, CreditCard};
use crate::config::GatewayConfig;
use crate::options::{LineItem, Subscription, TransactionOptions, format_amount};
use crate::token::IdentificationToken;
use cybsoap::{service_element, text_element};
use xmltree::{Element, XMLNode};

const DATE_FORMAT: &str = "%Y%m%d";

fn push(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

/// Bloc d'adresse `billTo`/`shipTo`. Les six champs postaux et l'email sont
/// toujours émis, vides quand ils sont inconnus.
fn address_block(
    tag: &str,
    first_name: &str,
    last_name: &str,
    address: &Address,
    email: &str,
) -> Element {
    let mut block = Element::new(tag);
    push(&mut block, text_element("firstName", first_name));
    push(&mut block, text_element("lastName", last_name));
    push(
        &mut block,
        text_element("street1", address.address1.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("street2", address.address2.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("city", address.city.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("state", address.state.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("postalCode", address.zip.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("country", address.country.as_deref().unwrap_or("")),
    );
    push(&mut block, text_element("email", email));
    block
}

fn bill_to(card: &CreditCard, options: &TransactionOptions) -> Element {
    address_block(
        "billTo",
        &card.first_name,
        &card.last_name,
        &options.billing(),
        options.email.as_deref().unwrap_or(""),
    )
}

fn ship_to(card: &CreditCard, options: &TransactionOptions) -> Element {
    address_block(
        "shipTo",
        &card.first_name,
        &card.last_name,
        &options.shipping(),
        options.email.as_deref().unwrap_or(""),
    )
}

/// Pour les abonnements les noms viennent de l'adresse de facturation
fn bill_to_from_address(address: &Address, options: &TransactionOptions) -> Element {
    address_block(
        "billTo",
        address.first_name.as_deref().unwrap_or(""),
        address.last_name.as_deref().unwrap_or(""),
        address,
        options.email.as_deref().unwrap_or(""),
    )
}

fn purchase_totals(currency: &str, grand_total: Option<i64>) -> Element {
    let mut block = Element::new("purchaseTotals");
    push(&mut block, text_element("currency", currency));
    if let Some(cents) = grand_total {
        push(&mut block, text_element("grandTotalAmount", &format_amount(cents)));
    }
    block
}

fn card_block(config: &GatewayConfig, card: &CreditCard) -> Element {
    let mut block = Element::new("card");
    push(&mut block, text_element("accountNumber", &card.number));
    push(
        &mut block,
        text_element("expirationMonth", &card.month_two_digits()),
    );
    push(
        &mut block,
        text_element("expirationYear", &card.year_four_digits()),
    );
    // cvNumber est omis (pas émis vide) quand le CVV est ignoré ou absent
    let verification = card.verification_value.as_deref().unwrap_or("");
    if !config.ignore_cvv && !verification.is_empty() {
        push(&mut block, text_element("cvNumber", verification));
    }
    push(&mut block, text_element("cardType", card.brand.code()));
    block
}

/// Lignes d'articles, indexées à partir de 0 via l'attribut `id`
fn line_items(items: &[LineItem]) -> Vec<Element> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut block = Element::new("item");
            block
                .attributes
                .insert("id".to_string(), index.to_string());
            push(
                &mut block,
                text_element("unitPrice", &format_amount(item.declared_value)),
            );
            push(
                &mut block,
                text_element("quantity", &item.quantity.to_string()),
            );
            push(
                &mut block,
                text_element("productCode", item.code.as_deref().unwrap_or("shipping_only")),
            );
            push(
                &mut block,
                text_element("productName", item.description.as_deref().unwrap_or("")),
            );
            push(
                &mut block,
                text_element("productSKU", item.sku.as_deref().unwrap_or("")),
            );
            block
        })
        .collect()
}

/// Le bloc `businessRules` est toujours émis, même vide : le schéma attend
/// l'élément
fn business_rules(config: &GatewayConfig) -> Element {
    let mut block = Element::new("businessRules");
    if config.ignore_avs {
        push(&mut block, text_element("ignoreAVSResult", "true"));
    }
    if config.ignore_cvv {
        push(&mut block, text_element("ignoreCVResult", "true"));
    }
    block
}

fn auth_service() -> Element {
    service_element("ccAuthService")
}

fn capture_service(token: &IdentificationToken) -> Element {
    let mut block = service_element("ccCaptureService");
    push(
        &mut block,
        text_element("authRequestID", token.request_id.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("authRequestToken", token.request_token.as_deref().unwrap_or("")),
    );
    block
}

fn void_service(token: &IdentificationToken) -> Element {
    let mut block = service_element("voidService");
    push(
        &mut block,
        text_element("voidRequestID", token.request_id.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("voidRequestToken", token.request_token.as_deref().unwrap_or("")),
    );
    block
}

fn auth_reversal_service(token: &IdentificationToken) -> Element {
    let mut block = service_element("ccAuthReversalService");
    push(
        &mut block,
        text_element("authRequestID", token.request_id.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element("authRequestToken", token.request_token.as_deref().unwrap_or("")),
    );
    block
}

fn credit_service(token: &IdentificationToken) -> Element {
    let mut block = service_element("ccCreditService");
    push(
        &mut block,
        text_element("captureRequestID", token.request_id.as_deref().unwrap_or("")),
    );
    push(
        &mut block,
        text_element(
            "captureRequestToken",
            token.request_token.as_deref().unwrap_or(""),
        ),
    );
    block
}

/// Paire autorisation + capture d'un achat en un seul aller-retour
fn purchase_services() -> Vec<Element> {
    vec![service_element("ccAuthService"), service_element("ccCaptureService")]
}

fn tax_service(config: &GatewayConfig) -> Element {
    let mut block = service_element("taxService");
    if let Some(nexus) = config.nexus.as_deref().filter(|n| !n.is_empty()) {
        push(&mut block, text_element("nexus", nexus));
    }
    if let Some(vat) = config.vat_reg_number.as_deref().filter(|v| !v.is_empty()) {
        push(&mut block, text_element("sellerRegistration", vat));
    }
    block
}

fn subscription_info(subscription: &Subscription, subscription_id: Option<&str>) -> Element {
    let mut block = Element::new("recurringSubscriptionInfo");
    let id = subscription_id
        .or(subscription.subscription_id.as_deref())
        .unwrap_or("");
    push(&mut block, text_element("subscriptionID", id));
    if let Some(status) = subscription.status.as_deref() {
        push(&mut block, text_element("status", status));
    }
    if let Some(amount) = subscription.amount {
        push(&mut block, text_element("amount", &format_amount(amount)));
    }
    if let Some(occurrences) = subscription.occurrences {
        push(
            &mut block,
            text_element("numberOfPayments", &occurrences.to_string()),
        );
    }
    if let Some(auto_renew) = subscription.auto_renew {
        push(
            &mut block,
            text_element("automaticRenew", &auto_renew.to_string()),
        );
    }
    if let Some(frequency) = subscription.frequency {
        push(&mut block, text_element("frequency", frequency.as_str()));
    }
    if let Some(start) = subscription.start_date {
        push(
            &mut block,
            text_element("startDate", &start.format(DATE_FORMAT).to_string()),
        );
    }
    if let Some(end) = subscription.end_date {
        push(
            &mut block,
            text_element("endDate", &end.format(DATE_FORMAT).to_string()),
        );
    }
    push(
        &mut block,
        text_element("approvalRequired", &subscription.approval_required.to_string()),
    );
    if let Some(event) = subscription.event.as_deref() {
        push(&mut block, text_element("event", event));
    }
    if let Some(bill_payment) = subscription.bill_payment {
        push(
            &mut block,
            text_element("billPayment", &bill_payment.to_string()),
        );
    }
    block
}

pub(crate) fn authorization_body(
    config: &GatewayConfig,
    money: i64,
    card: &CreditCard,
    options: &TransactionOptions,
) -> Vec<Element> {
    vec![
        bill_to(card, options),
        purchase_totals(options.currency(), Some(money)),
        card_block(config, card),
        auth_service(),
        business_rules(config),
    ]
}

pub(crate) fn purchase_body(
    config: &GatewayConfig,
    money: i64,
    card: &CreditCard,
    options: &TransactionOptions,
) -> Vec<Element> {
    let mut body = vec![
        bill_to(card, options),
        purchase_totals(options.currency(), Some(money)),
        card_block(config, card),
    ];
    body.extend(purchase_services());
    body.push(business_rules(config));
    body
}

pub(crate) fn capture_body(
    config: &GatewayConfig,
    money: i64,
    token: &IdentificationToken,
    options: &TransactionOptions,
) -> Vec<Element> {
    vec![
        purchase_totals(options.currency(), Some(money)),
        capture_service(token),
        business_rules(config),
    ]
}

pub(crate) fn void_body(token: &IdentificationToken) -> Vec<Element> {
    vec![void_service(token)]
}

pub(crate) fn auth_reversal_body(
    money: i64,
    token: &IdentificationToken,
    options: &TransactionOptions,
) -> Vec<Element> {
    vec![
        purchase_totals(options.currency(), Some(money)),
        auth_reversal_service(token),
    ]
}

pub(crate) fn credit_body(
    money: i64,
    token: &IdentificationToken,
    options: &TransactionOptions,
) -> Vec<Element> {
    vec![
        purchase_totals(options.currency(), Some(money)),
        credit_service(token),
    ]
}

pub(crate) fn tax_calculation_body(
    config: &GatewayConfig,
    card: &CreditCard,
    options: &TransactionOptions,
) -> Vec<Element> {
    let mut body = vec![bill_to(card, options), ship_to(card, options)];
    body.extend(line_items(&options.line_items));
    // pas de grandTotalAmount pour le calcul de taxe, seulement la devise
    body.push(purchase_totals(options.currency(), None));
    body.push(tax_service(config));
    body.push(business_rules(config));
    body
}

pub(crate) fn subscription_create_body(
    config: &GatewayConfig,
    card: &CreditCard,
    options: &TransactionOptions,
) -> Vec<Element> {
    let billing = options.billing();
    let subscription = options.subscription.clone().unwrap_or_default();

    let mut body = vec![
        bill_to_from_address(&billing, options),
        purchase_totals(options.currency(), options.setup_fee),
        card_block(config, card),
        subscription_info(&subscription, None),
    ];
    if options.setup_fee.is_some() {
        body.extend(purchase_services());
    }
    body.push(service_element("paySubscriptionCreateService"));
    body.push(business_rules(config));
    body
}

pub(crate) fn subscription_update_body(
    config: &GatewayConfig,
    options: &TransactionOptions,
    subscription_id: Option<&str>,
) -> Vec<Element> {
    let subscription = options.subscription.clone().unwrap_or_default();

    let mut body = Vec::new();
    if let Some(billing) = options.billing_address.as_ref() {
        body.push(bill_to_from_address(billing, options));
    }
    if options.setup_fee.is_some() {
        body.push(purchase_totals(options.currency(), options.setup_fee));
    }
    if let Some(card) = options.credit_card.as_ref() {
        body.push(card_block(config, card));
    }
    body.push(subscription_info(&subscription, subscription_id));
    if options.setup_fee.is_some() {
        body.extend(purchase_services());
    }
    body.push(service_element("paySubscriptionUpdateService"));
    body.push(business_rules(config));
    body
}

pub(crate) fn subscription_purchase_body(
    config: &GatewayConfig,
    money: i64,
    options: &TransactionOptions,
    subscription_id: Option<&str>,
) -> Vec<Element> {
    let subscription = options.subscription.clone().unwrap_or_default();

    let mut body = vec![
        purchase_totals(options.currency(), Some(money)),
        subscription_info(&subscription, subscription_id),
    ];
    body.extend(purchase_services());
    body.push(business_rules(config));
    body
}
