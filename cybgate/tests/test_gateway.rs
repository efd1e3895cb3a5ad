use cybgate::{
    Address, CardBrand, CreditCard, Gateway, GatewayConfig, GatewayError, LineItem,
    Subscription, TransactionOptions, TransportError, XmlTransport, LIVE_URL, TEST_URL,
};
use std::sync::{Arc, Mutex};

/// Transport factice : enregistre les requêtes et rejoue une réponse fixe
#[derive(Clone)]
struct MockTransport(Arc<MockInner>);

struct MockInner {
    reply: String,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    fn new(reply: &str) -> Self {
        Self(Arc::new(MockInner {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }))
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.0.requests.lock().unwrap().clone()
    }
}

impl XmlTransport for MockTransport {
    fn post_xml(&self, url: &str, body: &str) -> Result<String, TransportError> {
        self.0
            .requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.to_string()));
        Ok(self.0.reply.clone())
    }
}

/// Transport qui échoue toujours, comme une panne réseau
struct FailingTransport;

impl XmlTransport for FailingTransport {
    fn post_xml(&self, url: &str, _body: &str) -> Result<String, TransportError> {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        Err(TransportError::Http {
            url: url.to_string(),
            source: ureq::Error::Io(io),
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cybgate=debug")
        .try_init();
}

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::new("merchant", "secret").unwrap();
    config.test = true;
    config
}

fn card() -> CreditCard {
    CreditCard {
        first_name: "Jeanne".to_string(),
        last_name: "Dupont".to_string(),
        number: "4111111111111111".to_string(),
        month: 9,
        year: 2027,
        verification_value: Some("123".to_string()),
        brand: CardBrand::Visa,
    }
}

fn options() -> TransactionOptions {
    TransactionOptions {
        order_id: Some("ORD1".to_string()),
        email: Some("jeanne@example.com".to_string()),
        billing_address: Some(Address {
            first_name: Some("Jeanne".to_string()),
            last_name: Some("Dupont".to_string()),
            address1: Some("12 rue des Lilas".to_string()),
            city: Some("Paris".to_string()),
            zip: Some("75011".to_string()),
            country: Some("FR".to_string()),
            ..Address::default()
        }),
        ..TransactionOptions::default()
    }
}

fn reply(decision: &str, reason_code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.32">
      <c:merchantReferenceCode>ORD1</c:merchantReferenceCode>
      <c:requestID>R1</c:requestID>
      <c:decision>{decision}</c:decision>
      <c:reasonCode>{reason_code}</c:reasonCode>
      <c:requestToken>T1</c:requestToken>
      <c:ccAuthReply>
        <c:avsCode>Y</c:avsCode>
      </c:ccAuthReply>
    </c:replyMessage>
  </soap:Body>
</soap:Envelope>"#
    )
}

#[test]
fn test_authorize_success_round_trip() {
    init_tracing();
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport.clone()));

    let response = gateway.authorize(1000, &card(), &options()).unwrap();

    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("Successful transaction"));
    assert_eq!(response.authorization.as_deref(), Some("ORD1;R1;T1"));
    assert_eq!(response.avs_code.as_deref(), Some("Y"));
    assert!(response.test);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let (url, body) = &requests[0];
    assert_eq!(url, TEST_URL);
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<wsse:Username>merchant</wsse:Username>"));
    assert!(body.contains("<merchantReferenceCode>ORD1</merchantReferenceCode>"));
    assert!(body.contains("ccAuthService"));
    assert!(!body.contains("ccCaptureService"));
}

#[test]
fn test_live_mode_targets_live_endpoint() {
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let config = GatewayConfig::new("merchant", "secret").unwrap();
    let gateway = Gateway::with_transport(config, Box::new(transport.clone()));

    let response = gateway.authorize(1000, &card(), &options()).unwrap();
    assert!(!response.test);
    assert_eq!(transport.requests()[0].0, LIVE_URL);
}

#[test]
fn test_declined_purchase_has_no_authorization() {
    let transport = MockTransport::new(&reply("REJECT", "203"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport));

    let response = gateway.purchase(1000, &card(), &options()).unwrap();

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("General decline of the card"));
    assert_eq!(response.authorization, None);
    // l'AVS reste disponible même sur refus
    assert_eq!(response.avs_code.as_deref(), Some("Y"));
}

#[test]
fn test_capture_chains_on_authorization_token() {
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport.clone()));

    let auth = gateway.authorize(1000, &card(), &options()).unwrap();
    let authorization = auth.authorization.unwrap();

    gateway.capture(1000, &authorization, &options()).unwrap();

    let (_, capture_body) = transport.requests()[1].clone();
    // la référence marchand vient du jeton, les identifiants du service aussi
    assert!(capture_body.contains("<merchantReferenceCode>ORD1</merchantReferenceCode>"));
    assert!(capture_body.contains("<authRequestID>R1</authRequestID>"));
    assert!(capture_body.contains("<authRequestToken>T1</authRequestToken>"));
}

#[test]
fn test_capture_with_truncated_token_still_sends() {
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport.clone()));

    // un jeton incomplet ne provoque jamais d'erreur locale
    gateway.capture(1000, "ORD1", &options()).unwrap();

    let (_, body) = transport.requests()[0].clone();
    assert!(body.contains("<merchantReferenceCode>ORD1</merchantReferenceCode>"));
    assert!(body.contains("<authRequestID />") || body.contains("<authRequestID/>"));
}

#[test]
fn test_void_and_refund_round_trips() {
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport.clone()));

    gateway.void("ORD1;R1;T1", &TransactionOptions::default()).unwrap();
    gateway.refund(500, "ORD1;R1;T1", &TransactionOptions::default()).unwrap();

    let requests = transport.requests();
    assert!(requests[0].1.contains("<voidRequestID>R1</voidRequestID>"));
    assert!(requests[1].1.contains("<captureRequestID>R1</captureRequestID>"));
    assert!(requests[1].1.contains("<grandTotalAmount>5.00</grandTotalAmount>"));
}

#[test]
fn test_soap_fault_reply() {
    let fault = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>Server</faultcode>
      <faultstring>Internal Error</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

    let gateway = Gateway::with_transport(test_config(), Box::new(MockTransport::new(fault)));
    let response = gateway.authorize(1000, &card(), &options()).unwrap();

    assert!(!response.success);
    assert_eq!(response.message.as_deref(), Some("Server: Internal Error"));
    assert_eq!(response.authorization, None);
}

#[test]
fn test_transport_failure_is_distinguishable() {
    let gateway = Gateway::with_transport(test_config(), Box::new(FailingTransport));
    let err = gateway.authorize(1000, &card(), &options()).unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[test]
fn test_unparsable_reply_is_a_parse_error() {
    let gateway =
        Gateway::with_transport(test_config(), Box::new(MockTransport::new("garbage <<<")));
    let err = gateway.authorize(1000, &card(), &options()).unwrap_err();
    assert!(matches!(err, GatewayError::Parse(_)));
}

#[test]
fn test_calculate_tax_round_trip() {
    let tax_reply = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.32">
      <c:decision>ACCEPT</c:decision>
      <c:reasonCode>100</c:reasonCode>
      <c:requestID>R1</c:requestID>
      <c:taxReply>
        <c:item id="0">
          <c:totalTaxAmount>0.10</c:totalTaxAmount>
        </c:item>
        <c:item id="1">
          <c:totalTaxAmount>0.50</c:totalTaxAmount>
        </c:item>
      </c:taxReply>
    </c:replyMessage>
  </soap:Body>
</soap:Envelope>"#;

    let mut config = test_config();
    config.nexus = Some("WI CA QC".to_string());
    let transport = MockTransport::new(tax_reply);
    let gateway = Gateway::with_transport(config, Box::new(transport.clone()));

    let mut opts = options();
    opts.line_items = vec![
        LineItem {
            declared_value: 100,
            quantity: 2,
            code: Some("default".to_string()),
            description: Some("Giant Walrus".to_string()),
            sku: Some("WA323232323232323".to_string()),
        },
        LineItem {
            declared_value: 600,
            quantity: 1,
            code: Some("default".to_string()),
            description: Some("Marble Snowcone".to_string()),
            sku: Some("FAKE1232132113123".to_string()),
        },
    ];

    let response = gateway.calculate_tax(&card(), &opts).unwrap();

    assert!(response.success);
    assert_eq!(response.params.get("item_0_totalTaxAmount"), Some("0.10"));
    assert_eq!(response.params.get("item_1_totalTaxAmount"), Some("0.50"));

    let (_, body) = transport.requests()[0].clone();
    assert!(body.contains(r#"<item id="0">"#));
    assert!(body.contains(r#"<item id="1">"#));
    assert!(body.contains("<nexus>WI CA QC</nexus>"));
    assert!(!body.contains("grandTotalAmount"));
}

#[test]
fn test_subscription_lifecycle() {
    let transport = MockTransport::new(&reply("ACCEPT", "100"));
    let gateway = Gateway::with_transport(test_config(), Box::new(transport.clone()));

    let mut opts = options();
    opts.subscription = Some(Subscription {
        frequency: Some("weekly".parse().unwrap()),
        amount: Some(2500),
        ..Subscription::default()
    });

    let created = gateway.recurring(&card(), &opts).unwrap();
    let profile_id = created.authorization.unwrap();
    assert_eq!(profile_id, "ORD1;R1;T1");

    gateway.update_recurring(&profile_id, &opts).unwrap();
    gateway.bill_outstanding_amount(&profile_id, 2500, &opts).unwrap();

    let requests = transport.requests();
    assert!(requests[0].1.contains("paySubscriptionCreateService"));
    // l'identifiant d'abonnement vient du jeton de création
    assert!(requests[1].1.contains("<subscriptionID>R1</subscriptionID>"));
    assert!(requests[1].1.contains("paySubscriptionUpdateService"));
    assert!(requests[2].1.contains("<subscriptionID>R1</subscriptionID>"));
    assert!(requests[2].1.contains("<grandTotalAmount>25.00</grandTotalAmount>"));
}
