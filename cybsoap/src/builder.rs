//! Construction des requêtes SOAP CyberSource

use xmltree::{Element, EmitterConfig, XMLNode};

/// Namespace standard de l'enveloppe SOAP
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace WS-Security (secext)
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// Type du mot de passe transmis en clair (username-token-profile)
pub const PASSWORD_TEXT_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Namespace versionné du schéma transactionnel CyberSource.
///
/// Contrat de protocole : la version doit rester celle que le parseur de
/// réponses attend.
pub const TRANSACTION_NS: &str = "urn:schemas-cybersource-com:transaction-data-1.32";

const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Champs d'identification du client envoyés avec chaque requête
pub const CLIENT_LIBRARY: &str = "cybsoap";
pub const CLIENT_LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLIENT_ENVIRONMENT: &str = "Linux";

/// Crée un élément feuille avec son contenu texte (vide si `text` est vide)
pub fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    if !text.is_empty() {
        elem.children.push(XMLNode::Text(text.to_string()));
    }
    elem
}

/// Crée un élément de service CyberSource (`run="true"`)
pub fn service_element(name: &str) -> Element {
    let mut elem = Element::new(name);
    elem.attributes
        .insert("run".to_string(), "true".to_string());
    elem
}

/// Construit l'enveloppe SOAP complète d'une requête CyberSource.
///
/// # Arguments
///
/// * `login` - identifiant marchand (aussi utilisé comme wsse:Username)
/// * `password` - clé de transaction, transmise en PasswordText
/// * `merchant_reference` - référence de commande du marchand
/// * `body_children` - éléments du corps d'opération, dans l'ordre du schéma
///
/// # Returns
///
/// XML SOAP formaté en String, déterministe pour des entrées identiques
pub fn build_request(
    login: &str,
    password: &str,
    merchant_reference: &str,
    body_children: Vec<Element>,
) -> Result<String, xmltree::Error> {
    // Header : wsse:Security avec UsernameToken
    let mut password_elem = text_element("wsse:Password", password);
    password_elem
        .attributes
        .insert("Type".to_string(), PASSWORD_TEXT_TYPE.to_string());

    let mut username_token = Element::new("wsse:UsernameToken");
    username_token
        .children
        .push(XMLNode::Element(text_element("wsse:Username", login)));
    username_token.children.push(XMLNode::Element(password_elem));

    let mut security = Element::new("wsse:Security");
    security
        .attributes
        .insert("s:mustUnderstand".to_string(), "1".to_string());
    security
        .attributes
        .insert("xmlns:wsse".to_string(), WSSE_NS.to_string());
    security.children.push(XMLNode::Element(username_token));

    let mut header = Element::new("s:Header");
    header.children.push(XMLNode::Element(security));

    // requestMessage : identité marchand d'abord, puis le corps d'opération.
    // L'ordre est imposé par le schéma distant.
    let mut request_message = Element::new("requestMessage");
    request_message
        .attributes
        .insert("xmlns".to_string(), TRANSACTION_NS.to_string());
    request_message
        .children
        .push(XMLNode::Element(text_element("merchantID", login)));
    request_message.children.push(XMLNode::Element(text_element(
        "merchantReferenceCode",
        merchant_reference,
    )));
    request_message
        .children
        .push(XMLNode::Element(text_element("clientLibrary", CLIENT_LIBRARY)));
    request_message.children.push(XMLNode::Element(text_element(
        "clientLibraryVersion",
        CLIENT_LIBRARY_VERSION,
    )));
    request_message.children.push(XMLNode::Element(text_element(
        "clientEnvironment",
        CLIENT_ENVIRONMENT,
    )));
    for child in body_children {
        request_message.children.push(XMLNode::Element(child));
    }

    let mut body = Element::new("s:Body");
    body.attributes
        .insert("xmlns:xsi".to_string(), XSI_NS.to_string());
    body.attributes
        .insert("xmlns:xsd".to_string(), XSD_NS.to_string());
    body.children.push(XMLNode::Element(request_message));

    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), SOAP_ENVELOPE_NS.to_string());
    envelope.children.push(XMLNode::Element(header));
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf).unwrap())
}
