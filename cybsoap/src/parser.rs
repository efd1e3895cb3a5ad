//! Aplatissement des réponses SOAP CyberSource

use std::collections::HashMap;
use xmltree::{Element, XMLNode};

/// Erreur de parsing d'une réponse SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] xmltree::ParseError),
}

/// Réponse aplatie en paires champ/valeur.
///
/// Les clés sont les noms locaux des éléments feuilles ; les sous-champs des
/// lignes d'articles sont préfixés `item[_<id>]_`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyFields(HashMap<String, String>);

impl ReplyFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn decision(&self) -> Option<&str> {
        self.get("decision")
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.get("reasonCode")
    }

    pub fn request_id(&self) -> Option<&str> {
        self.get("requestID")
    }

    pub fn request_token(&self) -> Option<&str> {
        self.get("requestToken")
    }

    pub fn avs_code(&self) -> Option<&str> {
        self.get("avsCode")
    }

    pub fn cv_code(&self) -> Option<&str> {
        self.get("cvCode")
    }

    pub fn message(&self) -> Option<&str> {
        self.get("message")
    }
}

/// Parse une réponse CyberSource en champs aplatis.
///
/// Cherche d'abord un élément `replyMessage` n'importe où dans le document,
/// puis un `Fault` SOAP. Si aucun des deux n'est présent la map retournée est
/// vide : c'est une réponse sans donnée exploitable, pas une erreur. Un XML
/// invalide, lui, est une vraie erreur de parsing.
pub fn parse_reply(xml: &str) -> Result<ReplyFields, SoapParseError> {
    let root = Element::parse(xml.as_bytes())?;
    let mut fields = ReplyFields::default();

    if let Some(reply) = find_descendant(&root, "replyMessage") {
        for child in child_elements(reply) {
            // reasonCode sous la racine est aussi recopié dans `message` ;
            // la traduction en texte lisible se fait plus haut.
            if local_name(&child.name) == "reasonCode" {
                fields.insert("message", element_text(child));
            }
            flatten_element(&mut fields, child, Some(reply));
        }
    } else if let Some(fault) = find_descendant(&root, "Fault") {
        for child in child_elements(fault) {
            flatten_element(&mut fields, child, Some(fault));
        }
        let message = format!(
            "{}: {}",
            fields.get("faultcode").unwrap_or(""),
            fields.get("faultstring").unwrap_or("")
        );
        fields.insert("message", message);
    }

    Ok(fields)
}

/// Parcours en profondeur : une feuille produit une entrée, un élément
/// intermédiaire ne fait que descendre dans ses enfants.
fn flatten_element(fields: &mut ReplyFields, node: &Element, parent: Option<&Element>) {
    let children: Vec<&Element> = child_elements(node).collect();
    if children.is_empty() {
        fields.insert(flat_key(node, parent), element_text(node));
    } else {
        for child in children {
            flatten_element(fields, child, Some(node));
        }
    }
}

/// Clé d'une feuille : son nom local, sauf sous un conteneur d'article
/// (`item`) où la clé devient `<parent>[_<id>]_<nom>` pour distinguer les
/// articles répétés par leur attribut d'index.
fn flat_key(node: &Element, parent: Option<&Element>) -> String {
    match parent {
        Some(p) if local_name(&p.name).contains("item") => {
            let mut key = local_name(&p.name).to_string();
            if let Some(id) = p.attributes.get("id") {
                key.push('_');
                key.push_str(id);
            }
            key.push('_');
            key.push_str(local_name(&node.name));
            key
        }
        _ => local_name(&node.name).to_string(),
    }
}

fn find_descendant<'a>(elem: &'a Element, name: &str) -> Option<&'a Element> {
    if local_name(&elem.name) == name {
        return Some(elem);
    }
    child_elements(elem).find_map(|child| find_descendant(child, name))
}

fn child_elements(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.children.iter().filter_map(XMLNode::as_element)
}

fn element_text(elem: &Element) -> String {
    elem.get_text().map(|t| t.to_string()).unwrap_or_default()
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.32">
      <c:merchantReferenceCode>ORD1</c:merchantReferenceCode>
      <c:requestID>R1</c:requestID>
      <c:decision>ACCEPT</c:decision>
      <c:reasonCode>100</c:reasonCode>
      <c:requestToken>T1</c:requestToken>
      <c:ccAuthReply>
        <c:avsCode>Y</c:avsCode>
        <c:authorizedDateTime>2008-01-21T16:00:38Z</c:authorizedDateTime>
      </c:ccAuthReply>
    </c:replyMessage>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_parse_reply_flattens_nested_fields() {
        let fields = parse_reply(REPLY).unwrap();
        assert_eq!(fields.decision(), Some("ACCEPT"));
        assert_eq!(fields.reason_code(), Some("100"));
        assert_eq!(fields.request_id(), Some("R1"));
        assert_eq!(fields.request_token(), Some("T1"));
        // les feuilles imbriquées remontent à plat
        assert_eq!(fields.avs_code(), Some("Y"));
        assert_eq!(fields.get("authorizedDateTime"), Some("2008-01-21T16:00:38Z"));
    }

    #[test]
    fn test_reason_code_mirrored_into_message() {
        let fields = parse_reply(REPLY).unwrap();
        assert_eq!(fields.message(), Some("100"));
    }

    #[test]
    fn test_parse_soap_fault() {
        let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>Server</faultcode>
      <faultstring>Internal Error</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

        let fields = parse_reply(xml).unwrap();
        assert_eq!(fields.get("faultcode"), Some("Server"));
        assert_eq!(fields.get("faultstring"), Some("Internal Error"));
        assert_eq!(fields.message(), Some("Server: Internal Error"));
    }

    #[test]
    fn test_indexed_line_items_do_not_collide() {
        let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.32">
      <c:decision>ACCEPT</c:decision>
      <c:taxReply>
        <c:item id="0">
          <c:totalTaxAmount>0.10</c:totalTaxAmount>
        </c:item>
        <c:item id="1">
          <c:totalTaxAmount>0.25</c:totalTaxAmount>
        </c:item>
        <c:item id="2">
          <c:totalTaxAmount>0.50</c:totalTaxAmount>
        </c:item>
      </c:taxReply>
    </c:replyMessage>
  </soap:Body>
</soap:Envelope>"#;

        let fields = parse_reply(xml).unwrap();
        assert_eq!(fields.get("item_0_totalTaxAmount"), Some("0.10"));
        assert_eq!(fields.get("item_1_totalTaxAmount"), Some("0.25"));
        assert_eq!(fields.get("item_2_totalTaxAmount"), Some("0.50"));
        assert_eq!(fields.get("totalTaxAmount"), None);
    }

    #[test]
    fn test_item_without_id_attribute() {
        let xml = r#"<?xml version="1.0"?>
<c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.32">
  <c:taxReply>
    <c:item>
      <c:totalTaxAmount>0.10</c:totalTaxAmount>
    </c:item>
  </c:taxReply>
</c:replyMessage>"#;

        let fields = parse_reply(xml).unwrap();
        assert_eq!(fields.get("item_totalTaxAmount"), Some("0.10"));
    }

    #[test]
    fn test_no_reply_and_no_fault_gives_empty_map() {
        let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body/>
</soap:Envelope>"#;

        let fields = parse_reply(xml).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_reply("this is not xml <<<");
        assert!(matches!(result, Err(SoapParseError::Xml(_))));
    }
}
