//! # Module SOAP - couche protocole CyberSource
//!
//! Ce module implémente la couche SOAP du client CyberSource : construction
//! des enveloppes de requête et aplatissement des réponses XML.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction d'enveloppes SOAP avec en-tête WS-Security
//! - ✅ Injection des champs d'identité marchand avant le corps d'opération
//! - ✅ Aplatissement récursif des réponses (`replyMessage`)
//! - ✅ Gestion des SOAP Faults
//!
//! ## Architecture
//!
//! - [`build_request`] : enveloppe complète prête à transmettre
//! - [`ReplyFields`] : réponse aplatie en paires champ/valeur
//! - [`parse_reply`] : parsing d'une réponse ou d'un Fault
//!
//! ## Example
//!
//! ```ignore
//! use cybsoap::{build_request, parse_reply, text_element};
//!
//! let body = vec![text_element("ccAuthService", "")];
//! let xml = build_request("merchant", "secret", "order-1", body).unwrap();
//!
//! let fields = parse_reply(&reply_xml).unwrap();
//! assert_eq!(fields.decision(), Some("ACCEPT"));
//! ```

mod builder;
mod parser;

pub use builder::{
    CLIENT_ENVIRONMENT, CLIENT_LIBRARY, CLIENT_LIBRARY_VERSION, PASSWORD_TEXT_TYPE,
    SOAP_ENVELOPE_NS, TRANSACTION_NS, WSSE_NS, build_request, service_element, text_element,
};
pub use parser::{ReplyFields, SoapParseError, parse_reply};
