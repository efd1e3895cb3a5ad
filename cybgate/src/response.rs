//! Résultat normalisé d'un aller-retour avec le processeur

use crate::token::IdentificationToken;
use cybsoap::ReplyFields;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Table statique des codes de refus/acceptation, clé `r<code>`.
/// Lecture seule pour tout le processus, jamais modifiée à l'exécution.
pub static RESPONSE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("r100", "Successful transaction"),
        ("r101", "Request is missing one or more required fields"),
        ("r102", "One or more fields contains invalid data"),
        ("r150", "General failure"),
        ("r151", "The request was received but a server time-out occurred"),
        ("r152", "The request was received, but a service timed out"),
        (
            "r200",
            "The authorization request was approved by the issuing bank but declined by CyberSource because it did not pass the AVS check",
        ),
        ("r201", "The issuing bank has questions about the request"),
        ("r202", "Expired card"),
        ("r203", "General decline of the card"),
        ("r204", "Insufficient funds in the account"),
        ("r205", "Stolen or lost card"),
        ("r207", "Issuing bank unavailable"),
        (
            "r208",
            "Inactive card or card not authorized for card-not-present transactions",
        ),
        (
            "r209",
            "American Express Card Identifiction Digits (CID) did not match",
        ),
        ("r210", "The card has reached the credit limit"),
        ("r211", "Invalid card verification number"),
        (
            "r221",
            "The customer matched an entry on the processor's negative file",
        ),
        (
            "r230",
            "The authorization request was approved by the issuing bank but declined by CyberSource because it did not pass the card verification check",
        ),
        ("r231", "Invalid account number"),
        ("r232", "The card type is not accepted by the payment processor"),
        ("r233", "General decline by the processor"),
        (
            "r234",
            "A problem exists with your CyberSource merchant configuration",
        ),
        (
            "r235",
            "The requested amount exceeds the originally authorized amount",
        ),
        ("r236", "Processor failure"),
        ("r237", "The authorization has already been reversed"),
        ("r238", "The authorization has already been captured"),
        (
            "r239",
            "The requested transaction amount must match the previous transaction amount",
        ),
        (
            "r240",
            "The card type sent is invalid or does not correlate with the credit card number",
        ),
        ("r241", "The request ID is invalid"),
        (
            "r242",
            "You requested a capture, but there is no corresponding, unused authorization record.",
        ),
        ("r243", "The transaction has already been settled or reversed"),
        ("r244", "The bank account number failed the validation check"),
        (
            "r246",
            "The capture or credit is not voidable because the capture or credit information has already been submitted to your processor",
        ),
        (
            "r247",
            "You requested a credit for a capture that was previously voided",
        ),
        (
            "r250",
            "The request was received, but a time-out occurred with the payment processor",
        ),
        (
            "r254",
            "Your CyberSource account is prohibited from processing stand-alone refunds",
        ),
        (
            "r255",
            "Your CyberSource account is not configured to process the service in the country you specified",
        ),
    ])
});

/// Issue d'une transaction. Un refus distant est une `Response` normale avec
/// `success == false`, jamais une erreur.
#[derive(Debug, Clone)]
pub struct Response {
    pub success: bool,

    /// Texte lisible : table des codes, sinon le champ `message` capturé par
    /// le parseur, sinon absent (état légitime, pas une erreur)
    pub message: Option<String>,

    /// Tous les champs aplatis de la réponse
    pub params: ReplyFields,

    /// Jeton d'autorisation réutilisable, présent seulement en cas de succès
    pub authorization: Option<String>,

    pub avs_code: Option<String>,
    pub cvv_code: Option<String>,

    /// La transaction a été émise vers le serveur de test
    pub test: bool,
}

impl Response {
    pub(crate) fn from_reply(params: ReplyFields, order_id: Option<&str>, test: bool) -> Self {
        let success = params.decision() == Some("ACCEPT");

        let message = params
            .reason_code()
            .and_then(|code| RESPONSE_CODES.get(format!("r{code}").as_str()).copied())
            .map(str::to_string)
            .or_else(|| {
                params
                    .message()
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            });

        // Jamais d'autorisation pour une transaction refusée : elle ne doit
        // pas pouvoir servir d'entrée à une opération dépendante
        let authorization = if success {
            let token = IdentificationToken::new(
                order_id.map(str::to_string),
                params.request_id().map(str::to_string),
                params.request_token().map(str::to_string),
            );
            (!token.is_empty()).then(|| token.to_string())
        } else {
            None
        };

        let avs_code = params.avs_code().map(str::to_string);
        let cvv_code = params.cv_code().map(str::to_string);

        Self {
            success,
            message,
            params,
            authorization,
            avs_code,
            cvv_code,
            test,
        }
    }
}
