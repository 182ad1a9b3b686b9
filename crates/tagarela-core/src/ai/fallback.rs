//! Local keyword responder, used when no API key is configured or the
//! remote call fails.
//!
//! Rule order is significant: the first matching category wins. Keep this
//! an ordered list, not a map, so tie-breaks stay reproducible.

use rand::Rng;

pub const GREETING: &str = "Olá! Como posso ajudá-lo hoje? 😊";
pub const SELF_REFERENCE: &str =
    "Eu sou um assistente virtual criado para ajudar você! Como posso ser útil?";
pub const HELP: &str = "Claro! Estou aqui para ajudar. Me diga no que posso ser útil! 🤝";
pub const FAREWELL: &str = "Até mais! Foi um prazer conversar com você! 👋";
pub const THANKS: &str = "De nada! Fico feliz em ajudar! 😊";
pub const NAME: &str = "Eu sou o Tagarela! Prazer em conhecê-lo! 🤖";

/// Generic acknowledgements drawn at random when no category matches.
pub const GENERIC_POOL: &[&str] = &[
    "Interessante! Me conte mais sobre isso.",
    "Entendi! Como posso ajudar você com isso?",
    "Boa pergunta! Deixe-me pensar... 🤔",
    "Posso ajudar com isso! Precisa de mais informações?",
    "Legal! Há algo específico que você gostaria de saber?",
];

/// One keyword category. Predicates see the lower-cased input.
struct Rule {
    matches: fn(&str) -> bool,
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        matches: |m| m.contains("olá") || m.contains("oi") || m.contains("boa"),
        reply: GREETING,
    },
    Rule {
        matches: |m| m.contains("como") && m.contains("você"),
        reply: SELF_REFERENCE,
    },
    Rule {
        matches: |m| m.contains("ajuda") || m.contains("socorro"),
        reply: HELP,
    },
    Rule {
        matches: |m| m.contains("tchau") || m.contains("adeus") || m.contains("até"),
        reply: FAREWELL,
    },
    Rule {
        matches: |m| m.contains("obrigad") || m.contains("valeu"),
        reply: THANKS,
    },
    Rule {
        matches: |m| m.contains("nome"),
        reply: NAME,
    },
];

/// The canned reply for `input`: first matching category, otherwise a
/// pseudo-random pick from the generic pool.
pub fn respond(input: &str) -> &'static str {
    let message = input.to_lowercase();
    for rule in RULES {
        if (rule.matches)(&message) {
            return rule.reply;
        }
    }
    GENERIC_POOL[rand::thread_rng().gen_range(0..GENERIC_POOL.len())]
}
