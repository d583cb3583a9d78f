use atende_types::{LeadClassification, LeadSource, Message, Role};

const PER_MESSAGE: i32 = 8;
const MESSAGE_CAP: i32 = 32;
const PER_BUYING_SIGNAL: i32 = 15;
const LAST_WORD_BONUS: i32 = 10;
const PER_COOLING_SIGNAL: i32 = 10;

/// Purchase intent. Each group counts once, whichever spelling matched.
const BUYING_SIGNALS: &[&[&str]] = &[
    &["preço", "preco"],
    &["valor"],
    &["quanto custa"],
    &["comprar"],
    &["pix"],
    &["boleto"],
    &["cartão", "cartao"],
    &["parcel"],
    &["desconto"],
    &["link"],
    &["pagamento"],
    &["assinar"],
    &["quero"],
];

const COOLING_SIGNALS: &[&[&str]] = &[
    &["não quero", "nao quero"],
    &["caro"],
    &["depois"],
    &["sem interesse"],
    &["cancelar"],
];

/// Scores a conversation when no stronger signal is available
pub trait LeadScorer: Send + Sync {
    fn score(&self, messages: &[Message]) -> LeadClassification;
}

/// Keyword heuristic over what the contact wrote
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }

    fn raw_score(messages: &[Message]) -> i32 {
        let user_texts: Vec<String> = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.to_lowercase())
            .collect();

        if user_texts.is_empty() {
            return 0;
        }

        let mut text = user_texts.join("\n");
        let cooling = count_groups(&text, COOLING_SIGNALS);

        // "não quero" must not also count as "quero"
        for group in COOLING_SIGNALS {
            for phrase in group.iter() {
                text = text.replace(phrase, " ");
            }
        }
        let buying = count_groups(&text, BUYING_SIGNALS);

        let mut score = (PER_MESSAGE * user_texts.len() as i32).min(MESSAGE_CAP);
        score += PER_BUYING_SIGNAL * buying;
        if messages.last().map(|m| m.role) == Some(Role::User) {
            score += LAST_WORD_BONUS;
        }
        score -= PER_COOLING_SIGNAL * cooling;

        score.clamp(0, 100)
    }
}

fn count_groups(text: &str, groups: &[&[&str]]) -> i32 {
    groups
        .iter()
        .filter(|spellings| spellings.iter().any(|s| text.contains(s)))
        .count() as i32
}

impl LeadScorer for KeywordScorer {
    fn score(&self, messages: &[Message]) -> LeadClassification {
        let score = Self::raw_score(messages) as u8;
        LeadClassification::from_score(score, LeadSource::Heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atende_types::{LeadLevel, ThreadId};

    fn msg(role: Role, content: &str) -> Message {
        Message::pending(ThreadId::from(1), role, false, content)
    }

    #[test]
    fn test_empty_history_is_unknown() {
        let lead = KeywordScorer.score(&[]);
        assert_eq!(lead.level, LeadLevel::Desconhecido);
        assert_eq!(lead.score, 0);
    }

    #[test]
    fn test_assistant_messages_do_not_count() {
        let lead = KeywordScorer.score(&[msg(Role::Assistant, "Qual o preço? pix ou boleto?")]);
        assert_eq!(lead.score, 0);
    }

    #[test]
    fn test_single_greeting_is_cold() {
        let lead = KeywordScorer.score(&[msg(Role::User, "oi")]);
        // 8 for the message, 10 for having the last word
        assert_eq!(lead.score, 18);
        assert_eq!(lead.level, LeadLevel::Frio);
    }

    #[test]
    fn test_buying_signals_make_it_hot() {
        let lead = KeywordScorer.score(&[
            msg(Role::User, "Qual o preço?"),
            msg(Role::Assistant, "R$ 97"),
            msg(Role::User, "Aceita pix? Quero comprar"),
        ]);
        // 16 + 4 * 15 + 10
        assert_eq!(lead.score, 86);
        assert_eq!(lead.level, LeadLevel::Quente);
        assert_eq!(lead.source, LeadSource::Heuristic);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let once = KeywordScorer.score(&[msg(Role::User, "pix")]);
        let twice = KeywordScorer.score(&[msg(Role::User, "pix pix PIX")]);
        assert_eq!(once.score, twice.score);
    }

    #[test]
    fn test_refusal_is_not_read_as_intent() {
        let lead = KeywordScorer.score(&[
            msg(Role::User, "Não quero, achei caro"),
            msg(Role::Assistant, "Entendo"),
        ]);
        // 8 - 2 * 10, clamped
        assert_eq!(lead.score, 0);
        assert_eq!(lead.level, LeadLevel::Desconhecido);
    }

    #[test]
    fn test_message_points_are_capped() {
        let messages: Vec<Message> = (0..10).map(|_| msg(Role::User, "ok")).collect();
        assert_eq!(KeywordScorer.score(&messages).score, 42);
    }
}
