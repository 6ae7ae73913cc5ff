//! Short-lived status messages shown after construction attempts.

use serde::{Deserialize, Serialize};

use crate::{building::BuildingKind, models::Locale};

/// What a status message reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// The named building was constructed.
    Built(BuildingKind),
    /// A construction attempt was refused.
    InsufficientResources,
}

impl MessageKind {
    /// Player-facing text in `locale`.
    pub fn render(self, locale: Locale) -> String {
        match (self, locale) {
            (MessageKind::Built(kind), Locale::English) => {
                format!("Built {} successfully! 🎉", kind.definition().name_en)
            }
            (MessageKind::Built(kind), Locale::Arabic) => {
                format!("تم بناء {} بنجاح! 🎉", kind.definition().name_ar)
            }
            (MessageKind::InsufficientResources, Locale::English) => {
                "Not enough resources! ❌".to_string()
            }
            (MessageKind::InsufficientResources, Locale::Arabic) => {
                "موارد غير كافية! ❌".to_string()
            }
        }
    }

    /// Whether the message reports a failure.
    pub fn is_error(self) -> bool {
        matches!(self, MessageKind::InsufficientResources)
    }
}

/// A status message together with the generation that posted it.
///
/// Dismissal timers carry the id they were scheduled for and only clear a
/// message with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientMessage {
    /// Monotonic generation number.
    pub id: u64,
    /// Structured content.
    pub kind: MessageKind,
}

impl TransientMessage {
    /// Text in `locale`.
    pub fn text(&self, locale: Locale) -> String {
        self.kind.render(locale)
    }
}

/// Holds at most one message; a new post replaces the previous one.
#[derive(Debug, Default)]
pub(crate) struct MessageBoard {
    current: Option<TransientMessage>,
    next_id: u64,
}

impl MessageBoard {
    pub(crate) fn post(&mut self, kind: MessageKind) -> TransientMessage {
        self.next_id += 1;
        let message = TransientMessage {
            id: self.next_id,
            kind,
        };
        self.current = Some(message.clone());
        message
    }

    /// Clear the message only if it is still generation `id`.
    pub(crate) fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().map(|message| message.id) == Some(id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn current(&self) -> Option<&TransientMessage> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_locales() {
        let built = MessageKind::Built(BuildingKind::Woodcutter);
        assert_eq!(built.render(Locale::English), "Built Woodcutter successfully! 🎉");
        assert_eq!(built.render(Locale::Arabic), "تم بناء حطاب بنجاح! 🎉");
        assert!(MessageKind::InsufficientResources.is_error());
        assert!(!built.is_error());
    }

    #[test]
    fn stale_dismissal_keeps_newer_message() {
        let mut board = MessageBoard::default();
        let first = board.post(MessageKind::InsufficientResources);
        let second = board.post(MessageKind::Built(BuildingKind::Wall));
        assert!(second.id > first.id);

        assert!(!board.dismiss(first.id));
        assert_eq!(board.current(), Some(&second));

        assert!(board.dismiss(second.id));
        assert_eq!(board.current(), None);
    }
}
