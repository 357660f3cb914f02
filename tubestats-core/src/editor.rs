//! Keyword card editor
//!
//! Suggested keywords are reviewed as cards: each card can be agreed to
//! (and later saved as a subcategory alias) or skipped. Skipping is also
//! persisted remotely, so it goes through an optimistic update:
//!
//! ```text
//! Idle ──begin_skip──► Pending ──commit───► Committed
//!                         │
//!                         └─────rollback──► RolledBack (card restored)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ingest::SyncApiClient;

/// Remote state of a card's last optimistic edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
}

/// A suggested keyword under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordCard {
    pub keyword: String,
    /// Name the keyword is saved under; defaults to the keyword itself
    pub subcategory_name: String,
    #[serde(default)]
    pub main_categories: Vec<String>,
    #[serde(default)]
    pub agreed: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, skip_serializing)]
    pub edit_state: EditState,
}

impl KeywordCard {
    pub fn new(keyword: impl Into<String>, main_categories: Vec<String>) -> Self {
        let keyword = keyword.into();
        Self {
            subcategory_name: keyword.clone(),
            keyword,
            main_categories,
            agreed: false,
            skipped: false,
            edit_state: EditState::Idle,
        }
    }
}

/// Handle for an in-flight skip change.
///
/// Holds the card as it was before the change so it can be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending edit must be committed or rolled back"]
pub struct PendingEdit {
    pub keyword: String,
    pub skipped: bool,
    snapshot: KeywordCard,
}

/// Save payload: main category → subcategory name → aliases.
pub type SavePayload = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Remote side of the skip toggle.
pub trait SkipKeywordApi {
    fn set_skip_keyword(&self, channel_id: &str, keyword: &str, skipped: bool) -> Result<()>;
}

impl SkipKeywordApi for SyncApiClient {
    fn set_skip_keyword(&self, channel_id: &str, keyword: &str, skipped: bool) -> Result<()> {
        SyncApiClient::set_skip_keyword(self, channel_id, keyword, skipped)
    }
}

/// In-memory set of keyword cards.
#[derive(Debug, Clone, Default)]
pub struct CardEditor {
    cards: Vec<KeywordCard>,
}

impl CardEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all cards.
    pub fn initialize(&mut self, cards: Vec<KeywordCard>) {
        tracing::debug!(count = cards.len(), "Initialized keyword cards");
        self.cards = cards;
    }

    pub fn cards(&self) -> &[KeywordCard] {
        &self.cards
    }

    pub fn card(&self, keyword: &str) -> Option<&KeywordCard> {
        self.cards.iter().find(|c| c.keyword == keyword)
    }

    fn card_mut(&mut self, keyword: &str) -> Result<&mut KeywordCard> {
        self.cards
            .iter_mut()
            .find(|c| c.keyword == keyword)
            .ok_or_else(|| Error::Editor(format!("unknown keyword: {}", keyword)))
    }

    /// Flip `agreed`; agreeing always clears `skipped`.
    pub fn toggle_agree(&mut self, keyword: &str) -> Result<()> {
        let card = self.card_mut(keyword)?;
        card.agreed = !card.agreed;
        card.skipped = false;
        Ok(())
    }

    /// Flip `skipped` locally; skipping always clears `agreed`.
    pub fn toggle_skip(&mut self, keyword: &str) -> Result<()> {
        let card = self.card_mut(keyword)?;
        card.skipped = !card.skipped;
        card.agreed = false;
        Ok(())
    }

    pub fn set_subcategory_name(&mut self, keyword: &str, name: &str) -> Result<()> {
        self.card_mut(keyword)?.subcategory_name = name.to_string();
        Ok(())
    }

    /// Add `category` to the card's main categories, or remove it if present.
    pub fn toggle_main_category(&mut self, keyword: &str, category: &str) -> Result<()> {
        let card = self.card_mut(keyword)?;
        if let Some(pos) = card.main_categories.iter().position(|m| m == category) {
            card.main_categories.remove(pos);
        } else {
            card.main_categories.push(category.to_string());
        }
        Ok(())
    }

    pub fn agreed_count(&self) -> usize {
        self.cards.iter().filter(|c| c.agreed).count()
    }

    /// Build the category update for all agreed cards.
    ///
    /// Cards without a main category are left out. The keyword is listed as
    /// an alias only when it differs from the subcategory name.
    pub fn save_payload(&self) -> SavePayload {
        let mut payload = SavePayload::new();

        for card in self
            .cards
            .iter()
            .filter(|c| c.agreed && !c.main_categories.is_empty())
        {
            for main in &card.main_categories {
                let aliases = payload
                    .entry(main.clone())
                    .or_default()
                    .entry(card.subcategory_name.clone())
                    .or_default();

                if card.keyword != card.subcategory_name && !aliases.contains(&card.keyword) {
                    aliases.push(card.keyword.clone());
                }
            }
        }

        payload
    }

    /// Apply a skip change locally and mark the card pending.
    pub fn begin_skip(&mut self, keyword: &str, skipped: bool) -> Result<PendingEdit> {
        let card = self.card_mut(keyword)?;
        if card.edit_state == EditState::Pending {
            return Err(Error::Editor(format!(
                "edit already pending for keyword: {}",
                keyword
            )));
        }

        let snapshot = card.clone();
        card.skipped = skipped;
        card.agreed = false;
        card.edit_state = EditState::Pending;

        Ok(PendingEdit {
            keyword: keyword.to_string(),
            skipped,
            snapshot,
        })
    }

    /// Keep the change of a pending edit.
    pub fn commit(&mut self, edit: PendingEdit) -> Result<()> {
        let card = self.pending_card(&edit)?;
        card.edit_state = EditState::Committed;
        Ok(())
    }

    /// Restore the card as it was before a pending edit.
    pub fn rollback(&mut self, edit: PendingEdit) -> Result<()> {
        let card = self.pending_card(&edit)?;
        *card = KeywordCard {
            edit_state: EditState::RolledBack,
            ..edit.snapshot
        };
        Ok(())
    }

    fn pending_card(&mut self, edit: &PendingEdit) -> Result<&mut KeywordCard> {
        let card = self.card_mut(&edit.keyword)?;
        if card.edit_state != EditState::Pending {
            return Err(Error::Editor(format!(
                "stale edit for keyword: {}",
                edit.keyword
            )));
        }
        Ok(card)
    }
}

/// Set a keyword's skip state locally and remotely.
///
/// The card changes immediately; if the remote call fails it is rolled back
/// and the remote error is returned.
pub fn apply_remote_skip<A: SkipKeywordApi>(
    editor: &mut CardEditor,
    api: &A,
    channel_id: &str,
    keyword: &str,
    skipped: bool,
) -> Result<()> {
    let edit = editor.begin_skip(keyword, skipped)?;

    match api.set_skip_keyword(channel_id, keyword, skipped) {
        Ok(()) => editor.commit(edit),
        Err(e) => {
            tracing::warn!(keyword, skipped, error = %e, "Skip update failed, rolling back");
            editor.rollback(edit)?;
            Err(e)
        }
    }
}
