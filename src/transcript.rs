//! Ordered log of chat turns.
//!
//! The transcript is append-only with one exception: the single turn that is
//! currently revealing may have its text replaced until it is finalized.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use time::OffsetDateTime;

use crate::error::{Error, Result};

const TRANSCRIPT_VERSION: u8 = 1;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The person at the keyboard.
    User,
    /// The backend.
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

/// Ordinal identifier of a turn; increases monotonically within a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(u64);

impl TurnId {
    /// Returns the raw ordinal.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Ordinal of the turn.
    pub id: TurnId,
    /// Author of the turn.
    pub speaker: Speaker,
    /// Current text; a prefix of the final text while revealing.
    pub text: String,
    /// True while a reveal is filling this turn.
    pub is_revealing: bool,
}

/// The ordered sequence of turns for one session.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a turn that will never change.
    pub fn append_final(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<TurnId> {
        let id = self.allocate_id();
        self.turns.push(Turn {
            id,
            speaker,
            text: text.into(),
            is_revealing: false,
        });
        Ok(id)
    }

    /// Appends an empty turn to be filled by a reveal.
    ///
    /// Fails with `Validation` for user turns, which are always final, and
    /// with `Conflict` if another turn is already revealing.
    pub fn append_placeholder(&mut self, speaker: Speaker) -> Result<TurnId> {
        if speaker == Speaker::User {
            return Err(Error::validation(
                "user turns cannot be revealed",
                Some("speaker".to_string()),
            ));
        }
        if let Some(turn) = self.revealing() {
            return Err(Error::conflict(
                "another turn is already revealing",
                Some(turn.id.get()),
            ));
        }
        let id = self.allocate_id();
        self.turns.push(Turn {
            id,
            speaker,
            text: String::new(),
            is_revealing: true,
        });
        Ok(id)
    }

    /// Replaces the text of the revealing turn `id`.
    ///
    /// Fails with `NotFound` if there is no such turn or it has been finalized.
    pub fn update_revealing(&mut self, id: TurnId, prefix: &str) -> Result<()> {
        let turn = self.revealing_mut(id)?;
        turn.text.clear();
        turn.text.push_str(prefix);
        Ok(())
    }

    /// Sets the final text of turn `id` and clears its revealing flag.
    ///
    /// Fails with `NotFound` under the same conditions as [`Self::update_revealing`],
    /// which includes a second finalize of the same turn.
    pub fn finalize_revealing(&mut self, id: TurnId, final_text: &str) -> Result<()> {
        let turn = self.revealing_mut(id)?;
        turn.text.clear();
        turn.text.push_str(final_text);
        turn.is_revealing = false;
        Ok(())
    }

    /// Returns all turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the turn with the given id.
    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.position(id).map(|idx| &self.turns[idx])
    }

    /// Returns the turn that is currently revealing, if any.
    pub fn revealing(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_revealing)
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if there are no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Removes every turn.  Ids continue from where they were.
    pub fn clear(&mut self) -> Result<()> {
        if self.revealing().is_some() {
            return Err(Error::invalid_state("cannot clear while a turn is revealing"));
        }
        self.turns.clear();
        Ok(())
    }

    /// Saves the transcript to the specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.revealing().is_some() {
            return Err(Error::invalid_state("cannot save while a turn is revealing"));
        }
        let transcript = TranscriptFile {
            version: TRANSCRIPT_VERSION,
            saved_at: OffsetDateTime::now_utc(),
            turns: self.turns.clone(),
        };
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &transcript).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }

    /// Loads a transcript from disk.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|err| Error::io("failed to open transcript file", err))?;
        let reader = BufReader::new(file);
        let transcript: TranscriptFile = from_reader(reader).map_err(|err| {
            Error::serialization("failed to parse transcript", Some(Box::new(err)))
        })?;
        Self::from_file(transcript)
    }

    fn from_file(transcript: TranscriptFile) -> Result<Self> {
        if transcript.version != TRANSCRIPT_VERSION {
            return Err(Error::validation(
                format!("unsupported transcript version {}", transcript.version),
                Some("version".to_string()),
            ));
        }
        let mut last = 0;
        for turn in &transcript.turns {
            if turn.is_revealing {
                return Err(Error::validation(
                    format!("turn {} is still revealing", turn.id),
                    Some("turns".to_string()),
                ));
            }
            if turn.id.get() <= last {
                return Err(Error::validation(
                    format!("turn {} is out of order", turn.id),
                    Some("turns".to_string()),
                ));
            }
            last = turn.id.get();
        }
        Ok(Self {
            turns: transcript.turns,
            next_id: last + 1,
        })
    }

    /// Carries the id counter of `previous` forward so ids never repeat within a session.
    pub(crate) fn continue_ids_from(&mut self, previous: &Transcript) {
        self.next_id = self.next_id.max(previous.next_id);
    }

    fn allocate_id(&mut self) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        id
    }

    fn position(&self, id: TurnId) -> Option<usize> {
        self.turns.binary_search_by_key(&id, |turn| turn.id).ok()
    }

    fn revealing_mut(&mut self, id: TurnId) -> Result<&mut Turn> {
        let not_found = || {
            Error::not_found(
                "no revealing turn with this id",
                Some("turn".to_string()),
                Some(id.to_string()),
            )
        };
        let idx = self.position(id).ok_or_else(not_found)?;
        let turn = &mut self.turns[idx];
        if turn.is_revealing {
            Ok(turn)
        } else {
            Err(not_found())
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct TranscriptFile {
    version: u8,
    #[serde(with = "crate::utils::time")]
    saved_at: OffsetDateTime,
    turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase() {
        let mut transcript = Transcript::new();
        let a = transcript.append_final(Speaker::User, "hi").unwrap();
        let b = transcript.append_placeholder(Speaker::Assistant).unwrap();
        transcript.finalize_revealing(b, "hello").unwrap();
        let c = transcript.append_final(Speaker::User, "bye").unwrap();
        assert!(a < b && b < c);
        assert_eq!(a.get(), 1);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn user_turns_are_final() {
        let mut transcript = Transcript::new();
        let id = transcript.append_final(Speaker::User, "question").unwrap();
        let turn = transcript.get(id).unwrap();
        assert!(!turn.is_revealing);
        assert!(transcript.update_revealing(id, "edit").unwrap_err().is_not_found());
        assert_eq!(transcript.get(id).unwrap().text, "question");
    }

    #[test]
    fn user_placeholders_are_rejected() {
        let mut transcript = Transcript::new();
        let err = transcript.append_placeholder(Speaker::User).unwrap_err();
        assert!(err.is_validation());
        assert!(transcript.is_empty());
        assert!(transcript.revealing().is_none());
    }

    #[test]
    fn second_placeholder_conflicts() {
        let mut transcript = Transcript::new();
        let first = transcript.append_placeholder(Speaker::Assistant).unwrap();
        let err = transcript.append_placeholder(Speaker::Assistant).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.revealing().map(|t| t.id), Some(first));
    }

    #[test]
    fn placeholder_lifecycle() {
        let mut transcript = Transcript::new();
        let id = transcript.append_placeholder(Speaker::Assistant).unwrap();
        assert_eq!(transcript.get(id).unwrap().text, "");
        transcript.update_revealing(id, "He").unwrap();
        assert_eq!(transcript.get(id).unwrap().text, "He");
        transcript.finalize_revealing(id, "Hello").unwrap();
        let turn = transcript.get(id).unwrap();
        assert_eq!(turn.text, "Hello");
        assert!(!turn.is_revealing);
        assert!(transcript.revealing().is_none());
    }

    #[test]
    fn stale_updates_are_not_found() {
        let mut transcript = Transcript::new();
        let id = transcript.append_placeholder(Speaker::Assistant).unwrap();
        transcript.finalize_revealing(id, "done").unwrap();
        assert!(transcript.update_revealing(id, "do").unwrap_err().is_not_found());
        assert!(
            transcript
                .finalize_revealing(id, "done")
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(transcript.get(id).unwrap().text, "done");
        assert!(
            transcript
                .update_revealing(TurnId(99), "x")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn clear_refuses_while_revealing() {
        let mut transcript = Transcript::new();
        let id = transcript.append_placeholder(Speaker::Assistant).unwrap();
        assert!(transcript.clear().unwrap_err().is_invalid_state());
        transcript.finalize_revealing(id, "ok").unwrap();
        transcript.clear().unwrap();
        assert!(transcript.is_empty());
        let next = transcript.append_final(Speaker::User, "again").unwrap();
        assert!(next > id);
    }

    #[test]
    fn save_and_load() {
        let mut transcript = Transcript::new();
        transcript.append_final(Speaker::User, "hi").unwrap();
        let id = transcript.append_placeholder(Speaker::Assistant).unwrap();

        let path = std::env::temp_dir().join(format!(
            "thinkchat-transcript-{}.json",
            std::process::id()
        ));
        assert!(transcript.save_to(&path).unwrap_err().is_invalid_state());

        transcript.finalize_revealing(id, "hello there").unwrap();
        transcript.save_to(&path).unwrap();

        let mut loaded = Transcript::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.turns(), transcript.turns());
        let next = loaded.append_final(Speaker::User, "more").unwrap();
        assert_eq!(next.get(), 3);
    }

    #[test]
    fn load_rejects_revealing_turns() {
        let file = TranscriptFile {
            version: TRANSCRIPT_VERSION,
            saved_at: OffsetDateTime::UNIX_EPOCH,
            turns: vec![Turn {
                id: TurnId(1),
                speaker: Speaker::Assistant,
                text: "half".to_string(),
                is_revealing: true,
            }],
        };
        assert!(Transcript::from_file(file).unwrap_err().is_validation());
    }

    #[test]
    fn load_rejects_unknown_version() {
        let file = TranscriptFile {
            version: 9,
            saved_at: OffsetDateTime::UNIX_EPOCH,
            turns: Vec::new(),
        };
        assert!(Transcript::from_file(file).unwrap_err().is_validation());
    }

    #[test]
    fn turn_serializes_with_snake_case_speaker() {
        let turn = Turn {
            id: TurnId(4),
            speaker: Speaker::Assistant,
            text: "hey".to_string(),
            is_revealing: false,
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 4, "speaker": "assistant", "text": "hey", "is_revealing": false})
        );
    }
}
