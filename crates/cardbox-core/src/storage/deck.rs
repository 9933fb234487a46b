//! CSV-backed card store.
//!
//! One record per card, no header row: `prompt,answer,box,last_reviewed`.
//! Loading is lenient -- malformed records are skipped, never fatal. Saving
//! supports a full rewrite or a merge-upsert that leaves unmatched records
//! exactly as found.
//!
//! The file is opened, fully read, and closed on load, then separately
//! opened and rewritten on save; no handle is held across the review phase,
//! and concurrent writers are not guarded against (last writer wins).

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use super::config::{Config, DatePrecision, SavePolicy};
use crate::card::Card;
use crate::error::{Result, StoreError};

/// Handle on one deck file plus the date precision it is encoded with.
pub struct DeckStore {
    path: PathBuf,
    precision: DatePrecision,
}

impl DeckStore {
    pub fn new(path: impl Into<PathBuf>, precision: DatePrecision) -> Self {
        Self {
            path: path.into(),
            precision,
        }
    }

    /// Store at the configured location with the configured precision.
    ///
    /// # Errors
    ///
    /// Fails if the default store location cannot be resolved.
    pub fn from_config(config: &Config) -> Result<Self> {
        let path = config.store_path()?;
        Ok(Self::new(path, config.deck.date_precision))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every well-formed card, in file order.
    ///
    /// # Errors
    ///
    /// Fails only if the file cannot be opened. Records with missing
    /// fields, a non-integer box, or an unparsable date are skipped.
    pub fn load(&self) -> Result<Vec<Card>, StoreError> {
        let file = File::open(&self.path).map_err(|e| StoreError::OpenFailed {
            path: self.path.clone(),
            source: e,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut cards = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(r) => r,
                // Only parse-level trouble is lenient; losing the
                // underlying reader is fatal.
                Err(err) if err.is_io_error() => {
                    return Err(StoreError::ReadFailed {
                        path: self.path.clone(),
                        source: err,
                    })
                }
                Err(err) => {
                    debug!(%err, "skipping unreadable record");
                    continue;
                }
            };
            match self.parse_record(&record) {
                Some(card) => cards.push(card),
                None => {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    debug!(line, "skipping malformed record");
                }
            }
        }

        info!(count = cards.len(), path = %self.path.display(), "deck loaded");
        Ok(cards)
    }

    /// Persist the collection under the given policy.
    pub fn save(&self, cards: &[Card], policy: SavePolicy) -> Result<(), StoreError> {
        match policy {
            SavePolicy::Replace => self.save_replace(cards),
            SavePolicy::Merge => self.save_merge(cards),
        }
    }

    /// Append one new card to the deck file.
    ///
    /// # Errors
    ///
    /// Fails if a card with the same prompt is already stored, or on I/O
    /// failure. A missing deck file is created.
    pub fn append(&self, card: &Card) -> Result<(), StoreError> {
        if self.path.exists() {
            let existing = self.load()?;
            if existing.iter().any(|c| c.prompt == card.prompt) {
                return Err(StoreError::DuplicatePrompt(card.prompt.clone()));
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::OpenFailed {
                path: self.path.clone(),
                source: e,
            })?;

        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(&self.encode(card))
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| StoreError::WriteFailed {
                path: self.path.clone(),
                source: e,
            })?;

        info!(prompt = %card.prompt, path = %self.path.display(), "card appended");
        Ok(())
    }

    fn parse_record(&self, record: &StringRecord) -> Option<Card> {
        let prompt = record.get(0)?;
        let answer = record.get(1)?;
        let box_number = record.get(2)?.trim().parse::<u32>().ok()?;
        let last_reviewed = self.precision.parse(record.get(3)?.trim())?;
        Some(Card::new(prompt, answer, box_number, last_reviewed))
    }

    fn encode(&self, card: &Card) -> [String; 4] {
        [
            card.prompt.clone(),
            card.answer.clone(),
            card.box_number.to_string(),
            self.precision.format(card.last_reviewed),
        ]
    }

    /// Rewrite the file from the given collection. Anything the caller
    /// left out is gone afterwards.
    fn save_replace(&self, cards: &[Card]) -> Result<(), StoreError> {
        let file = File::create(&self.path).map_err(|e| StoreError::OpenFailed {
            path: self.path.clone(),
            source: e,
        })?;

        let mut writer = csv::Writer::from_writer(file);
        for card in cards {
            writer
                .write_record(&self.encode(card))
                .map_err(|e| self.write_failed(e))?;
        }
        writer
            .flush()
            .map_err(|e| self.write_failed(csv::Error::from(e)))?;

        info!(count = cards.len(), path = %self.path.display(), "deck saved");
        Ok(())
    }

    /// Update matching records in place, append new cards, and carry every
    /// other record through untouched -- including ones too malformed to
    /// parse as cards.
    fn save_merge(&self, cards: &[Card]) -> Result<(), StoreError> {
        let mut rows = self.read_raw_rows()?;
        let mut matched = vec![false; cards.len()];

        for row in &mut rows {
            let Some(prompt) = row.get(0) else { continue };
            let Some(pos) = cards.iter().position(|c| c.prompt == prompt) else {
                continue;
            };
            let card = &cards[pos];
            let box_field = card.box_number.to_string();
            let date_field = self.precision.format(card.last_reviewed);

            let mut updated = StringRecord::new();
            for i in 0..row.len().max(4) {
                match i {
                    2 => updated.push_field(&box_field),
                    3 => updated.push_field(&date_field),
                    _ => updated.push_field(row.get(i).unwrap_or("")),
                }
            }
            *row = updated;
            matched[pos] = true;
        }

        let appended = matched.iter().filter(|m| !**m).count();
        for (card, seen) in cards.iter().zip(&matched) {
            if !seen {
                rows.push(StringRecord::from(self.encode(card).to_vec()));
            }
        }

        let file = File::create(&self.path).map_err(|e| StoreError::OpenFailed {
            path: self.path.clone(),
            source: e,
        })?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        for row in &rows {
            writer.write_record(row).map_err(|e| self.write_failed(e))?;
        }
        writer
            .flush()
            .map_err(|e| self.write_failed(csv::Error::from(e)))?;

        info!(
            count = rows.len(),
            appended,
            path = %self.path.display(),
            "deck merged"
        );
        Ok(())
    }

    /// Raw records for merging; a missing file is an empty deck here.
    fn read_raw_rows(&self) -> Result<Vec<StringRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::OpenFailed {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.records() {
            match result {
                Ok(row) => rows.push(row),
                Err(err) if err.is_io_error() => {
                    return Err(StoreError::ReadFailed {
                        path: self.path.clone(),
                        source: err,
                    })
                }
                Err(err) => debug!(%err, "dropping unreadable record from merge"),
            }
        }
        Ok(rows)
    }

    fn write_failed(&self, source: csv::Error) -> StoreError {
        StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn store(dir: &TempDir, precision: DatePrecision) -> DeckStore {
        DeckStore::new(dir.path().join("cards.csv"), precision)
    }

    #[test]
    fn replace_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        let cards = vec![
            Card::new("dog", "cane", 1, date(2024, 1, 1)),
            Card::new("cat", "gatto", 5, date(2024, 1, 2)),
        ];

        store.save(&cards, SavePolicy::Replace).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, cards);
    }

    #[test]
    fn datetime_precision_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::DateTime);
        let reviewed = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 15)
            .unwrap();
        let cards = vec![Card::new("dog", "cane", 2, reviewed)];

        store.save(&cards, SavePolicy::Replace).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].last_reviewed, reviewed);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "dog,cane,2,2024-01-01T09:30:15\n");
    }

    #[test]
    fn malformed_records_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cards.csv");
        std::fs::write(
            &path,
            "dog,cane,1,2024-01-01\n\
             short,row\n\
             bad,box,one,2024-01-01\n\
             bad,date,1,yesterday\n\
             cat,gatto,5,2024-01-02\n",
        )
        .unwrap();

        let store = DeckStore::new(&path, DatePrecision::Date);
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].prompt, "dog");
        assert_eq!(loaded[1].prompt, "cat");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        assert!(matches!(
            store.load(),
            Err(StoreError::OpenFailed { .. })
        ));
    }

    #[test]
    fn merge_updates_only_matched_fields_and_appends_new_cards() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cards.csv");
        std::fs::write(
            &path,
            "dog,cane,1,2024-01-01\n\
             cat,gatto,5,2024-01-02\n\
             garbled,row\n",
        )
        .unwrap();

        let store = DeckStore::new(&path, DatePrecision::Date);
        let updates = vec![
            Card::new("dog", "cane", 2, date(2024, 1, 2)),
            Card::new("fish", "pesce", 1, date(2024, 1, 2)),
        ];
        store.save(&updates, SavePolicy::Merge).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "dog,cane,2,2024-01-02\n\
             cat,gatto,5,2024-01-02\n\
             garbled,row\n\
             fish,pesce,1,2024-01-02\n"
        );
    }

    #[test]
    fn merge_rewrites_box_and_date_but_not_answer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cards.csv");
        std::fs::write(&path, "dog,cane,1,2024-01-01\n").unwrap();

        let store = DeckStore::new(&path, DatePrecision::Date);
        // A caller-side answer edit must not leak into a merge save.
        let updates = vec![Card::new("dog", "hound", 2, date(2024, 1, 2))];
        store.save(&updates, SavePolicy::Merge).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "dog,cane,2,2024-01-02\n");
    }

    #[test]
    fn merge_into_missing_file_writes_all_cards() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        let cards = vec![Card::new("dog", "cane", 1, date(2024, 1, 1))];
        store.save(&cards, SavePolicy::Merge).unwrap();
        assert_eq!(store.load().unwrap(), cards);
    }

    #[test]
    fn replace_drops_cards_the_caller_left_out() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        let cards = vec![
            Card::new("dog", "cane", 1, date(2024, 1, 1)),
            Card::new("cat", "gatto", 5, date(2024, 1, 2)),
        ];
        store.save(&cards, SavePolicy::Replace).unwrap();
        store.save(&cards[..1], SavePolicy::Replace).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn append_adds_a_record_and_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        let card = Card::new("dog", "cane", 1, date(2024, 1, 1));

        store.append(&card).unwrap();
        store
            .append(&Card::new("cat", "gatto", 1, date(2024, 1, 1)))
            .unwrap();
        assert_eq!(store.load().unwrap().len(), 2);

        assert!(matches!(
            store.append(&card),
            Err(StoreError::DuplicatePrompt(_))
        ));
    }

    #[test]
    fn fields_with_commas_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, DatePrecision::Date);
        let cards = vec![Card::new("to be, or not", "essere, o no", 3, date(2024, 1, 1))];
        store.save(&cards, SavePolicy::Replace).unwrap();
        assert_eq!(store.load().unwrap(), cards);
    }
}
