use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::stats::{count_by, count_by_day};
use crate::domain::ticket::{
    Category, NewTicket, Priority, Status, TicketFilter, TicketPatch, TicketRecord,
};
use crate::error::{AppError, AppResult};
use crate::services::TicketStore;

#[derive(Clone, Serialize, Deserialize)]
struct TicketFile {
    next_id: u64,
    tickets: Vec<TicketRecord>,
}

impl Default for TicketFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            tickets: Vec::new(),
        }
    }
}

/// Tickets kept in a single JSON file, rewritten after every mutation.
pub struct JsonTicketStore {
    file_path: PathBuf,
    utc_offset: FixedOffset,
    file: RwLock<TicketFile>,
}

impl JsonTicketStore {
    pub fn load(file_path: PathBuf, utc_offset: FixedOffset) -> AppResult<Self> {
        let file = match fs::read_to_string(&file_path) {
            Ok(contents) => serde_json::from_str::<TicketFile>(&contents).map_err(|err| {
                AppError::TicketStore(format!(
                    "invalid ticket file {}: {err}",
                    file_path.display()
                ))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => TicketFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };
        debug!(path = %file_path.display(), tickets = file.tickets.len(), "loaded ticket file");

        Ok(Self {
            file_path,
            utc_offset,
            file: RwLock::new(file),
        })
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, TicketFile>> {
        self.file
            .read()
            .map_err(|_| AppError::TicketStore("ticket file lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, TicketFile>> {
        self.file
            .write()
            .map_err(|_| AppError::TicketStore("ticket file lock poisoned".to_string()))
    }

    /// Writes a sibling temp file and renames it over the ticket file.
    fn save(&self, file: &TicketFile) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(file)
            .map_err(|err| AppError::TicketStore(format!("failed to write tickets: {err}")))?;

        let temp_path = self.file_path.with_extension("json.tmp");
        fs::write(&temp_path, data)?;
        if let Err(err) = fs::rename(&temp_path, &self.file_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(AppError::Io(err));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for JsonTicketStore {
    async fn create(&self, ticket: NewTicket) -> AppResult<TicketRecord> {
        ticket.validate()?;

        let mut file = self.write()?;
        let mut candidate = file.clone();
        let record = TicketRecord {
            id: candidate.next_id,
            title: ticket.title.trim().to_string(),
            description: ticket.description.trim().to_string(),
            category: ticket.category,
            priority: ticket.priority,
            status: ticket.status,
            created_at: Utc::now(),
        };
        candidate.next_id += 1;
        candidate.tickets.push(record.clone());
        self.save(&candidate)?;
        *file = candidate;

        info!(
            id = record.id,
            category = %record.category,
            priority = %record.priority,
            "ticket created"
        );
        Ok(record)
    }

    async fn get(&self, id: u64) -> AppResult<Option<TicketRecord>> {
        let file = self.read()?;
        Ok(file.tickets.iter().find(|ticket| ticket.id == id).cloned())
    }

    async fn update(&self, id: u64, patch: TicketPatch) -> AppResult<TicketRecord> {
        patch.validate()?;

        let mut file = self.write()?;
        let mut candidate = file.clone();
        let ticket = candidate
            .tickets
            .iter_mut()
            .find(|ticket| ticket.id == id)
            .ok_or_else(|| AppError::NotFound(format!("ticket {id}")))?;
        patch.apply(ticket);
        let record = ticket.clone();
        self.save(&candidate)?;
        *file = candidate;

        info!(id, status = %record.status, "ticket updated");
        Ok(record)
    }

    async fn list(&self, filter: &TicketFilter) -> AppResult<Vec<TicketRecord>> {
        let file = self.read()?;
        let mut tickets = file
            .tickets
            .iter()
            .filter(|ticket| filter.matches(ticket))
            .cloned()
            .collect::<Vec<_>>();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tickets)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.read()?.tickets.len() as u64)
    }

    async fn count_with_status(&self, status: Status) -> AppResult<u64> {
        let file = self.read()?;
        Ok(file
            .tickets
            .iter()
            .filter(|ticket| ticket.status == status)
            .count() as u64)
    }

    async fn count_by_day(&self) -> AppResult<Vec<(NaiveDate, u64)>> {
        let file = self.read()?;
        Ok(count_by_day(&file.tickets, self.utc_offset)
            .into_iter()
            .collect())
    }

    async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>> {
        let file = self.read()?;
        Ok(count_by(&file.tickets, |ticket| ticket.priority)
            .into_iter()
            .collect())
    }

    async fn count_by_category(&self) -> AppResult<Vec<(Category, u64)>> {
        let file = self.read()?;
        Ok(count_by(&file.tickets, |ticket| ticket.category)
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn new_ticket(title: &str, category: Category, priority: Priority) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: format!("{title} needs attention"),
            category,
            priority,
            status: Status::Open,
        }
    }

    fn store(dir: &TempDir) -> JsonTicketStore {
        JsonTicketStore::load(dir.path().join("tickets.json"), utc()).unwrap()
    }

    #[tokio::test]
    async fn creates_and_persists_tickets() {
        let dir = TempDir::new().unwrap();
        let first = store(&dir)
            .create(new_ticket("  Refund  ", Category::Billing, Priority::High))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.title, "Refund");

        let reloaded = store(&dir);
        let second = reloaded
            .create(new_ticket("Login", Category::Account, Priority::Low))
            .await
            .unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(reloaded.count().await.unwrap(), 2);
        assert_eq!(reloaded.get(1).await.unwrap().unwrap().title, "Refund");
    }

    #[tokio::test]
    async fn rejects_invalid_tickets_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let err = store
            .create(new_ticket("", Category::General, Priority::Low))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!dir.path().join("tickets.json").exists());
    }

    #[tokio::test]
    async fn updates_existing_ticket() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .create(new_ticket("Crash", Category::Technical, Priority::Critical))
            .await
            .unwrap();

        let updated = store
            .update(
                1,
                TicketPatch {
                    status: Some(Status::Resolved),
                    ..TicketPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Resolved);
        assert_eq!(store.count_with_status(Status::Open).await.unwrap(), 0);

        let err = store.update(42, TicketPatch::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_newest_first_with_filters() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .create(new_ticket("Invoice", Category::Billing, Priority::Low))
            .await
            .unwrap();
        store
            .create(new_ticket("Refund", Category::Billing, Priority::High))
            .await
            .unwrap();
        store
            .create(new_ticket("Outage", Category::Technical, Priority::Critical))
            .await
            .unwrap();

        let all = store.list(&TicketFilter::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|ticket| ticket.id).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );

        let billing = store
            .list(&TicketFilter {
                category: Some(Category::Billing),
                search: Some("refund".to_string()),
                ..TicketFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(billing.len(), 1);
        assert_eq!(billing[0].title, "Refund");
    }

    #[tokio::test]
    async fn groups_counts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .create(new_ticket("a", Category::Billing, Priority::High))
            .await
            .unwrap();
        store
            .create(new_ticket("b", Category::Billing, Priority::Low))
            .await
            .unwrap();

        assert_eq!(
            store.count_by_category().await.unwrap(),
            vec![(Category::Billing, 2)]
        );
        assert_eq!(
            store.count_by_priority().await.unwrap(),
            vec![(Priority::Low, 1), (Priority::High, 1)]
        );
        let days = store.count_by_day().await.unwrap();
        assert_eq!(days.iter().map(|(_, count)| count).sum::<u64>(), 2);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        let store = store(&dir);
        store
            .create(new_ticket("Crash", Category::Technical, Priority::High))
            .await
            .unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(
            store
                .create(new_ticket("Refund", Category::Billing, Priority::Low))
                .await
                .is_err()
        );
        assert!(
            store
                .update(
                    1,
                    TicketPatch {
                        status: Some(Status::Closed),
                        ..TicketPatch::default()
                    },
                )
                .await
                .is_err()
        );

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(1).await.unwrap().unwrap().status, Status::Open);
        assert!(store.get(2).await.unwrap().is_none());
        assert!(!dir.path().join("tickets.json.tmp").exists());

        fs::remove_dir(&path).unwrap();
        let next = store
            .create(new_ticket("Refund", Category::Billing, Priority::Low))
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn save_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .create(new_ticket("a", Category::General, Priority::Low))
            .await
            .unwrap();
        store
            .create(new_ticket("b", Category::General, Priority::Low))
            .await
            .unwrap();

        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["tickets.json".to_string()]);

        let contents = fs::read_to_string(dir.path().join("tickets.json")).unwrap();
        let file: TicketFile = serde_json::from_str(&contents).unwrap();
        assert_eq!(file.next_id, 3);
        assert_eq!(file.tickets.len(), 2);
    }

    #[test]
    fn rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonTicketStore::load(path, utc()),
            Err(AppError::TicketStore(_))
        ));
    }
}
