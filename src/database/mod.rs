pub mod workbook;

use crate::models::{CellValue, UserRecord};
use crate::utils::error::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use workbook::SheetGrid;

pub const USERS_FILE: &str = "users.xlsx";
pub const DATA_FILE: &str = "data.xlsx";
const USERS_SHEET: &str = "users";
const TEMPLATE_SHEET: &str = "template";
const USER_HEADERS: [&str; 3] = ["email", "password", "admin"];

/// The two workbooks the service keeps on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    Users,
    Data,
}

impl WorkbookKind {
    /// Upload form field name to workbook.
    pub fn from_field(field: &str) -> AppResult<Self> {
        match field {
            "data" => Ok(WorkbookKind::Data),
            "users" => Ok(WorkbookKind::Users),
            other => Err(AppError::InvalidRequest(format!(
                "Unsupported upload field \"{}\" (expected \"data\" or \"users\")",
                other
            ))),
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            WorkbookKind::Users => USERS_FILE,
            WorkbookKind::Data => DATA_FILE,
        }
    }
}

struct Inner {
    dir: PathBuf,
    users_lock: RwLock<()>,
    data_lock: RwLock<()>,
}

/// Spreadsheet-backed storage for users and per-user dashboard sheets.
///
/// Every call re-reads the workbook from disk. Writes are serialized per
/// workbook and land through a rename, so readers see either the old or the
/// new file.
#[derive(Clone)]
pub struct SheetStore {
    inner: Arc<Inner>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Storage("Workbook lock poisoned".to_string())
}

impl SheetStore {
    /// Opens the sheets directory, creating it and both workbooks if needed.
    pub fn open(dir: impl AsRef<Path>, template_rows: Vec<Vec<CellValue>>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            log::info!("📁 Created sheets directory: {}", dir.display());
        }

        let store = Self {
            inner: Arc::new(Inner {
                dir,
                users_lock: RwLock::new(()),
                data_lock: RwLock::new(()),
            }),
        };

        let users_path = store.path(WorkbookKind::Users);
        if !users_path.exists() {
            let header = USER_HEADERS.iter().map(|h| CellValue::from(*h)).collect();
            store.write_atomic(WorkbookKind::Users, &[SheetGrid::new(USERS_SHEET, vec![header])])?;
            log::info!("   ✅ {} created with headers", USERS_FILE);
        }

        let data_path = store.path(WorkbookKind::Data);
        if !data_path.exists() {
            store.write_atomic(WorkbookKind::Data, &[SheetGrid::new(TEMPLATE_SHEET, template_rows)])?;
            log::info!("   ✅ {} created with template sheet", DATA_FILE);
        }

        Ok(store)
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn path(&self, kind: WorkbookKind) -> PathBuf {
        self.inner.dir.join(kind.file_name())
    }

    fn lock_for(&self, kind: WorkbookKind) -> &RwLock<()> {
        match kind {
            WorkbookKind::Users => &self.inner.users_lock,
            WorkbookKind::Data => &self.inner.data_lock,
        }
    }

    fn read_guard(&self, kind: WorkbookKind) -> AppResult<RwLockReadGuard<'_, ()>> {
        self.lock_for(kind).read().map_err(poisoned)
    }

    fn write_guard(&self, kind: WorkbookKind) -> AppResult<RwLockWriteGuard<'_, ()>> {
        self.lock_for(kind).write().map_err(poisoned)
    }

    /// Caller must hold the write lock for `kind`.
    fn write_atomic(&self, kind: WorkbookKind, sheets: &[SheetGrid]) -> AppResult<()> {
        let tmp = self.temp_path(kind);
        if let Err(e) = workbook::write_workbook(&tmp, sheets) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, self.path(kind))?;
        Ok(())
    }

    fn temp_path(&self, kind: WorkbookKind) -> PathBuf {
        self.inner
            .dir
            .join(format!(".{}.{}.tmp", kind.file_name(), uuid::Uuid::new_v4()))
    }

    // ==================== USERS ====================

    pub fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let _guard = self.read_guard(WorkbookKind::Users)?;
        self.read_users()
    }

    pub fn find_user(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.list_users()?.into_iter().find(|user| user.email == email))
    }

    /// Appends a user; fails with `Conflict` when the email is already taken.
    pub fn insert_user(&self, record: UserRecord) -> AppResult<()> {
        let _guard = self.write_guard(WorkbookKind::Users)?;

        let mut users = self.read_users()?;
        if users.iter().any(|user| user.email == record.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        users.push(record);

        self.write_atomic(WorkbookKind::Users, &[users_to_sheet(&users)])?;
        log::info!("💾 User row written to {}", USERS_FILE);
        Ok(())
    }

    fn read_users(&self) -> AppResult<Vec<UserRecord>> {
        let sheets = workbook::read_workbook(&self.path(WorkbookKind::Users))?;
        Ok(sheets
            .first()
            .map(|sheet| users_from_rows(&sheet.rows))
            .unwrap_or_default())
    }

    // ==================== USER DATA SHEETS ====================

    pub fn read_sheet(&self, name: &str) -> AppResult<Option<Vec<Vec<CellValue>>>> {
        let _guard = self.read_guard(WorkbookKind::Data)?;
        let sheets = workbook::read_workbook(&self.path(WorkbookKind::Data))?;
        Ok(sheets.into_iter().find(|s| s.name == name).map(|s| s.rows))
    }

    #[cfg(test)]
    pub fn sheet_names(&self) -> AppResult<Vec<String>> {
        let _guard = self.read_guard(WorkbookKind::Data)?;
        let sheets = workbook::read_workbook(&self.path(WorkbookKind::Data))?;
        Ok(sheets.into_iter().map(|s| s.name).collect())
    }

    /// Creates or replaces the sheet called `name`; it moves to the end.
    pub fn write_sheet(&self, name: &str, rows: Vec<Vec<CellValue>>) -> AppResult<()> {
        let _guard = self.write_guard(WorkbookKind::Data)?;

        let path = self.path(WorkbookKind::Data);
        let mut sheets = if path.exists() {
            workbook::read_workbook(&path)?
        } else {
            Vec::new()
        };
        sheets.retain(|s| s.name != name);
        sheets.push(SheetGrid::new(name, rows));

        self.write_atomic(WorkbookKind::Data, &sheets)
    }

    // ==================== UPLOADS ====================

    /// Swaps in an uploaded workbook after checking it parses.
    pub fn replace_workbook(&self, kind: WorkbookKind, bytes: &[u8]) -> AppResult<()> {
        workbook::parse_workbook(bytes)?;

        let _guard = self.write_guard(kind)?;
        let tmp = self.temp_path(kind);
        if let Err(e) = fs::write(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, self.path(kind))?;
        Ok(())
    }
}

/// Row 0 names the columns; rows without an email are skipped.
fn users_from_rows(rows: &[Vec<CellValue>]) -> Vec<UserRecord> {
    let headers: Vec<String> = match rows.first() {
        Some(header) => header.iter().map(|h| h.as_text().trim().to_string()).collect(),
        None => return Vec::new(),
    };

    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let mut record = UserRecord::default();
            for (idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                let value = row.get(idx).map(CellValue::as_text).unwrap_or_default();
                match header.to_lowercase().as_str() {
                    "email" => record.email = value,
                    "password" => record.password = value,
                    "admin" => record.admin = Some(value).filter(|v| !v.is_empty()),
                    _ => {
                        if !value.is_empty() {
                            record.extra.insert(header.clone(), value);
                        }
                    }
                }
            }
            if record.email.is_empty() {
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

fn users_to_sheet(users: &[UserRecord]) -> SheetGrid {
    let extra_columns: Vec<String> = users
        .iter()
        .flat_map(|user| user.extra.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut header: Vec<CellValue> = USER_HEADERS.iter().map(|h| CellValue::from(*h)).collect();
    header.extend(extra_columns.iter().map(|c| CellValue::from(c.as_str())));

    let mut rows = vec![header];
    for user in users {
        let mut row = vec![
            CellValue::from(user.email.as_str()),
            CellValue::from(user.password.as_str()),
            CellValue::from(user.admin.as_deref().unwrap_or("")),
        ];
        let extra: &BTreeMap<String, String> = &user.extra;
        row.extend(
            extra_columns
                .iter()
                .map(|c| CellValue::from(extra.get(c).map(String::as_str).unwrap_or(""))),
        );
        rows.push(row);
    }

    SheetGrid::new(USERS_SHEET, rows)
}

#[cfg(test)]
pub(crate) fn test_store() -> (tempfile::TempDir, SheetStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SheetStore::open(
        dir.path().join("sheets"),
        crate::services::data_service::default_user_rows(),
    )
    .unwrap();
    (dir, store)
}
