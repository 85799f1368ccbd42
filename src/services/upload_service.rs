use crate::{
    database::{workbook, SheetStore, WorkbookKind},
    utils::error::{AppError, AppResult},
};

/// A file received from the admin upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub bytes: Vec<u8>,
}

/// Replaces the targeted workbooks. Every field name and every file body is
/// checked before any workbook is touched.
pub async fn store_uploads(store: &SheetStore, files: Vec<UploadedFile>) -> AppResult<Vec<String>> {
    if files.is_empty() {
        return Err(AppError::InvalidRequest("File is required".to_string()));
    }

    let targets = files
        .into_iter()
        .map(|file| Ok((WorkbookKind::from_field(&file.field)?, file.bytes)))
        .collect::<AppResult<Vec<_>>>()?;

    let store = store.clone();
    tokio::task::spawn_blocking(move || -> AppResult<Vec<String>> {
        for (kind, bytes) in &targets {
            workbook::parse_workbook(bytes).map_err(|e| {
                AppError::InvalidRequest(format!("{}: {}", kind.file_name(), e.message()))
            })?;
        }

        let mut replaced = Vec::with_capacity(targets.len());
        for (kind, bytes) in targets {
            store.replace_workbook(kind, &bytes)?;
            log::info!("📤 Workbook replaced: {}", store.path(kind).display());
            replaced.push(kind.file_name().to_string());
        }
        Ok(replaced)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{test_store, workbook};
    use crate::models::CellValue;

    fn xlsx_bytes(sheet: &str, rows: Vec<Vec<CellValue>>) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.xlsx");
        workbook::write_workbook(&path, &[workbook::SheetGrid::new(sheet, rows)]).unwrap();
        std::fs::read(path).unwrap()
    }

    #[actix_web::test]
    async fn test_requires_a_file() {
        let (_dir, store) = test_store();
        let err = store_uploads(&store, Vec::new()).await.unwrap_err();
        assert_eq!(err.message(), "File is required");
    }

    #[actix_web::test]
    async fn test_unknown_field_touches_nothing() {
        let (_dir, store) = test_store();
        let files = vec![
            UploadedFile {
                field: "data".into(),
                bytes: xlsx_bytes("a@b.com", vec![vec!["x".into()]]),
            },
            UploadedFile {
                field: "../../etc/passwd".into(),
                bytes: Vec::new(),
            },
        ];
        assert!(store_uploads(&store, files).await.is_err());
        assert_eq!(store.sheet_names().unwrap(), vec!["template".to_string()]);
    }

    #[actix_web::test]
    async fn test_invalid_second_file_touches_nothing() {
        let (_dir, store) = test_store();
        let files = vec![
            UploadedFile {
                field: "data".into(),
                bytes: xlsx_bytes("new@x.com", vec![vec!["x".into()]]),
            },
            UploadedFile {
                field: "users".into(),
                bytes: b"garbage".to_vec(),
            },
        ];

        let err = store_uploads(&store, files).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(err.message().starts_with("users.xlsx: Not a valid .xlsx file"));
        assert_eq!(store.sheet_names().unwrap(), vec!["template".to_string()]);
        assert!(store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(WorkbookKind::from_field("data").unwrap(), WorkbookKind::Data);
        assert_eq!(WorkbookKind::from_field("users").unwrap(), WorkbookKind::Users);
        assert!(WorkbookKind::from_field("file").is_err());
    }

    #[actix_web::test]
    async fn test_replaces_users_workbook() {
        let (_dir, store) = test_store();
        let bytes = xlsx_bytes(
            "users",
            vec![
                vec!["email".into(), "password".into(), "admin".into()],
                vec!["boss@firm.com".into(), "pw".into(), "admin".into()],
            ],
        );
        let replaced = store_uploads(
            &store,
            vec![UploadedFile {
                field: "users".into(),
                bytes,
            }],
        )
        .await
        .unwrap();

        assert_eq!(replaced, vec!["users.xlsx".to_string()]);
        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
    }
}
