use crate::models::contract::{Contract, NewContract};
use crate::repositories::{ContractRepository, RepositoryError, ServiceRepository};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Accepted extensions and the content type served back on download.
const ALLOWED_TYPES: [(&str, &str); 6] = [
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

const MAX_FILE_NAME_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("The uploaded file is empty")]
    EmptyFile,
    #[error("File exceeds the {max_bytes} byte limit")]
    TooLarge { max_bytes: usize },
    #[error("Unsupported file type; allowed: pdf, doc, docx, jpg, jpeg, png")]
    UnsupportedType,
    #[error("Referenced service does not exist")]
    ServiceNotFound,
    #[error("Contract not found")]
    NotFound,
    #[error("Not allowed to access this contract")]
    AccessDenied,
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct ContractUpload {
    pub user_id: i64,
    pub service_id: Option<i64>,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Who is asking, for ownership checks.
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub user_id: i64,
    pub is_admin: bool,
}

pub struct ContractService {
    contracts: Arc<dyn ContractRepository>,
    services: Arc<dyn ServiceRepository>,
    storage_dir: PathBuf,
    max_upload_bytes: usize,
}

impl ContractService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        services: Arc<dyn ServiceRepository>,
        storage_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            contracts,
            services,
            storage_dir,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn upload(&self, upload: ContractUpload) -> Result<Contract, ContractError> {
        if upload.bytes.is_empty() {
            return Err(ContractError::EmptyFile);
        }
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(ContractError::TooLarge {
                max_bytes: self.max_upload_bytes,
            });
        }

        let original_name = sanitize_file_name(&upload.file_name);
        let (extension, content_type) =
            content_type_for(&original_name).ok_or(ContractError::UnsupportedType)?;

        if let Some(service_id) = upload.service_id {
            if self.services.find_by_id(service_id).await?.is_none() {
                return Err(ContractError::ServiceNotFound);
            }
        }

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        let sha256 = hex::encode(Sha256::digest(&upload.bytes));

        tokio::fs::create_dir_all(&self.storage_dir).await?;
        let path = self.storage_dir.join(&stored_name);
        tokio::fs::write(&path, &upload.bytes).await?;

        let new_contract = NewContract {
            user_id: upload.user_id,
            service_id: upload.service_id,
            original_name,
            stored_name,
            content_type: content_type.to_string(),
            size_bytes: upload.bytes.len() as i64,
            sha256,
        };

        match self.contracts.create(&new_contract).await {
            Ok(contract) => {
                tracing::info!(
                    "Stored contract {} for user {} ({} bytes)",
                    contract.id,
                    contract.user_id,
                    contract.size_bytes
                );
                Ok(contract)
            }
            Err(e) => {
                // Without a row the file is unreachable.
                remove_quietly(&path).await;
                Err(match e {
                    RepositoryError::MissingReference => ContractError::ServiceNotFound,
                    other => other.into(),
                })
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Contract>, ContractError> {
        Ok(self.contracts.list_all().await?)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Contract>, ContractError> {
        Ok(self.contracts.list_for_user(user_id).await?)
    }

    /// Administrators see every contract, everyone else only their own.
    pub async fn list_visible(&self, requester: Requester) -> Result<Vec<Contract>, ContractError> {
        if requester.is_admin {
            self.list_all().await
        } else {
            self.list_for_user(requester.user_id).await
        }
    }

    pub async fn get(&self, id: i64, requester: Requester) -> Result<Contract, ContractError> {
        let contract = self
            .contracts
            .find_by_id(id)
            .await?
            .ok_or(ContractError::NotFound)?;

        if !requester.is_admin && contract.user_id != requester.user_id {
            return Err(ContractError::AccessDenied);
        }

        Ok(contract)
    }

    pub async fn read_file(
        &self,
        id: i64,
        requester: Requester,
    ) -> Result<(Contract, Vec<u8>), ContractError> {
        let contract = self.get(id, requester).await?;
        let bytes = tokio::fs::read(self.storage_dir.join(&contract.stored_name)).await?;
        Ok((contract, bytes))
    }

    pub async fn delete(&self, id: i64, requester: Requester) -> Result<(), ContractError> {
        let contract = self.get(id, requester).await?;

        match self.contracts.delete(contract.id).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(ContractError::NotFound),
            Err(e) => return Err(e.into()),
        }

        remove_quietly(&self.storage_dir.join(&contract.stored_name)).await;
        tracing::info!("Deleted contract {}", contract.id);
        Ok(())
    }

    /// Removes every contract of `user_id`, rows and stored files. Run
    /// before deleting the account; the cascade would drop the rows and
    /// leave the files behind. Returns how many contracts were removed.
    pub async fn delete_for_user(&self, user_id: i64) -> Result<usize, ContractError> {
        let contracts = self.contracts.list_for_user(user_id).await?;

        for contract in &contracts {
            match self.contracts.delete(contract.id).await {
                Ok(()) | Err(RepositoryError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
            remove_quietly(&self.storage_dir.join(&contract.stored_name)).await;
        }

        if !contracts.is_empty() {
            tracing::info!(
                "Deleted {} contracts of user {}",
                contracts.len(),
                user_id
            );
        }
        Ok(contracts.len())
    }
}

/// Keeps only the final path component and caps its length.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let base: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    if base.is_empty() {
        "contract".to_string()
    } else {
        base
    }
}

fn content_type_for(file_name: &str) -> Option<(&'static str, &'static str)> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .copied()
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove contract file {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::contract_repository::MockContractRepository;
    use crate::repositories::service_repository::MockServiceRepository;
    use tempfile::TempDir;

    fn stored(id: i64, new_contract: &NewContract) -> Contract {
        Contract {
            id,
            user_id: new_contract.user_id,
            service_id: new_contract.service_id,
            original_name: new_contract.original_name.clone(),
            stored_name: new_contract.stored_name.clone(),
            content_type: new_contract.content_type.clone(),
            size_bytes: new_contract.size_bytes,
            sha256: new_contract.sha256.clone(),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn upload(file_name: &str, bytes: &[u8]) -> ContractUpload {
        ContractUpload {
            user_id: 7,
            service_id: None,
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(
            content_type_for("contract.PDF"),
            Some(("pdf", "application/pdf"))
        );
        assert_eq!(content_type_for("scan.jpeg"), Some(("jpeg", "image/jpeg")));
        assert_eq!(content_type_for("script.exe"), None);
        assert_eq!(content_type_for("no_extension"), None);
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_file_name(r"C:\Users\me\عقد.docx"), "عقد.docx");
        assert_eq!(sanitize_file_name("   "), "contract");
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_records_digest() {
        let dir = TempDir::new().unwrap();
        let mut contracts = MockContractRepository::new();
        contracts
            .expect_create()
            .withf(|c: &NewContract| {
                c.user_id == 7
                    && c.original_name == "عقد.pdf"
                    && c.content_type == "application/pdf"
                    && c.size_bytes == 5
                    && c.stored_name.ends_with(".pdf")
                    // sha256("hello")
                    && c.sha256
                        == "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
            })
            .times(1)
            .returning(|c| {
                let contract = stored(1, c);
                Box::pin(async move { Ok(contract) })
            });

        let service = ContractService::new(
            Arc::new(contracts),
            Arc::new(MockServiceRepository::new()),
            dir.path().to_path_buf(),
            1024,
        );

        let contract = service.upload(upload("عقد.pdf", b"hello")).await.unwrap();
        let on_disk = std::fs::read(dir.path().join(&contract.stored_name)).unwrap();
        assert_eq!(on_disk, b"hello");
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let dir = TempDir::new().unwrap();
        let service = ContractService::new(
            Arc::new(MockContractRepository::new()),
            Arc::new(MockServiceRepository::new()),
            dir.path().to_path_buf(),
            4,
        );

        assert!(matches!(
            service.upload(upload("a.pdf", b"")).await,
            Err(ContractError::EmptyFile)
        ));
        assert!(matches!(
            service.upload(upload("a.pdf", b"12345")).await,
            Err(ContractError::TooLarge { max_bytes: 4 })
        ));
        assert!(matches!(
            service.upload(upload("a.exe", b"MZ")).await,
            Err(ContractError::UnsupportedType)
        ));
    }

    #[tokio::test]
    async fn test_upload_unknown_service() {
        let dir = TempDir::new().unwrap();
        let mut services = MockServiceRepository::new();
        services
            .expect_find_by_id()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = ContractService::new(
            Arc::new(MockContractRepository::new()),
            Arc::new(services),
            dir.path().to_path_buf(),
            1024,
        );

        let mut request = upload("a.png", b"png");
        request.service_id = Some(42);
        assert!(matches!(
            service.upload(request).await,
            Err(ContractError::ServiceNotFound)
        ));
    }

    #[tokio::test]
    async fn test_other_users_contract_is_denied() {
        let dir = TempDir::new().unwrap();
        let mut contracts = MockContractRepository::new();
        contracts.expect_find_by_id().returning(|id| {
            let contract = stored(
                id,
                &NewContract {
                    user_id: 1,
                    service_id: None,
                    original_name: "a.pdf".to_string(),
                    stored_name: "x.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    size_bytes: 1,
                    sha256: String::new(),
                },
            );
            Box::pin(async move { Ok(Some(contract)) })
        });

        let service = ContractService::new(
            Arc::new(contracts),
            Arc::new(MockServiceRepository::new()),
            dir.path().to_path_buf(),
            1024,
        );

        let stranger = Requester {
            user_id: 2,
            is_admin: false,
        };
        assert!(matches!(
            service.get(5, stranger).await,
            Err(ContractError::AccessDenied)
        ));

        let admin = Requester {
            user_id: 2,
            is_admin: true,
        };
        assert!(service.get(5, admin).await.is_ok());
    }
}
