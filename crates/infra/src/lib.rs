//! Infrastructure layer: storage backends, entity records, lifecycle
//! use-cases, credential verification and configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod event_bus;
pub mod records;
pub mod repository;
pub mod usecase;
pub mod verifier;

pub use config::{AppConfig, DbConfig, EventsConfig};
pub use db::{MemoryDb, PgDb, TxSource};
pub use error::{LifecycleError, StoreError};
pub use records::{Contact, Role, User};
pub use repository::{Filter, MemoryRepository, PgRepository, Record, Repository, Scope};
pub use usecase::{
    ContactService, ContactUseCase, Notifier, PublishPolicy, RequestContext, RoleService, RoleUseCase,
    UserService, UserUseCase,
};
pub use verifier::CredentialVerifier;
